use crate::schedule::{GeneratedFixture, ScheduleError};
use futures_util::future::join_all;
use league_api::CreatedMatch;
use league_api::client::LeagueApi;
use log::{debug, error};

/// Outcome of one best-effort save batch.
///
/// The fan-out never rolls back: fixtures the backend accepted stay accepted
/// even when siblings fail. Callers get per-item results and decide what to
/// do about the gaps.
#[derive(Debug, Default)]
pub struct SaveReport {
    pub created: Vec<CreatedMatch>,
    /// Index into the submitted batch, plus the backend's message.
    pub failed: Vec<(usize, String)>,
}

impl SaveReport {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Persist a generated batch: one create call per fixture, all issued
/// concurrently and awaited as a unit. Field values are fully determined
/// before the fan-out starts; there is no retry and no cancellation once it
/// has begun.
pub async fn save_fixtures(
    api: &LeagueApi,
    league_id: &str,
    fixtures: &[GeneratedFixture],
) -> Result<SaveReport, ScheduleError> {
    // A fixture pitting a team against itself must never reach the backend.
    if let Some(index) = fixtures.iter().position(|f| !f.has_distinct_teams()) {
        return Err(ScheduleError::InvalidPairing(index));
    }

    debug!("saving {} fixtures for league {league_id}", fixtures.len());
    let requests = fixtures
        .iter()
        .map(|f| f.to_new_match(league_id))
        .map(|m| async move { api.create_match(&m).await });
    let results = join_all(requests).await;

    let mut report = SaveReport::default();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(created) => report.created.push(created),
            Err(e) => {
                error!("fixture {index} was rejected: {e}");
                report.failed.push((index, e.to_string()));
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mockito::Matcher;

    fn fixture(home: &str, away: &str) -> GeneratedFixture {
        GeneratedFixture {
            round: 1,
            home_team_id: Some(home.to_owned()),
            away_team_id: Some(away.to_owned()),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            time: "14:00".into(),
            venue: "Court 1".into(),
            notes: None,
        }
    }

    fn created_body(id: &str) -> String {
        format!(
            r#"{{"id":"{id}","leagueId":"lg1","homeTeamId":"t1","awayTeamId":"t2",
                "scheduledDate":"2025-01-01T14:00:00+00:00","venue":"Court 1",
                "matchStatus":"scheduled","matchNotes":null}}"#
        )
    }

    #[tokio::test]
    async fn batch_reports_per_fixture_outcomes() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("POST", "/matches")
            .match_body(Matcher::PartialJson(serde_json::json!({"homeTeamId": "t1"})))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(created_body("m1"))
            .create_async()
            .await;
        let _rejected = server
            .mock("POST", "/matches")
            .match_body(Matcher::PartialJson(serde_json::json!({"homeTeamId": "t3"})))
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"venue is double-booked"}"#)
            .create_async()
            .await;

        let api = LeagueApi::new(server.url());
        let fixtures = vec![fixture("t1", "t2"), fixture("t3", "t4")];
        let report = save_fixtures(&api, "lg1", &fixtures).await.unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].id, "m1");
        assert_eq!(report.failed, vec![(1, "venue is double-booked".to_owned())]);
        assert!(!report.all_ok());
    }

    #[tokio::test]
    async fn self_pairing_never_reaches_the_backend() {
        let mut server = mockito::Server::new_async().await;
        let create = server.mock("POST", "/matches").expect(0).create_async().await;

        let api = LeagueApi::new(server.url());
        let fixtures = vec![fixture("t1", "t2"), fixture("t3", "t3")];
        let err = save_fixtures(&api, "lg1", &fixtures).await.unwrap_err();

        assert_eq!(err, ScheduleError::InvalidPairing(1));
        create.assert_async().await;
    }
}
