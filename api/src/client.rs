use crate::wire::{StandingsResponse, TeamsResponse, WireError, WireStanding, WireTeam};
use crate::{CreatedMatch, NewMatch, Standing, Team};
use reqwest::Client;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:4000/api/v1";
const BASE_URL_ENV: &str = "LEAGUE_API_URL";

/// League administration API client.
#[derive(Debug, Clone)]
pub struct LeagueApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for LeagueApi {
    fn default() -> Self {
        Self::from_env()
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl LeagueApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::builder()
                .user_agent("hoopsched/0.1 (league fixture tool)")
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Base URL from `LEAGUE_API_URL`, falling back to the local dev backend.
    pub fn from_env() -> Self {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        Self::new(base_url)
    }

    /// Fetch the league roster.
    pub async fn fetch_teams(&self, league_id: &str) -> ApiResult<Vec<Team>> {
        let url = format!("{}/leagues/{league_id}/teams", self.base_url);
        let raw: TeamsResponse = self.get(&url).await?;
        Ok(raw.teams.into_iter().map(map_team).collect())
    }

    /// Fetch the league table, ordered by position.
    pub async fn fetch_standings(&self, league_id: &str) -> ApiResult<Vec<Standing>> {
        let url = format!("{}/leagues/{league_id}/standings", self.base_url);
        let raw: StandingsResponse = self.get(&url).await?;
        let mut standings: Vec<Standing> = raw
            .standings
            .into_iter()
            .enumerate()
            .map(|(i, s)| map_standing(s, i))
            .collect();
        standings.sort_by_key(|s| s.position);
        Ok(standings)
    }

    /// Create one fixture. Rejections carry the backend's human-readable
    /// message, surfaced verbatim to the caller.
    pub async fn create_match(&self, fixture: &NewMatch) -> ApiResult<CreatedMatch> {
        let url = format!("{}/matches", self.base_url);
        self.post(&url, fixture).await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned())),
            Err(e) => {
                if e.status() == Some(reqwest::StatusCode::NOT_FOUND) {
                    Err(ApiError::NotFound(format!("{url} returned 404")))
                } else {
                    Err(ApiError::Api(e, url.to_owned()))
                }
            }
        }
    }

    async fn post<B, T>(&self, url: &str, body: &B) -> ApiResult<T>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned()))
        } else {
            // Prefer the backend's own message over a bare status line.
            let message = response
                .json::<WireError>()
                .await
                .ok()
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("{url} returned {status}"));
            Err(ApiError::Other(message))
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping: wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_team(raw: WireTeam) -> Team {
    let name = raw.name.unwrap_or_default();
    Team {
        short_name: raw.short_name.unwrap_or_else(|| name.clone()),
        id: raw.id,
        name,
    }
}

/// `index` is the row's position in the response, used when the backend has
/// not assigned explicit positions yet.
fn map_standing(raw: WireStanding, index: usize) -> Standing {
    Standing {
        team_id: raw.team_id,
        position: raw.position.unwrap_or(index as u32 + 1),
        wins: raw.wins,
        losses: raw.losses,
        point_difference: raw.point_difference,
        games_played: raw.games_played,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchStatus;

    #[test]
    fn team_short_name_falls_back_to_full_name() {
        let raw = WireTeam {
            id: "t1".into(),
            name: Some("Northside Hawks".into()),
            short_name: None,
        };
        let team = map_team(raw);
        assert_eq!(team.short_name, "Northside Hawks");
    }

    #[test]
    fn standing_position_falls_back_to_row_order() {
        let raw = WireStanding { team_id: "t3".into(), position: None, ..Default::default() };
        let standing = map_standing(raw, 2);
        assert_eq!(standing.position, 3);
    }

    #[tokio::test]
    async fn fetch_teams_maps_camel_case_payload() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/leagues/lg1/teams")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"teams":[
                    {"id":"t1","name":"Northside Hawks","shortName":"Hawks"},
                    {"id":"t2","name":"Dockyard Pistons"}
                ]}"#,
            )
            .create_async()
            .await;

        let api = LeagueApi::new(server.url());
        let teams = api.fetch_teams("lg1").await.expect("teams should load");
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].short_name, "Hawks");
        assert_eq!(teams[1].short_name, "Dockyard Pistons");
    }

    #[tokio::test]
    async fn fetch_standings_sorts_by_position() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/leagues/lg1/standings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"standings":[
                    {"teamId":"t2","position":2,"wins":3,"losses":4,"pointDifference":-12,"gamesPlayed":7},
                    {"teamId":"t1","position":1,"wins":6,"losses":1,"pointDifference":40,"gamesPlayed":7}
                ]}"#,
            )
            .create_async()
            .await;

        let api = LeagueApi::new(server.url());
        let standings = api.fetch_standings("lg1").await.expect("standings should load");
        assert_eq!(standings[0].team_id, "t1");
        assert_eq!(standings[1].team_id, "t2");
        assert!(standings.iter().all(Standing::is_qualified));
    }

    #[tokio::test]
    async fn fetch_teams_missing_league_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/leagues/nope/teams")
            .with_status(404)
            .create_async()
            .await;

        let api = LeagueApi::new(server.url());
        let err = api.fetch_teams("nope").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)), "got: {err}");
    }

    #[tokio::test]
    async fn create_match_posts_camel_case_and_returns_created() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/matches")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "leagueId": "lg1",
                "homeTeamId": "t1",
                "awayTeamId": "t2",
                "matchStatus": "scheduled",
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":"m1","leagueId":"lg1","homeTeamId":"t1","awayTeamId":"t2",
                    "scheduledDate":"2025-01-01T14:00:00+00:00","venue":"Court 1",
                    "matchStatus":"scheduled","matchNotes":null}"#,
            )
            .create_async()
            .await;

        let api = LeagueApi::new(server.url());
        let fixture = NewMatch {
            league_id: "lg1".into(),
            home_team_id: Some("t1".into()),
            away_team_id: Some("t2".into()),
            scheduled_date: "2025-01-01T14:00:00+00:00".into(),
            venue: "Court 1".into(),
            match_status: MatchStatus::Scheduled,
            match_notes: None,
        };
        let created = api.create_match(&fixture).await.expect("create should succeed");
        assert_eq!(created.id, "m1");
        assert_eq!(created.match_status, MatchStatus::Scheduled);
    }

    #[tokio::test]
    async fn create_match_surfaces_backend_message_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/matches")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"venue is double-booked"}"#)
            .create_async()
            .await;

        let api = LeagueApi::new(server.url());
        let fixture = NewMatch {
            league_id: "lg1".into(),
            home_team_id: Some("t1".into()),
            away_team_id: Some("t2".into()),
            scheduled_date: "2025-01-01T14:00:00+00:00".into(),
            venue: "Court 1".into(),
            match_status: MatchStatus::Scheduled,
            match_notes: None,
        };
        let err = api.create_match(&fixture).await.unwrap_err();
        assert_eq!(err.to_string(), "venue is double-booked");
    }
}
