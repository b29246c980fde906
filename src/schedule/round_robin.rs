use super::{
    DEFAULT_TIME_SLOT, DEFAULT_VENUE, FixtureSettings, GeneratedFixture, PermissivePolicy,
    ScheduleError, SchedulingPolicy, cycle,
};
use chrono::Duration;
use league_api::Team;

/// Generate a full (optionally double) round-robin schedule.
///
/// Standard circle method: the team at index 0 is the fixed pivot, the rest
/// rotate one slot per round. Rounds land seven days apart starting at
/// `settings.start_date`; time slots and venues cycle through the configured
/// lists by match index.
pub fn generate(
    teams: &[Team],
    settings: &FixtureSettings,
) -> Result<Vec<GeneratedFixture>, ScheduleError> {
    generate_with_policy(teams, settings, &PermissivePolicy)
}

pub fn generate_with_policy(
    teams: &[Team],
    settings: &FixtureSettings,
    policy: &dyn SchedulingPolicy,
) -> Result<Vec<GeneratedFixture>, ScheduleError> {
    if teams.len() < 2 {
        return Err(ScheduleError::NotEnoughTeams { required: 2, got: teams.len() });
    }
    settings.validate()?;

    let n = teams.len();
    let rounds = n - 1;
    let matches_per_round = n / 2;

    let mut rotation: Vec<&Team> = teams.iter().collect();
    let mut fixtures = Vec::with_capacity(rounds * matches_per_round);

    for round in 0..rounds {
        for slot in 0..matches_per_round {
            let opposite = n - 1 - slot;
            // Guards the middle slot from pairing a team with itself when the
            // team count is odd.
            if slot >= opposite {
                continue;
            }
            fixtures.push(GeneratedFixture {
                round: round as u32 + 1,
                home_team_id: Some(rotation[slot].id.clone()),
                away_team_id: Some(rotation[opposite].id.clone()),
                date: settings.start_date + Duration::days(round as i64 * 7),
                time: cycle(&settings.time_slots, slot, DEFAULT_TIME_SLOT).to_owned(),
                venue: cycle(&settings.venues, slot, DEFAULT_VENUE).to_owned(),
                notes: None,
            });
        }

        // Rotate for the next round: the last team re-enters just after the
        // pivot.
        if let Some(last) = rotation.pop() {
            rotation.insert(1, last);
        }
    }

    if settings.double_round_robin {
        // Mirrored second leg: home and away swap, one full cycle later.
        let mirrored: Vec<GeneratedFixture> = fixtures
            .iter()
            .map(|f| GeneratedFixture {
                round: f.round + rounds as u32,
                home_team_id: f.away_team_id.clone(),
                away_team_id: f.home_team_id.clone(),
                date: f.date + Duration::days(rounds as i64 * 7),
                time: f.time.clone(),
                venue: f.venue.clone(),
                notes: None,
            })
            .collect();
        fixtures.extend(mirrored);
    }

    policy.apply(&mut fixtures, settings);
    Ok(fixtures)
}
