pub mod knockout;
pub mod round_robin;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use league_api::{MatchStatus, NewMatch};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tip-off time used when a settings file configures no time slots.
pub const DEFAULT_TIME_SLOT: &str = "14:00";
/// Venue used when a settings file configures no venues.
pub const DEFAULT_VENUE: &str = "TBD";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Round-robin generation settings, as loaded from a JSON settings file.
///
/// `rest_days`, `avoid_back_to_back` and `balance_home_away` are accepted and
/// carried through to the [`SchedulingPolicy`], but the base generator does
/// not act on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureSettings {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub time_slots: Vec<String>,
    #[serde(default)]
    pub venues: Vec<String>,
    #[serde(default)]
    pub rest_days: u32,
    #[serde(default)]
    pub double_round_robin: bool,
    #[serde(default)]
    pub avoid_back_to_back: bool,
    #[serde(default)]
    pub balance_home_away: bool,
}

impl FixtureSettings {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.end_date < self.start_date {
            return Err(ScheduleError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        for slot in &self.time_slots {
            if parse_time_slot(slot).is_none() {
                return Err(ScheduleError::InvalidTimeSlot(slot.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BracketType {
    #[default]
    SingleElimination,
    /// Declared for forward compatibility; generation currently always
    /// produces a single-elimination bracket.
    DoubleElimination,
}

/// Knockout generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketSettings {
    pub start_date: NaiveDate,
    #[serde(default = "default_venue")]
    pub venue: String,
    #[serde(default = "default_time_slot")]
    pub time_slot: String,
    #[serde(default)]
    pub bracket_type: BracketType,
}

impl BracketSettings {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if parse_time_slot(&self.time_slot).is_none() {
            return Err(ScheduleError::InvalidTimeSlot(self.time_slot.clone()));
        }
        Ok(())
    }
}

fn default_venue() -> String {
    DEFAULT_VENUE.to_owned()
}

fn default_time_slot() -> String {
    DEFAULT_TIME_SLOT.to_owned()
}

// ---------------------------------------------------------------------------
// Generator output
// ---------------------------------------------------------------------------

/// One fixture produced by either generator. Transient: exists between
/// generation and the save step, then becomes a [`NewMatch`].
///
/// The round-robin path always fills both team ids; the knockout path leaves
/// unresolved slots (later rounds, third-place games) as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFixture {
    pub round: u32,
    pub home_team_id: Option<String>,
    pub away_team_id: Option<String>,
    pub date: NaiveDate,
    pub time: String,
    pub venue: String,
    pub notes: Option<String>,
}

impl GeneratedFixture {
    /// Scheduled tip-off. Unparseable slot strings fall back to the default
    /// slot rather than failing a save that already passed validation.
    pub fn scheduled_at(&self) -> NaiveDateTime {
        let time = parse_time_slot(&self.time).unwrap_or_else(fallback_tip_off);
        self.date.and_time(time)
    }

    pub fn to_new_match(&self, league_id: &str) -> NewMatch {
        NewMatch {
            league_id: league_id.to_owned(),
            home_team_id: self.home_team_id.clone(),
            away_team_id: self.away_team_id.clone(),
            scheduled_date: self.scheduled_at().and_utc().to_rfc3339(),
            venue: self.venue.clone(),
            match_status: MatchStatus::Scheduled,
            match_notes: self.notes.clone(),
        }
    }

    /// No fixture may pit a team against itself. Placeholder fixtures carry
    /// no team ids at all; a one-sided fixture is never valid.
    pub fn has_distinct_teams(&self) -> bool {
        match (&self.home_team_id, &self.away_team_id) {
            (Some(home), Some(away)) => home != away,
            (None, None) => true,
            _ => false,
        }
    }
}

pub fn parse_time_slot(slot: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(slot, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(slot, "%H:%M:%S"))
        .ok()
}

fn fallback_tip_off() -> NaiveTime {
    NaiveTime::from_hms_opt(14, 0, 0).unwrap_or_default()
}

/// Cycle through a configured list by match index, or fall back when the
/// list is empty.
pub(crate) fn cycle<'a>(list: &'a [String], index: usize, default: &'a str) -> &'a str {
    if list.is_empty() {
        default
    } else {
        &list[index % list.len()]
    }
}

// ---------------------------------------------------------------------------
// Scheduling policy
// ---------------------------------------------------------------------------

/// Hook for schedule-shaping constraints (rest days, back-to-back avoidance,
/// home/away balancing). The settings carry the knobs; a policy decides what
/// to do with them after the base schedule exists.
pub trait SchedulingPolicy {
    fn apply(&self, fixtures: &mut Vec<GeneratedFixture>, settings: &FixtureSettings);
}

/// Accepts every generated fixture as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissivePolicy;

impl SchedulingPolicy for PermissivePolicy {
    fn apply(&self, _fixtures: &mut Vec<GeneratedFixture>, _settings: &FixtureSettings) {}
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    NotEnoughTeams { required: usize, got: usize },
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    InvalidTimeSlot(String),
    UnknownRound(u32),
    UnknownGame { round: u32, game: u32 },
    InvalidPairing(usize),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::NotEnoughTeams { required, got } => {
                write!(f, "at least {required} teams required, got {got}")
            }
            ScheduleError::InvalidDateRange { start, end } => {
                write!(f, "end date {end} is before start date {start}")
            }
            ScheduleError::InvalidTimeSlot(slot) => {
                write!(f, "time slot {slot:?} is not a valid HH:MM time")
            }
            ScheduleError::UnknownRound(round) => {
                write!(f, "bracket has no round {round}")
            }
            ScheduleError::UnknownGame { round, game } => {
                write!(f, "round {round} has no game {game}")
            }
            ScheduleError::InvalidPairing(index) => {
                write!(f, "fixture {index} does not reference two distinct teams")
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn settings() -> FixtureSettings {
        FixtureSettings {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            time_slots: vec!["14:00".into()],
            venues: vec!["Court 1".into()],
            rest_days: 0,
            double_round_robin: false,
            avoid_back_to_back: false,
            balance_home_away: false,
        }
    }

    #[test]
    fn valid_settings_pass_validation() {
        assert!(settings().validate().is_ok());
    }

    #[test]
    fn reversed_date_range_is_rejected() {
        let mut s = settings();
        s.end_date = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        assert!(matches!(s.validate(), Err(ScheduleError::InvalidDateRange { .. })));
    }

    #[test]
    fn garbage_time_slot_is_rejected() {
        let mut s = settings();
        s.time_slots.push("half past eight".into());
        assert_eq!(
            s.validate(),
            Err(ScheduleError::InvalidTimeSlot("half past eight".into()))
        );
    }

    #[test]
    fn scheduled_at_combines_date_and_slot() {
        let fixture = GeneratedFixture {
            round: 1,
            home_team_id: Some("t1".into()),
            away_team_id: Some("t2".into()),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            time: "19:30".into(),
            venue: "Court 1".into(),
            notes: None,
        };
        assert_eq!(fixture.scheduled_at().to_string(), "2025-01-01 19:30:00");
        assert!(fixture.to_new_match("lg1").scheduled_date.starts_with("2025-01-01T19:30:00"));
    }

    #[test]
    fn distinct_team_invariant() {
        let mut fixture = GeneratedFixture {
            round: 1,
            home_team_id: Some("t1".into()),
            away_team_id: Some("t2".into()),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            time: "14:00".into(),
            venue: "Court 1".into(),
            notes: None,
        };
        assert!(fixture.has_distinct_teams());

        fixture.away_team_id = Some("t1".into());
        assert!(!fixture.has_distinct_teams());

        fixture.home_team_id = None;
        assert!(!fixture.has_distinct_teams());

        fixture.away_team_id = None;
        assert!(fixture.has_distinct_teams(), "placeholder fixtures are allowed");
    }

    #[test]
    fn cycle_falls_back_when_list_is_empty() {
        let slots: Vec<String> = Vec::new();
        assert_eq!(cycle(&slots, 3, DEFAULT_TIME_SLOT), "14:00");
        let venues = vec!["Court 1".to_owned(), "Court 2".to_owned()];
        assert_eq!(cycle(&venues, 3, DEFAULT_VENUE), "Court 2");
    }
}
