pub mod client;
pub mod wire;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of the REST wire format
// ---------------------------------------------------------------------------

/// A registered team. Owned by the league administration backend; the
/// schedulers only ever read it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Team {
    pub id: String,
    pub name: String,       // "Northside Hawks"
    pub short_name: String, // "Hawks"
}

/// One row of the league table. Used solely to rank teams before knockout
/// bracket seeding.
#[derive(Debug, Clone, Default)]
pub struct Standing {
    pub team_id: String,
    pub position: u32,
    pub wins: u32,
    pub losses: u32,
    pub point_difference: i32,
    pub games_played: u32,
}

impl Standing {
    /// A team qualifies for knockout selection once it has actually played.
    pub fn is_qualified(&self) -> bool {
        self.games_played > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

/// Payload for creating one fixture. Both generators emit these; the backend
/// expects camelCase JSON.
///
/// Placeholder fixtures (third-place slots, unresolved later rounds) carry no
/// team ids — the backend fills them in once results exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    pub league_id: String,
    pub home_team_id: Option<String>,
    pub away_team_id: Option<String>,
    /// RFC 3339 timestamp of the scheduled tip-off.
    pub scheduled_date: String,
    pub venue: String,
    pub match_status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_notes: Option<String>,
}

impl NewMatch {
    pub fn is_placeholder(&self) -> bool {
        self.home_team_id.is_none() && self.away_team_id.is_none()
    }
}

/// Echo of a fixture the backend accepted, with its assigned id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedMatch {
    pub id: String,
    pub league_id: String,
    pub home_team_id: Option<String>,
    pub away_team_id: Option<String>,
    pub scheduled_date: String,
    pub venue: String,
    pub match_status: MatchStatus,
    pub match_notes: Option<String>,
}
