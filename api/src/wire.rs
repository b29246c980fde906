/// League backend raw wire types — serde shapes for deserializing REST
/// responses. These map to the clean domain types via the helpers in
/// client.rs.
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct TeamsResponse {
    #[serde(default)]
    pub teams: Vec<WireTeam>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireTeam {
    pub id: String,
    pub name: Option<String>,
    pub short_name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct StandingsResponse {
    #[serde(default)]
    pub standings: Vec<WireStanding>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireStanding {
    pub team_id: String,
    /// Absent while the backend is still computing the table.
    pub position: Option<u32>,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub point_difference: i32,
    #[serde(default)]
    pub games_played: u32,
}

/// Error body the backend sends with non-2xx responses.
#[derive(Debug, Deserialize, Default)]
pub struct WireError {
    #[serde(default)]
    pub message: String,
}
