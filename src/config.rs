use crate::schedule::knockout::{BracketDraft, GameTiming};
use crate::schedule::{BracketSettings, FixtureSettings, ScheduleError};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Load and validate round-robin settings from a JSON file.
pub fn load_fixture_settings(path: &Path) -> Result<FixtureSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let settings: FixtureSettings = serde_json::from_str(&content)
        .with_context(|| format!("invalid fixture settings in {}", path.display()))?;
    settings.validate()?;
    Ok(settings)
}

/// Load and validate a knockout plan from a JSON file.
pub fn load_bracket_plan(path: &Path) -> Result<BracketPlan> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let plan: BracketPlan = serde_json::from_str(&content)
        .with_context(|| format!("invalid bracket plan in {}", path.display()))?;
    plan.settings.validate()?;
    Ok(plan)
}

/// A knockout plan file: bracket settings, how many entrants to take from
/// the standings, an optional shuffle seed, and per-round stage tweaks.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketPlan {
    pub settings: BracketSettings,
    pub entrants: usize,
    pub seed: Option<u64>,
    #[serde(default)]
    pub stages: Vec<StageTweak>,
}

/// One round's overrides on top of the generated defaults. Absent fields
/// leave the default alone.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTweak {
    pub round_number: u32,
    pub stage_name: Option<String>,
    pub number_of_games: Option<u32>,
    pub alternate_home_away: Option<bool>,
    #[serde(default)]
    pub include_third_place: bool,
    pub third_place_games: Option<u32>,
    #[serde(default)]
    pub game_timings: Vec<TimingTweak>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingTweak {
    pub game_number: u32,
    pub time: Option<String>,
    pub date_offset: Option<i64>,
}

/// Apply a plan's stage tweaks to a freshly built draft.
///
/// Game-count changes run before timing edits so a tweak can grow a series
/// and adjust the new games in the same block.
pub fn apply_stage_tweaks(
    mut draft: BracketDraft,
    tweaks: &[StageTweak],
) -> Result<BracketDraft, ScheduleError> {
    for tweak in tweaks {
        let round = tweak.round_number;
        if !draft.stages.iter().any(|s| s.round_number == round) {
            return Err(ScheduleError::UnknownRound(round));
        }

        if let Some(games) = tweak.number_of_games {
            draft = draft.with_game_count(round, games)?;
        }
        if let Some(name) = &tweak.stage_name {
            draft = draft.with_stage_name(round, name)?;
        }
        if let Some(alternate) = tweak.alternate_home_away {
            draft = draft.with_alternation(round, alternate)?;
        }
        if tweak.include_third_place {
            draft = draft.with_third_place(round, tweak.third_place_games.unwrap_or(1))?;
        }
        for timing in &tweak.game_timings {
            let current = draft
                .stages
                .iter()
                .find(|s| s.round_number == round)
                .and_then(|s| s.game_timings.iter().find(|t| t.game_number == timing.game_number))
                .cloned()
                .ok_or(ScheduleError::UnknownGame { round, game: timing.game_number })?;
            draft = draft.with_game_timing(
                round,
                GameTiming {
                    game_number: timing.game_number,
                    time: timing.time.clone().unwrap_or(current.time),
                    date_offset: timing.date_offset.unwrap_or(current.date_offset),
                },
            )?;
        }
    }
    Ok(draft)
}
