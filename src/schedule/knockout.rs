use super::{BracketSettings, BracketType, GeneratedFixture, ScheduleError};
use chrono::{Duration, NaiveDate};
use league_api::{Standing, Team};
use log::warn;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Bracket model
// ---------------------------------------------------------------------------

/// One slot in the knockout bracket.
///
/// Slots beyond the first round carry no teams — the bracket pre-schedules
/// them and the backend fills them in as results come in. Winners are never
/// advanced here, not even for byes.
#[derive(Debug, Clone)]
pub struct BracketMatch {
    /// Bracket-wide series number, assigned in round-major order.
    pub match_number: u32,
    pub round: u32,
    pub team1: Option<Team>,
    pub team2: Option<Team>,
    pub winner_id: Option<String>,
    pub is_bye: bool,
    pub previous_match_1: Option<u32>,
    pub previous_match_2: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct BracketRound {
    /// 1-based.
    pub round_number: u32,
    pub name: String,
    pub matches: Vec<BracketMatch>,
}

#[derive(Debug, Clone)]
pub struct Bracket {
    pub rounds: Vec<BracketRound>,
    /// Slots that will actually be played — byes excluded.
    pub total_matches: u32,
    pub start_date: NaiveDate,
    pub venue: String,
    pub time_slot: String,
}

// ---------------------------------------------------------------------------
// Entrant selection & bracket construction
// ---------------------------------------------------------------------------

/// Pick the knockout entrants from the league table: qualified teams only
/// (at least one game played), ordered by position, truncated to `count`.
pub fn select_entrants(standings: &[Standing], teams: &[Team], count: usize) -> Vec<Team> {
    let by_id: HashMap<&str, &Team> = teams.iter().map(|t| (t.id.as_str(), t)).collect();

    let mut qualified: Vec<&Standing> = standings.iter().filter(|s| s.is_qualified()).collect();
    qualified.sort_by_key(|s| s.position);

    qualified
        .iter()
        .filter_map(|s| by_id.get(s.team_id.as_str()).map(|t| (*t).clone()))
        .take(count)
        .collect()
}

/// Build a single-elimination bracket for the selected teams.
///
/// Seeding is a uniform shuffle of the entrants — rank is deliberately not
/// preserved. When the team count is not a power of two, the first teams
/// after the shuffle receive byes until the first round fills the bracket.
pub fn build_bracket(
    selected: &[Team],
    settings: &BracketSettings,
    rng: &mut impl Rng,
) -> Result<Bracket, ScheduleError> {
    if selected.len() < 2 {
        return Err(ScheduleError::NotEnoughTeams { required: 2, got: selected.len() });
    }
    settings.validate()?;
    if settings.bracket_type == BracketType::DoubleElimination {
        warn!("double-elimination brackets are not implemented; generating single elimination");
    }

    let mut entrants: Vec<Team> = selected.to_vec();
    entrants.shuffle(rng);

    let count = entrants.len();
    let bracket_size = count.next_power_of_two();
    let byes = bracket_size - count;

    let mut match_number = 0u32;

    // First round: byes first, then the remaining teams paired in order.
    let mut first_round: Vec<BracketMatch> = Vec::with_capacity(bracket_size / 2);
    let mut entrants = entrants.into_iter();
    for _ in 0..byes {
        let team = entrants.next();
        match_number += 1;
        first_round.push(BracketMatch {
            match_number,
            round: 1,
            winner_id: team.as_ref().map(|t| t.id.clone()),
            team1: team,
            team2: None,
            is_bye: true,
            previous_match_1: None,
            previous_match_2: None,
        });
    }
    while let Some(team1) = entrants.next() {
        let team2 = entrants.next();
        match_number += 1;
        first_round.push(BracketMatch {
            match_number,
            round: 1,
            team1: Some(team1),
            team2,
            winner_id: None,
            is_bye: false,
            previous_match_1: None,
            previous_match_2: None,
        });
    }

    // Later rounds halve until a single match remains. Teams stay empty;
    // the previous-match numbers record where each slot's sides come from.
    let mut prev_numbers: Vec<u32> = first_round.iter().map(|m| m.match_number).collect();
    let mut rounds = vec![BracketRound { round_number: 1, name: String::new(), matches: first_round }];

    while prev_numbers.len() > 1 {
        let round_number = rounds.len() as u32 + 1;
        let mut matches = Vec::with_capacity(prev_numbers.len().div_ceil(2));
        for feeders in prev_numbers.chunks(2) {
            match_number += 1;
            matches.push(BracketMatch {
                match_number,
                round: round_number,
                team1: None,
                team2: None,
                winner_id: None,
                is_bye: false,
                previous_match_1: feeders.first().copied(),
                previous_match_2: feeders.get(1).copied(),
            });
        }
        prev_numbers = matches.iter().map(|m| m.match_number).collect();
        rounds.push(BracketRound { round_number, name: String::new(), matches });
    }

    for round in &mut rounds {
        round.name = round_name(round.round_number, round.matches.len(), bracket_size);
    }

    let total_matches =
        rounds.iter().flat_map(|r| &r.matches).filter(|m| !m.is_bye).count() as u32;

    Ok(Bracket {
        rounds,
        total_matches,
        start_date: settings.start_date,
        venue: settings.venue.clone(),
        time_slot: settings.time_slot.clone(),
    })
}

fn round_name(round_number: u32, match_count: usize, bracket_size: usize) -> String {
    match match_count {
        1 => "Final".to_owned(),
        2 => "Semi-Finals".to_owned(),
        _ if round_number == 1 => format!("Round of {bracket_size}"),
        _ => format!("Round {round_number}"),
    }
}

// ---------------------------------------------------------------------------
// Stage configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameTiming {
    /// 1-based game number within the series.
    pub game_number: u32,
    pub time: String,
    /// Days after the round's base date.
    pub date_offset: i64,
}

/// Per-round series configuration, user-editable between bracket preview and
/// save. `game_timings` always holds exactly `number_of_games` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageConfig {
    pub round_number: u32,
    pub stage_name: String,
    pub number_of_games: u32,
    pub include_third_place: bool,
    pub third_place_stage_name: String,
    pub third_place_games: u32,
    pub alternate_home_away: bool,
    pub game_timings: Vec<GameTiming>,
}

impl StageConfig {
    fn defaults_for(round: &BracketRound, time_slot: &str) -> Self {
        Self {
            round_number: round.round_number,
            stage_name: round.name.clone(),
            number_of_games: 1,
            include_third_place: false,
            third_place_stage_name: "Third Place".to_owned(),
            third_place_games: 1,
            alternate_home_away: false,
            game_timings: default_timings(1, time_slot),
        }
    }
}

fn default_timings(games: u32, time_slot: &str) -> Vec<GameTiming> {
    (1..=games)
        .map(|game_number| GameTiming {
            game_number,
            time: time_slot.to_owned(),
            date_offset: (game_number - 1) as i64,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Draft: bracket + stage configs, edited as a value
// ---------------------------------------------------------------------------

/// A bracket awaiting confirmation, together with its stage configuration.
/// Every edit returns a new draft; dropping a draft before save has no side
/// effects.
#[derive(Debug, Clone)]
pub struct BracketDraft {
    pub bracket: Bracket,
    pub stages: Vec<StageConfig>,
}

impl BracketDraft {
    pub fn new(bracket: Bracket) -> Self {
        let stages = bracket
            .rounds
            .iter()
            .map(|round| StageConfig::defaults_for(round, &bracket.time_slot))
            .collect();
        Self { bracket, stages }
    }

    fn stage_mut(&mut self, round: u32) -> Result<&mut StageConfig, ScheduleError> {
        self.stages
            .iter_mut()
            .find(|s| s.round_number == round)
            .ok_or(ScheduleError::UnknownRound(round))
    }

    fn round_match_count(&self, round: u32) -> usize {
        self.bracket
            .rounds
            .iter()
            .find(|r| r.round_number == round)
            .map(|r| r.matches.len())
            .unwrap_or(0)
    }

    pub fn with_stage_name(mut self, round: u32, name: &str) -> Result<Self, ScheduleError> {
        self.stage_mut(round)?.stage_name = name.to_owned();
        Ok(self)
    }

    /// Change a round's series length. Timings are regenerated to match,
    /// keeping entries whose game number survives the change. Freshly turning
    /// a single game into a series switches home/away alternation on.
    pub fn with_game_count(mut self, round: u32, games: u32) -> Result<Self, ScheduleError> {
        let time_slot = self.bracket.time_slot.clone();
        let stage = self.stage_mut(round)?;

        let was_single = stage.number_of_games <= 1;
        stage.number_of_games = games.max(1);

        let old = std::mem::take(&mut stage.game_timings);
        stage.game_timings = (1..=stage.number_of_games)
            .map(|game_number| {
                old.iter()
                    .find(|t| t.game_number == game_number)
                    .cloned()
                    .unwrap_or_else(|| GameTiming {
                        game_number,
                        time: time_slot.clone(),
                        date_offset: (game_number - 1) as i64,
                    })
            })
            .collect();

        if stage.number_of_games > 1 && was_single {
            stage.alternate_home_away = true;
        } else if stage.number_of_games == 1 {
            stage.alternate_home_away = false;
        }
        Ok(self)
    }

    pub fn with_alternation(mut self, round: u32, alternate: bool) -> Result<Self, ScheduleError> {
        self.stage_mut(round)?.alternate_home_away = alternate;
        Ok(self)
    }

    pub fn with_game_timing(mut self, round: u32, timing: GameTiming) -> Result<Self, ScheduleError> {
        let game = timing.game_number;
        let stage = self.stage_mut(round)?;
        let Some(slot) = stage.game_timings.iter_mut().find(|t| t.game_number == game) else {
            return Err(ScheduleError::UnknownGame { round, game });
        };
        *slot = timing;
        Ok(self)
    }

    /// Request a third-place series after the given round. The flag is
    /// recorded as-is; whether it has any effect is decided at save time
    /// (see [`materialize`](Self::materialize)).
    pub fn with_third_place(mut self, round: u32, games: u32) -> Result<Self, ScheduleError> {
        let stage = self.stage_mut(round)?;
        stage.include_third_place = true;
        stage.third_place_games = games.max(1);
        Ok(self)
    }

    /// A third-place series only applies after a genuine semifinal: a round
    /// of exactly two matches in a bracket deep enough that the two-match
    /// round is not itself the opener of a final-only bracket.
    fn third_place_applies(&self, stage: &StageConfig) -> bool {
        stage.include_third_place
            && self.bracket.rounds.len() > 2
            && self.round_match_count(stage.round_number) == 2
    }

    /// Number of fixture records a save would create.
    pub fn total_games(&self) -> u32 {
        self.bracket
            .rounds
            .iter()
            .zip(&self.stages)
            .map(|(round, stage)| {
                let playable = round.matches.iter().filter(|m| !m.is_bye).count() as u32;
                let third_place = if self.third_place_applies(stage) {
                    stage.third_place_games
                } else {
                    0
                };
                playable * stage.number_of_games + third_place
            })
            .sum()
    }

    /// Convert the draft into fixture records, round by round.
    ///
    /// Byes produce nothing. Every non-bye slot expands into its round's
    /// series length; series within one round share the same base date and
    /// spread their games via the configured per-game day offsets. After a
    /// round, the date cursor moves past its widest offset, plus a rest day
    /// before the next round.
    pub fn materialize(&self) -> Vec<GeneratedFixture> {
        let mut fixtures = Vec::with_capacity(self.total_games() as usize);
        let mut day_cursor: i64 = 0;

        for (round, stage) in self.bracket.rounds.iter().zip(&self.stages) {
            let window = stage.game_timings.iter().map(|t| t.date_offset).max().unwrap_or(0);

            for slot in round.matches.iter().filter(|m| !m.is_bye) {
                for timing in &stage.game_timings {
                    let swap = stage.alternate_home_away
                        && stage.number_of_games > 1
                        && timing.game_number % 2 == 0;
                    let (home, away) =
                        if swap { (&slot.team2, &slot.team1) } else { (&slot.team1, &slot.team2) };

                    fixtures.push(GeneratedFixture {
                        round: round.round_number,
                        home_team_id: home.as_ref().map(|t| t.id.clone()),
                        away_team_id: away.as_ref().map(|t| t.id.clone()),
                        date: self.bracket.start_date
                            + Duration::days(day_cursor + timing.date_offset),
                        time: timing.time.clone(),
                        venue: self.bracket.venue.clone(),
                        notes: Some(series_notes(
                            stage,
                            slot.match_number,
                            timing.game_number,
                            home.as_ref(),
                        )),
                    });
                }
            }
            day_cursor += window + 1;

            if self.third_place_applies(stage) {
                for game in 1..=stage.third_place_games {
                    fixtures.push(GeneratedFixture {
                        round: round.round_number,
                        home_team_id: None,
                        away_team_id: None,
                        date: self.bracket.start_date
                            + Duration::days(day_cursor + (game - 1) as i64),
                        time: self.bracket.time_slot.clone(),
                        venue: self.bracket.venue.clone(),
                        notes: Some(format!(
                            "Knockout Bracket - {} - Game {} of {}",
                            stage.third_place_stage_name, game, stage.third_place_games
                        )),
                    });
                }
                day_cursor += stage.third_place_games as i64;
            }

            // Rest day between rounds.
            day_cursor += 1;
        }

        fixtures
    }
}

fn series_notes(
    stage: &StageConfig,
    match_number: u32,
    game_number: u32,
    home_team: Option<&Team>,
) -> String {
    let mut notes = format!(
        "Knockout Bracket - {} - Series {}, Game {} of {}",
        stage.stage_name, match_number, game_number, stage.number_of_games
    );
    if stage.alternate_home_away && stage.number_of_games > 1
        && let Some(team) = home_team
    {
        notes.push_str(&format!(" (Home: {})", team.name));
    }
    notes
}
