mod config;
mod persist;
mod preview;
mod schedule;

use crate::persist::SaveReport;
use crate::schedule::knockout::{self, BracketDraft};
use crate::schedule::round_robin;
use anyhow::bail;
use league_api::client::LeagueApi;
use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let command = match parse_args(std::env::args().skip(1)) {
        Ok(Some(command)) => command,
        Ok(None) => return Ok(()),
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    let api = LeagueApi::from_env();
    match command {
        Command::Schedule(args) => run_schedule(&api, args).await,
        Command::Bracket(args) => run_bracket(&api, args).await,
    }
}

// ---------------------------------------------------------------------------
// Argument handling
// ---------------------------------------------------------------------------

enum Command {
    Schedule(ScheduleArgs),
    Bracket(BracketArgs),
}

struct ScheduleArgs {
    league: String,
    settings: PathBuf,
    save: bool,
}

struct BracketArgs {
    league: String,
    plan: PathBuf,
    seed: Option<u64>,
    save: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Command>, String> {
    let Some(first) = args.next() else {
        return Err("Missing command".to_owned());
    };

    match first.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            Ok(None)
        }
        "-V" | "--version" => {
            println!("hoopsched {}", env!("CARGO_PKG_VERSION"));
            Ok(None)
        }
        "schedule" => {
            let common = parse_flags(args, "--settings")?;
            Ok(Some(Command::Schedule(ScheduleArgs {
                league: common.league,
                settings: common.file,
                save: common.save,
            })))
        }
        "bracket" => {
            let common = parse_flags(args, "--plan")?;
            Ok(Some(Command::Bracket(BracketArgs {
                league: common.league,
                plan: common.file,
                seed: common.seed,
                save: common.save,
            })))
        }
        other => Err(format!("Unknown command: {other}")),
    }
}

struct CommonFlags {
    league: String,
    file: PathBuf,
    seed: Option<u64>,
    save: bool,
}

fn parse_flags(
    mut args: impl Iterator<Item = String>,
    file_flag: &str,
) -> Result<CommonFlags, String> {
    let mut league = None;
    let mut file = None;
    let mut seed = None;
    let mut save = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--league" => league = args.next(),
            flag if flag == file_flag => file = args.next().map(PathBuf::from),
            "--seed" => {
                let value = args.next().ok_or("--seed needs a value")?;
                seed = Some(value.parse().map_err(|_| format!("Invalid seed: {value}"))?);
            }
            "--save" => save = true,
            other => return Err(format!("Unknown argument: {other}")),
        }
    }

    Ok(CommonFlags {
        league: league.ok_or("--league <id> is required")?,
        file: file.ok_or_else(|| format!("{file_flag} <file.json> is required"))?,
        seed,
        save,
    })
}

fn usage_text() -> &'static str {
    "hoopsched - fixture & bracket generator for basketball leagues

Usage:
  hoopsched schedule --league <id> --settings <file.json> [--save]
  hoopsched bracket  --league <id> --plan <file.json> [--seed <n>] [--save]
  hoopsched --help | --version

Without --save both commands only print a preview; nothing is persisted.

Environment:
  LEAGUE_API_URL   Base URL of the league backend (default http://127.0.0.1:4000/api/v1)
  RUST_LOG         Log filter for env_logger, e.g. debug"
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn run_schedule(api: &LeagueApi, args: ScheduleArgs) -> anyhow::Result<()> {
    let settings = config::load_fixture_settings(&args.settings)?;
    let teams = api.fetch_teams(&args.league).await?;
    debug!("loaded {} teams for league {}", teams.len(), args.league);

    let fixtures = round_robin::generate(&teams, &settings)?;
    println!("Generated {} fixtures for {} teams:\n", fixtures.len(), teams.len());
    for line in preview::fixture_lines(&fixtures, &teams) {
        println!("{line}");
    }

    finish(api, &args.league, &fixtures, args.save).await
}

async fn run_bracket(api: &LeagueApi, args: BracketArgs) -> anyhow::Result<()> {
    let plan = config::load_bracket_plan(&args.plan)?;
    let teams = api.fetch_teams(&args.league).await?;
    let standings = api.fetch_standings(&args.league).await?;

    let entrants = knockout::select_entrants(&standings, &teams, plan.entrants);
    debug!("{} of {} teams qualify for the bracket", entrants.len(), teams.len());

    // --seed wins over the plan file so a run can be replayed exactly.
    let mut rng = match args.seed.or(plan.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let bracket = knockout::build_bracket(&entrants, &plan.settings, &mut rng)?;
    let draft = config::apply_stage_tweaks(BracketDraft::new(bracket), &plan.stages)?;

    for line in preview::bracket_lines(&draft.bracket) {
        println!("{line}");
    }

    let fixtures = draft.materialize();
    println!(
        "\n{} bracket matches to play, {} fixtures to schedule:\n",
        draft.bracket.total_matches,
        fixtures.len()
    );
    for line in preview::fixture_lines(&fixtures, &teams) {
        println!("{line}");
    }

    finish(api, &args.league, &fixtures, args.save).await
}

async fn finish(
    api: &LeagueApi,
    league_id: &str,
    fixtures: &[schedule::GeneratedFixture],
    save: bool,
) -> anyhow::Result<()> {
    if !save {
        println!("\nPreview only — re-run with --save to persist.");
        return Ok(());
    }

    let report = persist::save_fixtures(api, league_id, fixtures).await?;
    print_report(&report);
    if !report.all_ok() {
        bail!("{} of {} fixtures failed to save", report.failed.len(), fixtures.len());
    }
    Ok(())
}

fn print_report(report: &SaveReport) {
    println!("\nSaved {} fixtures.", report.created.len());
    for (index, message) in &report.failed {
        eprintln!("fixture #{index} failed: {message}");
    }
}
