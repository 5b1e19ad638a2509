use std::{fs, path::Path, process};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use rand::Rng;

use communityship::{
    archive::RoundArchive,
    board::Coordinate,
    command::parse_move,
    config::GameConfig,
    guard::Rejection,
    render,
    session::{self, GameState, MoveError, MoveReport},
    store::{FileStore, StateStore},
};

mod logger;

fn main() {
    let matches = App::new("shipbot")
        .version("0.1.0")
        .author("Zachary Stewart <zachary@zstewart.com>")
        .about("Plays moves in the community Battleship game and keeps its state and README up to date.")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("state")
                .long("state")
                .value_name("DIR")
                .help("directory holding the game state")
                .takes_value(true)
                .default_value("."),
        )
        .arg(
            Arg::with_name("config")
                .long("config")
                .value_name("FILE")
                .help("TOML file overriding the game rules")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("log more detail to stderr, repeat for more"),
        )
        .subcommand(
            SubCommand::with_name("move")
                .about("Play the move named in an issue")
                .arg(
                    Arg::with_name("player")
                        .long("player")
                        .value_name("LOGIN")
                        .help("login of the player who opened the issue")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("title")
                        .long("title")
                        .value_name("TEXT")
                        .help("issue title")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("body")
                        .long("body")
                        .value_name("TEXT")
                        .help("issue body")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("ip")
                        .long("ip")
                        .value_name("ADDR")
                        .help("address the move came from, stored only as a hash")
                        .takes_value(true),
                )
                .arg(readme_arg())
                .arg(
                    Arg::with_name("commit_message")
                        .long("commit-message")
                        .value_name("FILE")
                        .help("write a one-line commit message to this file")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("reset")
                .about("Hide a new fleet and clear the round without archiving it")
                .arg(readme_arg()),
        )
        .subcommand(
            SubCommand::with_name("archive")
                .about("Archive the round in progress and start a new one")
                .arg(readme_arg()),
        )
        .subcommand(
            SubCommand::with_name("report")
                .about("Summarize rejected moves, suspicious addresses and past rounds"),
        )
        .get_matches();

    logger::init(matches.occurrences_of("verbose"));

    let code = match run(&matches) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:?}", e);
            println!("❌ ERROR: {:#}", e);
            1
        }
    };
    process::exit(code);
}

fn readme_arg() -> Arg<'static, 'static> {
    Arg::with_name("readme")
        .long("readme")
        .value_name("FILE")
        .help("README to redraw after the change")
        .takes_value(true)
}

/// Run the chosen subcommand, returning the exit code.
fn run(matches: &ArgMatches) -> Result<i32> {
    let config = match matches.value_of("config") {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => GameConfig::default(),
    };
    let mut store = FileStore::new(matches.value_of("state").unwrap_or("."));

    match matches.subcommand() {
        ("move", Some(sub)) => play(sub, &mut store, &config),
        ("reset", Some(sub)) => reset(sub, &mut store, &config),
        ("archive", Some(sub)) => archive(sub, &mut store, &config),
        ("report", Some(_)) => report(&store, &config),
        _ => unreachable!(),
    }
}

/// What happened to a move.
enum Turn {
    Played {
        report: MoveReport,
        integrity: Option<String>,
    },
    Rejected(Rejection),
}

fn play(matches: &ArgMatches, store: &mut FileStore, config: &GameConfig) -> Result<i32> {
    let player = matches.value_of("player").unwrap_or_default();
    let title = matches.value_of("title").unwrap_or_default();
    let body = matches.value_of("body").unwrap_or_default();
    let ip = matches.value_of("ip");

    let coord = match parse_move(title, body) {
        Ok(coord) => coord,
        Err(e) => {
            log::warn!("no usable move from @{}: {}", player, e);
            println!("❌ {}", e);
            return Ok(1);
        }
    };

    let now = Utc::now();
    let (turn, mut state) = take_turn(store, player, ip, coord, now, config)?;
    let (report, integrity) = match turn {
        Turn::Rejected(rejection) => {
            println!("{}", render::rejection_comment(player, &rejection));
            return Ok(0);
        }
        Turn::Played { report, integrity } => (report, integrity),
    };

    let mut code = 0;
    let mut comment = Vec::new();
    if report.warning.is_some() {
        comment.push(render::pattern_warning().to_owned());
    }
    comment.push(render::move_comment(&report));
    let mut history = None;
    if report.outcome.won() {
        comment.push(render::game_over(player));
        match finish_round(store, player, now, &mut rand::thread_rng(), config) {
            Ok(Some((archive, next))) => {
                history = Some(render::history_line(&archive));
                state = next;
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("{:?}", e);
                comment.push(format!(
                    "⚠️ The winning move was saved but the round could not be archived: {:#}",
                    e
                ));
                code = 1;
            }
        }
    }
    comment.extend(integrity);
    println!("{}", comment.join("\n\n"));

    if let Some(path) = matches.value_of("readme") {
        update_readme(Path::new(path), &state, config, history.as_deref());
    }
    if let Some(path) = matches.value_of("commit_message") {
        if let Err(e) = fs::write(path, render::commit_message(&report)) {
            log::warn!("failed to write commit message to {}: {}", path, e);
        }
    }
    Ok(code)
}

/// Play or reject the move and save the result. A winning move is saved here too, before
/// any attempt to close the round.
fn take_turn(
    store: &mut FileStore,
    player: &str,
    ip: Option<&str>,
    coord: Coordinate,
    now: DateTime<Utc>,
    config: &GameConfig,
) -> Result<(Turn, GameState)> {
    store.update(|_, state| -> Result<(Turn, GameState)> {
        let integrity = state
            .check_integrity()
            .err()
            .map(|e| format!("⚠️ Board integrity warning: {}. Please report this.", e));
        let turn = match state.play_move_from(player, ip, coord, now, config) {
            Ok(report) => Turn::Played { report, integrity },
            Err(MoveError::Rejected(rejection)) => Turn::Rejected(rejection),
            Err(e) => return Err(e.into()),
        };
        Ok((turn, state.clone()))
    })
}

/// Archive a won round and start the next one, as a separate update from the winning
/// move. Returns `None` if the round is no longer won, e.g. another run closed it first.
fn finish_round<R: Rng + ?Sized>(
    store: &mut FileStore,
    winner: &str,
    now: DateTime<Utc>,
    rng: &mut R,
    config: &GameConfig,
) -> Result<Option<(RoundArchive, GameState)>> {
    store.update(|store, state| -> Result<Option<(RoundArchive, GameState)>> {
        if !state.is_won() {
            log::info!("round was already closed, nothing to archive");
            return Ok(None);
        }
        let archive =
            session::close_round(store, state, Some(winner.to_owned()), now, rng, config)?;
        log::info!("archived round {} won by @{}", archive.round(), winner);
        Ok(Some((archive, state.clone())))
    })
}

fn reset(matches: &ArgMatches, store: &mut FileStore, config: &GameConfig) -> Result<i32> {
    let mut rng = rand::thread_rng();
    let state = store.update(|_, state| -> Result<GameState> {
        session::new_round(state, &mut rng, config)?;
        Ok(state.clone())
    })?;
    if let Some(path) = matches.value_of("readme") {
        update_readme(Path::new(path), &state, config, None);
    }
    println!("{}", render::reset_comment(false));
    Ok(0)
}

fn archive(matches: &ArgMatches, store: &mut FileStore, config: &GameConfig) -> Result<i32> {
    let now = Utc::now();
    let mut rng = rand::thread_rng();
    let (archive, state) = store.update(|store, state| -> Result<(RoundArchive, GameState)> {
        let winner = state.winner().map(str::to_owned);
        let archive = session::close_round(store, state, winner, now, &mut rng, config)?;
        Ok((archive, state.clone()))
    })?;
    let line = render::history_line(&archive);
    if let Some(path) = matches.value_of("readme") {
        update_readme(Path::new(path), &state, config, Some(&line));
    }
    println!("{}\n\n{}", render::reset_comment(true), line);
    Ok(0)
}

fn report(store: &FileStore, config: &GameConfig) -> Result<i32> {
    let state = store.load()?;
    let rounds = store.rounds()?;
    println!("{}", render::attempt_report(&state.attempts));
    println!("{}", render::ip_report(&state.ip_tracking, config));
    println!("**Board Checksum:** `{}`\n", state.board.checksum());
    println!("**Rounds Archived:** {}", rounds.len());
    for round in rounds.iter().rev() {
        println!("{}", render::history_line(round));
        if !round.is_intact() {
            log::warn!("round {} no longer matches its checksum", round.round());
            println!(
                "⚠️ Round {} board does not match checksum `{}`",
                round.round(),
                round.board_checksum()
            );
        }
    }
    Ok(0)
}

/// Redraw the README. Failures are only logged, the game state is already saved.
fn update_readme(path: &Path, state: &GameState, config: &GameConfig, history: Option<&str>) {
    let result = fs::read_to_string(path).and_then(|doc| {
        let mut doc = render::render_readme(&doc, state, &config.fleet);
        if let Some(line) = history {
            doc = render::prepend_to_section(&doc, "HISTORY", line);
        }
        fs::write(path, doc)
    });
    match result {
        Ok(()) => log::info!("updated {}", path.display()),
        Err(e) => log::warn!("failed to update README {}: {}", path.display(), e),
    }
}
