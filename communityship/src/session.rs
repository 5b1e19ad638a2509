//! The full state of the game and the steps that move it forward.

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;

use crate::{
    archive::RoundArchive,
    board::{Board, Coordinate, Mark, ShotError},
    config::GameConfig,
    game::{self, ShotOutcome},
    guard::{
        self, Attempt, AttemptLog, AttemptRecord, IpMove, IpTracking, PatternWarning, Rejection,
    },
    history::{MoveHistory, MoveRecord},
    ships::{generate_ships, FleetError, PlacementError, ShipMap},
    stats::{self, Achievement, AchievementBook, AllTimeLeaderboard, Leaderboard, PlayerBadges},
    store::{StateStore, StoreError},
};

/// Error returned when a move can't be played.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum MoveError {
    /// One of the abuse checks turned the move away.
    #[error(transparent)]
    Rejected(#[from] Rejection),
    /// The shot itself was invalid.
    #[error(transparent)]
    Shot(#[from] ShotError),
    /// No ships have been placed yet.
    #[error("no ships have been placed; reset the game first")]
    NotInitialized,
    /// The stored ships don't match the configured fleet.
    #[error("stored ships are corrupt: {0}")]
    CorruptFleet(#[from] FleetError),
}

/// Board inconsistency found when checking loaded state.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum IntegrityError {
    /// A cell is marked as a hit but no ship sits there.
    #[error("`{0}` is marked as a hit but holds no ship")]
    StrayHit(Coordinate),
}

/// Error closing out a round.
#[derive(Debug, Error)]
pub enum RoundError {
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a move that was played.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MoveReport {
    /// Login of the player who fired.
    pub player: String,
    /// Cell that was fired at.
    pub coord: Coordinate,
    pub outcome: ShotOutcome,
    /// Cells of the ship that was hit that are now hit, zero on a miss.
    pub ship_hits: usize,
    /// Size of the ship that was hit, zero on a miss.
    pub ship_size: usize,
    /// The player's hit streak after this move.
    pub streak: u32,
    /// Badges unlocked by this move, in display order.
    pub new_badges: Vec<Achievement>,
    /// Set if the player's recent moves look scripted.
    pub warning: Option<PatternWarning>,
    /// Ship cells still afloat.
    pub remaining: usize,
}

/// Everything that is persisted between moves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameState {
    pub board: Board,
    pub ships: ShipMap,
    /// Player records for the current round.
    pub leaderboard: Leaderboard,
    /// Player records over every round.
    pub all_time: AllTimeLeaderboard,
    pub history: MoveHistory,
    pub achievements: AchievementBook,
    /// Rejected move attempts.
    pub attempts: AttemptLog,
    /// Moves and rejections per hashed address.
    pub ip_tracking: IpTracking,
}

impl GameState {
    /// Start a fresh round with the given ships.
    pub fn new(ships: ShipMap) -> Self {
        Self {
            ships,
            ..Self::default()
        }
    }

    /// Play a move for `player`. A rejected move is recorded in the attempt log but
    /// otherwise leaves the state untouched. Stored ships that don't form the configured
    /// fleet are refused before any check runs.
    pub fn play_move(
        &mut self,
        player: &str,
        coord: Coordinate,
        now: DateTime<Utc>,
        config: &GameConfig,
    ) -> Result<MoveReport, MoveError> {
        self.play_move_from(player, None, coord, now, config)
    }

    /// Like [`play_move`](Self::play_move), also tracking the address the move came from.
    /// Only the hash of `ip` is kept. A rejection counts as a violation for the address.
    pub fn play_move_from(
        &mut self,
        player: &str,
        ip: Option<&str>,
        coord: Coordinate,
        now: DateTime<Utc>,
        config: &GameConfig,
    ) -> Result<MoveReport, MoveError> {
        let ip_hash = ip.map(guard::hash_ip);
        if self.ships.is_empty() {
            return Err(MoveError::NotInitialized);
        }
        self.ships.validate(&config.fleet)?;
        let attempt = Attempt { player, coord, now };
        if let Err(rejection) = guard::check_move(
            &self.board,
            &self.history,
            self.leaderboard.get(player),
            self.all_time.get(player),
            attempt,
            config,
        ) {
            log::warn!("rejected {} from @{}: {}", coord, player, rejection.tag());
            self.attempts.push(
                AttemptRecord::new(player, coord, &rejection, now),
                config.attempt_log_limit,
            );
            if let Some(hash) = &ip_hash {
                self.ip_tracking.record_violation(hash, now);
            }
            return Err(rejection.into());
        }

        let warning = guard::detect_pattern(&self.history, player, config.pattern_threshold);
        if warning.is_some() {
            log::warn!("@{} is walking a straight line", player);
        }

        let outcome = game::resolve(&mut self.board, &self.ships, coord)?;
        let record =
            stats::apply_result(&mut self.leaderboard, &mut self.all_time, player, &outcome, now)
                .clone();
        let entry = MoveRecord::new(player, coord, &outcome, now);
        if let Some(hash) = &ip_hash {
            let seen = IpMove {
                username: entry.username.clone(),
                coord,
                result: entry.result,
                timestamp: now,
            };
            self.ip_tracking.track_move(hash, seen, config.ip_move_limit);
        }
        self.history.push(entry, config.history_limit);

        let badges = &mut self
            .achievements
            .entry(player.to_owned())
            .or_insert_with(|| PlayerBadges::new(player))
            .badges;
        let earned = stats::check_achievements(&record, outcome.won(), badges.flags());
        let new_badges = badges.unlock(earned);

        let (ship_hits, ship_size) = match outcome.ship() {
            Some(ship) => (
                game::hits_on(&self.board, &self.ships, ship),
                self.ships.ship_size(ship),
            ),
            None => (0, 0),
        };
        let remaining = game::remaining_ship_cells(&self.board, &self.ships);
        log::info!(
            "@{} fired at {}: {:?}, {} ship cells left",
            player,
            coord,
            outcome,
            remaining
        );
        Ok(MoveReport {
            player: player.to_owned(),
            coord,
            outcome,
            ship_hits,
            ship_size,
            streak: record.streak,
            new_badges,
            warning,
            remaining,
        })
    }

    /// Returns true if every ship cell has been hit.
    pub fn is_won(&self) -> bool {
        game::is_game_won(&self.board, &self.ships)
    }

    /// Player who fired the winning shot, if the round is won.
    pub fn winner(&self) -> Option<&str> {
        if !self.is_won() {
            return None;
        }
        self.history
            .iter()
            .rev()
            .find(|m| self.ships.contains(&m.coord))
            .map(|m| m.username.as_str())
    }

    /// Snapshot the current round.
    pub fn archive_round(
        &self,
        round: u32,
        winner: Option<String>,
        now: DateTime<Utc>,
    ) -> RoundArchive {
        RoundArchive::new(
            round,
            now,
            winner,
            &self.board,
            &self.ships,
            &self.leaderboard,
            &self.history,
            &self.achievements,
        )
    }

    /// Start a new round with the given ships. Lifetime records, badges, the attempt log
    /// and address tracking are kept.
    pub fn reset(&mut self, ships: ShipMap) {
        self.board = Board::new();
        self.ships = ships;
        self.leaderboard.clear();
        self.history.clear();
        log::info!("round reset with {} ship cells", self.ships.len());
    }

    /// Check that every hit on the board lies on a ship.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        match self
            .board
            .cells_marked(Mark::Hit)
            .find(|c| !self.ships.contains(c))
        {
            Some(coord) => Err(IntegrityError::StrayHit(coord)),
            None => Ok(()),
        }
    }
}

/// Archive the round in progress and start a new one. The new ships are placed first, so
/// a placement failure leaves both the store and the state untouched.
pub fn close_round<S, R>(
    store: &mut S,
    state: &mut GameState,
    winner: Option<String>,
    now: DateTime<Utc>,
    rng: &mut R,
    config: &GameConfig,
) -> Result<RoundArchive, RoundError>
where
    S: StateStore + ?Sized,
    R: Rng + ?Sized,
{
    let ships = generate_ships(rng, &config.fleet, config.placement_attempts)?;
    let round = store.round_count()? + 1;
    let archive = state.archive_round(round, winner, now);
    store.write_round(&archive)?;
    state.reset(ships);
    Ok(archive)
}

/// Start a new round without archiving the current one.
pub fn new_round<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
    config: &GameConfig,
) -> Result<(), PlacementError> {
    let ships = generate_ships(rng, &config.fleet, config.placement_attempts)?;
    state.reset(ships);
    Ok(())
}
