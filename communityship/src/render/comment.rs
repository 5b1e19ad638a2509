use crate::{
    archive::RoundArchive,
    config::GameConfig,
    game::ShotOutcome,
    guard::{AttemptLog, IpTracking, Rejection},
    session::MoveReport,
};

/// Ship cells left at or below which players are told victory is near.
const ALERT_CELLS: usize = 3;

/// Streak at or above which a player is on fire.
const FIRE_STREAK: u32 = 3;

/// Comment posted after a move is played: the shot, any new badges, and a note about the
/// round.
pub fn move_comment(report: &MoveReport) -> String {
    let player = &report.player;
    let mut text = match &report.outcome {
        ShotOutcome::Miss => format!("🌊 `{}` is a **Miss** by @{}.", report.coord, player),
        ShotOutcome::Hit(ship) => format!(
            "💥 **Hit!** @{} struck the `{}`! ({}/{} damaged)",
            player,
            ship,
            report.ship_hits,
            report.ship_size
        ),
        ShotOutcome::Sunk(ship) | ShotOutcome::Victory(ship) => format!(
            "💥🔥 **SUNK!** @{} destroyed the `{}`! ({} cells) 🚢💀",
            player,
            ship.to_uppercase(),
            report.ship_size
        ),
    };
    if !report.new_badges.is_empty() {
        let badges: Vec<String> = report.new_badges.iter().map(|b| b.to_string()).collect();
        text.push_str("\n\n🏅 **New Achievements:** ");
        text.push_str(&badges.join(", "));
    }
    if report.remaining > 0 && report.remaining <= ALERT_CELLS {
        text.push_str(&format!(
            "\n\n⚠️ **ALERT:** Only **{}** ship cells remaining! Victory is near! 🎯",
            report.remaining
        ));
    } else if report.streak >= FIRE_STREAK {
        text.push_str(&format!(
            "\n\n🔥 **ON FIRE!** @{} has a **{}** hit streak! 🔥",
            player, report.streak
        ));
    }
    text
}

/// Comment posted when the winning shot lands.
pub fn game_over(player: &str) -> String {
    format!(
        "🎉🏆 **GAME OVER!** @{} has sunk all ships and **WON THE GAME**! 🎊👑",
        player
    )
}

/// Comment posted when a move is turned away.
pub fn rejection_comment(player: &str, rejection: &Rejection) -> String {
    match rejection {
        Rejection::Cooldown { .. } => format!("🛑 @{}, slow down! {} ⏰", player, rejection),
        Rejection::CellAlreadyPlayed { .. } => format!("🔄 ⚠️ {}", rejection),
        Rejection::RecentRepeat { .. } => format!("⚡ ⚠️ {}", rejection),
        Rejection::RateLimited { .. } => format!("🚫 ⚠️ {}", rejection),
        Rejection::Suspicious { .. } => format!("👥 ⚠️ {}", rejection),
    }
}

/// Comment posted when a player's moves walk straight across the board.
pub fn pattern_warning() -> &'static str {
    "⚠️ Pattern detected! Try mixing up your strategy 🎲"
}

/// Comment posted when the round is reset by hand.
pub fn reset_comment(archived: bool) -> &'static str {
    if archived {
        "🔄 Game has been reset! Ships repositioned, board cleared, leaderboard wiped, and round archived."
    } else {
        "🔄 Game has been reset! Ships repositioned, board cleared, and leaderboard wiped."
    }
}

/// One-line commit message describing a move.
pub fn commit_message(report: &MoveReport) -> String {
    if report.outcome.won() {
        format!("🏆 @{} won the game!", report.player)
    } else if report.outcome.is_hit() {
        format!("💥 @{}: {}", report.player, report.coord)
    } else {
        format!("🌊 @{}: {}", report.player, report.coord)
    }
}

/// Line added to the README round history for an archived round.
pub fn history_line(archive: &RoundArchive) -> String {
    let date = archive.timestamp().format("%Y-%m-%d");
    match archive.winner() {
        Some(winner) => format!(
            "- Round {:03} ({}): 🏆 Winner — `@{}`",
            archive.round(),
            date,
            winner
        ),
        None => format!("- Round {:03} ({}): No winner", archive.round(), date),
    }
}

/// Summary of rejected attempts for whoever looks after the game.
pub fn attempt_report(log: &AttemptLog) -> String {
    let mut text = format!(
        "📋 Duplicate Attempt Report\n\n**Total Attempts:** {}\n\n**By Type:**\n",
        log.len()
    );
    for (reason, count) in log.counts_by_reason() {
        text.push_str(&format!("- {}: {}\n", reason, count));
    }
    if !log.is_empty() {
        text.push_str("\n**Recent Attempts:**\n");
        for attempt in log.iter().rev().take(5) {
            text.push_str(&format!(
                "- @{}: {} ({})\n",
                attempt.username, attempt.coord, attempt.reason
            ));
        }
    }
    text
}

/// Hashed addresses with too many rejected moves or too many accounts behind them.
pub fn ip_report(tracking: &IpTracking, config: &GameConfig) -> String {
    let suspicious =
        tracking.suspicious(config.suspicious_ip_violations, config.suspicious_ip_users);
    let mut text = format!(
        "🔒 IP Security Report\n\n**Tracked IPs:** {}\n**Suspicious IPs:** {}\n",
        tracking.len(),
        suspicious.len()
    );
    for (hash, record) in suspicious {
        let users: Vec<&str> = record.users.iter().map(String::as_str).collect();
        text.push_str(&format!(
            "\n**IP:** {}\n- Users: {}\n- Violations: {}\n- Moves: {}\n- First seen: {}\n",
            hash,
            users.join(", "),
            record.violation_count,
            record.moves.len(),
            record.first_seen.format("%Y-%m-%d %H:%M UTC"),
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        board::Board,
        guard::{AttemptRecord, IpMove},
        history::ShotResult,
        history::MoveHistory,
        ships::ShipMap,
        stats::{Achievement, AchievementBook, Leaderboard},
    };

    fn report(outcome: ShotOutcome) -> MoveReport {
        MoveReport {
            player: "ann".into(),
            coord: "B4".parse().unwrap(),
            outcome,
            ship_hits: 0,
            ship_size: 0,
            streak: 0,
            new_badges: Vec::new(),
            warning: None,
            remaining: 10,
        }
    }

    #[test]
    fn miss_text() {
        let report = report(ShotOutcome::Miss);
        assert_eq!(move_comment(&report), "🌊 `B4` is a **Miss** by @ann.");
        assert_eq!(commit_message(&report), "🌊 @ann: B4");
    }

    #[test]
    fn hit_with_badges_and_streak() {
        let mut report = report(ShotOutcome::Hit("carrier".into()));
        report.ship_hits = 2;
        report.ship_size = 5;
        report.streak = 4;
        report.new_badges = vec![Achievement::FirstBlood, Achievement::ShipSinker];
        assert_eq!(
            move_comment(&report),
            "💥 **Hit!** @ann struck the `carrier`! (2/5 damaged)\
             \n\n🏅 **New Achievements:** ⚡ First Blood, 🚢 Ship Sinker\
             \n\n🔥 **ON FIRE!** @ann has a **4** hit streak! 🔥"
        );
        assert_eq!(commit_message(&report), "💥 @ann: B4");
    }

    #[test]
    fn alert_beats_streak() {
        let mut report = report(ShotOutcome::Sunk("patrol".into()));
        report.ship_size = 2;
        report.streak = 5;
        report.remaining = 3;
        let text = move_comment(&report);
        assert!(text.starts_with("💥🔥 **SUNK!** @ann destroyed the `PATROL`! (2 cells) 🚢💀"));
        assert!(text.contains("Only **3** ship cells remaining!"));
        assert!(!text.contains("ON FIRE"));
    }

    #[test]
    fn victory_commit_message() {
        let mut report = report(ShotOutcome::Victory("patrol".into()));
        report.remaining = 0;
        assert_eq!(commit_message(&report), "🏆 @ann won the game!");
        assert!(!move_comment(&report).contains("ALERT"));
        assert!(game_over("ann").contains("@ann has sunk all ships"));
    }

    #[test]
    fn cooldown_rejection_text() {
        let rejection = Rejection::Cooldown {
            hours: 1,
            minutes: 5,
        };
        assert_eq!(
            rejection_comment("ann", &rejection),
            "🛑 @ann, slow down! Cooldown active: 1h 5m remaining ⏰"
        );
    }

    #[test]
    fn history_lines() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let archive = |winner: Option<&str>| {
            RoundArchive::new(
                4,
                at,
                winner.map(str::to_owned),
                &Board::new(),
                &ShipMap::new(),
                &Leaderboard::new(),
                &MoveHistory::new(),
                &AchievementBook::new(),
            )
        };
        assert_eq!(
            history_line(&archive(Some("ann"))),
            "- Round 004 (2024-03-09): 🏆 Winner — `@ann`"
        );
        assert_eq!(
            history_line(&archive(None)),
            "- Round 004 (2024-03-09): No winner"
        );
    }

    #[test]
    fn report_counts_reasons() {
        let mut log = AttemptLog::new();
        let now = Utc::now();
        let coord = "C3".parse().unwrap();
        let spam = Rejection::RecentRepeat { coord, at: now };
        log.push(AttemptRecord::new("ann", coord, &spam, now), 100);
        log.push(AttemptRecord::new("bob", coord, &spam, now), 100);
        let text = attempt_report(&log);
        assert!(text.contains("**Total Attempts:** 2"));
        assert!(text.contains("- move_spam: 2\n"));
        assert!(text.contains("- @bob: C3 (move_spam)\n"));
        assert!(attempt_report(&AttemptLog::new()).contains("**Total Attempts:** 0"));
    }

    #[test]
    fn ip_report_lists_only_suspicious_addresses() {
        let config = GameConfig::default();
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let mut tracking = IpTracking::new();
        for user in &["ann", "bob", "cat", "dan"] {
            let seen = IpMove {
                username: (*user).into(),
                coord: "D4".parse().unwrap(),
                result: ShotResult::Miss,
                timestamp: at,
            };
            tracking.track_move("aaaa000011112222", seen, config.ip_move_limit);
        }
        for _ in 0..4 {
            tracking.record_violation("bbbb000011112222", at);
        }

        let text = ip_report(&tracking, &config);
        assert!(text.starts_with("🔒 IP Security Report"));
        assert!(text.contains("**Tracked IPs:** 2\n"));
        assert!(text.contains("**Suspicious IPs:** 1\n"));
        assert!(text.contains("**IP:** aaaa000011112222\n- Users: ann, bob, cat, dan\n"));
        assert!(text.contains("- Moves: 4\n- First seen: 2024-03-09 12:00 UTC\n"));
        assert!(!text.contains("bbbb"));

        tracking.record_violation("bbbb000011112222", at);
        let text = ip_report(&tracking, &config);
        assert!(text.contains("**IP:** bbbb000011112222\n- Users: \n- Violations: 5\n"));
    }
}
