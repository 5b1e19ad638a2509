use std::{cmp::Ordering, fmt};

use crate::{
    board::{Board, Coordinate, Mark, COLS},
    game::{self, ShipStatus},
    history::{MoveHistory, ShotResult},
    render::update_section,
    session::GameState,
    ships::ShipSpec,
    stats::{AchievementBook, AllTimeLeaderboard, Leaderboard, PlayerRecord},
};

/// Number of moves listed under recent moves.
const RECENT_MOVES: usize = 10;

/// Number of badges shown next to a player on the leaderboard.
const SHOWN_BADGES: usize = 3;

/// Markdown table of the board.
pub struct BoardTable<'a>(pub &'a Board);

impl fmt::Display for BoardTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "|   |")?;
        for col in 1..=COLS {
            write!(f, " {} |", col)?;
        }
        writeln!(f)?;
        writeln!(f, "|---|{}", "---|".repeat(COLS))?;
        for (row, cells) in self.0.iter_rows().enumerate() {
            let label = Coordinate::label_for_row(row).unwrap_or('?');
            write!(f, "| {} |", label)?;
            for (_, mark) in cells {
                let icon = match mark {
                    Mark::Hit => "💥",
                    Mark::Miss => "🌊",
                    Mark::Revealed => "🚢",
                    Mark::Empty => "⬜",
                };
                write!(f, " {} |", icon)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Emoji drawn next to a ship in the fleet status.
fn ship_emoji(name: &str) -> &'static str {
    match name {
        "carrier" => "🛳️",
        "battleship" => "⚓",
        "submarine" => "🔱",
        "destroyer" => "⛴️",
        "patrol" => "🛥️",
        _ => "🚢",
    }
}

/// Damage report for every ship in the fleet.
pub struct FleetStatus<'a>(pub &'a [ShipStatus]);

impl fmt::Display for FleetStatus<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "### 🚢 Fleet Status")?;
        writeln!(f)?;
        for ship in self.0 {
            write!(
                f,
                "- {} **{}** ({} cells): ",
                ship_emoji(&ship.name),
                ship.name.to_uppercase(),
                ship.size
            )?;
            if ship.sunk() {
                writeln!(f, "💀 **SUNK**")?;
            } else if ship.damaged() {
                writeln!(f, "🔥 **{}/{}** damaged", ship.hits, ship.size)?;
            } else {
                writeln!(f, "✅ Afloat")?;
            }
        }
        Ok(())
    }
}

/// Totals for the round in progress.
pub struct GameStats<'a>(pub &'a GameState);

impl fmt::Display for GameStats<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.0;
        let remaining = game::remaining_ship_cells(&state.board, &state.ships);
        let hits = state.board.count(Mark::Hit);
        let misses = state.board.count(Mark::Miss);
        let total = hits + misses;
        let accuracy = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64 * 100.0
        };
        writeln!(f, "### 📊 Game Statistics")?;
        writeln!(f)?;
        writeln!(
            f,
            "- 🎯 **Ship Cells Remaining:** {}/{}",
            remaining,
            state.ships.len()
        )?;
        writeln!(f, "- 🎲 **Total Moves:** {}", total)?;
        writeln!(f, "- 💥 **Total Hits:** {}", hits)?;
        writeln!(f, "- 🌊 **Total Misses:** {}", misses)?;
        writeln!(f, "- 📈 **Community Accuracy:** {:.1}%", accuracy)?;
        writeln!(f, "- 👥 **Active Players:** {}", state.leaderboard.len())
    }
}

/// The latest moves, newest first.
pub struct RecentMoves<'a>(pub &'a MoveHistory);

impl fmt::Display for RecentMoves<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "### 📜 Recent Moves")?;
        writeln!(f)?;
        if self.0.is_empty() {
            return writeln!(f, "*No moves yet! Be the first to fire!*");
        }
        for entry in self.0.recent(RECENT_MOVES).rev() {
            let (icon, result) = match entry.result {
                ShotResult::Hit => ("💥", "Hit"),
                ShotResult::Miss => ("🌊", "Miss"),
            };
            write!(
                f,
                "- {} @{}: `{}` - {}",
                icon, entry.username, entry.coord, result
            )?;
            if let Some(ref ship) = entry.ship {
                write!(f, " ({})", ship)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Rank shown in a leaderboard row. The top three get the given medals.
fn rank(position: usize, medals: [&'static str; 3]) -> String {
    medals
        .get(position)
        .map(|m| (*m).to_owned())
        .unwrap_or_else(|| (position + 1).to_string())
}

/// Players of the current round, best first.
pub fn ranked(leaderboard: &Leaderboard) -> Vec<&PlayerRecord> {
    let mut players: Vec<&PlayerRecord> = leaderboard.values().collect();
    players.sort_by(|a, b| {
        b.hits
            .cmp(&a.hits)
            .then_with(|| {
                b.accuracy
                    .partial_cmp(&a.accuracy)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| b.ships_sunk.cmp(&a.ships_sunk))
    });
    players
}

/// Leaderboard for the current round.
pub struct LeaderboardTable<'a> {
    pub leaderboard: &'a Leaderboard,
    pub achievements: &'a AchievementBook,
}

impl fmt::Display for LeaderboardTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "| Rank | Player | 🖼️ Avatar | 🏹 Hits | 💦 Misses | 🎯 Accuracy | 🔥 Streak | 🚢 Sunk |"
        )?;
        writeln!(
            f,
            "|------|--------|-----------|----------|------------|--------------|------------|----------|"
        )?;
        if self.leaderboard.is_empty() {
            return writeln!(f, "| - | *No players yet* | - | - | - | - | - | - |");
        }
        for (i, player) in ranked(self.leaderboard).into_iter().enumerate() {
            let badges: Vec<String> = self
                .achievements
                .get(&player.username)
                .map(|a| {
                    a.badges
                        .iter()
                        .take(SHOWN_BADGES)
                        .map(|b| b.to_string())
                        .collect()
                })
                .unwrap_or_default();
            let mut name = format!("@{}", player.username);
            if !badges.is_empty() {
                name.push(' ');
                name.push_str(&badges.join(" "));
            }
            writeln!(
                f,
                "| {} | {} | <img src='https://github.com/{}.png' width='32' height='32'> | {} | {} | {} | {} | {} |",
                rank(i, ["🥇", "🥈", "🥉"]),
                name,
                player.username,
                player.hits,
                player.misses,
                player.accuracy,
                player.streak,
                player.ships_sunk
            )?;
        }
        Ok(())
    }
}

/// Leaderboard over every round.
pub struct AllTimeTable<'a>(pub &'a AllTimeLeaderboard);

impl fmt::Display for AllTimeTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "| Rank | Player | 🏹 Total Hits | 🏆 Wins | 🎮 Games | 🔥 Best Streak | 🚢 Ships Sunk |"
        )?;
        writeln!(
            f,
            "|------|--------|---------------|---------|----------|----------------|----------------|"
        )?;
        if self.0.is_empty() {
            return writeln!(f, "| - | *No players yet* | - | - | - | - | - |");
        }
        let mut players: Vec<_> = self.0.values().collect();
        players.sort_by(|a, b| {
            (b.games_won, b.total_hits, b.ships_sunk).cmp(&(a.games_won, a.total_hits, a.ships_sunk))
        });
        for (i, player) in players.into_iter().enumerate() {
            writeln!(
                f,
                "| {} | @{} | {} | {} | {} | {} | {} |",
                rank(i, ["👑", "🥈", "🥉"]),
                player.username,
                player.total_hits,
                player.games_won,
                player.games_played,
                player.best_streak,
                player.ships_sunk
            )?;
        }
        Ok(())
    }
}

/// Redraw every game section of a README from the current state.
pub fn render_readme(doc: &str, state: &GameState, fleet: &[ShipSpec]) -> String {
    let status = game::fleet_status(&state.board, &state.ships, fleet);
    let sections = [
        ("BOARD", BoardTable(&state.board).to_string()),
        ("SHIP_STATUS", FleetStatus(&status).to_string()),
        ("GAME_STATS", GameStats(state).to_string()),
        ("HISTORY_MOVES", RecentMoves(&state.history).to_string()),
        (
            "LEADERBOARD",
            LeaderboardTable {
                leaderboard: &state.leaderboard,
                achievements: &state.achievements,
            }
            .to_string(),
        ),
        ("ALL_TIME", AllTimeTable(&state.all_time).to_string()),
    ];
    sections
        .iter()
        .fold(doc.to_owned(), |doc, (name, content)| {
            update_section(&doc, name, content)
        })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        config::GameConfig,
        ships::{standard_fleet, ShipMap},
        stats::{Achievement, PlayerBadges},
    };

    fn coord(name: &str) -> Coordinate {
        name.parse().unwrap()
    }

    #[test]
    fn board_table_layout() {
        let mut board = Board::new();
        board[coord("A1")] = Mark::Hit;
        board[coord("A2")] = Mark::Miss;
        board[coord("J10")] = Mark::Revealed;
        let table = BoardTable(&board).to_string();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0], "|   | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9 | 10 |");
        assert!(lines[2].starts_with("| A | 💥 | 🌊 | ⬜ |"));
        assert!(lines[11].starts_with("| J |"));
        assert!(lines[11].ends_with("| 🚢 |"));
    }

    #[test]
    fn fleet_status_lines() {
        let status = vec![
            ShipStatus {
                name: "carrier".into(),
                size: 5,
                hits: 2,
            },
            ShipStatus {
                name: "patrol".into(),
                size: 2,
                hits: 2,
            },
            ShipStatus {
                name: "dinghy".into(),
                size: 1,
                hits: 0,
            },
        ];
        let text = FleetStatus(&status).to_string();
        assert!(text.contains("- 🛳️ **CARRIER** (5 cells): 🔥 **2/5** damaged"));
        assert!(text.contains("- 🛥️ **PATROL** (2 cells): 💀 **SUNK**"));
        assert!(text.contains("- 🚢 **DINGHY** (1 cells): ✅ Afloat"));
    }

    #[test]
    fn recent_moves_newest_first() {
        let mut state = GameState::new(
            vec![(coord("B2"), "patrol".to_owned())]
                .into_iter()
                .collect::<ShipMap>(),
        );
        let config = GameConfig {
            rate_limit_per_hour: 0,
            fleet: vec![ShipSpec::new("patrol", 1)],
            ..GameConfig::default()
        };
        let now = Utc::now();
        state.play_move("ann", coord("A1"), now, &config).unwrap();
        state.play_move("bob", coord("B2"), now, &config).unwrap();
        let text = RecentMoves(&state.history).to_string();
        let lines: Vec<&str> = text.lines().skip(2).collect();
        assert_eq!(lines[0], "- 💥 @bob: `B2` - Hit (patrol)");
        assert_eq!(lines[1], "- 🌊 @ann: `A1` - Miss");
        assert!(RecentMoves(&MoveHistory::new())
            .to_string()
            .contains("No moves yet"));
    }

    #[test]
    fn leaderboard_sorting_and_badges() {
        let mut leaderboard = Leaderboard::new();
        for (name, hits, misses) in &[("ann", 2, 2), ("bob", 2, 0), ("cy", 5, 9), ("dee", 0, 1)] {
            let mut record = PlayerRecord::new(*name);
            record.hits = *hits;
            record.misses = *misses;
            record.accuracy = crate::stats::accuracy(*hits, *misses);
            leaderboard.insert((*name).to_owned(), record);
        }
        let mut achievements = AchievementBook::new();
        let mut badges = PlayerBadges::new("cy");
        let mut all = enumflags2::BitFlags::empty();
        for &a in Achievement::ALL.iter() {
            all.insert(a);
        }
        badges.badges.unlock(all);
        achievements.insert("cy".into(), badges);

        let order: Vec<&str> = ranked(&leaderboard)
            .iter()
            .map(|p| p.username.as_str())
            .collect();
        assert_eq!(order, vec!["cy", "bob", "ann", "dee"]);

        let table = LeaderboardTable {
            leaderboard: &leaderboard,
            achievements: &achievements,
        }
        .to_string();
        let rows: Vec<&str> = table.lines().skip(2).collect();
        assert!(rows[0].starts_with("| 🥇 | @cy 🎯 Sharpshooter 🔥 Hot Streak ⚡ First Blood |"));
        assert!(rows[1].starts_with("| 🥈 | @bob |"));
        assert!(rows[3].starts_with("| 4 | @dee |"));
    }

    #[test]
    fn empty_tables_have_placeholder_rows() {
        let book = AchievementBook::new();
        let table = LeaderboardTable {
            leaderboard: &Leaderboard::new(),
            achievements: &book,
        }
        .to_string();
        assert!(table.contains("*No players yet*"));
        assert!(AllTimeTable(&AllTimeLeaderboard::new())
            .to_string()
            .contains("*No players yet*"));
    }

    #[test]
    fn readme_sections_are_filled() {
        let doc = "# Battleship\n<!-- BOARD_START -->\n<!-- BOARD_END -->\n\
                   <!-- GAME_STATS_START -->\nold\n<!-- GAME_STATS_END -->\n";
        let mut ships = ShipMap::new();
        ships.place("patrol", &[coord("A1"), coord("A2")]).unwrap();
        let state = GameState::new(ships);
        let out = render_readme(doc, &state, &standard_fleet());
        assert!(out.starts_with("# Battleship\n<!-- BOARD_START -->\n|   | 1 |"));
        assert!(out.contains("- 🎯 **Ship Cells Remaining:** 2/2\n"));
        assert!(out.contains("- 📈 **Community Accuracy:** 0.0%\n"));
        assert!(!out.contains("old"));
    }
}
