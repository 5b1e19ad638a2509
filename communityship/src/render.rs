//! Text shown to players: README sections and issue comments.

pub use self::{
    comment::{
        attempt_report, commit_message, game_over, history_line, ip_report, move_comment,
        pattern_warning, rejection_comment, reset_comment,
    },
    readme::{
        ranked, render_readme, AllTimeTable, BoardTable, FleetStatus, GameStats,
        LeaderboardTable, RecentMoves,
    },
};

mod comment;
mod readme;

/// Marker that opens a named README section.
fn start_marker(name: &str) -> String {
    format!("<!-- {}_START -->", name)
}

/// Marker that closes a named README section.
fn end_marker(name: &str) -> String {
    format!("<!-- {}_END -->", name)
}

/// Replace everything between the `name` markers with `content`. The document is returned
/// unchanged if either marker is missing.
pub fn update_section(doc: &str, name: &str, content: &str) -> String {
    let start_marker = start_marker(name);
    let end_marker = end_marker(name);
    let start = match doc.find(&start_marker) {
        Some(start) => start,
        None => return doc.to_owned(),
    };
    let end = match doc[start..].find(&end_marker) {
        Some(end) => start + end,
        None => return doc.to_owned(),
    };
    let mut out = String::with_capacity(doc.len() + content.len());
    out.push_str(&doc[..start]);
    out.push_str(&start_marker);
    out.push('\n');
    out.push_str(content);
    if !content.is_empty() && !content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&doc[end..]);
    out
}

/// Insert `line` directly after the opening `name` marker, keeping what was already there.
/// The document is returned unchanged if the marker is missing.
pub fn prepend_to_section(doc: &str, name: &str, line: &str) -> String {
    let start_marker = start_marker(name);
    match doc.find(&start_marker) {
        Some(start) => {
            let at = start + start_marker.len();
            format!("{}\n{}{}", &doc[..at], line, &doc[at..])
        }
        None => doc.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_between_markers() {
        let doc = "# Title\n<!-- BOARD_START -->\nold\nstuff\n<!-- BOARD_END -->\nfooter\n";
        assert_eq!(
            update_section(doc, "BOARD", "new\n"),
            "# Title\n<!-- BOARD_START -->\nnew\n<!-- BOARD_END -->\nfooter\n"
        );
        assert_eq!(
            update_section(doc, "BOARD", "new"),
            "# Title\n<!-- BOARD_START -->\nnew\n<!-- BOARD_END -->\nfooter\n"
        );
    }

    #[test]
    fn missing_markers_leave_document_alone() {
        let doc = "<!-- BOARD_START -->\nold\n";
        assert_eq!(update_section(doc, "BOARD", "new"), doc);
        assert_eq!(update_section(doc, "LEADERBOARD", "new"), doc);
        let reversed = "<!-- BOARD_END -->\n<!-- BOARD_START -->\n";
        assert_eq!(update_section(reversed, "BOARD", "new"), reversed);
    }

    #[test]
    fn similar_names_do_not_collide() {
        let doc = "<!-- HISTORY_MOVES_START -->\na\n<!-- HISTORY_MOVES_END -->\n\
                   <!-- HISTORY_START -->\n<!-- HISTORY_END -->\n";
        let out = update_section(doc, "HISTORY", "b");
        assert!(out.contains("<!-- HISTORY_MOVES_START -->\na\n<!-- HISTORY_MOVES_END -->"));
        assert!(out.contains("<!-- HISTORY_START -->\nb\n<!-- HISTORY_END -->"));
    }

    #[test]
    fn prepends_history_lines() {
        let doc = "<!-- HISTORY_START -->\n- Round 001\n<!-- HISTORY_END -->";
        assert_eq!(
            prepend_to_section(doc, "HISTORY", "- Round 002"),
            "<!-- HISTORY_START -->\n- Round 002\n- Round 001\n<!-- HISTORY_END -->"
        );
        assert_eq!(prepend_to_section("plain", "HISTORY", "x"), "plain");
    }
}
