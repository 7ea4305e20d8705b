//! Human-readable output for the chat platform

use crate::error::StudyError;
use crate::session::{
    CompletedSession, ExtendOutcome, SeatMap, SessionSnapshot, StartOutcome, UserId,
    MAX_SESSION_MINUTES,
};

const EMPTY_SEAT: &str = "____";
const LABEL_CHARS: usize = 4;

fn mention(user_id: UserId) -> String {
    format!("<@{}>", user_id)
}

/// ` **label**` for a project, or nothing
pub fn format_project(project: Option<&str>) -> String {
    match project {
        Some(project) => format!(" **{}**", project),
        None => String::new(),
    }
}

/// Seat-grid label: the first four characters of the name, or the last
/// four digits of the id when the name is empty
pub fn seat_label(user_id: UserId, name: &str) -> String {
    if name.is_empty() {
        let id = user_id.to_string();
        id[id.len().saturating_sub(LABEL_CHARS)..].to_string()
    } else {
        name.chars().take(LABEL_CHARS).collect()
    }
}

/// Classroom layout: board, stage, then boxed seats, every line centered
pub fn render_seat_map(map: &SeatMap) -> String {
    let mut lines = vec![
        "──────────────────── Board ────────────────────".to_string(),
        "┌───────────────────────┐".to_string(),
        "│         Stage         │".to_string(),
        "└───────────────────────┘".to_string(),
    ];

    for row in map.rows() {
        let mut top = Vec::with_capacity(row.len());
        let mut mid = Vec::with_capacity(row.len());
        let mut bottom = Vec::with_capacity(row.len());

        for cell in row {
            let occupant: String = match &cell.occupant {
                Some(label) => label.chars().take(LABEL_CHARS).collect(),
                None => EMPTY_SEAT.to_string(),
            };
            top.push("┌────────┐".to_string());
            mid.push(format!("│ {}:{:<4} │", cell.seat, occupant));
            bottom.push("└────────┘".to_string());
        }

        lines.push(top.join("   "));
        lines.push(mid.join("   "));
        lines.push(bottom.join("   "));
    }

    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    lines
        .iter()
        .map(|line| format!("{:^width$}", line, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

fn seat_block(map: &SeatMap) -> String {
    format!("🪑 Current seats:\n```\n{}\n```", render_seat_map(map))
}

pub fn start_message(outcome: &StartOutcome) -> String {
    let session = &outcome.session;
    let seat_text = match session.seat {
        Some(seat) => format!("🪑 You are seated at **{}**.", seat),
        None => "(All seats are taken, no seat for now)".to_string(),
    };

    format!(
        "📚 {} started studying{} for {} minutes.\n{}\n\n{}",
        session.member.mention(),
        format_project(session.project.as_deref()),
        session.planned_minutes,
        seat_text,
        seat_block(&outcome.seat_map)
    )
}

pub fn extend_message(outcome: &ExtendOutcome) -> String {
    format!("⏫ Extended by {} minutes.", outcome.added_minutes)
}

pub fn edit_message(session: &SessionSnapshot) -> String {
    format!(
        "✏️ {} updated the session.\n📚 Now studying{} for {} minutes.\n",
        session.member.mention(),
        format_project(session.project.as_deref()),
        session.planned_minutes
    )
}

pub fn finish_message(done: &CompletedSession) -> String {
    format!(
        "⏰ {} finished studying{}, {} minutes in total.\n{}",
        mention(done.record.user_id),
        format_project(done.record.project.as_deref()),
        done.record.minutes,
        seat_block(&done.seat_map)
    )
}

pub fn time_up_message(done: &CompletedSession) -> String {
    format!(
        "⏰ {} time is up, studied{} for {} minutes.\n{}",
        mention(done.record.user_id),
        format_project(done.record.project.as_deref()),
        done.record.minutes,
        seat_block(&done.seat_map)
    )
}

pub fn time_up_direct_message(done: &CompletedSession) -> String {
    format!(
        "⏰ Your study time is up! You studied{} for {} minutes.",
        format_project(done.record.project.as_deref()),
        done.record.minutes
    )
}

pub fn left_voice_message(done: &CompletedSession) -> String {
    format!(
        "🚶 {} left voice, session closed after studying{} for {} minutes.\n{}",
        mention(done.record.user_id),
        format_project(done.record.project.as_deref()),
        done.record.minutes,
        seat_block(&done.seat_map)
    )
}

pub fn status_message(session: &SessionSnapshot) -> String {
    match session.project.as_deref() {
        Some(project) => format!(
            "⏳ Project: **{}**, {} minutes left.",
            project, session.remaining_minutes
        ),
        None => format!("⏳ {} minutes left.", session.remaining_minutes),
    }
}

pub fn seat_map_message(map: &SeatMap) -> String {
    format!("Current seats:\n```\n{}\n```", render_seat_map(map))
}

/// Reply shown to the invoking user when a command is refused
pub fn error_message(err: &StudyError) -> String {
    match err {
        StudyError::InvalidDuration(_) => {
            format!(
                "❌ The duration must be between 1 and {} minutes.",
                MAX_SESSION_MINUTES
            )
        }
        StudyError::AlreadyActive(_) => "⚠️ You are already studying. Use `/add_learning_time` \
            to extend it or `/finish_learning` to finish."
            .to_string(),
        StudyError::NoActiveSession(_) => "⚠️ You have no study session in progress.".to_string(),
        StudyError::NotInVoice(_) => {
            "❌ Join a voice channel before starting a study session.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SeatAllocator;

    #[test]
    fn test_format_project() {
        assert_eq!(format_project(Some("math")), " **math**");
        assert_eq!(format_project(None), "");
    }

    #[test]
    fn test_seat_label_truncates_or_falls_back_to_id() {
        assert_eq!(seat_label(1, "alexandra"), "alex");
        assert_eq!(seat_label(1, "bo"), "bo");
        assert_eq!(seat_label(123456789, ""), "6789");
        assert_eq!(seat_label(42, ""), "42");
    }

    #[test]
    fn test_render_seat_map_layout() {
        let mut seats = SeatAllocator::new(3, 3).unwrap();
        seats.assign(1);
        seats.assign(2);
        let map = seats.snapshot(|id| if id == 1 { "ada".into() } else { "grace".into() });

        let grid = render_seat_map(&map);
        let lines: Vec<&str> = grid.lines().collect();

        assert_eq!(lines.len(), 4 + 3 * 3);
        assert!(lines.iter().all(|l| l.chars().count() == 47));
        assert!(lines[0].contains("Board"));
        assert!(lines[2].contains("Stage"));
        assert!(lines[5].contains("│ A:ada  │"));
        assert!(lines[5].contains("│ B:grac │"));
        assert!(lines[5].contains("│ C:____ │"));
        assert!(lines[11].contains("│ I:____ │"));
    }
}
