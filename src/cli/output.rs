//! Plain-text rendering of analyses and history.

use crate::analysis::MoodAnalysis;
use crate::constants::{HISTORY_DATE_FORMAT, MOOD_SCORE_MAX, SCORE_BAR_WIDTH};
use crate::history::MoodHistory;
use chrono::{DateTime, Local, Utc};
use std::fmt::Write;

/// Message shown when the user has no entries.
pub const EMPTY_HISTORY_MESSAGE: &str = "No entries yet. Start journaling to track your mood!";

/// Renders a `[####----]` bar for a score.
pub fn score_bar(score: f64) -> String {
    let ratio = (score / MOOD_SCORE_MAX).clamp(0.0, 1.0);
    let filled = (ratio * SCORE_BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(SCORE_BAR_WIDTH - filled)
    )
}

/// Renders one analysis result.
pub fn render_analysis(analysis: &MoodAnalysis) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Mood score: {}/100 {}",
        analysis.rounded_score(),
        score_bar(analysis.mood_score)
    );
    let _ = writeln!(
        out,
        "Mental state: {} ({})",
        analysis.mental_state,
        analysis.mental_state.tone().label()
    );

    out.push_str("\nSuggestions:\n");
    for (i, suggestion) in analysis.suggestions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, suggestion);
    }

    out.push_str("\nHabits to build:\n");
    for habit in &analysis.habits {
        let _ = writeln!(out, "  - {}", habit);
    }

    let _ = write!(out, "\nBreathing exercise:\n  {}\n", analysis.breathing_prompt);
    out
}

/// Formats an entry timestamp in local time.
pub fn format_date(created_at: &DateTime<Utc>) -> String {
    created_at
        .with_timezone(&Local)
        .format(HISTORY_DATE_FORMAT)
        .to_string()
}

/// Renders a history listing, newest first.
pub fn render_history(history: &MoodHistory) -> String {
    let average = match history.average_score {
        Some(average) if !history.is_empty() => average,
        _ => return format!("{}\n", EMPTY_HISTORY_MESSAGE),
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Average mood: {}/100 over the last {} {}",
        average,
        history.entries.len(),
        if history.entries.len() == 1 { "entry" } else { "entries" }
    );
    out.push('\n');

    for record in &history.entries {
        let _ = writeln!(
            out,
            "{}  {:<11}  {:>3}",
            format_date(&record.created_at),
            record.analysis.mental_state.as_str(),
            record.analysis.rounded_score()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::sample_analysis;
    use crate::db::entries::JournalRecord;
    use uuid::Uuid;

    #[test]
    fn test_score_bar_bounds() {
        assert_eq!(score_bar(0.0), format!("[{}]", "-".repeat(20)));
        assert_eq!(score_bar(100.0), format!("[{}]", "#".repeat(20)));
        assert_eq!(score_bar(50.0), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
        assert_eq!(score_bar(250.0), score_bar(100.0));
    }

    #[test]
    fn test_render_analysis_includes_every_field() {
        let analysis = sample_analysis();
        let text = render_analysis(&analysis);

        assert!(text.contains("Mood score: 78/100"));
        assert!(text.contains("Mental state: motivated (motivated)"));
        assert!(text.contains("  1. Celebrate one win from today"));
        assert!(text.contains("  - Write three gratitudes"));
        assert!(text.contains(&analysis.breathing_prompt));
    }

    #[test]
    fn test_render_empty_history() {
        let history = MoodHistory::from_entries(Vec::new());
        assert_eq!(render_history(&history).trim(), EMPTY_HISTORY_MESSAGE);
    }

    #[test]
    fn test_render_history_lines() {
        let record = JournalRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            entry_text: "hello".to_string(),
            analysis: sample_analysis(),
            created_at: Utc::now(),
        };
        let expected_date = format_date(&record.created_at);
        let history = MoodHistory::from_entries(vec![record]);

        let text = render_history(&history);
        assert!(text.starts_with("Average mood: 78/100 over the last 1 entry"));
        let line = text.lines().last().unwrap();
        assert!(line.starts_with(&expected_date));
        assert!(line.contains("motivated"));
        assert!(line.ends_with(" 78"));
    }
}
