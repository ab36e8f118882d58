//! Output formatting for CLI display.

use std::fmt::Write as _;

use rehearse::model::{Answer, Presented, Session};
use rehearse::runner::Progress;
use rehearse::summary::SessionSummary;

/// First eight characters of an id, as shown in listings.
pub(super) fn short_id(session: &Session) -> String {
    session.id.to_string()[..8].to_string()
}

/// Seconds as `1h 02m 03s`, `2m 03s`, or `3.4s`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(super) fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        return format!("{seconds:.1}s");
    }
    // Rounded whole seconds; durations are never negative.
    let total = seconds.round() as u64;
    let (h, m, s) = (total / 3600, total / 60 % 60, total % 60);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else {
        format!("{m}m {s:02}s")
    }
}

/// The front of a presented entity, with answer choices for questions.
pub(super) fn format_presented(presented: &Presented) -> String {
    match presented {
        Presented::Content(content) => {
            format!(
                "[{}] {}\n{}",
                content.kind.as_str(),
                content.key,
                content.front
            )
        }
        Presented::Question { question, answers } => {
            let mut out = format!("[question] {}\n{}", question.key, question.front);
            for (n, answer) in answers.iter().enumerate() {
                let _ = write!(out, "\n  {}. {}", n + 1, answer.text);
            }
            out
        }
    }
}

/// The revealed side: the back of a card or the correct answers.
pub(super) fn format_reveal(presented: &Presented) -> String {
    match presented {
        Presented::Content(content) => content.back.clone(),
        Presented::Question { answers, .. } => {
            let correct: Vec<&str> = answers
                .iter()
                .filter(|a| a.correct)
                .map(|a: &Answer| a.text.as_str())
                .collect();
            if correct.is_empty() {
                "No correct answer recorded.".to_string()
            } else {
                format!("Correct: {}", correct.join("; "))
            }
        }
    }
}

pub(super) fn format_progress(progress: Progress, pending_reviews: usize) -> String {
    let position = progress.index.map_or(0, |i| i + 1);
    format!(
        "{position}/{} shown, {pending_reviews} review(s) pending",
        progress.limit
    )
}

pub(super) fn format_summary(summary: &SessionSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Session {}", &summary.session.to_string()[..8]);
    let _ = writeln!(
        out,
        "Items shown: {} ({} distinct)",
        summary.items_shown, summary.distinct_contents
    );
    let _ = writeln!(out, "Time: {}", format_duration(summary.total_seconds));
    if let Some(mean) = summary.mean_seconds {
        let _ = writeln!(out, "Mean per item: {}", format_duration(mean));
    }
    let _ = write!(
        out,
        "Flips: {}  Difficulty changes: {}",
        summary.flips, summary.difficulty_changes
    );
    for (key, seconds) in &summary.time_per_content {
        let _ = write!(out, "\n  {key:<24} {}", format_duration(*seconds));
    }
    out
}
