//! Scoring a recall attempt against the content it tries to reproduce.

use std::collections::BTreeSet;

/// Words too common to say anything about recall.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "in",
    "is", "it", "its", "of", "on", "or", "that", "the", "this", "to", "was", "were", "will",
    "with",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
    VeryLow,
}

impl Confidence {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.95 {
            Self::High
        } else if score >= 0.75 {
            Self::Medium
        } else if score >= 0.50 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    pub fn explanation(self) -> &'static str {
        match self {
            Self::High => "The texts are nearly identical with minimal differences.",
            Self::Medium => "The texts are similar but have noticeable differences.",
            Self::Low => "The texts share some meaning but differ significantly.",
            Self::VeryLow => "The texts are largely dissimilar or unrelated.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    /// Overlap in `[0, 1]`, rounded to four decimals.
    pub score: f64,
    pub confidence: Confidence,
}

/// Compares what the learner recalled with the original text.
///
/// Both texts are reduced to sets of lower-cased content words and scored by
/// their Dice overlap.
#[derive(Debug, Clone, Default)]
pub struct RecallComparer;

impl RecallComparer {
    pub fn compare(&self, original: &str, attempt: &str) -> Comparison {
        let a = words(original);
        let b = words(attempt);
        let score = if a.is_empty() && b.is_empty() {
            1.0
        } else {
            let shared = a.intersection(&b).count();
            2.0 * shared as f64 / (a.len() + b.len()) as f64
        };
        let score = (score * 10_000.0).round() / 10_000.0;
        Comparison {
            score,
            confidence: Confidence::from_score(score),
        }
    }
}

fn words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}
