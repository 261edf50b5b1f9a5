//! Keyword classification of free mission text into a canonical path.
//!
//! Used for cross-path attribution while the OTHER path is active: a
//! user-authored mission still credits the domain it belongs to. Matching is
//! case-insensitive on word boundaries; anything unmatched falls back to
//! DISCIPLINE explicitly.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::state::PathId;

/// Swappable keyword configuration. Order of evaluation is fixed:
/// STRONGER, PRODUCTIVE, EXTROVERT, MENTAL_HEALTH, then the DISCIPLINE
/// fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTable {
    #[serde(default)]
    pub stronger: Vec<String>,
    #[serde(default)]
    pub productive: Vec<String>,
    #[serde(default)]
    pub extrovert: Vec<String>,
    #[serde(default)]
    pub mental_health: Vec<String>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        let words = |list: &[&str]| list.iter().map(|w| (*w).to_string()).collect();
        Self {
            stronger: words(&[
                "gym", "workout", "exercise", "run", "running", "push-ups", "pushups", "squats",
                "stretch", "walk", "lift", "train", "protein", "water", "sleep", "meal",
            ]),
            productive: words(&[
                "study", "read", "reading", "work", "focus", "plan", "organize", "write",
                "learn", "goal", "project", "desk", "book", "skill",
            ]),
            extrovert: words(&[
                "talk", "call", "friend", "social", "party", "conversation", "compliment",
                "greet", "smile", "stranger", "meet", "event",
            ]),
            mental_health: words(&[
                "meditate", "meditation", "breathe", "breaths", "journal", "grateful",
                "gratitude", "nature", "relax", "calm", "unplug", "therapy", "mindful",
            ]),
        }
    }
}

/// A keyword table compiled into word-boundary matchers.
#[derive(Debug)]
pub struct Classifier {
    buckets: Vec<(PathId, Regex)>,
}

impl Classifier {
    /// Compile a keyword table. Empty buckets and keywords that fail to
    /// compile are skipped; the DISCIPLINE fallback always remains.
    #[must_use]
    pub fn new(table: &KeywordTable) -> Self {
        let order = [
            (PathId::Stronger, &table.stronger),
            (PathId::Productive, &table.productive),
            (PathId::Extrovert, &table.extrovert),
            (PathId::MentalHealth, &table.mental_health),
        ];
        let buckets = order
            .into_iter()
            .filter_map(|(path, keywords)| compile_bucket(keywords).map(|re| (path, re)))
            .collect();
        Self { buckets }
    }

    /// Classify mission text into its canonical path.
    #[must_use]
    pub fn classify(&self, text: &str) -> PathId {
        for (path, pattern) in &self.buckets {
            if pattern.is_match(text) {
                return *path;
            }
        }
        PathId::Discipline
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&KeywordTable::default())
    }
}

fn compile_bucket(keywords: &[String]) -> Option<Regex> {
    let alternation: Vec<String> = keywords
        .iter()
        .map(|word| regex::escape(word.trim()))
        .filter(|escaped| !escaped.is_empty())
        .collect();
    if alternation.is_empty() {
        return None;
    }
    let pattern = format!(r"(?i)\b(?:{})\b", alternation.join("|"));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            log::warn!("skipping unusable keyword bucket: {err}");
            None
        }
    }
}

/// Classify with the built-in keyword table.
#[must_use]
pub fn classify(text: &str) -> PathId {
    static DEFAULT: OnceLock<Classifier> = OnceLock::new();
    DEFAULT.get_or_init(Classifier::default).classify(text)
}
