//! Tolerant matching of hint text against an external candidate list.
//!
//! The score of a candidate is its weakest aligned word: one badly misread
//! word caps the whole score. Picking the wrong clue downstream costs more
//! than failing, so the default acceptance threshold is high (95).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::error::{HuntError, Result};

/// Default minimum per-word similarity for accepting a candidate.
pub const DEFAULT_THRESHOLD: f64 = 95.0;

/// One selectable clue option in the consuming system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    /// Opaque identifier handed back to the consuming system
    #[serde(rename = "actionId", alias = "action_id", default)]
    pub action_id: String,
}

impl Candidate {
    pub fn new(text: impl Into<String>, action_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action_id: action_id.into(),
        }
    }
}

/// The accepted candidate and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub candidate: Candidate,
    /// Position in the candidate list
    pub index: usize,
    pub score: f64,
}

/// Supplier of the currently selectable candidates.
///
/// Read fresh for every match attempt; the list changes as the hunt
/// progresses.
pub trait CandidateSource {
    fn list_candidates(&self) -> Result<Vec<Candidate>>;
}

impl CandidateSource for Vec<Candidate> {
    fn list_candidates(&self) -> Result<Vec<Candidate>> {
        Ok(self.clone())
    }
}

/// Candidates stored as a JSON array of `{"text", "actionId"}` objects.
#[derive(Debug, Clone)]
pub struct JsonCandidateFile {
    path: PathBuf,
}

impl JsonCandidateFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CandidateSource for JsonCandidateFile {
    fn list_candidates(&self) -> Result<Vec<Candidate>> {
        let contents = fs::read_to_string(&self.path)?;
        let candidates: Vec<Candidate> = serde_json::from_str(&contents)?;
        debug!("Loaded {} candidates from {}", candidates.len(), self.path.display());
        Ok(candidates)
    }
}

/// Lower-cases, folds diacritics, collapses whitespace and trims.
///
/// Accents are folded because OCR drops them often ("pres" for "près").
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Character similarity of two words on a 0-100 scale.
pub fn word_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Minimum word similarity over aligned words.
///
/// Zero when the normalized word counts differ or either side is empty.
pub fn candidate_score(hint: &str, candidate: &str) -> f64 {
    let hint = normalize(hint);
    let candidate = normalize(candidate);
    let hint_words: Vec<&str> = hint.split(' ').filter(|w| !w.is_empty()).collect();
    let candidate_words: Vec<&str> = candidate.split(' ').filter(|w| !w.is_empty()).collect();

    if hint_words.is_empty() || hint_words.len() != candidate_words.len() {
        return 0.0;
    }

    hint_words
        .iter()
        .zip(&candidate_words)
        .map(|(a, b)| word_similarity(a, b))
        .fold(f64::INFINITY, f64::min)
}

/// Selects the highest-scoring candidate, accepting it only at or above
/// `threshold`. On equal scores the earlier candidate wins.
pub fn best_match(hint: &str, candidates: &[Candidate], threshold: f64) -> Result<MatchOutcome> {
    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let score = candidate_score(hint, &candidate.text);
        debug!("Candidate '{}' scored {:.1}", candidate.text, score);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }

    match best {
        Some((index, score)) if score >= threshold => {
            info!(
                "Matched hint '{}' to '{}' ({:.1})",
                hint, candidates[index].text, score
            );
            Ok(MatchOutcome {
                candidate: candidates[index].clone(),
                index,
                score,
            })
        }
        other => Err(HuntError::NoMatch {
            hint: hint.to_string(),
            best_score: other.map_or(0.0, |(_, score)| score),
        }),
    }
}
