//! Acceptance policy for spoken scripts
//!
//! Turns a raw edit distance into a pass/fail decision. The threshold scales
//! with the target length and is owned by whoever configures the alarm
//! service, not by the distance function.

use serde::Deserialize;

use crate::fuzzy::{levenshtein, normalize};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MatchPolicy {
    /// Fraction of the normalized target length allowed as edits
    #[serde(default = "default_max_error_ratio")]
    pub max_error_ratio: f32,
    /// Lower bound on allowed edits, so short scripts tolerate one slip
    #[serde(default = "default_min_allowed")]
    pub min_allowed: usize,
    /// Optional hard cap for long scripts
    #[serde(default)]
    pub max_allowed: Option<usize>,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            max_error_ratio: default_max_error_ratio(),
            min_allowed: default_min_allowed(),
            max_allowed: None,
        }
    }
}

fn default_max_error_ratio() -> f32 {
    0.3
}

fn default_min_allowed() -> usize {
    1
}

impl MatchPolicy {
    /// Strict policy: only an exact (normalized) match passes.
    pub fn exact() -> Self {
        Self {
            max_error_ratio: 0.0,
            min_allowed: 0,
            max_allowed: Some(0),
        }
    }

    /// Number of edits tolerated for a target of `target_len` chars.
    pub fn allowed_distance(&self, target_len: usize) -> usize {
        let scaled = (target_len as f32 * self.max_error_ratio).floor() as usize;
        let allowed = scaled.max(self.min_allowed);
        match self.max_allowed {
            Some(cap) => allowed.min(cap),
            None => allowed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub accepted: bool,
    pub distance: usize,
    pub allowed: usize,
}

/// Compare a transcript against its target script under `policy`.
pub fn evaluate(target: &str, transcript: &str, policy: &MatchPolicy) -> MatchResult {
    let target = normalize(target);
    let transcript = normalize(transcript);
    let distance = levenshtein(&target, &transcript);
    let allowed = policy.allowed_distance(target.chars().count());
    MatchResult {
        accepted: distance == 0 || distance <= allowed,
        distance,
        allowed,
    }
}
