//! Tolerant text matching for cell ranges.
//!
//! Each value goes through the same normalization pipeline, always in this
//! order:
//!
//! 1. substring replacements (`normalization`)
//! 2. left trim of a char set (`trim_leadings`)
//! 3. right trim of a char set (`trim_trailings`)
//! 4. removal of a char set (`ignore_chars`)
//! 5. lowercase (`ignore_case`)
//!
//! and the two normalized values are then compared with one [`MatchKind`].

use serde::{Deserialize, Serialize};

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 85.0;

/// How two normalized values are compared.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// The first value contains the second.
    Includes,
    /// The first value is contained in the second.
    IncludedBy,
    /// Similarity ratio at or above the threshold.
    FuzzyMatch,
    ExactMatch,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    #[serde(default)]
    pub normalization: Vec<(String, String)>,
    #[serde(default)]
    pub trim_leadings: Option<String>,
    #[serde(default)]
    pub trim_trailings: Option<String>,
    #[serde(default)]
    pub ignore_chars: Option<String>,
    #[serde(default)]
    pub ignore_case: bool,
}

impl Normalization {
    pub fn apply(&self, value: &str) -> String {
        let mut out = value.to_string();
        for (from, to) in &self.normalization {
            if !from.is_empty() {
                out = out.replace(from.as_str(), to);
            }
        }
        if let Some(chars) = &self.trim_leadings {
            out = out.trim_start_matches(|c: char| chars.contains(c)).to_string();
        }
        if let Some(chars) = &self.trim_trailings {
            out = out.trim_end_matches(|c: char| chars.contains(c)).to_string();
        }
        if let Some(chars) = &self.ignore_chars {
            out.retain(|c| !chars.contains(c));
        }
        if self.ignore_case {
            out = out.to_lowercase();
        }
        out
    }
}

/// Normalized similarity of two strings in `0..=100`, computed from the
/// longest common subsequence of their chars (insert/delete edit distance).
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    let lcs = lcs_len(&a, &b);
    100.0 * (2 * lcs) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Compare two already-normalized values.
pub fn matches(kind: MatchKind, left: &str, right: &str, threshold: f64) -> bool {
    match kind {
        MatchKind::Includes => left.contains(right),
        MatchKind::IncludedBy => right.contains(left),
        MatchKind::FuzzyMatch => ratio(left, right) >= threshold,
        MatchKind::ExactMatch => left == right,
    }
}
