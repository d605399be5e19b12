//! Keep-list matching strategies.
//!
//! Matching is advisory. A matcher only annotates the prompt; the operator
//! still makes every keep/remove decision.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::application::keep_list::KeepList;
use crate::domain::normalize_title;

/// Default fuzzy similarity threshold in percent.
pub const DEFAULT_THRESHOLD: u8 = 85;

/// A keep-list entry that matched a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMatch {
    /// Keep-list line as written
    pub entry: String,
    /// Similarity in percent; 100 for exact matches
    pub score: u8,
}

/// Strategy for checking a title against the keep-list.
pub trait TitleMatcher {
    /// Keep-list entries matching `title`, best first. Empty when none match.
    fn matches(&self, title: &str) -> Vec<TitleMatch>;

    /// Short name for logging.
    fn describe(&self) -> String;
}

/// Used when no keep-list is configured.
#[derive(Debug, Default)]
pub struct NoMatcher;

impl TitleMatcher for NoMatcher {
    fn matches(&self, _title: &str) -> Vec<TitleMatch> {
        Vec::new()
    }

    fn describe(&self) -> String {
        "none".to_string()
    }
}

/// Membership test on normalized titles.
#[derive(Debug)]
pub struct ExactMatcher {
    by_key: HashMap<String, String>,
}

impl ExactMatcher {
    pub fn new(keep_list: &KeepList) -> Self {
        let mut by_key = HashMap::new();
        for entry in keep_list.entries() {
            // First occurrence wins for display
            by_key
                .entry(entry.normalized.clone())
                .or_insert_with(|| entry.title.clone());
        }
        Self { by_key }
    }
}

impl TitleMatcher for ExactMatcher {
    fn matches(&self, title: &str) -> Vec<TitleMatch> {
        self.by_key
            .get(&normalize_title(title))
            .map(|entry| {
                vec![TitleMatch {
                    entry: entry.clone(),
                    score: 100,
                }]
            })
            .unwrap_or_default()
    }

    fn describe(&self) -> String {
        format!("exact ({} titles)", self.by_key.len())
    }
}

/// Similarity ratio on normalized titles, reporting everything at or above the threshold.
#[cfg(feature = "fuzzy")]
#[derive(Debug)]
pub struct FuzzyMatcher {
    entries: Vec<(String, String)>,
    threshold: u8,
}

#[cfg(feature = "fuzzy")]
impl FuzzyMatcher {
    pub fn new(keep_list: &KeepList, threshold: u8) -> Self {
        Self {
            entries: keep_list
                .entries()
                .iter()
                .map(|e| (e.title.clone(), e.normalized.clone()))
                .collect(),
            threshold: threshold.min(100),
        }
    }
}

/// Similarity of two matching keys in whole percent, rounded down.
///
/// Rounding down keeps `score >= threshold` equivalent to the raw ratio being
/// at or above the threshold. The epsilon absorbs float error on exact
/// fractions such as 17/20.
#[cfg(feature = "fuzzy")]
fn score(a_key: &str, b_key: &str) -> u8 {
    let ratio = strsim::normalized_levenshtein(a_key, b_key);
    (ratio * 100.0 + 1e-9).floor().clamp(0.0, 100.0) as u8
}

#[cfg(feature = "fuzzy")]
impl TitleMatcher for FuzzyMatcher {
    fn matches(&self, title: &str) -> Vec<TitleMatch> {
        let key = normalize_title(title);
        if key.is_empty() {
            return Vec::new();
        }

        let mut found: Vec<TitleMatch> = self
            .entries
            .iter()
            .filter_map(|(entry, entry_key)| {
                let score = score(&key, entry_key);
                (score >= self.threshold).then(|| TitleMatch {
                    entry: entry.clone(),
                    score,
                })
            })
            .collect();
        // Stable sort keeps keep-list order among equal scores
        found.sort_by(|a, b| b.score.cmp(&a.score));
        found
    }

    fn describe(&self) -> String {
        format!(
            "fuzzy (>= {}%, {} titles)",
            self.threshold,
            self.entries.len()
        )
    }
}

/// Matching policy requested for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    Exact,
    Fuzzy { threshold: u8 },
}

/// Pick the matcher for this run.
///
/// Without a keep-list nothing is matched. Fuzzy matching needs the `fuzzy`
/// build feature; when it is missing the run warns and matches exactly.
pub fn select_matcher(keep_list: Option<&KeepList>, policy: MatchPolicy) -> Box<dyn TitleMatcher> {
    let Some(keep_list) = keep_list else {
        if matches!(policy, MatchPolicy::Fuzzy { .. }) {
            warn!("fuzzy matching requested without a keep-list; nothing to match against");
        }
        return Box::new(NoMatcher);
    };

    let matcher: Box<dyn TitleMatcher> = match policy {
        MatchPolicy::Exact => Box::new(ExactMatcher::new(keep_list)),
        #[cfg(feature = "fuzzy")]
        MatchPolicy::Fuzzy { threshold } => Box::new(FuzzyMatcher::new(keep_list, threshold)),
        #[cfg(not(feature = "fuzzy"))]
        MatchPolicy::Fuzzy { .. } => {
            warn!("fuzzy matching is not available in this build; using exact matching");
            Box::new(ExactMatcher::new(keep_list))
        }
    };
    debug!("title matcher: {}", matcher.describe());
    matcher
}
