//! Keep-list: titles the operator wants flagged while deciding.

use std::path::Path;

use tracing::{debug, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::normalize_title;

/// One keep-list line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepEntry {
    /// Line as written in the file (trimmed), used for display
    pub title: String,
    /// Matching key, see [`normalize_title`]
    pub normalized: String,
}

impl KeepEntry {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let normalized = normalize_title(&title);
        Self { title, normalized }
    }
}

/// Ordered, read-only list of titles to keep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeepList {
    entries: Vec<KeepEntry>,
}

impl KeepList {
    /// Build from lines of text; blank lines and lines without word characters are skipped.
    pub fn parse(content: &str) -> Self {
        content.lines().collect()
    }

    /// Read a keep-list file, one title per line.
    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> ApplicationResult<Self> {
        let content =
            std::fs::read_to_string(path).with_path_context("read keep-list", path)?;
        let list = Self::parse(&content);
        debug!("loaded {} keep-list entries from {}", list.len(), path.display());
        Ok(list)
    }

    pub fn entries(&self) -> &[KeepEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Titles are trimmed; those without word characters are dropped.
impl<S: Into<String>> FromIterator<S> for KeepList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|title| {
                let title: String = title.into();
                KeepEntry::new(title.trim())
            })
            .filter(|entry| !entry.normalized.is_empty())
            .collect();
        Self { entries }
    }
}
