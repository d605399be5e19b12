//! Item titles: extraction for display and normalization for matching.

use std::fmt;
use std::sync::OnceLock;

use quick_xml::escape::unescape;
use regex::Regex;
use tracing::warn;

use crate::domain::document::{Document, NodeId, NodeKind};

/// Shown when an item has no usable title.
pub const DEFAULT_PLACEHOLDER: &str = "(unable to display title of post)";

/// Title of an item as presented to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Title {
    Present(String),
    /// No title element, empty text, or text that could not be decoded
    Missing,
}

impl Title {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Title::Present(s) => Some(s),
            Title::Missing => None,
        }
    }

    /// Display form, substituting `placeholder` when missing.
    pub fn display_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.as_str().unwrap_or(placeholder)
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_or(DEFAULT_PLACEHOLDER))
    }
}

/// Extract the title of `item`: text and CDATA of its first `title_tag` child.
///
/// Never fails. Anything that cannot be turned into a readable line degrades
/// to [`Title::Missing`].
pub fn extract_title(doc: &Document, item: NodeId, title_tag: &str) -> Title {
    let Some(title_el) = doc.find_child(item, title_tag) else {
        return Title::Missing;
    };

    let mut text = String::new();
    for &child in doc.children(title_el) {
        match doc.node(child).map(|n| &n.kind) {
            Some(NodeKind::Text(raw)) => match unescape(raw) {
                Ok(decoded) => text.push_str(&decoded),
                Err(e) => {
                    warn!("cannot decode title text {:?}: {}", raw, e);
                    return Title::Missing;
                }
            },
            Some(NodeKind::CData(raw)) => text.push_str(raw),
            _ => {}
        }
    }

    let display = displayable(&text);
    if display.is_empty() {
        Title::Missing
    } else {
        Title::Present(display)
    }
}

/// Collapse whitespace runs and replace remaining control characters.
fn displayable(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .map(|c| if c.is_control() { '\u{FFFD}' } else { c })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_word() -> &'static Regex {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    NON_WORD.get_or_init(|| Regex::new(r"\W+").expect("static regex"))
}

/// Matching key for a title: lowercase with every non-word character removed.
///
/// `"Weekly Digest #42!"` and `"weekly digest 42"` share the key
/// `"weeklydigest42"`.
pub fn normalize_title(title: &str) -> String {
    non_word().replace_all(&title.to_lowercase(), "").into_owned()
}
