//! Interactive item filter: traversal, decisions and deferred removal.
//!
//! [`ItemFilter::review`] only reads the document and returns the removals the
//! operator asked for. [`apply_removals`] performs them afterwards, so no child
//! list is modified while it is being walked.

use std::ops::ControlFlow;

use tracing::{debug, info, instrument, warn, Level};

use crate::application::matcher::TitleMatcher;
use crate::domain::{extract_title, Document, DomainResult, NodeId, Title, DEFAULT_PLACEHOLDER};
use crate::infrastructure::traits::{Answer, ItemPrompt, Operator};

/// Which elements are containers, which are items, and where titles live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRules {
    /// Local names descended into (e.g. `channel`)
    pub container_tags: Vec<String>,
    /// Local names presented to the operator (e.g. `item`, `entry`)
    pub item_tags: Vec<String>,
    /// Local name of the title child
    pub title_tag: String,
    /// Shown when an item has no usable title
    pub placeholder: String,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            container_tags: vec!["channel".to_string()],
            item_tags: vec!["item".to_string(), "entry".to_string()],
            title_tag: "title".to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl FilterRules {
    fn is_container(&self, local_name: &str) -> bool {
        self.container_tags.iter().any(|t| t == local_name)
    }

    fn is_item(&self, local_name: &str) -> bool {
        self.item_tags.iter().any(|t| t == local_name)
    }
}

/// An item the operator chose to drop, with the container holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub parent: NodeId,
    pub item: NodeId,
}

/// Result of walking a document with an operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Review {
    /// Pending removals in document order
    pub removals: Vec<Removal>,
    /// Items answered with keep
    pub kept: usize,
    /// True when the walk ended early
    pub interrupted: bool,
}

impl Review {
    /// Items that received a decision.
    pub fn decided(&self) -> usize {
        self.kept + self.removals.len()
    }
}

/// Walks containers and asks the operator about each item.
pub struct ItemFilter<'a, O: Operator + ?Sized> {
    rules: &'a FilterRules,
    matcher: &'a dyn TitleMatcher,
    operator: &'a mut O,
    /// Items in the document under review
    total: usize,
}

impl<'a, O: Operator + ?Sized> ItemFilter<'a, O> {
    pub fn new(rules: &'a FilterRules, matcher: &'a dyn TitleMatcher, operator: &'a mut O) -> Self {
        Self {
            rules,
            matcher,
            operator,
            total: 0,
        }
    }

    /// Visit every item below the root element once, in document order.
    ///
    /// An interrupt stops the walk; decisions made until then are returned.
    #[instrument(level = "debug", skip_all)]
    pub fn review(&mut self, doc: &Document) -> Review {
        let mut review = Review::default();
        self.total = count_items(doc, self.rules);
        if let Some(root) = doc.root() {
            review.interrupted = self.visit(doc, root, &mut review).is_break();
        }
        info!(
            "review finished: {} kept, {} flagged for removal{}",
            review.kept,
            review.removals.len(),
            if review.interrupted { " (interrupted)" } else { "" }
        );
        review
    }

    fn visit(&mut self, doc: &Document, container: NodeId, review: &mut Review) -> ControlFlow<()> {
        for child in doc.child_elements(container) {
            let Some(element) = doc.element(child) else {
                continue;
            };
            let tag = element.local_name();

            if self.rules.is_container(tag) {
                debug!("found <{}> tag, going one level deeper", element.name);
                self.visit(doc, child, review)?;
            } else if self.rules.is_item(tag) {
                let ordinal = review.decided() + 1;
                debug!("<{}> #{}/{}", element.name, ordinal, self.total);
                match self.decide(doc, child, ordinal) {
                    Answer::Keep => review.kept += 1,
                    Answer::Remove => review.removals.push(Removal {
                        parent: container,
                        item: child,
                    }),
                    Answer::Interrupted => return ControlFlow::Break(()),
                }
            } else {
                debug!("found <{}> tag, keeping", element.name);
            }
        }
        ControlFlow::Continue(())
    }

    fn decide(&mut self, doc: &Document, item: NodeId, ordinal: usize) -> Answer {
        let title = extract_title(doc, item, &self.rules.title_tag);
        let matches = match &title {
            Title::Present(text) => self.matcher.matches(text),
            Title::Missing => Vec::new(),
        };
        let prompt = ItemPrompt {
            ordinal,
            total: self.total,
            title: title.display_or(&self.rules.placeholder),
            matches: &matches,
        };

        match self.operator.decide(&prompt) {
            Ok(answer) => answer,
            Err(e) => {
                // Losing the console must not lose the decisions made so far
                warn!("operator input failed, stopping: {}", e);
                Answer::Interrupted
            }
        }
    }
}

/// Number of items a full review would present.
pub fn count_items(doc: &Document, rules: &FilterRules) -> usize {
    fn count(doc: &Document, container: NodeId, rules: &FilterRules) -> usize {
        doc.child_elements(container)
            .filter_map(|child| doc.element(child).map(|e| (child, e.local_name())))
            .map(|(child, tag)| {
                if rules.is_container(tag) {
                    count(doc, child, rules)
                } else if rules.is_item(tag) {
                    1
                } else {
                    0
                }
            })
            .sum()
    }
    doc.root().map(|root| count(doc, root, rules)).unwrap_or(0)
}

/// Detach every pending removal from its container.
///
/// Each removal is independent, so order does not matter. Returns the number
/// of items removed.
#[instrument(level = "debug", skip_all, fields(pending = removals.len()))]
pub fn apply_removals(
    doc: &mut Document,
    removals: &[Removal],
    rules: &FilterRules,
) -> DomainResult<usize> {
    for removal in removals {
        let title = tracing::enabled!(Level::DEBUG)
            .then(|| extract_title(doc, removal.item, &rules.title_tag));
        doc.remove_child(removal.parent, removal.item)?;
        if let Some(title) = title {
            debug!(
                "removed item with <title>{}</title>",
                title.display_or(&rules.placeholder)
            );
        }
    }
    Ok(removals.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::matcher::NoMatcher;
    use crate::domain::parse_document;
    use std::io;

    struct Always(Answer);

    impl Operator for Always {
        fn decide(&mut self, _prompt: &ItemPrompt<'_>) -> io::Result<Answer> {
            Ok(self.0)
        }
    }

    struct Broken;

    impl Operator for Broken {
        fn decide(&mut self, _prompt: &ItemPrompt<'_>) -> io::Result<Answer> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    const FEED: &str = "<rss><channel><title>Feed</title><item><title>A</title></item><item><title>B</title></item></channel></rss>";

    #[test]
    fn given_remove_all_when_reviewed_then_collects_every_item_without_mutating() {
        let doc = parse_document(FEED).unwrap();
        let rules = FilterRules::default();
        let mut op = Always(Answer::Remove);
        let nodes_before = doc.len();

        let review = ItemFilter::new(&rules, &NoMatcher, &mut op).review(&doc);

        assert_eq!(review.removals.len(), 2);
        assert!(!review.interrupted);
        assert_eq!(doc.len(), nodes_before);
    }

    #[test]
    fn given_failing_operator_when_reviewed_then_treated_as_interrupt() {
        let doc = parse_document(FEED).unwrap();
        let rules = FilterRules::default();
        let mut op = Broken;

        let review = ItemFilter::new(&rules, &NoMatcher, &mut op).review(&doc);

        assert!(review.interrupted);
        assert_eq!(review.decided(), 0);
    }

    #[test]
    fn given_removals_when_applied_twice_then_second_pass_errors() {
        let mut doc = parse_document(FEED).unwrap();
        let rules = FilterRules::default();
        let mut op = Always(Answer::Remove);
        let review = ItemFilter::new(&rules, &NoMatcher, &mut op).review(&doc);

        assert_eq!(apply_removals(&mut doc, &review.removals, &rules).unwrap(), 2);
        assert!(apply_removals(&mut doc, &review.removals, &rules).is_err());
    }
}
