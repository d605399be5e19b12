//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod filter;
pub mod keep_list;
pub mod matcher;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use filter::{apply_removals, count_items, FilterRules, ItemFilter, Removal, Review};
pub use keep_list::{KeepEntry, KeepList};
pub use matcher::{select_matcher, MatchPolicy, TitleMatch, TitleMatcher, DEFAULT_THRESHOLD};
