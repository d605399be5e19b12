//! feedsift: interactively prune items from RSS/Atom feed documents.
//!
//! Layers, innermost first:
//! - `domain`: document tree, XML codec, titles
//! - `application`: keep-list, matchers, item filter, prune service
//! - `infrastructure`: console operator, highlighting
//! - `cli`: argument parsing, run orchestration, exit codes

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
