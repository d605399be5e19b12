//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};

use crate::config::ColorChoice;

/// Interactively prune items from an RSS/Atom feed document
#[derive(Parser, Debug)]
#[command(name = "feedsift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Feed document to review
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Where to write the pruned document
    #[arg(value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Titles to flag while reviewing, one per line
    #[arg(short = 'k', long, value_hint = ValueHint::FilePath)]
    pub keep_titles: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Match keep-list titles approximately
    #[arg(long)]
    pub fuzzy: bool,

    /// Fuzzy similarity threshold in percent
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: Option<u8>,

    /// Replace OUTPUT if it already exists
    #[arg(short = 'f', long)]
    pub force_overwrite: bool,

    /// Color console output
    #[arg(long, value_enum)]
    pub color: Option<ColorChoice>,

    /// Config file (default: ~/.config/feedsift/feedsift.toml)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}
