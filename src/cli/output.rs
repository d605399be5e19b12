//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically, and `--color`
//! once `select_highlighter` has run.

use colored::Colorize;

use crate::application::services::PruneSummary;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print the end-of-run report.
pub fn summary(summary: &PruneSummary) {
    println!();
    if summary.interrupted {
        warning("Interrupted. Progress saved, undecided items were kept.");
    }
    success(&format!("Wrote {}", summary.output.display()));
    detail(&format!(
        "{} items: {} kept, {} removed, {} undecided",
        summary.total, summary.kept, summary.removed, summary.undecided
    ));
}
