//! Command execution

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::services::{PruneRequest, PruneService};
use crate::cli::args::Cli;
use crate::cli::error::CliResult;
use crate::cli::output;
use crate::config::Settings;
use crate::infrastructure::{select_highlighter, ConsoleOperator};

/// Run one interactive pruning session as described by `cli`.
#[instrument(level = "debug", skip_all)]
pub fn execute(cli: &Cli) -> CliResult<()> {
    let settings = apply_overrides(Settings::load(cli.config.as_deref())?, cli);
    settings.validate()?;
    debug!("effective settings: {:?}", settings);

    let request = PruneRequest {
        input: cli.input.clone(),
        output: cli.output.clone(),
        keep_titles: cli.keep_titles.clone(),
        force_overwrite: cli.force_overwrite,
    };

    let highlighter = select_highlighter(settings.color);
    let mut operator = ConsoleOperator::attach(highlighter)?;

    let service = PruneService::new(Arc::new(settings));
    let summary = service.run(&request, &mut operator)?;

    output::summary(&summary);
    Ok(())
}

/// Command-line flags take precedence over every other configuration layer.
fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if cli.fuzzy {
        settings.fuzzy = true;
    }
    if let Some(threshold) = cli.threshold {
        settings.threshold = threshold;
    }
    if let Some(color) = cli.color {
        settings.color = color;
    }
    settings
}
