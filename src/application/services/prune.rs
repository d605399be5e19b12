//! Prune service
//!
//! Runs one interactive session: guard the output path, load the keep-list,
//! parse the feed, collect decisions, remove the rejected items and write the
//! pruned copy.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use crate::application::filter::{apply_removals, count_items, ItemFilter};
use crate::application::keep_list::KeepList;
use crate::application::matcher::select_matcher;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{decode_document, parse_document, write_document, Document};
use crate::infrastructure::traits::Operator;

/// Paths and switches for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Overrides `Settings::keep_titles` when set
    pub keep_titles: Option<PathBuf>,
    pub force_overwrite: bool,
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneSummary {
    pub output: PathBuf,
    /// Items in the input document
    pub total: usize,
    pub kept: usize,
    pub removed: usize,
    /// Items never shown because the run was interrupted (they stay)
    pub undecided: usize,
    pub interrupted: bool,
}

/// Service for interactive pruning runs.
pub struct PruneService {
    settings: Arc<Settings>,
}

impl PruneService {
    /// Create a new prune service.
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Run a full session against `operator`.
    ///
    /// The output path is checked before anything is read. Once parsing
    /// succeeded the output is written exactly once, whether or not the
    /// operator got through every item.
    #[instrument(level = "debug", skip(self, operator))]
    pub fn run(
        &self,
        request: &PruneRequest,
        operator: &mut dyn Operator,
    ) -> ApplicationResult<PruneSummary> {
        ensure_output_free(&request.output, request.force_overwrite)?;

        let keep_list = self.load_keep_list(request.keep_titles.as_deref())?;
        let mut doc = load_document(&request.input)?;
        log_namespaces(&doc);

        let rules = self.settings.filter_rules();
        let matcher = select_matcher(keep_list.as_ref(), self.settings.match_policy());
        let total = count_items(&doc, &rules);
        info!("{} items to review in {}", total, request.input.display());

        let review = ItemFilter::new(&rules, matcher.as_ref(), operator).review(&doc);
        let removed = apply_removals(&mut doc, &review.removals, &rules)?;

        save_document(&doc, &request.output, request.force_overwrite)?;
        info!("wrote {}", request.output.display());

        Ok(PruneSummary {
            output: request.output.clone(),
            total,
            kept: review.kept,
            removed,
            undecided: total.saturating_sub(review.decided()),
            interrupted: review.interrupted,
        })
    }

    fn load_keep_list(&self, explicit: Option<&Path>) -> ApplicationResult<Option<KeepList>> {
        match explicit.or(self.settings.keep_titles.as_deref()) {
            Some(path) => {
                debug!("reading keep titles from {}", path.display());
                KeepList::load(path).map(Some)
            }
            None => Ok(None),
        }
    }
}

/// Refuse an existing output path unless overwriting was requested.
pub fn ensure_output_free(output: &Path, force_overwrite: bool) -> ApplicationResult<()> {
    if output.exists() && !force_overwrite {
        return Err(ApplicationError::OutputExists(output.to_path_buf()));
    }
    Ok(())
}

fn load_document(input: &Path) -> ApplicationResult<Document> {
    let bytes = std::fs::read(input).with_path_context("read input", input)?;
    decode_document(&bytes)
        .and_then(|xml| parse_document(&xml))
        .map_err(|source| ApplicationError::Document {
            path: input.to_path_buf(),
            source,
        })
}

fn log_namespaces(doc: &Document) {
    for ns in doc.namespaces() {
        if ns.prefix.is_empty() {
            debug!("default namespace with uri {}", ns.uri);
        } else {
            debug!("namespace {} with uri {}", ns.prefix, ns.uri);
        }
    }
}

/// Write through a temp file next to `output`, then move it into place.
///
/// Without `force_overwrite` the final move refuses to replace a file that
/// appeared while the operator was deciding.
fn save_document(doc: &Document, output: &Path, force_overwrite: bool) -> ApplicationResult<()> {
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).with_path_context("create temp file in", dir)?;
    tmp.write_all(write_document(doc).as_bytes())
        .with_path_context("write", tmp.path())?;

    let persisted = if force_overwrite {
        tmp.persist(output)
    } else {
        tmp.persist_noclobber(output)
    };
    persisted.map(|_| ()).map_err(|e| match e.error.kind() {
        std::io::ErrorKind::AlreadyExists => ApplicationError::OutputExists(output.to_path_buf()),
        _ => ApplicationError::OperationFailed {
            context: format!("write output: {}", output.display()),
            source: Box::new(e.error),
        },
    })
}
