//! Detection pipeline: documents → include expansion → dialect parse →
//! extraction → merge.
//!
//! Documents are processed in parallel up to `DetectOptions::concurrency`;
//! the merge fold is sequential and always runs in discovery order.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use kbforge_dialect::{Dialect, DialectParser, ParsedDocument, resolve, scan_sections};
use kbforge_discovery::{DiscoverOptions, discover_documents, load_document};
use kbforge_extract::{ExtractContext, ExtractorRegistry};
use kbforge_shared::{DetectOptions, DetectionError, Entity, Result, SourceDocument, Stage};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use crate::knowledge::KnowledgeBase;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// What one document contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub path: PathBuf,
    /// How the document was parsed; `None` when it could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
    /// Partial records extracted from it.
    pub entities: usize,
}

/// Result of a detection pass.
#[derive(Debug, Clone, Default)]
pub struct DetectionOutcome {
    pub knowledge: KnowledgeBase,
    /// Non-fatal problems, in document order.
    pub errors: Vec<DetectionError>,
    /// One summary per input document, in discovery order.
    pub documents: Vec<DocumentSummary>,
}

impl DetectionOutcome {
    pub fn into_parts(self) -> (KnowledgeBase, Vec<DetectionError>) {
        (self.knowledge, self.errors)
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting detection status.
pub trait DetectProgress: Send + Sync {
    /// Called once per document as it is merged, in discovery order.
    fn document_done(&self, summary: &DocumentSummary, current: usize, total: usize);
    /// Called when the pass completes.
    fn done(&self, outcome: &DetectionOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl DetectProgress for SilentProgress {
    fn document_done(&self, _summary: &DocumentSummary, _current: usize, _total: usize) {}
    fn done(&self, _outcome: &DetectionOutcome) {}
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Discover every document under `root` and detect over them.
///
/// Only a root that cannot be walked is an error.
#[instrument(skip_all, fields(root = %root.display()))]
pub async fn detect_tree(
    root: &Path,
    opts: &DetectOptions,
    progress: &dyn DetectProgress,
) -> Result<DetectionOutcome> {
    let paths = discover_documents(root, &DiscoverOptions::from(opts))?;
    Ok(detect_paths(&paths, opts, progress).await)
}

/// Detect over `paths`, read in parallel and merged in the given order.
#[instrument(skip_all, fields(documents = paths.len()))]
pub async fn detect_paths(
    paths: &[PathBuf],
    opts: &DetectOptions,
    progress: &dyn DetectProgress,
) -> DetectionOutcome {
    let inputs = paths.iter().cloned().map(Input::Path).collect();
    run(inputs, opts, progress).await
}

/// Detect over already-loaded documents, merged in the given order.
#[instrument(skip_all, fields(documents = documents.len()))]
pub async fn detect_documents(
    documents: Vec<SourceDocument>,
    opts: &DetectOptions,
    progress: &dyn DetectProgress,
) -> DetectionOutcome {
    let inputs = documents.into_iter().map(Input::Loaded).collect();
    run(inputs, opts, progress).await
}

// ---------------------------------------------------------------------------
// Map: per-document work
// ---------------------------------------------------------------------------

enum Input {
    Path(PathBuf),
    Loaded(SourceDocument),
}

impl Input {
    fn path(&self) -> &Path {
        match self {
            Self::Path(path) => path,
            Self::Loaded(doc) => &doc.path,
        }
    }
}

/// Everything one document produced, before merging.
struct DocumentYield {
    summary: DocumentSummary,
    entities: Vec<Entity>,
    errors: Vec<DetectionError>,
}

/// Read-only state shared by every worker.
struct Worker {
    parser: DialectParser,
    registry: ExtractorRegistry,
    opts: DetectOptions,
}

impl Worker {
    fn new(opts: &DetectOptions) -> Self {
        Self {
            parser: DialectParser::new(&opts.dialect),
            registry: ExtractorRegistry::new(),
            opts: opts.clone(),
        }
    }

    fn process(&self, input: Input) -> DocumentYield {
        let doc = match input {
            Input::Loaded(doc) => doc,
            Input::Path(path) => match load_document(&path) {
                Ok(doc) => doc,
                Err(e) => {
                    return DocumentYield {
                        errors: vec![DetectionError::new(&path, Stage::Read, e.to_string())],
                        summary: DocumentSummary {
                            path,
                            dialect: None,
                            entities: 0,
                        },
                        entities: Vec::new(),
                    };
                }
            },
        };
        self.process_document(doc)
    }

    #[instrument(skip_all, fields(path = %doc.path.display()))]
    fn process_document(&self, doc: SourceDocument) -> DocumentYield {
        let mut errors = Vec::new();

        let resolution = resolve(&doc, doc.base_dir());
        errors.extend(resolution.errors);

        let parsed = match self.parser.parse(&resolution.text) {
            Some(parsed) => parsed,
            None => {
                errors.push(DetectionError::new(
                    &doc.path,
                    Stage::Parse,
                    "no dialect parser accepted the document; harvesting quoted fields only",
                ));
                ParsedDocument {
                    tree: scan_sections(&resolution.text, &self.registry.section_names()),
                    dialect: Dialect::LineScan,
                }
            }
        };
        debug!(dialect = %parsed.dialect, "document parsed");

        let ctx = ExtractContext::from_options(&self.opts);
        let extraction = self.registry.extract_all(&parsed.tree, &ctx);
        errors.extend(
            extraction
                .warnings
                .into_iter()
                .map(|w| DetectionError::new(&doc.path, Stage::Extract, w.to_string())),
        );

        DocumentYield {
            summary: DocumentSummary {
                path: doc.path,
                dialect: Some(parsed.dialect),
                entities: extraction.entities.len(),
            },
            entities: extraction.entities,
            errors,
        }
    }
}

// ---------------------------------------------------------------------------
// Reduce: ordered fold
// ---------------------------------------------------------------------------

async fn run(inputs: Vec<Input>, opts: &DetectOptions, progress: &dyn DetectProgress) -> DetectionOutcome {
    let start = Instant::now();
    let total = inputs.len();
    let worker = Arc::new(Worker::new(opts));
    let semaphore = Arc::new(Semaphore::new(opts.concurrency.max(1)));

    info!(documents = total, concurrency = opts.concurrency, "starting detection");

    let mut handles = Vec::with_capacity(total);
    for input in inputs {
        let path = input.path().to_path_buf();
        let worker = worker.clone();
        let permit = semaphore.clone().acquire_owned().await.expect("semaphore closed");

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            worker.process(input)
        });
        handles.push((path, handle));
    }

    let mut outcome = DetectionOutcome::default();
    for (index, (path, handle)) in handles.into_iter().enumerate() {
        let document = match handle.await {
            Ok(document) => document,
            Err(e) => failed_worker(path, &e),
        };

        for error in &document.errors {
            warn!(%error, "detection problem");
        }

        outcome.knowledge.absorb_all(document.entities);
        outcome.errors.extend(document.errors);
        progress.document_done(&document.summary, index + 1, total);
        outcome.documents.push(document.summary);
    }

    info!(
        documents = total,
        entities = outcome.knowledge.entity_count(),
        errors = outcome.errors.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "detection completed"
    );

    progress.done(&outcome);
    outcome
}

/// Yield for a document whose worker panicked or was cancelled.
fn failed_worker(path: PathBuf, err: &tokio::task::JoinError) -> DocumentYield {
    let message = if err.is_panic() {
        format!("worker panicked: {err}")
    } else {
        format!("worker cancelled: {err}")
    };
    DocumentYield {
        errors: vec![DetectionError::new(&path, Stage::Worker, message)],
        summary: DocumentSummary {
            path,
            dialect: None,
            entities: 0,
        },
        entities: Vec::new(),
    }
}
