//! Entity extraction: parsed trees in, partial entity records out.
//!
//! Each extractor is stateless and looks only at the top-level sections it
//! knows about. Missing sections yield no records; wrong-shaped fields are
//! skipped and reported as [`FieldWarning`]s so the rest of the record
//! survives.

pub mod extractors;
mod fields;
pub mod routing;

use kbforge_dialect::Mapping;
use kbforge_shared::{DetectOptions, DialectConfig, Entity, RoutingConfig};
use tracing::trace;

pub use extractors::{
    CapabilityExtractor, CommandRouteExtractor, EconomicsExtractor, QualityCheckExtractor,
    RecoveryExtractor, TriggerExtractor, WorkflowExtractor,
};
pub use fields::{FieldWarning, split_joined};

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Read-only settings shared by every extractor invocation.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    /// Separator for list values written as one string.
    pub delimiter: &'a str,
    pub routing: &'a RoutingConfig,
}

impl<'a> ExtractContext<'a> {
    pub fn new(dialect: &'a DialectConfig, routing: &'a RoutingConfig) -> Self {
        Self {
            delimiter: &dialect.list_delimiter,
            routing,
        }
    }

    pub fn from_options(opts: &'a DetectOptions) -> Self {
        Self::new(&opts.dialect, &opts.routing)
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One entity kind's extractor.
pub trait EntityExtractor: Send + Sync {
    /// Human-readable extractor name for tracing.
    fn name(&self) -> &str;

    /// Top-level sections this extractor reads. The line scanner harvests
    /// exactly these when no parser accepts a document.
    fn sections(&self) -> &[&'static str];

    /// Emit zero or more partial records found in `tree`.
    fn extract(
        &self,
        tree: &Mapping,
        ctx: &ExtractContext<'_>,
        warnings: &mut Vec<FieldWarning>,
    ) -> Vec<Entity>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Everything one tree yielded.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub entities: Vec<Entity>,
    pub warnings: Vec<FieldWarning>,
}

/// Holds the registered extractors in a fixed order.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn EntityExtractor>>,
}

impl ExtractorRegistry {
    /// Create a registry with every built-in extractor.
    pub fn new() -> Self {
        Self {
            extractors: vec![
                Box::new(CapabilityExtractor),
                Box::new(WorkflowExtractor),
                Box::new(TriggerExtractor),
                Box::new(QualityCheckExtractor),
                Box::new(RecoveryExtractor),
                Box::new(EconomicsExtractor),
                Box::new(CommandRouteExtractor),
            ],
        }
    }

    /// Run every extractor over `tree`, in registry order.
    pub fn extract_all(&self, tree: &Mapping, ctx: &ExtractContext<'_>) -> Extraction {
        let mut extraction = Extraction::default();
        for extractor in &self.extractors {
            let found = extractor.extract(tree, ctx, &mut extraction.warnings);
            trace!(extractor = extractor.name(), records = found.len(), "extracted");
            extraction.entities.extend(found);
        }
        extraction
    }

    /// Every section name any extractor reads, without repeats.
    pub fn section_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for name in self.extractors.iter().flat_map(|e| e.sections().iter().copied()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
