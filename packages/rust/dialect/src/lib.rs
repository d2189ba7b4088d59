//! Text-to-tree stage of detection.
//!
//! Documents first go through [`include::resolve`], then through the
//! [`DialectParser`] chain: Strict, then Fenced-Block, then Pseudo-Header.
//! The first parser that yields data wins. Text with column-0 `## ` section
//! headers skips the Strict attempt, since YAML would read the headers as
//! comments. When all parsers fail, callers fall back to [`scan_sections`],
//! which harvests flat quoted pairs only.

pub mod fenced;
pub mod include;
pub mod pseudo;
pub mod scanner;
pub mod strict;
pub mod tree;

use std::fmt;

use kbforge_shared::DialectConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use fenced::{FencedParse, parse_fenced};
pub use include::{IncludeResolution, extract_section, resolve};
pub use pseudo::{has_section_headers, parse_pseudo, reconstruct};
pub use scanner::scan_sections;
pub use strict::parse_strict;
pub use tree::{Mapping, Node};

// ---------------------------------------------------------------------------
// Dialect
// ---------------------------------------------------------------------------

/// How a document's tree was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    Strict,
    Fenced,
    PseudoHeader,
    /// No parser succeeded; the tree came from the line scanner.
    LineScan,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Strict => "strict",
            Self::Fenced => "fenced",
            Self::PseudoHeader => "pseudo-header",
            Self::LineScan => "line-scan",
        };
        f.write_str(label)
    }
}

/// A parsed tree tagged with the dialect that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub tree: Mapping,
    pub dialect: Dialect,
}

// ---------------------------------------------------------------------------
// Parser chain
// ---------------------------------------------------------------------------

/// The fixed-order chain of dialect parsers.
#[derive(Debug, Clone)]
pub struct DialectParser {
    fence_tags: Vec<String>,
    passthrough_sections: Vec<String>,
}

impl Default for DialectParser {
    fn default() -> Self {
        Self::new(&DialectConfig::default())
    }
}

impl DialectParser {
    pub fn new(config: &DialectConfig) -> Self {
        Self {
            fence_tags: config.fence_tags.clone(),
            passthrough_sections: config.passthrough_sections.clone(),
        }
    }

    /// Try each dialect in order; `None` when none of them yields data.
    pub fn parse(&self, text: &str) -> Option<ParsedDocument> {
        if has_section_headers(text) {
            debug!("section headers present, skipping strict parse");
        } else {
            match parse_strict(text) {
                Ok(tree) => {
                    return Some(ParsedDocument {
                        tree,
                        dialect: Dialect::Strict,
                    });
                }
                Err(e) => debug!(error = %e, "strict parse failed, trying fenced blocks"),
            }
        }

        let fenced = parse_fenced(text, &self.fence_tags);
        if fenced.parsed_blocks > 0 {
            return Some(ParsedDocument {
                tree: fenced.tree,
                dialect: Dialect::Fenced,
            });
        }
        debug!(
            failed_blocks = fenced.failed_blocks,
            "no fenced block parsed, trying pseudo-headers"
        );

        match parse_pseudo(text, &self.passthrough_sections) {
            Ok(tree) => Some(ParsedDocument {
                tree,
                dialect: Dialect::PseudoHeader,
            }),
            Err(e) => {
                debug!(error = %e, "pseudo-header reconstruction failed");
                None
            }
        }
    }
}
