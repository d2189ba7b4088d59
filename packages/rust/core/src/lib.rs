//! Merge engine, knowledge base, and detection pipeline for kbforge.
//!
//! This crate ties together discovery, include expansion, dialect parsing,
//! and entity extraction into one detection pass (see [`detect_tree`]).

pub mod knowledge;
pub mod merge;
pub mod pipeline;

pub use knowledge::KnowledgeBase;
pub use merge::{Merge, merge};
pub use pipeline::{
    DetectProgress, DetectionOutcome, DocumentSummary, SilentProgress, detect_documents,
    detect_paths, detect_tree,
};
