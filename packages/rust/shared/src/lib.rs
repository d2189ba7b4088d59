//! Shared types, error model, and configuration for kbforge.
//!
//! This crate is the foundation depended on by all other kbforge crates.
//! It provides:
//! - [`KbForgeError`]: the unified error type
//! - Document types ([`SourceDocument`], [`IncludeDirective`], [`DetectionError`])
//! - Entity records ([`CapabilityRecord`], [`WorkflowRecord`], ...)
//! - Configuration ([`AppConfig`], [`DetectOptions`], config loading)

pub mod config;
pub mod entity;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CapabilityAlias, DetectDefaults, DetectOptions, DialectConfig, RoutingConfig,
    WorkflowHint, config_dir, config_file_path, init_config, load_config, load_config_from,
    validate_config,
};
pub use entity::{
    CapabilityRecord, CommandRouteRecord, EconomicsRecord, Entity, EntityKind,
    QualityCheckRecord, RecoveryRecord, TriggerRecord, WorkflowRecord,
};
pub use error::{KbForgeError, Result};
pub use types::{DetectionError, IncludeDirective, SourceDocument, Stage};
