//! Application configuration for kbforge.
//!
//! User config lives at `~/.kbforge/kbforge.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{KbForgeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "kbforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".kbforge";

// ---------------------------------------------------------------------------
// Config structs (matching kbforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Document discovery and scheduling.
    #[serde(default)]
    pub detect: DetectDefaults,

    /// Dialect parser tuning.
    #[serde(default)]
    pub dialect: DialectConfig,

    /// Capability name resolution.
    #[serde(default)]
    pub routing: RoutingConfig,
}

/// `[detect]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectDefaults {
    /// Documents processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// File extensions (without dot) treated as documents.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names never descended into.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
}

impl Default for DetectDefaults {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

fn default_concurrency() -> u32 {
    4
}
fn default_extensions() -> Vec<String> {
    vec!["yml".into(), "yaml".into(), "md".into()]
}
fn default_exclude_dirs() -> Vec<String> {
    vec![".git".into(), "target".into(), "node_modules".into()]
}

/// `[dialect]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialectConfig {
    /// Separator used by delimiter-joined list values.
    #[serde(default = "default_list_delimiter")]
    pub list_delimiter: String,

    /// Info strings that mark a fenced block as structured data.
    #[serde(default = "default_fence_tags")]
    pub fence_tags: Vec<String>,

    /// Pseudo-header sections whose content is already indented correctly.
    #[serde(default = "default_passthrough_sections")]
    pub passthrough_sections: Vec<String>,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            list_delimiter: default_list_delimiter(),
            fence_tags: default_fence_tags(),
            passthrough_sections: default_passthrough_sections(),
        }
    }
}

fn default_list_delimiter() -> String {
    " | ".into()
}
fn default_fence_tags() -> Vec<String> {
    vec!["yaml".into(), "yml".into()]
}
fn default_passthrough_sections() -> Vec<String> {
    vec!["Command_Integration".into(), "Error_Recovery".into()]
}

/// `[routing]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Free-text aliases for capability names, tried in order.
    #[serde(default = "default_aliases")]
    pub aliases: Vec<CapabilityAlias>,

    /// Workflow-name keywords that imply an owning capability, tried in order.
    #[serde(default = "default_workflow_hints")]
    pub workflow_hints: Vec<WorkflowHint>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            aliases: default_aliases(),
            workflow_hints: default_workflow_hints(),
        }
    }
}

/// `[[routing.aliases]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityAlias {
    /// Canonical capability name.
    pub capability: String,
    /// Case-insensitive substrings that refer to it.
    pub patterns: Vec<String>,
}

/// `[[routing.workflow_hints]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowHint {
    /// Capability inferred when a keyword matches.
    pub capability: String,
    /// Case-insensitive substrings of the workflow name.
    pub keywords: Vec<String>,
}

fn alias(capability: &str, patterns: &[&str]) -> CapabilityAlias {
    CapabilityAlias {
        capability: capability.into(),
        patterns: patterns.iter().map(|p| p.to_string()).collect(),
    }
}

fn hint(capability: &str, keywords: &[&str]) -> WorkflowHint {
    WorkflowHint {
        capability: capability.into(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

fn default_aliases() -> Vec<CapabilityAlias> {
    vec![
        alias("Magic", &["magic"]),
        alias("Context7", &["c7", "context7"]),
        alias("Sequential", &["sequential"]),
        alias("Puppeteer", &["puppeteer"]),
    ]
}

fn default_workflow_hints() -> Vec<WorkflowHint> {
    vec![
        hint("Context7", &["library", "research"]),
        hint("Sequential", &["complex", "analysis"]),
        hint("Magic", &["ui", "component"]),
        hint("Puppeteer", &["test", "browser"]),
    ]
}

// ---------------------------------------------------------------------------
// Detect options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime detection options, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct DetectOptions {
    /// Maximum documents processed at once. Always at least 1.
    pub concurrency: usize,
    /// Document file extensions.
    pub extensions: Vec<String>,
    /// Directory names skipped while walking.
    pub exclude_dirs: Vec<String>,
    /// Dialect parser tuning.
    pub dialect: DialectConfig,
    /// Capability name resolution.
    pub routing: RoutingConfig,
}

impl DetectOptions {
    /// Override the concurrency limit (clamped to at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for DetectOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            concurrency: (config.detect.concurrency as usize).max(1),
            extensions: config.detect.extensions.clone(),
            exclude_dirs: config.detect.exclude_dirs.clone(),
            dialect: config.dialect.clone(),
            routing: config.routing.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.kbforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| KbForgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.kbforge/kbforge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| KbForgeError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| KbForgeError::config(format!("failed to parse {}: {e}", path.display())))?;

    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| KbForgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| KbForgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| KbForgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject configs that would make detection meaningless.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.dialect.list_delimiter.is_empty() {
        return Err(KbForgeError::config("dialect.list_delimiter must not be empty"));
    }
    if config.dialect.fence_tags.is_empty() {
        return Err(KbForgeError::config("dialect.fence_tags must name at least one tag"));
    }
    if config.detect.extensions.is_empty() {
        return Err(KbForgeError::config("detect.extensions must name at least one extension"));
    }

    for alias in &config.routing.aliases {
        check_routing_entry("routing.aliases", &alias.capability, &alias.patterns)?;
    }
    for hint in &config.routing.workflow_hints {
        check_routing_entry("routing.workflow_hints", &hint.capability, &hint.keywords)?;
    }
    Ok(())
}

/// A routing entry that can never match is a mistake, not a no-op.
fn check_routing_entry(table: &str, capability: &str, needles: &[String]) -> Result<()> {
    if capability.trim().is_empty() {
        return Err(KbForgeError::validation(format!("{table}: capability must not be empty")));
    }
    if needles.iter().all(|n| n.trim().is_empty()) {
        return Err(KbForgeError::validation(format!(
            "{table}: entry for {capability} has nothing to match"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("list_delimiter"));
        assert!(toml_str.contains("Command_Integration"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.detect.concurrency, 4);
        assert_eq!(parsed.dialect.list_delimiter, " | ");
        assert_eq!(parsed.routing.aliases.len(), 4);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[detect]
concurrency = 8

[[routing.aliases]]
capability = "Indexer"
patterns = ["idx", "indexer"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.detect.concurrency, 8);
        assert_eq!(config.detect.extensions, vec!["yml", "yaml", "md"]);
        assert_eq!(config.routing.aliases.len(), 1);
        assert_eq!(config.routing.aliases[0].capability, "Indexer");
        // Untouched list keeps its defaults.
        assert_eq!(config.routing.workflow_hints.len(), 4);
    }

    #[test]
    fn detect_options_from_app_config() {
        let mut app = AppConfig::default();
        app.detect.concurrency = 0;
        let opts = DetectOptions::from(&app);
        assert_eq!(opts.concurrency, 1);
        assert_eq!(opts.dialect.passthrough_sections.len(), 2);

        let opts = opts.with_concurrency(16);
        assert_eq!(opts.concurrency, 16);
    }

    #[test]
    fn load_config_rejects_empty_delimiter() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("kbforge.toml");
        std::fs::write(&path, "[dialect]\nlist_delimiter = \"\"\n").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("list_delimiter"));
    }

    #[test]
    fn routing_entries_must_be_matchable() {
        let mut config = AppConfig::default();
        config.routing.aliases.push(CapabilityAlias {
            capability: "Indexer".into(),
            patterns: vec!["  ".into()],
        });
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, KbForgeError::Validation { .. }));
        assert!(err.to_string().contains("Indexer"));

        let mut config = AppConfig::default();
        config.routing.workflow_hints[0].capability.clear();
        assert!(validate_config(&config).is_err());

        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn load_config_reports_bad_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("kbforge.toml");
        std::fs::write(&path, "[detect\nconcurrency = ").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, KbForgeError::Config { .. }));
    }
}
