//! Strict parser: the whole text is one structured-data document.

use kbforge_shared::{KbForgeError, Result};
use serde_yaml::Value;

use crate::tree::{Mapping, Node};

/// Parse `text` as a single YAML document whose root is a mapping.
///
/// A blank or comment-only document is an empty tree. Any other non-mapping
/// root (prose reads as one long scalar) is rejected.
pub fn parse_strict(text: &str) -> Result<Mapping> {
    let value: Value = serde_yaml::from_str(text).map_err(|e| KbForgeError::parse(e.to_string()))?;

    match Node::from_yaml(value) {
        Node::Map(map) => Ok(map),
        Node::Null => Ok(Mapping::new()),
        other => Err(KbForgeError::parse(format!(
            "document root is a {}, expected a mapping",
            other.type_name()
        ))),
    }
}
