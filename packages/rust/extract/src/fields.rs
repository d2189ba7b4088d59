//! Shape-tolerant field readers shared by the extractors.
//!
//! Every reader treats a missing key (or an explicit null) as "unset". A value
//! of the wrong shape is skipped and reported as a [`FieldWarning`].

use std::fmt;

use kbforge_dialect::{Mapping, Node};

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// A field that was present but had an unexpected shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWarning {
    /// Dotted location, e.g. `Servers.Core.Capabilities`.
    pub path: String,
    pub expected: &'static str,
    pub found: &'static str,
}

impl FieldWarning {
    pub(crate) fn new(path: impl Into<String>, expected: &'static str, found: &Node) -> Self {
        Self {
            path: path.into(),
            expected,
            found: found.type_name(),
        }
    }
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: expected {}, found {}", self.path, self.expected, self.found)
    }
}

// ---------------------------------------------------------------------------
// Field access
// ---------------------------------------------------------------------------

/// One entity's field map plus its location, for warnings.
pub(crate) struct Fields<'a> {
    map: &'a Mapping,
    path: String,
    delimiter: &'a str,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(map: &'a Mapping, path: String, delimiter: &'a str) -> Self {
        Self {
            map,
            path,
            delimiter,
        }
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn delimiter(&self) -> &'a str {
        self.delimiter
    }

    pub(crate) fn map(&self) -> &'a Mapping {
        self.map
    }

    /// Present, non-null value of `key`.
    pub(crate) fn get(&self, key: &str) -> Option<&'a Node> {
        self.map.get(key).filter(|node| !matches!(node, Node::Null))
    }

    pub(crate) fn child_path(&self, key: &str) -> String {
        format!("{}.{key}", self.path())
    }

    /// A single scalar value, stringified.
    pub(crate) fn scalar(&self, key: &str, warnings: &mut Vec<FieldWarning>) -> Option<String> {
        let node = self.get(key)?;
        match scalar_text(node) {
            Some(text) => non_empty(text),
            None => {
                warnings.push(FieldWarning::new(self.child_path(key), "a scalar", node));
                None
            }
        }
    }

    /// A list of strings: either a sequence or one delimiter-joined string.
    pub(crate) fn list(&self, key: &str, warnings: &mut Vec<FieldWarning>) -> Vec<String> {
        let Some(node) = self.get(key) else {
            return Vec::new();
        };
        let path = self.child_path(key);
        match node {
            Node::Seq(items) => {
                let mut out = Vec::new();
                for item in items {
                    match scalar_text(item) {
                        Some(text) => {
                            if let Some(text) = non_empty(text) {
                                push_unique(&mut out, text);
                            }
                        }
                        None => warnings.push(FieldWarning::new(path.as_str(), "a string item", item)),
                    }
                }
                out
            }
            other => match scalar_text(other) {
                Some(text) => split_joined(&text, self.delimiter),
                None => {
                    warnings.push(FieldWarning::new(path, "a list of strings", other));
                    Vec::new()
                }
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Named entries of a top-level section whose values are field maps.
///
/// A missing section yields nothing. Entries that are not maps are skipped
/// with a warning.
pub(crate) fn entries<'a>(
    tree: &'a Mapping,
    section: &str,
    delimiter: &'a str,
    warnings: &mut Vec<FieldWarning>,
) -> Vec<(&'a str, Fields<'a>)> {
    let Some(map) = section_map(tree, section, warnings) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for (name, node) in map.iter() {
        let path = format!("{section}.{name}");
        match node {
            Node::Map(fields) => out.push((name, Fields::new(fields, path, delimiter))),
            Node::Null => {}
            other => warnings.push(FieldWarning::new(path, "a mapping", other)),
        }
    }
    out
}

/// A top-level section that must be a mapping when present.
pub(crate) fn section_map<'a>(
    tree: &'a Mapping,
    section: &str,
    warnings: &mut Vec<FieldWarning>,
) -> Option<&'a Mapping> {
    match tree.get(section)? {
        Node::Map(map) => Some(map),
        Node::Null => None,
        other => {
            warnings.push(FieldWarning::new(section, "a mapping", other));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Value helpers
// ---------------------------------------------------------------------------

/// Scalars stringify; sequences and maps do not.
pub(crate) fn scalar_text(node: &Node) -> Option<String> {
    match node {
        Node::Str(s) => Some(s.clone()),
        Node::Int(i) => Some(i.to_string()),
        Node::Float(f) => Some(f.to_string()),
        Node::Bool(b) => Some(b.to_string()),
        Node::Null | Node::Seq(_) | Node::Map(_) => None,
    }
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Split a delimiter-joined string into trimmed, non-empty, unique parts.
pub fn split_joined(text: &str, delimiter: &str) -> Vec<String> {
    if delimiter.is_empty() {
        return non_empty(text.to_string()).into_iter().collect();
    }

    let mut out = Vec::new();
    for part in text.split(delimiter) {
        let part = part.trim();
        if !part.is_empty() {
            push_unique(&mut out, part.to_string());
        }
    }
    out
}

/// Append unless already present.
pub(crate) fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbforge_dialect::parse_strict;

    fn fields_of(tree: &Mapping) -> Fields<'_> {
        Fields::new(tree, "Doc".into(), " | ")
    }

    #[test]
    fn list_accepts_sequence_or_joined_string() {
        let tree = parse_strict("seq: [scan, rank, scan]\njoined: \"scan | rank |  \"\nnum: 5\n").unwrap();
        let fields = fields_of(&tree);
        let mut warnings = Vec::new();

        assert_eq!(fields.list("seq", &mut warnings), vec!["scan", "rank"]);
        assert_eq!(fields.list("joined", &mut warnings), vec!["scan", "rank"]);
        assert_eq!(fields.list("num", &mut warnings), vec!["5"]);
        assert!(fields.list("absent", &mut warnings).is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn wrong_shapes_warn_and_skip() {
        let tree = parse_strict("Purpose: [a, b]\nList: {a: 1}\nMixed: [ok, {bad: 1}]\n").unwrap();
        let fields = fields_of(&tree);
        let mut warnings = Vec::new();

        assert_eq!(fields.scalar("Purpose", &mut warnings), None);
        assert!(fields.list("List", &mut warnings).is_empty());
        assert_eq!(fields.list("Mixed", &mut warnings), vec!["ok"]);

        assert_eq!(warnings.len(), 3);
        assert_eq!(warnings[0].to_string(), "Doc.Purpose: expected a scalar, found sequence");
        assert_eq!(warnings[1].found, "mapping");
    }

    #[test]
    fn null_and_blank_scalars_are_unset() {
        let tree = parse_strict("a: ~\nb: \"  \"\nc: \" padded \"\n").unwrap();
        let fields = fields_of(&tree);
        let mut warnings = Vec::new();
        assert_eq!(fields.scalar("a", &mut warnings), None);
        assert_eq!(fields.scalar("b", &mut warnings), None);
        assert_eq!(fields.scalar("c", &mut warnings).as_deref(), Some("padded"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn entries_skip_non_map_values() {
        let tree = parse_strict("Servers:\n  Core:\n    Purpose: x\n  Broken: just a string\n  Empty:\n").unwrap();
        let mut warnings = Vec::new();
        let found = entries(&tree, "Servers", " | ", &mut warnings);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "Core");
        assert_eq!(found[0].1.path(), "Servers.Core");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].path, "Servers.Broken");
    }

    #[test]
    fn split_joined_with_empty_delimiter_keeps_whole_text() {
        assert_eq!(split_joined(" a | b ", ""), vec!["a | b"]);
        assert_eq!(split_joined("a,b", ","), vec!["a", "b"]);
    }
}
