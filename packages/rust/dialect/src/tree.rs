//! The dialect-agnostic parse tree shared by every parser.
//!
//! Maps keep their source order so that list fields harvested from them come
//! out in first-seen order.

use serde_yaml::Value;

/// A node of a parsed document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Node>),
    Map(Mapping),
}

impl Node {
    /// Borrow the string payload, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Node]> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Short shape name used in warnings.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) | Self::Float(_) => "number",
            Self::Str(_) => "string",
            Self::Seq(_) => "sequence",
            Self::Map(_) => "mapping",
        }
    }

    /// Convert a YAML value, stringifying scalar keys.
    pub fn from_yaml(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::Str(s),
            Value::Sequence(items) => Self::Seq(items.into_iter().map(Self::from_yaml).collect()),
            Value::Mapping(map) => Self::Map(Mapping::from_yaml(map)),
            Value::Tagged(tagged) => Self::from_yaml(tagged.value),
        }
    }
}

/// An insertion-ordered string-keyed map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: Node) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shallow merge: every top-level key of `other` overwrites ours.
    pub fn extend_from(&mut self, other: Mapping) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    fn from_yaml(map: serde_yaml::Mapping) -> Self {
        let mut out = Self::new();
        for (key, value) in map {
            if let Some(key) = key_string(&key) {
                out.insert(key, Node::from_yaml(value));
            }
        }
        out
    }
}

impl FromIterator<(String, Node)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (key, value) in iter {
            out.insert(key, value);
        }
        out
    }
}

/// Scalar keys become strings; complex keys are dropped.
fn key_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Tagged(tagged) => key_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_yaml_preserving_key_order() {
        let value: Value = serde_yaml::from_str("zeta: 1\nalpha: two\nmid: [a, b]\n").unwrap();
        let node = Node::from_yaml(value);
        let map = node.as_map().expect("mapping");

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(map.get("zeta"), Some(&Node::Int(1)));
        assert_eq!(map.get("alpha").and_then(Node::as_str), Some("two"));
        assert_eq!(map.get("mid").and_then(Node::as_seq).map(<[Node]>::len), Some(2));
    }

    #[test]
    fn numeric_and_bool_keys_are_stringified() {
        let value: Value = serde_yaml::from_str("1: one\ntrue: yes\n").unwrap();
        let node = Node::from_yaml(value);
        let map = node.as_map().expect("mapping");
        assert!(map.get("1").is_some());
        assert!(map.get("true").is_some());
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut map = Mapping::new();
        map.insert("a", Node::Int(1));
        map.insert("b", Node::Int(2));
        map.insert("a", Node::Int(3));

        assert_eq!(map.len(), 2);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&Node::Int(3)));
    }

    #[test]
    fn extend_from_lets_later_keys_win() {
        let mut first: Mapping = [("Servers".to_string(), Node::Str("old".into()))]
            .into_iter()
            .collect();
        let second: Mapping = [
            ("Servers".to_string(), Node::Str("new".into())),
            ("Extra".to_string(), Node::Null),
        ]
        .into_iter()
        .collect();

        first.extend_from(second);
        assert_eq!(first.get("Servers").and_then(Node::as_str), Some("new"));
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn type_names() {
        assert_eq!(Node::Null.type_name(), "null");
        assert_eq!(Node::Float(1.5).type_name(), "number");
        assert_eq!(Node::Seq(vec![]).type_name(), "sequence");
    }
}
