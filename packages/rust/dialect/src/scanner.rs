//! Targeted line scanner: last-resort harvest for documents no parser accepts.
//!
//! Only flat `Key: "quoted value"` pairs are collected, grouped under the
//! named section they appear in and, when nested under a bare `Name:` line,
//! under that entity. No attempt is made to rebuild deeper structure.

use std::sync::LazyLock;

use regex::Regex;

use crate::tree::{Mapping, Node};

/// `Key: "value"` with any indentation.
static QUOTED_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\s*)([A-Za-z0-9_.\-]+):\s*"(.*)"\s*$"#).expect("quoted pair regex")
});

/// A bare `Name:` line that opens a nested block.
static BARE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)([A-Za-z0-9_.\-]+):\s*$").expect("bare key regex")
});

/// `## Name` header.
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^##\s+([A-Za-z0-9_.\-]+):?\s*$").expect("header regex")
});

/// Section currently being harvested.
struct OpenSection {
    name: String,
    /// Opened by a `## ` header (column-0 keys are entities) rather than by a
    /// column-0 `Name:` line (column-0 keys end the section).
    by_header: bool,
    entity: Option<(String, usize)>,
}

#[derive(Default)]
struct Harvest {
    pairs: Mapping,
    entities: Vec<(String, Mapping)>,
}

impl Harvest {
    fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.entities.iter().all(|(_, m)| m.is_empty())
    }

    fn into_mapping(self) -> Mapping {
        let mut out: Mapping = self
            .entities
            .into_iter()
            .filter(|(_, m)| !m.is_empty())
            .map(|(name, m)| (name, Node::Map(m)))
            .collect();
        out.extend_from(self.pairs);
        out
    }
}

/// Harvest quoted pairs inside any of `sections`.
///
/// The result maps section → entity → key → string, with section-level pairs
/// (not under an entity) stored directly under the section. Sections with
/// nothing harvested are omitted.
pub fn scan_sections(text: &str, sections: &[&str]) -> Mapping {
    let mut harvested: Vec<(String, Harvest)> = Vec::new();
    let mut open: Option<OpenSection> = None;

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(caps) = HEADER_RE.captures(line.trim_start()) {
            let name = &caps[1];
            open = sections.contains(&name).then(|| OpenSection {
                name: name.to_string(),
                by_header: true,
                entity: None,
            });
            continue;
        }

        let column_zero = !line.starts_with(char::is_whitespace);

        if let Some(caps) = BARE_KEY_RE.captures(line) {
            let name = &caps[2];
            if column_zero && sections.contains(&name) {
                open = Some(OpenSection {
                    name: name.to_string(),
                    by_header: false,
                    entity: None,
                });
                continue;
            }
        }

        let Some(section) = open.as_mut() else {
            continue;
        };

        // Any other column-0 line closes a section opened by its key.
        if column_zero && !section.by_header {
            open = None;
            continue;
        }

        if let Some(caps) = BARE_KEY_RE.captures(line) {
            section.entity = Some((caps[2].to_string(), caps[1].len()));
            continue;
        }

        let Some(caps) = QUOTED_PAIR_RE.captures(line) else {
            continue;
        };

        let indent = caps[1].len();
        let key = caps[2].to_string();
        let value = Node::Str(caps[3].to_string());

        let harvest = slot(&mut harvested, &section.name);
        match section.entity.take() {
            Some((entity, entity_indent)) if indent > entity_indent => {
                slot(&mut harvest.entities, &entity).insert(key, value);
                section.entity = Some((entity, entity_indent));
            }
            _ => harvest.pairs.insert(key, value),
        }
    }

    harvested
        .into_iter()
        .filter(|(_, harvest)| !harvest.is_empty())
        .map(|(name, harvest)| (name, Node::Map(harvest.into_mapping())))
        .collect()
}

/// Find or append the named slot, keeping first-seen order.
fn slot<'a, T: Default>(list: &'a mut Vec<(String, T)>, name: &str) -> &'a mut T {
    let index = match list.iter().position(|(n, _)| n == name) {
        Some(index) => index,
        None => {
            list.push((name.to_string(), T::default()));
            list.len() - 1
        }
    };
    &mut list[index].1
}
