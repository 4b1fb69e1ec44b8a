// src/structure/section.rs
// =============================================================================
// The section tree produced by the structurer.
//
// Nodes live in an arena (a Vec); a parent owns the indices of its children
// and a path-keyed index finds any node in one lookup. Serialization walks
// the tree and produces nested JSON objects:
//
//   { "<heading>": { "paragraphs": [...], "links": [...], "tables": [...],
//                    "subsections": { "<heading>": { ... } } } }
// =============================================================================

use std::collections::HashMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::resolver::ResolvedLink;

pub const PATH_SEPARATOR: &str = " > ";

/// The string form of a section path used as the statistics key.
pub fn path_key(path: &[String]) -> String {
    path.join(PATH_SEPARATOR)
}

/// A table cell entry: the cell's text, or the links found in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Links(Vec<ResolvedLink>),
}

/// One data row: header name → value, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    cells: Vec<(String, CellValue)>,
}

impl TableRow {
    /// Sets `key`, replacing an earlier value under the same header.
    pub fn insert(&mut self, key: String, value: CellValue) {
        match self.cells.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((key, value)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for TableRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (key, value) in &self.cells {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

pub type Table = Vec<TableRow>;

/// One heading's content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Heading texts from the root down to this section
    pub path: Vec<String>,
    pub level: u8,
    pub paragraphs: Vec<String>,
    pub tables: Vec<Table>,
    /// Links directly under this heading, not in deeper subsections
    pub links: Vec<ResolvedLink>,
    children: Vec<usize>,
}

impl Section {
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Default)]
pub struct SectionTree {
    nodes: Vec<Section>,
    roots: Vec<usize>,
    index: HashMap<Vec<String>, usize>,
}

impl SectionTree {
    /// Returns the node at `path`, creating it and any missing ancestors.
    ///
    /// `on_create` is called with the path of every node that gets created.
    /// Ancestors created here (never the case for a well-formed heading
    /// walk) get level 0. Returns None for an empty path.
    pub fn get_or_create(
        &mut self,
        path: &[String],
        level: u8,
        mut on_create: impl FnMut(&[String]),
    ) -> Option<usize> {
        let mut parent: Option<usize> = None;
        for depth in 1..=path.len() {
            let prefix = &path[..depth];
            let idx = match self.index.get(prefix) {
                Some(&idx) => idx,
                None => {
                    let idx = self.nodes.len();
                    self.nodes.push(Section {
                        path: prefix.to_vec(),
                        level: if depth == path.len() { level } else { 0 },
                        ..Section::default()
                    });
                    match parent {
                        Some(p) => self.nodes[p].children.push(idx),
                        None => self.roots.push(idx),
                    }
                    self.index.insert(prefix.to_vec(), idx);
                    on_create(prefix);
                    idx
                }
            };
            parent = Some(idx);
        }
        parent
    }

    pub fn get(&self, path: &[String]) -> Option<&Section> {
        self.index.get(path).map(|&idx| &self.nodes[idx])
    }

    pub(crate) fn section_mut(&mut self, idx: usize) -> &mut Section {
        &mut self.nodes[idx]
    }

    /// Top-level sections, in creation order.
    pub fn roots(&self) -> impl Iterator<Item = &Section> {
        self.roots.iter().map(|&idx| &self.nodes[idx])
    }

    pub fn subsections<'a>(&'a self, section: &'a Section) -> impl Iterator<Item = &'a Section> {
        section.children.iter().map(|&idx| &self.nodes[idx])
    }
}

impl Serialize for SectionTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SectionMap {
            tree: self,
            members: &self.roots,
        }
        .serialize(serializer)
    }
}

/// A set of sibling sections, serialized as `name → body`.
struct SectionMap<'a> {
    tree: &'a SectionTree,
    members: &'a [usize],
}

impl Serialize for SectionMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.members.len()))?;
        for &idx in self.members {
            let section = &self.tree.nodes[idx];
            map.serialize_entry(
                section.name(),
                &SectionBody {
                    tree: self.tree,
                    section,
                },
            )?;
        }
        map.end()
    }
}

struct SectionBody<'a> {
    tree: &'a SectionTree,
    section: &'a Section,
}

impl Serialize for SectionBody<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("paragraphs", &self.section.paragraphs)?;
        map.serialize_entry("links", &self.section.links)?;
        map.serialize_entry("tables", &self.section.tables)?;
        map.serialize_entry(
            "subsections",
            &SectionMap {
                tree: self.tree,
                members: &self.section.children,
            },
        )?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_get_or_create_reuses_nodes() {
        let mut tree = SectionTree::default();
        let mut created = Vec::new();

        let a = tree.get_or_create(&path(&["A"]), 1, |p| created.push(path_key(p)));
        let b = tree.get_or_create(&path(&["A", "B"]), 2, |p| created.push(path_key(p)));
        let a_again = tree.get_or_create(&path(&["A"]), 1, |p| created.push(path_key(p)));

        assert_eq!(a, a_again);
        assert_ne!(a, b);
        assert_eq!(created, vec!["A", "A > B"]);
        assert_eq!(tree.roots().count(), 1);
    }

    #[test]
    fn test_get_or_create_fills_missing_ancestors() {
        let mut tree = SectionTree::default();
        let mut created = Vec::new();

        tree.get_or_create(&path(&["A", "B", "C"]), 3, |p| created.push(path_key(p)));

        assert_eq!(created, vec!["A", "A > B", "A > B > C"]);
        assert_eq!(tree.get(&path(&["A", "B"])).unwrap().level, 0);
        assert_eq!(tree.get(&path(&["A", "B", "C"])).unwrap().level, 3);
        assert!(tree.get_or_create(&[], 1, |_| {}).is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let mut tree = SectionTree::default();
        let idx = tree.get_or_create(&path(&["A", "B"]), 2, |_| {}).unwrap();
        tree.section_mut(idx).paragraphs.push("hello".to_string());
        let mut row = TableRow::default();
        row.insert("Name".to_string(), CellValue::Text("x".to_string()));
        row.insert("Name".to_string(), CellValue::Text("y".to_string()));
        tree.section_mut(idx).tables.push(vec![row]);

        let json = serde_json::to_value(&tree).unwrap();

        assert_eq!(json["A"]["paragraphs"], serde_json::json!([]));
        let b = &json["A"]["subsections"]["B"];
        assert_eq!(b["paragraphs"], serde_json::json!(["hello"]));
        assert_eq!(b["tables"], serde_json::json!([[{"Name": "y"}]]));
        assert_eq!(b["subsections"], serde_json::json!({}));
    }
}
