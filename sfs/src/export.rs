//! Turning a tree into JSON.
//!
//! Blocks become objects with keys in source order, leaves become strings (their raw text) or,
//! with recursive interpretation, whatever [`scalar::decode`] makes of them. A JSON object
//! cannot hold the same key twice, so repeated sibling names are handled per [`DuplicateKeys`].
//!
//! [`to_json`] builds a [`serde_json::Value`]. [`JsonView`] serializes the same document
//! straight to a writer without building it in memory first, which matters for large saves.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Value};
use tracing::*;

use crate::node::{Block, Leaf, Node};
use crate::path::Resolved;
use crate::scalar::{self, Scalar};

/// What happens to siblings that share a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeys {
    /// All of them go into an array, at the position of the first one. Array indices then match
    /// the occurrence indices of paths.
    #[default]
    Array,
    /// Only the last one is kept, at the position of the first one. This loses data.
    LastWins,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Emit typed JSON values for every leaf instead of its raw text.
    pub recursive: bool,
    pub duplicate_keys: DuplicateKeys,
}

/// Children of `block` grouped by name, in order of first appearance.
fn group_children(block: &Block) -> IndexMap<&str, Vec<&Node>> {
    let mut groups: IndexMap<&str, Vec<&Node>> = IndexMap::with_capacity(block.children.len());
    for child in &block.children {
        groups.entry(child.name()).or_default().push(child);
    }
    groups
}

fn leaf_scalar(leaf: &Leaf, options: &ExportOptions) -> Scalar {
    if options.recursive {
        scalar::decode(&leaf.raw)
    } else {
        Scalar::Str(leaf.raw.clone())
    }
}

pub fn leaf_to_json(leaf: &Leaf, options: &ExportOptions) -> Value {
    if options.recursive {
        Value::from(&scalar::decode(&leaf.raw))
    } else {
        Value::String(leaf.raw.clone())
    }
}

pub fn block_to_json(block: &Block, options: &ExportOptions) -> Value {
    let groups = group_children(block);
    let mut map = Map::with_capacity(groups.len());

    for (name, mut nodes) in groups {
        let value = match options.duplicate_keys {
            DuplicateKeys::Array if nodes.len() > 1 => {
                Value::Array(nodes.into_iter().map(|n| node_to_json(n, options)).collect())
            }
            _ => {
                if nodes.len() > 1 {
                    trace!(name, count = nodes.len(), "keeping only the last duplicate");
                }
                match nodes.pop() {
                    Some(node) => node_to_json(node, options),
                    None => continue,
                }
            }
        };
        map.insert(name.to_string(), value);
    }

    Value::Object(map)
}

pub fn node_to_json(node: &Node, options: &ExportOptions) -> Value {
    match node {
        Node::Block(b) => block_to_json(b, options),
        Node::Leaf(l) => leaf_to_json(l, options),
    }
}

/// Export whatever a path resolved to.
pub fn to_json(resolved: Resolved<'_>, options: &ExportOptions) -> Value {
    match resolved {
        Resolved::Subtree(b) => block_to_json(b, options),
        Resolved::Value(l) => leaf_to_json(l, options),
    }
}

/// Serializes a subtree exactly like [`to_json`] would.
#[derive(Debug, Clone, Copy)]
pub struct JsonView<'t> {
    target: Resolved<'t>,
    options: ExportOptions,
}

impl<'t> JsonView<'t> {
    pub fn new(target: Resolved<'t>, options: ExportOptions) -> Self {
        JsonView { target, options }
    }

    pub fn block(block: &'t Block, options: ExportOptions) -> Self {
        JsonView::new(Resolved::Subtree(block), options)
    }

    fn node(node: &'t Node, options: ExportOptions) -> Self {
        JsonView::new(node.into(), options)
    }
}

impl Serialize for JsonView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let block = match self.target {
            Resolved::Value(leaf) => return leaf_scalar(leaf, &self.options).serialize(serializer),
            Resolved::Subtree(block) => block,
        };

        let groups = group_children(block);
        let mut map = serializer.serialize_map(Some(groups.len()))?;
        for (name, nodes) in &groups {
            match (self.options.duplicate_keys, nodes.as_slice()) {
                (DuplicateKeys::Array, many @ [_, _, ..]) => {
                    map.serialize_entry(name, &Occurrences(many, self.options))?;
                }
                (_, [.., last]) => {
                    map.serialize_entry(name, &JsonView::node(last, self.options))?;
                }
                (_, []) => {}
            }
        }
        map.end()
    }
}

struct Occurrences<'a, 't>(&'a [&'t Node], ExportOptions);

impl Serialize for Occurrences<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for node in self.0 {
            seq.serialize_element(&JsonView::node(node, self.1))?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tech_tree() -> Block {
        Block::new("SCENARIO")
            .with_child(Leaf::new("name", "ResearchAndDevelopment"))
            .with_child(Block::new("Tech").with_child(Leaf::new("id", "start")))
            .with_child(Leaf::new("sci", "12.5"))
            .with_child(Block::new("Tech").with_child(Leaf::new("id", "basicRocketry")))
    }

    #[test]
    fn duplicates_become_arrays() {
        let value = block_to_json(&tech_tree(), &ExportOptions::default());
        assert_eq!(
            value,
            json!({
                "name": "ResearchAndDevelopment",
                "Tech": [{"id": "start"}, {"id": "basicRocketry"}],
                "sci": "12.5",
            })
        );
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["name", "Tech", "sci"]);
    }

    #[test]
    fn last_wins_keeps_first_position() {
        let options = ExportOptions {
            duplicate_keys: DuplicateKeys::LastWins,
            ..Default::default()
        };
        let value = block_to_json(&tech_tree(), &options);
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["name", "Tech", "sci"]);
        assert_eq!(value["Tech"], json!({"id": "basicRocketry"}));
    }

    #[test]
    fn boolean_export_depends_on_recursion() {
        let leaf = Leaf::new("RETROGRADE", "True");
        assert_eq!(leaf_to_json(&leaf, &ExportOptions::default()), json!("True"));
        let recursive = ExportOptions {
            recursive: true,
            ..Default::default()
        };
        assert_eq!(leaf_to_json(&leaf, &recursive), json!(true));
    }

    #[test]
    fn recursive_export_types_values() {
        let block = Block::new("VESSEL")
            .with_child(Leaf::new("pos", "1.5,-2,0"))
            .with_child(Leaf::new("stg", "3"))
            .with_child(Leaf::new("name", "Kerbal X"));
        let options = ExportOptions {
            recursive: true,
            ..Default::default()
        };
        assert_eq!(
            block_to_json(&block, &options),
            json!({"pos": [1.5, -2, 0], "stg": 3, "name": "Kerbal X"})
        );
    }

    #[test]
    fn streaming_matches_value() {
        let tree = tech_tree();
        for duplicate_keys in [DuplicateKeys::Array, DuplicateKeys::LastWins] {
            for recursive in [false, true] {
                let options = ExportOptions {
                    recursive,
                    duplicate_keys,
                };
                let streamed = serde_json::to_value(JsonView::block(&tree, options)).unwrap();
                assert_eq!(streamed, block_to_json(&tree, &options));
            }
        }
    }

    #[test]
    fn resolved_leaf_exports_as_scalar() {
        let leaf = Leaf::new("UT", "12.5");
        let options = ExportOptions {
            recursive: true,
            ..Default::default()
        };
        assert_eq!(to_json(Resolved::Value(&leaf), &options), json!(12.5));
        assert_eq!(
            serde_json::to_string(&JsonView::new(Resolved::Value(&leaf), options)).unwrap(),
            "12.5"
        );
    }
}
