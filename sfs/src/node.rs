//! The tree a save file parses into.

use crate::scalar::Scalar;

/// One entry of a block: either a nested block or a `key = value` leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Block(Block),
    Leaf(Leaf),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Block(b) => &b.name,
            Node::Leaf(l) => &l.name,
        }
    }

    /// 1-based source line the node started on, or 0 for nodes built in code.
    pub fn line(&self) -> usize {
        match self {
            Node::Block(b) => b.line,
            Node::Leaf(l) => l.line,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Node::Block(b) => Some(b),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Node::Block(_) => None,
            Node::Leaf(l) => Some(l),
        }
    }

    /// Number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        match self {
            Node::Block(b) => b.descendant_count(),
            Node::Leaf(_) => 0,
        }
    }
}

/// A named block. Children keep their source order, and names may repeat.
///
/// Equality compares names, values and children. Source lines are ignored, so a tree written
/// out and parsed again compares equal to the original.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub name: String,
    pub line: usize,
    pub children: Vec<Node>,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Block {
            name: name.into(),
            line: 0,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// The `occurrence`-th child called `name`, counting from 0.
    pub fn find(&self, name: &str, occurrence: usize) -> Option<&Node> {
        self.children
            .iter()
            .filter(|child| child.name() == name)
            .nth(occurrence)
    }

    /// The first leaf called `name`.
    pub fn leaf(&self, name: &str) -> Option<&Leaf> {
        self.children
            .iter()
            .filter_map(Node::as_leaf)
            .find(|leaf| leaf.name == name)
    }

    /// The first block called `name`.
    pub fn block(&self, name: &str) -> Option<&Block> {
        self.children
            .iter()
            .filter_map(Node::as_block)
            .find(|block| block.name == name)
    }

    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.children == other.children
    }
}

/// A `key = value` line. `raw` is the value text exactly as it appeared, `value` is what the
/// parser decoded it to (a [`Scalar::Str`] of the same text when it was not coerced).
#[derive(Debug, Clone)]
pub struct Leaf {
    pub name: String,
    pub line: usize,
    pub raw: String,
    pub value: Scalar,
}

impl Leaf {
    /// A leaf whose value is left uncoerced.
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Leaf {
            name: name.into(),
            line: 0,
            value: Scalar::Str(raw.clone()),
            raw,
        }
    }
}

impl PartialEq for Leaf {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.raw == other.raw && self.value == other.value
    }
}

impl From<Block> for Node {
    fn from(b: Block) -> Self {
        Node::Block(b)
    }
}

impl From<Leaf> for Node {
    fn from(l: Leaf) -> Self {
        Node::Leaf(l)
    }
}
