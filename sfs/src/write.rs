//! Writing a tree back to save-file text.

use std::fmt::Write as _;

use crate::node::{Block, Node};

/// Save-file text for the children of `root`, which is how a parsed file's root is written.
pub fn to_sfs(root: &Block) -> String {
    let mut out = String::new();
    for child in &root.children {
        write_node(&mut out, child, 0);
    }
    out
}

/// Save-file text for a single node, including its own name.
pub fn node_to_sfs(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    match node {
        Node::Leaf(leaf) => {
            indent(out, depth);
            writeln!(out, "{} = {}", leaf.name, leaf.raw).ok();
        }
        Node::Block(block) => {
            indent(out, depth);
            out.push_str(&block.name);
            out.push('\n');
            indent(out, depth);
            out.push_str("{\n");
            for child in &block.children {
                write_node(out, child, depth + 1);
            }
            indent(out, depth);
            out.push_str("}\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Leaf;
    use crate::parser::{parse, ParseOptions};

    #[test]
    fn writes_tab_indented_blocks() {
        let root = Block::new("").with_child(
            Block::new("GAME")
                .with_child(Leaf::new("linkURL", ""))
                .with_child(Block::new("PARAMETERS").with_child(Leaf::new("preset", "Normal"))),
        );
        assert_eq!(
            to_sfs(&root),
            "GAME\n{\n\tlinkURL = \n\tPARAMETERS\n\t{\n\t\tpreset = Normal\n\t}\n}\n"
        );
    }

    #[test]
    fn written_text_parses_back() {
        let src = "GAME { Title = A = B\nVESSEL { pos = 1,2,3 }\nVESSEL { }\nempty =\n}";
        let parsed = parse(src, &ParseOptions::default()).unwrap();
        let reparsed = parse(&to_sfs(&parsed.root), &ParseOptions::default()).unwrap();
        assert_eq!(reparsed.root, parsed.root);
    }

    #[test]
    fn single_node() {
        let node = Node::Leaf(Leaf::new("UT", "12.5"));
        assert_eq!(node_to_sfs(&node), "UT = 12.5\n");
    }
}
