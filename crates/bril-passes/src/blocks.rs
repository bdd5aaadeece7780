//! Basic block formation.
//!
//! A block is a maximal run of nodes where a label may only come first and a
//! terminator may only come last. Formation is total and order-preserving:
//! [`flatten`] of [`form_blocks`] reproduces the original body.

use bril_ir::{Instruction, Node};

/// A contiguous run of nodes from one function body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BasicBlock {
    pub nodes: Vec<Node>,
}

impl BasicBlock {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The label naming this block, if it starts with one.
    pub fn label(&self) -> Option<&str> {
        self.nodes
            .first()
            .and_then(Node::as_label)
            .map(|l| l.label.as_str())
    }

    /// The terminator ending this block, if any.
    pub fn terminator(&self) -> Option<&Instruction> {
        self.nodes
            .last()
            .and_then(Node::as_instruction)
            .filter(|instr| instr.is_terminator())
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.nodes.iter().filter_map(Node::as_instruction)
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }
}

/// Split a function body into basic blocks.
pub fn form_blocks(nodes: impl IntoIterator<Item = Node>) -> Vec<BasicBlock> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for node in nodes {
        match node {
            Node::Instruction(instr) => {
                let ends_block = instr.is_terminator();
                current.push(Node::Instruction(instr));
                if ends_block {
                    blocks.push(BasicBlock::new(std::mem::take(&mut current)));
                }
            }
            Node::Label(label) => {
                if !current.is_empty() {
                    blocks.push(BasicBlock::new(std::mem::take(&mut current)));
                }
                current.push(Node::Label(label));
            }
        }
    }

    if !current.is_empty() {
        blocks.push(BasicBlock::new(current));
    }

    blocks
}

/// Concatenate blocks back into a flat body.
pub fn flatten(blocks: impl IntoIterator<Item = BasicBlock>) -> Vec<Node> {
    blocks.into_iter().flat_map(BasicBlock::into_nodes).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;

    fn sizes(blocks: &[BasicBlock]) -> Vec<usize> {
        blocks.iter().map(BasicBlock::len).collect()
    }

    #[test]
    fn empty_body_has_no_blocks() {
        assert!(form_blocks(Vec::new()).is_empty());
    }

    #[test]
    fn straight_line_is_one_block() {
        let body = vec![
            konst("a", 1),
            konst("b", 2),
            value("c", "add", ["a", "b"]),
            effect("print", ["c"]),
        ];
        let blocks = form_blocks(body);
        assert_eq!(sizes(&blocks), vec![4]);
        assert!(blocks[0].terminator().is_none());
    }

    #[test]
    fn terminators_end_blocks() {
        let body = vec![
            konst("a", 1),
            jmp("next"),
            konst("b", 2),
            ret(["b"]),
            effect("print", ["a"]),
        ];
        let blocks = form_blocks(body);
        assert_eq!(sizes(&blocks), vec![2, 2, 1]);
        assert_eq!(blocks[0].terminator().map(|t| t.op.as_str()), Some("jmp"));
        assert_eq!(blocks[1].terminator().map(|t| t.op.as_str()), Some("ret"));
    }

    #[test]
    fn labels_start_blocks() {
        let body = vec![
            konst("a", 1),
            label("loop"),
            value("a", "add", ["a", "a"]),
            br("c", "loop", "done"),
            label("done"),
            label("exit"),
            effect("print", ["a"]),
        ];
        let blocks = form_blocks(body);
        assert_eq!(sizes(&blocks), vec![1, 3, 1, 2]);
        assert_eq!(blocks[1].label(), Some("loop"));
        assert_eq!(blocks[2].label(), Some("done"));
        assert_eq!(blocks[3].label(), Some("exit"));
    }

    #[test]
    fn label_after_terminator_does_not_create_empty_block() {
        let body = vec![jmp("l"), label("l"), ret_void()];
        let blocks = form_blocks(body);
        assert_eq!(sizes(&blocks), vec![1, 2]);
    }

    #[test]
    fn flatten_restores_body() {
        let body = vec![
            label("entry"),
            konst("a", 1),
            br("a", "t", "f"),
            label("t"),
            effect("print", ["a"]),
            label("f"),
            ret(["a"]),
        ];
        assert_eq!(flatten(form_blocks(body.clone())), body);
    }
}
