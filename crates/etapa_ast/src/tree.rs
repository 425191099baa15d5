//! The generic syntax tree

use etapa_tokens::location::{Span, Spanned};
use etapa_tokens::LexicalValue;
use std::fmt::{Display, Formatter};

/// A syntax tree whose nodes carry [LexicalValue]s
pub type SyntaxNode = Node<LexicalValue>;

/// A node of a syntax tree.
///
/// Besides its ordered `children`, which hold the fixed structural parts of a construct (the
/// condition and body of an `if`, the operands of an operator), a node can head a *sequence
/// chain*: the nodes that logically follow it, each one the `next` of the previous, used
/// for variable length constructs such as statement or argument lists.
///
/// A node exclusively owns both its children and its chain. The chain is kept flat on its
/// head, so appending to it never walks it.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    value: T,
    span: Span,
    children: Vec<Node<T>>,
    sequence: Vec<Node<T>>,
}

impl<T> Node<T> {
    /// Creates a leaf node, with no children and no next
    pub fn new(value: T, span: Span) -> Self {
        Self {
            value,
            span,
            children: vec![],
            sequence: vec![],
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// The ordered structural children of this node
    pub fn children(&self) -> &[Node<T>] {
        &self.children
    }

    /// Gets a child by position
    pub fn child(&self, index: usize) -> Option<&Node<T>> {
        self.children.get(index)
    }

    /// Appends a child
    pub fn add_child(&mut self, child: Node<T>) {
        self.children.push(child);
    }

    /// Appends a child, builder style
    pub fn with_child(mut self, child: Node<T>) -> Self {
        self.add_child(child);
        self
    }

    /// Appends `node` at the tail of this node's sequence chain. If `node` heads a chain of its
    /// own, that chain follows it.
    pub fn append_sequence(&mut self, mut node: Node<T>) {
        let tail = std::mem::take(&mut node.sequence);
        self.sequence.reserve(tail.len() + 1);
        self.sequence.push(node);
        self.sequence.extend(tail);
    }

    /// Appends to the sequence chain, builder style
    pub fn with_next(mut self, node: Node<T>) -> Self {
        self.append_sequence(node);
        self
    }

    /// The node directly following this one in its chain
    pub fn next(&self) -> Option<&Node<T>> {
        self.sequence.first()
    }

    /// Every node chained after this one, in order
    pub fn sequence(&self) -> &[Node<T>] {
        &self.sequence
    }

    /// Length of the chain headed by this node, including itself
    pub fn chain_len(&self) -> usize {
        1 + self.sequence.len()
    }

    /// Visits the value of every node of this tree in pre-order: a node's own value, then its
    /// children in order, then its chain in order.
    pub fn for_each<F: FnMut(&T)>(&self, mut visitor: F) {
        self.iter().for_each(|node| visitor(&node.value))
    }

    /// Iterates over every node of this tree, in the same order as [`for_each`](Self::for_each)
    pub fn iter(&self) -> Nodes<'_, T> {
        Nodes { stack: vec![self] }
    }

    /// The total number of nodes of this tree, chains included
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Creates a new tree of the same shape with every value replaced by `f(value)`.
    ///
    /// `f` is called in the same order as [`for_each`](Self::for_each) visits values.
    pub fn transform<U, F: FnMut(&T) -> U>(&self, mut f: F) -> Node<U> {
        enum Frame<'a, T, U> {
            Visit(&'a Node<T>),
            Build(&'a Node<T>, U),
        }

        let value = f(&self.value);
        let mut frames = self
            .sequence
            .iter()
            .rev()
            .chain(self.children.iter().rev())
            .map(Frame::Visit)
            .collect::<Vec<_>>();
        // finished subtrees, in pre-order
        let mut built: Vec<Node<U>> = vec![];
        while let Some(frame) = frames.pop() {
            match frame {
                Frame::Visit(node) => {
                    let value = f(&node.value);
                    frames.push(Frame::Build(node, value));
                    frames.extend(node.sequence.iter().rev().map(Frame::Visit));
                    frames.extend(node.children.iter().rev().map(Frame::Visit));
                }
                Frame::Build(node, value) => {
                    let sequence = built.split_off(built.len() - node.sequence.len());
                    let children = built.split_off(built.len() - node.children.len());
                    built.push(Node {
                        value,
                        span: node.span.clone(),
                        children,
                        sequence,
                    });
                }
            }
        }
        let sequence = built.split_off(self.children.len());
        Node {
            value,
            span: self.span.clone(),
            children: built,
            sequence,
        }
    }
}

impl<T> Drop for Node<T> {
    fn drop(&mut self) {
        // flattened so deep trees don't drop recursively
        let mut pending = std::mem::take(&mut self.children);
        pending.append(&mut self.sequence);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
            pending.append(&mut node.sequence);
        }
    }
}

impl<T> Spanned for Node<T> {
    fn span(&self) -> Span {
        self.span.clone()
    }
}

impl<T: Display> Display for Node<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f)
    }
}

impl<'a, T> IntoIterator for &'a Node<T> {
    type Item = &'a Node<T>;
    type IntoIter = Nodes<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A pre-order iterator over the nodes of a tree
#[derive(Debug)]
pub struct Nodes<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iterator for Nodes<'a, T> {
    type Item = &'a Node<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.sequence.iter().rev());
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etapa_tokens::{Keyword, Operator, Position, SourceId};

    fn span() -> Span {
        Span::point(SourceId::anonymous(), Position::start())
    }

    fn leaf<V: Into<LexicalValue>>(v: V) -> SyntaxNode {
        Node::new(v.into(), span())
    }

    fn values<T: Clone>(node: &Node<T>) -> Vec<T> {
        let mut collected = vec![];
        node.for_each(|v| collected.push(v.clone()));
        collected
    }

    #[test]
    fn test_leaf() {
        let node = leaf(42_i64);
        assert!(node.children().is_empty());
        assert!(node.next().is_none());
        assert_eq!(node.len(), 1);
        assert_eq!(node.to_string(), "42");
    }

    #[test]
    fn test_for_each_counts_children() {
        // builds trees of varying width and depth purely through add_child
        fn build(depth: i64, width: i64) -> SyntaxNode {
            let mut node = leaf(depth);
            if depth > 0 {
                for _ in 0..width {
                    node.add_child(build(depth - 1, width));
                }
            }
            node
        }
        fn expected(node: &SyntaxNode) -> usize {
            1 + node.children().iter().map(expected).sum::<usize>()
        }

        for (depth, width) in [(0, 0), (1, 3), (3, 2), (4, 1), (2, 5)] {
            let tree = build(depth, width);
            let mut visits = 0;
            tree.for_each(|_| visits += 1);
            assert_eq!(visits, expected(&tree));
        }
    }

    #[test]
    fn test_never_revisits() {
        let tree = leaf(0_i64)
            .with_child(leaf(1_i64).with_child(leaf(2_i64)).with_next(leaf(3_i64)))
            .with_child(leaf(4_i64))
            .with_next(leaf(5_i64).with_child(leaf(6_i64)))
            .with_next(leaf(7_i64));
        let pointers = tree
            .iter()
            .map(|node| node as *const SyntaxNode)
            .collect::<Vec<_>>();
        let mut deduped = pointers.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(pointers.len(), deduped.len());
        assert_eq!(tree.len(), 8);
    }

    #[test]
    fn test_pre_order() {
        let tree = leaf(Keyword::If)
            .with_child(leaf(Operator::LessThan).with_child(leaf(1_i64)).with_child(leaf(2_i64)))
            .with_child(leaf(Keyword::Output).with_child(leaf(3_i64)).with_next(leaf(Keyword::Return)))
            .with_next(leaf(Keyword::While));
        let formatted = values(&tree)
            .iter()
            .map(LexicalValue::format)
            .collect::<Vec<_>>();
        assert_eq!(
            formatted,
            vec!["if", "<", "1", "2", "output", "3", "return", "while"]
        );
    }

    #[test]
    fn test_for_each_is_restartable() {
        let tree = leaf(1_i64).with_child(leaf(2_i64)).with_next(leaf(3_i64));
        assert_eq!(values(&tree), values(&tree));
    }

    #[test]
    fn test_append_sequence_order() {
        let mut head = leaf(0_i64);
        for i in 1..=100_i64 {
            head.append_sequence(leaf(i));
        }
        assert_eq!(head.chain_len(), 101);
        assert_eq!(head.next().map(|n| n.value().clone()), Some(LexicalValue::from(1_i64)));
        assert_eq!(values(&head), (0..=100_i64).map(LexicalValue::from).collect::<Vec<_>>());
    }

    #[test]
    fn test_append_sequence_is_linear() {
        let mut head = leaf(0_i64);
        let n = 200_000;
        for i in 0..n {
            head.append_sequence(leaf(i));
        }
        assert_eq!(head.sequence().len(), n as usize);
        assert_eq!(head.sequence().last().map(|n| n.value().clone()), Some(LexicalValue::from(n - 1)));
    }

    #[test]
    fn test_append_chain_is_spliced() {
        let mut head = leaf(1_i64);
        head.append_sequence(leaf(2_i64).with_next(leaf(3_i64)));
        head.append_sequence(leaf(4_i64));
        assert_eq!(head.chain_len(), 4);
        assert!(head.sequence().iter().all(|node| node.sequence().is_empty()));
        assert_eq!(
            values(&head),
            (1..=4_i64).map(LexicalValue::from).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_transform_functor_law() {
        let tree = leaf(1_i64)
            .with_child(leaf(2_i64).with_child(leaf(3_i64)))
            .with_child(leaf(4_i64).with_next(leaf(5_i64)))
            .with_next(leaf(6_i64).with_child(leaf(7_i64)));
        let f = |v: &LexicalValue| match v {
            LexicalValue::IntLiteral(i) => LexicalValue::IntLiteral(i * 10),
            other => other.clone(),
        };
        let transformed = tree.transform(f);
        let mapped = values(&tree).iter().map(f).collect::<Vec<_>>();
        assert_eq!(values(&transformed), mapped);
        assert_eq!(transformed.len(), tree.len());
        assert_eq!(transformed.children().len(), tree.children().len());
        assert_eq!(transformed.chain_len(), tree.chain_len());
    }

    #[test]
    fn test_transform_changes_value_type() {
        let tree = leaf(1_i64).with_child(leaf('c')).with_next(leaf(true));
        let lengths = tree.transform(|v| v.format().len());
        assert_eq!(values(&lengths), vec![1, 1, 4]);
        // the source tree is left untouched
        assert_eq!(tree.to_string(), "1");
    }

    #[test]
    fn test_transform_keeps_shape() {
        let tree = leaf(1_i64)
            .with_child(leaf(2_i64).with_child(leaf(3_i64)).with_next(leaf(4_i64)))
            .with_child(leaf(5_i64))
            .with_next(leaf(6_i64).with_child(leaf(7_i64).with_next(leaf(8_i64))))
            .with_next(leaf(9_i64));
        assert_eq!(tree.transform(LexicalValue::clone), tree);
    }

    #[test]
    fn test_deep_tree() {
        let depth = 100_000_i64;
        let mut tree = leaf(0_i64);
        for i in 1..depth {
            tree = leaf(i).with_child(tree);
        }
        assert_eq!(tree.len(), depth as usize);
        let doubled = tree.transform(|v| match v {
            LexicalValue::IntLiteral(i) => i * 2,
            _ => -1,
        });
        assert_eq!(doubled.len(), depth as usize);
        assert_eq!(doubled.iter().last().map(|n| *n.value()), Some(0));
        assert_eq!(*doubled.value(), (depth - 1) * 2);
    }
}
