//! Renders a tree as a line oriented graph description for external visualization tools.
//!
//! One line per node, `<id> [label="<value>"]`, in pre-order, followed by one line per edge,
//! `<from>, <to>`, covering both children edges and next edges. Ids are positional and only
//! meaningful within a single rendering.

use crate::tree::Node;
use std::fmt::Display;
use std::io;

impl<T: Display> Node<T> {
    /// Renders this tree into a string
    pub fn render(&self) -> String {
        Graph::of(self)
            .lines()
            .map(|line| line + "\n")
            .collect()
    }

    /// Renders this tree into a writer
    pub fn render_to<W: io::Write>(&self, mut out: W) -> io::Result<()> {
        for line in Graph::of(self).lines() {
            writeln!(out, "{line}")?;
        }
        out.flush()
    }
}

#[derive(Default)]
struct Graph {
    labels: Vec<String>,
    edges: Vec<(usize, usize)>,
}

/// What is left to number
enum Step<'a, T> {
    /// a node, and the id of the node it hangs from
    Node(&'a Node<T>, Option<usize>),
    /// the rest of a next chain, and the id of the link before it
    Chain(&'a [Node<T>], usize),
}

impl Graph {
    /// Numbers the nodes in pre-order. Edges come out sorted by their target.
    fn of<T: Display>(root: &Node<T>) -> Self {
        let mut graph = Graph::default();
        let mut stack = vec![Step::Node(root, None)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Node(node, from) => {
                    let id = graph.labels.len();
                    graph.labels.push(node.value().to_string());
                    if let Some(from) = from {
                        graph.edges.push((from, id));
                    }
                    if !node.sequence().is_empty() {
                        stack.push(Step::Chain(node.sequence(), id));
                    }
                    stack.extend(
                        node.children()
                            .iter()
                            .rev()
                            .map(|child| Step::Node(child, Some(id))),
                    );
                }
                Step::Chain([next, rest @ ..], previous) => {
                    if !rest.is_empty() {
                        // `next` is numbered right after this step
                        stack.push(Step::Chain(rest, graph.labels.len()));
                    }
                    stack.push(Step::Node(next, Some(previous)));
                }
                Step::Chain([], _) => {}
            }
        }
        graph
    }

    /// Node lines in pre-order, then edge lines
    fn lines(&self) -> impl Iterator<Item = String> + '_ {
        let nodes = self
            .labels
            .iter()
            .enumerate()
            .map(|(id, label)| format!("n{id} [label=\"{}\"]", escape(label)));
        let edges = self
            .edges
            .iter()
            .map(|(from, to)| format!("n{from}, n{to}"));
        nodes.chain(edges)
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
