//! Pattern graph builder
//!
//! Compiles a simplified line-notation string into a bond graph:
//!
//! - `C` / `O` add an atom bonded to the previous atom
//! - `(` remembers the current atom as a branch point
//! - `)` returns to the most recent branch point
//! - anything else (`=`, digits, whitespace, ...) is ignored
//!
//! Only tree-shaped graphs come out of this; there are no ring closures.

use std::collections::BTreeSet;

use crate::types::Element;

/// A target molecule's bond graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PatternGraph {
    nodes: Vec<Element>,
    /// Sorted neighbor indices per node
    adjacency: Vec<Vec<usize>>,
}

impl PatternGraph {
    /// Parse a line-notation pattern. Never fails; unknown characters are no-ops.
    pub fn parse(pattern: &str) -> Self {
        let mut nodes: Vec<Element> = Vec::new();
        let mut edges: Vec<BTreeSet<usize>> = Vec::new();
        let mut last: Option<usize> = None;
        let mut branches: Vec<usize> = Vec::new();

        for c in pattern.chars() {
            if let Some(element) = Element::from_symbol(c) {
                let idx = nodes.len();
                nodes.push(element);
                edges.push(BTreeSet::new());
                if let Some(prev) = last {
                    edges[prev].insert(idx);
                    edges[idx].insert(prev);
                }
                last = Some(idx);
                continue;
            }

            match c {
                '(' => {
                    if let Some(idx) = last {
                        branches.push(idx);
                    }
                }
                ')' => {
                    if let Some(idx) = branches.pop() {
                        last = Some(idx);
                    }
                }
                _ => {}
            }
        }

        Self {
            nodes,
            adjacency: edges
                .into_iter()
                .map(|set| set.into_iter().collect())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Element] {
        &self.nodes
    }

    pub fn element(&self, node: usize) -> Element {
        self.nodes[node]
    }

    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.adjacency[node]
    }

    pub fn degree(&self, node: usize) -> usize {
        self.adjacency[node].len()
    }

    /// Undirected edges as `(low, high)` pairs, sorted
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (a, neighbors) in self.adjacency.iter().enumerate() {
            for &b in neighbors {
                if a < b {
                    out.push((a, b));
                }
            }
        }
        out
    }
}

/// Free-function form of [`PatternGraph::parse`]
pub fn parse_graph(pattern: &str) -> PatternGraph {
    PatternGraph::parse(pattern)
}
