//! Subgraph matcher - finds where a target molecule is spelled out on the board
//!
//! A match assigns every pattern atom to a distinct board cell holding the same
//! element, such that bonded atoms sit on 4-directionally adjacent cells.
//!
//! The search is a constrained backtracking walk:
//!
//! 1. The pattern atom with the most bonds is the root; it is tried on every
//!    board cell holding its element.
//! 2. The next atom to place is the unplaced one with the most placed
//!    neighbors (most-constrained first).
//! 3. Its candidate cells are the intersection of the matching neighbors of
//!    all its already-placed neighbors.
//!
//! Every complete assignment is deduplicated by its cell set and ranked; the
//! best one wins (see [`MatchCandidate::preference`]).

use std::cmp::Ordering;
use std::collections::HashSet;

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::pattern::PatternGraph;
use crate::types::{Cell, Coord};

/// A complete embedding of a pattern into the board
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchCandidate {
    /// Board cell of each pattern node, indexed by node
    coords: Vec<Coord>,
    max_y: i32,
    min_x: i32,
    signature: String,
}

impl MatchCandidate {
    /// Build a candidate from per-node coordinates
    pub fn new(coords: Vec<Coord>) -> Self {
        let max_y = coords.iter().map(|c| c.y).max().unwrap_or(0);
        let min_x = coords.iter().map(|c| c.x).min().unwrap_or(0);
        let signature = signature_of(&coords);
        Self {
            coords,
            max_y,
            min_x,
            signature,
        }
    }

    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    /// Lowest row touched by the match (largest y)
    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    /// Leftmost column touched by the match
    pub fn min_x(&self) -> i32 {
        self.min_x
    }

    /// Canonical `x,y` list sorted by row then column
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn atom_count(&self) -> usize {
        self.coords.len()
    }

    /// Ordering where `Greater` means `self` is the better match.
    ///
    /// Lower on the board wins, then further left, then the smaller signature.
    pub fn preference(&self, other: &Self) -> Ordering {
        self.max_y
            .cmp(&other.max_y)
            .then_with(|| other.min_x.cmp(&self.min_x))
            .then_with(|| other.signature.cmp(&self.signature))
    }

    /// Check that this candidate really embeds `graph` in `board`
    pub fn is_valid_for(&self, graph: &PatternGraph, board: &Board) -> bool {
        if self.coords.len() != graph.len() {
            return false;
        }

        let distinct: HashSet<Coord> = self.coords.iter().copied().collect();
        if distinct.len() != self.coords.len() {
            return false;
        }

        let elements_ok = self
            .coords
            .iter()
            .enumerate()
            .all(|(node, &c)| board.cell_at(c) == Some(Cell::from(graph.element(node))));

        elements_ok
            && graph
                .edges()
                .iter()
                .all(|&(a, b)| self.coords[a].is_adjacent(self.coords[b]))
    }
}

fn signature_of(coords: &[Coord]) -> String {
    let mut sorted: Vec<Coord> = coords.to_vec();
    sorted.sort_by_key(|c| (c.y, c.x));
    sorted
        .iter()
        .map(|c| format!("{},{}", c.x, c.y))
        .collect::<Vec<_>>()
        .join("|")
}

/// Find the best occurrence of `graph` on `board`, if any.
///
/// `None` is the normal "not yet built" answer, not an error.
pub fn find_best_match(graph: &PatternGraph, board: &Board) -> Option<MatchCandidate> {
    if graph.is_empty() {
        return None;
    }

    let mut search = Search::new(graph, board);
    search.run();
    search.best
}

/// Backtracking state for one search
struct Search<'a> {
    graph: &'a PatternGraph,
    board: &'a Board,
    /// Pattern node -> assigned board cell
    assignment: Vec<Option<Coord>>,
    /// Board cell (flat index) -> already used by the partial assignment
    used: Vec<bool>,
    assigned: usize,
    seen: HashSet<String>,
    best: Option<MatchCandidate>,
}

impl<'a> Search<'a> {
    fn new(graph: &'a PatternGraph, board: &'a Board) -> Self {
        Self {
            graph,
            board,
            assignment: vec![None; graph.len()],
            used: vec![false; board.width() * board.height()],
            assigned: 0,
            seen: HashSet::new(),
            best: None,
        }
    }

    fn run(&mut self) {
        let root = self.root_node();
        let wanted = Cell::from(self.graph.element(root));
        let starts: Vec<Coord> = self.board.coords_of(wanted).collect();

        for start in starts {
            self.assign(root, start);
            self.extend();
            self.unassign(root, start);
        }
    }

    /// Node with the highest degree; first one wins ties
    fn root_node(&self) -> usize {
        let mut root = 0;
        for node in 1..self.graph.len() {
            if self.graph.degree(node) > self.graph.degree(root) {
                root = node;
            }
        }
        root
    }

    fn extend(&mut self) {
        if self.assigned == self.graph.len() {
            self.record();
            return;
        }

        // Disconnected remainder: nothing reachable from what is placed.
        let Some(node) = self.next_node() else {
            return;
        };

        let Some(candidates) = self.candidates(node) else {
            return;
        };

        for coord in candidates {
            if self.is_used(coord) || !self.fits_placed_neighbors(node, coord) {
                continue;
            }
            self.assign(node, coord);
            self.extend();
            self.unassign(node, coord);
        }
    }

    /// Unplaced node with the most placed neighbors (at least one)
    fn next_node(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for node in 0..self.graph.len() {
            if self.assignment[node].is_some() {
                continue;
            }
            let placed = self
                .graph
                .neighbors(node)
                .iter()
                .filter(|&&n| self.assignment[n].is_some())
                .count();
            if placed == 0 {
                continue;
            }
            if best.map_or(true, |(_, count)| placed > count) {
                best = Some((node, placed));
            }
        }
        best.map(|(node, _)| node)
    }

    /// Cells adjacent to every placed neighbor of `node` holding its element.
    ///
    /// None means a dead end (some neighbor offers nothing, or no common cell).
    fn candidates(&self, node: usize) -> Option<ArrayVec<Coord, 4>> {
        let wanted = Cell::from(self.graph.element(node));
        let mut result: Option<ArrayVec<Coord, 4>> = None;

        for &neighbor in self.graph.neighbors(node) {
            let Some(anchor) = self.assignment[neighbor] else {
                continue;
            };

            let around: ArrayVec<Coord, 4> = self
                .board
                .neighbors(anchor)
                .into_iter()
                .filter(|&c| self.board.cell_at(c) == Some(wanted))
                .collect();
            if around.is_empty() {
                return None;
            }

            result = Some(match result {
                None => around,
                Some(existing) => existing
                    .into_iter()
                    .filter(|c| around.contains(c))
                    .collect(),
            });
        }

        result.filter(|r| !r.is_empty())
    }

    fn fits_placed_neighbors(&self, node: usize, coord: Coord) -> bool {
        self.graph.neighbors(node).iter().all(|&n| match self.assignment[n] {
            Some(placed) => placed.is_adjacent(coord),
            None => true,
        })
    }

    fn flat(&self, coord: Coord) -> usize {
        coord.y as usize * self.board.width() + coord.x as usize
    }

    fn is_used(&self, coord: Coord) -> bool {
        self.used[self.flat(coord)]
    }

    fn assign(&mut self, node: usize, coord: Coord) {
        let idx = self.flat(coord);
        self.used[idx] = true;
        self.assignment[node] = Some(coord);
        self.assigned += 1;
    }

    fn unassign(&mut self, node: usize, coord: Coord) {
        let idx = self.flat(coord);
        self.used[idx] = false;
        self.assignment[node] = None;
        self.assigned -= 1;
    }

    fn record(&mut self) {
        let coords: Vec<Coord> = self.assignment.iter().flatten().copied().collect();
        let candidate = MatchCandidate::new(coords);
        if !self.seen.insert(candidate.signature.clone()) {
            return;
        }

        let better = match &self.best {
            None => true,
            Some(best) => candidate.preference(best) == Ordering::Greater,
        };
        if better {
            self.best = Some(candidate);
        }
    }
}
