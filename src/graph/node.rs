use crate::utils::lex_cmp;
use crate::GeoFloat;
use geo_types::Coord;

use std::collections::BTreeMap;

/// A graph vertex: a coordinate plus the star of directed edge-ends
/// emanating from it. The star is sorted counter-clockwise by outgoing
/// azimuth once all edges are inserted.
#[derive(Debug)]
pub(crate) struct Node<F: GeoFloat> {
    coord: Coord<F>,
    /// indices into the graph's directed-edge arena
    pub ends: Vec<usize>,
}

impl<F: GeoFloat> Node<F> {
    pub fn new(coord: Coord<F>) -> Self {
        Node {
            coord,
            ends: Vec::new(),
        }
    }

    pub fn coordinate(&self) -> Coord<F> {
        self.coord
    }
}

/// Interns nodes by coordinate.
///
/// Keys are ordered lexicographically, which keeps iteration — and hence
/// the whole graph build — deterministic.
#[derive(Debug, Default)]
pub(crate) struct NodeMap<F: GeoFloat> {
    map: BTreeMap<NodeKey<F>, usize>,
}

struct NodeKey<F: GeoFloat>(Coord<F>);

impl<F: GeoFloat> std::fmt::Debug for NodeKey<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeKey({:?}, {:?})", self.0.x, self.0.y)
    }
}

impl<F: GeoFloat> PartialEq for NodeKey<F> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<F: GeoFloat> Eq for NodeKey<F> {}
impl<F: GeoFloat> PartialOrd for NodeKey<F> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<F: GeoFloat> Ord for NodeKey<F> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        lex_cmp(&self.0, &other.0)
    }
}

impl<F: GeoFloat> NodeMap<F> {
    pub fn new() -> Self {
        NodeMap {
            map: BTreeMap::new(),
        }
    }

    /// The index of the node at `coord`, creating it in `nodes` if absent.
    pub fn intern(&mut self, nodes: &mut Vec<Node<F>>, coord: Coord<F>) -> usize {
        *self.map.entry(NodeKey(coord)).or_insert_with(|| {
            nodes.push(Node::new(coord));
            nodes.len() - 1
        })
    }
}
