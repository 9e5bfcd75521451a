use crate::intersection::edge_distance;
use crate::GeoFloat;
use geo_types::{Coord, Line};

use std::collections::BTreeSet;

/// A list of coordinates forming a polyline, together with the split nodes
/// discovered on it during noding.
///
/// Split nodes are kept ordered by `(segment_index, distance_along)`, so
/// emitting the noded pieces is a single sweep.
#[derive(Debug)]
pub(crate) struct NodedSegmentString<F: GeoFloat> {
    coords: Vec<Coord<F>>,
    nodes: BTreeSet<SplitNode<F>>,
}

/// A point at which a segment string is to be split.
///
/// A node that falls exactly on a vertex of the string is normalized to the
/// higher of the two possible segment indices with distance zero, so each
/// split location has one canonical representation.
#[derive(Debug)]
struct SplitNode<F: GeoFloat> {
    coord: Coord<F>,
    segment_index: usize,
    dist: F,
}

impl<F: GeoFloat> PartialEq for SplitNode<F> {
    fn eq(&self, other: &Self) -> bool {
        self.segment_index == other.segment_index && self.dist == other.dist
    }
}

impl<F: GeoFloat> Eq for SplitNode<F> {}

impl<F: GeoFloat> PartialOrd for SplitNode<F> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<F: GeoFloat> Ord for SplitNode<F> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // comparing floats: noding never produces NaN distances
        debug_assert!(!self.dist.is_nan() && !other.dist.is_nan());
        self.segment_index
            .cmp(&other.segment_index)
            .then(self.dist.partial_cmp(&other.dist).unwrap())
    }
}

impl<F: GeoFloat> NodedSegmentString<F> {
    pub fn new(coords: Vec<Coord<F>>) -> Self {
        debug_assert!(coords.len() >= 2, "segment string needs >= 2 coords");
        NodedSegmentString {
            coords,
            nodes: BTreeSet::new(),
        }
    }

    pub fn coords(&self) -> &[Coord<F>] {
        &self.coords
    }

    pub fn segment_count(&self) -> usize {
        self.coords.len() - 1
    }

    pub fn segment(&self, index: usize) -> Line<F> {
        Line::new(self.coords[index], self.coords[index + 1])
    }

    pub fn is_closed(&self) -> bool {
        self.coords.first() == self.coords.last()
    }

    /// Record a split point on segment `segment_index`.
    pub fn add_node(&mut self, coord: Coord<F>, segment_index: usize) {
        let mut segment_index = segment_index;
        let mut dist = edge_distance(coord, self.segment(segment_index));

        let next = segment_index + 1;
        if next < self.coords.len() && coord == self.coords[next] {
            segment_index = next;
            dist = F::zero();
        }
        self.nodes.insert(SplitNode {
            coord,
            segment_index,
            dist,
        });
    }

    /// Record the string's own endpoints as split nodes, so that emission
    /// covers the whole string. The final endpoint is keyed by the
    /// (one-past-the-end) vertex index with distance zero, matching the
    /// normalized form produced by [`add_node`](Self::add_node).
    pub fn add_endpoint_nodes(&mut self) {
        let last_vertex = self.coords.len() - 1;
        self.nodes.insert(SplitNode {
            coord: self.coords[0],
            segment_index: 0,
            dist: F::zero(),
        });
        self.nodes.insert(SplitNode {
            coord: self.coords[last_vertex],
            segment_index: last_vertex,
            dist: F::zero(),
        });
    }

    /// Emit the string's pieces, cut at every recorded node. Pieces that
    /// collapse to a single point are dropped.
    pub fn split_strings(&self) -> Vec<Vec<Coord<F>>> {
        let nodes: Vec<&SplitNode<F>> = self.nodes.iter().collect();
        let mut pieces = Vec::with_capacity(nodes.len().saturating_sub(1));

        for pair in nodes.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let mut piece: Vec<Coord<F>> = Vec::new();
            piece.push(from.coord);
            for vertex_index in (from.segment_index + 1)..=to.segment_index {
                push_distinct(&mut piece, self.coords[vertex_index]);
            }
            push_distinct(&mut piece, to.coord);

            if piece.len() >= 2 {
                pieces.push(piece);
            } else {
                debug!("dropping collapsed split piece at {:?}", from.coord);
            }
        }
        pieces
    }
}

fn push_distinct<F: GeoFloat>(coords: &mut Vec<Coord<F>>, coord: Coord<F>) {
    if coords.last() != Some(&coord) {
        coords.push(coord);
    }
}
