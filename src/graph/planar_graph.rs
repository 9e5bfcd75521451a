use super::{sym, DirectedEdge, Edge, Node, NodeMap};
use crate::error::TopologyError;
use crate::predicates::{orient2d, Orientation};
use crate::utils::lex_cmp;
use crate::GeoFloat;
use geo_types::Coord;

use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, VecDeque};

/// The planar graph of a noded curve set, with winding depths resolved on
/// every edge side.
///
/// Nodes, edges and directed edges are arena-allocated and linked by index,
/// so the cyclic node ↔ edge ↔ edge-end structure needs no shared-ownership
/// plumbing.
#[derive(Debug)]
pub(crate) struct PlanarGraph<F: GeoFloat> {
    pub edges: Vec<Edge<F>>,
    pub nodes: Vec<Node<F>>,
    pub dir_edges: Vec<DirectedEdge<F>>,
    /// connected-component id per edge
    subgraph_of: Vec<usize>,
}

/// Edge identity: the canonical coordinate sequence.
struct EdgeKey<F: GeoFloat>(Vec<Coord<F>>);

impl<F: GeoFloat> PartialEq for EdgeKey<F> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl<F: GeoFloat> Eq for EdgeKey<F> {}
impl<F: GeoFloat> PartialOrd for EdgeKey<F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<F: GeoFloat> Ord for EdgeKey<F> {
    fn cmp(&self, other: &Self) -> Ordering {
        sequence_cmp(&self.0, &other.0)
    }
}

fn sequence_cmp<F: GeoFloat>(a: &[Coord<F>], b: &[Coord<F>]) -> Ordering {
    for (ca, cb) in a.iter().zip(b.iter()) {
        let ord = lex_cmp(ca, cb);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

impl<F: GeoFloat> PlanarGraph<F> {
    /// Build the graph from fully noded segment strings.
    ///
    /// Strands with identical geometry are interned into a single edge; a
    /// strand running along the canonical direction contributes `+1` to the
    /// edge's depth delta, an opposing strand `-1`.
    pub fn build(noded: Vec<Vec<Coord<F>>>) -> Result<Self, TopologyError<F>> {
        let mut edges: Vec<Edge<F>> = Vec::new();
        let mut interned: BTreeMap<EdgeKey<F>, usize> = BTreeMap::new();

        for coords in noded {
            if coords.len() < 2 {
                continue;
            }
            let reversed: Vec<Coord<F>> = coords.iter().rev().copied().collect();
            let (canonical, delta) = if sequence_cmp(&coords, &reversed) != Ordering::Greater {
                (coords, 1)
            } else {
                (reversed, -1)
            };
            match interned.entry(EdgeKey(canonical.clone())) {
                Entry::Occupied(entry) => edges[*entry.get()].add_strand(delta),
                Entry::Vacant(entry) => {
                    entry.insert(edges.len());
                    edges.push(Edge::new(canonical, delta));
                }
            }
        }

        let mut nodes: Vec<Node<F>> = Vec::new();
        let mut node_map = NodeMap::new();
        let mut dir_edges: Vec<DirectedEdge<F>> = Vec::with_capacity(edges.len() * 2);

        for (e, edge) in edges.iter().enumerate() {
            let start = node_map.intern(&mut nodes, edge.coords()[0]);
            let end = node_map.intern(&mut nodes, *edge.coords().last().unwrap());

            dir_edges.push(DirectedEdge::new(e, true, start, edge.first_segment()));
            dir_edges.push(DirectedEdge::new(e, false, end, edge.last_segment_reversed()));
            nodes[start].ends.push(2 * e);
            nodes[end].ends.push(2 * e + 1);
        }

        // sort each star counter-clockwise; coincident directions from
        // distinct edges mean the input was not fully noded
        for node in &mut nodes {
            node.ends
                .sort_by(|&a, &b| dir_edges[a].compare_direction(&dir_edges[b]));
            for pair in node.ends.windows(2) {
                if dir_edges[pair[0]].compare_direction(&dir_edges[pair[1]]) == Ordering::Equal {
                    return Err(TopologyError::at(
                        "coincident edge-end directions",
                        node.coordinate(),
                    ));
                }
            }
        }

        let edge_count = edges.len();
        let mut graph = PlanarGraph {
            edges,
            nodes,
            dir_edges,
            subgraph_of: vec![usize::MAX; edge_count],
        };
        graph.assign_subgraphs();
        Ok(graph)
    }

    /// Label connected components of the edge set.
    fn assign_subgraphs(&mut self) {
        let mut next_id = 0;
        for seed in 0..self.edges.len() {
            if self.subgraph_of[seed] != usize::MAX {
                continue;
            }
            let mut queue = VecDeque::from([seed]);
            self.subgraph_of[seed] = next_id;
            while let Some(e) = queue.pop_front() {
                for de in [2 * e, 2 * e + 1] {
                    let node = self.dir_edges[de].origin;
                    for &other_end in &self.nodes[node].ends {
                        let other = self.dir_edges[other_end].edge;
                        if self.subgraph_of[other] == usize::MAX {
                            self.subgraph_of[other] = next_id;
                            queue.push_back(other);
                        }
                    }
                }
            }
            next_id += 1;
        }
        debug!("planar graph has {} subgraph(s)", next_id);
    }

    /// Resolve winding depths on every edge side, then mark the directed
    /// edges that carry the buffer boundary.
    pub fn resolve_depths(&mut self) -> Result<(), TopologyError<F>> {
        let subgraph_count = self.subgraph_of.iter().map(|id| id + 1).max().unwrap_or(0);
        for sg in 0..subgraph_count {
            let sg_edges: Vec<usize> = (0..self.edges.len())
                .filter(|&e| self.subgraph_of[e] == sg)
                .collect();
            self.resolve_subgraph(sg, &sg_edges)?;
        }

        for index in 0..self.dir_edges.len() {
            let (left, right) = self
                .travel_depths(index)
                .expect("all depths resolved");
            self.dir_edges[index].in_result = left != 0 && right == 0;
        }
        Ok(())
    }

    fn resolve_subgraph(
        &mut self,
        sg: usize,
        sg_edges: &[usize],
    ) -> Result<(), TopologyError<F>> {
        // candidate anchor vertices, rightmost first
        let mut candidates: Vec<(Coord<F>, usize, usize)> = sg_edges
            .iter()
            .flat_map(|&e| {
                self.edges[e]
                    .coords()
                    .iter()
                    .enumerate()
                    .map(move |(i, c)| (*c, e, i))
            })
            .collect();
        candidates.sort_by(|a, b| lex_cmp(&b.0, &a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

        let mut seed = None;
        for (vertex, e, i) in candidates {
            let coords = self.edges[e].coords();
            let last = coords.len() - 1;
            if i == 0 || i == last {
                // the rightmost vertex is a node: the star sector just
                // clockwise of the first end (wrapping through the positive
                // x-axis) lies outside the subgraph
                let node = if i == 0 {
                    self.dir_edges[2 * e].origin
                } else {
                    self.dir_edges[2 * e + 1].origin
                };
                let outside = self.winding_excluding(vertex, sg);
                let first_end = self.nodes[node].ends[0];
                let delta = self.travel_delta(first_end);
                self.set_travel_depths(first_end, outside + delta, outside)?;
                seed = Some(self.dir_edges[first_end].edge);
                break;
            }

            // interior vertex: classify which stored side faces east
            let a = coords[i - 1];
            let b = coords[i + 1];
            match orient2d(a, vertex, b) {
                Orientation::Collinear => continue, // spike tip, try the next vertex
                orientation => {
                    let outside = self.winding_excluding(vertex, sg);
                    let delta = self.edges[e].depth_delta();
                    let (left, right) = match orientation {
                        // left turn: east faces the stored right side
                        Orientation::CounterClockwise => (outside + delta, outside),
                        _ => (outside, outside - delta),
                    };
                    self.edges[e].set_depths(left, right)?;
                    seed = Some(e);
                    break;
                }
            }
        }

        let Some(seed) = seed else {
            // every vertex is a spike tip: the subgraph bounds no area
            for &e in sg_edges {
                if self.edges[e].depth_delta() != 0 {
                    return Err(TopologyError::at(
                        "degenerate subgraph with unbalanced strands",
                        self.edges[e].coords()[0],
                    ));
                }
                self.edges[e].set_depths(0, 0)?;
            }
            return Ok(());
        };

        self.flood_from(seed)
    }

    /// The winding number of `point` with respect to every subgraph except
    /// `exclude`: the number of curve loops covering the point, signed by
    /// loop orientation. This is the point-in-polygon query that anchors a
    /// subgraph's outside depth.
    fn winding_excluding(&self, point: Coord<F>, exclude: usize) -> i32 {
        let mut winding = 0;
        for (e, edge) in self.edges.iter().enumerate() {
            if self.subgraph_of[e] == exclude || edge.depth_delta() == 0 {
                continue;
            }
            let delta = edge.depth_delta();
            for seg in edge.coords().windows(2) {
                let (a, b) = (seg[0], seg[1]);
                if a.y <= point.y && b.y > point.y {
                    if orient2d(a, b, point) == Orientation::CounterClockwise {
                        winding += delta;
                    }
                } else if b.y <= point.y && a.y > point.y {
                    if orient2d(a, b, point) == Orientation::Clockwise {
                        winding -= delta;
                    }
                }
            }
        }
        winding
    }

    /// Breadth-first depth propagation from a resolved seed edge.
    ///
    /// Around each node the sectors between consecutive edge-ends carry a
    /// constant depth, and crossing an edge-end changes the depth by the
    /// end's travel delta; walking the star once therefore determines every
    /// incident edge from any one resolved edge. A full circuit must close
    /// back on the starting depth, otherwise the labeling is inconsistent.
    fn flood_from(&mut self, seed: usize) -> Result<(), TopologyError<F>> {
        let mut queue =
            VecDeque::from([self.dir_edges[2 * seed].origin, self.dir_edges[2 * seed + 1].origin]);
        let mut node_done = vec![false; self.nodes.len()];

        while let Some(n) = queue.pop_front() {
            if node_done[n] {
                continue;
            }
            let ends = self.nodes[n].ends.clone();
            let Some(start_pos) = ends
                .iter()
                .position(|&de| self.edges[self.dir_edges[de].edge].depths().is_some())
            else {
                debug_assert!(false, "node enqueued before any incident edge was resolved");
                continue;
            };
            node_done[n] = true;

            let (start_left, start_right) = self
                .travel_depths(ends[start_pos])
                .expect("start end is resolved");
            let mut sector = start_left;
            for step in 1..ends.len() {
                let de = ends[(start_pos + step) % ends.len()];
                let left = sector + self.travel_delta(de);
                self.set_travel_depths(de, left, sector)?;
                sector = left;

                let other = self.dir_edges[sym(de)].origin;
                if !node_done[other] {
                    queue.push_back(other);
                }
            }
            if sector != start_right {
                return Err(TopologyError::at(
                    "winding depth mismatch around node",
                    self.nodes[n].coordinate(),
                ));
            }
        }
        Ok(())
    }

    /// Depths of a directed edge relative to its travel direction.
    fn travel_depths(&self, de: usize) -> Option<(i32, i32)> {
        let dir = &self.dir_edges[de];
        let (left, right) = self.edges[dir.edge].depths()?;
        if dir.forward {
            Some((left, right))
        } else {
            Some((right, left))
        }
    }

    fn travel_delta(&self, de: usize) -> i32 {
        let dir = &self.dir_edges[de];
        if dir.forward {
            self.edges[dir.edge].depth_delta()
        } else {
            -self.edges[dir.edge].depth_delta()
        }
    }

    fn set_travel_depths(
        &mut self,
        de: usize,
        left: i32,
        right: i32,
    ) -> Result<(), TopologyError<F>> {
        let dir = &self.dir_edges[de];
        let edge = dir.edge;
        if dir.forward {
            self.edges[edge].set_depths(left, right)
        } else {
            self.edges[edge].set_depths(right, left)
        }
    }

    /// The coordinates of a directed edge in travel order.
    pub fn travel_coords(&self, de: usize) -> Vec<Coord<F>> {
        let dir = &self.dir_edges[de];
        let coords = self.edges[dir.edge].coords();
        if dir.forward {
            coords.to_vec()
        } else {
            coords.iter().rev().copied().collect()
        }
    }

    /// Continue a boundary ring: from the directed edge `incoming`, pick
    /// the next boundary edge leaving its end node, keeping the interior on
    /// the left. That next edge is the first result edge clockwise of
    /// `incoming`'s twin in the node's star.
    pub fn next_result_edge(&self, incoming: usize) -> Result<usize, TopologyError<F>> {
        let twin = sym(incoming);
        let node = self.dir_edges[twin].origin;
        let ends = &self.nodes[node].ends;
        let pos = ends
            .iter()
            .position(|&e| e == twin)
            .expect("twin is in its origin star");

        let k = ends.len();
        for step in 1..=k {
            let candidate = ends[(pos + k - step) % k];
            if self.dir_edges[candidate].in_result {
                return Ok(candidate);
            }
        }
        Err(TopologyError::at(
            "unable to continue boundary ring",
            self.nodes[node].coordinate(),
        ))
    }
}
