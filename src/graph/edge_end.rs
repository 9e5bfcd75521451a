use crate::predicates::{orient2d, Orientation};
use crate::GeoFloat;
use geo_types::Line;

use std::cmp::Ordering;

/// One direction of travel along an [`Edge`](super::Edge), incident at its
/// origin node.
///
/// Directed edges live in an arena: the pair for edge `e` sits at indices
/// `2e` (forward, along the stored coordinates) and `2e + 1` (backward), so
/// the symmetric twin of directed edge `i` is `i ^ 1`.
///
/// Directed edges compare by outgoing azimuth, counter-clockwise from the
/// positive x-axis — the ordering that sorts the star of edge-ends around
/// a node. Comparing actual angles would drag inexact trigonometry into a
/// load-bearing total order, so the comparison is split: a coarse
/// quarter-plane rank decided by ordinate signs alone, with the exact
/// orientation predicate breaking ties inside a quarter.
#[derive(Debug)]
pub(crate) struct DirectedEdge<F: GeoFloat> {
    pub edge: usize,
    pub forward: bool,
    /// node at which this directed edge originates
    pub origin: usize,
    /// whether the edge's two sides separate interior from exterior with
    /// the interior on this direction's left
    pub in_result: bool,
    dir: Line<F>,
    rank: u8,
}

/// The arena twin: the same edge travelled the other way.
pub(crate) fn sym(index: usize) -> usize {
    index ^ 1
}

/// Quarter-plane rank of a direction vector, counted counter-clockwise
/// from the positive x-axis. The sign of `dy` picks the upper (ranks 0–1)
/// or lower (ranks 2–3) half-plane, the sign of `dx` orders within it;
/// directions along the axes take the rank their half-plane test assigns
/// them (due east and due north rank 0, due west 1, due south 3), which
/// keeps the wrap-around gap of a sorted star just clockwise of east.
fn direction_rank<F: GeoFloat>(dx: F, dy: F) -> u8 {
    debug_assert!(
        !(dx.is_zero() && dy.is_zero()),
        "degenerate edge-end direction"
    );
    if dy >= F::zero() {
        if dx >= F::zero() {
            0
        } else {
            1
        }
    } else if dx < F::zero() {
        2
    } else {
        3
    }
}

impl<F: GeoFloat> DirectedEdge<F> {
    pub fn new(edge: usize, forward: bool, origin: usize, dir: Line<F>) -> Self {
        let delta = dir.end - dir.start;
        DirectedEdge {
            edge,
            forward,
            origin,
            in_result: false,
            rank: direction_rank(delta.x, delta.y),
            dir,
        }
    }

    pub fn compare_direction(&self, other: &DirectedEdge<F>) -> Ordering {
        if self.dir.end - self.dir.start == other.dir.end - other.dir.start {
            return Ordering::Equal;
        }
        match self.rank.cmp(&other.rank) {
            Ordering::Equal => {
                // same quarter: let the robust predicate arbitrate
                match orient2d(other.dir.start, other.dir.end, self.dir.end) {
                    Orientation::Clockwise => Ordering::Less,
                    Orientation::CounterClockwise => Ordering::Greater,
                    Orientation::Collinear => Ordering::Equal,
                }
            }
            ordering => ordering,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use geo_types::coord;

    fn end(dx: f64, dy: f64) -> DirectedEdge<f64> {
        DirectedEdge::new(
            0,
            true,
            0,
            Line::new(coord! { x: 0.0, y: 0.0 }, coord! { x: dx, y: dy }),
        )
    }

    #[test]
    fn counter_clockwise_ordering() {
        let east_north = end(1.0, 1.0);
        let north = end(0.0, 2.0);
        let west = end(-1.0, 0.0);
        let south_east = end(1.0, -1.0);

        assert_eq!(east_north.compare_direction(&north), Ordering::Less);
        assert_eq!(north.compare_direction(&west), Ordering::Less);
        assert_eq!(west.compare_direction(&south_east), Ordering::Less);
        assert_eq!(south_east.compare_direction(&east_north), Ordering::Greater);
    }

    #[test]
    fn axis_directions_rank_into_their_quarters() {
        assert_eq!(direction_rank(5.0, 0.0), 0);
        assert_eq!(direction_rank(0.0, 5.0), 0);
        assert_eq!(direction_rank(-5.0, 0.0), 1);
        assert_eq!(direction_rank(0.0, -5.0), 3);
        assert_eq!(direction_rank(-5.0, -1.0), 2);
    }

    #[test]
    fn equal_directions_compare_equal() {
        let a = end(2.0, 2.0);
        let b = end(2.0, 2.0);
        assert_eq!(a.compare_direction(&b), Ordering::Equal);
    }

    #[test]
    fn same_quarter_resolved_by_orientation() {
        let lower = end(3.0, 1.0);
        let upper = end(1.0, 3.0);
        assert_eq!(lower.compare_direction(&upper), Ordering::Less);
        assert_eq!(upper.compare_direction(&lower), Ordering::Greater);
    }

    #[test]
    fn sym_pairs_share_an_arena_slot_pair() {
        assert_eq!(sym(4), 5);
        assert_eq!(sym(5), 4);
    }
}
