//! Ring orientation, signed area, and point-in-ring location.

use crate::graph::Location;
use crate::predicates::{orient2d, Orientation};
use crate::utils::lex_cmp;
use crate::GeoFloat;
use geo_types::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WindingOrder {
    Clockwise,
    CounterClockwise,
}

/// Twice the signed shoelace area of a closed ring (positive for
/// counter-clockwise rings).
///
/// Accumulation is relative to the first coordinate, which keeps precision
/// for rings far from the origin.
pub(crate) fn twice_signed_ring_area<F: GeoFloat>(ring: &[Coord<F>]) -> F {
    if ring.len() < 4 {
        return F::zero();
    }
    let origin = ring[0];
    let mut area = F::zero();
    for seg in ring.windows(2) {
        let a = seg[0] - origin;
        let b = seg[1] - origin;
        area = area + (a.x * b.y - b.x * a.y);
    }
    area
}

/// The winding order of a closed ring, or `None` for degenerate rings.
///
/// The order is judged at a convex-hull vertex (the lexicographically
/// least coordinate) with a robust orientation test. Unlike the signed
/// area — which cancels to zero on self-crossing rings — this stays
/// decisive for invalid rings such as bowties, which matters for the
/// zero-distance repair path.
pub(crate) fn winding_order<F: GeoFloat>(ring: &[Coord<F>]) -> Option<WindingOrder> {
    if ring.len() < 4 {
        return None;
    }
    let pts = &ring[..ring.len() - 1]; // drop the closing duplicate
    let n = pts.len();
    let min_idx = pts
        .iter()
        .enumerate()
        .min_by(|a, b| lex_cmp(a.1, b.1))
        .map(|(i, _)| i)
        .unwrap();

    // nearest distinct neighbors of the hull vertex
    let mut prev = (min_idx + n - 1) % n;
    while pts[prev] == pts[min_idx] && prev != min_idx {
        prev = (prev + n - 1) % n;
    }
    let mut next = (min_idx + 1) % n;
    while pts[next] == pts[min_idx] && next != min_idx {
        next = (next + 1) % n;
    }

    match orient2d(pts[prev], pts[min_idx], pts[next]) {
        Orientation::CounterClockwise => Some(WindingOrder::CounterClockwise),
        Orientation::Clockwise => Some(WindingOrder::Clockwise),
        Orientation::Collinear => {
            // flat hull corner: fall back to the area sign
            let area = twice_signed_ring_area(ring);
            if area > F::zero() {
                Some(WindingOrder::CounterClockwise)
            } else if area < F::zero() {
                Some(WindingOrder::Clockwise)
            } else {
                None
            }
        }
    }
}

/// Locate `point` relative to a closed ring by the mod-2 crossing rule,
/// with robust orientation tests deciding each crossing.
pub(crate) fn locate_in_ring<F: GeoFloat>(point: Coord<F>, ring: &[Coord<F>]) -> Location {
    if ring.len() < 4 {
        return Location::Exterior;
    }

    let mut crossings = 0usize;
    for seg in ring.windows(2) {
        let (a, b) = (seg[0], seg[1]);
        if point == a || point == b {
            return Location::Boundary;
        }

        let upward = a.y <= point.y && b.y > point.y;
        let downward = b.y <= point.y && a.y > point.y;
        if upward || downward {
            match orient2d(a, b, point) {
                Orientation::Collinear => return Location::Boundary,
                Orientation::CounterClockwise if upward => crossings += 1,
                Orientation::Clockwise if downward => crossings += 1,
                _ => {}
            }
        } else if a.y == point.y && b.y == point.y {
            // horizontal segment at the query height
            let (min_x, max_x) = if a.x <= b.x { (a.x, b.x) } else { (b.x, a.x) };
            if min_x <= point.x && point.x <= max_x {
                return Location::Boundary;
            }
        }
    }

    if crossings % 2 == 1 {
        Location::Interior
    } else {
        Location::Exterior
    }
}
