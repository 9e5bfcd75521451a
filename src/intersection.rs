//! Robust segment/segment intersection.
//!
//! This is the one numerical primitive every downstream noding and labeling
//! invariant depends on. The implementation mirrors JTS's
//! `RobustLineIntersector`: orientation tests gate the cases, endpoint
//! intersections are *copied* rather than computed so they compare
//! bit-for-bit, and proper intersections are computed in normalized
//! homogeneous coordinates with a nearest-endpoint fallback for
//! ill-conditioned (near-parallel) pairs.

use crate::predicates::{orient2d, Orientation};
use crate::utils::{rect_contains, rects_intersect};
use crate::GeoFloat;
use geo_types::{Coord, Line, Rect};

/// The intersection of two segments.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum SegmentIntersection<F: GeoFloat> {
    /// The segments meet in a single point.
    SinglePoint {
        intersection: Coord<F>,
        /// `true` when the point is interior to both segments. Snapping can
        /// place a proper intersection onto an endpoint without clearing
        /// this flag.
        is_proper: bool,
    },
    /// The segments are collinear and overlap in a (possibly degenerate)
    /// sub-segment; the endpoints are the two extreme overlap points.
    Collinear { intersection: Line<F> },
}

impl<F: GeoFloat> SegmentIntersection<F> {
    pub fn is_proper(&self) -> bool {
        match self {
            SegmentIntersection::SinglePoint { is_proper, .. } => *is_proper,
            SegmentIntersection::Collinear { .. } => false,
        }
    }

    /// Whether the intersection has a point strictly inside at least one of
    /// the two input segments (not at any of their endpoints).
    pub fn is_interior_intersection(&self, p: Line<F>, q: Line<F>) -> bool {
        let interior_to = |c: &Coord<F>, l: &Line<F>| *c != l.start && *c != l.end;
        match self {
            SegmentIntersection::SinglePoint { intersection, .. } => {
                interior_to(intersection, &p) || interior_to(intersection, &q)
            }
            SegmentIntersection::Collinear { intersection } => {
                interior_to(&intersection.start, &p)
                    || interior_to(&intersection.start, &q)
                    || interior_to(&intersection.end, &p)
                    || interior_to(&intersection.end, &q)
            }
        }
    }
}

fn envelope<F: GeoFloat>(l: &Line<F>) -> Rect<F> {
    Rect::new(l.start, l.end)
}

/// Compute the intersection of segments `p` and `q`, if any.
pub fn segment_intersection<F: GeoFloat>(
    p: Line<F>,
    q: Line<F>,
) -> Option<SegmentIntersection<F>> {
    if !rects_intersect(&envelope(&p), &envelope(&q)) {
        return None;
    }

    use Orientation::*;
    let p_q1 = orient2d(p.start, p.end, q.start);
    let p_q2 = orient2d(p.start, p.end, q.end);
    if matches!(
        (p_q1, p_q2),
        (Clockwise, Clockwise) | (CounterClockwise, CounterClockwise)
    ) {
        return None;
    }

    let q_p1 = orient2d(q.start, q.end, p.start);
    let q_p2 = orient2d(q.start, q.end, p.end);
    if matches!(
        (q_p1, q_p2),
        (Clockwise, Clockwise) | (CounterClockwise, CounterClockwise)
    ) {
        return None;
    }

    if (p_q1, p_q2, q_p1, q_p2) == (Collinear, Collinear, Collinear, Collinear) {
        return collinear_intersection(p, q);
    }

    // The segments are not collinear, so they meet in exactly one point. If
    // that point is an endpoint, copy it rather than computing it: copying
    // keeps the exact ordinate values, which downstream noding relies on.
    if p_q1 == Collinear || p_q2 == Collinear || q_p1 == Collinear || q_p2 == Collinear {
        // Two equal endpoints are checked first; the orientation tests alone
        // can be mutually inconsistent for such inputs.
        #[allow(clippy::suspicious_operation_groupings)]
        let intersection = if p.start == q.start || p.start == q.end {
            p.start
        } else if p.end == q.start || p.end == q.end {
            p.end
        } else if p_q1 == Collinear {
            q.start
        } else if p_q2 == Collinear {
            q.end
        } else if q_p1 == Collinear {
            p.start
        } else {
            p.end
        };
        Some(SegmentIntersection::SinglePoint {
            intersection,
            is_proper: false,
        })
    } else {
        Some(SegmentIntersection::SinglePoint {
            intersection: proper_intersection(p, q),
            is_proper: true,
        })
    }
}

fn collinear_intersection<F: GeoFloat>(p: Line<F>, q: Line<F>) -> Option<SegmentIntersection<F>> {
    let p_env = envelope(&p);
    let q_env = envelope(&q);

    let q_start_on_p = rect_contains(&p_env, &q.start);
    let q_end_on_p = rect_contains(&p_env, &q.end);
    let p_start_on_q = rect_contains(&q_env, &p.start);
    let p_end_on_q = rect_contains(&q_env, &p.end);

    let collinear = |a: Coord<F>, b: Coord<F>| {
        if a == b {
            SegmentIntersection::SinglePoint {
                intersection: a,
                is_proper: false,
            }
        } else {
            SegmentIntersection::Collinear {
                intersection: Line::new(a, b),
            }
        }
    };

    match (q_start_on_p, q_end_on_p, p_start_on_q, p_end_on_q) {
        (true, true, _, _) => Some(collinear(q.start, q.end)),
        (_, _, true, true) => Some(collinear(p.start, p.end)),
        (true, _, true, _) => Some(collinear(q.start, p.start)),
        (true, _, _, true) => Some(collinear(q.start, p.end)),
        (_, true, true, _) => Some(collinear(q.end, p.start)),
        (_, true, _, true) => Some(collinear(q.end, p.end)),
        _ => None,
    }
}

/// The endpoint of `p` or `q` closest to the other segment: a reasonable
/// surrogate for the intersection point when the exact computation is not
/// representable (nearly coincident segments, or an endpoint lying almost on
/// the other segment).
fn nearest_endpoint<F: GeoFloat>(p: Line<F>, q: Line<F>) -> Coord<F> {
    use geo_types::private_utils::line_segment_distance;

    let mut nearest = p.start;
    let mut min_dist = line_segment_distance(p.start, q.start, q.end);

    for (candidate, target) in [
        (p.end, q),
        (q.start, p),
        (q.end, p),
    ] {
        let dist = line_segment_distance(candidate, target.start, target.end);
        if dist < min_dist {
            min_dist = dist;
            nearest = candidate;
        }
    }
    nearest
}

/// Intersection of the (infinite) lines carrying `p` and `q`, by the
/// homogeneous-coordinates equation. Ordinates are conditioned by
/// subtracting the midpoint of the envelope overlap, which removes common
/// leading digits and keeps more bits of precision in the products.
///
/// Returns `None` when the result is not representable (parallel or
/// near-parallel lines).
fn raw_line_intersection<F: GeoFloat>(p: Line<F>, q: Line<F>) -> Option<Coord<F>> {
    let two = F::one() + F::one();
    let mid_x = (p.start.x.min(p.end.x).max(q.start.x.min(q.end.x))
        + p.start.x.max(p.end.x).min(q.start.x.max(q.end.x)))
        / two;
    let mid_y = (p.start.y.min(p.end.y).max(q.start.y.min(q.end.y))
        + p.start.y.max(p.end.y).min(q.start.y.max(q.end.y)))
        / two;

    let p1x = p.start.x - mid_x;
    let p1y = p.start.y - mid_y;
    let p2x = p.end.x - mid_x;
    let p2y = p.end.y - mid_y;
    let q1x = q.start.x - mid_x;
    let q1y = q.start.y - mid_y;
    let q2x = q.end.x - mid_x;
    let q2y = q.end.y - mid_y;

    let px = p1y - p2y;
    let py = p2x - p1x;
    let pw = p1x * p2y - p2x * p1y;

    let qx = q1y - q2y;
    let qy = q2x - q1x;
    let qw = q1x * q2y - q2x * q1y;

    let xw = py * qw - qy * pw;
    let yw = qx * pw - px * qw;
    let w = px * qy - qx * py;

    let x_int = xw / w;
    let y_int = yw / w;

    if x_int.is_finite() && y_int.is_finite() {
        Some(Coord {
            x: x_int + mid_x,
            y: y_int + mid_y,
        })
    } else {
        None
    }
}

fn proper_intersection<F: GeoFloat>(p: Line<F>, q: Line<F>) -> Coord<F> {
    let mut int_pt = raw_line_intersection(p, q).unwrap_or_else(|| nearest_endpoint(p, q));

    // Round-off can push the computed point outside either envelope; fall
    // back to the safer endpoint surrogate when it does.
    if !(rect_contains(&envelope(&p), &int_pt) && rect_contains(&envelope(&q), &int_pt)) {
        int_pt = nearest_endpoint(p, q);
    }
    int_pt
}

/// The "edge distance" of an intersection point along a segment: a robust
/// ordering metric (not the Euclidean distance) used to sort split points
/// that lie on the same segment. It projects onto whichever axis the
/// segment extends furthest along, so it is exact for points produced by
/// rounding points on the segment.
pub(crate) fn edge_distance<F: GeoFloat>(intersection: Coord<F>, line: Line<F>) -> F {
    let dx = (line.end.x - line.start.x).abs();
    let dy = (line.end.y - line.start.y).abs();

    let mut dist;
    if intersection == line.start {
        dist = F::zero();
    } else if intersection == line.end {
        dist = if dx > dy { dx } else { dy };
    } else {
        let int_dx = (intersection.x - line.start.x).abs();
        let int_dy = (intersection.y - line.start.y).abs();
        dist = if dx > dy { int_dx } else { int_dy };
        // non-endpoints must order strictly after the segment start
        if dist == F::zero() && intersection != line.start {
            dist = int_dx.max(int_dy);
        }
    }
    debug_assert!(
        !(dist == F::zero() && intersection != line.start),
        "bad edge distance"
    );
    dist
}

#[cfg(test)]
mod test {
    use super::*;
    use geo_types::coord;

    #[test]
    fn proper_crossing() {
        let p = Line::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 4.0, y: 4.0 });
        let q = Line::new(coord! { x: 0.0, y: 4.0 }, coord! { x: 4.0, y: 0.0 });
        assert_eq!(
            segment_intersection(p, q),
            Some(SegmentIntersection::SinglePoint {
                intersection: coord! { x: 2.0, y: 2.0 },
                is_proper: true,
            })
        );
    }

    #[test]
    fn disjoint_segments() {
        let p = Line::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 });
        let q = Line::new(coord! { x: 5.0, y: 5.0 }, coord! { x: 6.0, y: 5.0 });
        assert_eq!(segment_intersection(p, q), None);
    }

    #[test]
    fn shared_endpoint_is_returned_exactly() {
        let shared = coord! { x: 19.850257749638203, y: 46.29709338043669 };
        let p = Line::new(shared, coord! { x: 20.31970698357233, y: 46.76654261437082 });
        let q = Line::new(
            coord! { x: -48.51001596420236, y: -22.063180333403878 },
            shared,
        );
        match segment_intersection(p, q) {
            Some(SegmentIntersection::SinglePoint { intersection, .. }) => {
                assert_eq!(intersection, shared);
            }
            other => panic!("expected single point, got {other:?}"),
        }
    }

    #[test]
    fn collinear_overlap() {
        let p = Line::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 5.0, y: 5.0 });
        let q = Line::new(coord! { x: 3.0, y: 3.0 }, coord! { x: 6.0, y: 6.0 });
        assert_eq!(
            segment_intersection(p, q),
            Some(SegmentIntersection::Collinear {
                intersection: Line::new(coord! { x: 3.0, y: 3.0 }, coord! { x: 5.0, y: 5.0 }),
            })
        );
    }

    #[test]
    fn collinear_touch_is_single_point() {
        let p = Line::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 2.0, y: 0.0 });
        let q = Line::new(coord! { x: 2.0, y: 0.0 }, coord! { x: 5.0, y: 0.0 });
        assert_eq!(
            segment_intersection(p, q),
            Some(SegmentIntersection::SinglePoint {
                intersection: coord! { x: 2.0, y: 0.0 },
                is_proper: false,
            })
        );
    }

    /// Near-parallel pair where one endpoint lies at a significant angle to
    /// the other segment; the nearest-endpoint fallback must pick the
    /// endpoint closest to the other segment.
    #[test]
    fn near_parallel_uses_nearest_endpoint() {
        let p = Line::new(
            coord! { x: 163.81867067, y: -211.31840378 },
            coord! { x: 165.9174252, y: -214.1665075 },
        );
        let q = Line::new(
            coord! { x: 2.84139601, y: -57.95412726 },
            coord! { x: 469.59990601, y: -502.63851732 },
        );
        assert_eq!(
            segment_intersection(p, q),
            Some(SegmentIntersection::SinglePoint {
                intersection: coord! { x: 163.81867067, y: -211.31840378 },
                is_proper: true,
            })
        );
    }

    #[test]
    fn near_miss_is_rejected() {
        // Nearly parallel segments that do not in fact cross.
        let p = Line::new(coord! { x: -42.0, y: 163.2 }, coord! { x: 21.2, y: 265.2 });
        let q = Line::new(coord! { x: -26.2, y: 188.7 }, coord! { x: 37.0, y: 290.7 });
        assert_eq!(segment_intersection(p, q), None);
    }

    #[test]
    fn interior_intersection_classification() {
        let p = Line::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 4.0, y: 0.0 });
        let q = Line::new(coord! { x: 2.0, y: -1.0 }, coord! { x: 2.0, y: 1.0 });
        let isect = segment_intersection(p, q).unwrap();
        assert!(isect.is_interior_intersection(p, q));

        let r = Line::new(coord! { x: 4.0, y: 0.0 }, coord! { x: 5.0, y: 3.0 });
        let touch = segment_intersection(p, r).unwrap();
        assert!(!touch.is_interior_intersection(p, r));
    }

    #[test]
    fn edge_distance_orders_points_along_segment() {
        let line = Line::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 1.0 });
        let d0 = edge_distance(coord! { x: 0.0, y: 0.0 }, line);
        let d1 = edge_distance(coord! { x: 4.0, y: 0.4 }, line);
        let d2 = edge_distance(coord! { x: 10.0, y: 1.0 }, line);
        assert!(d0 < d1 && d1 < d2);
    }
}
