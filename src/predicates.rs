//! Robust planar orientation.
//!
//! Every downstream invariant of the buffer pipeline — segment
//! intersection gating, edge-end star sorting, winding-number crossings,
//! ring classification — reduces to the sign of one determinant:
//!
//! ```text
//! ⎢ p.x − r.x   p.y − r.y ⎥
//! ⎢ q.x − r.x   q.y − r.y ⎥
//! ```
//!
//! positive when `p, q, r` wind counter-clockwise. Evaluated naively in
//! doubles, the determinant loses its sign exactly where the pipeline is
//! most sensitive: nearly collinear triples produced by offsetting and
//! noding. [`orient2d`] therefore evaluates in two stages: the
//! double-precision determinant is accepted whenever it clears the
//! roundoff error bound of its own computation, and only the uncertain
//! remainder is escalated to exact adaptive-precision arithmetic (the
//! [`robust`] crate).
//!
//! [`robust`]: https://crates.io/crates/robust

use crate::GeoFloat;
use geo_types::Coord;

/// The winding sense of an ordered coordinate triple.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Orientation {
    CounterClockwise,
    Clockwise,
    Collinear,
}

/// Relative roundoff bound of the two-product determinant,
/// `(3 + 16ε)·ε` for IEEE-754 doubles (Shewchuk 1997). A computed
/// determinant whose magnitude exceeds this fraction of the summed
/// product magnitudes has the sign of the exact determinant.
const DET_ERROR_BOUND: f64 = 3.330_669_073_875_471_6e-16;

/// The orientation of `r` relative to the directed line `p → q`:
/// `CounterClockwise` when `r` lies to its left, `Clockwise` to its
/// right, `Collinear` exactly on it.
pub fn orient2d<F: GeoFloat>(p: Coord<F>, q: Coord<F>, r: Coord<F>) -> Orientation {
    let (px, py) = (f64_ordinate(p.x), f64_ordinate(p.y));
    let (qx, qy) = (f64_ordinate(q.x), f64_ordinate(q.y));
    let (rx, ry) = (f64_ordinate(r.x), f64_ordinate(r.y));

    let det_left = (px - rx) * (qy - ry);
    let det_right = (py - ry) * (qx - rx);
    let det = det_left - det_right;

    // opposite-signed (or vanishing) products cannot cancel, so the
    // computed sign stands
    if det_left == 0.0 || det_right == 0.0 || (det_left > 0.0) != (det_right > 0.0) {
        return orientation_of(det);
    }

    // like-signed products: the difference is trustworthy only outside
    // the roundoff band of the computation
    let det_magnitude = (det_left + det_right).abs();
    if det.abs() >= DET_ERROR_BOUND * det_magnitude {
        return orientation_of(det);
    }

    orientation_of(robust::orient2d(
        robust::Coord { x: px, y: py },
        robust::Coord { x: qx, y: qy },
        robust::Coord { x: rx, y: ry },
    ))
}

fn orientation_of(det: f64) -> Orientation {
    if det > 0.0 {
        Orientation::CounterClockwise
    } else if det < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

fn f64_ordinate<F: GeoFloat>(value: F) -> f64 {
    value.to_f64().expect("ordinate representable as f64")
}
