//! Coordinate precision models.

use crate::GeoFloat;
use geo_types::Coord;

/// The rounding policy applied to ordinate values.
///
/// Under `Floating` no rounding takes place and coordinates keep their full
/// IEEE-754 double precision. Under `Fixed` every ordinate is snapped onto a
/// grid of spacing `1 / scale`:
///
/// ```text
/// make_precise(v) = round(v · scale) / scale
/// ```
///
/// Rounding is idempotent, and equal inputs remain equal after rounding.
/// The buffer driver starts out `Floating` and only reaches for `Fixed`
/// models when floating-point noding fails.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrecisionModel<F: GeoFloat> {
    Floating,
    Fixed { scale: F },
}

impl<F: GeoFloat> PrecisionModel<F> {
    /// A fixed-grid model with the given scale factor (grid spacing
    /// `1 / scale`). The scale must be positive and finite.
    pub fn fixed(scale: F) -> Self {
        debug_assert!(scale > F::zero() && scale.is_finite());
        PrecisionModel::Fixed { scale }
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, PrecisionModel::Floating)
    }

    pub fn scale(&self) -> Option<F> {
        match self {
            PrecisionModel::Floating => None,
            PrecisionModel::Fixed { scale } => Some(*scale),
        }
    }

    /// Round a single ordinate onto the model's grid.
    pub fn make_precise(&self, v: F) -> F {
        match self {
            PrecisionModel::Floating => v,
            PrecisionModel::Fixed { scale } => (v * *scale).round() / *scale,
        }
    }

    /// Round both ordinates of a coordinate onto the model's grid.
    pub fn make_coord_precise(&self, c: Coord<F>) -> Coord<F> {
        match self {
            PrecisionModel::Floating => c,
            PrecisionModel::Fixed { .. } => Coord {
                x: self.make_precise(c.x),
                y: self.make_precise(c.y),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use geo_types::coord;

    #[test]
    fn floating_is_identity() {
        let model = PrecisionModel::<f64>::Floating;
        assert_eq!(model.make_precise(0.123456789), 0.123456789);
    }

    #[test]
    fn fixed_rounds_to_grid() {
        let model = PrecisionModel::fixed(100.0);
        assert_eq!(model.make_precise(0.123456789), 0.12);
        assert_eq!(model.make_precise(0.125), 0.13);
        assert_eq!(model.make_precise(-0.123456789), -0.12);
    }

    #[test]
    fn rounding_is_idempotent() {
        let model = PrecisionModel::fixed(1000.0);
        let rounded = model.make_precise(17.00049999);
        assert_eq!(model.make_precise(rounded), rounded);
    }

    #[test]
    fn equal_coords_stay_equal() {
        let model = PrecisionModel::fixed(10.0);
        let a = model.make_coord_precise(coord! { x: 1.04, y: 2.0 });
        let b = model.make_coord_precise(coord! { x: 1.04, y: 2.0 });
        assert_eq!(a, b);
    }
}
