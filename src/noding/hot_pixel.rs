use crate::GeoFloat;
use geo_types::{Coord, Rect};

/// The snap-rounding attraction region of a grid point: an axis-aligned
/// square of side `1/scale` centered on a rounded node coordinate.
///
/// Any segment that *enters* the pixel — passes through its interior, or
/// runs along its boundary with an endpoint strictly inside — is snapped so
/// that it passes through the pixel's center vertex. The resulting snap
/// displacement is at most half the pixel diagonal, `√2 / (2·scale)`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HotPixel<F: GeoFloat> {
    center: Coord<F>,
    half_width: F,
}

impl<F: GeoFloat> HotPixel<F> {
    pub fn new(center: Coord<F>, scale: F) -> Self {
        let two = F::one() + F::one();
        HotPixel {
            center,
            half_width: (scale * two).recip(),
        }
    }

    pub fn center(&self) -> Coord<F> {
        self.center
    }

    /// The pixel's square extent, used as its index envelope. The square
    /// is widened by one ulp per side so that borderline index queries
    /// cannot miss the pixel to rounding.
    pub fn envelope(&self) -> Rect<F> {
        let h = self.half_width;
        Rect::new(
            Coord {
                x: (self.center.x - h).next_after(F::neg_infinity()),
                y: (self.center.y - h).next_after(F::neg_infinity()),
            },
            Coord {
                x: (self.center.x + h).next_after(F::infinity()),
                y: (self.center.y + h).next_after(F::infinity()),
            },
        )
    }

    fn strictly_contains(&self, c: &Coord<F>) -> bool {
        (c.x - self.center.x).abs() < self.half_width
            && (c.y - self.center.y).abs() < self.half_width
    }

    /// Whether the segment `p0 → p1` enters this pixel.
    pub fn intersects_segment(&self, p0: Coord<F>, p1: Coord<F>) -> bool {
        if self.strictly_contains(&p0) || self.strictly_contains(&p1) {
            return true;
        }

        // Clip the segment against the closed square. A segment that only
        // grazes the boundary from outside has a clipped chord whose
        // midpoint stays on the boundary, and does not count as entering.
        let (t_min, t_max) = match self.clip(p0, p1) {
            Some(range) => range,
            None => return false,
        };
        if t_min >= t_max {
            return false;
        }
        let two = F::one() + F::one();
        let t_mid = (t_min + t_max) / two;
        let mid = Coord {
            x: p0.x + t_mid * (p1.x - p0.x),
            y: p0.y + t_mid * (p1.y - p0.y),
        };
        self.strictly_contains(&mid)
    }

    /// Liang-Barsky parametric clip of `p0 → p1` to the closed square.
    fn clip(&self, p0: Coord<F>, p1: Coord<F>) -> Option<(F, F)> {
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;
        let h = self.half_width;

        let mut t_min = F::zero();
        let mut t_max = F::one();

        let edges = [
            (-dx, p0.x - (self.center.x - h)),
            (dx, (self.center.x + h) - p0.x),
            (-dy, p0.y - (self.center.y - h)),
            (dy, (self.center.y + h) - p0.y),
        ];
        for (denom, numer) in edges {
            if denom == F::zero() {
                if numer < F::zero() {
                    return None;
                }
                continue;
            }
            let t = numer / denom;
            if denom < F::zero() {
                // entering
                if t > t_max {
                    return None;
                }
                if t > t_min {
                    t_min = t;
                }
            } else {
                // leaving
                if t < t_min {
                    return None;
                }
                if t < t_max {
                    t_max = t;
                }
            }
        }
        Some((t_min, t_max))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use geo_types::coord;

    fn pixel() -> HotPixel<f64> {
        // scale 1: unit square centered on the origin, half width 0.5
        HotPixel::new(coord! { x: 0.0, y: 0.0 }, 1.0)
    }

    #[test]
    fn crossing_segment_enters() {
        let px = pixel();
        assert!(px.intersects_segment(coord! { x: -2.0, y: 0.1 }, coord! { x: 2.0, y: -0.1 }));
    }

    #[test]
    fn distant_segment_does_not_enter() {
        let px = pixel();
        assert!(!px.intersects_segment(coord! { x: -2.0, y: 1.0 }, coord! { x: 2.0, y: 1.0 }));
    }

    #[test]
    fn endpoint_strictly_inside_enters() {
        let px = pixel();
        assert!(px.intersects_segment(coord! { x: 0.1, y: 0.1 }, coord! { x: 5.0, y: 5.0 }));
    }

    #[test]
    fn boundary_graze_does_not_enter() {
        let px = pixel();
        // runs exactly along the pixel's top edge
        assert!(!px.intersects_segment(coord! { x: -2.0, y: 0.5 }, coord! { x: 2.0, y: 0.5 }));
    }

    #[test]
    fn corner_touch_does_not_enter() {
        let px = pixel();
        assert!(!px.intersects_segment(coord! { x: 0.5, y: 0.5 }, coord! { x: 2.0, y: 0.5 }));
    }

    #[test]
    fn through_center_enters() {
        let px = pixel();
        assert!(px.intersects_segment(coord! { x: -3.0, y: 0.0 }, coord! { x: 3.0, y: 0.0 }));
    }
}
