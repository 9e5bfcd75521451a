use super::CapStyle;
use crate::graph::Side;
use crate::intersection::{segment_intersection, SegmentIntersection};
use crate::predicates::{orient2d, Orientation};
use crate::precision::PrecisionModel;
use crate::GeoFloat;
use geo_types::{Coord, Line};

/// Builds raw offset curves for the components of the input geometry.
///
/// Every curve is emitted so that the buffer body lies on its **left**:
/// rings are walked in their normalized direction (shells
/// counter-clockwise, holes clockwise) and offset to the right for
/// expansion or to the left for erosion; line and point curves are closed
/// counter-clockwise loops. The graph's depth labeling relies on this
/// orientation.
pub(crate) struct OffsetCurveBuilder<'a, F: GeoFloat> {
    /// offset magnitude, `|d|`
    distance: F,
    precision: &'a PrecisionModel<F>,
    quadrant_segments: usize,
}

impl<'a, F: GeoFloat> OffsetCurveBuilder<'a, F> {
    pub fn new(
        distance: F,
        precision: &'a PrecisionModel<F>,
        quadrant_segments: usize,
    ) -> Self {
        debug_assert!(distance >= F::zero());
        debug_assert!(quadrant_segments >= 1);
        OffsetCurveBuilder {
            distance,
            precision,
            quadrant_segments,
        }
    }

    fn generator(&self, side: Side) -> OffsetSegmentGenerator<'a, F> {
        OffsetSegmentGenerator::new(self.distance, side, self.precision, self.quadrant_segments)
    }

    /// The closed curve around a line string: offset down one side, an end
    /// cap, offset back along the other side, and a cap at the start.
    pub fn line_curve(&self, coords: &[Coord<F>], cap: CapStyle) -> Vec<Coord<F>> {
        debug_assert!(coords.len() >= 2);
        let n = coords.len();
        let mut gen = self.generator(Side::Right);

        gen.init_side_segments(coords[0], coords[1]);
        for coord in &coords[2..] {
            gen.add_next_segment(*coord);
        }
        gen.add_last_segment();
        gen.add_line_end_cap(coords[n - 2], coords[n - 1], cap);

        gen.init_side_segments(coords[n - 1], coords[n - 2]);
        for coord in coords[..n.saturating_sub(2)].iter().rev() {
            gen.add_next_segment(*coord);
        }
        gen.add_last_segment();
        gen.add_line_end_cap(coords[1], coords[0], cap);

        gen.close_ring();
        gen.into_curve()
    }

    /// The offset curve of a closed ring on the given side of its travel
    /// direction. `coords` must be closed (first equals last).
    pub fn ring_curve(&self, coords: &[Coord<F>], side: Side) -> Vec<Coord<F>> {
        debug_assert!(coords.len() >= 4);
        debug_assert!(coords.first() == coords.last());
        let n = coords.len();
        let mut gen = self.generator(side);

        gen.init_side_segments(coords[n - 2], coords[0]);
        for coord in &coords[1..] {
            gen.add_next_segment(*coord);
        }
        gen.close_ring();
        gen.into_curve()
    }

    /// The curve around a single point: a full circle for round caps, a
    /// square for square caps; flat caps produce nothing.
    pub fn point_curve(&self, center: Coord<F>, cap: CapStyle) -> Option<Vec<Coord<F>>> {
        let d = self.distance;
        match cap {
            CapStyle::Round => {
                let mut gen = self.generator(Side::Right);
                gen.add_circle(center);
                Some(gen.into_curve())
            }
            CapStyle::Square => {
                let mut gen = self.generator(Side::Right);
                gen.push(Coord { x: center.x + d, y: center.y - d });
                gen.push(Coord { x: center.x + d, y: center.y + d });
                gen.push(Coord { x: center.x - d, y: center.y + d });
                gen.push(Coord { x: center.x - d, y: center.y - d });
                gen.close_ring();
                Some(gen.into_curve())
            }
            CapStyle::Flat => None,
        }
    }
}

/// Emits the offset points for one side-walk of an input polyline,
/// handling the corner cases between consecutive segments.
struct OffsetSegmentGenerator<'a, F: GeoFloat> {
    distance: F,
    side: Side,
    precision: &'a PrecisionModel<F>,
    /// angular step of fillet approximation, `π / (2 · quadrant_segments)`
    fillet_angle_quantum: F,
    /// offset endpoints closer than this collapse into one point
    min_corner_separation: F,
    /// fillets wind counter-clockwise on right-side walks, clockwise on
    /// left-side walks
    fillet_direction: Orientation,
    vertices: Vec<Coord<F>>,
    s0: Coord<F>,
    s1: Coord<F>,
    offset0: Line<F>,
    offset1: Line<F>,
}

impl<'a, F: GeoFloat> OffsetSegmentGenerator<'a, F> {
    fn new(
        distance: F,
        side: Side,
        precision: &'a PrecisionModel<F>,
        quadrant_segments: usize,
    ) -> Self {
        let pi = F::from(std::f64::consts::PI).expect("valid float constant");
        let two = F::one() + F::one();
        let thousandth = F::from(0.001).expect("valid float constant");
        let quadrant_segments = F::from(quadrant_segments).expect("quadrant segment count fits");
        let zero = Coord { x: F::zero(), y: F::zero() };

        OffsetSegmentGenerator {
            distance,
            side,
            precision,
            fillet_angle_quantum: pi / (two * quadrant_segments),
            min_corner_separation: distance * thousandth,
            fillet_direction: match side {
                Side::Right => Orientation::CounterClockwise,
                Side::Left => Orientation::Clockwise,
            },
            vertices: Vec::new(),
            s0: zero,
            s1: zero,
            offset0: Line::new(zero, zero),
            offset1: Line::new(zero, zero),
        }
    }

    /// Round through the precision model and append, collapsing consecutive
    /// duplicates.
    fn push(&mut self, coord: Coord<F>) {
        let coord = self.precision.make_coord_precise(coord);
        if self.vertices.last() != Some(&coord) {
            self.vertices.push(coord);
        }
    }

    fn into_curve(self) -> Vec<Coord<F>> {
        self.vertices
    }

    fn offset_segment(&self, seg: Line<F>, side: Side) -> Line<F> {
        let dx = seg.end.x - seg.start.x;
        let dy = seg.end.y - seg.start.y;
        let len = (dx * dx + dy * dy).sqrt();
        let scale = self.distance / len;
        let (ox, oy) = match side {
            Side::Left => (-dy * scale, dx * scale),
            Side::Right => (dy * scale, -dx * scale),
        };
        Line::new(
            Coord { x: seg.start.x + ox, y: seg.start.y + oy },
            Coord { x: seg.end.x + ox, y: seg.end.y + oy },
        )
    }

    fn init_side_segments(&mut self, s1: Coord<F>, s2: Coord<F>) {
        self.s0 = s1;
        self.s1 = s2;
        self.offset1 = self.offset_segment(Line::new(s1, s2), self.side);
    }

    fn add_next_segment(&mut self, p: Coord<F>) {
        let s0 = self.s0;
        let s1 = self.s1;
        let s2 = p;
        if s1 == s2 {
            return;
        }
        self.s0 = s1;
        self.s1 = s2;
        self.offset0 = self.offset1;
        self.offset1 = self.offset_segment(Line::new(s1, s2), self.side);

        let orientation = orient2d(s0, s1, s2);
        let outside_turn = (orientation == Orientation::Clockwise && self.side == Side::Left)
            || (orientation == Orientation::CounterClockwise && self.side == Side::Right);

        if orientation == Orientation::Collinear {
            self.add_collinear(s0, s1, s2);
        } else if outside_turn {
            self.add_outside_turn(s1);
        } else {
            self.add_inside_turn(s1);
        }
    }

    fn add_collinear(&mut self, s0: Coord<F>, s1: Coord<F>, s2: Coord<F>) {
        let dot = (s1.x - s0.x) * (s2.x - s1.x) + (s1.y - s0.y) * (s2.y - s1.y);
        // same heading: the offsets are collinear too, nothing to emit.
        // A 180° reversal gets a half-circle fillet around the vertex.
        if dot < F::zero() {
            let start = self.offset0.end;
            let end = self.offset1.start;
            self.push(start);
            self.add_fillet_arc(s1, start, end);
            self.push(end);
        }
    }

    fn add_outside_turn(&mut self, corner: Coord<F>) {
        let start = self.offset0.end;
        let end = self.offset1.start;
        if distance(start, end) < self.min_corner_separation {
            self.push(start);
            return;
        }
        self.push(start);
        self.add_fillet_arc(corner, start, end);
        self.push(end);
    }

    fn add_inside_turn(&mut self, corner: Coord<F>) {
        match segment_intersection(self.offset0, self.offset1) {
            Some(SegmentIntersection::SinglePoint { intersection, .. }) => {
                self.push(intersection);
            }
            _ => {
                // The offset segments miss each other (a narrow concave
                // angle). If their endpoints nearly coincide, one point
                // suffices; otherwise bridge through the input vertex
                // itself, which keeps the curve on the correct side of the
                // corner.
                let start = self.offset0.end;
                let end = self.offset1.start;
                if distance(start, end) < self.min_corner_separation {
                    self.push(start);
                } else {
                    self.push(start);
                    self.push(corner);
                    self.push(end);
                }
            }
        }
    }

    fn add_last_segment(&mut self) {
        let end = self.offset1.end;
        self.push(end);
    }

    fn add_line_end_cap(&mut self, p0: Coord<F>, p1: Coord<F>, cap: CapStyle) {
        let seg = Line::new(p0, p1);
        let offset_near = self.offset_segment(seg, self.side);
        let offset_far = self.offset_segment(seg, self.side.opposite());

        match cap {
            CapStyle::Round => {
                self.push(offset_near.end);
                self.add_fillet_arc(p1, offset_near.end, offset_far.end);
                self.push(offset_far.end);
            }
            CapStyle::Flat => {
                self.push(offset_near.end);
                self.push(offset_far.end);
            }
            CapStyle::Square => {
                let dx = p1.x - p0.x;
                let dy = p1.y - p0.y;
                let len = (dx * dx + dy * dy).sqrt();
                let ux = dx * self.distance / len;
                let uy = dy * self.distance / len;
                self.push(Coord {
                    x: offset_near.end.x + ux,
                    y: offset_near.end.y + uy,
                });
                self.push(Coord {
                    x: offset_far.end.x + ux,
                    y: offset_far.end.y + uy,
                });
            }
        }
    }

    /// Append the interior points of a circular fillet around `center`
    /// from `start` to `end` (exclusive on both sides), winding in the
    /// generator's fillet direction.
    fn add_fillet_arc(&mut self, center: Coord<F>, start: Coord<F>, end: Coord<F>) {
        let mut start_angle = (start.y - center.y).atan2(start.x - center.x);
        let end_angle = (end.y - center.y).atan2(end.x - center.x);
        let two_pi = F::from(2.0 * std::f64::consts::PI).expect("valid float constant");

        match self.fillet_direction {
            Orientation::Clockwise => {
                if start_angle <= end_angle {
                    start_angle = start_angle + two_pi;
                }
            }
            _ => {
                if start_angle >= end_angle {
                    start_angle = start_angle - two_pi;
                }
            }
        }
        self.add_directed_fillet(center, start_angle, end_angle);
    }

    fn add_directed_fillet(&mut self, center: Coord<F>, start_angle: F, end_angle: F) {
        let direction_factor = match self.fillet_direction {
            Orientation::Clockwise => -F::one(),
            _ => F::one(),
        };
        let total_angle = (start_angle - end_angle).abs();
        let half = F::from(0.5).expect("valid float constant");
        let n_segments = (total_angle / self.fillet_angle_quantum + half)
            .floor()
            .to_usize()
            .unwrap_or(0);
        if n_segments < 1 {
            return;
        }
        let angle_increment = total_angle / F::from(n_segments).expect("segment count fits");

        for i in 1..n_segments {
            let angle =
                start_angle + direction_factor * F::from(i).expect("index fits") * angle_increment;
            self.push(Coord {
                x: center.x + self.distance * angle.cos(),
                y: center.y + self.distance * angle.sin(),
            });
        }
    }

    /// A full circle around `p`, counter-clockwise from the positive
    /// x-axis.
    fn add_circle(&mut self, p: Coord<F>) {
        let start = Coord { x: p.x + self.distance, y: p.y };
        let two_pi = F::from(2.0 * std::f64::consts::PI).expect("valid float constant");
        self.push(start);
        self.add_directed_fillet(p, F::zero(), two_pi);
        self.close_ring();
    }

    fn close_ring(&mut self) {
        if let Some(&first) = self.vertices.first() {
            if self.vertices.last() != Some(&first) {
                self.vertices.push(first);
            }
        }
    }
}

fn distance<F: GeoFloat>(a: Coord<F>, b: Coord<F>) -> F {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}
