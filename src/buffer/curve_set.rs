use super::curve::OffsetCurveBuilder;
use super::{BufferParams, GeometryRef};
use crate::graph::Side;
use crate::precision::PrecisionModel;
use crate::utils::remove_repeated_coords;
use crate::winding::{winding_order, WindingOrder};
use crate::GeoFloat;
use geo_types::{private_utils::get_bounding_rect, Coord, Geometry, LineString, Polygon};

/// Walks an input geometry and collects the raw offset curves of all its
/// components.
///
/// Ring curves are generated from normalized ring orientations — shells
/// counter-clockwise, holes clockwise — offset to the right of travel for
/// expansion and to the left for erosion, so every curve carries the
/// buffer body on its left. Rings which a negative distance would erode
/// away completely contribute no curve at all, as do holes that a positive
/// distance closes up.
pub(crate) struct CurveSetBuilder<'a, F: GeoFloat> {
    distance: F,
    precision: &'a PrecisionModel<F>,
    params: &'a BufferParams<F>,
    curves: Vec<Vec<Coord<F>>>,
}

impl<'a, F: GeoFloat> CurveSetBuilder<'a, F> {
    pub fn new(
        distance: F,
        precision: &'a PrecisionModel<F>,
        params: &'a BufferParams<F>,
    ) -> Self {
        CurveSetBuilder {
            distance,
            precision,
            params,
            curves: Vec::new(),
        }
    }

    pub fn curves(mut self, input: &GeometryRef<'_, F>) -> Vec<Vec<Coord<F>>> {
        self.add_geometry_ref(input);
        self.curves
    }

    fn offset_builder(&self) -> OffsetCurveBuilder<'a, F> {
        OffsetCurveBuilder::new(self.distance.abs(), self.precision, self.params.segments())
    }

    fn push_curve(&mut self, curve: Vec<Coord<F>>) {
        if curve.len() >= 2 {
            self.curves.push(curve);
        }
    }

    fn add_geometry_ref(&mut self, input: &GeometryRef<'_, F>) {
        match input {
            GeometryRef::Point(point) => self.add_point(point.0),
            GeometryRef::Line(line) => self.add_line_string(&[line.start, line.end]),
            GeometryRef::LineString(ls) => self.add_line_string(&ls.0),
            GeometryRef::Polygon(polygon) => self.add_polygon(polygon),
            GeometryRef::MultiPoint(points) => {
                for point in &points.0 {
                    self.add_point(point.0);
                }
            }
            GeometryRef::MultiLineString(lss) => {
                for ls in &lss.0 {
                    self.add_line_string(&ls.0);
                }
            }
            GeometryRef::MultiPolygon(polygons) => {
                for polygon in &polygons.0 {
                    self.add_polygon(polygon);
                }
            }
            GeometryRef::GeometryCollection(collection) => {
                for geometry in &collection.0 {
                    self.add_geometry(geometry);
                }
            }
            GeometryRef::Rect(rect) => self.add_polygon(&rect.to_polygon()),
            GeometryRef::Triangle(triangle) => self.add_polygon(&triangle.to_polygon()),
            GeometryRef::Geometry(geometry) => self.add_geometry(geometry),
        }
    }

    fn add_geometry(&mut self, geometry: &Geometry<F>) {
        match geometry {
            Geometry::Point(g) => self.add_point(g.0),
            Geometry::Line(g) => self.add_line_string(&[g.start, g.end]),
            Geometry::LineString(g) => self.add_line_string(&g.0),
            Geometry::Polygon(g) => self.add_polygon(g),
            Geometry::MultiPoint(g) => self.add_geometry_ref(&GeometryRef::MultiPoint(g)),
            Geometry::MultiLineString(g) => {
                self.add_geometry_ref(&GeometryRef::MultiLineString(g))
            }
            Geometry::MultiPolygon(g) => self.add_geometry_ref(&GeometryRef::MultiPolygon(g)),
            Geometry::GeometryCollection(g) => {
                self.add_geometry_ref(&GeometryRef::GeometryCollection(g))
            }
            Geometry::Rect(g) => self.add_polygon(&g.to_polygon()),
            Geometry::Triangle(g) => self.add_polygon(&g.to_polygon()),
        }
    }

    /// Puntal and linear components buffer only outward.
    fn add_point(&mut self, center: Coord<F>) {
        if self.distance <= F::zero() {
            return;
        }
        if let Some(curve) = self.offset_builder().point_curve(center, self.params.cap()) {
            self.push_curve(curve);
        }
    }

    fn add_line_string(&mut self, coords: &[Coord<F>]) {
        if self.distance <= F::zero() {
            return;
        }
        let coords = remove_repeated_coords(coords);
        match coords.len() {
            0 => {}
            // a degenerate line buffers like a point
            1 => self.add_point(coords[0]),
            _ => {
                let curve = self
                    .offset_builder()
                    .line_curve(&coords, self.params.cap());
                self.push_curve(curve);
            }
        }
    }

    fn add_polygon(&mut self, polygon: &Polygon<F>) {
        let distance = self.distance;

        let shell = self.cleaned_ring(polygon.exterior(), WindingOrder::CounterClockwise);
        let Some(shell) = shell else {
            // a degenerate shell has no area: treat its outline like a line
            if distance > F::zero() {
                self.add_line_string(&polygon.exterior().0);
            }
            return;
        };
        if distance < F::zero() && is_eroded_completely(&shell, -distance) {
            return;
        }

        self.add_ring_side(&shell);

        for interior in polygon.interiors() {
            let Some(hole) = self.cleaned_ring(interior, WindingOrder::Clockwise) else {
                warn!("skipping degenerate interior ring");
                continue;
            };
            // an outward buffer closes holes smaller than its width
            if distance > F::zero() && is_eroded_completely(&hole, distance) {
                continue;
            }
            self.add_ring_side(&hole);
        }
    }

    fn add_ring_side(&mut self, ring: &[Coord<F>]) {
        let distance = self.distance;
        if distance == F::zero() {
            // zero-width buffer: the ring itself is the curve, which makes
            // buffer-by-zero a topology repair pass
            let curve: Vec<Coord<F>> = ring
                .iter()
                .map(|c| self.precision.make_coord_precise(*c))
                .collect();
            self.push_curve(remove_repeated_coords(&curve));
            return;
        }
        let side = if distance > F::zero() {
            Side::Right
        } else {
            Side::Left
        };
        let curve = self.offset_builder().ring_curve(ring, side);
        self.push_curve(curve);
    }

    /// Clean an input ring and normalize its travel direction; `None` for
    /// rings too degenerate to bound area.
    fn cleaned_ring(
        &self,
        ring: &LineString<F>,
        target: WindingOrder,
    ) -> Option<Vec<Coord<F>>> {
        let mut coords = remove_repeated_coords(&ring.0);
        if coords.first() != coords.last() {
            if let Some(&first) = coords.first() {
                coords.push(first);
            }
        }
        if coords.len() < 4 {
            return None;
        }
        match winding_order(&coords)? {
            order if order == target => Some(coords),
            _ => {
                coords.reverse();
                Some(coords)
            }
        }
    }
}

/// A ring vanishes under erosion when twice the erosion distance exceeds
/// its envelope's smaller dimension. This is a (conservative) fast path:
/// rings that pass it can still erode away, in which case their curves
/// collapse in the graph instead.
fn is_eroded_completely<F: GeoFloat>(ring: &[Coord<F>], erosion: F) -> bool {
    debug_assert!(erosion >= F::zero());
    let Some(env) = get_bounding_rect(ring.iter().copied()) else {
        return true;
    };
    let two = F::one() + F::one();
    let min_dimension = env.width().min(env.height());
    two * erosion > min_dimension
}
