//! The buffer operation: public API and the precision-fallback driver.

mod curve;
mod curve_set;
mod polygon_builder;
pub mod validate;

use crate::error::{BufferError, TopologyError};
use crate::graph::PlanarGraph;
use crate::noding::Noder;
use crate::precision::PrecisionModel;
use crate::GeoFloat;
use curve_set::CurveSetBuilder;
use geo_types::{
    Coord, Geometry, GeometryCollection, Line, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon, Rect, Triangle,
};
use rstar::RTreeNum;

/// How the ends of buffered linear geometries (and isolated points) are
/// capped.
///
/// The numeric values are the conventional style codes, accepted by
/// [`CapStyle::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapStyle {
    /// A semicircle around the line end (the default).
    Round = 1,
    /// The buffer ends flush at the line end.
    Flat = 2,
    /// A square extending past the line end by the buffer distance.
    Square = 3,
}

impl CapStyle {
    pub fn from_code(code: u32) -> Option<CapStyle> {
        match code {
            1 => Some(CapStyle::Round),
            2 => Some(CapStyle::Flat),
            3 => Some(CapStyle::Square),
            _ => None,
        }
    }
}

/// Parameters controlling a buffer operation.
///
/// ```
/// use geo_buffer::{BufferParams, CapStyle};
///
/// let params: BufferParams<f64> = BufferParams::new()
///     .quadrant_segments(16)
///     .end_cap_style(CapStyle::Square);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferParams<F: GeoFloat> {
    quadrant_segments: usize,
    end_cap_style: CapStyle,
    precision_model: PrecisionModel<F>,
}

impl<F: GeoFloat> Default for BufferParams<F> {
    fn default() -> Self {
        BufferParams {
            quadrant_segments: 8,
            end_cap_style: CapStyle::Round,
            precision_model: PrecisionModel::Floating,
        }
    }
}

impl<F: GeoFloat> BufferParams<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of straight segments approximating a 90° fillet arc
    /// (default 8). The maximum chord error of a fillet at distance `d` is
    /// `|d|·(1 − cos(π/(4·Q)))`.
    pub fn quadrant_segments(mut self, quadrant_segments: usize) -> Self {
        self.quadrant_segments = quadrant_segments;
        self
    }

    /// How line ends and isolated points are capped (default
    /// [`CapStyle::Round`]).
    pub fn end_cap_style(mut self, end_cap_style: CapStyle) -> Self {
        self.end_cap_style = end_cap_style;
        self
    }

    /// Force a fixed precision model instead of the automatic
    /// floating-with-fallback schedule.
    pub fn precision_model(mut self, precision_model: PrecisionModel<F>) -> Self {
        self.precision_model = precision_model;
        self
    }

    pub(crate) fn cap(&self) -> CapStyle {
        self.end_cap_style
    }

    pub(crate) fn segments(&self) -> usize {
        self.quadrant_segments
    }
}

/// Buffer a geometry by a distance.
///
/// The buffer of a geometry `G` at distance `d ≥ 0` is the set of points
/// within `d` of `G`. For polygonal inputs a negative `d` erodes instead;
/// for linear and puntal inputs `d ≤ 0` yields an empty result. The result
/// is a valid [`MultiPolygon`]: simple rings, holes inside shells,
/// counter-clockwise shells and clockwise holes.
///
/// ```
/// use geo_buffer::Buffer;
/// use geo_types::line_string;
///
/// let pill = line_string![(x: 0.0_f64, y: 0.0), (x: 10.0, y: 0.0)]
///     .buffer(1.0)
///     .unwrap();
/// assert_eq!(pill.0.len(), 1);
/// ```
pub trait Buffer {
    type Scalar: GeoFloat + RTreeNum;

    /// Buffer with round caps and 8 segments per fillet quadrant.
    fn buffer(
        &self,
        distance: Self::Scalar,
    ) -> Result<MultiPolygon<Self::Scalar>, BufferError<Self::Scalar>> {
        self.buffer_with_params(distance, &BufferParams::default())
    }

    /// Buffer with explicit [`BufferParams`].
    fn buffer_with_params(
        &self,
        distance: Self::Scalar,
        params: &BufferParams<Self::Scalar>,
    ) -> Result<MultiPolygon<Self::Scalar>, BufferError<Self::Scalar>>;
}

macro_rules! impl_buffer {
    ($($geom:ident),*) => {
        $(
            impl<F: GeoFloat + RTreeNum> Buffer for $geom<F> {
                type Scalar = F;

                fn buffer_with_params(
                    &self,
                    distance: F,
                    params: &BufferParams<F>,
                ) -> Result<MultiPolygon<F>, BufferError<F>> {
                    buffer_op(GeometryRef::$geom(self), distance, params)
                }
            }
        )*
    };
}

impl_buffer!(
    Point,
    Line,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
    Rect,
    Triangle
);

impl<F: GeoFloat + RTreeNum> Buffer for Geometry<F> {
    type Scalar = F;

    fn buffer_with_params(
        &self,
        distance: F,
        params: &BufferParams<F>,
    ) -> Result<MultiPolygon<F>, BufferError<F>> {
        buffer_op(GeometryRef::Geometry(self), distance, params)
    }
}

/// Borrowed view of any input geometry, so the driver and curve-set
/// builder can walk every supported type without cloning.
#[derive(Clone, Copy, Debug)]
pub(crate) enum GeometryRef<'a, F: GeoFloat> {
    Point(&'a Point<F>),
    Line(&'a Line<F>),
    LineString(&'a LineString<F>),
    Polygon(&'a Polygon<F>),
    MultiPoint(&'a MultiPoint<F>),
    MultiLineString(&'a MultiLineString<F>),
    MultiPolygon(&'a MultiPolygon<F>),
    GeometryCollection(&'a GeometryCollection<F>),
    Rect(&'a Rect<F>),
    Triangle(&'a Triangle<F>),
    Geometry(&'a Geometry<F>),
}

impl<F: GeoFloat> GeometryRef<'_, F> {
    pub fn for_each_coord(&self, f: &mut impl FnMut(Coord<F>)) {
        match self {
            GeometryRef::Point(point) => f(point.0),
            GeometryRef::Line(line) => {
                f(line.start);
                f(line.end);
            }
            GeometryRef::LineString(ls) => ls.0.iter().copied().for_each(f),
            GeometryRef::Polygon(polygon) => {
                polygon.exterior().0.iter().copied().for_each(&mut *f);
                for interior in polygon.interiors() {
                    interior.0.iter().copied().for_each(&mut *f);
                }
            }
            GeometryRef::MultiPoint(points) => points.0.iter().for_each(|p| f(p.0)),
            GeometryRef::MultiLineString(lss) => {
                for ls in &lss.0 {
                    GeometryRef::LineString(ls).for_each_coord(f);
                }
            }
            GeometryRef::MultiPolygon(polygons) => {
                for polygon in &polygons.0 {
                    GeometryRef::Polygon(polygon).for_each_coord(f);
                }
            }
            GeometryRef::GeometryCollection(collection) => {
                for geometry in &collection.0 {
                    GeometryRef::Geometry(geometry).for_each_coord(f);
                }
            }
            GeometryRef::Rect(rect) => {
                f(rect.min());
                f(Coord { x: rect.max().x, y: rect.min().y });
                f(rect.max());
                f(Coord { x: rect.min().x, y: rect.max().y });
            }
            GeometryRef::Triangle(triangle) => triangle.to_array().into_iter().for_each(f),
            GeometryRef::Geometry(geometry) => match geometry {
                Geometry::Point(g) => GeometryRef::Point(g).for_each_coord(f),
                Geometry::Line(g) => GeometryRef::Line(g).for_each_coord(f),
                Geometry::LineString(g) => GeometryRef::LineString(g).for_each_coord(f),
                Geometry::Polygon(g) => GeometryRef::Polygon(g).for_each_coord(f),
                Geometry::MultiPoint(g) => GeometryRef::MultiPoint(g).for_each_coord(f),
                Geometry::MultiLineString(g) => GeometryRef::MultiLineString(g).for_each_coord(f),
                Geometry::MultiPolygon(g) => GeometryRef::MultiPolygon(g).for_each_coord(f),
                Geometry::GeometryCollection(g) => {
                    GeometryRef::GeometryCollection(g).for_each_coord(f)
                }
                Geometry::Rect(g) => GeometryRef::Rect(g).for_each_coord(f),
                Geometry::Triangle(g) => GeometryRef::Triangle(g).for_each_coord(f),
            },
        }
    }

    /// The highest coordinate dimension present: 0 for puntal, 1 for
    /// linear, 2 for areal components (empties rank 0).
    pub fn max_dimension(&self) -> usize {
        match self {
            GeometryRef::Point(_) | GeometryRef::MultiPoint(_) => 0,
            GeometryRef::Line(_) | GeometryRef::LineString(_) | GeometryRef::MultiLineString(_) => {
                1
            }
            GeometryRef::Polygon(_)
            | GeometryRef::MultiPolygon(_)
            | GeometryRef::Rect(_)
            | GeometryRef::Triangle(_) => 2,
            GeometryRef::GeometryCollection(collection) => collection
                .0
                .iter()
                .map(|g| GeometryRef::Geometry(g).max_dimension())
                .max()
                .unwrap_or(0),
            GeometryRef::Geometry(geometry) => match geometry {
                Geometry::Point(g) => GeometryRef::Point(g).max_dimension(),
                Geometry::Line(g) => GeometryRef::Line(g).max_dimension(),
                Geometry::LineString(g) => GeometryRef::LineString(g).max_dimension(),
                Geometry::Polygon(g) => GeometryRef::Polygon(g).max_dimension(),
                Geometry::MultiPoint(g) => GeometryRef::MultiPoint(g).max_dimension(),
                Geometry::MultiLineString(g) => GeometryRef::MultiLineString(g).max_dimension(),
                Geometry::MultiPolygon(g) => GeometryRef::MultiPolygon(g).max_dimension(),
                Geometry::GeometryCollection(g) => {
                    GeometryRef::GeometryCollection(g).max_dimension()
                }
                Geometry::Rect(g) => GeometryRef::Rect(g).max_dimension(),
                Geometry::Triangle(g) => GeometryRef::Triangle(g).max_dimension(),
            },
        }
    }
}

/// The driver: validate the input, then run the pipeline under the
/// precision-fallback schedule.
fn buffer_op<F: GeoFloat + RTreeNum>(
    input: GeometryRef<'_, F>,
    distance: F,
    params: &BufferParams<F>,
) -> Result<MultiPolygon<F>, BufferError<F>> {
    if params.quadrant_segments < 1 {
        return Err(BufferError::InvalidInput(
            "quadrant segment count must be at least 1".into(),
        ));
    }
    if !distance.is_finite() {
        return Err(BufferError::InvalidInput(
            "buffer distance must be finite".into(),
        ));
    }

    let mut all_finite = true;
    let mut env: Option<geo_types::Rect<F>> = None;
    input.for_each_coord(&mut |c| {
        if !(c.x.is_finite() && c.y.is_finite()) {
            all_finite = false;
            return;
        }
        env = Some(match env {
            None => geo_types::Rect::new(c, c),
            Some(rect) => geo_types::Rect::new(
                Coord {
                    x: rect.min().x.min(c.x),
                    y: rect.min().y.min(c.y),
                },
                Coord {
                    x: rect.max().x.max(c.x),
                    y: rect.max().y.max(c.y),
                },
            ),
        });
    });
    if !all_finite {
        return Err(BufferError::InvalidInput(
            "geometry has non-finite coordinates".into(),
        ));
    }
    let Some(env) = env else {
        return Ok(MultiPolygon::new(vec![])); // empty input, empty output
    };

    let result = match params.precision_model {
        // an explicit fixed model is used as-is, no fallback schedule
        PrecisionModel::Fixed { .. } => {
            buffer_attempt(&input, distance, params, &params.precision_model)
                .map_err(BufferError::from)?
        }
        PrecisionModel::Floating => {
            let mut last_error;
            match buffer_attempt(&input, distance, params, &PrecisionModel::Floating) {
                Ok(result) => return finish(input, distance, params, result),
                Err(err) => last_error = err,
            }
            let mut recovered = None;
            for k in (0..=MAX_PRECISION_DIGITS).rev() {
                let model = PrecisionModel::fixed(fallback_scale(&env, distance, k));
                debug!("retrying buffer with fixed precision model {model:?}");
                match buffer_attempt(&input, distance, params, &model) {
                    Ok(result) => {
                        recovered = Some(result);
                        break;
                    }
                    Err(err) => last_error = err,
                }
            }
            match recovered {
                Some(result) => result,
                None => return Err(BufferError::Topology(last_error)),
            }
        }
    };
    finish(input, distance, params, result)
}

const MAX_PRECISION_DIGITS: i32 = 12;

/// The scale factor of the `k`-significant-digit fallback grid, sized to
/// the problem: `10^(k − ceil(log10(env_size + 2|d|)))`.
fn fallback_scale<F: GeoFloat>(env: &geo_types::Rect<F>, distance: F, k: i32) -> F {
    let two = F::one() + F::one();
    let ten = F::from(10.0).expect("valid float constant");
    let env_size = env.width().max(env.height());
    let extent = env_size + two * distance.abs();
    let magnitude_digits = if extent > F::zero() {
        extent.log10().ceil()
    } else {
        F::zero()
    };
    ten.powf(F::from(k).expect("digit count fits") - magnitude_digits)
}

/// One full pipeline run under a single precision model.
fn buffer_attempt<F: GeoFloat + RTreeNum>(
    input: &GeometryRef<'_, F>,
    distance: F,
    params: &BufferParams<F>,
    model: &PrecisionModel<F>,
) -> Result<MultiPolygon<F>, TopologyError<F>> {
    let curves = CurveSetBuilder::new(distance, model, params).curves(input);
    if curves.is_empty() {
        return Ok(MultiPolygon::new(vec![]));
    }

    let noded = Noder::new(model).node(curves)?;
    let mut graph = PlanarGraph::build(noded)?;
    graph.resolve_depths()?;
    polygon_builder::build_polygons(&graph)
}

fn finish<F: GeoFloat + RTreeNum>(
    input: GeometryRef<'_, F>,
    distance: F,
    params: &BufferParams<F>,
    result: MultiPolygon<F>,
) -> Result<MultiPolygon<F>, BufferError<F>> {
    if cfg!(debug_assertions) {
        if let Some(issue) = validate::validate_ref(&input, distance, params, &result) {
            warn!("buffer result failed validation: {issue}");
        }
    }
    Ok(result)
}
