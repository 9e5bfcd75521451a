//! Post-hoc heuristic validation of buffer results.
//!
//! The validator cross-checks a result against cheap necessary conditions
//! of a correct buffer. Findings are reported as values — never raised —
//! since they are heuristic: the checks can flag unusual-but-correct
//! results and are meant for diagnostics and tests.

use super::{BufferParams, CapStyle, GeometryRef};
use crate::winding::twice_signed_ring_area;
use crate::GeoFloat;
use geo_types::private_utils::line_segment_distance;
use geo_types::{Coord, Geometry, LineString, MultiPolygon, Rect};

use std::fmt;

/// A failed validation check: a human-readable message and, when known,
/// the coordinate at which the discrepancy was observed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue<F: GeoFloat> {
    location: Option<Coord<F>>,
    message: String,
}

impl<F: GeoFloat> ValidationIssue<F> {
    fn new(message: impl Into<String>) -> Self {
        ValidationIssue {
            location: None,
            message: message.into(),
        }
    }

    fn at(message: impl Into<String>, location: Coord<F>) -> Self {
        ValidationIssue {
            location: Some(location),
            message: message.into(),
        }
    }

    pub fn location(&self) -> Option<Coord<F>> {
        self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<F: GeoFloat> fmt::Display for ValidationIssue<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(c) => write!(f, "{} near ({:?}, {:?})", self.message, c.x, c.y),
            None => self.message.fmt(f),
        }
    }
}

/// Heuristic validator for buffer results.
pub struct BufferValidator;

/// Relative slack applied to the envelope and distance checks.
const VALIDATION_TOLERANCE: f64 = 0.01;

impl BufferValidator {
    /// Check `result` against `input` buffered by `distance`. Checks are
    /// short-circuited: the first failure is returned.
    pub fn validate<F: GeoFloat>(
        input: &Geometry<F>,
        distance: F,
        params: &BufferParams<F>,
        result: &MultiPolygon<F>,
    ) -> Option<ValidationIssue<F>> {
        validate_ref(&GeometryRef::Geometry(input), distance, params, result)
    }
}

pub(crate) fn validate_ref<F: GeoFloat>(
    input: &GeometryRef<'_, F>,
    distance: F,
    params: &BufferParams<F>,
    result: &MultiPolygon<F>,
) -> Option<ValidationIssue<F>> {
    let result_empty = result.0.iter().all(|p| p.exterior().0.is_empty());

    // non-areal inputs vanish under non-positive distances
    if distance <= F::zero() && input.max_dimension() < 2 && !result_empty {
        return Some(ValidationIssue::new(
            "non-positive distance on a non-areal input must produce an empty result",
        ));
    }

    if let Some(issue) = check_envelope(input, distance, result, result_empty) {
        return Some(issue);
    }
    if let Some(issue) = check_area_sign(input, distance, result) {
        return Some(issue);
    }
    check_boundary_distance(input, distance, params, result, result_empty)
}

fn check_envelope<F: GeoFloat>(
    input: &GeometryRef<'_, F>,
    distance: F,
    result: &MultiPolygon<F>,
    result_empty: bool,
) -> Option<ValidationIssue<F>> {
    if distance <= F::zero() || result_empty {
        return None;
    }
    let input_env = envelope_of_ref(input)?;
    let result_env = envelope_of_result(result)?;

    let pad = distance.abs() * F::from(VALIDATION_TOLERANCE).expect("valid float constant");
    let expected = expand(&input_env, distance);
    let padded = expand(&result_env, pad);
    if padded.min().x > expected.min().x
        || padded.min().y > expected.min().y
        || padded.max().x < expected.max().x
        || padded.max().y < expected.max().y
    {
        return Some(ValidationIssue::at(
            "result envelope does not cover the expanded input envelope",
            result_env.min(),
        ));
    }
    None
}

fn check_area_sign<F: GeoFloat>(
    input: &GeometryRef<'_, F>,
    distance: F,
    result: &MultiPolygon<F>,
) -> Option<ValidationIssue<F>> {
    if input.max_dimension() < 2 {
        return None;
    }
    let input_area = areal_area(input);
    let result_area = multi_polygon_area(result);
    if distance > F::zero() && result_area < input_area {
        return Some(ValidationIssue::new(
            "positive distance must not shrink a polygonal input",
        ));
    }
    if distance < F::zero() && result_area > input_area {
        return Some(ValidationIssue::new(
            "negative distance must not grow a polygonal input",
        ));
    }
    None
}

/// Densified directed Hausdorff check: every sampled point of the result
/// boundary must lie within `[|d|·(1−ε), |d|·(1+ε)]` of the input
/// boundary. Only meaningful for round caps, where the whole boundary is
/// equidistant from the input.
fn check_boundary_distance<F: GeoFloat>(
    input: &GeometryRef<'_, F>,
    distance: F,
    params: &BufferParams<F>,
    result: &MultiPolygon<F>,
    result_empty: bool,
) -> Option<ValidationIssue<F>> {
    if result_empty || distance == F::zero() || params.cap() != CapStyle::Round {
        return None;
    }

    let boundary = InputBoundary::of(input);
    if boundary.is_empty() {
        return None;
    }

    let magnitude = distance.abs();
    let tolerance = F::from(VALIDATION_TOLERANCE).expect("valid float constant");
    let lower = magnitude * (F::one() - tolerance);
    let upper = magnitude * (F::one() + tolerance);
    let mut directed_hausdorff = F::zero();

    let four = F::from(4.0).expect("valid float constant");
    let step = magnitude / four;
    for polygon in &result.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors().iter()) {
            for sample in densified_coords(ring, step) {
                let dist = boundary.distance(sample);
                if dist < lower {
                    return Some(ValidationIssue::at(
                        "result boundary comes closer to the input than the buffer distance",
                        sample,
                    ));
                }
                if dist > directed_hausdorff {
                    directed_hausdorff = dist;
                }
            }
        }
    }
    if directed_hausdorff > upper {
        return Some(ValidationIssue::new(format!(
            "result boundary strays beyond the buffer distance: {directed_hausdorff:?}"
        )));
    }
    None
}

/// The input's boundary, flattened to segments and isolated points.
struct InputBoundary<F: GeoFloat> {
    segments: Vec<(Coord<F>, Coord<F>)>,
    points: Vec<Coord<F>>,
}

impl<F: GeoFloat> InputBoundary<F> {
    fn of(input: &GeometryRef<'_, F>) -> Self {
        let mut boundary = InputBoundary {
            segments: Vec::new(),
            points: Vec::new(),
        };
        boundary.add(input);
        boundary
    }

    fn add(&mut self, input: &GeometryRef<'_, F>) {
        match input {
            GeometryRef::Point(p) => self.points.push(p.0),
            GeometryRef::MultiPoint(mp) => self.points.extend(mp.0.iter().map(|p| p.0)),
            GeometryRef::Line(line) => self.segments.push((line.start, line.end)),
            GeometryRef::LineString(ls) => self.add_line_string(ls),
            GeometryRef::MultiLineString(mls) => {
                mls.0.iter().for_each(|ls| self.add_line_string(ls))
            }
            GeometryRef::Polygon(polygon) => {
                self.add_line_string(polygon.exterior());
                polygon.interiors().iter().for_each(|r| self.add_line_string(r));
            }
            GeometryRef::MultiPolygon(mp) => {
                mp.0.iter().for_each(|p| self.add(&GeometryRef::Polygon(p)))
            }
            GeometryRef::GeometryCollection(gc) => gc
                .0
                .iter()
                .for_each(|g| self.add(&GeometryRef::Geometry(g))),
            GeometryRef::Rect(rect) => self.add(&GeometryRef::Polygon(&rect.to_polygon())),
            GeometryRef::Triangle(tri) => self.add(&GeometryRef::Polygon(&tri.to_polygon())),
            GeometryRef::Geometry(geometry) => match geometry {
                Geometry::Point(g) => self.add(&GeometryRef::Point(g)),
                Geometry::Line(g) => self.add(&GeometryRef::Line(g)),
                Geometry::LineString(g) => self.add(&GeometryRef::LineString(g)),
                Geometry::Polygon(g) => self.add(&GeometryRef::Polygon(g)),
                Geometry::MultiPoint(g) => self.add(&GeometryRef::MultiPoint(g)),
                Geometry::MultiLineString(g) => self.add(&GeometryRef::MultiLineString(g)),
                Geometry::MultiPolygon(g) => self.add(&GeometryRef::MultiPolygon(g)),
                Geometry::GeometryCollection(g) => self.add(&GeometryRef::GeometryCollection(g)),
                Geometry::Rect(g) => self.add(&GeometryRef::Rect(g)),
                Geometry::Triangle(g) => self.add(&GeometryRef::Triangle(g)),
            },
        }
    }

    fn add_line_string(&mut self, ls: &LineString<F>) {
        match ls.0.len() {
            0 => {}
            1 => self.points.push(ls.0[0]),
            _ => self
                .segments
                .extend(ls.0.windows(2).map(|pair| (pair[0], pair[1]))),
        }
    }

    fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.points.is_empty()
    }

    fn distance(&self, coord: Coord<F>) -> F {
        let mut min = <F as num_traits::Bounded>::max_value();
        for &(start, end) in &self.segments {
            min = min.min(line_segment_distance(coord, start, end));
        }
        for &point in &self.points {
            let dx = coord.x - point.x;
            let dy = coord.y - point.y;
            min = min.min((dx * dx + dy * dy).sqrt());
        }
        min
    }
}

/// The ring's coordinates plus interpolated points so that no sample gap
/// exceeds `step`.
fn densified_coords<F: GeoFloat>(ring: &LineString<F>, step: F) -> Vec<Coord<F>> {
    let mut samples = Vec::new();
    for pair in ring.0.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        samples.push(a);
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let length = (dx * dx + dy * dy).sqrt();
        let pieces = (length / step)
            .ceil()
            .to_usize()
            .unwrap_or(1)
            .clamp(1, 32);
        for i in 1..pieces {
            let t = F::from(i).expect("index fits") / F::from(pieces).expect("count fits");
            samples.push(Coord {
                x: a.x + dx * t,
                y: a.y + dy * t,
            });
        }
    }
    samples
}

fn envelope_of_ref<F: GeoFloat>(input: &GeometryRef<'_, F>) -> Option<Rect<F>> {
    let mut env: Option<Rect<F>> = None;
    input.for_each_coord(&mut |c| env = Some(grow(env, c)));
    env
}

fn envelope_of_result<F: GeoFloat>(result: &MultiPolygon<F>) -> Option<Rect<F>> {
    let mut env: Option<Rect<F>> = None;
    for polygon in &result.0 {
        for c in &polygon.exterior().0 {
            env = Some(grow(env, *c));
        }
    }
    env
}

fn grow<F: GeoFloat>(env: Option<Rect<F>>, c: Coord<F>) -> Rect<F> {
    match env {
        None => Rect::new(c, c),
        Some(rect) => Rect::new(
            Coord {
                x: rect.min().x.min(c.x),
                y: rect.min().y.min(c.y),
            },
            Coord {
                x: rect.max().x.max(c.x),
                y: rect.max().y.max(c.y),
            },
        ),
    }
}

fn expand<F: GeoFloat>(rect: &Rect<F>, amount: F) -> Rect<F> {
    Rect::new(
        Coord {
            x: rect.min().x - amount,
            y: rect.min().y - amount,
        },
        Coord {
            x: rect.max().x + amount,
            y: rect.max().y + amount,
        },
    )
}

fn multi_polygon_area<F: GeoFloat>(mp: &MultiPolygon<F>) -> F {
    let two = F::one() + F::one();
    mp.0.iter().fold(F::zero(), |total, polygon| {
        let shell = twice_signed_ring_area(&polygon.exterior().0).abs() / two;
        let holes = polygon
            .interiors()
            .iter()
            .fold(F::zero(), |sum, ring| {
                sum + twice_signed_ring_area(&ring.0).abs() / two
            });
        total + shell - holes
    })
}

/// Area of the areal components of the input.
fn areal_area<F: GeoFloat>(input: &GeometryRef<'_, F>) -> F {
    let two = F::one() + F::one();
    match input {
        GeometryRef::Polygon(polygon) => {
            let shell = twice_signed_ring_area(&polygon.exterior().0).abs() / two;
            polygon.interiors().iter().fold(shell, |area, ring| {
                area - twice_signed_ring_area(&ring.0).abs() / two
            })
        }
        GeometryRef::MultiPolygon(mp) => mp
            .0
            .iter()
            .fold(F::zero(), |sum, p| sum + areal_area(&GeometryRef::Polygon(p))),
        GeometryRef::Rect(rect) => rect.width() * rect.height(),
        GeometryRef::Triangle(tri) => {
            twice_signed_ring_area(&[tri.0, tri.1, tri.2, tri.0]).abs() / two
        }
        GeometryRef::GeometryCollection(gc) => gc.0.iter().fold(F::zero(), |sum, g| {
            sum + areal_area(&GeometryRef::Geometry(g))
        }),
        GeometryRef::Geometry(geometry) => match geometry {
            Geometry::Polygon(g) => areal_area(&GeometryRef::Polygon(g)),
            Geometry::MultiPolygon(g) => areal_area(&GeometryRef::MultiPolygon(g)),
            Geometry::Rect(g) => areal_area(&GeometryRef::Rect(g)),
            Geometry::Triangle(g) => areal_area(&GeometryRef::Triangle(g)),
            Geometry::GeometryCollection(g) => areal_area(&GeometryRef::GeometryCollection(g)),
            _ => F::zero(),
        },
        _ => F::zero(),
    }
}
