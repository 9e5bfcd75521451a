use approx::assert_relative_eq;
use geo_buffer::{Buffer, BufferError, BufferParams, BufferValidator, CapStyle};
use geo_types::{
    coord, line_string, point, polygon, Coord, Geometry, GeometryCollection, MultiPoint,
    MultiPolygon,
};

fn ring_area(ring: &[Coord<f64>]) -> f64 {
    let mut doubled = 0.0;
    for pair in ring.windows(2) {
        doubled += pair[0].x * pair[1].y - pair[1].x * pair[0].y;
    }
    doubled / 2.0
}

/// Signed area of a result: counter-clockwise shells count positive,
/// clockwise holes negative.
fn area(mp: &MultiPolygon<f64>) -> f64 {
    mp.0.iter()
        .map(|polygon| {
            ring_area(&polygon.exterior().0)
                + polygon
                    .interiors()
                    .iter()
                    .map(|ring| ring_area(&ring.0))
                    .sum::<f64>()
        })
        .sum()
}

fn envelope(mp: &MultiPolygon<f64>) -> (f64, f64, f64, f64) {
    let mut env = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for polygon in &mp.0 {
        for c in &polygon.exterior().0 {
            env.0 = env.0.min(c.x);
            env.1 = env.1.min(c.y);
            env.2 = env.2.max(c.x);
            env.3 = env.3.max(c.y);
        }
    }
    env
}

fn assert_valid_orientation(mp: &MultiPolygon<f64>) {
    for polygon in &mp.0 {
        assert!(
            ring_area(&polygon.exterior().0) > 0.0,
            "shells must be counter-clockwise"
        );
        for hole in polygon.interiors() {
            assert!(ring_area(&hole.0) < 0.0, "holes must be clockwise");
        }
    }
}

#[test]
fn point_buffer_is_a_regular_32_gon() {
    let result = point!(x: 0.0, y: 0.0).buffer(1.0).unwrap();

    assert_eq!(result.0.len(), 1);
    let shell = &result.0[0].exterior().0;
    assert_eq!(shell.len(), 33);

    // inscribed 32-gon: area between π(1 − 1/Q²) and π
    let expected = 16.0 * (std::f64::consts::PI / 16.0).sin();
    assert_relative_eq!(area(&result), expected, epsilon = 1e-9);
    assert!(area(&result) > std::f64::consts::PI * (1.0 - 1.0 / 64.0));
    assert!(area(&result) < std::f64::consts::PI);

    let (min_x, min_y, max_x, max_y) = envelope(&result);
    assert_relative_eq!(min_x, -1.0, epsilon = 0.005);
    assert_relative_eq!(min_y, -1.0, epsilon = 0.005);
    assert_relative_eq!(max_x, 1.0, epsilon = 0.005);
    assert_relative_eq!(max_y, 1.0, epsilon = 0.005);
}

#[test]
fn point_buffer_with_square_cap() {
    let params = BufferParams::new().end_cap_style(CapStyle::Square);
    let result = point!(x: 0.0, y: 0.0)
        .buffer_with_params(1.0, &params)
        .unwrap();

    assert_eq!(result.0.len(), 1);
    assert_relative_eq!(area(&result), 4.0);
    assert_eq!(envelope(&result), (-1.0, -1.0, 1.0, 1.0));
}

#[test]
fn point_buffer_with_flat_cap_is_empty() {
    let params = BufferParams::new().end_cap_style(CapStyle::Flat);
    let result = point!(x: 0.0, y: 0.0)
        .buffer_with_params(1.0, &params)
        .unwrap();
    assert!(result.0.is_empty());
}

#[test]
fn flat_capped_line_is_a_rectangle() {
    let line = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)];
    let params = BufferParams::new().end_cap_style(CapStyle::Flat);
    let result = line.buffer_with_params(1.0, &params).unwrap();

    assert_eq!(result.0.len(), 1);
    assert_relative_eq!(area(&result), 20.0);
    assert_eq!(envelope(&result), (0.0, -1.0, 10.0, 1.0));
    let shell = &result.0[0].exterior().0;
    assert_eq!(shell.len(), 5);
}

#[test]
fn square_capped_line_extends_past_both_ends() {
    let line = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)];
    let params = BufferParams::new().end_cap_style(CapStyle::Square);
    let result = line.buffer_with_params(1.0, &params).unwrap();

    assert_relative_eq!(area(&result), 24.0);
    assert_eq!(envelope(&result), (-1.0, -1.0, 11.0, 1.0));
}

#[test]
fn round_capped_line_is_a_capsule() {
    let line = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)];
    let result = line.buffer(1.0).unwrap();

    // rectangle plus two half-circles (inscribed 32-gon halves)
    let expected = 20.0 + 16.0 * (std::f64::consts::PI / 16.0).sin();
    assert_relative_eq!(area(&result), expected, epsilon = 1e-9);
    assert_valid_orientation(&result);
}

#[test]
fn negative_buffer_erodes_a_polygon() {
    let square = polygon![
        (x: 0.0, y: 0.0),
        (x: 10.0, y: 0.0),
        (x: 10.0, y: 10.0),
        (x: 0.0, y: 10.0),
        (x: 0.0, y: 0.0),
    ];
    let result = square.buffer(-1.0).unwrap();

    assert_eq!(result.0.len(), 1);
    assert_relative_eq!(area(&result), 64.0);
    assert_eq!(envelope(&result), (1.0, 1.0, 9.0, 9.0));
}

#[test]
fn fully_eroded_polygon_is_empty() {
    let square = polygon![
        (x: 0.0, y: 0.0),
        (x: 4.0, y: 0.0),
        (x: 4.0, y: 4.0),
        (x: 0.0, y: 4.0),
        (x: 0.0, y: 0.0),
    ];
    let result = square.buffer(-2.5).unwrap();
    assert!(result.0.is_empty());
}

#[test]
fn zero_buffer_repairs_a_bowtie() {
    let bowtie = polygon![
        (x: 0.0, y: 0.0),
        (x: 10.0, y: 10.0),
        (x: 0.0, y: 10.0),
        (x: 10.0, y: 0.0),
        (x: 0.0, y: 0.0),
    ];
    let result = bowtie.buffer(0.0).unwrap();

    assert_eq!(result.0.len(), 2);
    assert_valid_orientation(&result);
    let mut areas: Vec<f64> = result.0.iter().map(|p| ring_area(&p.exterior().0)).collect();
    areas.sort_by(f64::total_cmp);
    assert_relative_eq!(areas[0], 25.0);
    assert_relative_eq!(areas[1], 25.0);
}

#[test]
fn polygon_with_hole_keeps_a_shrunken_hole() {
    let donut = polygon![
        exterior: [
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ],
        interiors: [
            [
                (x: 3.0, y: 3.0),
                (x: 7.0, y: 3.0),
                (x: 7.0, y: 7.0),
                (x: 3.0, y: 7.0),
                (x: 3.0, y: 3.0),
            ],
        ],
    ];
    let result = donut.buffer(1.0).unwrap();

    assert_eq!(result.0.len(), 1);
    assert_eq!(result.0[0].interiors().len(), 1);
    assert_valid_orientation(&result);

    // expanded outer ring minus the shrunken 2×2 hole
    let expected = 140.0 + 16.0 * (std::f64::consts::PI / 16.0).sin() - 4.0;
    assert_relative_eq!(area(&result), expected, epsilon = 1e-9);
}

#[test]
fn buffer_closes_small_holes() {
    let donut = polygon![
        exterior: [
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ],
        interiors: [
            [
                (x: 4.0, y: 4.0),
                (x: 6.0, y: 4.0),
                (x: 6.0, y: 6.0),
                (x: 4.0, y: 6.0),
                (x: 4.0, y: 4.0),
            ],
        ],
    ];
    // the 2×2 hole disappears entirely under a distance-1 buffer
    let result = donut.buffer(1.0).unwrap();
    assert_eq!(result.0.len(), 1);
    assert_eq!(result.0[0].interiors().len(), 0);
}

#[test]
fn zero_buffer_of_a_valid_polygon_is_idempotent() {
    let square = polygon![
        (x: 0.0, y: 0.0),
        (x: 10.0, y: 0.0),
        (x: 10.0, y: 10.0),
        (x: 0.0, y: 10.0),
        (x: 0.0, y: 0.0),
    ];
    let result = square.buffer(0.0).unwrap();
    assert_eq!(result.0.len(), 1);
    assert_relative_eq!(area(&result), 100.0);
    assert_eq!(envelope(&result), (0.0, 0.0, 10.0, 10.0));
}

#[test]
fn zero_buffer_of_linear_input_is_empty() {
    let line = line_string![(x: 0.0, y: 0.0), (x: 5.0, y: 5.0)];
    assert!(line.buffer(0.0).unwrap().0.is_empty());
    assert!(line.buffer(-1.0).unwrap().0.is_empty());
    assert!(point!(x: 1.0, y: 1.0).buffer(-0.5).unwrap().0.is_empty());
}

#[test]
fn buffers_grow_monotonically() {
    let line = line_string![(x: 0.0, y: 0.0), (x: 6.0, y: 2.0), (x: 9.0, y: -1.0)];
    let small = line.buffer(0.5).unwrap();
    let large = line.buffer(2.0).unwrap();

    assert!(area(&small) < area(&large));
    let (s0, s1, s2, s3) = envelope(&small);
    let (l0, l1, l2, l3) = envelope(&large);
    assert!(l0 <= s0 && l1 <= s1 && l2 >= s2 && l3 >= s3);
}

#[test]
fn envelope_expands_by_the_distance() {
    let line = line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)];
    let result = line.buffer(2.0).unwrap();
    let (min_x, min_y, max_x, max_y) = envelope(&result);
    assert_relative_eq!(min_x, -2.0, epsilon = 0.02);
    assert_relative_eq!(min_y, -2.0, epsilon = 0.02);
    assert_relative_eq!(max_x, 12.0, epsilon = 0.02);
    assert_relative_eq!(max_y, 2.0, epsilon = 0.02);
}

#[test]
fn buffer_then_unbuffer_roughly_restores_a_convex_input() {
    let square = polygon![
        (x: 0.0, y: 0.0),
        (x: 10.0, y: 0.0),
        (x: 10.0, y: 10.0),
        (x: 0.0, y: 10.0),
        (x: 0.0, y: 0.0),
    ];
    let grown = square.buffer(2.0).unwrap();
    let restored = Geometry::MultiPolygon(grown).buffer(-2.0).unwrap();

    assert_eq!(restored.0.len(), 1);
    // the restored square may wobble around the corners by up to twice
    // the chord error of a quadrant-8 arc
    let tolerance = 4.0 * (1.0 - (std::f64::consts::PI / 32.0).cos()) + 1e-9;
    assert!((area(&restored) - 100.0).abs() < 1.0);
    let (min_x, min_y, max_x, max_y) = envelope(&restored);
    assert_relative_eq!(min_x, 0.0, epsilon = tolerance);
    assert_relative_eq!(min_y, 0.0, epsilon = tolerance);
    assert_relative_eq!(max_x, 10.0, epsilon = tolerance);
    assert_relative_eq!(max_y, 10.0, epsilon = tolerance);
}

#[test]
fn buffering_is_deterministic() {
    let line = line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 4.0), (x: 7.0, y: 1.0)];
    let a = line.buffer(1.25).unwrap();
    let b = line.buffer(1.25).unwrap();
    assert_eq!(a, b);
}

#[test]
fn overlapping_point_buffers_merge() {
    let points = MultiPoint::new(vec![point!(x: 0.0, y: 0.0), point!(x: 1.0, y: 0.0)]);
    let result = points.buffer(1.0).unwrap();

    assert_eq!(result.0.len(), 1);
    let single = 16.0 * (std::f64::consts::PI / 16.0).sin();
    assert!(area(&result) > single);
    assert!(area(&result) < 2.0 * single);
}

#[test]
fn distant_point_buffers_stay_separate() {
    let points = MultiPoint::new(vec![point!(x: 0.0, y: 0.0), point!(x: 10.0, y: 0.0)]);
    let result = points.buffer(1.0).unwrap();
    assert_eq!(result.0.len(), 2);
}

#[test]
fn geometry_collection_buffers_all_components() {
    let collection = GeometryCollection::new_from(vec![
        Geometry::Point(point!(x: 0.5, y: 0.2)),
        Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 5.0, y: 0.0)]),
    ]);
    let result = collection.buffer(1.0).unwrap();
    // the point's disk lies entirely within the line's capsule
    assert_eq!(result.0.len(), 1);
}

#[test]
fn degenerate_line_buffers_like_a_point() {
    let line = line_string![(x: 2.0, y: 2.0), (x: 2.0, y: 2.0), (x: 2.0, y: 2.0)];
    let result = line.buffer(1.0).unwrap();
    assert_eq!(result.0.len(), 1);
    let expected = 16.0 * (std::f64::consts::PI / 16.0).sin();
    assert_relative_eq!(area(&result), expected, epsilon = 1e-9);
}

#[test]
fn empty_inputs_buffer_to_empty_results() {
    let empty_ls = geo_types::LineString::<f64>::new(vec![]);
    assert!(empty_ls.buffer(1.0).unwrap().0.is_empty());

    let empty_mp = MultiPolygon::<f64>::new(vec![]);
    assert!(empty_mp.buffer(1.0).unwrap().0.is_empty());
}

#[test]
fn non_finite_input_is_rejected() {
    let line = line_string![(x: 0.0, y: 0.0), (x: f64::NAN, y: 1.0)];
    assert!(matches!(
        line.buffer(1.0),
        Err(BufferError::InvalidInput(_))
    ));

    let point = point!(x: 0.0, y: 0.0);
    assert!(matches!(
        point.buffer(f64::INFINITY),
        Err(BufferError::InvalidInput(_))
    ));
}

#[test]
fn zero_quadrant_segments_is_rejected() {
    let params = BufferParams::new().quadrant_segments(0);
    let result = point!(x: 0.0, y: 0.0).buffer_with_params(1.0, &params);
    assert!(matches!(result, Err(BufferError::InvalidInput(_))));
}

#[test]
fn cap_style_codes_round_trip() {
    assert_eq!(CapStyle::from_code(1), Some(CapStyle::Round));
    assert_eq!(CapStyle::from_code(2), Some(CapStyle::Flat));
    assert_eq!(CapStyle::from_code(3), Some(CapStyle::Square));
    assert_eq!(CapStyle::from_code(0), None);
    assert_eq!(CapStyle::from_code(4), None);
}

#[test]
fn quadrant_segments_control_arc_resolution() {
    let coarse = point!(x: 0.0, y: 0.0)
        .buffer_with_params(1.0, &BufferParams::new().quadrant_segments(2))
        .unwrap();
    let fine = point!(x: 0.0, y: 0.0)
        .buffer_with_params(1.0, &BufferParams::new().quadrant_segments(32))
        .unwrap();

    assert_eq!(coarse.0[0].exterior().0.len(), 9);
    assert_eq!(fine.0[0].exterior().0.len(), 129);
    assert!(area(&coarse) < area(&fine));
    assert!(area(&fine) < std::f64::consts::PI);
}

#[test]
fn concave_line_buffer_stays_valid() {
    // a zig-zag with a sharp concave corner
    let line = line_string![
        (x: 0.0, y: 0.0),
        (x: 4.0, y: 0.1),
        (x: 0.0, y: 0.2),
    ];
    let result = line.buffer(1.0).unwrap();
    assert!(!result.0.is_empty());
    assert_valid_orientation(&result);
    // nothing should reach beyond the padded envelope of the input
    let (min_x, min_y, max_x, max_y) = envelope(&result);
    assert!(min_x >= -1.0 - 1e-6 && max_x <= 5.0 + 1e-6);
    assert!(min_y >= -1.0 - 1e-6 && max_y <= 1.2 + 1e-6);
}

#[test]
fn results_pass_the_validator() {
    let donut = polygon![
        exterior: [
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ],
        interiors: [
            [
                (x: 3.0, y: 3.0),
                (x: 7.0, y: 3.0),
                (x: 7.0, y: 7.0),
                (x: 3.0, y: 7.0),
                (x: 3.0, y: 3.0),
            ],
        ],
    ];
    let params = BufferParams::default();
    for distance in [1.0, 0.5, -0.5] {
        let result = donut.buffer_with_params(distance, &params).unwrap();
        let issue = BufferValidator::validate(
            &Geometry::Polygon(donut.clone()),
            distance,
            &params,
            &result,
        );
        assert_eq!(issue, None, "validation failed for distance {distance}");
    }
}

#[test]
fn fixed_precision_model_snaps_output_coordinates() {
    let params = BufferParams::new()
        .end_cap_style(CapStyle::Flat)
        .precision_model(geo_buffer::precision::PrecisionModel::fixed(1.0));
    let line: geo_types::LineString<f64> =
        line_string![(x: 0.05, y: 0.0), (x: 9.96, y: 0.0)];
    let result = line.buffer_with_params(1.0, &params).unwrap();

    for polygon in &result.0 {
        for c in &polygon.exterior().0 {
            assert_relative_eq!(c.x, c.x.round());
            assert_relative_eq!(c.y, c.y.round());
        }
    }
}

#[test]
fn coord_macro_smoke() {
    // keep the coord! import exercised alongside the other fixtures
    let c = coord! { x: 1.0, y: 2.0 };
    assert_eq!(c.x, 1.0);
}
