//! Buffer a few geometries and print a summary of each result.
//!
//! Run with `RUST_LOG=debug` to watch the noding and labeling passes.

use geo_buffer::{Buffer, BufferParams, CapStyle};
use geo_types::{line_string, point, polygon, MultiPolygon};

fn describe(name: &str, result: &MultiPolygon<f64>) {
    let rings: usize = result
        .0
        .iter()
        .map(|polygon| 1 + polygon.interiors().len())
        .sum();
    let vertices: usize = result
        .0
        .iter()
        .map(|polygon| {
            polygon.exterior().0.len()
                + polygon
                    .interiors()
                    .iter()
                    .map(|r| r.0.len())
                    .sum::<usize>()
        })
        .sum();
    println!("{name}: {} polygon(s), {rings} ring(s), {vertices} vertices", result.0.len());
}

fn main() {
    pretty_env_logger::init();

    let disk = point!(x: 0.0, y: 0.0).buffer(10.0).unwrap();
    describe("point buffer", &disk);

    let road = line_string![
        (x: 0.0, y: 0.0),
        (x: 40.0, y: 10.0),
        (x: 60.0, y: -5.0),
        (x: 90.0, y: 0.0),
    ];
    let params = BufferParams::new().end_cap_style(CapStyle::Square);
    let corridor = road.buffer_with_params(4.0, &params).unwrap();
    describe("line buffer, square caps", &corridor);

    let parcel = polygon![
        exterior: [
            (x: 0.0, y: 0.0),
            (x: 100.0, y: 0.0),
            (x: 100.0, y: 80.0),
            (x: 0.0, y: 80.0),
            (x: 0.0, y: 0.0),
        ],
        interiors: [
            [
                (x: 40.0, y: 30.0),
                (x: 60.0, y: 30.0),
                (x: 60.0, y: 50.0),
                (x: 40.0, y: 50.0),
                (x: 40.0, y: 30.0),
            ],
        ],
    ];
    describe("polygon buffer", &parcel.buffer(5.0).unwrap());
    describe("polygon erosion", &parcel.buffer(-5.0).unwrap());
}
