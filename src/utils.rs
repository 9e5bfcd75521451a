//! Internal utility functions shared across the pipeline.

use geo_types::{Coord, CoordNum, Rect};

use std::cmp::Ordering;

/// Compare two coordinates lexicographically: first by x, then by y.
///
/// Coordinates must be non-NaN.
pub(crate) fn lex_cmp<T: CoordNum>(a: &Coord<T>, b: &Coord<T>) -> Ordering {
    debug_assert!(!has_nan(a) && !has_nan(b), "NaN coordinates are not supported");
    a.x.partial_cmp(&b.x)
        .unwrap()
        .then(a.y.partial_cmp(&b.y).unwrap())
}

fn has_nan<T: CoordNum>(c: &Coord<T>) -> bool {
    c.x != c.x || c.y != c.y
}

/// Whether two axis-aligned rectangles share at least one point
/// (boundaries included).
pub(crate) fn rects_intersect<T: CoordNum>(a: &Rect<T>, b: &Rect<T>) -> bool {
    a.min().x <= b.max().x
        && b.min().x <= a.max().x
        && a.min().y <= b.max().y
        && b.min().y <= a.max().y
}

/// Whether `rect` contains `coord`, boundary included.
pub(crate) fn rect_contains<T: CoordNum>(rect: &Rect<T>, coord: &Coord<T>) -> bool {
    rect.min().x <= coord.x
        && coord.x <= rect.max().x
        && rect.min().y <= coord.y
        && coord.y <= rect.max().y
}

/// Copy `coords`, collapsing runs of consecutive equal coordinates.
pub(crate) fn remove_repeated_coords<T: CoordNum>(coords: &[Coord<T>]) -> Vec<Coord<T>> {
    let mut cleaned: Vec<Coord<T>> = Vec::with_capacity(coords.len());
    for coord in coords {
        if cleaned.last() != Some(coord) {
            cleaned.push(*coord);
        }
    }
    cleaned
}
