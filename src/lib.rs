//! Polygonal buffering for [`geo-types`] geometries.
//!
//! The buffer of a geometry `G` at distance `d` is the set of all points
//! within distance `d` of `G` — the Minkowski sum of `G` with a disk of
//! radius `d`. For polygonal inputs a negative distance erodes the polygon
//! instead. The result is always a topologically valid [`MultiPolygon`]
//! (possibly empty).
//!
//! ```
//! use geo_buffer::Buffer;
//! use geo_types::point;
//!
//! let circle = point!(x: 0.0, y: 0.0).buffer(2.0).unwrap();
//! assert_eq!(circle.0.len(), 1);
//! ```
//!
//! # Pipeline
//!
//! 1. Raw offset curves are generated per input component, approximating
//!    circular fillets at convex corners and capping line ends
//!    ([`BufferParams`] controls the cap style and arc resolution).
//! 2. The curves are noded — every self-intersection is materialized as a
//!    shared endpoint — using a monotone-chain index, with snap-rounding to
//!    a fixed grid when a [`PrecisionModel`](precision::PrecisionModel) is
//!    in force.
//! 3. A planar graph is built from the noded edges and each edge side is
//!    labeled interior or exterior by winding-depth propagation.
//! 4. Boundary rings are traced from the graph and assembled into polygons
//!    with holes.
//!
//! If floating-point noding produces an inconsistent topology, the operation
//! retries on successively coarser fixed-precision grids before giving up.
//!
//! [`geo-types`]: geo_types
//! [`MultiPolygon`]: geo_types::MultiPolygon

#[macro_use]
extern crate log;

pub use geo_types::{coord, line_string, point, polygon, CoordFloat, CoordNum};

pub mod buffer;
mod chain;
mod error;
pub mod intersection;
mod graph;
mod noding;
pub mod precision;
pub mod predicates;
mod utils;
mod winding;

pub use buffer::validate::{BufferValidator, ValidationIssue};
pub use buffer::{Buffer, BufferParams, CapStyle};
pub use error::{BufferError, TopologyError};

/// The numeric trait bound for buffering.
///
/// Buffering constructs new ordinate values (fillet arcs, segment
/// intersections, grid rounding) and runs robust predicates through `f64`,
/// so a full floating point scalar is required; there is no integer
/// rendition of this operation.
pub trait GeoFloat:
    CoordFloat + num_traits::Signed + num_traits::Bounded + float_next_after::NextAfter
{
}
impl<T> GeoFloat for T where
    T: CoordFloat + num_traits::Signed + num_traits::Bounded + float_next_after::NextAfter
{
}
