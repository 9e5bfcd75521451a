//! Noding: making a set of curves fully noded.
//!
//! A set of segment strings is *fully noded* when any two segments either
//! share an endpoint or have disjoint interiors. The noder finds every
//! self- and cross-intersection of the raw offset curves, materializes the
//! intersections as split points, and re-emits the strings cut at those
//! points. Under a fixed precision model this is done by snap-rounding
//! through hot pixels, which keeps the output consistent under
//! floating-point arithmetic.

mod hot_pixel;
mod segment_string;
mod snap_round;

pub(crate) use hot_pixel::HotPixel;
pub(crate) use segment_string::NodedSegmentString;
pub(crate) use snap_round::Noder;
