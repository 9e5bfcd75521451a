use super::{Label, Location};
use crate::error::TopologyError;
use crate::GeoFloat;
use geo_types::{Coord, Line};

/// A noded polyline of the planar graph.
///
/// Coordinates are stored in a canonical direction (the lexicographically
/// smaller of the two traversals), so coincident strands from different
/// curves intern into one edge. `depth_delta` is the net number of curve
/// strands along the canonical direction: the winding depth on the edge's
/// left exceeds the depth on its right by exactly `depth_delta`.
#[derive(Debug)]
pub(crate) struct Edge<F: GeoFloat> {
    coords: Vec<Coord<F>>,
    depth_delta: i32,
    depths: Option<(i32, i32)>,
}

impl<F: GeoFloat> Edge<F> {
    pub fn new(coords: Vec<Coord<F>>, depth_delta: i32) -> Self {
        debug_assert!(coords.len() >= 2, "can't add degenerate edge");
        Edge {
            coords,
            depth_delta,
            depths: None,
        }
    }

    pub fn coords(&self) -> &[Coord<F>] {
        &self.coords
    }

    pub fn first_segment(&self) -> Line<F> {
        Line::new(self.coords[0], self.coords[1])
    }

    pub fn last_segment_reversed(&self) -> Line<F> {
        let n = self.coords.len();
        Line::new(self.coords[n - 1], self.coords[n - 2])
    }

    pub fn depth_delta(&self) -> i32 {
        self.depth_delta
    }

    /// Merge another coincident strand into this edge.
    pub fn add_strand(&mut self, delta: i32) {
        self.depth_delta += delta;
    }

    pub fn depths(&self) -> Option<(i32, i32)> {
        self.depths
    }

    /// Record the resolved winding depths `(left, right)`. Assigning twice
    /// must agree; a mismatch means labeling has become inconsistent.
    pub fn set_depths(&mut self, left: i32, right: i32) -> Result<(), TopologyError<F>> {
        debug_assert_eq!(left - right, self.depth_delta, "depths must match delta");
        match self.depths {
            None => {
                self.depths = Some((left, right));
                Ok(())
            }
            Some(existing) if existing == (left, right) => Ok(()),
            Some(existing) => Err(TopologyError::at(
                format!(
                    "conflicting edge depths: {:?} vs {:?}",
                    existing,
                    (left, right)
                ),
                self.coords[0],
            )),
        }
    }

    /// The resolved side label: a side is interior when covered by at least
    /// one curve loop (nonzero winding).
    pub fn label(&self) -> Option<Label> {
        let (left, right) = self.depths?;
        let location = |depth: i32| {
            if depth != 0 {
                Location::Interior
            } else {
                Location::Exterior
            }
        };
        Some(Label {
            left: location(left),
            right: location(right),
        })
    }

    /// Whether this edge separates interior from exterior.
    pub fn is_boundary(&self) -> bool {
        self.label().is_some_and(|label| label.is_boundary())
    }
}
