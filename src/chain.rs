//! Monotone chains.
//!
//! A monotone chain is a maximal run of a polyline whose segments all stay
//! within one direction quadrant, which gives two useful properties:
//!
//! 1. segments within one chain never intersect each other, and
//! 2. the envelope of the chain equals the bounding box of its endpoints.
//!
//! Property 1 removes same-chain segment pairs from intersection testing;
//! property 2 makes the chain envelope exact and cheap, so chains are good
//! leaves for an envelope index. The noder pairs chains through an R-tree
//! and only tests segments of chains whose envelopes interact.

use crate::GeoFloat;
use geo_types::{Coord, Rect};

use std::cmp::Ordering;

/// A maximal monotone run of a polyline: coordinates
/// `coords[start..=end]`, where each of `start..end` indexes a segment.
#[derive(Debug, Clone)]
pub(crate) struct MonotoneChain<F: GeoFloat> {
    pub start: usize,
    pub end: usize,
    envelope: Rect<F>,
}

impl<F: GeoFloat> MonotoneChain<F> {
    pub fn envelope(&self) -> Rect<F> {
        self.envelope
    }
}

/// Partition `coords` into maximal monotone chains.
///
/// The runs are detected by per-axis ordering: a segment extends the
/// current chain while its x- and y-deltas keep (or first establish) the
/// chain's per-axis directions, which is exactly the single-quadrant
/// criterion.
pub(crate) fn monotone_chains<F: GeoFloat>(coords: &[Coord<F>]) -> Vec<MonotoneChain<F>> {
    let mut chains = Vec::new();
    if coords.len() < 2 {
        return chains;
    }

    let mut chain_start = 0;
    let mut dx = coords[1].x.partial_cmp(&coords[0].x).unwrap();
    let mut dy = coords[1].y.partial_cmp(&coords[0].y).unwrap();

    for i in 2..coords.len() {
        let c0 = coords[i - 1];
        let c1 = coords[i];
        let cmp_x = c1.x.partial_cmp(&c0.x).unwrap();
        let cmp_y = c1.y.partial_cmp(&c0.y).unwrap();

        let monotone_x = dx == Ordering::Equal || cmp_x == Ordering::Equal || dx == cmp_x;
        let monotone_y = dy == Ordering::Equal || cmp_y == Ordering::Equal || dy == cmp_y;

        if monotone_x && monotone_y {
            // the segment extends the current chain, possibly pinning a
            // direction that was still free
            if dx == Ordering::Equal {
                dx = cmp_x;
            }
            if dy == Ordering::Equal {
                dy = cmp_y;
            }
        } else {
            chains.push(chain(coords, chain_start, i - 1));
            chain_start = i - 1;
            dx = cmp_x;
            dy = cmp_y;
        }
    }
    chains.push(chain(coords, chain_start, coords.len() - 1));
    chains
}

fn chain<F: GeoFloat>(coords: &[Coord<F>], start: usize, end: usize) -> MonotoneChain<F> {
    // a monotone run's envelope is spanned by its two endpoints
    MonotoneChain {
        start,
        end,
        envelope: Rect::new(coords[start], coords[end]),
    }
}
