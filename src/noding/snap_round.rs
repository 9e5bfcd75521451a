use super::{HotPixel, NodedSegmentString};
use crate::chain::{monotone_chains, MonotoneChain};
use crate::error::TopologyError;
use crate::intersection::{segment_intersection, SegmentIntersection};
use crate::precision::PrecisionModel;
use crate::utils::{lex_cmp, rects_intersect};
use crate::GeoFloat;
use geo_types::{Coord, Rect};

use rstar::{RTree, RTreeObject, AABB};
use std::collections::BTreeSet;

/// Noder over a monotone-chain index.
///
/// In `Floating` mode the input strings are split directly at their robust
/// intersection points. Under a `Fixed` model full snap-rounding is
/// performed instead: every intersection point (rounded to the grid) and
/// every vertex becomes a [`HotPixel`], and every segment entering a pixel
/// is snapped through the pixel's center.
pub(crate) struct Noder<'a, F: GeoFloat> {
    precision: &'a PrecisionModel<F>,
}

/// An indexed monotone chain of one input string.
struct ChainLeaf<F: GeoFloat + rstar::RTreeNum> {
    string: usize,
    start: usize,
    end: usize,
    envelope: AABB<Coord<F>>,
}

impl<F: GeoFloat + rstar::RTreeNum> ChainLeaf<F> {
    fn new(string: usize, chain: &MonotoneChain<F>) -> Self {
        ChainLeaf {
            string,
            start: chain.start,
            end: chain.end,
            envelope: AABB::from_corners(chain.envelope().min(), chain.envelope().max()),
        }
    }
}

impl<F: GeoFloat + rstar::RTreeNum> RTreeObject for ChainLeaf<F> {
    type Envelope = AABB<Coord<F>>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// A hot pixel in the pixel index.
struct PixelLeaf<F: GeoFloat + rstar::RTreeNum> {
    pixel: HotPixel<F>,
    envelope: AABB<Coord<F>>,
}

impl<F: GeoFloat + rstar::RTreeNum> RTreeObject for PixelLeaf<F> {
    type Envelope = AABB<Coord<F>>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Coordinate ordered lexicographically, for deterministic pixel sets.
struct CoordKey<F: GeoFloat>(Coord<F>);

impl<F: GeoFloat> PartialEq for CoordKey<F> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<F: GeoFloat> Eq for CoordKey<F> {}
impl<F: GeoFloat> PartialOrd for CoordKey<F> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<F: GeoFloat> Ord for CoordKey<F> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        lex_cmp(&self.0, &other.0)
    }
}

impl<'a, F: GeoFloat + rstar::RTreeNum> Noder<'a, F> {
    pub fn new(precision: &'a PrecisionModel<F>) -> Self {
        Noder { precision }
    }

    /// Node `inputs` into a fully noded set of segment strings.
    pub fn node(
        &self,
        inputs: Vec<Vec<Coord<F>>>,
    ) -> Result<Vec<Vec<Coord<F>>>, TopologyError<F>> {
        let mut strings: Vec<NodedSegmentString<F>> = inputs
            .into_iter()
            .filter(|coords| coords.len() >= 2)
            .map(NodedSegmentString::new)
            .collect();
        if strings.is_empty() {
            return Ok(Vec::new());
        }

        let leaves: Vec<ChainLeaf<F>> = strings
            .iter()
            .enumerate()
            .flat_map(|(string_index, string)| {
                monotone_chains(string.coords())
                    .iter()
                    .map(|chain| ChainLeaf::new(string_index, chain))
                    .collect::<Vec<_>>()
            })
            .collect();
        let tree = RTree::bulk_load(leaves);

        let mut pixel_centers: BTreeSet<CoordKey<F>> = BTreeSet::new();

        for (a, b) in tree.intersection_candidates_with_other_tree(&tree) {
            // the self-join yields both orderings of every pair, and each
            // chain paired with itself; process each unordered pair once and
            // never pair a chain with itself (no intra-chain intersections)
            if (b.string, b.start) <= (a.string, a.start) {
                continue;
            }
            self.process_chain_pair(&mut strings, &mut pixel_centers, a, b);
        }

        if let PrecisionModel::Fixed { scale } = self.precision {
            self.apply_hot_pixels(&mut strings, pixel_centers, *scale);
        }

        let mut noded = Vec::new();
        for string in &mut strings {
            string.add_endpoint_nodes();
            let pieces = string.split_strings();
            if pieces.is_empty() {
                warn!(
                    "segment string collapsed entirely during noding at {:?}",
                    string.coords()[0]
                );
            }
            noded.extend(pieces);
        }
        debug!("noded {} strings", noded.len());
        Ok(noded)
    }

    fn process_chain_pair(
        &self,
        strings: &mut [NodedSegmentString<F>],
        pixel_centers: &mut BTreeSet<CoordKey<F>>,
        a: &ChainLeaf<F>,
        b: &ChainLeaf<F>,
    ) {
        for i in a.start..a.end {
            let seg_a = strings[a.string].segment(i);
            let env_a = Rect::new(seg_a.start, seg_a.end);
            for j in b.start..b.end {
                if a.string == b.string && i == j {
                    continue;
                }
                let seg_b = strings[b.string].segment(j);
                if !rects_intersect(&env_a, &Rect::new(seg_b.start, seg_b.end)) {
                    continue;
                }
                let Some(isect) = segment_intersection(seg_a, seg_b) else {
                    continue;
                };
                if a.string == b.string
                    && is_adjacent(&strings[a.string], i, j)
                    && !isect.is_proper()
                    && matches!(isect, SegmentIntersection::SinglePoint { .. })
                {
                    // adjacent segments sharing their common vertex
                    continue;
                }

                match self.precision {
                    PrecisionModel::Floating => {
                        for point in intersection_points(&isect) {
                            strings[a.string].add_node(point, i);
                            strings[b.string].add_node(point, j);
                        }
                    }
                    PrecisionModel::Fixed { .. } => {
                        for point in intersection_points(&isect) {
                            pixel_centers
                                .insert(CoordKey(self.precision.make_coord_precise(point)));
                        }
                    }
                }
            }
        }
    }

    /// Snap-rounding proper: every vertex joins the intersection points as a
    /// hot pixel, and every segment entering a pixel is noded at its center.
    fn apply_hot_pixels(
        &self,
        strings: &mut [NodedSegmentString<F>],
        mut pixel_centers: BTreeSet<CoordKey<F>>,
        scale: F,
    ) {
        for string in strings.iter() {
            for coord in string.coords() {
                pixel_centers.insert(CoordKey(*coord));
            }
        }

        let pixels: Vec<PixelLeaf<F>> = pixel_centers
            .into_iter()
            .map(|key| {
                let pixel = HotPixel::new(key.0, scale);
                let env = pixel.envelope();
                PixelLeaf {
                    pixel,
                    envelope: AABB::from_corners(env.min(), env.max()),
                }
            })
            .collect();
        debug!("snap rounding with {} hot pixels", pixels.len());
        let tree = RTree::bulk_load(pixels);

        for string in strings.iter_mut() {
            for i in 0..string.segment_count() {
                let seg = string.segment(i);
                let query = AABB::from_corners(seg.start, seg.end);
                // collecting first: the node additions below need `string` mutably
                let centers: Vec<Coord<F>> = tree
                    .locate_in_envelope_intersecting(&query)
                    .filter(|leaf| {
                        leaf.pixel.center() != seg.start
                            && leaf.pixel.center() != seg.end
                            && leaf.pixel.intersects_segment(seg.start, seg.end)
                    })
                    .map(|leaf| leaf.pixel.center())
                    .collect();
                for center in centers {
                    string.add_node(center, i);
                }
            }
        }
    }
}

fn is_adjacent<F: GeoFloat>(string: &NodedSegmentString<F>, i: usize, j: usize) -> bool {
    let diff = i.abs_diff(j);
    if diff == 1 {
        return true;
    }
    // the first and last segments of a closed string are adjacent too
    string.is_closed() && diff == string.segment_count() - 1
}

fn intersection_points<F: GeoFloat>(isect: &SegmentIntersection<F>) -> Vec<Coord<F>> {
    match isect {
        SegmentIntersection::SinglePoint { intersection, .. } => vec![*intersection],
        SegmentIntersection::Collinear { intersection } => {
            vec![intersection.start, intersection.end]
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use geo_types::coord;

    fn noded_pieces(
        inputs: Vec<Vec<Coord<f64>>>,
        model: PrecisionModel<f64>,
    ) -> Vec<Vec<Coord<f64>>> {
        Noder::new(&model).node(inputs).unwrap()
    }

    #[test]
    fn crossing_strings_split_at_intersection() {
        let pieces = noded_pieces(
            vec![
                vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 10.0 }],
                vec![coord! { x: 0.0, y: 10.0 }, coord! { x: 10.0, y: 0.0 }],
            ],
            PrecisionModel::Floating,
        );
        assert_eq!(pieces.len(), 4);
        let crossing = coord! { x: 5.0, y: 5.0 };
        for piece in &pieces {
            assert!(piece.first() == Some(&crossing) || piece.last() == Some(&crossing));
        }
    }

    #[test]
    fn disjoint_strings_pass_through() {
        let pieces = noded_pieces(
            vec![
                vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 0.0 }],
                vec![coord! { x: 0.0, y: 5.0 }, coord! { x: 1.0, y: 5.0 }],
            ],
            PrecisionModel::Floating,
        );
        assert_eq!(pieces.len(), 2);
    }

    #[test]
    fn self_intersecting_ring_is_noded() {
        // bowtie traced as a single closed string
        let pieces = noded_pieces(
            vec![vec![
                coord! { x: 0.0, y: 0.0 },
                coord! { x: 10.0, y: 10.0 },
                coord! { x: 0.0, y: 10.0 },
                coord! { x: 10.0, y: 0.0 },
                coord! { x: 0.0, y: 0.0 },
            ]],
            PrecisionModel::Floating,
        );
        assert_eq!(pieces.len(), 3);
        let crossing = coord! { x: 5.0, y: 5.0 };
        assert_eq!(
            pieces
                .iter()
                .filter(|p| p.first() == Some(&crossing) || p.last() == Some(&crossing))
                .count(),
            3
        );
    }

    #[test]
    fn snap_rounding_splits_at_touching_vertex_pixel() {
        // the vertical string ends on the interior of the horizontal one;
        // its endpoint pixel forces a node there
        let pieces = noded_pieces(
            vec![
                vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 0.0 }],
                vec![
                    coord! { x: 5.0, y: 0.0 },
                    coord! { x: 5.0, y: -3.0 },
                ],
            ],
            PrecisionModel::fixed(1.0),
        );
        // the horizontal string is split at the shared endpoint (5, 0)
        assert!(pieces
            .iter()
            .any(|p| p.last() == Some(&coord! { x: 5.0, y: 0.0 })
                && p.first() == Some(&coord! { x: 0.0, y: 0.0 })));
        assert_eq!(pieces.len(), 3);
    }

    #[test]
    fn collinear_overlap_is_noded_at_overlap_ends() {
        let pieces = noded_pieces(
            vec![
                vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 0.0 }],
                vec![coord! { x: 4.0, y: 0.0 }, coord! { x: 14.0, y: 0.0 }],
            ],
            PrecisionModel::Floating,
        );
        // first string splits at x=4, second at x=10
        assert_eq!(pieces.len(), 4);
    }
}
