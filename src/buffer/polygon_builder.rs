use crate::error::TopologyError;
use crate::graph::{Location, PlanarGraph};
use crate::winding::{locate_in_ring, twice_signed_ring_area};
use crate::GeoFloat;
use geo_types::{Coord, LineString, MultiPolygon, Polygon};

/// Trace boundary rings out of the labeled graph and assemble them into
/// polygons.
///
/// Every boundary edge is directed with the buffer interior on its left.
/// Following the "next boundary edge clockwise of the twin" rule at each
/// node keeps the interior on the same hand, so each traced ring bounds
/// interior on its left: counter-clockwise rings are shells, clockwise
/// rings are holes. Holes nest into the smallest shell strictly containing
/// one of their vertices.
pub(crate) fn build_polygons<F: GeoFloat>(
    graph: &PlanarGraph<F>,
) -> Result<MultiPolygon<F>, TopologyError<F>> {
    let mut used = vec![false; graph.dir_edges.len()];
    let mut shells: Vec<(Vec<Coord<F>>, F)> = Vec::new();
    let mut holes: Vec<Vec<Coord<F>>> = Vec::new();

    for start in 0..graph.dir_edges.len() {
        if !graph.dir_edges[start].in_result || used[start] {
            continue;
        }

        let mut ring: Vec<Coord<F>> = Vec::new();
        let mut current = start;
        let mut steps = 0usize;
        loop {
            used[current] = true;
            for coord in graph.travel_coords(current) {
                if ring.last() != Some(&coord) {
                    ring.push(coord);
                }
            }

            current = graph.next_result_edge(current)?;
            if current == start {
                break;
            }
            if used[current] {
                return Err(TopologyError::at(
                    "boundary ring re-entered a consumed edge",
                    ring[0],
                ));
            }
            steps += 1;
            if steps > graph.dir_edges.len() {
                return Err(TopologyError::new("boundary ring failed to close"));
            }
        }

        if ring.first() != ring.last() {
            let first = ring[0];
            ring.push(first);
        }
        if ring.len() < 4 {
            debug!("dropping degenerate boundary ring at {:?}", ring[0]);
            continue;
        }

        let doubled_area = twice_signed_ring_area(&ring);
        if doubled_area > F::zero() {
            shells.push((ring, doubled_area));
        } else if doubled_area < F::zero() {
            holes.push(ring);
        }
        // zero-area rings are slivers; drop them
    }

    let mut shell_holes: Vec<Vec<LineString<F>>> = vec![Vec::new(); shells.len()];
    for hole in holes {
        let mut best: Option<(usize, F)> = None;
        for (index, (shell, area)) in shells.iter().enumerate() {
            if !ring_contains_ring_vertex(shell, &hole) {
                continue;
            }
            match best {
                Some((_, best_area)) if *area >= best_area => {}
                _ => best = Some((index, *area)),
            }
        }
        match best {
            Some((index, _)) => shell_holes[index].push(LineString::new(hole)),
            None => {
                return Err(TopologyError::at(
                    "hole is not contained in any shell",
                    hole[0],
                ));
            }
        }
    }

    // shells are pairwise interior-disjoint: a shell nested inside another
    // shell's ring must lie within one of its holes
    #[cfg(debug_assertions)]
    for (i, (outer, _)) in shells.iter().enumerate() {
        for (j, (inner, _)) in shells.iter().enumerate() {
            if i != j && ring_contains_ring_vertex(outer, inner) {
                debug_assert!(
                    shell_holes[i]
                        .iter()
                        .any(|hole| ring_contains_ring_vertex(&hole.0, inner)),
                    "shells must be pairwise interior-disjoint"
                );
            }
        }
    }

    let polygons: Vec<Polygon<F>> = shells
        .into_iter()
        .zip(shell_holes)
        .map(|((shell, _), holes)| Polygon::new(LineString::new(shell), holes))
        .collect();
    Ok(MultiPolygon::new(polygons))
}

/// Whether `shell` strictly contains at least one vertex of `hole`.
/// Vertices lying on the shell boundary are inconclusive and skipped.
fn ring_contains_ring_vertex<F: GeoFloat>(shell: &[Coord<F>], hole: &[Coord<F>]) -> bool {
    for &vertex in hole {
        match locate_in_ring(vertex, shell) {
            Location::Interior => return true,
            Location::Exterior => return false,
            Location::Boundary => continue,
        }
    }
    false
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::PlanarGraph;
    use crate::noding::Noder;
    use crate::precision::PrecisionModel;

    fn polygons_of(curves: Vec<Vec<Coord<f64>>>) -> MultiPolygon<f64> {
        let noder = Noder::new(&PrecisionModel::Floating);
        let noded = noder.node(curves).unwrap();
        let mut graph = PlanarGraph::build(noded).unwrap();
        graph.resolve_depths().unwrap();
        build_polygons(&graph).unwrap()
    }

    fn square(origin: (f64, f64), size: f64) -> Vec<Coord<f64>> {
        let (x, y) = origin;
        vec![
            Coord { x, y },
            Coord { x: x + size, y },
            Coord { x: x + size, y: y + size },
            Coord { x, y: y + size },
            Coord { x, y },
        ]
    }

    #[test]
    fn single_ring_gives_one_shell() {
        let result = polygons_of(vec![square((0., 0.), 10.)]);
        assert_eq!(result.0.len(), 1);
        assert_eq!(result.0[0].interiors().len(), 0);
        assert_eq!(
            twice_signed_ring_area(&result.0[0].exterior().0),
            200.0
        );
    }

    #[test]
    fn shell_with_hole() {
        // outer CCW ring plus inner CW ring: an annulus
        let mut inner = square((3., 3.), 4.);
        inner.reverse();
        let result = polygons_of(vec![square((0., 0.), 10.), inner]);
        assert_eq!(result.0.len(), 1);
        assert_eq!(result.0[0].interiors().len(), 1);
        // the hole is traced clockwise
        assert!(twice_signed_ring_area(&result.0[0].interiors()[0].0) < 0.0);
    }

    #[test]
    fn disjoint_rings_give_two_shells() {
        let result = polygons_of(vec![square((0., 0.), 2.), square((10., 10.), 2.)]);
        assert_eq!(result.0.len(), 2);
        assert!(result.0.iter().all(|p| p.interiors().is_empty()));
    }

    #[test]
    fn overlapping_rings_union() {
        let result = polygons_of(vec![square((0., 0.), 4.), square((2., 2.), 4.)]);
        assert_eq!(result.0.len(), 1);
        // union of two 4×4 squares overlapping in a 2×2 block
        assert_eq!(
            twice_signed_ring_area(&result.0[0].exterior().0),
            2.0 * (16.0 + 16.0 - 4.0)
        );
    }

    #[test]
    fn hole_nests_into_smallest_shell() {
        // a small island inside the hole of a larger annulus
        let mut hole = square((2., 2.), 6.);
        hole.reverse();
        let island = square((4., 4.), 2.);
        let mut island_hole = square((4.5, 4.5), 1.);
        island_hole.reverse();

        let result = polygons_of(vec![
            square((0., 0.), 10.),
            hole,
            island,
            island_hole,
        ]);
        assert_eq!(result.0.len(), 2);
        // both the outer annulus and the island carry exactly one hole
        assert!(result.0.iter().all(|p| p.interiors().len() == 1));
    }
}
