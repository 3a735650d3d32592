// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Planar Delaunay triangulation with triangle adjacency and point location.
//!
//! Construction is delegated to `spade`, which uses exact geometric
//! predicates. The result is flattened into index arrays: vertex indices
//! follow the input order, triangles are counter-clockwise and
//! `neighbors[t][k]` is the triangle across the edge opposite vertex `k`.

use spade::{DelaunayTriangulation, HasPosition, Point2, Triangulation as _};

/// Barycentric tolerance for points on a triangle edge.
const BARYCENTRIC_EPS: f64 = 1e-10;

pub type Vec2 = [f64; 2];

/// Input point tagged with its position in the caller's slice.
#[derive(Debug, Clone, Copy)]
struct Site {
    position: Vec2,
    index: usize,
}

impl HasPosition for Site {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        Point2::new(self.position[0], self.position[1])
    }
}

/// Affine map from a point to the first two barycentric coordinates of a
/// triangle.
#[derive(Debug, Clone, Copy)]
struct BarycentricTransform {
    inv: [[f64; 2]; 2],
    origin: Vec2,
}

impl BarycentricTransform {
    fn of(a: Vec2, b: Vec2, c: Vec2) -> Self {
        let t = [[a[0] - c[0], b[0] - c[0]], [a[1] - c[1], b[1] - c[1]]];
        let det = t[0][0] * t[1][1] - t[0][1] * t[1][0];
        Self {
            inv: [
                [t[1][1] / det, -t[0][1] / det],
                [-t[1][0] / det, t[0][0] / det],
            ],
            origin: c,
        }
    }

    fn apply(&self, p: Vec2) -> [f64; 3] {
        let dx = p[0] - self.origin[0];
        let dy = p[1] - self.origin[1];
        let l0 = self.inv[0][0] * dx + self.inv[0][1] * dy;
        let l1 = self.inv[1][0] * dx + self.inv[1][1] * dy;
        [l0, l1, 1.0 - l0 - l1]
    }
}

/// Outcome of a visibility walk.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Walk {
    Found(usize, [f64; 3]),
    /// Left the triangulation through a hull edge.
    Outside,
    /// Hit the step limit without settling.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct Triangulation {
    pub points: Vec<Vec2>,
    /// Counter-clockwise vertex indices.
    pub simplices: Vec<[usize; 3]>,
    /// `neighbors[t][k]` is the triangle across the edge opposite vertex `k`.
    pub neighbors: Vec<[Option<usize>; 3]>,
    transforms: Vec<BarycentricTransform>,
}

impl Triangulation {
    /// Triangulate distinct points. Returns `None` when no triangle can be
    /// formed (fewer than 3 points, all collinear, or coordinates the
    /// predicates cannot represent).
    pub fn new(points: Vec<Vec2>) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }

        let sites = points
            .iter()
            .enumerate()
            .map(|(index, &position)| Site { position, index })
            .collect();
        let dt: DelaunayTriangulation<Site> = match DelaunayTriangulation::bulk_load(sites) {
            Ok(dt) => dt,
            Err(e) => {
                log::warn!("[WARN] Delaunay construction rejected the samples: {e:?}");
                return None;
            }
        };
        if dt.num_inner_faces() == 0 {
            return None;
        }

        // spade face index -> our triangle index
        let mut slot: Vec<Option<usize>> = vec![None; dt.num_all_faces()];
        let mut simplices = Vec::with_capacity(dt.num_inner_faces());
        for (t, face) in dt.inner_faces().enumerate() {
            slot[face.fix().index()] = Some(t);
            simplices.push(face.vertices().map(|v| v.data().index));
        }

        let mut neighbors = vec![[None; 3]; simplices.len()];
        for face in dt.inner_faces() {
            let Some(t) = slot[face.fix().index()] else {
                continue;
            };
            for edge in face.adjacent_edges() {
                let ends = [edge.from().data().index, edge.to().data().index];
                let Some(k) = simplices[t].iter().position(|v| !ends.contains(v)) else {
                    continue;
                };
                neighbors[t][k] = edge
                    .rev()
                    .face()
                    .as_inner()
                    .and_then(|other| slot[other.fix().index()]);
            }
        }

        let transforms = simplices
            .iter()
            .map(|s| BarycentricTransform::of(points[s[0]], points[s[1]], points[s[2]]))
            .collect();

        Some(Self {
            points,
            simplices,
            neighbors,
            transforms,
        })
    }

    /// Sorted, deduplicated vertex adjacency lists.
    pub fn vertex_neighbors(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.points.len()];
        for tri in &self.simplices {
            for k in 0..3 {
                let a = tri[k];
                let b = tri[(k + 1) % 3];
                adjacency[a].push(b);
                adjacency[b].push(a);
            }
        }
        for list in &mut adjacency {
            list.sort_unstable();
            list.dedup();
        }
        adjacency
    }

    pub fn barycentric(&self, simplex: usize, p: Vec2) -> [f64; 3] {
        self.transforms[simplex].apply(p)
    }

    fn contains(bary: &[f64; 3]) -> bool {
        bary.iter().all(|&l| l >= -BARYCENTRIC_EPS)
    }

    /// Step towards `p` across the edge with the most negative barycentric
    /// coordinate. The triangulation covers the convex hull, so crossing a
    /// hull edge means `p` is outside.
    fn walk(&self, p: Vec2, hint: usize) -> Walk {
        let mut current = hint.min(self.simplices.len() - 1);
        for _ in 0..self.simplices.len() {
            let bary = self.barycentric(current, p);
            if Self::contains(&bary) {
                return Walk::Found(current, bary);
            }
            let mut worst = 0;
            for k in 1..3 {
                if bary[k] < bary[worst] {
                    worst = k;
                }
            }
            match self.neighbors[current][worst] {
                Some(next) => current = next,
                None => return Walk::Outside,
            }
        }
        Walk::Exhausted
    }

    /// Find the triangle holding `p`, walking from `hint` first.
    ///
    /// Returns the triangle index and the barycentric coordinates of `p`, or
    /// `None` outside the triangulated region.
    pub fn locate(&self, p: Vec2, hint: usize) -> Option<(usize, [f64; 3])> {
        match self.walk(p, hint) {
            Walk::Found(t, bary) => Some((t, bary)),
            Walk::Outside => None,
            Walk::Exhausted => (0..self.simplices.len()).find_map(|t| {
                let bary = self.barycentric(t, p);
                Self::contains(&bary).then_some((t, bary))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orient(a: Vec2, b: Vec2, c: Vec2) -> f64 {
        (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
    }

    fn total_area(tri: &Triangulation) -> f64 {
        tri.simplices
            .iter()
            .map(|t| orient(tri.points[t[0]], tri.points[t[1]], tri.points[t[2]]) / 2.0)
            .sum()
    }

    /// Regular lattice with a small deterministic jitter.
    fn lattice(n: usize) -> Vec<Vec2> {
        let mut points = Vec::with_capacity(n * n);
        for j in 0..n {
            for i in 0..n {
                let jitter = ((i * 7 + j * 13) % 11) as f64 * 1e-3;
                points.push([i as f64 + jitter, j as f64 - jitter]);
            }
        }
        points
    }

    #[test]
    fn test_single_triangle() {
        let tri = Triangulation::new(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]).unwrap();
        assert_eq!(tri.simplices.len(), 1);
        assert_eq!(tri.neighbors[0], [None, None, None]);
        assert!((total_area(&tri) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_vertex_indices_follow_input_order() {
        let points = vec![[5.0, 5.0], [0.0, 0.0], [10.0, 0.0], [0.0, 10.0]];
        let tri = Triangulation::new(points.clone()).unwrap();
        assert_eq!(tri.points, points);
        for s in &tri.simplices {
            assert!(s.contains(&0));
        }
    }

    #[test]
    fn test_square_with_center_covers_hull() {
        let tri = Triangulation::new(vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
            [0.5, 0.5],
        ])
        .unwrap();
        assert_eq!(tri.simplices.len(), 4);
        assert!((total_area(&tri) - 1.0).abs() < 1e-12);
        for t in &tri.simplices {
            assert!(orient(tri.points[t[0]], tri.points[t[1]], tri.points[t[2]]) > 0.0);
        }
    }

    #[test]
    fn test_neighbors_share_the_opposite_edge() {
        let tri = Triangulation::new(lattice(6)).unwrap();
        for (t, nbrs) in tri.neighbors.iter().enumerate() {
            for (k, other) in nbrs.iter().enumerate() {
                let Some(other) = *other else { continue };
                assert!(tri.neighbors[other].contains(&Some(t)));
                let s = tri.simplices[t];
                let edge = [s[(k + 1) % 3], s[(k + 2) % 3]];
                assert!(edge.iter().all(|v| tri.simplices[other].contains(v)));
                assert!(!tri.simplices[other].contains(&s[k]));
            }
        }
    }

    #[test]
    fn test_locate_inside_and_outside() {
        let tri = Triangulation::new(vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
            [0.5, 0.5],
        ])
        .unwrap();
        let (t, bary) = tri.locate([0.9, 0.2], 0).unwrap();
        assert!(bary.iter().all(|&l| l >= -1e-10));
        assert!(t < tri.simplices.len());
        assert!(tri.locate([1.0, 1.0], 0).is_some());
        assert!(tri.locate([1.5, 0.5], 0).is_none());
        assert!(tri.locate([-0.01, -0.01], 3).is_none());
    }

    #[test]
    fn test_outside_points_stop_at_the_hull() {
        let n = 40;
        let tri = Triangulation::new(lattice(n)).unwrap();
        let far = (n + 5) as f64;
        for hint in [0, tri.simplices.len() / 2, tri.simplices.len() - 1] {
            for p in [[-5.0, -5.0], [far, 3.0], [3.0, far], [far, far], [-5.0, 20.0]] {
                assert_eq!(tri.walk(p, hint), Walk::Outside, "{p:?} from {hint}");
            }
        }
        let inside = [n as f64 / 2.0 + 0.25, n as f64 / 3.0 + 0.25];
        assert!(matches!(tri.walk(inside, 0), Walk::Found(..)));
    }

    #[test]
    fn test_collinear_points_are_rejected() {
        assert!(Triangulation::new(vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]).is_none());
        assert!(Triangulation::new(vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]).is_none());
        assert!(Triangulation::new(vec![[0.0, 0.0], [1.0, 0.0]]).is_none());
    }
}
