// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Clough-Tocher interpolation.
//!
//! C1-continuous piecewise cubic interpolation on a Delaunay triangulation.
//! Each triangle is split at its centroid into three cubic Bezier patches.
//! Vertex gradients come from a global estimate that minimizes the curvature
//! of the interpolant along every triangulation edge.

use super::delaunay::{Triangulation, Vec2};

const GRADIENT_TOLERANCE: f64 = 1e-6;
const GRADIENT_MAX_ITERATIONS: usize = 400;

/// A fitted Clough-Tocher interpolant.
#[derive(Debug, Clone)]
pub struct CloughTocher2D {
    triangulation: Triangulation,
    values: Vec<f64>,
    gradients: Vec<Vec2>,
}

impl CloughTocher2D {
    pub fn new(triangulation: Triangulation, values: Vec<f64>) -> Self {
        let gradients = estimate_gradients(&triangulation, &values);
        Self {
            triangulation,
            values,
            gradients,
        }
    }

    pub fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    pub fn gradients(&self) -> &[Vec2] {
        &self.gradients
    }

    /// Value at `p`, `None` outside the convex hull. `hint` is the triangle to
    /// start the point-location walk from and is updated to the triangle found.
    pub fn evaluate(&self, p: Vec2, hint: &mut usize) -> Option<f64> {
        let (simplex, bary) = self.triangulation.locate(p, *hint)?;
        *hint = simplex;
        Some(self.evaluate_in(simplex, bary))
    }

    fn evaluate_in(&self, simplex: usize, b: [f64; 3]) -> f64 {
        let tri = &self.triangulation;
        let [i0, i1, i2] = tri.simplices[simplex];
        let (p0, p1, p2) = (tri.points[i0], tri.points[i1], tri.points[i2]);

        let e12 = [p1[0] - p0[0], p1[1] - p0[1]];
        let e23 = [p2[0] - p1[0], p2[1] - p1[1]];
        let e31 = [p0[0] - p2[0], p0[1] - p2[1]];

        let (f1, f2, f3) = (self.values[i0], self.values[i1], self.values[i2]);
        let (g1, g2, g3) = (self.gradients[i0], self.gradients[i1], self.gradients[i2]);
        let dot = |g: Vec2, e: Vec2| g[0] * e[0] + g[1] * e[1];

        // directional derivatives along the edges, scaled by edge length
        let df12 = dot(g1, e12);
        let df21 = -dot(g2, e12);
        let df23 = dot(g2, e23);
        let df32 = -dot(g3, e23);
        let df31 = dot(g3, e31);
        let df13 = -dot(g1, e31);

        let c3000 = f1;
        let c2100 = (df12 + 3.0 * c3000) / 3.0;
        let c2010 = (df13 + 3.0 * c3000) / 3.0;
        let c0300 = f2;
        let c1200 = (df21 + 3.0 * c0300) / 3.0;
        let c0210 = (df23 + 3.0 * c0300) / 3.0;
        let c0030 = f3;
        let c1020 = (df31 + 3.0 * c0030) / 3.0;
        let c0120 = (df32 + 3.0 * c0030) / 3.0;

        let c2001 = (c2100 + c2010 + c3000) / 3.0;
        let c0201 = (c1200 + c0300 + c0210) / 3.0;
        let c0021 = (c1020 + c0120 + c0030) / 3.0;

        // Cross-boundary derivative condition. The direction is taken towards
        // the centroid of the neighbouring triangle, which keeps the patch
        // invariant under affine maps; hull edges use the edge's own median.
        let mut g = [-0.5; 3];
        for (k, slot) in g.iter_mut().enumerate() {
            let Some(other) = tri.neighbors[simplex][k] else {
                continue;
            };
            let [j0, j1, j2] = tri.simplices[other];
            let centroid = [
                (tri.points[j0][0] + tri.points[j1][0] + tri.points[j2][0]) / 3.0,
                (tri.points[j0][1] + tri.points[j1][1] + tri.points[j2][1]) / 3.0,
            ];
            let c = tri.barycentric(simplex, centroid);
            *slot = match k {
                0 => (2.0 * c[2] + c[1] - 1.0) / (2.0 - 3.0 * c[2] - 3.0 * c[1]),
                1 => (2.0 * c[0] + c[2] - 1.0) / (2.0 - 3.0 * c[0] - 3.0 * c[2]),
                _ => (2.0 * c[1] + c[0] - 1.0) / (2.0 - 3.0 * c[1] - 3.0 * c[0]),
            };
        }

        let c0111 = (g[0] * (-c0300 + 3.0 * c0210 - 3.0 * c0120 + c0030)
            + (-c0300 + 2.0 * c0210 - c0120 + c0021 + c0201))
            / 2.0;
        let c1011 = (g[1] * (-c0030 + 3.0 * c1020 - 3.0 * c2010 + c3000)
            + (-c0030 + 2.0 * c1020 - c2010 + c2001 + c0021))
            / 2.0;
        let c1101 = (g[2] * (-c3000 + 3.0 * c2100 - 3.0 * c1200 + c0300)
            + (-c3000 + 2.0 * c2100 - c1200 + c2001 + c0201))
            / 2.0;

        let c1002 = (c1101 + c1011 + c2001) / 3.0;
        let c0102 = (c1101 + c0111 + c0201) / 3.0;
        let c0012 = (c1011 + c0111 + c0021) / 3.0;

        let c0003 = (c1002 + c0102 + c0012) / 3.0;

        // Coordinates in the micro-triangle: one of b1, b2, b3 is zero.
        let minval = b[0].min(b[1]).min(b[2]);
        let b1 = b[0] - minval;
        let b2 = b[1] - minval;
        let b3 = b[2] - minval;
        let b4 = 3.0 * minval;

        b1.powi(3) * c3000
            + 3.0 * b1.powi(2) * b2 * c2100
            + 3.0 * b1.powi(2) * b3 * c2010
            + 3.0 * b1.powi(2) * b4 * c2001
            + 3.0 * b1 * b2.powi(2) * c1200
            + 6.0 * b1 * b2 * b4 * c1101
            + 3.0 * b1 * b3.powi(2) * c1020
            + 6.0 * b1 * b3 * b4 * c1011
            + 3.0 * b1 * b4.powi(2) * c1002
            + b2.powi(3) * c0300
            + 3.0 * b2.powi(2) * b3 * c0210
            + 3.0 * b2.powi(2) * b4 * c0201
            + 3.0 * b2 * b3.powi(2) * c0120
            + 6.0 * b2 * b3 * b4 * c0111
            + 3.0 * b2 * b4.powi(2) * c0102
            + b3.powi(3) * c0030
            + 3.0 * b3.powi(2) * b4 * c0021
            + 3.0 * b3 * b4.powi(2) * c0012
            + b4.powi(3) * c0003
    }
}

/// Estimate vertex gradients by minimizing the second derivative of the cubic
/// edge curves, one vertex at a time (Gauss-Seidel sweeps).
pub fn estimate_gradients(triangulation: &Triangulation, values: &[f64]) -> Vec<Vec2> {
    let points = &triangulation.points;
    let adjacency = triangulation.vertex_neighbors();
    let mut gradients = vec![[0.0, 0.0]; points.len()];

    for iteration in 0..GRADIENT_MAX_ITERATIONS {
        let mut err: f64 = 0.0;

        for (i, neighbors) in adjacency.iter().enumerate() {
            let mut q = [0.0; 3]; // symmetric 2x2: xx, xy, yy
            let mut s = [0.0; 2];

            for &j in neighbors {
                let ex = points[j][0] - points[i][0];
                let ey = points[j][1] - points[i][1];
                let l = (ex * ex + ey * ey).sqrt();
                let l3 = l * l * l;
                let df_j = gradients[j][0] * ex + gradients[j][1] * ey;
                let rhs = 6.0 * (values[j] - values[i]) - 2.0 * df_j;

                q[0] += 4.0 * ex * ex / l3;
                q[1] += 4.0 * ex * ey / l3;
                q[2] += 4.0 * ey * ey / l3;
                s[0] += rhs * ex / l3;
                s[1] += rhs * ey / l3;
            }

            let det = q[0] * q[2] - q[1] * q[1];
            if det == 0.0 {
                continue;
            }
            let gx = (q[2] * s[0] - q[1] * s[1]) / det;
            let gy = (-q[1] * s[0] + q[0] * s[1]) / det;

            let change = (gradients[i][0] - gx).abs().max((gradients[i][1] - gy).abs());
            err = err.max(change / gx.abs().max(gy.abs()).max(1.0));
            gradients[i] = [gx, gy];
        }

        if err < GRADIENT_TOLERANCE {
            log::debug!("[DBG] Gradient estimate converged after {} sweeps", iteration + 1);
            return gradients;
        }
    }

    log::warn!("[WARN] Gradient estimate did not converge in {GRADIENT_MAX_ITERATIONS} sweeps");
    gradients
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(p: Vec2) -> f64 {
        1.0 + 0.5 * p[0] - 2.0 * p[1]
    }

    fn fitted(points: Vec<Vec2>, f: fn(Vec2) -> f64) -> CloughTocher2D {
        let values = points.iter().map(|&p| f(p)).collect();
        CloughTocher2D::new(Triangulation::new(points).unwrap(), values)
    }

    #[test]
    fn test_reproduces_vertex_values() {
        let ct = fitted(
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.4, 0.6]],
            |p| (p[0] * 3.0).sin() + p[1] * p[1],
        );
        let mut hint = 0;
        for (i, &p) in ct.triangulation().points.iter().enumerate() {
            let value = ct.evaluate(p, &mut hint).unwrap();
            assert!((value - ct.values[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reproduces_linear_field() {
        let ct = fitted(
            vec![
                [0.0, 0.0],
                [1.0, 0.0],
                [1.0, 1.0],
                [0.0, 1.0],
                [0.3, 0.4],
                [0.8, 0.7],
            ],
            plane,
        );
        for g in ct.gradients() {
            assert!((g[0] - 0.5).abs() < 1e-4 && (g[1] + 2.0).abs() < 1e-4);
        }
        let mut hint = 0;
        for &p in &[[0.1, 0.1], [0.5, 0.5], [0.95, 0.2], [0.25, 0.9]] {
            let value = ct.evaluate(p, &mut hint).unwrap();
            assert!((value - plane(p)).abs() < 1e-4, "{value} vs {}", plane(p));
        }
    }

    #[test]
    fn test_outside_hull_is_none() {
        let ct = fitted(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]], plane);
        let mut hint = 0;
        assert!(ct.evaluate([0.8, 0.8], &mut hint).is_none());
        assert!(ct.evaluate([-0.1, 0.5], &mut hint).is_none());
        assert!(ct.evaluate([0.2, 0.2], &mut hint).is_some());
    }
}
