//! Point batches and procedural solids
//!
//! A `PointBatch` is the scratch edge/polygon matrix: homogeneous points
//! appended in groups of two (segments) or three (triangles). Solids are
//! tessellated into outward-wound triangles so backface culling can use the
//! face normal directly.

use std::f64::consts::{PI, TAU};

use crate::math3d::{Transform, Vec3};

/// Steps per revolution when tessellating spheres
pub const SPHERE_STEPS: usize = 20;
/// Steps per revolution on both angles when tessellating tori
pub const TORUS_STEPS: usize = 20;

/// Direction the viewer looks back along; +z is toward the viewer
pub const VIEW_DIRECTION: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Homogeneous point (x, y, z, w)
pub type Point = [f64; 4];

#[inline]
pub fn point(x: f64, y: f64, z: f64) -> Point {
    [x, y, z, 1.0]
}

#[inline]
fn to_vec(p: Point) -> Vec3 {
    Vec3::new(p[0], p[1], p[2])
}

#[inline]
fn from_vec(v: Vec3) -> Point {
    point(v.x, v.y, v.z)
}

/// Append-only scratch buffer of homogeneous points
#[derive(Debug, Clone, Default)]
pub struct PointBatch {
    points: Vec<Point>,
}

impl PointBatch {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.points.capacity()
    }

    #[inline]
    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Reset the point count, keeping the allocation for the next shape
    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn add_point(&mut self, p: Point) {
        self.points.push(p);
    }

    pub fn add_edge(&mut self, p0: Point, p1: Point) {
        self.points.push(p0);
        self.points.push(p1);
    }

    pub fn add_triangle(&mut self, a: Point, b: Point, c: Point) {
        self.points.push(a);
        self.points.push(b);
        self.points.push(c);
    }

    /// Append every point of `other`, composing several shapes into one batch
    pub fn append(&mut self, other: &PointBatch) {
        self.points.extend_from_slice(&other.points);
    }

    /// Apply `matrix` to every point in place
    pub fn transform(&mut self, matrix: &Transform) {
        for p in &mut self.points {
            *p = matrix.apply(*p);
        }
    }

    /// Complete triangles only; trailing points are ignored
    pub fn triangles(&self) -> impl Iterator<Item = [Point; 3]> + '_ {
        self.points.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Complete segments only; a trailing point is ignored
    pub fn segments(&self) -> impl Iterator<Item = [Point; 2]> + '_ {
        self.points.chunks_exact(2).map(|c| [c[0], c[1]])
    }

    /// Unnormalized face normal of the triangle starting at `start`
    pub fn triangle_normal(&self, start: usize) -> Vec3 {
        let a = to_vec(self.points[start]);
        let b = to_vec(self.points[start + 1]);
        let c = to_vec(self.points[start + 2]);
        (b - a).cross(&(c - a))
    }

    /// Backface test against the fixed view direction
    pub fn faces_viewer(&self, start: usize) -> bool {
        self.triangle_normal(start).dot(&VIEW_DIRECTION) > 0.0
    }

    // ========================================================================
    // Shape generators
    // ========================================================================

    pub fn add_line(&mut self, p0: Vec3, p1: Vec3) {
        self.add_edge(from_vec(p0), from_vec(p1));
    }

    /// Axis-aligned box spanned by two opposite corners (12 triangles)
    pub fn add_box(&mut self, corner1: Vec3, corner2: Vec3) {
        let (x0, x1) = (corner1.x.min(corner2.x), corner1.x.max(corner2.x));
        let (y0, y1) = (corner1.y.min(corner2.y), corner1.y.max(corner2.y));
        let (z0, z1) = (corner1.z.min(corner2.z), corner1.z.max(corner2.z));

        // Each quad is listed counterclockwise as seen from outside
        let quads = [
            // Front (+z)
            [(x0, y0, z1), (x1, y0, z1), (x1, y1, z1), (x0, y1, z1)],
            // Back (-z)
            [(x0, y0, z0), (x0, y1, z0), (x1, y1, z0), (x1, y0, z0)],
            // Right (+x)
            [(x1, y0, z1), (x1, y0, z0), (x1, y1, z0), (x1, y1, z1)],
            // Left (-x)
            [(x0, y0, z0), (x0, y0, z1), (x0, y1, z1), (x0, y1, z0)],
            // Top (+y)
            [(x0, y1, z1), (x1, y1, z1), (x1, y1, z0), (x0, y1, z0)],
            // Bottom (-y)
            [(x0, y0, z0), (x1, y0, z0), (x1, y0, z1), (x0, y0, z1)],
        ];

        for quad in quads {
            let [a, b, c, d] = quad.map(|(x, y, z)| point(x, y, z));
            self.add_triangle(a, b, c);
            self.add_triangle(a, c, d);
        }
    }

    /// Latitude/longitude sphere with `SPHERE_STEPS` steps per revolution
    pub fn add_sphere(&mut self, center: Vec3, radius: f64) {
        let steps = SPHERE_STEPS;
        let surface = |lon: usize, lat: usize| -> Vec3 {
            let phi = TAU * (lon % steps) as f64 / steps as f64;
            let theta = PI * lat as f64 / steps as f64;
            center
                + Vec3::new(
                    radius * theta.cos(),
                    radius * theta.sin() * phi.cos(),
                    radius * theta.sin() * phi.sin(),
                )
        };

        for lon in 0..steps {
            for lat in 0..steps {
                let a = surface(lon, lat);
                let b = surface(lon, lat + 1);
                let c = surface(lon + 1, lat + 1);
                let d = surface(lon + 1, lat);
                // The first and last bands collapse to a pole on one side
                if lat + 1 != steps {
                    self.add_outward_triangle(a, b, c, |_| center);
                }
                if lat != 0 {
                    self.add_outward_triangle(a, c, d, |_| center);
                }
            }
        }
    }

    /// Torus lying in the xz-plane: tube radius `inner_radius`, ring radius
    /// `outer_radius`, `TORUS_STEPS` steps on both angles
    pub fn add_torus(&mut self, center: Vec3, inner_radius: f64, outer_radius: f64) {
        let steps = TORUS_STEPS;
        let surface = |ring: usize, tube: usize| -> Vec3 {
            let phi = TAU * (ring % steps) as f64 / steps as f64;
            let theta = TAU * (tube % steps) as f64 / steps as f64;
            let reach = inner_radius * theta.cos() + outer_radius;
            center + Vec3::new(phi.cos() * reach, inner_radius * theta.sin(), -phi.sin() * reach)
        };
        // Nearest point on the core circle of the tube
        let core = |centroid: Vec3| -> Vec3 {
            let radial = Vec3::new(centroid.x - center.x, 0.0, centroid.z - center.z);
            center + radial.normalize() * outer_radius
        };

        for ring in 0..steps {
            for tube in 0..steps {
                let a = surface(ring, tube);
                let b = surface(ring, tube + 1);
                let c = surface(ring + 1, tube + 1);
                let d = surface(ring + 1, tube);
                self.add_outward_triangle(a, b, c, core);
                self.add_outward_triangle(a, c, d, core);
            }
        }
    }

    /// Push a triangle wound so its normal points away from `interior`.
    /// Zero-area triangles are dropped.
    fn add_outward_triangle(
        &mut self,
        a: Vec3,
        b: Vec3,
        c: Vec3,
        interior: impl Fn(Vec3) -> Vec3,
    ) {
        let normal = (b - a).cross(&(c - a));
        if normal.length() <= f64::EPSILON {
            return;
        }
        let centroid = (a + b + c) * (1.0 / 3.0);
        if normal.dot(&(centroid - interior(centroid))) >= 0.0 {
            self.add_triangle(from_vec(a), from_vec(b), from_vec(c));
        } else {
            self.add_triangle(from_vec(a), from_vec(c), from_vec(b));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centroid(batch: &PointBatch, start: usize) -> Vec3 {
        let sum = (0..3).fold(Vec3::zero(), |acc, i| acc + to_vec(batch.point(start + i)));
        sum * (1.0 / 3.0)
    }

    #[test]
    fn test_clear_resets_count_and_keeps_capacity() {
        let mut batch = PointBatch::new();
        batch.add_box(Vec3::zero(), Vec3::new(1.0, 1.0, 1.0));
        let capacity = batch.capacity();
        batch.clear();
        assert_eq!(batch.len(), 0);
        assert!(batch.capacity() >= capacity);

        batch.add_line(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(batch.point(0), point(1.0, 2.0, 3.0));
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_box_triangles_face_outward() {
        let mut batch = PointBatch::new();
        batch.add_box(Vec3::new(10.0, 10.0, 10.0), Vec3::zero());
        assert_eq!(batch.len(), 36);

        let center = Vec3::new(5.0, 5.0, 5.0);
        for start in (0..batch.len()).step_by(3) {
            let outward = centroid(&batch, start) - center;
            assert!(batch.triangle_normal(start).dot(&outward) > 0.0, "triangle {}", start / 3);
        }
    }

    #[test]
    fn test_box_front_faces_viewer() {
        let mut batch = PointBatch::new();
        batch.add_box(Vec3::zero(), Vec3::new(10.0, 10.0, 10.0));
        let visible = (0..batch.len()).step_by(3).filter(|&i| batch.faces_viewer(i)).count();
        // Only the two +z triangles point at the viewer
        assert_eq!(visible, 2);
    }

    #[test]
    fn test_sphere_points_on_surface_and_outward() {
        let mut batch = PointBatch::new();
        let center = Vec3::new(100.0, 50.0, -20.0);
        batch.add_sphere(center, 40.0);
        assert_eq!(batch.len() % 3, 0);
        assert!(batch.len() > 0);

        for p in batch.points() {
            assert!(((to_vec(*p) - center).length() - 40.0).abs() < 1e-9);
        }
        for start in (0..batch.len()).step_by(3) {
            let outward = centroid(&batch, start) - center;
            assert!(batch.triangle_normal(start).dot(&outward) > 0.0);
        }
    }

    #[test]
    fn test_torus_triangle_count_and_winding() {
        let mut batch = PointBatch::new();
        let center = Vec3::new(0.0, 0.0, 0.0);
        batch.add_torus(center, 10.0, 50.0);
        assert_eq!(batch.len(), TORUS_STEPS * TORUS_STEPS * 2 * 3);

        for start in (0..batch.len()).step_by(3) {
            let c = centroid(&batch, start);
            let radial = Vec3::new(c.x, 0.0, c.z).normalize() * 50.0;
            assert!(batch.triangle_normal(start).dot(&(c - radial)) > 0.0);
        }
    }

    #[test]
    fn test_groups_ignore_remainder() {
        let mut batch = PointBatch::new();
        batch.add_triangle(point(0.0, 0.0, 0.0), point(1.0, 0.0, 0.0), point(0.0, 1.0, 0.0));
        batch.add_point(point(5.0, 5.0, 5.0));
        assert_eq!(batch.triangles().count(), 1);
        assert_eq!(batch.segments().count(), 2);
    }

    #[test]
    fn test_transform_and_append() {
        let mut a = PointBatch::new();
        a.add_line(Vec3::zero(), Vec3::new(1.0, 1.0, 1.0));
        let mut b = PointBatch::new();
        b.add_line(Vec3::new(2.0, 2.0, 2.0), Vec3::new(3.0, 3.0, 3.0));
        a.append(&b);
        assert_eq!(a.len(), 4);

        a.transform(&Transform::translate(10.0, 0.0, -1.0));
        assert_eq!(a.point(0), point(10.0, 0.0, -1.0));
        assert_eq!(a.point(3), point(13.0, 3.0, 2.0));
    }
}
