//! 3D Math Utilities for the Scene Renderer
//!
//! Provides the vector type used for normals and the 4x4 homogeneous
//! transform that drives the origin stack.
//!
//! Points are row vectors: a point `p` is mapped as `p × M`. Composition
//! therefore reads left to right, `a.multiply(&b)` applies `a` first.

use std::ops::{Add, Mul, Sub};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    #[inline]
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
            }
        } else {
            *self
        }
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Approximate equality check for floating point comparison
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

// ============================================================================
// Transform
// ============================================================================

/// 4x4 homogeneous transform (row-vector convention, translation in row 3)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub m: [[f64; 4]; 4],
}

impl Transform {
    pub const fn identity() -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Compose `self × other`. Applied to a point, `self` acts first.
    pub fn multiply(&self, other: &Self) -> Self {
        let mut m = [[0.0; 4]; 4];
        for (row, out) in m.iter_mut().enumerate() {
            for (col, cell) in out.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.m[row][k] * other.m[k][col]).sum();
            }
        }
        Self { m }
    }

    pub fn translate(dx: f64, dy: f64, dz: f64) -> Self {
        let mut t = Self::identity();
        t.m[3][0] = dx;
        t.m[3][1] = dy;
        t.m[3][2] = dz;
        t
    }

    /// Zero factors are allowed and flatten geometry along that axis
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut t = Self::identity();
        t.m[0][0] = sx;
        t.m[1][1] = sy;
        t.m[2][2] = sz;
        t
    }

    /// Counterclockwise rotation around X (y toward z)
    pub fn rotate_x(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        let mut t = Self::identity();
        t.m[1][1] = cos;
        t.m[1][2] = sin;
        t.m[2][1] = -sin;
        t.m[2][2] = cos;
        t
    }

    /// Counterclockwise rotation around Y (z toward x)
    pub fn rotate_y(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        let mut t = Self::identity();
        t.m[0][0] = cos;
        t.m[0][2] = -sin;
        t.m[2][0] = sin;
        t.m[2][2] = cos;
        t
    }

    /// Counterclockwise rotation around Z (x toward y)
    pub fn rotate_z(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        let mut t = Self::identity();
        t.m[0][0] = cos;
        t.m[0][1] = sin;
        t.m[1][0] = -sin;
        t.m[1][1] = cos;
        t
    }

    /// Map a homogeneous point through this transform
    #[inline]
    pub fn apply(&self, p: [f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (col, cell) in out.iter_mut().enumerate() {
            *cell = p[0] * self.m[0][col]
                + p[1] * self.m[1][col]
                + p[2] * self.m[2][col]
                + p[3] * self.m[3][col];
        }
        out
    }

    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.m
            .iter()
            .flatten()
            .zip(other.m.iter().flatten())
            .all(|(a, b)| (a - b).abs() < epsilon)
    }
}
