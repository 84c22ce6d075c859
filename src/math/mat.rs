//! 3x3 rotation matrices
//!
//! Row-major: `m[row][col]`, vectors are columns (`M * v`).
//! Rotations are built from the trig tables rather than `sin_cos()`.

use serde::{Serialize, Deserialize};

use super::tables::MathTables;
use super::vec::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat33 {
    pub m: [[f32; 3]; 3],
}

impl Mat33 {
    pub const IDENTITY: Mat33 = Mat33 {
        m: [
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ],
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Rotation about the X axis (pitch)
    pub fn rotation_x(tables: &MathTables, angle: f32) -> Self {
        let (s, c) = tables.sin_cos(angle);
        Mat33 {
            m: [
                [1.0, 0.0, 0.0],
                [0.0, c, -s],
                [0.0, s, c],
            ],
        }
    }

    /// Rotation about the Y axis (yaw)
    pub fn rotation_y(tables: &MathTables, angle: f32) -> Self {
        let (s, c) = tables.sin_cos(angle);
        Mat33 {
            m: [
                [c, 0.0, s],
                [0.0, 1.0, 0.0],
                [-s, 0.0, c],
            ],
        }
    }

    /// Rotation about the Z axis (roll)
    pub fn rotation_z(tables: &MathTables, angle: f32) -> Self {
        let (s, c) = tables.sin_cos(angle);
        Mat33 {
            m: [
                [c, -s, 0.0],
                [s, c, 0.0],
                [0.0, 0.0, 1.0],
            ],
        }
    }

    /// Build an orientation from pitch (X), yaw (Y) and roll (Z), in radians.
    /// Composition order: `Ry * Rx * Rz`.
    pub fn from_angles(tables: &MathTables, pitch: f32, yaw: f32, roll: f32) -> Self {
        let rx = Self::rotation_x(tables, pitch);
        let ry = Self::rotation_y(tables, yaw);
        let rz = Self::rotation_z(tables, roll);
        ry.mul(&rx).mul(&rz)
    }

    /// `M * v`
    #[inline]
    pub fn mul_vec(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    /// `M^T * v`. For an orthonormal rotation this is the inverse transform.
    #[inline]
    pub fn transpose_mul_vec(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z,
            m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z,
            m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z,
        )
    }

    /// `self * other`
    pub fn mul(&self, other: &Mat33) -> Mat33 {
        let mut result = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    result[i][j] += self.m[i][k] * other.m[k][j];
                }
            }
        }
        Mat33 { m: result }
    }

    /// `self^T * other`
    pub fn transpose_mul(&self, other: &Mat33) -> Mat33 {
        let mut result = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    result[i][j] += self.m[k][i] * other.m[k][j];
                }
            }
        }
        Mat33 { m: result }
    }

    pub fn transpose(&self) -> Mat33 {
        let m = &self.m;
        Mat33 {
            m: [
                [m[0][0], m[1][0], m[2][0]],
                [m[0][1], m[1][1], m[2][1]],
                [m[0][2], m[1][2], m[2][2]],
            ],
        }
    }
}

impl Default for Mat33 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).len() < 1e-3
    }

    #[test]
    fn test_yaw_quarter_turn() {
        let t = MathTables::new();
        let m = Mat33::rotation_y(&t, FRAC_PI_2);
        // +Z swings round to +X
        assert!(approx(m.mul_vec(Vec3::Z), Vec3::X));
    }

    #[test]
    fn test_transpose_mul_inverts_rotation() {
        let t = MathTables::new();
        let m = Mat33::from_angles(&t, 0.3, 1.1, -0.4);
        let v = Vec3::new(1.0, -2.0, 0.5);
        assert!(approx(m.transpose_mul_vec(m.mul_vec(v)), v));
    }

    #[test]
    fn test_transpose_mul_matches_explicit_transpose() {
        let t = MathTables::new();
        let a = Mat33::from_angles(&t, 0.2, 0.7, 0.0);
        let b = Mat33::from_angles(&t, -0.5, 0.1, 0.9);
        let expected = a.transpose().mul(&b);
        let got = a.transpose_mul(&b);
        for i in 0..3 {
            for j in 0..3 {
                assert!((expected.m[i][j] - got.m[i][j]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_rotation_is_orthonormal() {
        let t = MathTables::new();
        let m = Mat33::from_angles(&t, 0.9, -2.0, 0.3);
        let p = m.transpose_mul(&m);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((p.m[i][j] - expected).abs() < 1e-3);
            }
        }
    }
}
