//! Camera for 3D rendering
//!
//! Camera space is X right, Y up, Z forward. The orientation matrix maps
//! camera axes to world axes; its transpose takes world points into camera
//! space.

use serde::{Deserialize, Serialize};

use crate::math::{Mat33, MathTables, Vec3};

/// Camera state for 3D rendering
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub rotation_x: f32, // Pitch
    pub rotation_y: f32, // Yaw
    /// Horizontal field of view in radians
    pub fov: f32,

    // Computed from the angles
    #[serde(skip)]
    pub orientation: Mat33,
}

impl Camera {
    pub fn new(position: Vec3, fov: f32) -> Self {
        Self {
            position,
            rotation_x: 0.0,
            rotation_y: 0.0,
            fov,
            orientation: Mat33::IDENTITY,
        }
    }

    pub fn update_orientation(&mut self, tables: &MathTables) {
        self.orientation = Mat33::from_angles(tables, self.rotation_x, self.rotation_y, 0.0);
    }

    /// Turn by `dx` pitch and `dy` yaw; pitch stops short of straight up/down
    pub fn rotate(&mut self, tables: &MathTables, dx: f32, dy: f32) {
        self.rotation_y += dy;
        self.rotation_x = (self.rotation_x + dx).clamp(
            -std::f32::consts::FRAC_PI_2 + 0.01,
            std::f32::consts::FRAC_PI_2 - 0.01,
        );
        self.update_orientation(tables);
    }

    /// World point to camera space
    #[inline]
    pub fn to_camera(&self, p: Vec3) -> Vec3 {
        self.orientation.transpose_mul_vec(p - self.position)
    }

    /// World direction to camera space
    #[inline]
    pub fn dir_to_camera(&self, d: Vec3) -> Vec3 {
        self.orientation.transpose_mul_vec(d)
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation.mul_vec(Vec3::Z)
    }

    /// Projection scale for a screen `width` pixels wide
    pub fn focal_length(&self, tables: &MathTables, width: usize) -> f32 {
        let (s, c) = tables.sin_cos(self.fov * 0.5);
        if s <= 0.0 {
            return width as f32 * 0.5;
        }
        (width as f32 * 0.5) * c / s
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, std::f32::consts::FRAC_PI_2)
    }
}
