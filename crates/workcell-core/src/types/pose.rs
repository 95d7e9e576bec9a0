//! Pose type definition

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Pose (position and orientation)
///
/// Composes as translate-then-rotate; the rotation is an XYZ intrinsic Euler
/// triple, the same convention the robot description uses for joint origins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub xyz: [f32; 3],
    pub rpy: [f32; 3], // roll, pitch, yaw in radians
}

impl Pose {
    pub const IDENTITY: Self = Self {
        xyz: [0.0; 3],
        rpy: [0.0; 3],
    };

    pub const fn new(xyz: [f32; 3], rpy: [f32; 3]) -> Self {
        Self { xyz, rpy }
    }

    pub const fn from_position(xyz: [f32; 3]) -> Self {
        Self { xyz, rpy: [0.0; 3] }
    }

    /// Position plus a rotation about the vertical axis
    pub fn from_yaw(position: Vec3, yaw: f32) -> Self {
        Self {
            xyz: position.to_array(),
            rpy: [0.0, 0.0, yaw],
        }
    }

    /// Recover a pose from a rigid transform (scale is discarded)
    pub fn from_mat4(matrix: &Mat4) -> Self {
        let (_, rotation, translation) = matrix.to_scale_rotation_translation();
        let (roll, pitch, yaw) = rotation.to_euler(EulerRot::XYZ);
        Self {
            xyz: translation.to_array(),
            rpy: [roll, pitch, yaw],
        }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.to_quat(), self.position())
    }

    /// Convert to quaternion representation
    pub fn to_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rpy[0], self.rpy[1], self.rpy[2])
    }

    /// Get position as Vec3
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.xyz)
    }

    /// Same orientation, shifted by `offset`
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            xyz: (self.position() + offset).to_array(),
            rpy: self.rpy,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_translate_then_rotate() {
        let pose = Pose::new([1.0, 2.0, 3.0], [0.0, 0.0, FRAC_PI_2]);
        let m = pose.to_mat4();

        // Origin lands on the translation; local X turns into world Y
        assert!(m.transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-6));
        assert!(m.transform_vector3(Vec3::X).abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_flipped_base_points_down() {
        for rpy in [[PI, 0.0, 0.0], [PI, 0.0, PI]] {
            let m = Pose::new([0.0; 3], rpy).to_mat4();
            assert!(m.transform_vector3(Vec3::Z).abs_diff_eq(-Vec3::Z, 1e-6));
        }
    }

    #[test]
    fn test_from_mat4_round_trip() {
        let pose = Pose::new([0.5, -0.25, 1.0], [0.3, -0.2, 1.1]);
        let back = Pose::from_mat4(&pose.to_mat4());
        assert!(back.to_mat4().abs_diff_eq(pose.to_mat4(), 1e-5));
    }

    #[test]
    fn test_translated() {
        let pose = Pose::from_yaw(Vec3::new(1.0, 0.0, 0.0), PI);
        let moved = pose.translated(Vec3::new(0.0, 2.0, 0.5));
        assert_eq!(moved.xyz, [1.0, 2.0, 0.5]);
        assert_eq!(moved.rpy, [0.0, 0.0, PI]);
        assert!(Pose::IDENTITY.is_identity());
        assert!(!moved.is_identity());
    }
}
