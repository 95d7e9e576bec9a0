//! Kinematic frame trees for robot arms

mod chain;
mod fr3;
mod frame;

pub use chain::*;
pub use fr3::*;
pub use frame::*;

use crate::assets::MeshRef;
use crate::types::Pose;

/// Rigid offset from a parent link frame to a child link frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointSpec {
    pub name: &'static str,
    pub translation: [f32; 3],
    /// XYZ intrinsic Euler angles in radians
    pub rotation_euler: [f32; 3],
    /// Index of the parent entry; `None` only for the root
    pub parent: Option<usize>,
    /// Visual mesh carried by the child frame
    pub visual: Option<MeshRef>,
}

impl JointSpec {
    /// Root entry (the mount the base pose is applied to)
    pub const fn root(name: &'static str, visual: Option<MeshRef>) -> Self {
        Self {
            name,
            translation: [0.0; 3],
            rotation_euler: [0.0; 3],
            parent: None,
            visual,
        }
    }

    pub const fn child(
        name: &'static str,
        parent: usize,
        translation: [f32; 3],
        rotation_euler: [f32; 3],
        visual: Option<MeshRef>,
    ) -> Self {
        Self {
            name,
            translation,
            rotation_euler,
            parent: Some(parent),
            visual,
        }
    }

    pub fn local_pose(&self) -> Pose {
        Pose::new(self.translation, self.rotation_euler)
    }
}
