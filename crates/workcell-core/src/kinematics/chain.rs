//! Chain composition: joint table + base pose -> world-space frames

use glam::Mat4;
use uuid::Uuid;

use super::{FR3_JOINTS, Frame, FrameTree, JointSpec};
use crate::error::LayoutError;
use crate::types::Pose;

/// Compose a frame tree from an ordered joint table rooted at `base`
///
/// The root frame's local transform is `base` applied to the root entry;
/// every other frame takes its entry's offset verbatim, relative to the
/// parent named by the entry. `world = parent.world * local`.
pub fn build_chain(prefix: &str, specs: &[JointSpec], base: Pose) -> Result<FrameTree, LayoutError> {
    let Some(root_spec) = specs.first() else {
        return Err(LayoutError::InvalidJointTable(format!(
            "{prefix}: joint table is empty"
        )));
    };
    if root_spec.parent.is_some() {
        return Err(LayoutError::InvalidJointTable(format!(
            "{prefix}: first entry {} must be the root",
            root_spec.name
        )));
    }

    let mut frames: Vec<Frame> = Vec::with_capacity(specs.len());
    for (index, spec) in specs.iter().enumerate() {
        let (parent, local, parent_world) = if index == 0 {
            (None, root_local(base, spec), Mat4::IDENTITY)
        } else {
            let parent = spec.parent.filter(|&p| p < index).ok_or_else(|| {
                LayoutError::InvalidJointTable(format!(
                    "{prefix}: {} must name an earlier parent, got {:?}",
                    spec.name, spec.parent
                ))
            })?;
            (Some(parent), spec.local_pose(), frames[parent].world)
        };

        let name = format!("{prefix}_{}", spec.name);
        frames.push(Frame {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()),
            name,
            link: spec.name,
            parent,
            local,
            world: parent_world * local.to_mat4(),
            visual: spec.visual,
        });
    }

    tracing::debug!("Built frame chain {} ({} frames)", prefix, frames.len());
    Ok(FrameTree::new(prefix, frames))
}

fn root_local(base: Pose, spec: &JointSpec) -> Pose {
    let mount = spec.local_pose();
    if mount.is_identity() {
        base
    } else {
        Pose::from_mat4(&(base.to_mat4() * mount.to_mat4()))
    }
}

/// Build an FR3 arm with an open gripper at `base`
pub fn build_robot_arm(name_prefix: &str, base: Pose) -> Result<FrameTree, LayoutError> {
    build_chain(name_prefix, &FR3_JOINTS, base)
}
