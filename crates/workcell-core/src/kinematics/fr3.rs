//! Franka FR3 arm with the Franka hand
//!
//! Joint origins follow the FR3 kinematics description at the zero
//! configuration with the gripper open.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use super::JointSpec;
use crate::assets::MeshRef;

/// Height of joint 1 above the base mount
pub const SHOULDER_HEIGHT: f32 = 0.333;
/// Joint 8: flange offset along link 7's Z
pub const FLANGE_OFFSET: f32 = 0.107;
/// Fixed twist of the hand about the flange Z axis.
/// Taken from the hand description's fixed joint; still to be checked
/// against the authoritative robot model.
pub const HAND_TWIST: f32 = FRAC_PI_4;
/// Finger origin along the hand Z axis
pub const FINGER_OFFSET: f32 = 0.0584;
/// The second finger is the first one turned about local Z.
/// Same provenance caveat as [`HAND_TWIST`].
pub const FINGER_MIRROR: f32 = PI;
/// Maximum reach envelope radius
pub const REACH_RADIUS: f32 = 0.855;

/// Frames per arm: link0 mount, links 1-7, hand, two fingers
pub const ARM_FRAME_COUNT: usize = 11;
/// Index of the frame the reach envelope is centred on (joint 1)
pub const SHOULDER_FRAME: usize = 1;
/// Index of the hand frame
pub const HAND_FRAME: usize = 8;

/// Canonical joint table shared by every arm instance
pub static FR3_JOINTS: [JointSpec; ARM_FRAME_COUNT] = [
    JointSpec::root("link0", Some(MeshRef::arm("link0.dae"))),
    JointSpec::child(
        "link1",
        0,
        [0.0, 0.0, SHOULDER_HEIGHT],
        [0.0, 0.0, 0.0],
        Some(MeshRef::arm("link1.dae")),
    ),
    JointSpec::child(
        "link2",
        1,
        [0.0, 0.0, 0.0],
        [-FRAC_PI_2, 0.0, 0.0],
        Some(MeshRef::arm("link2.dae")),
    ),
    JointSpec::child(
        "link3",
        2,
        [0.0, -0.316, 0.0],
        [FRAC_PI_2, 0.0, 0.0],
        Some(MeshRef::arm("link3.dae")),
    ),
    JointSpec::child(
        "link4",
        3,
        [0.0825, 0.0, 0.0],
        [FRAC_PI_2, 0.0, 0.0],
        Some(MeshRef::arm("link4.dae")),
    ),
    JointSpec::child(
        "link5",
        4,
        [-0.0825, 0.384, 0.0],
        [-FRAC_PI_2, 0.0, 0.0],
        Some(MeshRef::arm("link5.dae")),
    ),
    JointSpec::child(
        "link6",
        5,
        [0.0, 0.0, 0.0],
        [FRAC_PI_2, 0.0, 0.0],
        Some(MeshRef::arm("link6.dae")),
    ),
    JointSpec::child(
        "link7",
        6,
        [0.088, 0.0, 0.0],
        [FRAC_PI_2, 0.0, 0.0],
        Some(MeshRef::arm("link7.dae")),
    ),
    // Flange offset and hand twist in one step: translate, then rotate
    JointSpec::child(
        "hand",
        7,
        [0.0, 0.0, FLANGE_OFFSET],
        [0.0, 0.0, HAND_TWIST],
        Some(MeshRef::hand("hand.dae")),
    ),
    JointSpec::child(
        "finger1",
        HAND_FRAME,
        [0.0, 0.0, FINGER_OFFSET],
        [0.0, 0.0, 0.0],
        Some(MeshRef::hand("finger.dae")),
    ),
    JointSpec::child(
        "finger2",
        HAND_FRAME,
        [0.0, 0.0, FINGER_OFFSET],
        [0.0, 0.0, FINGER_MIRROR],
        Some(MeshRef::hand("finger.dae")),
    ),
];
