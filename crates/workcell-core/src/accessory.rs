//! Accessory placements: reach envelopes and blocky human proxies

use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::error::{LayoutError, ensure_positive};
use crate::kinematics::{FrameTree, REACH_RADIUS, SHOULDER_FRAME};
use crate::materials::{Finish, MaterialId, MaterialRegistry};
use crate::types::{PlacementKind, PlacementRecord, Pose};

/// Height the body proportions are authored for
pub const REFERENCE_HEIGHT: f32 = 1.75;
/// Adjacent body segments interpenetrate by this much
pub const SEGMENT_OVERLAP: f32 = 0.03;
/// Reach centre in front of the shoulders, in the proxy's unrotated frame
pub const HUMAN_REACH_OFFSET: Vec2 = Vec2::new(0.0, 0.3);
/// Human reach radius at the reference height
pub const HUMAN_REACH_RADIUS: f32 = 0.8;

/// Translucent sphere centred at `center`
pub fn reach_sphere(
    name: impl Into<String>,
    center: Vec3,
    radius: f32,
    material: MaterialId,
) -> PlacementRecord {
    PlacementRecord::sphere(name, PlacementKind::Sphere, center, radius, material)
}

/// FR3 reach envelope around joint 1 of `arm`
pub fn robot_reach_sphere(
    arm: &FrameTree,
    materials: &mut MaterialRegistry,
) -> Result<PlacementRecord, LayoutError> {
    let shoulder = arm.get(SHOULDER_FRAME).ok_or_else(|| {
        LayoutError::InvalidJointTable(format!("{}: no shoulder frame", arm.name()))
    })?;

    Ok(reach_sphere(
        format!("{}_reach", arm.name()),
        shoulder.world_position(),
        REACH_RADIUS,
        materials.finish(Finish::RobotReach),
    ))
}

/// Rotate a planar offset about the vertical axis
pub fn rotate_reach_offset(offset: Vec2, yaw: f32) -> Vec2 {
    Vec2::from_angle(yaw).rotate(offset)
}

/// Segment sizes for a proxy of a given height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyProportions {
    pub height: f32,
    /// `height / REFERENCE_HEIGHT`, applied to widths
    pub scale: f32,
    pub head_radius: f32,
    pub torso_height: f32,
    pub leg_height: f32,
    pub arm_length: f32,
    pub torso_width: f32,
    pub torso_depth: f32,
    pub limb_width: f32,
}

impl BodyProportions {
    pub fn for_height(height: f32) -> Result<Self, LayoutError> {
        let height = ensure_positive("human_height", height)?;
        let scale = height / REFERENCE_HEIGHT;

        Ok(Self {
            height,
            scale,
            head_radius: 0.07 * height,
            torso_height: 0.28 * height,
            leg_height: 0.48 * height,
            arm_length: 0.38 * height,
            torso_width: 0.35 * scale,
            torso_depth: 0.2 * scale,
            limb_width: 0.1 * scale,
        })
    }

    /// Height the arms hang from
    pub fn shoulder_z(&self) -> f32 {
        self.leg_height + self.torso_height - 0.05 * self.scale
    }

    pub fn head_z(&self) -> f32 {
        self.leg_height + self.torso_height + self.head_radius - SEGMENT_OVERLAP
    }

    /// Floor to the top of the head
    pub fn top_z(&self) -> f32 {
        self.head_z() + self.head_radius
    }

    /// |X| of the arm centrelines
    pub fn arm_offset_x(&self) -> f32 {
        self.torso_width / 2.0 + self.limb_width / 2.0 - SEGMENT_OVERLAP
    }

    pub fn reach_radius(&self) -> f32 {
        HUMAN_REACH_RADIUS * self.scale
    }
}

/// A blocky human figure with its reach envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HumanProxy {
    pub name: String,
    /// Floor point the figure stands on
    pub location: Vec3,
    pub height: f32,
    pub yaw: f32,
    pub segments: Vec<PlacementRecord>,
    pub reach: PlacementRecord,
    #[serde(skip)]
    body: BodyProportions,
    #[serde(skip)]
    body_material: MaterialId,
}

impl HumanProxy {
    /// Build a proxy named `name`
    pub fn build(
        name: impl Into<String>,
        location: Vec3,
        height: f32,
        yaw: f32,
        materials: &mut MaterialRegistry,
    ) -> Result<Self, LayoutError> {
        let name = name.into();
        let body = BodyProportions::for_height(height)?;
        let s = body.scale;
        let limb = body.limb_width;

        let pants = materials.finish(Finish::Pants);
        let shirt = materials.finish(Finish::Shirt);
        let skin = materials.finish(Finish::Skin);
        let reach_material = materials.finish(Finish::HumanReach);

        // Body-frame offset (x sideways, y forward) to world position
        let place = |x: f32, z: f32| {
            let planar = rotate_reach_offset(Vec2::new(x, 0.0), yaw);
            location + Vec3::new(planar.x, planar.y, z)
        };
        let segment = |part: &str, x: f32, z: f32, size: [f32; 3], material: MaterialId| {
            PlacementRecord::cuboid(
                format!("{name}_{part}"),
                PlacementKind::HumanSegment,
                Pose::from_yaw(place(x, z), yaw),
                size,
                material,
            )
        };

        let leg_span = body.leg_height + SEGMENT_OVERLAP;
        let torso_span = body.torso_height + SEGMENT_OVERLAP;
        let arm_z = body.shoulder_z() - body.arm_length / 2.0;

        let mut segments = vec![
            segment("leg_l", -0.1 * s, leg_span / 2.0, [limb, limb, leg_span], pants),
            segment("leg_r", 0.1 * s, leg_span / 2.0, [limb, limb, leg_span], pants),
            segment(
                "torso",
                0.0,
                body.leg_height + body.torso_height / 2.0,
                [body.torso_width, body.torso_depth, torso_span],
                shirt,
            ),
            segment("arm_l", -body.arm_offset_x(), arm_z, [limb, limb, body.arm_length], shirt),
            segment("arm_r", body.arm_offset_x(), arm_z, [limb, limb, body.arm_length], shirt),
        ];
        segments.push(PlacementRecord {
            transform: Pose::from_yaw(place(0.0, body.head_z()), yaw),
            ..PlacementRecord::sphere(
                format!("{name}_head"),
                PlacementKind::HumanSegment,
                Vec3::ZERO,
                body.head_radius,
                skin,
            )
        });

        let forward = rotate_reach_offset(HUMAN_REACH_OFFSET, yaw);
        let reach = reach_sphere(
            format!("{name}_reach"),
            location + Vec3::new(forward.x, forward.y, body.shoulder_z()),
            body.reach_radius(),
            reach_material,
        );

        tracing::debug!(
            "Built human proxy {} ({:.2} m, yaw {:.3})",
            name,
            height,
            yaw
        );

        Ok(Self {
            name,
            location,
            height: body.height,
            yaw,
            segments,
            reach,
            body,
            body_material: shirt,
        })
    }

    /// Single box enclosing the whole figure
    pub fn envelope(&self) -> PlacementRecord {
        let body = &self.body;
        let width = 2.0 * body.arm_offset_x() + body.limb_width;
        let top = body.top_z();

        PlacementRecord::cuboid(
            self.name.clone(),
            PlacementKind::HumanSegment,
            Pose::from_yaw(self.location + Vec3::Z * (top / 2.0), self.yaw),
            [width, body.torso_depth, top],
            self.body_material,
        )
    }

    /// Segments plus the reach sphere
    pub fn placements(&self) -> impl Iterator<Item = &PlacementRecord> {
        self.segments.iter().chain(std::iter::once(&self.reach))
    }
}

/// Human proxy named after its height, e.g. `human_1.75m`
pub fn build_human_proxy(
    location: Vec3,
    height: f32,
    yaw: f32,
    materials: &mut MaterialRegistry,
) -> Result<HumanProxy, LayoutError> {
    HumanProxy::build(format!("human_{height:.2}m"), location, height, yaw, materials)
}
