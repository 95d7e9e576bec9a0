//! Workcell layout composer
//!
//! One cell is six optics tables (two inner, four outer), the gantry above
//! them, six FR3 arms at fixed anchors and their reach envelopes. Which
//! anchors are table-mounted and which hang from drop struts depends on the
//! [`WorkcellConfig`].

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::accessory::robot_reach_sphere;
use crate::dimensions::{DimensionSet, ResolvedDimensions};
use crate::error::LayoutError;
use crate::gantry::{GantrySpec, build_gantry};
use crate::kinematics::{FrameTree, build_robot_arm};
use crate::materials::{Finish, MaterialRegistry};
use crate::types::{HoleGrid, PlacementKind, PlacementRecord, Pose};

/// Breadboard hole radius
pub const HOLE_RADIUS: f32 = 0.003;
/// Visual depth of a breadboard hole
pub const HOLE_DEPTH: f32 = 0.001;
/// Lift of the hole grid above the table surface
const HOLE_LIFT: f32 = 0.0001;
/// Absorbs float error in `(width - 2 * margin) / spacing`
const HOLE_COUNT_EPSILON: f32 = 1e-4;

/// Robot mounting arrangement of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WorkcellConfig {
    /// Four table-mounted arms plus two suspended centre arms
    Mixed,
    /// All six arms hang from the gantry
    AllSuspended,
}

impl WorkcellConfig {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkcellConfig::Mixed => "mixed",
            WorkcellConfig::AllSuspended => "all_suspended",
        }
    }
}

impl FromStr for WorkcellConfig {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mixed" => Ok(WorkcellConfig::Mixed),
            "all_suspended" => Ok(WorkcellConfig::AllSuspended),
            other => Err(LayoutError::InvalidConfiguration(other.to_string())),
        }
    }
}

impl TryFrom<&str> for WorkcellConfig {
    type Error = LayoutError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for WorkcellConfig {
    type Error = LayoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WorkcellConfig> for String {
    fn from(config: WorkcellConfig) -> Self {
        config.as_str().to_string()
    }
}

impl fmt::Display for WorkcellConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a robot base is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Mount {
    /// Upright on a table top
    Table,
    /// Upside down under a drop strut
    Suspended,
}

/// A robot base pose inside a cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotAnchor {
    pub name: &'static str,
    pub mount: Mount,
    /// World pose of the robot base
    pub pose: Pose,
}

/// A fully composed cell
#[derive(Debug, Clone)]
pub struct Workcell {
    pub cell_index: u32,
    pub config: WorkcellConfig,
    /// Centre of the cell on the floor
    pub origin: Vec3,
    pub dimensions: ResolvedDimensions,
    pub placements: Vec<PlacementRecord>,
    pub anchors: Vec<RobotAnchor>,
    /// One frame tree per anchor, in anchor order
    pub robots: Vec<FrameTree>,
}

impl Workcell {
    pub fn count_mounted(&self, mount: Mount) -> usize {
        self.anchors.iter().filter(|a| a.mount == mount).count()
    }

    pub fn placements_of(&self, kind: PlacementKind) -> impl Iterator<Item = &PlacementRecord> {
        self.placements.iter().filter(move |p| p.kind == kind)
    }

    pub fn find(&self, name: &str) -> Option<&PlacementRecord> {
        self.placements.iter().find(|p| p.name == name)
    }

    pub fn frame_count(&self) -> usize {
        self.robots.iter().map(FrameTree::len).sum()
    }
}

/// Compose one cell at `origin`
pub fn build_workcell(
    origin: Vec3,
    cell_index: u32,
    config: WorkcellConfig,
    dimensions: &DimensionSet,
    materials: &mut MaterialRegistry,
) -> Result<Workcell, LayoutError> {
    let dims = dimensions.resolve()?;
    let prefix = format!("cell{cell_index}");

    let mut placements = Vec::new();
    for (slot, x, y, width, depth) in table_slots(&dims) {
        placements.extend(build_table(
            &format!("{prefix}_table_{slot}"),
            origin + Vec3::new(x, y, 0.0),
            width,
            depth,
            &dims.base,
            materials,
        ));
    }

    let mut gantry_spec = GantrySpec::new(
        dims.assembly_width(),
        dims.assembly_depth,
        dims.base.gantry_height,
        dims.base.profile_size,
    );
    if config == WorkcellConfig::AllSuspended {
        gantry_spec = gantry_spec.with_extra_beams([dims.edge_anchor_x, -dims.edge_anchor_x]);
    }
    let gantry = build_gantry(&format!("{prefix}_gantry"), origin, &gantry_spec, materials)?;
    placements.extend(gantry.placements);

    let anchors = robot_anchors(config, origin, &dims);

    let profile = materials.finish(Finish::Profile);
    for anchor in anchors.iter().filter(|a| a.mount == Mount::Suspended) {
        let base = anchor.pose.position();
        let center = Vec3::new(
            base.x,
            base.y,
            origin.z + dims.suspension_z - dims.base.strut_length / 2.0,
        );
        placements.push(PlacementRecord::cuboid(
            format!("{prefix}_strut_{}", anchor.name),
            PlacementKind::Strut,
            Pose::from_position(center.to_array()),
            [
                dims.base.profile_size,
                dims.base.profile_size,
                dims.base.strut_length,
            ],
            profile,
        ));
    }

    let mut robots = Vec::with_capacity(anchors.len());
    for anchor in &anchors {
        let arm = build_robot_arm(&format!("{prefix}_robot_{}", anchor.name), anchor.pose)?;
        placements.push(robot_reach_sphere(&arm, materials)?);
        robots.push(arm);
    }

    tracing::debug!(
        "Built workcell {} ({}, {} placements, {} robots)",
        cell_index,
        config,
        placements.len(),
        robots.len()
    );

    Ok(Workcell {
        cell_index,
        config,
        origin,
        dimensions: dims,
        placements,
        anchors,
        robots,
    })
}

/// (slot, x, y, width, depth) of the six tables relative to the cell centre
fn table_slots(dims: &ResolvedDimensions) -> [(&'static str, f32, f32, f32, f32); 6] {
    let base = &dims.base;
    let (inner_w, inner_d) = (base.inner_table_width, base.inner_table_depth);
    let (outer_w, outer_d) = (base.outer_table_width, base.outer_table_depth);
    let (front, back, outer_x) = (dims.front_table_y, dims.back_table_y, dims.outer_table_x);

    [
        ("inner_front", 0.0, front, inner_w, inner_d),
        ("inner_back", 0.0, back, inner_w, inner_d),
        ("outer_left_front", -outer_x, front, outer_w, outer_d),
        ("outer_left_back", -outer_x, back, outer_w, outer_d),
        ("outer_right_front", outer_x, front, outer_w, outer_d),
        ("outer_right_back", outer_x, back, outer_w, outer_d),
    ]
}

/// Table top, four legs and the breadboard hole grid
fn build_table(
    name: &str,
    center: Vec3,
    width: f32,
    depth: f32,
    base: &DimensionSet,
    materials: &mut MaterialRegistry,
) -> Vec<PlacementRecord> {
    let top_material = materials.finish(Finish::TableTop);
    let leg_material = materials.finish(Finish::Profile);
    let hole_material = materials.finish(Finish::Holes);

    let leg_h = base.table_leg_height;
    let surface = center.z + leg_h + base.table_thickness;
    let mut records = Vec::with_capacity(6);

    records.push(PlacementRecord::cuboid(
        name,
        PlacementKind::Table,
        Pose::from_position([center.x, center.y, center.z + leg_h + base.table_thickness / 2.0]),
        [width, depth, base.table_thickness],
        top_material,
    ));

    let leg_x = width / 2.0 - base.table_leg_inset_x;
    let leg_y = depth / 2.0 - base.table_leg_inset_y;
    let corners = [(1.0, 1.0), (-1.0, 1.0), (1.0, -1.0), (-1.0, -1.0)];
    for (n, (sx, sy)) in corners.into_iter().enumerate() {
        records.push(PlacementRecord::cylinder(
            format!("{name}_leg_{}", n + 1),
            PlacementKind::Leg,
            Pose::from_position([
                center.x + sx * leg_x,
                center.y + sy * leg_y,
                center.z + leg_h / 2.0,
            ]),
            base.table_leg_radius,
            leg_h,
            leg_material,
        ));
    }

    // First hole at the margin corner; the grid repeats along +X and +Y
    let grid = hole_grid(width, depth, base);
    let first_hole = [
        center.x - width / 2.0 + base.hole_margin,
        center.y - depth / 2.0 + base.hole_margin,
        surface - HOLE_DEPTH / 2.0 + HOLE_LIFT,
    ];
    records.push(
        PlacementRecord::cylinder(
            format!("{name}_holes"),
            PlacementKind::HoleGrid,
            Pose::from_position(first_hole),
            HOLE_RADIUS,
            HOLE_DEPTH,
            hole_material,
        )
        .with_pattern(grid),
    );

    records
}

/// Hole counts that fit inside the margins of a `width` x `depth` top
pub fn hole_grid(width: f32, depth: f32, base: &DimensionSet) -> HoleGrid {
    let fit = |extent: f32| {
        let usable = (extent - 2.0 * base.hole_margin).max(0.0);
        (usable / base.hole_spacing + HOLE_COUNT_EPSILON).floor() as u32
    };

    HoleGrid {
        spacing: base.hole_spacing,
        count_x: fit(width),
        count_y: fit(depth),
        hole_radius: HOLE_RADIUS,
        hole_depth: HOLE_DEPTH,
    }
}

fn robot_anchors(config: WorkcellConfig, origin: Vec3, dims: &ResolvedDimensions) -> Vec<RobotAnchor> {
    let (ex, ey, cy) = (dims.edge_anchor_x, dims.edge_anchor_y, dims.base.center_anchor_y);
    let hanging_z = dims.suspended_base_z;
    let at = |x: f32, y: f32, z: f32, rpy: [f32; 3]| {
        Pose::new((origin + Vec3::new(x, y, z)).to_array(), rpy)
    };
    let flipped = [PI, 0.0, 0.0];
    let flipped_turned = [PI, 0.0, PI];

    let side_anchors = match config {
        WorkcellConfig::Mixed => {
            let z = dims.surface_z;
            [
                ("left_back", at(-ex, ey, z, [0.0; 3])),
                ("left_front", at(-ex, -ey, z, [0.0; 3])),
                ("right_back", at(ex, ey, z, [0.0, 0.0, PI])),
                ("right_front", at(ex, -ey, z, [0.0, 0.0, PI])),
            ]
            .map(|(name, pose)| RobotAnchor {
                name,
                mount: Mount::Table,
                pose,
            })
        }
        WorkcellConfig::AllSuspended => [
            ("left_back", at(-ex, ey, hanging_z, flipped)),
            ("left_front", at(-ex, -ey, hanging_z, flipped)),
            ("right_back", at(ex, ey, hanging_z, flipped_turned)),
            ("right_front", at(ex, -ey, hanging_z, flipped_turned)),
        ]
        .map(|(name, pose)| RobotAnchor {
            name,
            mount: Mount::Suspended,
            pose,
        }),
    };

    let center_anchors = [
        ("center_back", at(0.0, cy, hanging_z, flipped)),
        ("center_front", at(0.0, -cy, hanging_z, flipped_turned)),
    ]
    .map(|(name, pose)| RobotAnchor {
        name,
        mount: Mount::Suspended,
        pose,
    });

    side_anchors.into_iter().chain(center_anchors).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::{ARM_FRAME_COUNT, SHOULDER_FRAME};
    use approx::assert_abs_diff_eq;

    fn build(config: WorkcellConfig) -> (Workcell, MaterialRegistry) {
        let mut materials = MaterialRegistry::new();
        let cell = build_workcell(
            Vec3::ZERO,
            1,
            config,
            &DimensionSet::default(),
            &mut materials,
        )
        .expect("default dimensions are valid");
        (cell, materials)
    }

    #[test]
    fn test_config_parsing() {
        assert_eq!("mixed".parse::<WorkcellConfig>(), Ok(WorkcellConfig::Mixed));
        assert_eq!(
            WorkcellConfig::try_from("all_suspended"),
            Ok(WorkcellConfig::AllSuspended)
        );
        assert_eq!(
            "bogus".parse::<WorkcellConfig>(),
            Err(LayoutError::InvalidConfiguration("bogus".to_string()))
        );
        assert!("Mixed".parse::<WorkcellConfig>().is_err());
        assert_eq!(WorkcellConfig::AllSuspended.to_string(), "all_suspended");
        assert_eq!(String::from(WorkcellConfig::Mixed), "mixed");
    }

    #[test]
    fn test_mixed_anchor_counts() {
        let (cell, _) = build(WorkcellConfig::Mixed);
        assert_eq!(cell.count_mounted(Mount::Table), 4);
        assert_eq!(cell.count_mounted(Mount::Suspended), 2);
        assert_eq!(cell.robots.len(), 6);
        assert_eq!(cell.frame_count(), 6 * ARM_FRAME_COUNT);
    }

    #[test]
    fn test_all_suspended_anchor_counts() {
        let (cell, _) = build(WorkcellConfig::AllSuspended);
        assert_eq!(cell.count_mounted(Mount::Table), 0);
        assert_eq!(cell.count_mounted(Mount::Suspended), 6);
    }

    #[test]
    fn test_placement_counts() {
        let (mixed, _) = build(WorkcellConfig::Mixed);
        assert_eq!(mixed.placements_of(PlacementKind::Table).count(), 6);
        assert_eq!(mixed.placements_of(PlacementKind::HoleGrid).count(), 6);
        assert_eq!(mixed.placements_of(PlacementKind::Beam).count(), 3);
        assert_eq!(mixed.placements_of(PlacementKind::Strut).count(), 2);
        assert_eq!(mixed.placements_of(PlacementKind::Sphere).count(), 6);
        assert_eq!(mixed.placements.len(), 51);

        let (suspended, _) = build(WorkcellConfig::AllSuspended);
        assert_eq!(suspended.placements_of(PlacementKind::Beam).count(), 5);
        assert_eq!(suspended.placements_of(PlacementKind::Strut).count(), 6);
        assert_eq!(suspended.placements.len(), 57);
    }

    #[test]
    fn test_table_positions() {
        let (cell, _) = build(WorkcellConfig::Mixed);

        let outer = cell.find("cell1_table_outer_right_back").expect("outer table");
        assert!(outer.position().abs_diff_eq(Vec3::new(1.6, 0.8, 1.07), 1e-5));
        assert_eq!(outer.footprint, [0.6, 1.5, 0.3]);

        let leg = cell.find("cell1_table_inner_front_leg_1").expect("leg");
        assert!(leg.position().abs_diff_eq(Vec3::new(0.9, -0.2, 0.46), 1e-5));
        assert_abs_diff_eq!(leg.length(), 0.92);
    }

    #[test]
    fn test_hole_grid_counts() {
        let base = DimensionSet::default();
        let inner = hole_grid(2.0, 1.5, &base);
        assert_eq!((inner.count_x, inner.count_y), (76, 56));
        let outer = hole_grid(0.6, 1.5, &base);
        assert_eq!((outer.count_x, outer.count_y), (20, 56));

        let (cell, _) = build(WorkcellConfig::Mixed);
        let holes = cell.find("cell1_table_inner_back_holes").expect("holes");
        assert_eq!(holes.pattern, Some(inner));
        assert!(holes.position().abs_diff_eq(Vec3::new(-0.95, 0.1, 1.2196), 1e-5));
    }

    #[test]
    fn test_mixed_anchor_poses() {
        let (cell, _) = build(WorkcellConfig::Mixed);
        let anchor = |name: &str| {
            cell.anchors
                .iter()
                .find(|a| a.name == name)
                .expect("anchor exists")
        };

        let left = anchor("left_front");
        assert_eq!(left.mount, Mount::Table);
        assert!(left.pose.position().abs_diff_eq(Vec3::new(-0.85, -0.75, 1.22), 1e-5));
        assert_eq!(left.pose.rpy, [0.0; 3]);
        assert_eq!(anchor("right_back").pose.rpy, [0.0, 0.0, PI]);

        let back = anchor("center_back");
        assert!(back.pose.position().abs_diff_eq(Vec3::new(0.0, 0.5, 1.96), 1e-5));
        assert_eq!(back.pose.rpy, [PI, 0.0, 0.0]);
        assert_eq!(anchor("center_front").pose.rpy, [PI, 0.0, PI]);
    }

    #[test]
    fn test_suspended_side_anchors_flip() {
        let (cell, _) = build(WorkcellConfig::AllSuspended);
        for anchor in &cell.anchors {
            assert_abs_diff_eq!(anchor.pose.xyz[2], 1.96, epsilon = 1e-5);
            assert_eq!(anchor.pose.rpy[0], PI);
        }
        let right = cell.anchors.iter().find(|a| a.name == "right_front").expect("anchor");
        assert_eq!(right.pose.rpy, [PI, 0.0, PI]);
    }

    #[test]
    fn test_struts_above_suspended_anchors() {
        let (cell, _) = build(WorkcellConfig::Mixed);
        let strut = cell.find("cell1_strut_center_back").expect("strut");
        assert!(strut.position().abs_diff_eq(Vec3::new(0.0, 0.5, 2.21), 1e-5));
        assert_eq!(strut.footprint, [0.08, 0.08, 0.5]);
        assert!(cell.find("cell1_strut_left_back").is_none());
    }

    #[test]
    fn test_reach_sphere_height_by_mount() {
        let (cell, _) = build(WorkcellConfig::Mixed);

        let table = cell.find("cell1_robot_left_back_reach").expect("reach");
        assert_abs_diff_eq!(table.position().z, 1.553, epsilon = 1e-4);
        assert_abs_diff_eq!(table.radius(), 0.855, epsilon = 1e-6);

        let hanging = cell.find("cell1_robot_center_front_reach").expect("reach");
        assert_abs_diff_eq!(hanging.position().z, 1.627, epsilon = 1e-4);

        let arm = &cell.robots[0];
        let shoulder = arm.get(SHOULDER_FRAME).expect("shoulder").world_position();
        assert!(table.position().abs_diff_eq(shoulder, 1e-6));
    }

    #[test]
    fn test_gantry_spans_assembly() {
        let (cell, _) = build(WorkcellConfig::AllSuspended);
        let leg = cell.find("cell1_gantry_leg_3").expect("gantry leg");
        assert!(leg.position().abs_diff_eq(Vec3::new(1.94, 1.59, 1.25), 1e-5));
        let extra = cell.find("cell1_gantry_beam_x+0.85").expect("extra beam");
        assert_abs_diff_eq!(extra.position().x, 0.85, epsilon = 1e-6);
    }

    #[test]
    fn test_origin_offsets_everything() {
        let mut materials = MaterialRegistry::new();
        let shifted = build_workcell(
            Vec3::new(-2.5, 1.0, 0.0),
            2,
            WorkcellConfig::Mixed,
            &DimensionSet::default(),
            &mut materials,
        )
        .expect("valid");
        let (reference, _) = build(WorkcellConfig::Mixed);

        for (a, b) in shifted.placements.iter().zip(&reference.placements) {
            let delta = a.position() - b.position();
            assert!(delta.abs_diff_eq(Vec3::new(-2.5, 1.0, 0.0), 1e-5), "{}", a.name);
        }
        assert!(shifted.placements[0].name.starts_with("cell2_"));
    }

    #[test]
    fn test_shares_materials_across_cells() {
        let mut materials = MaterialRegistry::new();
        let dims = DimensionSet::default();
        build_workcell(Vec3::ZERO, 1, WorkcellConfig::Mixed, &dims, &mut materials)
            .expect("valid");
        let after_first = materials.len();
        build_workcell(Vec3::X * 5.0, 2, WorkcellConfig::AllSuspended, &dims, &mut materials)
            .expect("valid");
        assert_eq!(materials.len(), after_first);
        assert_eq!(after_first, 4);
    }

    #[test]
    fn test_invalid_dimensions_fail_before_placement() {
        let mut materials = MaterialRegistry::new();
        let dims = DimensionSet {
            strut_length: -0.5,
            ..DimensionSet::default()
        };
        let result = build_workcell(Vec3::ZERO, 1, WorkcellConfig::Mixed, &dims, &mut materials);
        assert!(matches!(
            result,
            Err(LayoutError::InvalidDimension { name: "strut_length", .. })
        ));
        assert!(materials.is_empty());
    }
}
