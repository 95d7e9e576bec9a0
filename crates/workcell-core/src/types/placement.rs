//! World-space placement records handed to the rendering collaborator

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::Pose;
use crate::materials::MaterialId;

/// What a placement represents in the facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementKind {
    Table,
    Leg,
    Beam,
    Strut,
    Sphere,
    HumanSegment,
    HoleGrid,
}

impl PlacementKind {
    pub const ALL: [PlacementKind; 7] = [
        PlacementKind::Table,
        PlacementKind::Leg,
        PlacementKind::HoleGrid,
        PlacementKind::Beam,
        PlacementKind::Strut,
        PlacementKind::Sphere,
        PlacementKind::HumanSegment,
    ];

    /// Label used in layout summaries
    pub fn display_name(&self) -> &'static str {
        match self {
            PlacementKind::Table => "Table",
            PlacementKind::Leg => "Leg",
            PlacementKind::Beam => "Beam",
            PlacementKind::Strut => "Strut",
            PlacementKind::Sphere => "Sphere",
            PlacementKind::HumanSegment => "Human Segment",
            PlacementKind::HoleGrid => "Hole Grid",
        }
    }
}

/// Primitive the collaborator instantiates for a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveShape {
    /// Unit cube scaled to the footprint
    Box,
    /// Cylinder along local Z, footprint `(2r, 2r, length)`
    Cylinder,
    /// Sphere, footprint `(2r, 2r, 2r)`
    Sphere,
}

/// Breadboard hole array repeated from the placement's first hole
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoleGrid {
    /// Hole pitch along both axes
    pub spacing: f32,
    pub count_x: u32,
    pub count_y: u32,
    pub hole_radius: f32,
    pub hole_depth: f32,
}

impl HoleGrid {
    /// Holes drilled by the whole pattern
    pub fn hole_count(&self) -> u32 {
        self.count_x * self.count_y
    }
}

/// A fully resolved rigid placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub name: String,
    pub kind: PlacementKind,
    pub shape: PrimitiveShape,
    /// World transform of the primitive's centre
    pub transform: Pose,
    /// Width, depth, height in the primitive's local frame
    pub footprint: [f32; 3],
    pub material: MaterialId,
    /// Repetition pattern, only for hole grids
    pub pattern: Option<HoleGrid>,
}

impl PlacementRecord {
    /// Box placement sized by `size`
    pub fn cuboid(
        name: impl Into<String>,
        kind: PlacementKind,
        transform: Pose,
        size: [f32; 3],
        material: MaterialId,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            shape: PrimitiveShape::Box,
            transform,
            footprint: size,
            material,
            pattern: None,
        }
    }

    /// Cylinder placement along local Z
    pub fn cylinder(
        name: impl Into<String>,
        kind: PlacementKind,
        transform: Pose,
        radius: f32,
        length: f32,
        material: MaterialId,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            shape: PrimitiveShape::Cylinder,
            transform,
            footprint: [radius * 2.0, radius * 2.0, length],
            material,
            pattern: None,
        }
    }

    /// Sphere placement centred at `center`
    pub fn sphere(
        name: impl Into<String>,
        kind: PlacementKind,
        center: Vec3,
        radius: f32,
        material: MaterialId,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            shape: PrimitiveShape::Sphere,
            transform: Pose::from_position(center.to_array()),
            footprint: [radius * 2.0; 3],
            material,
            pattern: None,
        }
    }

    pub fn with_pattern(mut self, pattern: HoleGrid) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    /// Extent along the primitive's local Z (profile/leg length)
    pub fn length(&self) -> f32 {
        self.footprint[2]
    }

    /// Radius for spheres and cylinders
    pub fn radius(&self) -> f32 {
        self.footprint[0] / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{Finish, MaterialRegistry};

    #[test]
    fn test_constructors() {
        let mut materials = MaterialRegistry::new();
        let mat = materials.finish(Finish::Profile);

        let leg = PlacementRecord::cylinder(
            "leg",
            PlacementKind::Leg,
            Pose::from_position([0.0, 0.0, 0.46]),
            0.05,
            0.92,
            mat,
        );
        assert_eq!(leg.shape, PrimitiveShape::Cylinder);
        assert_eq!(leg.footprint, [0.1, 0.1, 0.92]);
        assert_eq!(leg.length(), 0.92);
        assert_eq!(leg.radius(), 0.05);

        let ball = PlacementRecord::sphere("ball", PlacementKind::Sphere, Vec3::Z, 0.5, mat);
        assert_eq!(ball.footprint, [1.0; 3]);
        assert_eq!(ball.position(), Vec3::Z);
        assert!(ball.pattern.is_none());
    }

    #[test]
    fn test_hole_grid_pattern() {
        let mut materials = MaterialRegistry::new();
        let grid = HoleGrid {
            spacing: 0.025,
            count_x: 4,
            count_y: 3,
            hole_radius: 0.003,
            hole_depth: 0.001,
        };
        let holes = PlacementRecord::cylinder(
            "holes",
            PlacementKind::HoleGrid,
            Pose::IDENTITY,
            grid.hole_radius,
            grid.hole_depth,
            materials.finish(Finish::Holes),
        )
        .with_pattern(grid);

        assert_eq!(holes.pattern.map(|p| p.hole_count()), Some(12));
        assert_eq!(PlacementKind::HoleGrid.display_name(), "Hole Grid");
    }
}
