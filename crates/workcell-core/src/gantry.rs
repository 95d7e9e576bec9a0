//! Overhead gantry frame built from square aluminium profiles

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

use crate::error::{LayoutError, ensure_positive};
use crate::materials::{Finish, MaterialRegistry};
use crate::types::{PlacementKind, PlacementRecord, Pose};

/// Gantry dimensions
///
/// `width`/`depth` are the clear span the frame straddles; the legs stand
/// half a profile outside it.
#[derive(Debug, Clone, PartialEq)]
pub struct GantrySpec {
    pub width: f32,
    pub depth: f32,
    /// Floor to beam centreline
    pub height: f32,
    pub profile_size: f32,
    /// X offsets of additional longitudinal beams
    pub extra_beam_x: Vec<f32>,
}

impl GantrySpec {
    pub fn new(width: f32, depth: f32, height: f32, profile_size: f32) -> Self {
        Self {
            width,
            depth,
            height,
            profile_size,
            extra_beam_x: Vec::new(),
        }
    }

    pub fn with_extra_beams(mut self, xs: impl IntoIterator<Item = f32>) -> Self {
        self.extra_beam_x.extend(xs);
        self
    }

    pub fn leg_offset_x(&self) -> f32 {
        self.width / 2.0 + self.profile_size / 2.0
    }

    pub fn leg_offset_y(&self) -> f32 {
        self.depth / 2.0 + self.profile_size / 2.0
    }

    pub fn transverse_beam_length(&self) -> f32 {
        self.width + self.profile_size
    }

    pub fn longitudinal_beam_length(&self) -> f32 {
        self.depth
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        ensure_positive("gantry_width", self.width)?;
        ensure_positive("gantry_depth", self.depth)?;
        ensure_positive("gantry_height", self.height)?;
        ensure_positive("profile_size", self.profile_size)?;
        for &x in &self.extra_beam_x {
            if !x.is_finite() {
                return Err(LayoutError::InvalidDimension {
                    name: "extra_beam_x",
                    value: x,
                });
            }
        }
        Ok(())
    }
}

/// Resolved gantry placements
#[derive(Debug, Clone, PartialEq)]
pub struct Gantry {
    pub placements: Vec<PlacementRecord>,
    /// World height of the beam centreline
    pub beam_z: f32,
}

impl Gantry {
    pub fn legs(&self) -> impl Iterator<Item = &PlacementRecord> {
        self.placements.iter().filter(|p| p.kind == PlacementKind::Leg)
    }

    pub fn beams(&self) -> impl Iterator<Item = &PlacementRecord> {
        self.placements.iter().filter(|p| p.kind == PlacementKind::Beam)
    }
}

/// Lay out four legs, two transverse beams and the longitudinal beams
pub fn build_gantry(
    prefix: &str,
    origin: Vec3,
    spec: &GantrySpec,
    materials: &mut MaterialRegistry,
) -> Result<Gantry, LayoutError> {
    spec.validate()?;

    let profile = materials.finish(Finish::Profile);
    let p = spec.profile_size;
    let leg_x = spec.leg_offset_x();
    let leg_y = spec.leg_offset_y();
    let beam_z = origin.z + spec.height;

    let mut placements = Vec::with_capacity(7 + spec.extra_beam_x.len());

    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
    for (n, (sx, sy)) in corners.into_iter().enumerate() {
        let center = origin + Vec3::new(sx * leg_x, sy * leg_y, spec.height / 2.0);
        placements.push(PlacementRecord::cuboid(
            format!("{prefix}_leg_{}", n + 1),
            PlacementKind::Leg,
            Pose::from_position(center.to_array()),
            [p, p, spec.height],
            profile,
        ));
    }

    let transverse = spec.transverse_beam_length();
    for (label, sy) in [("front", -1.0), ("back", 1.0)] {
        let center = origin + Vec3::new(0.0, sy * leg_y, spec.height);
        placements.push(PlacementRecord::cuboid(
            format!("{prefix}_beam_{label}"),
            PlacementKind::Beam,
            Pose::new(center.to_array(), [0.0, FRAC_PI_2, 0.0]),
            [p, p, transverse],
            profile,
        ));
    }

    let longitudinal = spec.longitudinal_beam_length();
    let beam_xs = std::iter::once(("center".to_string(), 0.0)).chain(
        spec.extra_beam_x
            .iter()
            .map(|&x| (format!("x{x:+.2}"), x)),
    );
    for (label, x) in beam_xs {
        let center = origin + Vec3::new(x, 0.0, spec.height);
        placements.push(PlacementRecord::cuboid(
            format!("{prefix}_beam_{label}"),
            PlacementKind::Beam,
            Pose::new(center.to_array(), [FRAC_PI_2, 0.0, 0.0]),
            [p, p, longitudinal],
            profile,
        ));
    }

    tracing::debug!(
        "Built gantry {} ({} profiles, beam z {:.3})",
        prefix,
        placements.len(),
        beam_z
    );

    Ok(Gantry { placements, beam_z })
}
