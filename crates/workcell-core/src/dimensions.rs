//! Dimension resolver
//!
//! Base lengths for one workcell variant and the offsets derived from them.
//! Every derived value is a named formula over the base fields; nothing is
//! stored independently.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, ensure_positive};

/// Base lengths of a workcell, in metres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionSet {
    pub inner_table_width: f32,
    pub inner_table_depth: f32,
    pub outer_table_width: f32,
    pub outer_table_depth: f32,
    pub table_thickness: f32,
    /// Floor to the underside of the table top
    pub table_leg_height: f32,
    pub table_leg_radius: f32,
    pub table_leg_inset_x: f32,
    pub table_leg_inset_y: f32,
    /// Breadboard hole pitch
    pub hole_spacing: f32,
    /// Border around the breadboard left without holes
    pub hole_margin: f32,
    /// Gap between inner and outer tables (X)
    pub aisle_gap: f32,
    /// Gap between front and back tables (Y)
    pub seam_gap: f32,
    /// Edge length of the square structural profile
    pub profile_size: f32,
    /// Floor to gantry beam centreline
    pub gantry_height: f32,
    pub strut_length: f32,
    /// Table-mounted anchors sit this far inboard of the inner table edge
    pub edge_anchor_inset: f32,
    /// |Y| of the two centre suspended anchors
    pub center_anchor_y: f32,
    /// Walkway strip running alongside the table assembly
    pub perimeter_aisle_width: f32,
}

impl Default for DimensionSet {
    fn default() -> Self {
        Self {
            inner_table_width: 2.0,
            inner_table_depth: 1.5,
            outer_table_width: 0.6,
            outer_table_depth: 1.5,
            table_thickness: 0.3,
            table_leg_height: 0.92,
            table_leg_radius: 0.05,
            table_leg_inset_x: 0.1,
            table_leg_inset_y: 0.15,
            hole_spacing: 0.025,
            hole_margin: 0.05,
            aisle_gap: 0.3,
            seam_gap: 0.1,
            profile_size: 0.08,
            gantry_height: 2.5,
            strut_length: 0.5,
            edge_anchor_inset: 0.15,
            center_anchor_y: 0.5,
            perimeter_aisle_width: 0.6,
        }
    }
}

impl DimensionSet {
    fn named_fields(&self) -> [(&'static str, f32); 19] {
        [
            ("inner_table_width", self.inner_table_width),
            ("inner_table_depth", self.inner_table_depth),
            ("outer_table_width", self.outer_table_width),
            ("outer_table_depth", self.outer_table_depth),
            ("table_thickness", self.table_thickness),
            ("table_leg_height", self.table_leg_height),
            ("table_leg_radius", self.table_leg_radius),
            ("table_leg_inset_x", self.table_leg_inset_x),
            ("table_leg_inset_y", self.table_leg_inset_y),
            ("hole_spacing", self.hole_spacing),
            ("hole_margin", self.hole_margin),
            ("aisle_gap", self.aisle_gap),
            ("seam_gap", self.seam_gap),
            ("profile_size", self.profile_size),
            ("gantry_height", self.gantry_height),
            ("strut_length", self.strut_length),
            ("edge_anchor_inset", self.edge_anchor_inset),
            ("center_anchor_y", self.center_anchor_y),
            ("perimeter_aisle_width", self.perimeter_aisle_width),
        ]
    }

    /// Check every base length is strictly positive
    pub fn validate(&self) -> Result<(), LayoutError> {
        for (name, value) in self.named_fields() {
            ensure_positive(name, value)?;
        }
        Ok(())
    }

    /// Validate and derive the layout offsets
    pub fn resolve(&self) -> Result<ResolvedDimensions, LayoutError> {
        self.validate()?;

        let outer_table_x =
            self.inner_table_width / 2.0 + self.aisle_gap + self.outer_table_width / 2.0;
        let back_table_y = self.inner_table_depth / 2.0 + self.seam_gap / 2.0;
        let assembly_half_width = outer_table_x + self.outer_table_width / 2.0;
        let suspension_z = self.gantry_height - self.profile_size / 2.0;

        Ok(ResolvedDimensions {
            outer_table_x,
            front_table_y: -back_table_y,
            back_table_y,
            assembly_half_width,
            assembly_depth: self.inner_table_depth * 2.0 + self.seam_gap,
            surface_z: self.table_leg_height + self.table_thickness,
            edge_anchor_x: self.inner_table_width / 2.0 - self.edge_anchor_inset,
            edge_anchor_y: self.inner_table_depth / 2.0,
            aisle_gap_center_x: self.inner_table_width / 2.0 + self.aisle_gap / 2.0,
            seam_gap_center_y: 0.0,
            perimeter_aisle_center_x: assembly_half_width + self.perimeter_aisle_width / 2.0,
            suspension_z,
            suspended_base_z: suspension_z - self.strut_length,
            base: self.clone(),
        })
    }
}

/// Validated base lengths plus everything derived from them
///
/// All offsets are relative to the workcell centre on the floor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDimensions {
    pub base: DimensionSet,
    /// X centre of the right outer tables (left ones mirror it)
    pub outer_table_x: f32,
    pub front_table_y: f32,
    pub back_table_y: f32,
    /// Centre to the outer edge of the outer tables
    pub assembly_half_width: f32,
    /// Front edge to back edge of a front/back table pair
    pub assembly_depth: f32,
    /// Height of the table tops
    pub surface_z: f32,
    /// |X| of the inboard anchor line on the inner tables
    pub edge_anchor_x: f32,
    pub edge_anchor_y: f32,
    /// |X| of the aisle between inner and outer tables
    pub aisle_gap_center_x: f32,
    pub seam_gap_center_y: f32,
    /// |X| of the walkway centre outside the table assembly
    pub perimeter_aisle_center_x: f32,
    /// Underside of the gantry beams
    pub suspension_z: f32,
    /// Base height of a robot hanging from a drop strut
    pub suspended_base_z: f32,
}

impl ResolvedDimensions {
    pub fn assembly_width(&self) -> f32 {
        self.assembly_half_width * 2.0
    }
}
