//! Workcell Layout Core
//!
//! This crate computes the spatial layout of a multi-robot optics-table workcell:
//! - Dimensions: base table/gantry parameters and their derived offsets
//! - Kinematics: robot-arm frame trees composed from a static joint table
//! - Gantry / Workcell: tables, overhead frame, drop struts and robot anchors
//! - Accessory: reach spheres and proportional human proxies
//! - Scene: several workcells plus gap-anchored human proxies
//! - Collaborator: the boundary that hands resolved placements to a renderer

pub mod accessory;
pub mod assets;
pub mod collaborator;
pub mod config;
pub mod dimensions;
pub mod error;
pub mod gantry;
pub mod kinematics;
pub mod materials;
pub mod recording;
pub mod scene;
pub mod types;
pub mod workcell;

pub use accessory::*;
pub use assets::*;
pub use collaborator::*;
pub use config::*;
pub use dimensions::*;
pub use error::*;
pub use gantry::*;
pub use kinematics::*;
pub use materials::*;
pub use recording::*;
pub use scene::*;
pub use types::*;
pub use workcell::*;
