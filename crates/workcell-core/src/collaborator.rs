//! Rendering collaborator boundary
//!
//! The layout core never touches a scene graph directly. A [`SceneBackend`]
//! turns resolved placements and frame trees into whatever the host renderer
//! uses; [`realize_scene`] drives it.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::assets::AssetLibrary;
use crate::kinematics::FrameTree;
use crate::materials::{MaterialDef, MaterialRegistry};
use crate::scene::Scene;
use crate::types::{PlacementRecord, Pose, PrimitiveShape};

/// A node created by importing an external mesh file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportedNode<H> {
    pub handle: H,
    /// Transform baked into the asset; stays the node's transform relative
    /// to the frame it is parented to
    pub native_transform: Pose,
}

/// Errors reported by a backend while importing assets
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("Mesh not found: {}", path.display())]
    MeshNotFound { path: PathBuf },

    #[error("Unsupported mesh format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to load mesh {}: {reason}", path.display())]
    MeshLoad { path: PathBuf, reason: String },
}

/// Host scene graph operations needed to realize a layout
///
/// Every call names the node it acts on; there is no implicit selection.
pub trait SceneBackend {
    type Handle: Copy + Debug;

    /// Instantiate a primitive sized to `footprint` at a world transform
    fn create_primitive(
        &mut self,
        name: &str,
        shape: PrimitiveShape,
        transform: &Pose,
        footprint: [f32; 3],
    ) -> Self::Handle;

    /// Instantiate a transform-only node
    fn create_empty(&mut self, name: &str, transform: &Pose) -> Self::Handle;

    /// Import a mesh file; an empty list means the file held nothing usable
    fn import_mesh_asset(
        &mut self,
        path: &Path,
    ) -> Result<Vec<ImportedNode<Self::Handle>>, BackendError>;

    /// Convert the imported node's native units to metres
    fn apply_unit_scale_normalization(&mut self, handle: Self::Handle);

    /// Make `child`'s transform relative to `parent`
    fn parent_to(&mut self, child: Self::Handle, parent: Self::Handle);

    fn assign_material(&mut self, handle: Self::Handle, material: &MaterialDef);
}

/// What a realization pass produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RealizeReport {
    pub primitives: usize,
    pub frames: usize,
    /// Mesh files that yielded at least one node
    pub meshes_imported: usize,
    /// Mesh files that were missing, unreadable or empty
    pub meshes_skipped: usize,
}

impl RealizeReport {
    fn absorb(&mut self, other: RealizeReport) {
        self.primitives += other.primitives;
        self.frames += other.frames;
        self.meshes_imported += other.meshes_imported;
        self.meshes_skipped += other.meshes_skipped;
    }
}

/// Hand a whole scene to `backend`
///
/// Mesh problems are logged and counted; they never stop the pass or change
/// the frame hierarchy.
pub fn realize_scene<B: SceneBackend>(
    scene: &Scene,
    backend: &mut B,
    assets: &AssetLibrary,
) -> RealizeReport {
    let mut report = RealizeReport::default();

    for placement in scene.placements() {
        realize_placement(placement, &scene.materials, backend);
        report.primitives += 1;
    }

    for robot in scene.robots() {
        report.absorb(realize_robot(robot, backend, assets));
    }

    tracing::info!(
        "Realized scene: {} primitives, {} frames, {} meshes imported, {} skipped",
        report.primitives,
        report.frames,
        report.meshes_imported,
        report.meshes_skipped
    );
    report
}

fn realize_placement<B: SceneBackend>(
    placement: &PlacementRecord,
    materials: &MaterialRegistry,
    backend: &mut B,
) {
    let handle = backend.create_primitive(
        &placement.name,
        placement.shape,
        &placement.transform,
        placement.footprint,
    );
    match materials.get(placement.material) {
        Some(material) => backend.assign_material(handle, material),
        None => tracing::warn!(
            "Placement {} refers to unknown material {:?}",
            placement.name,
            placement.material
        ),
    }
}

/// One empty per frame, parented as in the tree, with visual meshes attached
pub fn realize_robot<B: SceneBackend>(
    robot: &FrameTree,
    backend: &mut B,
    assets: &AssetLibrary,
) -> RealizeReport {
    let mut report = RealizeReport::default();
    let mut handles: Vec<B::Handle> = Vec::with_capacity(robot.len());

    for frame in robot.frames() {
        let handle = backend.create_empty(&frame.name, &frame.local);
        if let Some(parent) = frame.parent.and_then(|p| handles.get(p)) {
            backend.parent_to(handle, *parent);
        }
        handles.push(handle);
        report.frames += 1;

        let Some(mesh) = frame.visual else {
            continue;
        };
        let path = assets.resolve(&mesh);
        match backend.import_mesh_asset(&path) {
            Ok(nodes) if nodes.is_empty() => {
                tracing::warn!("Mesh {:?} for {} imported no nodes", path, frame.name);
                report.meshes_skipped += 1;
            }
            Ok(nodes) => {
                for node in &nodes {
                    backend.parent_to(node.handle, handle);
                    backend.apply_unit_scale_normalization(node.handle);
                    tracing::trace!(
                        "{:?} under {} keeps native transform {:?}",
                        node.handle,
                        frame.name,
                        node.native_transform
                    );
                }
                tracing::debug!("Attached {} node(s) from {:?} to {}", nodes.len(), path, frame.name);
                report.meshes_imported += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping visual for {}: {}", frame.name, e);
                report.meshes_skipped += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::build_robot_arm;

    /// Backend that only counts calls and fails every import
    #[derive(Default)]
    struct CountingBackend {
        next: u32,
        parented: Vec<(u32, u32)>,
        materials: usize,
    }

    impl SceneBackend for CountingBackend {
        type Handle = u32;

        fn create_primitive(
            &mut self,
            _name: &str,
            _shape: PrimitiveShape,
            _transform: &Pose,
            _footprint: [f32; 3],
        ) -> u32 {
            self.next += 1;
            self.next
        }

        fn create_empty(&mut self, _name: &str, _transform: &Pose) -> u32 {
            self.next += 1;
            self.next
        }

        fn import_mesh_asset(&mut self, path: &Path) -> Result<Vec<ImportedNode<u32>>, BackendError> {
            Err(BackendError::MeshNotFound {
                path: path.to_path_buf(),
            })
        }

        fn apply_unit_scale_normalization(&mut self, _handle: u32) {}

        fn parent_to(&mut self, child: u32, parent: u32) {
            self.parented.push((child, parent));
        }

        fn assign_material(&mut self, _handle: u32, _material: &MaterialDef) {
            self.materials += 1;
        }
    }

    #[test]
    fn test_missing_meshes_keep_hierarchy() {
        let arm = build_robot_arm("r", Pose::IDENTITY).expect("valid");
        let mut backend = CountingBackend::default();
        let report = realize_robot(&arm, &mut backend, &AssetLibrary::with_root("/nonexistent"));

        assert_eq!(report.frames, 11);
        assert_eq!(report.meshes_skipped, 11);
        assert_eq!(report.meshes_imported, 0);

        // Every non-root frame parented to the handle of its tree parent
        assert_eq!(backend.parented.len(), 10);
        for (index, frame) in arm.frames().iter().enumerate().skip(1) {
            let child = index as u32 + 1;
            let parent = frame.parent.expect("child") as u32 + 1;
            assert!(backend.parented.contains(&(child, parent)));
        }
    }

    #[test]
    fn test_backend_error_messages() {
        let err = BackendError::MeshNotFound {
            path: PathBuf::from("meshes/link0.dae"),
        };
        assert_eq!(err.to_string(), "Mesh not found: meshes/link0.dae");

        let err = BackendError::MeshLoad {
            path: PathBuf::from("a.stl"),
            reason: "truncated".to_string(),
        };
        assert!(err.to_string().contains("truncated"));
    }
}
