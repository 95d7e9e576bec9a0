//! In-memory scene backend
//!
//! Records every node the layout asks for so a build can be inspected or
//! written out as a manifest without a renderer. Mesh imports parse the real
//! files: one node per COLLADA geometry, per OBJ model, or per STL file.

use std::collections::BTreeMap;
use std::io::BufReader;
use std::f32::consts::FRAC_PI_2;
use std::path::{Path, PathBuf};

use dae_parser::{Document, Geometry, UpAxis};
use glam::Mat4;
use serde::Serialize;

use crate::assets::MeshFormat;
use crate::collaborator::{BackendError, ImportedNode, SceneBackend};
use crate::materials::MaterialDef;
use crate::types::{Pose, PrimitiveShape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeHandle(pub u32);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeKind {
    Primitive(PrimitiveShape),
    Empty,
    Mesh {
        source: PathBuf,
        /// `None` for COLLADA, which is not tessellated here
        triangles: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedNode {
    pub handle: NodeHandle,
    pub name: String,
    pub kind: NodeKind,
    /// World transform until parented, parent-relative after
    pub transform: Pose,
    pub footprint: Option<[f32; 3]>,
    pub parent: Option<NodeHandle>,
    pub material: Option<String>,
    pub unit_normalized: bool,
}

/// Scene backend that keeps nodes in a flat list
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordingBackend {
    nodes: Vec<RecordedNode>,
    materials: BTreeMap<String, MaterialDef>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[RecordedNode] {
        &self.nodes
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&RecordedNode> {
        self.nodes.get(handle.0 as usize)
    }

    pub fn find(&self, name: &str) -> Option<&RecordedNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn children(&self, parent: NodeHandle) -> impl Iterator<Item = &RecordedNode> {
        self.nodes.iter().filter(move |n| n.parent == Some(parent))
    }

    /// Materials assigned so far, keyed by name
    pub fn materials(&self) -> &BTreeMap<String, MaterialDef> {
        &self.materials
    }

    /// Compose a node's transform with all of its parents
    pub fn world_transform(&self, handle: NodeHandle) -> Option<Mat4> {
        let mut node = self.node(handle)?;
        let mut world = node.transform.to_mat4();
        let mut hops = 0;
        while let Some(parent) = node.parent {
            hops += 1;
            if hops > self.nodes.len() {
                return None;
            }
            node = self.node(parent)?;
            world = node.transform.to_mat4() * world;
        }
        Some(world)
    }

    fn push(&mut self, name: &str, kind: NodeKind, transform: Pose, footprint: Option<[f32; 3]>) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len() as u32);
        self.nodes.push(RecordedNode {
            handle,
            name: name.to_string(),
            kind,
            transform,
            footprint,
            parent: None,
            material: None,
            unit_normalized: false,
        });
        handle
    }

    fn mesh_node(
        &mut self,
        name: &str,
        source: &Path,
        triangles: Option<usize>,
        native_transform: Pose,
    ) -> ImportedNode<NodeHandle> {
        let kind = NodeKind::Mesh {
            source: source.to_path_buf(),
            triangles,
        };
        ImportedNode {
            handle: self.push(name, kind, native_transform, None),
            native_transform,
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
        .to_string()
}

fn load_error(path: &Path, reason: impl ToString) -> BackendError {
    BackendError::MeshLoad {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Rotation that brings a document's up axis onto +Z
fn up_axis_transform(up: &UpAxis) -> Pose {
    match up {
        UpAxis::XUp => Pose::new([0.0; 3], [0.0, -FRAC_PI_2, 0.0]),
        UpAxis::YUp => Pose::new([0.0; 3], [FRAC_PI_2, 0.0, 0.0]),
        UpAxis::ZUp => Pose::IDENTITY,
    }
}

/// Geometry names and the document's native transform
fn load_collada_geometries(path: &Path) -> Result<(Vec<String>, Pose), BackendError> {
    let doc = Document::from_file(path).map_err(|e| load_error(path, format!("{e:?}")))?;
    let native = up_axis_transform(&doc.asset.up_axis);

    let names = doc
        .iter::<Geometry>()
        .enumerate()
        .map(|(i, geometry)| {
            geometry
                .name
                .clone()
                .or_else(|| geometry.id.clone())
                .unwrap_or_else(|| format!("{}_{i}", file_stem(path)))
        })
        .collect();
    Ok((names, native))
}

fn count_stl_triangles(path: &Path) -> Result<usize, BackendError> {
    let file = std::fs::File::open(path).map_err(|e| load_error(path, e))?;
    let mut reader = BufReader::new(file);
    let mesh = stl_io::read_stl(&mut reader).map_err(|e| load_error(path, e))?;
    Ok(mesh.faces.len())
}

fn load_obj_models(path: &Path) -> Result<Vec<(String, usize)>, BackendError> {
    let options = tobj::LoadOptions {
        triangulate: true,
        ..Default::default()
    };
    let (models, _materials) = tobj::load_obj(path, &options).map_err(|e| load_error(path, e))?;

    Ok(models
        .into_iter()
        .map(|model| {
            let name = if model.name.is_empty() {
                file_stem(path)
            } else {
                model.name
            };
            (name, model.mesh.indices.len() / 3)
        })
        .collect())
}

impl SceneBackend for RecordingBackend {
    type Handle = NodeHandle;

    fn create_primitive(
        &mut self,
        name: &str,
        shape: PrimitiveShape,
        transform: &Pose,
        footprint: [f32; 3],
    ) -> NodeHandle {
        self.push(name, NodeKind::Primitive(shape), *transform, Some(footprint))
    }

    fn create_empty(&mut self, name: &str, transform: &Pose) -> NodeHandle {
        self.push(name, NodeKind::Empty, *transform, None)
    }

    fn import_mesh_asset(&mut self, path: &Path) -> Result<Vec<ImportedNode<NodeHandle>>, BackendError> {
        if !path.is_file() {
            return Err(BackendError::MeshNotFound {
                path: path.to_path_buf(),
            });
        }

        let Some(format) = MeshFormat::from_extension(path) else {
            return Err(BackendError::UnsupportedFormat(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_string(),
            ));
        };

        let nodes: Vec<_> = match format {
            MeshFormat::Collada => {
                let (geometries, native) = load_collada_geometries(path)?;
                geometries
                    .iter()
                    .map(|name| self.mesh_node(name, path, None, native))
                    .collect()
            }
            MeshFormat::Stl => {
                let triangles = count_stl_triangles(path)?;
                vec![self.mesh_node(&file_stem(path), path, Some(triangles), Pose::IDENTITY)]
            }
            MeshFormat::Obj => load_obj_models(path)?
                .into_iter()
                .map(|(name, triangles)| self.mesh_node(&name, path, Some(triangles), Pose::IDENTITY))
                .collect(),
        };

        tracing::debug!(
            "Imported {} node(s) from {:?} ({})",
            nodes.len(),
            path,
            format.as_str()
        );
        Ok(nodes)
    }

    fn apply_unit_scale_normalization(&mut self, handle: NodeHandle) {
        if let Some(node) = self.nodes.get_mut(handle.0 as usize) {
            node.unit_normalized = true;
        }
    }

    fn parent_to(&mut self, child: NodeHandle, parent: NodeHandle) {
        if let Some(node) = self.nodes.get_mut(child.0 as usize) {
            node.parent = Some(parent);
        }
    }

    fn assign_material(&mut self, handle: NodeHandle, material: &MaterialDef) {
        if let Some(node) = self.nodes.get_mut(handle.0 as usize) {
            node.material = Some(material.name.clone());
            self.materials
                .entry(material.name.clone())
                .or_insert_with(|| material.clone());
        }
    }
}
