//! Frame tree storage and structural queries

use glam::{Mat4, Vec3};
use serde::Serialize;
use uuid::Uuid;

use crate::assets::MeshRef;
use crate::error::LayoutError;
use crate::types::Pose;

/// A node in a rigid-transform tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Stable id derived from the frame name
    pub id: Uuid,
    pub name: String,
    /// Link name from the joint table
    pub link: &'static str,
    /// Index of the parent frame in the owning tree
    pub parent: Option<usize>,
    /// Transform relative to the parent (world for the root)
    pub local: Pose,
    pub world: Mat4,
    pub visual: Option<MeshRef>,
}

impl Frame {
    pub fn world_position(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Immutable frame tree of one robot instance
///
/// Frames are stored so that every parent precedes its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameTree {
    name: String,
    frames: Vec<Frame>,
}

impl FrameTree {
    pub(crate) fn new(name: impl Into<String>, frames: Vec<Frame>) -> Self {
        Self {
            name: name.into(),
            frames,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn root(&self) -> Option<&Frame> {
        self.frames.first()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Find a frame by its link name
    pub fn link(&self, link: &str) -> Option<&Frame> {
        self.frames.iter().find(|f| f.link == link)
    }

    /// Indices of the direct children of `index`
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.frames
            .iter()
            .enumerate()
            .filter(move |(_, f)| f.parent == Some(index))
            .map(|(i, _)| i)
    }

    /// Walk from `index` towards the root (excluding `index` itself)
    pub fn ancestors(&self, index: usize) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.frames.get(index).and_then(|f| f.parent),
            remaining: self.frames.len(),
        }
    }

    /// Number of parent hops from `index` to the root
    pub fn depth(&self, index: usize) -> usize {
        self.ancestors(index).count()
    }

    /// Check the single-root, acyclic parent structure
    pub fn validate(&self) -> Result<(), LayoutError> {
        let roots = self.frames.iter().filter(|f| f.is_root()).count();
        if roots != 1 || self.root().is_some_and(|f| !f.is_root()) {
            return Err(LayoutError::InvalidJointTable(format!(
                "{}: expected exactly one root at index 0, found {}",
                self.name, roots
            )));
        }

        for (index, frame) in self.frames.iter().enumerate() {
            if let Some(parent) = frame.parent
                && parent >= index
            {
                return Err(LayoutError::InvalidJointTable(format!(
                    "{}: frame {} has parent {} that does not precede it",
                    self.name, frame.name, parent
                )));
            }
            if self.would_cycle(index) {
                return Err(LayoutError::InvalidJointTable(format!(
                    "{}: frame {} is part of a cycle",
                    self.name, frame.name
                )));
            }
        }
        Ok(())
    }

    /// Check if walking up from `index` ever returns to it
    fn would_cycle(&self, index: usize) -> bool {
        let mut current = self.frames.get(index).and_then(|f| f.parent);
        let mut steps = 0;
        while let Some(id) = current {
            if id == index || steps > self.frames.len() {
                return true;
            }
            current = self.frames.get(id).and_then(|f| f.parent);
            steps += 1;
        }
        false
    }
}

/// Iterator over the ancestors of a frame
pub struct Ancestors<'a> {
    tree: &'a FrameTree,
    current: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Frame;

    fn next(&mut self) -> Option<Self::Item> {
        // Bounded by the frame count so a malformed tree cannot loop forever
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let frame = self.tree.frames.get(self.current?)?;
        self.current = frame.parent;
        Some(frame)
    }
}
