//! Material definitions and the explicit lookup-or-create registry

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Index of a material inside a [`MaterialRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub(crate) usize);

impl MaterialId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Surface description handed to the collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDef {
    pub name: String,
    /// Base colour (RGBA); alpha below 1 marks a translucent envelope
    pub color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub specular: f32,
}

impl MaterialDef {
    pub fn new(name: impl Into<String>, color: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            color,
            metallic: 0.0,
            roughness: 0.5,
            specular: 0.5,
        }
    }

    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_specular(mut self, specular: f32) -> Self {
        self.specular = specular;
        self
    }

    pub fn is_translucent(&self) -> bool {
        self.color[3] < 1.0
    }
}

/// The facility's material palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finish {
    /// Anodised aluminium for gantry profiles and struts
    Profile,
    TableTop,
    /// Matte black breadboard holes
    Holes,
    /// Translucent blue robot reach envelope
    RobotReach,
    Skin,
    Shirt,
    Pants,
    /// Translucent orange human reach envelope
    HumanReach,
}

impl Finish {
    /// Registry key for this finish
    pub fn key(&self) -> &'static str {
        match self {
            Finish::Profile => "profile_aluminium",
            Finish::TableTop => "table_top",
            Finish::Holes => "table_holes",
            Finish::RobotReach => "robot_reach",
            Finish::Skin => "human_skin",
            Finish::Shirt => "human_shirt",
            Finish::Pants => "human_pants",
            Finish::HumanReach => "human_reach",
        }
    }

    pub fn definition(&self) -> MaterialDef {
        let name = self.key();
        match self {
            Finish::Profile => MaterialDef::new(name, [0.7, 0.7, 0.75, 1.0])
                .with_metallic(0.9)
                .with_roughness(0.3),
            Finish::TableTop => MaterialDef::new(name, [0.8, 0.8, 0.8, 1.0])
                .with_metallic(0.8)
                .with_roughness(0.4),
            Finish::Holes => MaterialDef::new(name, [0.0, 0.0, 0.0, 1.0])
                .with_roughness(1.0)
                .with_specular(0.0),
            Finish::RobotReach => {
                MaterialDef::new(name, [0.0, 0.5, 1.0, 0.15]).with_roughness(0.1)
            }
            Finish::Skin => MaterialDef::new(name, [0.8, 0.6, 0.4, 1.0]),
            Finish::Shirt => MaterialDef::new(name, [0.2, 0.2, 0.8, 1.0]),
            Finish::Pants => MaterialDef::new(name, [0.1, 0.1, 0.1, 1.0]),
            Finish::HumanReach => {
                MaterialDef::new(name, [1.0, 0.5, 0.0, 0.15]).with_roughness(0.1)
            }
        }
    }
}

/// Name-keyed material store passed by reference into the builders
#[derive(Debug, Clone, Default)]
pub struct MaterialRegistry {
    materials: Vec<MaterialDef>,
    by_name: HashMap<String, MaterialId>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the material called `name`, creating it with `create` on first use
    pub fn get_or_insert_with(
        &mut self,
        name: &str,
        create: impl FnOnce() -> MaterialDef,
    ) -> MaterialId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }

        let mut material = create();
        material.name = name.to_string();

        let id = MaterialId(self.materials.len());
        self.materials.push(material);
        self.by_name.insert(name.to_string(), id);
        tracing::trace!("Registered material {}", name);
        id
    }

    /// Lookup-or-create a palette entry
    pub fn finish(&mut self, finish: Finish) -> MaterialId {
        self.get_or_insert_with(finish.key(), || finish.definition())
    }

    pub fn get(&self, id: MaterialId) -> Option<&MaterialDef> {
        self.materials.get(id.0)
    }

    pub fn find(&self, name: &str) -> Option<MaterialId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Materials in registration order
    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &MaterialDef)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(index, material)| (MaterialId(index), material))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_or_create_dedupes() {
        let mut registry = MaterialRegistry::new();
        let a = registry.finish(Finish::Profile);
        let b = registry.finish(Finish::Profile);
        let c = registry.finish(Finish::TableTop);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find("profile_aluminium"), Some(a));
        assert_eq!(registry.get(c).map(|m| m.metallic), Some(0.8));
    }

    #[test]
    fn test_first_definition_wins() {
        let mut registry = MaterialRegistry::new();
        let id = registry.get_or_insert_with("custom", || MaterialDef::new("x", [1.0; 4]));
        let again =
            registry.get_or_insert_with("custom", || MaterialDef::new("y", [0.0, 0.0, 0.0, 1.0]));

        assert_eq!(id, again);
        let material = registry.get(id).expect("registered");
        assert_eq!(material.name, "custom");
        assert_eq!(material.color, [1.0; 4]);
    }

    #[test]
    fn test_reach_finishes_are_translucent() {
        assert!(Finish::RobotReach.definition().is_translucent());
        assert!(Finish::HumanReach.definition().is_translucent());
        assert!(!Finish::Profile.definition().is_translucent());
    }

    #[test]
    fn test_iter_in_registration_order() {
        let mut registry = MaterialRegistry::new();
        registry.finish(Finish::Skin);
        registry.finish(Finish::Shirt);

        let names: Vec<&str> = registry.iter().map(|(_, m)| m.name.as_str()).collect();
        assert_eq!(names, vec!["human_skin", "human_shirt"]);
    }
}
