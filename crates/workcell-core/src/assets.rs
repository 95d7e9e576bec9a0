//! Visual mesh references and asset path resolution

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Which asset directory a mesh lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssetGroup {
    Arm,
    Hand,
}

/// Visual mesh attached to a kinematic frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MeshRef {
    pub group: AssetGroup,
    pub file: &'static str,
}

impl MeshRef {
    pub const fn arm(file: &'static str) -> Self {
        Self {
            group: AssetGroup::Arm,
            file,
        }
    }

    pub const fn hand(file: &'static str) -> Self {
        Self {
            group: AssetGroup::Hand,
            file,
        }
    }
}

/// Where the robot description meshes are found on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetLibrary {
    pub root: PathBuf,
    /// Arm link meshes, relative to `root`
    pub arm_dir: PathBuf,
    /// Gripper meshes, relative to `root`
    pub hand_dir: PathBuf,
}

impl Default for AssetLibrary {
    fn default() -> Self {
        Self {
            root: PathBuf::from("franka_description/meshes"),
            arm_dir: PathBuf::from("robot_arms/fr3/visual"),
            hand_dir: PathBuf::from("robot_ee/franka_hand_white/visual"),
        }
    }
}

impl AssetLibrary {
    /// Default layout under a different root
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Full path of a mesh reference
    pub fn resolve(&self, mesh: &MeshRef) -> PathBuf {
        let dir = match mesh.group {
            AssetGroup::Arm => &self.arm_dir,
            AssetGroup::Hand => &self.hand_dir,
        };
        self.root.join(dir).join(mesh.file)
    }
}

/// Mesh file formats the recording backend can probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Collada,
    Stl,
    Obj,
}

impl MeshFormat {
    /// `None` for extensions no loader handles
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "dae" => Some(Self::Collada),
            "stl" => Some(Self::Stl),
            "obj" => Some(Self::Obj),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collada => "collada",
            Self::Stl => "stl",
            Self::Obj => "obj",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_paths() {
        let library = AssetLibrary::with_root("/opt/meshes");
        assert_eq!(
            library.resolve(&MeshRef::arm("link3.dae")),
            PathBuf::from("/opt/meshes/robot_arms/fr3/visual/link3.dae")
        );
        assert_eq!(
            library.resolve(&MeshRef::hand("finger.dae")),
            PathBuf::from("/opt/meshes/robot_ee/franka_hand_white/visual/finger.dae")
        );
    }

    #[test]
    fn test_mesh_format_by_extension() {
        assert_eq!(
            MeshFormat::from_extension(Path::new("a/link0.DAE")),
            Some(MeshFormat::Collada)
        );
        assert_eq!(MeshFormat::from_extension(Path::new("part.stl")), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_extension(Path::new("part.obj")), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_extension(Path::new("part.glb")), None);
        assert_eq!(MeshFormat::from_extension(Path::new("README")), None);
    }
}
