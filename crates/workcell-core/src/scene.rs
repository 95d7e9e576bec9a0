//! Scene assembler: several workcells plus human proxies in the aisles

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::accessory::{HumanProxy, REFERENCE_HEIGHT};
use crate::dimensions::DimensionSet;
use crate::error::LayoutError;
use crate::kinematics::FrameTree;
use crate::materials::MaterialRegistry;
use crate::types::PlacementRecord;
use crate::workcell::{Workcell, WorkcellConfig, build_workcell};

/// Where one cell goes and how it is mounted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellPlacement {
    pub origin: [f32; 3],
    pub cell_index: u32,
    pub config: WorkcellConfig,
}

impl CellPlacement {
    pub fn new(origin: [f32; 3], cell_index: u32, config: WorkcellConfig) -> Self {
        Self {
            origin,
            cell_index,
            config,
        }
    }
}

/// How human proxies are distributed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanPlan {
    /// Heights handed out in turn to successive proxies
    pub heights: Vec<f32>,
    /// Y offset of the proxies from their cell centre
    pub aisle_y: f32,
    /// Put a proxy in the walkway between adjacent cells
    pub walkway_proxies: bool,
    /// Also stand proxies in the gaps between inner and outer tables
    pub inner_aisle_proxies: bool,
}

impl Default for HumanPlan {
    fn default() -> Self {
        Self {
            heights: vec![1.75, 1.85, 1.65, 1.70],
            aisle_y: 0.0,
            walkway_proxies: true,
            inner_aisle_proxies: false,
        }
    }
}

impl HumanPlan {
    fn height(&self, n: usize) -> f32 {
        if self.heights.is_empty() {
            REFERENCE_HEIGHT
        } else {
            self.heights[n % self.heights.len()]
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneOptions {
    pub dimensions: DimensionSet,
    pub humans: HumanPlan,
}

/// Which side of a cell a perimeter aisle lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    /// −X
    Left,
    /// +X
    Right,
}

impl Side {
    pub fn sign(&self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    /// Yaw that faces the proxy along the aisle
    pub fn facing_yaw(&self) -> f32 {
        match self {
            Side::Left => 0.0,
            Side::Right => std::f32::consts::PI,
        }
    }
}

/// What a human proxy's position was derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ProxyAnchor {
    /// Walkway strip beside the table assembly of a cell
    PerimeterAisle { cell_index: u32, side: Side },
    /// Gap between the inner tables and the outer tables of a cell
    InnerAisle { cell_index: u32, side: Side },
    /// Midway between two neighbouring cells
    Walkway { between: (u32, u32) },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedHuman {
    pub anchor: ProxyAnchor,
    pub proxy: HumanProxy,
}

/// Everything one build produces
#[derive(Debug, Clone)]
pub struct Scene {
    pub cells: Vec<Workcell>,
    pub humans: Vec<PlacedHuman>,
    pub materials: MaterialRegistry,
}

impl Scene {
    /// Every placement record, cells first
    pub fn placements(&self) -> impl Iterator<Item = &PlacementRecord> {
        self.cells
            .iter()
            .flat_map(|cell| cell.placements.iter())
            .chain(self.humans.iter().flat_map(|h| h.proxy.placements()))
    }

    pub fn robots(&self) -> impl Iterator<Item = &FrameTree> {
        self.cells.iter().flat_map(|cell| cell.robots.iter())
    }

    pub fn cell(&self, cell_index: u32) -> Option<&Workcell> {
        self.cells.iter().find(|c| c.cell_index == cell_index)
    }

    /// X of every aisle-anchored proxy, in placement order
    pub fn gap_anchored_x(&self) -> Vec<f32> {
        self.humans
            .iter()
            .filter(|h| matches!(h.anchor, ProxyAnchor::PerimeterAisle { .. }))
            .map(|h| h.proxy.location.x)
            .collect()
    }
}

/// Build every cell, then populate the aisles
pub fn assemble_scene(cells: &[CellPlacement], options: &SceneOptions) -> Result<Scene, LayoutError> {
    let dims = options.dimensions.resolve()?;
    let plan = &options.humans;
    let mut materials = MaterialRegistry::new();

    let mut workcells = Vec::with_capacity(cells.len());
    for placement in cells {
        if workcells
            .iter()
            .any(|c: &Workcell| c.cell_index == placement.cell_index)
        {
            tracing::warn!(
                "Cell index {} used more than once; placement names will repeat",
                placement.cell_index
            );
        }
        workcells.push(build_workcell(
            Vec3::from(placement.origin),
            placement.cell_index,
            placement.config,
            &options.dimensions,
            &mut materials,
        )?);
    }

    let mut humans = Vec::new();
    let mut place = |anchor: ProxyAnchor, location: Vec3, yaw: f32| {
        let n = humans.len();
        let height = plan.height(n);
        let proxy = HumanProxy::build(
            format!("human{}_{height:.2}m", n + 1),
            location,
            height,
            yaw,
            &mut materials,
        )?;
        humans.push(PlacedHuman { anchor, proxy });
        Ok::<_, LayoutError>(())
    };

    // Aisles run along Y through the seam between front and back tables
    let aisle_y = dims.seam_gap_center_y + plan.aisle_y;

    for cell in &workcells {
        for side in [Side::Left, Side::Right] {
            let location = cell.origin
                + Vec3::new(side.sign() * dims.perimeter_aisle_center_x, aisle_y, 0.0);
            place(
                ProxyAnchor::PerimeterAisle {
                    cell_index: cell.cell_index,
                    side,
                },
                location,
                side.facing_yaw(),
            )?;
        }
    }

    if plan.walkway_proxies {
        let mut by_x: Vec<&Workcell> = workcells.iter().collect();
        by_x.sort_by(|a, b| a.origin.x.total_cmp(&b.origin.x));

        for pair in by_x.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let midpoint = (a.origin + b.origin) / 2.0;
            place(
                ProxyAnchor::Walkway {
                    between: (a.cell_index, b.cell_index),
                },
                midpoint + Vec3::new(0.0, aisle_y, 0.0),
                0.0,
            )?;
        }
    }

    if plan.inner_aisle_proxies {
        for cell in &workcells {
            for side in [Side::Left, Side::Right] {
                let location = cell.origin
                    + Vec3::new(side.sign() * dims.aisle_gap_center_x, aisle_y, 0.0);
                place(
                    ProxyAnchor::InnerAisle {
                        cell_index: cell.cell_index,
                        side,
                    },
                    location,
                    side.facing_yaw(),
                )?;
            }
        }
    }

    let scene = Scene {
        cells: workcells,
        humans,
        materials,
    };
    tracing::info!(
        "Assembled scene: {} cells, {} robots, {} humans, {} placements",
        scene.cells.len(),
        scene.robots().count(),
        scene.humans.len(),
        scene.placements().count()
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::ARM_FRAME_COUNT;
    use crate::materials::Finish;
    use approx::assert_abs_diff_eq;

    fn reference_cells() -> Vec<CellPlacement> {
        vec![
            CellPlacement::new([-2.5, 0.0, 0.0], 1, WorkcellConfig::Mixed),
            CellPlacement::new([2.5, 0.0, 0.0], 2, WorkcellConfig::AllSuspended),
        ]
    }

    #[test]
    fn test_gap_anchored_proxies() {
        let scene = assemble_scene(&reference_cells(), &SceneOptions::default()).expect("valid");

        let xs = scene.gap_anchored_x();
        assert_eq!(xs.len(), 4);
        for (x, expected) in xs.iter().zip([-4.70, -0.30, 0.30, 4.70]) {
            assert_abs_diff_eq!(*x, expected, epsilon = 1e-5);
        }

        let yaws: Vec<f32> = scene.humans.iter().take(4).map(|h| h.proxy.yaw).collect();
        assert_eq!(yaws, vec![0.0, std::f32::consts::PI, 0.0, std::f32::consts::PI]);
    }

    #[test]
    fn test_walkway_proxy_between_cells() {
        // Out of order on purpose; walkway pairs follow X
        let cells = vec![
            CellPlacement::new([2.5, 0.0, 0.0], 2, WorkcellConfig::AllSuspended),
            CellPlacement::new([-2.5, 0.0, 0.0], 1, WorkcellConfig::Mixed),
        ];
        let scene = assemble_scene(&cells, &SceneOptions::default()).expect("valid");

        let walkway = scene.humans.last().expect("walkway proxy");
        assert_eq!(walkway.anchor, ProxyAnchor::Walkway { between: (1, 2) });
        assert!(walkway.proxy.location.abs_diff_eq(Vec3::ZERO, 1e-6));
        assert_eq!(scene.humans.len(), 5);
    }

    #[test]
    fn test_heights_cycle() {
        let scene = assemble_scene(&reference_cells(), &SceneOptions::default()).expect("valid");
        let heights: Vec<f32> = scene.humans.iter().map(|h| h.proxy.height).collect();
        assert_eq!(heights, vec![1.75, 1.85, 1.65, 1.70, 1.75]);
        assert_eq!(scene.humans[0].proxy.name, "human1_1.75m");
        assert_eq!(scene.humans[4].proxy.name, "human5_1.75m");
    }

    #[test]
    fn test_aisle_y_and_no_walkway() {
        let options = SceneOptions {
            humans: HumanPlan {
                heights: vec![1.8],
                aisle_y: 1.0,
                walkway_proxies: false,
                inner_aisle_proxies: false,
            },
            ..SceneOptions::default()
        };
        let scene = assemble_scene(&reference_cells(), &options).expect("valid");

        assert_eq!(scene.humans.len(), 4);
        assert!(scene.humans.iter().all(|h| h.proxy.location.y == 1.0));
        assert!(scene.humans.iter().all(|h| h.proxy.height == 1.8));
    }

    #[test]
    fn test_counts_and_shared_materials() {
        let scene = assemble_scene(&reference_cells(), &SceneOptions::default()).expect("valid");

        assert_eq!(scene.cells.len(), 2);
        assert_eq!(scene.robots().count(), 12);
        assert!(scene.robots().all(|r| r.len() == ARM_FRAME_COUNT));
        assert_eq!(scene.placements().count(), 51 + 57 + 5 * 7);

        // One registry entry per finish across both cells and all proxies
        assert_eq!(scene.materials.len(), 8);
        assert!(scene.materials.find(Finish::HumanReach.key()).is_some());
        assert_eq!(scene.cell(2).map(|c| c.config), Some(WorkcellConfig::AllSuspended));
    }

    #[test]
    fn test_inner_aisle_proxies() {
        let options = SceneOptions {
            humans: HumanPlan {
                walkway_proxies: false,
                inner_aisle_proxies: true,
                ..HumanPlan::default()
            },
            ..SceneOptions::default()
        };
        let scene = assemble_scene(&reference_cells(), &options).expect("valid");
        assert_eq!(scene.humans.len(), 8);

        let inner: Vec<f32> = scene
            .humans
            .iter()
            .filter(|h| matches!(h.anchor, ProxyAnchor::InnerAisle { .. }))
            .map(|h| h.proxy.location.x)
            .collect();
        for (x, expected) in inner.iter().zip([-3.65, -1.35, 1.35, 3.65]) {
            assert_abs_diff_eq!(*x, expected, epsilon = 1e-5);
        }
        assert_eq!(inner.len(), 4);

        // Perimeter proxies are unaffected
        assert_eq!(scene.gap_anchored_x().len(), 4);
        assert!(scene.humans.iter().all(|h| h.proxy.location.y == 0.0));
    }

    #[test]
    fn test_single_cell_has_no_walkway() {
        let cells = vec![CellPlacement::new([0.0; 3], 1, WorkcellConfig::Mixed)];
        let scene = assemble_scene(&cells, &SceneOptions::default()).expect("valid");
        assert_eq!(scene.humans.len(), 2);
    }

    #[test]
    fn test_invalid_dimensions_propagate() {
        let options = SceneOptions {
            dimensions: DimensionSet {
                gantry_height: 0.0,
                ..DimensionSet::default()
            },
            ..SceneOptions::default()
        };
        assert!(matches!(
            assemble_scene(&reference_cells(), &options),
            Err(LayoutError::InvalidDimension { name: "gantry_height", .. })
        ));
    }

    #[test]
    fn test_invalid_height_propagates() {
        let options = SceneOptions {
            humans: HumanPlan {
                heights: vec![1.75, -1.0],
                ..HumanPlan::default()
            },
            ..SceneOptions::default()
        };
        assert!(assemble_scene(&reference_cells(), &options).is_err());
    }
}
