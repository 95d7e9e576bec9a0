//! workcell - builds multi-robot workcell layouts
//!
//! Assembles the scene described by a RON layout config, realizes it into an
//! in-memory node list and writes that as a JSON or RON manifest.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use workcell_core::{
    LayoutConfig, MaterialDef, Mount, PlacementKind, RealizeReport, RecordedNode,
    RecordingBackend, Scene, realize_scene,
};

#[derive(Parser)]
#[command(name = "workcell")]
#[command(about = "Parametric multi-robot workcell layout builder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the scene and write a node manifest
    Build {
        /// Layout config (.ron); the reference facility when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Root of the robot description meshes
        #[arg(short, long)]
        assets: Option<PathBuf>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Write the default layout config
    InitConfig {
        #[arg(short, long, default_value = "workcell.ron")]
        out: PathBuf,
    },
    /// Print cell, robot and placement counts
    Info {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Ron,
}

#[derive(Serialize)]
struct Manifest<'a> {
    report: RealizeReport,
    nodes: &'a [RecordedNode],
    materials: &'a BTreeMap<String, MaterialDef>,
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "workcell=info,workcell_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            config,
            assets,
            out,
            format,
        } => build(config.as_deref(), assets, out.as_deref(), format)?,
        Commands::InitConfig { out } => {
            LayoutConfig::default()
                .save(&out)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Wrote default layout to {}", out.display());
        }
        Commands::Info { config } => {
            let config = load_config(config.as_deref())?;
            let scene = config.assemble().context("Failed to assemble scene")?;
            write_info(&scene, &mut std::io::stdout().lock())?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<LayoutConfig> {
    match path {
        Some(path) => LayoutConfig::load(path)
            .with_context(|| format!("Failed to load layout config {}", path.display())),
        None => {
            tracing::info!("No config given, using the reference facility");
            Ok(LayoutConfig::default())
        }
    }
}

fn build(
    config: Option<&Path>,
    assets: Option<PathBuf>,
    out: Option<&Path>,
    format: Format,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(root) = assets {
        config.assets.root = root;
    }

    let scene = config.assemble().context("Failed to assemble scene")?;
    let mut backend = RecordingBackend::new();
    let report = realize_scene(&scene, &mut backend, &config.assets);

    let text = render_manifest(&backend, report, format)?;
    match out {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote manifest to {:?}", path);
        }
        None => println!("{text}"),
    }

    Ok(())
}

fn render_manifest(
    backend: &RecordingBackend,
    report: RealizeReport,
    format: Format,
) -> Result<String> {
    let manifest = Manifest {
        report,
        nodes: backend.nodes(),
        materials: backend.materials(),
    };

    Ok(match format {
        Format::Json => serde_json::to_string_pretty(&manifest)?,
        Format::Ron => ron::ser::to_string_pretty(&manifest, ron::ser::PrettyConfig::default())?,
    })
}

fn write_info(scene: &Scene, out: &mut impl Write) -> std::io::Result<()> {
    for cell in &scene.cells {
        writeln!(
            out,
            "cell {} ({}) at ({:.2}, {:.2}, {:.2})",
            cell.cell_index, cell.config, cell.origin.x, cell.origin.y, cell.origin.z
        )?;
        writeln!(
            out,
            "  robots: {} table-mounted, {} suspended",
            cell.count_mounted(Mount::Table),
            cell.count_mounted(Mount::Suspended)
        )?;
        writeln!(out, "  placements: {}", cell.placements.len())?;
        for kind in PlacementKind::ALL {
            let count = cell.placements_of(kind).count();
            if count > 0 {
                writeln!(out, "    {}: {}", kind.display_name(), count)?;
            }
        }
        let holes: u32 = cell
            .placements
            .iter()
            .filter_map(|p| p.pattern)
            .map(|grid| grid.hole_count())
            .sum();
        writeln!(out, "  holes: {holes}")?;
    }

    writeln!(out, "humans: {}", scene.humans.len())?;
    for human in &scene.humans {
        let location = human.proxy.location;
        let [width, depth, height] = human.proxy.envelope().footprint;
        writeln!(
            out,
            "  {} at ({:.2}, {:.2}) {:?}, envelope {:.2} x {:.2} x {:.2}",
            human.proxy.name, location.x, location.y, human.anchor, width, depth, height
        )?;
    }
    writeln!(
        out,
        "total: {} robots, {} placements, {} materials",
        scene.robots().count(),
        scene.placements().count(),
        scene.materials.len()
    )
}
