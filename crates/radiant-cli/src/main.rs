//! Radiant CLI - compile scenes for the Radiance renderer

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use radiant_core::sky::sky_scene;
use radiant_core::view::compute_view;
use radiant_engine::{
    LampColorQuery, LampGeometry, LengthUnit, ProcessRunner, RenderPipeline, SceneDescription,
    Toolchain, load_toolchain, query_lamp_color, save_toolchain,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "radiant")]
#[command(about = "Compile scenes for the Radiance lighting simulator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write scene, sky, view and job files and convert meshes
    Export {
        /// Scene description (JSON)
        scene: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "radiance")]
        output: PathBuf,
    },

    /// Export, then render with rad
    Render {
        /// Scene description (JSON)
        scene: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "radiance")]
        output: PathBuf,

        /// Kill rad after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Export, then open rad's interactive X11 preview
    Preview {
        /// Scene description (JSON)
        scene: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "radiance")]
        output: PathBuf,
    },

    /// Print the sky description of a scene
    Sky {
        /// Scene description (JSON)
        scene: PathBuf,
    },

    /// Print the view file line of a scene's camera
    View {
        /// Scene description (JSON)
        scene: PathBuf,
    },

    /// Compute lamp radiance with lampcolor
    LampColor {
        /// Lamp table entry, e.g. "warm white"
        #[arg(long = "type")]
        lamp_type: String,

        /// Length unit: meter, centimeter, foot or inch
        #[arg(long, default_value = "meter")]
        unit: String,

        /// Lamp shape: polygon, sphere, cylinder or ring
        #[arg(long, default_value = "sphere")]
        shape: String,

        /// Area for a polygon, radius otherwise
        #[arg(long)]
        size: f64,

        /// Cylinder length
        #[arg(long)]
        length: Option<f64>,

        /// Luminous output
        #[arg(long)]
        lumens: f64,
    },

    /// Show the Radiance toolchain configuration
    Tools {
        /// Write the current configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export { scene, output } => {
            run_export(&scene, &output)?;
        }
        Commands::Render {
            scene,
            output,
            timeout,
        } => {
            run_render(&scene, &output, timeout)?;
        }
        Commands::Preview { scene, output } => {
            let scene = load_scene(&scene)?;
            let pipeline = RenderPipeline::with_processes(load_toolchain(), output);
            pipeline.preview(&scene)?;
        }
        Commands::Sky { scene } => {
            let scene = load_scene(&scene)?;
            print!("{}", sky_scene(&scene.sky)?);
        }
        Commands::View { scene } => {
            let scene = load_scene(&scene)?;
            println!("{}", compute_view(&scene.camera.pose()).view_file_line());
        }
        Commands::LampColor {
            lamp_type,
            unit,
            shape,
            size,
            length,
            lumens,
        } => {
            let query = LampColorQuery {
                lamp_type,
                unit: parse_unit(&unit)?,
                geometry: parse_geometry(&shape, size, length)?,
                lumens,
            };
            let [r, g, b] = query_lamp_color(&ProcessRunner::new(), &load_toolchain(), &query)?;
            println!("{} {} {}", r, g, b);
        }
        Commands::Tools { save } => {
            run_tools(save)?;
        }
    }

    Ok(())
}

fn load_scene(path: &Path) -> Result<SceneDescription> {
    SceneDescription::load(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn run_export(scene: &Path, output: &Path) -> Result<()> {
    let scene = load_scene(scene)?;
    let pipeline = RenderPipeline::with_processes(load_toolchain(), output);
    let report = pipeline.export(&scene)?;

    println!("Exported to {}", report.out_dir.display());
    println!("  Scene: {}", report.scene_file.display());
    println!("  Sky:   {}", report.sky_file.display());
    println!("  View:  {}", report.view_file.display());
    println!("  Job:   {}", report.job_file.display());
    for object in &report.object_files {
        println!("  Object: {}", object.display());
    }
    Ok(())
}

fn run_render(scene: &Path, output: &Path, timeout: Option<u64>) -> Result<()> {
    let scene = load_scene(scene)?;
    let mut toolchain = load_toolchain();
    if timeout.is_some() {
        toolchain.render_timeout_secs = timeout;
    }

    let pipeline = RenderPipeline::with_processes(toolchain, output);
    let report = pipeline.render(&scene)?;

    let dir = &report.export.out_dir;
    println!("Picture: {}", dir.join(&report.picture).display());
    if let Some(false_color) = &report.false_color {
        println!("False color: {}", dir.join(false_color).display());
    }
    Ok(())
}

fn run_tools(save: bool) -> Result<()> {
    let toolchain: Toolchain = load_toolchain();
    println!("{}", serde_json::to_string_pretty(&toolchain)?);

    for (name, path) in [
        ("rad", toolchain.rad()),
        ("obj2mesh", toolchain.obj2mesh()),
        ("falsecolor", toolchain.falsecolor()),
        ("lampcolor", toolchain.lampcolor()),
    ] {
        if !path.exists() {
            tracing::warn!("{} not found at {}", name, path.display());
        }
    }

    if save {
        let path = save_toolchain(&toolchain)?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

fn parse_unit(unit: &str) -> Result<LengthUnit> {
    Ok(match unit {
        "meter" => LengthUnit::Meter,
        "centimeter" => LengthUnit::Centimeter,
        "foot" => LengthUnit::Foot,
        "inch" => LengthUnit::Inch,
        other => bail!("Unknown length unit: {other}"),
    })
}

fn parse_geometry(shape: &str, size: f64, length: Option<f64>) -> Result<LampGeometry> {
    Ok(match shape {
        "polygon" => LampGeometry::Polygon { area: size },
        "sphere" => LampGeometry::Sphere { radius: size },
        "ring" => LampGeometry::Ring { radius: size },
        "cylinder" => LampGeometry::Cylinder {
            radius: size,
            length: length.context("A cylinder needs --length")?,
        },
        other => bail!("Unknown lamp shape: {other}"),
    })
}
