//! Radiant Engine - drives the Radiance toolchain
//!
//! The engine is a thin orchestration layer over radiant-core: it writes the
//! generated text to an output directory and runs the external programs
//! (`obj2mesh`, `rad`, `falsecolor`, `lampcolor`) as child processes.
//!
//! ## Example
//!
//! ```ignore
//! use radiant_engine::{RenderPipeline, SceneDescription, load_toolchain};
//!
//! let scene = SceneDescription::load("pedret.json")?;
//! let pipeline = RenderPipeline::with_processes(load_toolchain(), "out");
//!
//! // Write sky, materials, meshes, view and job files
//! let export = pipeline.export(&scene)?;
//!
//! // Or export and render in one go
//! let report = pipeline.render(&scene)?;
//! println!("Picture: {}", report.picture.display());
//! ```

pub mod lampcolor;
pub mod pipeline;
pub mod tool;
pub mod toolchain;

// Re-export commonly used types from radiant-core
pub use radiant_core::lamp::{LampColorQuery, LampGeometry, LengthUnit};
pub use radiant_core::scene::SceneDescription;

// Re-export our own types
pub use lampcolor::query_lamp_color;
pub use pipeline::{ExportReport, PipelineError, RenderPipeline, RenderReport, Stage};
pub use tool::{CancelToken, Invocation, ProcessRunner, ToolError, ToolOutput, ToolRunner};
pub use toolchain::{Toolchain, load_toolchain, save_toolchain, toolchain_path};
