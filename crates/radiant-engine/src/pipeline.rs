//! Export and render orchestration
//!
//! Stages run in a fixed order: sky, per-object materials and mesh
//! conversion, scene, view, job, then the renderer. Every artifact is fully
//! written before the next stage starts; a failed stage stops the run and
//! leaves what was already written on disk.

use crate::tool::{CancelToken, Invocation, ProcessRunner, ToolError, ToolRunner};
use crate::toolchain::Toolchain;
use radiant_core::geometry::{
    GeometryInstance, PlacementDirective, emit_geometry, emit_lamp, emit_object_materials,
};
use radiant_core::job::{JobConfig, SKY_FILE};
use radiant_core::material::MaterialCatalog;
use radiant_core::primitive::SceneText;
use radiant_core::scene::SceneDescription;
use radiant_core::sky::sky_scene;
use radiant_core::view::compute_view;
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// A step of the pipeline, reported with every failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Sky,
    Materials,
    MeshConversion,
    Scene,
    View,
    Job,
    Render,
    Preview,
    FalseColor,
    LampColor,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validate => "validation",
            Self::Sky => "sky",
            Self::Materials => "materials",
            Self::MeshConversion => "mesh conversion",
            Self::Scene => "scene",
            Self::View => "view",
            Self::Job => "job",
            Self::Render => "render",
            Self::Preview => "preview",
            Self::FalseColor => "false color",
            Self::LampColor => "lamp color",
        })
    }
}

/// A failed run, naming the stage and the entity involved
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Translation or artifact writing failed
    #[error("{stage} stage failed for '{entity}': {source}")]
    Scene {
        stage: Stage,
        entity: String,
        #[source]
        source: radiant_core::Error,
    },

    /// An external tool failed
    #[error("{stage} stage failed for '{entity}': {source}")]
    Tool {
        stage: Stage,
        entity: String,
        #[source]
        source: ToolError,
    },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Scene { stage, .. } | Self::Tool { stage, .. } => *stage,
        }
    }

    pub fn entity(&self) -> &str {
        match self {
            Self::Scene { entity, .. } | Self::Tool { entity, .. } => entity,
        }
    }

    pub(crate) fn scene(stage: Stage, entity: &str) -> impl FnOnce(radiant_core::Error) -> Self {
        let entity = entity.to_string();
        move |source| Self::Scene {
            stage,
            entity,
            source,
        }
    }

    pub(crate) fn tool(stage: Stage, entity: &str) -> impl FnOnce(ToolError) -> Self {
        let entity = entity.to_string();
        move |source| Self::Tool {
            stage,
            entity,
            source,
        }
    }
}

/// Artifacts of an export, as paths inside the output directory
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub out_dir: PathBuf,
    pub sky_file: PathBuf,
    /// One per object, in scene order
    pub object_files: Vec<PathBuf>,
    pub scene_file: PathBuf,
    pub view_file: PathBuf,
    pub job_file: PathBuf,
    pub job: JobConfig,
}

/// Result of a finished render
#[derive(Debug, Clone)]
pub struct RenderReport {
    pub export: ExportReport,
    pub picture: PathBuf,
    pub false_color: Option<PathBuf>,
}

/// Compiles scenes into an output directory and drives the renderer
///
/// Relative mesh paths in the scene are taken relative to the output
/// directory, where every tool runs.
pub struct RenderPipeline<R: ToolRunner = ProcessRunner> {
    runner: R,
    toolchain: Toolchain,
    out_dir: PathBuf,
    cancel: Option<CancelToken>,
}

impl RenderPipeline<ProcessRunner> {
    /// Pipeline running the real Radiance programs
    pub fn with_processes(toolchain: Toolchain, out_dir: impl Into<PathBuf>) -> Self {
        Self::new(ProcessRunner::new(), toolchain, out_dir)
    }
}

impl<R: ToolRunner> RenderPipeline<R> {
    pub fn new(runner: R, toolchain: Toolchain, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            toolchain,
            out_dir: out_dir.into(),
            cancel: None,
        }
    }

    /// Stop running tools when the token is cancelled
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Write every artifact and convert meshes, without rendering
    pub fn export(&self, scene: &SceneDescription) -> Result<ExportReport, PipelineError> {
        let name = scene.settings.name.to_string();
        info!("Exporting scene '{}' to {}", name, self.out_dir.display());

        scene
            .validate()
            .map_err(PipelineError::scene(Stage::Validate, &name))?;
        let catalog = scene
            .catalog()
            .map_err(PipelineError::scene(Stage::Materials, &name))?;
        std::fs::create_dir_all(&self.out_dir)
            .map_err(|e| PipelineError::scene(Stage::Scene, &name)(e.into()))?;

        // Sky
        let sky_file = PathBuf::from(SKY_FILE);
        sky_scene(&scene.sky)
            .and_then(|text| text.write_to(&self.out_dir.join(&sky_file)))
            .map_err(PipelineError::scene(Stage::Sky, "sky"))?;
        debug!("Wrote {}", sky_file.display());

        // Objects are independent; collecting keeps scene order.
        let placements = scene
            .objects
            .par_iter()
            .map(|object| self.export_object(object, &catalog))
            .collect::<Result<Vec<_>, _>>()?;

        // Scene
        let scene_file = PathBuf::from(format!("{}.rad", name));
        self.scene_text(scene, &catalog, &placements)
            .and_then(|text| text.write_to(&self.out_dir.join(&scene_file)))
            .map_err(PipelineError::scene(Stage::Scene, &name))?;
        debug!("Wrote {}", scene_file.display());

        // View
        let camera = &scene.camera;
        let job = scene.job();
        let view_line = compute_view(&camera.pose()).view_file_line();
        write_file(&self.out_dir.join(&job.view.file), &format!("{}\n", view_line))
            .map_err(PipelineError::scene(Stage::View, camera.name.as_str()))?;
        debug!("Wrote {}", job.view.file.display());

        // Job
        let job_file = PathBuf::from(format!("{}.rif", name));
        job.to_job_text()
            .and_then(|text| write_file(&self.out_dir.join(&job_file), &text))
            .map_err(PipelineError::scene(Stage::Job, &name))?;
        debug!("Wrote {}", job_file.display());

        info!(
            "Exported {} object(s) and {} lamp(s)",
            scene.objects.len(),
            scene.lamps.len()
        );

        Ok(ExportReport {
            out_dir: self.out_dir.clone(),
            sky_file,
            object_files: placements.into_iter().map(|p| p.target).collect(),
            scene_file,
            view_file: job.view.file.clone(),
            job_file,
            job,
        })
    }

    /// Export, run `rad` on the job file, then the false-color filter if asked
    pub fn render(&self, scene: &SceneDescription) -> Result<RenderReport, PipelineError> {
        let export = self.export(scene)?;
        let name = scene.settings.name.to_string();

        let rad = Invocation::new(self.toolchain.rad())
            .arg(export.job_file.display().to_string())
            .timeout(self.toolchain.render_timeout());
        info!("Rendering {}", export.job_file.display());
        self.run(rad)
            .map_err(PipelineError::tool(Stage::Render, &name))?;

        let picture = export.job.picture_file();
        info!("Rendered {}", picture.display());

        let false_color = if export.job.false_color {
            Some(self.false_color(&export.job, &name)?)
        } else {
            None
        };

        Ok(RenderReport {
            export,
            picture,
            false_color,
        })
    }

    /// Export, then open the renderer's interactive preview
    pub fn preview(&self, scene: &SceneDescription) -> Result<ExportReport, PipelineError> {
        let export = self.export(scene)?;
        let rad = Invocation::new(self.toolchain.rad())
            .args(["-o", "x11"])
            .arg(export.job_file.display().to_string());
        info!("Previewing {}", export.job_file.display());
        self.run(rad)
            .map_err(PipelineError::tool(Stage::Preview, scene.settings.name.as_str()))?;
        Ok(export)
    }

    /// Run a tool inside the output directory
    fn run(&self, invocation: Invocation) -> Result<String, ToolError> {
        let invocation = invocation
            .current_dir(&self.out_dir)
            .cancel(self.cancel.clone());
        let output = self.runner.run(&invocation)?;
        debug!("{} finished", invocation.tool_name());
        Ok(output.stdout)
    }

    /// Materials, mesh conversion and object file for one object
    ///
    /// The object file is only written once its mesh exists.
    fn export_object(
        &self,
        object: &GeometryInstance,
        catalog: &MaterialCatalog,
    ) -> Result<PlacementDirective, PipelineError> {
        let id = object.id.as_str();

        let material_file = object.material_file();
        emit_object_materials(object, catalog)
            .and_then(|prims| {
                let mut text = SceneText::new();
                text.push_primitives(&prims);
                text.write_to(&self.out_dir.join(&material_file))
            })
            .map_err(PipelineError::scene(Stage::Materials, id))?;

        let (mesh, placement) =
            emit_geometry(object).map_err(PipelineError::scene(Stage::Scene, id))?;

        let convert = Invocation::new(self.toolchain.obj2mesh()).args([
            "-a".to_string(),
            material_file.display().to_string(),
            object.mesh.interchange.display().to_string(),
            object.mesh.binary.display().to_string(),
        ]);
        self.run(convert)
            .map_err(PipelineError::tool(Stage::MeshConversion, id))?;
        debug!("Converted mesh for '{}'", id);

        let mut text = SceneText::new();
        text.push_primitive(&mesh);
        text.write_to(&self.out_dir.join(&placement.target))
            .map_err(PipelineError::scene(Stage::Scene, id))?;

        Ok(placement)
    }

    /// Placements in object order, then lamp materials and lamps
    fn scene_text(
        &self,
        scene: &SceneDescription,
        catalog: &MaterialCatalog,
        placements: &[PlacementDirective],
    ) -> radiant_core::Result<SceneText> {
        let mut text = SceneText::new();
        for placement in placements {
            placement.write_into(&mut text);
        }

        let lamp_materials = catalog.emit_all(scene.lamps.iter().map(|l| &l.material))?;
        text.push_primitives(&lamp_materials);
        for lamp in &scene.lamps {
            text.push_primitive(&emit_lamp(lamp)?);
        }
        Ok(text)
    }

    fn false_color(&self, job: &JobConfig, name: &str) -> Result<PathBuf, PipelineError> {
        let picture = job.picture_file();
        let target = job.false_color_file();
        let filter = Invocation::new(self.toolchain.falsecolor())
            .args(["-ip".to_string(), picture.display().to_string()])
            .args(["-l", "Lux"])
            .stdout_to(&target);
        self.run(filter)
            .map_err(PipelineError::tool(Stage::FalseColor, name))?;
        info!("Wrote false color image {}", target.display());
        Ok(target)
    }
}

fn write_file(path: &Path, contents: &str) -> radiant_core::Result<()> {
    std::fs::write(path, contents)?;
    Ok(())
}
