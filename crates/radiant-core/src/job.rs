//! Renderer job file (`rad` input)

use crate::primitive::{Identifier, check_token};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// File name of the sky description inside an export directory
pub const SKY_FILE: &str = "sky.rad";

/// Three-step setting used for quality, detail and variability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    Medium,
    #[default]
    Low,
}

impl Level {
    pub fn code(&self) -> &'static str {
        match self {
            Self::High => "H",
            Self::Medium => "M",
            Self::Low => "L",
        }
    }
}

fn default_name() -> Identifier {
    Identifier::fixed("scene")
}

fn default_exposure() -> f64 {
    1.0
}

fn default_resolution() -> [u32; 2] {
    [512, 512]
}

fn default_report_interval() -> f64 {
    0.2
}

/// Scene-level render settings supplied by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Base name of the scene, octree and picture files
    #[serde(default = "default_name")]
    pub name: Identifier,
    #[serde(default = "default_exposure")]
    pub exposure: f64,
    #[serde(default)]
    pub variability: Level,
    #[serde(default)]
    pub detail: Level,
    #[serde(default)]
    pub quality: Level,
    /// Ambient bounces, 0-8
    #[serde(default)]
    pub indirect: u8,
    #[serde(default)]
    pub penumbras: bool,
    #[serde(default = "default_resolution")]
    pub resolution: [u32; 2],
    /// Ambient cache reused across renders
    #[serde(default)]
    pub ambient_file: Option<PathBuf>,
    #[serde(default)]
    pub false_color: bool,
    /// Progress report interval in minutes
    #[serde(default = "default_report_interval")]
    pub report_interval: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            name: default_name(),
            exposure: default_exposure(),
            variability: Level::default(),
            detail: Level::default(),
            quality: Level::default(),
            indirect: 0,
            penumbras: false,
            resolution: default_resolution(),
            ambient_file: None,
            false_color: false,
            report_interval: default_report_interval(),
        }
    }
}

/// Named view and the file holding it
#[derive(Debug, Clone, PartialEq)]
pub struct ViewReference {
    pub name: Identifier,
    pub file: PathBuf,
}

impl ViewReference {
    /// Conventional `<name>.vf` view file
    pub fn named(name: Identifier) -> Self {
        let file = PathBuf::from(format!("{}.vf", name));
        Self { name, file }
    }
}

/// Everything the job file says
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    /// Octree `rad` builds and reuses (`OCTREE`)
    pub octree_path: PathBuf,
    /// Ambient cache file (`AMB`); no line when absent
    pub ambient_cache_path: Option<PathBuf>,
    /// Scene files compiled into the octree, sky first
    pub scene_files: Vec<PathBuf>,
    pub exposure: f64,
    /// Light variability across the scene
    pub variability: Level,
    /// Geometric detail
    pub detail: Level,
    /// Rendering quality
    pub quality: Level,
    /// Number of indirect bounces (`INDIRECT`)
    pub indirect_bounces: u8,
    /// Soft shadows from area sources
    pub penumbras: bool,
    /// Picture size in pixels, x then y
    pub resolution: (u32, u32),
    /// Keep an illuminance picture for false coloring (`render = -i`)
    pub false_color: bool,
    /// Progress report interval in minutes
    pub report_interval: f64,
    /// Picture file stem; `rad` appends the view name
    pub picture: PathBuf,
    /// The one view rendered
    pub view: ViewReference,
}

impl JobConfig {
    /// Job for an export directory laid out with the conventional names
    pub fn new(settings: &RenderSettings, view: ViewReference) -> Self {
        let name = settings.name.as_str();
        Self {
            octree_path: PathBuf::from(format!("{}.oct", name)),
            ambient_cache_path: settings.ambient_file.clone(),
            scene_files: vec![
                PathBuf::from(SKY_FILE),
                PathBuf::from(format!("{}.rad", name)),
            ],
            exposure: settings.exposure,
            variability: settings.variability,
            detail: settings.detail,
            quality: settings.quality,
            indirect_bounces: settings.indirect,
            penumbras: settings.penumbras,
            resolution: (settings.resolution[0], settings.resolution[1]),
            false_color: settings.false_color,
            report_interval: settings.report_interval,
            picture: PathBuf::from(name),
            view,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.exposure.is_finite() && self.exposure > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "exposure must be positive, got {}",
                self.exposure
            )));
        }
        if self.indirect_bounces > 8 {
            return Err(Error::InvalidParameter(format!(
                "indirect bounces must be 0-8, got {}",
                self.indirect_bounces
            )));
        }
        if self.resolution.0 == 0 || self.resolution.1 == 0 {
            return Err(Error::InvalidParameter(format!(
                "resolution must be positive, got {}x{}",
                self.resolution.0, self.resolution.1
            )));
        }
        if !(self.report_interval.is_finite() && self.report_interval >= 0.0) {
            return Err(Error::InvalidParameter(format!(
                "report interval must be non-negative, got {}",
                self.report_interval
            )));
        }

        let paths = std::iter::once(&self.octree_path)
            .chain(self.ambient_cache_path.iter())
            .chain(self.scene_files.iter())
            .chain([&self.picture, &self.view.file]);
        for path in paths {
            check_token("job file path", &path.display().to_string())?;
        }
        Ok(())
    }

    /// Picture the renderer writes: `<picture>_<view>.hdr`
    pub fn picture_file(&self) -> PathBuf {
        let mut name = self.picture.as_os_str().to_owned();
        name.push(format!("_{}.hdr", self.view.name));
        PathBuf::from(name)
    }

    /// False-color rendition of [`Self::picture_file`], alongside it
    pub fn false_color_file(&self) -> PathBuf {
        let picture = self.picture_file();
        let file_name = picture
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        picture
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(format!("falseC_{}", file_name))
    }

    /// The job file text
    pub fn to_job_text(&self) -> Result<String> {
        self.validate()?;

        let joined = |paths: &[PathBuf]| {
            paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut out = String::new();
        let _ = writeln!(out, "OCTREE = {}", self.octree_path.display());
        if let Some(amb) = &self.ambient_cache_path {
            let _ = writeln!(out, "AMB = {}", amb.display());
        }
        let _ = writeln!(out, "scene = {}", joined(&self.scene_files));
        out.push('\n');
        let _ = writeln!(out, "EXPOSURE = {}", self.exposure);
        let _ = writeln!(out, "VARIABILITY = {}", self.variability.code());
        let _ = writeln!(out, "DETAIL = {}", self.detail.code());
        let _ = writeln!(out, "QUALITY = {}", self.quality.code());
        out.push('\n');
        let _ = writeln!(out, "INDIRECT = {}", self.indirect_bounces);
        let _ = writeln!(
            out,
            "PENUMBRAS = {}",
            if self.penumbras { "True" } else { "False" }
        );
        let _ = writeln!(
            out,
            "RESOLUTION = {} {}",
            self.resolution.0, self.resolution.1
        );
        if self.false_color {
            out.push_str("render = -i\n");
        }
        let _ = writeln!(out, "PICTURE = {}", self.picture.display());
        let _ = writeln!(
            out,
            "view = {} -vf {}",
            self.view.name,
            self.view.file.display()
        );
        let _ = writeln!(out, "REPORT = {}", self.report_interval);
        Ok(out)
    }
}
