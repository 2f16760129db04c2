//! Scene description handed over by the host
//!
//! Everything the compiler reads about a scene, as one JSON document.

use crate::geometry::{GeometryInstance, Lamp};
use crate::job::{JobConfig, RenderSettings, ViewReference};
use crate::material::{Material, MaterialCatalog};
use crate::primitive::{Identifier, PrimitiveKind};
use crate::sky::{SKY_IDS, SkyConfig};
use crate::view::CameraPose;
use crate::{Error, Result};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// The active camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescription {
    /// Names the view and its `<name>.vf` file
    pub name: Identifier,
    pub position: DVec3,
    /// Euler angles in radians, applied X then Y then Z about the world axes
    #[serde(default)]
    pub rotation: DVec3,
}

impl CameraDescription {
    pub fn pose(&self) -> CameraPose {
        CameraPose::from_euler(self.position, self.rotation)
    }

    pub fn view_reference(&self) -> ViewReference {
        ViewReference::named(self.name.clone())
    }
}

/// A full scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub settings: RenderSettings,
    pub sky: SkyConfig,
    pub camera: CameraDescription,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub objects: Vec<GeometryInstance>,
    #[serde(default)]
    pub lamps: Vec<Lamp>,
}

impl SceneDescription {
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        check_material_kinds(&value)?;
        let scene: Self = serde_json::from_value(value)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Read and validate a scene file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check everything that can be checked without emitting
    pub fn validate(&self) -> Result<()> {
        self.sky.validate()?;
        let job = self.job();
        job.validate()?;

        for material in &self.materials {
            material.validate()?;
        }

        // Object files sit beside the sky and scene files.
        if let Some(object) = self
            .objects
            .iter()
            .find(|o| job.scene_files.contains(&o.object_file()))
        {
            return Err(Error::DuplicateIdentifier(object.id.to_string()));
        }

        // The sky primitives share the octree with every scene id.
        let scene_ids = self
            .materials
            .iter()
            .map(|m| &m.id)
            .chain(self.objects.iter().map(|o| &o.id))
            .chain(self.lamps.iter().map(|l| &l.id));
        for id in scene_ids {
            if SKY_IDS.contains(&id.as_str()) {
                return Err(Error::DuplicateIdentifier(id.to_string()));
            }
        }

        // Objects and lamps share one namespace of scene files and primitive ids.
        let mut seen = HashSet::new();
        let ids = self
            .objects
            .iter()
            .map(|o| &o.id)
            .chain(self.lamps.iter().map(|l| &l.id));
        for id in ids {
            if !seen.insert(id) {
                return Err(Error::DuplicateIdentifier(id.to_string()));
            }
        }
        Ok(())
    }

    /// Catalog of all material definitions
    pub fn catalog(&self) -> Result<MaterialCatalog> {
        MaterialCatalog::from_materials(self.materials.iter().cloned())
    }

    pub fn job(&self) -> JobConfig {
        JobConfig::new(&self.settings, self.camera.view_reference())
    }
}

/// Name unknown material types instead of failing as malformed JSON
fn check_material_kinds(value: &serde_json::Value) -> Result<()> {
    let kinds = value
        .get("materials")
        .and_then(serde_json::Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|m| m.get("type").and_then(serde_json::Value::as_str));
    for name in kinds {
        let kind: PrimitiveKind = name.parse()?;
        if !kind.is_material() {
            return Err(Error::UnknownMaterialKind(name.to_string()));
        }
    }
    Ok(())
}
