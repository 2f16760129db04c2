//! Scene objects: mesh references, placement and lamps
//!
//! Mesh data itself is produced by the external mesh converter; this module
//! only refers to it.

use crate::material::MaterialCatalog;
use crate::primitive::{Identifier, Primitive, PrimitiveKind, SceneText, check_token};
use crate::{Error, Result};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Mesh files for one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshReference {
    /// Interchange mesh written by the host (Wavefront OBJ)
    pub interchange: PathBuf,
    /// Compiled mesh produced by the converter
    pub binary: PathBuf,
}

impl MeshReference {
    /// Conventional `<id>.obj` / `<id>.rtm` pair in `dir`
    pub fn in_dir(dir: &Path, id: &Identifier) -> Self {
        Self {
            interchange: dir.join(format!("{}.obj", id)),
            binary: dir.join(format!("{}.rtm", id)),
        }
    }
}

/// One exported scene object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryInstance {
    pub id: Identifier,

    /// Material slots, handed to the mesh converter
    #[serde(default)]
    pub materials: Vec<Identifier>,

    pub mesh: MeshReference,

    #[serde(default)]
    pub translation: DVec3,

    /// Euler angles in radians, applied X then Y then Z about the world axes
    #[serde(default)]
    pub rotation: DVec3,
}

impl GeometryInstance {
    /// Scene file holding this object's mesh primitive
    pub fn object_file(&self) -> PathBuf {
        PathBuf::from(format!("{}.rad", self.id))
    }

    /// Material file handed to the mesh converter
    pub fn material_file(&self) -> PathBuf {
        PathBuf::from(format!("{}.mat", self.id))
    }
}

/// An `xform` instruction placing an object file in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementDirective {
    pub object: Identifier,
    pub translation: DVec3,
    /// Host rotation, radians
    pub rotation: DVec3,
    pub target: PathBuf,
}

impl PlacementDirective {
    /// Rotation as xform expects it
    pub fn rotation_degrees(&self) -> DVec3 {
        DVec3::new(
            self.rotation.x.to_degrees(),
            self.rotation.y.to_degrees(),
            self.rotation.z.to_degrees(),
        )
    }

    /// The command line, without the leading `!`
    ///
    /// Rotations are applied before the translation so the object turns
    /// about its own origin.
    pub fn command(&self) -> String {
        let r = self.rotation_degrees();
        let t = self.translation;
        format!(
            "xform -rx {} -ry {} -rz {} -t {} {} {} {}",
            r.x,
            r.y,
            r.z,
            t.x,
            t.y,
            t.z,
            self.target.display()
        )
    }

    /// Comment recording the unit conversion
    pub fn comment(&self) -> String {
        format!(
            "{}: rotation {} {} {} rad, written in degrees",
            self.object, self.rotation.x, self.rotation.y, self.rotation.z
        )
    }

    pub fn write_into(&self, text: &mut SceneText) {
        text.push_comment(&self.comment()).push_command(&self.command());
    }
}

/// Build the mesh primitive and placement for an object
pub fn emit_geometry(instance: &GeometryInstance) -> Result<(Primitive, PlacementDirective)> {
    if !(instance.translation.is_finite() && instance.rotation.is_finite()) {
        return Err(Error::InvalidParameter(format!(
            "object '{}' has a non-finite transform",
            instance.id
        )));
    }

    let binary = instance.mesh.binary.display().to_string();
    check_token("mesh file", &binary)?;
    let target = instance.object_file();
    check_token("object file", &target.display().to_string())?;

    let mesh = Primitive::new(Identifier::void(), PrimitiveKind::Mesh, instance.id.clone())
        .with_strings([binary]);

    let placement = PlacementDirective {
        object: instance.id.clone(),
        translation: instance.translation,
        rotation: instance.rotation,
        target,
    };

    Ok((mesh, placement))
}

/// Material primitives for an object's slots, dependencies first
pub fn emit_object_materials(
    instance: &GeometryInstance,
    catalog: &MaterialCatalog,
) -> Result<Vec<Primitive>> {
    catalog.emit_all(&instance.materials)
}

/// A spherical light source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lamp {
    /// Id of the emitted sphere
    pub id: Identifier,
    /// Emitting material (light, spotlight, glow or illum)
    pub material: Identifier,
    /// Sphere center in world coordinates
    pub position: DVec3,
    /// Sphere radius, strictly positive
    pub radius: f64,
}

/// Build the sphere primitive for a lamp
pub fn emit_lamp(lamp: &Lamp) -> Result<Primitive> {
    if !(lamp.radius.is_finite() && lamp.radius > 0.0) || !lamp.position.is_finite() {
        return Err(Error::InvalidParameter(format!(
            "lamp '{}' needs a finite position and positive radius",
            lamp.id
        )));
    }
    let p = lamp.position;
    Ok(
        Primitive::new(lamp.material.clone(), PrimitiveKind::Sphere, lamp.id.clone())
            .with_floats([p.x, p.y, p.z, lamp.radius]),
    )
}
