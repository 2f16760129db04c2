//! # Radiant Core
//!
//! Scene compilation for the Radiance lighting simulator.
//!
//! Radiant translates a host scene (materials, meshes, lamps, a camera and
//! a sky) into Radiance scene-language text, a view file and a `rad` job
//! file. Everything here is pure text generation; running the external
//! tools is left to `radiant-engine`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use radiant_core::prelude::*;
//!
//! let scene = SceneDescription::load("pedret.json")?;
//! let catalog = scene.catalog()?;
//!
//! let sky = sky_scene(&scene.sky)?;
//! let view = compute_view(&scene.camera.pose());
//! let job = scene.job().to_job_text()?;
//! ```
//!
//! ## Units and Conventions
//!
//! - **Distances**: scene units, passed through unchanged
//! - **Angles**: the host supplies radians; `xform` receives degrees
//! - **Rotation order**: X, then Y, then Z, about the world axes
//! - **Camera**: looks down its local -Z axis with +Y up

pub mod geometry;
pub mod job;
pub mod lamp;
pub mod material;
pub mod primitive;
pub mod scene;
pub mod sky;
pub mod view;

mod error;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    // Primitives
    pub use crate::primitive::{Identifier, Primitive, PrimitiveKind, SceneText};

    // Materials
    pub use crate::material::{Material, MaterialCatalog, MaterialParams};

    // Scene objects
    pub use crate::geometry::{
        GeometryInstance, Lamp, MeshReference, PlacementDirective, emit_geometry, emit_lamp,
    };

    // Camera, sky and job
    pub use crate::job::{JobConfig, Level, RenderSettings, ViewReference};
    pub use crate::scene::{CameraDescription, SceneDescription};
    pub use crate::sky::{SkyConfig, SkyDistribution, TimeMode, TimeZone, sky_scene};
    pub use crate::view::{CameraPose, ViewVectors, compute_view};

    // Math (re-export glam)
    pub use glam::{DMat3, DVec3};

    // Error handling
    pub use crate::{Error, Result};
}
