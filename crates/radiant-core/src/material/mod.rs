//! Material definitions and their translation to primitives

mod catalog;

use crate::primitive::{Identifier, Primitive, PrimitiveKind, check_token};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

pub use catalog::MaterialCatalog;

fn white() -> [f64; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

fn default_refraction_index() -> f64 {
    1.5
}

fn default_hartmann_constant() -> f64 {
    0.92
}

/// Kind-specific material parameters
///
/// The variant decides the primitive kind and the order of its real
/// arguments; see [`MaterialParams::arguments`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MaterialParams {
    Light,
    Illum,
    Glow {
        /// Radius of influence; zero means unlimited
        #[serde(default)]
        max_radius: f64,
    },
    Spotlight {
        /// Full cone angle in degrees
        angle: f64,
        direction: [f64; 3],
    },
    Mirror,
    Plastic {
        #[serde(default)]
        specularity: f64,
        #[serde(default)]
        roughness: f64,
    },
    Metal {
        #[serde(default)]
        specularity: f64,
        #[serde(default)]
        roughness: f64,
    },
    Trans {
        #[serde(default)]
        specularity: f64,
        #[serde(default)]
        roughness: f64,
        #[serde(default)]
        transmissivity: f64,
        #[serde(default)]
        transmitted_specularity: f64,
    },
    Dielectric {
        #[serde(default = "default_refraction_index")]
        refraction_index: f64,
        #[serde(default = "default_hartmann_constant")]
        hartmann_constant: f64,
    },
    Glass,
    Antimatter,
}

impl MaterialParams {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Light => PrimitiveKind::Light,
            Self::Illum => PrimitiveKind::Illum,
            Self::Glow { .. } => PrimitiveKind::Glow,
            Self::Spotlight { .. } => PrimitiveKind::Spotlight,
            Self::Mirror => PrimitiveKind::Mirror,
            Self::Plastic { .. } => PrimitiveKind::Plastic,
            Self::Metal { .. } => PrimitiveKind::Metal,
            Self::Trans { .. } => PrimitiveKind::Trans,
            Self::Dielectric { .. } => PrimitiveKind::Dielectric,
            Self::Glass => PrimitiveKind::Glass,
            Self::Antimatter => PrimitiveKind::Antimatter,
        }
    }

    /// Whether the kind carries an RGB triple
    pub fn has_color(&self) -> bool {
        !matches!(self, Self::Antimatter)
    }

    /// Real arguments in the order the renderer expects them
    pub fn arguments(&self, [r, g, b]: [f64; 3]) -> Vec<f64> {
        match *self {
            Self::Light | Self::Illum | Self::Mirror | Self::Glass => vec![r, g, b],
            Self::Glow { max_radius } => vec![r, g, b, max_radius],
            Self::Spotlight {
                angle,
                direction: [dx, dy, dz],
            } => vec![r, g, b, angle, dx, dy, dz],
            Self::Plastic {
                specularity,
                roughness,
            }
            | Self::Metal {
                specularity,
                roughness,
            } => vec![r, g, b, specularity, roughness],
            Self::Trans {
                specularity,
                roughness,
                transmissivity,
                transmitted_specularity,
            } => vec![
                r,
                g,
                b,
                specularity,
                roughness,
                transmissivity,
                transmitted_specularity,
            ],
            Self::Dielectric {
                refraction_index,
                hartmann_constant,
            } => vec![r, g, b, refraction_index, hartmann_constant],
            Self::Antimatter => Vec::new(),
        }
    }
}

/// Image source for a texture-backed material
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureSource {
    /// Path of the HDR image, as the renderer will see it
    #[serde(default)]
    pub image: Option<String>,
}

/// A material as defined by the host scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: Identifier,

    /// RGBA; alpha is carried but not emitted
    #[serde(default = "white")]
    pub color: [f64; 4],

    #[serde(flatten)]
    pub params: MaterialParams,

    /// Materials this one depends on (alternate or cancelled materials)
    #[serde(default)]
    pub modifiers: Vec<Identifier>,

    /// When set, color comes from an image instead of `color`
    #[serde(default)]
    pub texture: Option<TextureSource>,
}

impl Material {
    /// Create a white material
    pub fn new(id: Identifier, params: MaterialParams) -> Self {
        Self {
            id,
            color: white(),
            params,
            modifiers: Vec::new(),
            texture: None,
        }
    }

    pub fn with_color(mut self, r: f64, g: f64, b: f64) -> Self {
        self.color = [r, g, b, 1.0];
        self
    }

    pub fn with_modifier(mut self, modifier: Identifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Take color from an image
    pub fn with_texture(mut self, image: impl Into<String>) -> Self {
        self.texture = Some(TextureSource {
            image: Some(image.into()),
        });
        self
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.params.kind()
    }

    pub fn rgb(&self) -> [f64; 3] {
        [self.color[0], self.color[1], self.color[2]]
    }

    /// Check the per-kind modifier count and numeric fields
    pub fn validate(&self) -> Result<()> {
        let kind = self.kind();
        if !kind.modifier_arity().accepts(self.modifiers.len()) {
            return Err(Error::ModifierCardinality {
                material: self.id.to_string(),
                kind: kind.to_string(),
                count: self.modifiers.len(),
            });
        }

        if self.texture.is_some() && !self.params.has_color() {
            return Err(Error::InvalidParameter(format!(
                "material '{}' of kind {} cannot be texture-backed",
                self.id, kind
            )));
        }

        if let Some(bad) = self
            .params
            .arguments(self.rgb())
            .into_iter()
            .find(|v| !v.is_finite())
        {
            return Err(Error::InvalidParameter(format!(
                "material '{}' has a non-finite parameter ({})",
                self.id, bad
            )));
        }

        Ok(())
    }

    /// Translate this material alone, without its modifiers
    ///
    /// Modifier ids become string arguments; the modifiers' own primitives
    /// must be emitted first, which [`MaterialCatalog::emit`] takes care of.
    /// A texture-backed material yields a `colorpict` indirection followed by
    /// the material itself, colored white and modified by the indirection.
    pub fn primitives(&self) -> Result<Vec<Primitive>> {
        self.validate()?;

        let kind = self.kind();
        let modifiers: Vec<String> = self.modifiers.iter().map(|m| m.to_string()).collect();

        let Some(texture) = &self.texture else {
            let primitive = Primitive::new(Identifier::void(), kind, self.id.clone())
                .with_strings(modifiers)
                .with_floats(self.params.arguments(self.rgb()));
            return Ok(vec![primitive]);
        };

        let image = texture
            .image
            .as_deref()
            .ok_or_else(|| Error::UnresolvedTexture {
                material: self.id.to_string(),
            })?;
        check_token("texture image path", image)?;

        let map_id = self.id.suffixed("_map");
        let pict = Primitive::new(Identifier::void(), PrimitiveKind::Colorpict, map_id.clone())
            .with_strings(["red", "green", "blue", image, ".", "frac(Lu)", "frac(Lv)"]);
        let base = Primitive::new(map_id, kind, self.id.clone())
            .with_strings(modifiers)
            .with_floats(self.params.arguments([1.0, 1.0, 1.0]));

        Ok(vec![pict, base])
    }
}
