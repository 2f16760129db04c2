//! Radiance scene primitives
//!
//! A primitive is one record of the scene language:
//!
//! ```text
//! modifier kind id
//! N str1 .. strN
//! 0
//! M real1 .. realM
//! ```
//!
//! The `modifier` must name a primitive emitted earlier in the same octree,
//! or `void`.

mod writer;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use writer::{SceneText, format};

const VOID: &str = "void";

/// A whitespace-free token naming a primitive
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Create an identifier, rejecting empty strings, whitespace and the
    /// reserved `void` token
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() || id == VOID || id.chars().any(char::is_whitespace) {
            return Err(Error::InvalidIdentifier(id));
        }
        Ok(Self(id))
    }

    /// The `void` modifier, declaring no dependency
    pub fn void() -> Self {
        Self(VOID.to_string())
    }

    /// Identifier known valid at compile time
    pub(crate) fn fixed(id: &'static str) -> Self {
        debug_assert!(!id.is_empty() && !id.chars().any(char::is_whitespace));
        Self(id.to_string())
    }

    pub fn is_void(&self) -> bool {
        self.0 == VOID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive a new identifier by appending a whitespace-free suffix
    pub(crate) fn suffixed(&self, suffix: &str) -> Self {
        debug_assert!(!suffix.chars().any(char::is_whitespace));
        Self(format!("{}{}", self.0, suffix))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

/// Check that a string argument is a single token
pub(crate) fn check_token(what: &str, token: &str) -> Result<()> {
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(Error::InvalidParameter(format!(
            "{what} must be a single whitespace-free token, got {token:?}"
        )));
    }
    Ok(())
}

/// The closed set of primitive types radiant emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Light,
    Illum,
    Glow,
    Spotlight,
    Mirror,
    Plastic,
    Metal,
    Trans,
    Dielectric,
    Glass,
    Antimatter,
    Colorpict,
    Mesh,
    Source,
    Sphere,
}

impl PrimitiveKind {
    /// Keyword used in the scene language
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Illum => "illum",
            Self::Glow => "glow",
            Self::Spotlight => "spotlight",
            Self::Mirror => "mirror",
            Self::Plastic => "plastic",
            Self::Metal => "metal",
            Self::Trans => "trans",
            Self::Dielectric => "dielectric",
            Self::Glass => "glass",
            Self::Antimatter => "antimatter",
            Self::Colorpict => "colorpict",
            Self::Mesh => "mesh",
            Self::Source => "source",
            Self::Sphere => "sphere",
        }
    }

    /// Whether a host material can have this kind
    pub fn is_material(&self) -> bool {
        match self {
            Self::Light
            | Self::Illum
            | Self::Glow
            | Self::Spotlight
            | Self::Mirror
            | Self::Plastic
            | Self::Metal
            | Self::Trans
            | Self::Dielectric
            | Self::Glass
            | Self::Antimatter => true,
            Self::Colorpict | Self::Mesh | Self::Source | Self::Sphere => false,
        }
    }

    /// How many material modifiers (alternate materials) this kind accepts
    ///
    /// `illum` and `mirror` take an optional alternate material, `antimatter`
    /// any number of materials it cancels. Everything else takes none.
    pub fn modifier_arity(&self) -> ModifierArity {
        match self {
            Self::Illum | Self::Mirror => ModifierArity::AtMostOne,
            Self::Antimatter => ModifierArity::Any,
            Self::Light
            | Self::Glow
            | Self::Spotlight
            | Self::Plastic
            | Self::Metal
            | Self::Trans
            | Self::Dielectric
            | Self::Glass
            | Self::Colorpict
            | Self::Mesh
            | Self::Source
            | Self::Sphere => ModifierArity::None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrimitiveKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s {
            "light" => Self::Light,
            "illum" => Self::Illum,
            "glow" => Self::Glow,
            "spotlight" => Self::Spotlight,
            "mirror" => Self::Mirror,
            "plastic" => Self::Plastic,
            "metal" => Self::Metal,
            "trans" => Self::Trans,
            "dielectric" => Self::Dielectric,
            "glass" => Self::Glass,
            "antimatter" => Self::Antimatter,
            "colorpict" => Self::Colorpict,
            "mesh" => Self::Mesh,
            "source" => Self::Source,
            "sphere" => Self::Sphere,
            other => return Err(Error::UnknownMaterialKind(other.to_string())),
        };
        Ok(kind)
    }
}

/// Number of modifiers a primitive kind accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierArity {
    None,
    AtMostOne,
    Any,
}

impl ModifierArity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::None => count == 0,
            Self::AtMostOne => count <= 1,
            Self::Any => true,
        }
    }
}

/// One scene record
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub modifier: Identifier,
    pub kind: PrimitiveKind,
    pub id: Identifier,
    pub string_args: Vec<String>,
    pub int_args: Vec<i64>,
    pub float_args: Vec<f64>,
}

impl Primitive {
    /// Create a primitive with no arguments
    pub fn new(modifier: Identifier, kind: PrimitiveKind, id: Identifier) -> Self {
        Self {
            modifier,
            kind,
            id,
            string_args: Vec::new(),
            int_args: Vec::new(),
            float_args: Vec::new(),
        }
    }

    /// Set the string arguments
    pub fn with_strings<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.string_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the real arguments
    pub fn with_floats(mut self, args: impl IntoIterator<Item = f64>) -> Self {
        self.float_args = args.into_iter().collect();
        self
    }

    /// Render this primitive in the scene language
    pub fn format(&self) -> String {
        format(self)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writer::write_primitive(f, self)
    }
}
