//! Lamp radiance queries for the `lampcolor` tool
//!
//! `lampcolor` reads its answers from standard input, one per line, and
//! prints the resulting radiance as the last three numbers of its output.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    #[default]
    Meter,
    Centimeter,
    Foot,
    Inch,
}

impl LengthUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meter => "meter",
            Self::Centimeter => "centimeter",
            Self::Foot => "foot",
            Self::Inch => "inch",
        }
    }
}

/// Emitting surface of the lamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum LampGeometry {
    Polygon { area: f64 },
    Sphere { radius: f64 },
    Cylinder { radius: f64, length: f64 },
    Ring { radius: f64 },
}

impl LampGeometry {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Polygon { .. } => "polygon",
            Self::Sphere { .. } => "sphere",
            Self::Cylinder { .. } => "cylinder",
            Self::Ring { .. } => "ring",
        }
    }

    fn dimensions(&self) -> Vec<f64> {
        match *self {
            Self::Polygon { area } => vec![area],
            Self::Sphere { radius } | Self::Ring { radius } => vec![radius],
            Self::Cylinder { radius, length } => vec![radius, length],
        }
    }
}

/// Answers for one `lampcolor` run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LampColorQuery {
    /// Entry of the lamp table, e.g. "warm white" or "WHITE"
    pub lamp_type: String,
    #[serde(default)]
    pub unit: LengthUnit,
    pub geometry: LampGeometry,
    pub lumens: f64,
}

impl LampColorQuery {
    /// Standard input for `lampcolor`
    pub fn input(&self) -> Result<String> {
        if self.lamp_type.trim().is_empty() || self.lamp_type.contains('\n') {
            return Err(Error::InvalidParameter(format!(
                "lamp type must be a single non-empty line, got {:?}",
                self.lamp_type
            )));
        }
        let dimensions = self.geometry.dimensions();
        if dimensions
            .iter()
            .chain(std::iter::once(&self.lumens))
            .any(|v| !(v.is_finite() && *v >= 0.0))
        {
            return Err(Error::InvalidParameter(
                "lamp dimensions and lumens must be non-negative".to_string(),
            ));
        }

        let mut lines = vec![
            self.lamp_type.clone(),
            self.unit.as_str().to_string(),
            self.geometry.name().to_string(),
        ];
        lines.extend(dimensions.iter().map(|d| d.to_string()));
        lines.push(self.lumens.to_string());

        let mut input = lines.join("\n");
        input.push('\n');
        Ok(input)
    }
}

/// Radiance triple from `lampcolor` output: last three numbers of the last line
pub fn parse_lamp_color(output: &str) -> Option<[f64; 3]> {
    let line = output.lines().rev().find(|l| !l.trim().is_empty())?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let tail = tokens.get(tokens.len().checked_sub(3)?..)?;
    let mut rgb = [0.0; 3];
    for (slot, token) in rgb.iter_mut().zip(tail) {
        *slot = token.parse().ok()?;
    }
    Some(rgb)
}
