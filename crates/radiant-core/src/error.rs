//! Error types for radiant

use thiserror::Error;

/// Result type alias using radiant's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while translating a scene
#[derive(Error, Debug)]
pub enum Error {
    /// A material's modifier chain leads back to itself
    #[error("Cyclic modifier chain at '{material}': {}", .chain.join(" -> "))]
    CyclicModifier {
        material: String,
        chain: Vec<String>,
    },

    /// Texture-backed material without an image to sample
    #[error("Material '{material}' is texture-backed but has no linked image")]
    UnresolvedTexture { material: String },

    /// Material kind name outside the supported set
    #[error("Unknown material kind: {0}")]
    UnknownMaterialKind(String),

    /// A modifier id that is not defined in the catalog
    #[error("Material '{material}' references undefined modifier '{modifier}'")]
    UnknownModifier { material: String, modifier: String },

    /// More modifiers than the kind accepts
    #[error("Material '{material}' of kind {kind} cannot take {count} modifier(s)")]
    ModifierCardinality {
        material: String,
        kind: String,
        count: usize,
    },

    /// The same identifier was defined twice
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    /// Identifier is empty, contains whitespace or is the reserved `void`
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scene description could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
