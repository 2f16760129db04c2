//! Location and names of the Radiance programs
//!
//! Stored in `{config_dir}/radiant/tools.json`. The `RADIANCE_BIN`
//! environment variable overrides the binary directory.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable overriding [`Toolchain::bin_dir`]
pub const BIN_DIR_ENV: &str = "RADIANCE_BIN";

/// Radiance programs the pipeline drives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toolchain {
    /// Directory holding the Radiance binaries
    pub bin_dir: PathBuf,
    pub rad: String,
    pub obj2mesh: String,
    pub falsecolor: String,
    pub lampcolor: String,
    /// Limit for a single `rad` run; unlimited when absent
    pub render_timeout_secs: Option<u64>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            bin_dir: PathBuf::from("/usr/local/bin"),
            rad: "rad".to_string(),
            obj2mesh: "obj2mesh".to_string(),
            falsecolor: "falsecolor".to_string(),
            lampcolor: "lampcolor".to_string(),
            render_timeout_secs: None,
        }
    }
}

impl Toolchain {
    pub fn rad(&self) -> PathBuf {
        self.bin_dir.join(&self.rad)
    }

    pub fn obj2mesh(&self) -> PathBuf {
        self.bin_dir.join(&self.obj2mesh)
    }

    pub fn falsecolor(&self) -> PathBuf {
        self.bin_dir.join(&self.falsecolor)
    }

    pub fn lampcolor(&self) -> PathBuf {
        self.bin_dir.join(&self.lampcolor)
    }

    pub fn render_timeout(&self) -> Option<Duration> {
        self.render_timeout_secs.map(Duration::from_secs)
    }

    /// Apply `RADIANCE_BIN` when set and non-empty
    pub fn with_env_override(mut self) -> Self {
        if let Some(dir) = std::env::var_os(BIN_DIR_ENV).filter(|d| !d.is_empty()) {
            debug!("Using {} from {}", dir.to_string_lossy(), BIN_DIR_ENV);
            self.bin_dir = PathBuf::from(dir);
        }
        self
    }
}

/// Get the path to the toolchain file
pub fn toolchain_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("radiant").join("tools.json"))
}

/// Load the toolchain, returning defaults if the file is missing or invalid
pub fn load_toolchain() -> Toolchain {
    let toolchain = toolchain_path()
        .filter(|path| path.exists())
        .and_then(|path| match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<Toolchain>(&contents)
                .map_err(|e| warn!("Ignoring invalid {}: {}", path.display(), e))
                .ok(),
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                None
            }
        })
        .unwrap_or_default();

    toolchain.with_env_override()
}

/// Save the toolchain to disk
pub fn save_toolchain(toolchain: &Toolchain) -> Result<PathBuf> {
    let Some(path) = toolchain_path() else {
        bail!("Could not determine config directory");
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let json = serde_json::to_string_pretty(toolchain).context("Failed to serialize toolchain")?;
    fs::write(&path, json).context("Failed to write toolchain file")?;
    Ok(path)
}
