//! Read-once cache for the transpiler and target-environment files.
//!
//! The raw text of each file is read at most once per [`ConfigCache`]; the
//! parsed values are rebuilt on every call so per-build mutation never leaks
//! from one caller to the next.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::babelrc::{ENV_PRESET, PrepareError, TranspilerConfig};
use super::browserslist::{self, TargetList};
use crate::error::ConfigError;

/// Owner of the cached configuration text.
#[derive(Debug)]
pub struct ConfigCache {
    babelrc_path: PathBuf,
    browserslistrc_path: PathBuf,
    babelrc: OnceLock<String>,
    browserslistrc: OnceLock<String>,
}

impl ConfigCache {
    /// Create an empty cache for the given files. Nothing is read yet.
    #[must_use]
    pub fn new(babelrc_path: PathBuf, browserslistrc_path: PathBuf) -> Self {
        Self {
            babelrc_path,
            browserslistrc_path,
            babelrc: OnceLock::new(),
            browserslistrc: OnceLock::new(),
        }
    }

    /// Parse the cached `.browserslistrc` into the default target list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`], [`ConfigError::Io`] or
    /// [`ConfigError::Parse`].
    pub fn targets(&self) -> Result<TargetList, ConfigError> {
        let text = read_once(&self.browserslistrc, &self.browserslistrc_path)?;
        browserslist::parse(text).map_err(|message| ConfigError::Parse {
            path: self.browserslistrc_path.clone(),
            message,
        })
    }

    /// Parse the cached `.babelrc` and prepare it for `targets`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`], [`ConfigError::Io`],
    /// [`ConfigError::Parse`] or [`ConfigError::MissingPreset`].
    pub fn transpiler(&self, targets: &TargetList) -> Result<TranspilerConfig, ConfigError> {
        let text = read_once(&self.babelrc, &self.babelrc_path)?;
        let config = TranspilerConfig::parse(text).map_err(|message| ConfigError::Parse {
            path: self.babelrc_path.clone(),
            message,
        })?;
        config.prepare(targets).map_err(|e| match e {
            PrepareError::MissingEnvPreset => ConfigError::MissingPreset {
                preset: ENV_PRESET.to_string(),
                path: self.babelrc_path.clone(),
            },
            PrepareError::PresetsNotAList => ConfigError::Parse {
                path: self.babelrc_path.clone(),
                message: "'presets' must be a list".to_string(),
            },
        })
    }
}

/// Return the cached text of `path`, reading it on first use.
///
/// A failed read leaves the slot empty so a later call retries.
fn read_once<'a>(slot: &'a OnceLock<String>, path: &Path) -> Result<&'a str, ConfigError> {
    if let Some(text) = slot.get() {
        return Ok(text.as_str());
    }
    let text = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    Ok(slot.get_or_init(|| text).as_str())
}
