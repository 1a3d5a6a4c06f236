//! Batch job file format.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::settings::SettingsOverrides;
use crate::validation::{ValidationError, ValidationResult, collect};

/// How a job turns its pairs into corrected files.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// One filter from the (mean of the) pairs and one calibration gain,
    /// applied with that fixed gain to every target.
    #[default]
    Calibrate,
    /// A filter per pair, correcting each probe against its own reference.
    PerPair,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Calibrate => write!(f, "calibrate"),
            Self::PerPair => write!(f, "per-pair"),
        }
    }
}

/// A reference recording and the probe recorded through the path to correct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PairEntry {
    /// Reference path recording.
    pub reference: PathBuf,
    /// Recording through the path to correct.
    pub probe: PathBuf,
}

/// A batch job.
///
/// # TOML Format
///
/// ```toml
/// method = "calibrate"
/// targets = ["Media/Arceau_01.wav", "Media/Arceau_02.wav"]
/// suffix = ""
///
/// [[pairs]]
/// reference = "MatchEQ/ref_file.wav"
/// probe = "MatchEQ/pmx_file.wav"
///
/// [settings]
/// ntaps = 4097
/// ```
///
/// Relative paths are resolved against the job file's directory by
/// [`Job::load`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Job {
    /// Workflow to run.
    #[serde(default)]
    pub method: Method,

    /// Files to correct (`calibrate` only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<PathBuf>,

    /// Appended to `_corr` in output names.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub suffix: String,

    /// Calibration pairs.
    #[serde(default)]
    pub pairs: Vec<PairEntry>,

    /// Per-job settings overrides.
    #[serde(default)]
    pub settings: SettingsOverrides,
}

impl Job {
    /// Load a job from a TOML file, resolving relative paths against the
    /// file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let job = Self::from_toml(&content)?;
        Ok(match path.parent() {
            Some(base) => job.resolve_paths(base),
            None => job,
        })
    }

    /// Load a job from a TOML string. Paths are left as written.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Convert the job to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Join every relative path onto `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        for pair in &mut self.pairs {
            resolve(&mut pair.reference);
            resolve(&mut pair.probe);
        }
        for target in &mut self.targets {
            resolve(target);
        }
        self
    }

    /// Structural checks; settings are validated after merging.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();
        if self.pairs.is_empty() {
            errors.push(ValidationError::EmptyList("pairs"));
        }
        if self.method == Method::Calibrate && self.targets.is_empty() {
            errors.push(ValidationError::EmptyList("targets"));
        }
        collect(errors)
    }
}
