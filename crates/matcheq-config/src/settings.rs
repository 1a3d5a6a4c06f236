//! Analysis settings file format.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::validation::{ValidationError, ValidationResult, collect};
use matcheq_analysis::design::{DEFAULT_F_MAX, DEFAULT_F_MIN, DEFAULT_NTAPS};
use matcheq_analysis::estimate::DEFAULT_WINDOW_SIZE;
use matcheq_analysis::smoothing::DEFAULT_BANDS_PER_OCTAVE;
use matcheq_analysis::{DesignConfig, EstimatorConfig};

/// Estimator and designer settings.
///
/// # TOML Format
///
/// ```toml
/// window_size = 8192
/// bands_per_octave = 3.0
/// ntaps = 4097
/// f_min = 20.0
/// f_max = 16000.0
/// ```
///
/// Missing keys take their defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisSettings {
    /// STFT segment length in samples.
    pub window_size: usize,
    /// Smoothing resolution (3.0 = third-octave).
    pub bands_per_octave: f64,
    /// Inverse filter length (odd).
    pub ntaps: usize,
    /// Lower edge of the corrected band in Hz.
    pub f_min: f64,
    /// Upper edge of the corrected band in Hz.
    pub f_max: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            bands_per_octave: DEFAULT_BANDS_PER_OCTAVE,
            ntaps: DEFAULT_NTAPS,
            f_min: DEFAULT_F_MIN,
            f_max: DEFAULT_F_MAX,
        }
    }
}

/// Partial settings, as found in a job's `[settings]` table or on the
/// command line.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SettingsOverrides {
    /// See [`AnalysisSettings::window_size`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_size: Option<usize>,
    /// See [`AnalysisSettings::bands_per_octave`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bands_per_octave: Option<f64>,
    /// See [`AnalysisSettings::ntaps`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ntaps: Option<usize>,
    /// See [`AnalysisSettings::f_min`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f_min: Option<f64>,
    /// See [`AnalysisSettings::f_max`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f_max: Option<f64>,
}

impl AnalysisSettings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// User settings from the platform config directory, or defaults when
    /// the file does not exist.
    pub fn load_user() -> Result<Self, ConfigError> {
        let path = crate::paths::user_settings_path();
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the settings to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the settings to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Settings with every `Some` field of `overrides` replacing ours.
    pub fn with_overrides(mut self, overrides: &SettingsOverrides) -> Self {
        if let Some(v) = overrides.window_size {
            self.window_size = v;
        }
        if let Some(v) = overrides.bands_per_octave {
            self.bands_per_octave = v;
        }
        if let Some(v) = overrides.ntaps {
            self.ntaps = v;
        }
        if let Some(v) = overrides.f_min {
            self.f_min = v;
        }
        if let Some(v) = overrides.f_max {
            self.f_max = v;
        }
        self
    }

    /// Check every field, reporting all problems at once.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if self.window_size < 16 || self.window_size % 2 != 0 {
            errors.push(ValidationError::OutOfRange {
                param: "window_size",
                value: self.window_size as f64,
                reason: "must be even and at least 16",
            });
        }
        if !(self.bands_per_octave.is_finite() && self.bands_per_octave > 0.0) {
            errors.push(ValidationError::OutOfRange {
                param: "bands_per_octave",
                value: self.bands_per_octave,
                reason: "must be positive",
            });
        }
        if self.ntaps == 0 || self.ntaps % 2 == 0 {
            errors.push(ValidationError::OutOfRange {
                param: "ntaps",
                value: self.ntaps as f64,
                reason: "must be odd and positive",
            });
        }
        if self.f_min.is_nan() || self.f_min <= 0.0 {
            errors.push(ValidationError::OutOfRange {
                param: "f_min",
                value: self.f_min,
                reason: "must be positive",
            });
        }
        if self.f_max.is_nan() || self.f_max <= self.f_min {
            errors.push(ValidationError::OutOfRange {
                param: "f_max",
                value: self.f_max,
                reason: "must be above f_min",
            });
        }

        collect(errors)
    }

    /// Estimator half of the settings.
    pub fn estimator_config(&self) -> EstimatorConfig {
        EstimatorConfig {
            window_size: self.window_size,
            bands_per_octave: self.bands_per_octave,
        }
    }

    /// Designer half of the settings.
    pub fn design_config(&self) -> DesignConfig {
        DesignConfig {
            ntaps: self.ntaps,
            f_min: self.f_min,
            f_max: self.f_max,
        }
    }
}
