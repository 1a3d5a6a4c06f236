//! Configuration for matcheq: analysis settings and batch jobs.
//!
//! # Features
//!
//! - **Settings**: [`AnalysisSettings`] with TOML load/save and validation
//! - **Jobs**: [`Job`] files describing calibration pairs, method and targets
//! - **Paths**: platform-specific user config directory
//!
//! Settings are layered: command-line flags over a job's `[settings]` table
//! over the user `settings.toml` over built-in defaults. See [`resolve`].
//!
//! # Example
//!
//! ```rust,no_run
//! use matcheq_config::{AnalysisSettings, Job, resolve};
//!
//! let job = Job::load("session/job.toml").unwrap();
//! let settings = resolve(&[&job.settings]).unwrap();
//! println!("designing {} taps", settings.ntaps);
//! ```

mod error;
mod job;
mod settings;

/// Platform-specific paths for configuration.
pub mod paths;

/// Settings and job validation.
pub mod validation;

pub use error::ConfigError;
pub use job::{Job, Method, PairEntry};
pub use paths::{user_config_dir, user_settings_path};
pub use settings::{AnalysisSettings, SettingsOverrides};
pub use validation::{ValidationError, ValidationResult};

/// User settings with `layers` applied in order (later layers win), then
/// validated.
pub fn resolve(layers: &[&SettingsOverrides]) -> Result<AnalysisSettings, ConfigError> {
    let settings = layers
        .iter()
        .fold(AnalysisSettings::load_user()?, |acc, layer| acc.with_overrides(layer));
    settings.validate()?;
    Ok(settings)
}
