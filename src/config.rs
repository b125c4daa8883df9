// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{path::Path, str::FromStr};

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::debug;

use crate::audio::{OutputFormat, SampleFormat};
use crate::sampler::{DEFAULT_BLOCK_SIZE, DEFAULT_OUTPUT_RATE, DEFAULT_TAIL_ACCELERATION};

pub mod error;

pub use error::ConfigError;

/// Prefix of environment variables that override settings, e.g.
/// `SCRATCHER_OUTPUT_RATE=48000`.
pub const ENV_PREFIX: &str = "SCRATCHER";

/// Render and playback settings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Output sample rate in Hz.
    output_rate: u32,
    /// Frames per rendered block.
    block_size: usize,
    /// Acceleration of the tail that returns playback to normal speed.
    tail_acceleration: f64,
    /// Encoded sample format, `int` or `float`.
    output_format: String,
    /// Encoded bits per sample.
    bits_per_sample: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            output_rate: DEFAULT_OUTPUT_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
            tail_acceleration: DEFAULT_TAIL_ACCELERATION,
            output_format: SampleFormat::Int.as_str().to_string(),
            bits_per_sample: 16,
        }
    }
}

impl Settings {
    /// Loads settings from an optional YAML file, then applies `SCRATCHER_*`
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml));
        }
        let settings: Settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        debug!(?settings, "Settings resolved");
        Ok(settings)
    }

    /// Parses settings from a YAML string, without environment overrides.
    pub fn from_yaml(yaml: &str) -> Result<Settings, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn tail_acceleration(&self) -> f64 {
        self.tail_acceleration
    }

    /// The encoded output format.
    pub fn output_format(&self) -> Result<OutputFormat, ConfigError> {
        let sample_format = SampleFormat::from_str(&self.output_format)
            .map_err(|e| ConfigError::InvalidValue("output_format", e.to_string()))?;
        OutputFormat::new(sample_format, self.bits_per_sample)
            .map_err(|e| ConfigError::InvalidValue("bits_per_sample", e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.output_rate == 0 {
            return Err(ConfigError::InvalidValue(
                "output_rate",
                "must be greater than zero".to_string(),
            ));
        }
        if self.block_size == 0 {
            return Err(ConfigError::InvalidValue(
                "block_size",
                "must be greater than zero".to_string(),
            ));
        }
        if !(self.tail_acceleration > 0.0 && self.tail_acceleration.is_finite()) {
            return Err(ConfigError::InvalidValue(
                "tail_acceleration",
                format!("must be positive, got {}", self.tail_acceleration),
            ));
        }
        self.output_format()?;
        Ok(())
    }
}
