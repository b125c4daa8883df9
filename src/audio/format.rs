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

use std::{fmt, str::FromStr};

use super::error::AudioError;

/// Sample format enumeration for encoded output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// Integer samples (16, 24 or 32 bit)
    Int,
    /// 32-bit floating point samples
    Float,
}

impl FromStr for SampleFormat {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float" | "Float" => Ok(SampleFormat::Float),
            "int" | "Int" => Ok(SampleFormat::Int),
            _ => Err(AudioError::UnsupportedFormat(format!(
                "unknown sample format '{}'",
                s
            ))),
        }
    }
}

impl SampleFormat {
    /// Convert to string representation
    pub fn as_str(self) -> &'static str {
        match self {
            SampleFormat::Float => "float",
            SampleFormat::Int => "int",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Format used when encoding a rendered track to disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputFormat {
    /// Sample format (integer or float)
    pub sample_format: SampleFormat,
    /// Bits per sample
    pub bits_per_sample: u16,
}

impl OutputFormat {
    /// Creates a new OutputFormat, rejecting combinations the WAV writer can't produce.
    pub fn new(sample_format: SampleFormat, bits_per_sample: u16) -> Result<Self, AudioError> {
        let supported = match sample_format {
            SampleFormat::Int => matches!(bits_per_sample, 16 | 24 | 32),
            SampleFormat::Float => bits_per_sample == 32,
        };
        if !supported {
            return Err(AudioError::UnsupportedFormat(format!(
                "{}-bit {}",
                bits_per_sample, sample_format
            )));
        }

        Ok(OutputFormat {
            sample_format,
            bits_per_sample,
        })
    }
}

impl Default for OutputFormat {
    /// 16-bit integer, the most widely playable WAV flavour.
    fn default() -> Self {
        OutputFormat {
            sample_format: SampleFormat::Int,
            bits_per_sample: 16,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit {}", self.bits_per_sample, self.sample_format)
    }
}
