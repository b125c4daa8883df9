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
use std::path::PathBuf;

use crate::audio::AudioError;
use crate::curve::CurveError;

/// Errors raised while loading or saving a project.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Curve error: {0}")]
    Curve(#[from] CurveError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path is not valid UTF-8: {0:?}")]
    InvalidPath(PathBuf),

    #[error("Corrupt project file: {0}")]
    Corrupt(String),

    #[error("Control point at x = {0} does not come after the start point")]
    ControlPointBeforeStart(f64),
}
