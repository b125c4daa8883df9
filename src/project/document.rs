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
use serde::{Deserialize, Serialize};

use crate::sampler::ScratchSampler;

use super::error::ProjectError;

fn unity() -> f64 {
    1.0
}

/// JSON form of a project.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub(super) struct ProjectDocument {
    pub filename_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename_bgm: Option<String>,
    #[serde(default = "unity")]
    pub bgm_volume: f64,
    #[serde(default)]
    pub timemap: TimeMapDocument,
    #[serde(default)]
    pub volume: VolumeDocument,
}

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
pub(super) struct TimeMapDocument {
    #[serde(default)]
    pub start_pos: f64,
    #[serde(default)]
    pub start_slope: f64,
    #[serde(default)]
    pub control_points: Vec<KnotDocument>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub(super) struct KnotDocument {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub slope: f64,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub(super) struct VolumeDocument {
    #[serde(default = "unity")]
    pub start_volume: f64,
    #[serde(default)]
    pub control_points: Vec<PointDocument>,
}

impl Default for VolumeDocument {
    fn default() -> Self {
        VolumeDocument {
            start_volume: 1.0,
            control_points: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub(super) struct PointDocument {
    pub x: f64,
    pub y: f64,
}

impl ProjectDocument {
    /// Captures the sampler's editable state.
    pub fn capture(source: String, background: Option<String>, sampler: &ScratchSampler) -> Self {
        let control_points = (0..sampler.num_control_points())
            .map(|i| {
                let knot = sampler.control_point(i);
                KnotDocument {
                    x: knot.x,
                    y: knot.y,
                    slope: knot.slope,
                }
            })
            .collect();
        let volume_points = (0..sampler.num_volume_control_points())
            .map(|i| {
                let point = sampler.volume_control_point(i);
                PointDocument {
                    x: point.x,
                    y: point.y,
                }
            })
            .collect();

        ProjectDocument {
            filename_source: source,
            filename_bgm: background,
            bgm_volume: sampler.background_volume(),
            timemap: TimeMapDocument {
                start_pos: sampler.start_pos(),
                start_slope: sampler.start_slope(),
                control_points,
            },
            volume: VolumeDocument {
                start_volume: sampler.start_volume(),
                control_points: volume_points,
            },
        }
    }

    /// The background file name, with an empty name meaning no background.
    pub fn background(&self) -> Option<&str> {
        self.filename_bgm.as_deref().filter(|name| !name.is_empty())
    }

    /// Replays the captured edits onto a freshly created sampler.
    pub fn apply(&self, sampler: &mut ScratchSampler) -> Result<(), ProjectError> {
        sampler.set_start_pos(self.timemap.start_pos);
        sampler.set_start_slope(self.timemap.start_slope);
        for knot in &self.timemap.control_points {
            let i = sampler
                .add_control_point(knot.x, knot.y)
                .ok_or(ProjectError::ControlPointBeforeStart(knot.x))?;
            sampler.set_control_point_slope(i, knot.slope);
        }

        sampler.set_start_volume(self.volume.start_volume);
        for point in &self.volume.control_points {
            sampler
                .add_volume_control_point(point.x, point.y)
                .ok_or(ProjectError::ControlPointBeforeStart(point.x))?;
        }

        sampler.set_background_volume(self.bgm_volume);
        Ok(())
    }
}
