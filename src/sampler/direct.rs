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
use crate::audio::{SharedTrack, StereoSource};
use crate::resample::{fixed_position, resample};

use super::{Sampler, DEFAULT_OUTPUT_RATE};

/// Plays a track at its natural speed, converting only the sample rate.
#[derive(Clone, Debug)]
pub struct DirectSampler {
    source: SharedTrack,
    rate_out: u32,
}

impl DirectSampler {
    pub fn new(source: SharedTrack) -> Self {
        DirectSampler {
            source,
            rate_out: DEFAULT_OUTPUT_RATE,
        }
    }

    pub fn source(&self) -> &SharedTrack {
        &self.source
    }
}

impl Sampler for DirectSampler {
    fn get_duration(&self) -> f64 {
        self.source.seconds()
    }

    fn set_sample_rate(&mut self, rate: u32) {
        self.rate_out = rate;
    }

    fn sample_rate(&self) -> u32 {
        self.rate_out
    }

    fn get_sample(&self, index: u64) -> Option<[f32; 2]> {
        let rate_in = self.source.rate();
        let pos = fixed_position(index, rate_in, self.rate_out);
        if pos >= self.source.number_of_samples() as f64 {
            return None;
        }
        let step = rate_in as f64 / self.rate_out as f64;
        Some(resample(&*self.source, pos, step))
    }
}
