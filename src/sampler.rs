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
pub mod direct;
pub mod render;
pub mod scratch;
pub mod tail;

#[cfg(test)]
mod tests;

pub use direct::DirectSampler;
pub use render::{render, DEFAULT_BLOCK_SIZE};
pub use scratch::ScratchSampler;
pub use tail::{BallisticTail, DEFAULT_TAIL_ACCELERATION};

/// Output rate a sampler starts with until told otherwise.
pub const DEFAULT_OUTPUT_RATE: u32 = 44100;

/// A pull-based generator of stereo output frames.
///
/// `get_sample` is a pure function of the sampler's state and the read-only
/// tracks it references, so frames may be requested in any order.
pub trait Sampler: Send {
    /// Total length of the output stream in seconds.
    fn get_duration(&self) -> f64;

    /// Sets the output sample rate.
    fn set_sample_rate(&mut self, rate: u32);

    /// Gets the output sample rate.
    fn sample_rate(&self) -> u32;

    /// Produces output frame `index`, or `None` once the stream has ended.
    fn get_sample(&self, index: u64) -> Option<[f32; 2]>;
}

/// Blanket implementation for Box<dyn Sampler> so boxed samplers can be used
/// directly with generic code such as `render` and `Player`.
impl Sampler for Box<dyn Sampler> {
    fn get_duration(&self) -> f64 {
        (**self).get_duration()
    }

    fn set_sample_rate(&mut self, rate: u32) {
        (**self).set_sample_rate(rate)
    }

    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn get_sample(&self, index: u64) -> Option<[f32; 2]> {
        (**self).get_sample(index)
    }
}
