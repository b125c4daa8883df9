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
use std::sync::Arc;

/// A read-only store of stereo frames at a fixed sample rate.
/// Samplers only ever read from a source; they never mutate it, so a source
/// can be shared between any number of samplers and viewers.
pub trait StereoSource: Send + Sync {
    /// Get the sample rate of this source
    fn rate(&self) -> u32;

    /// Get the number of stereo frames in this source
    fn number_of_samples(&self) -> u64;

    /// Get the frame at the given index. Out of range indices return silence.
    fn sample(&self, index: u64) -> [f32; 2];

    /// Copies `count` frames starting at `pos` into `dst` as interleaved
    /// stereo. `dst` must hold at least `count * 2` values. Frames past the
    /// end of the source are written as silence.
    fn get_samples(&self, pos: u64, count: usize, dst: &mut [f32]) {
        for (i, frame) in dst[..count * 2].chunks_exact_mut(2).enumerate() {
            let [l, r] = self.sample(pos + i as u64);
            frame[0] = l;
            frame[1] = r;
        }
    }

    /// Duration of the source in seconds.
    fn seconds(&self) -> f64 {
        self.number_of_samples() as f64 / self.rate() as f64
    }
}

/// Blanket implementation for shared sources, so an `Arc<TrackBuffer>` can be
/// handed anywhere a source is expected.
impl<T: StereoSource + ?Sized> StereoSource for Arc<T> {
    fn rate(&self) -> u32 {
        (**self).rate()
    }

    fn number_of_samples(&self) -> u64 {
        (**self).number_of_samples()
    }

    fn sample(&self, index: u64) -> [f32; 2] {
        (**self).sample(index)
    }

    fn get_samples(&self, pos: u64, count: usize, dst: &mut [f32]) {
        (**self).get_samples(pos, count, dst)
    }
}
