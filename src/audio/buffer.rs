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
use super::traits::StereoSource;

/// A block of interleaved stereo frames to be blended into a `TrackBuffer`.
/// After the block is blended, the buffer's write cursor moves forward by
/// `cursor_delta` frames, which is usually the block length.
#[derive(Clone, Debug, Default)]
pub struct StereoBlock {
    /// Interleaved stereo samples: L, R, L, R, ...
    samples: Vec<f32>,
    /// How far the write cursor advances after this block is blended.
    cursor_delta: usize,
}

impl StereoBlock {
    /// Creates a silent block of `frames` frames that advances the cursor by its own length.
    pub fn silent(frames: usize) -> Self {
        Self {
            samples: vec![0.0; frames * 2],
            cursor_delta: frames,
        }
    }

    /// Creates a block from interleaved samples.
    pub fn from_interleaved(samples: Vec<f32>) -> Self {
        let cursor_delta = samples.len() / 2;
        Self {
            samples,
            cursor_delta,
        }
    }

    /// Number of frames in the block.
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    pub fn cursor_delta(&self) -> usize {
        self.cursor_delta
    }

    pub fn set_cursor_delta(&mut self, cursor_delta: usize) {
        self.cursor_delta = cursor_delta;
    }

    /// Writes a frame into the block.
    #[inline]
    pub fn set_frame(&mut self, index: usize, frame: [f32; 2]) {
        self.samples[index * 2] = frame[0];
        self.samples[index * 2 + 1] = frame[1];
    }

    /// Silences every frame from `start` to the end of the block.
    pub fn silence_from(&mut self, start: usize) {
        let start = (start * 2).min(self.samples.len());
        self.samples[start..].fill(0.0);
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

/// An in-memory stereo track at a fixed sample rate.
///
/// Tracks are built once, either by decoding a file or by a materializing
/// render pass, and are read-only from then on. Share them as `Arc<TrackBuffer>`.
#[derive(Clone, Debug)]
pub struct TrackBuffer {
    rate: u32,
    /// Interleaved stereo samples.
    data: Vec<f32>,
    /// Write cursor in frames, used by `write_blend`.
    cursor: u64,
}

impl TrackBuffer {
    /// Creates an empty track at the given sample rate.
    pub fn new(rate: u32) -> Self {
        Self {
            rate,
            data: Vec::new(),
            cursor: 0,
        }
    }

    /// Creates a track from interleaved stereo samples. A trailing odd sample is dropped.
    pub fn from_interleaved(rate: u32, mut data: Vec<f32>) -> Self {
        data.truncate(data.len() / 2 * 2);
        Self {
            rate,
            data,
            cursor: 0,
        }
    }

    /// Creates a track from per-frame stereo pairs.
    pub fn from_frames(rate: u32, frames: &[[f32; 2]]) -> Self {
        Self::from_interleaved(rate, frames.iter().flatten().copied().collect())
    }

    /// Creates a track from a mono signal, duplicating it to both channels.
    pub fn from_mono(rate: u32, mono: &[f32]) -> Self {
        Self::from_interleaved(rate, mono.iter().flat_map(|&s| [s, s]).collect())
    }

    /// Interleaved stereo samples.
    pub fn interleaved(&self) -> &[f32] {
        &self.data
    }

    /// Current write cursor in frames.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Adds the block's frames into the track at the write cursor, growing the
    /// track as needed, then advances the cursor by the block's cursor delta.
    pub fn write_blend(&mut self, block: &StereoBlock) {
        let start = self.cursor as usize * 2;
        let end = start + block.samples().len();
        if self.data.len() < end {
            self.data.resize(end, 0.0);
        }

        for (dst, src) in self.data[start..end].iter_mut().zip(block.samples()) {
            *dst += *src;
        }

        self.cursor += block.cursor_delta() as u64;
    }
}

impl StereoSource for TrackBuffer {
    fn rate(&self) -> u32 {
        self.rate
    }

    fn number_of_samples(&self) -> u64 {
        (self.data.len() / 2) as u64
    }

    #[inline]
    fn sample(&self, index: u64) -> [f32; 2] {
        if index >= self.number_of_samples() {
            return [0.0, 0.0];
        }
        let i = index as usize * 2;
        [self.data[i], self.data[i + 1]]
    }

    fn get_samples(&self, pos: u64, count: usize, dst: &mut [f32]) {
        let start = (pos.min(self.number_of_samples()) as usize) * 2;
        let end = (start + count * 2).min(self.data.len());
        let available = end - start;

        dst[..available].copy_from_slice(&self.data[start..end]);
        dst[available..count * 2].fill(0.0);
    }
}
