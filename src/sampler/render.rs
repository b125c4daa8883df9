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
use std::time::Instant;

use tracing::{debug, info};

use crate::audio::{StereoBlock, StereoSource, TrackBuffer};

use super::Sampler;

/// Frames per rendered block.
pub const DEFAULT_BLOCK_SIZE: usize = 1152;

/// Materializes the sampler's whole output stream into `track`.
///
/// The sampler is switched to the track's rate, then pulled block by block.
/// Every block is blended at the track's write cursor; the block in which the
/// sampler ends is padded with silence and is the last one written. Returns
/// the number of frames the sampler produced.
pub fn render<S: Sampler + ?Sized>(
    sampler: &mut S,
    track: &mut TrackBuffer,
    block_size: usize,
) -> u64 {
    assert!(block_size > 0, "block size must be positive");
    sampler.set_sample_rate(track.rate());

    info!(
        sample_rate = track.rate(),
        block_size,
        duration = sampler.get_duration(),
        "Rendering sampler output"
    );
    let started = Instant::now();

    let mut block = StereoBlock::silent(block_size);
    let mut index = 0u64;
    let mut blocks = 0usize;
    loop {
        let mut filled = 0;
        while filled < block_size {
            match sampler.get_sample(index) {
                Some(frame) => block.set_frame(filled, frame),
                None => break,
            }
            index += 1;
            filled += 1;
        }

        if filled < block_size {
            block.silence_from(filled);
        }
        track.write_blend(&block);
        blocks += 1;

        if filled < block_size {
            break;
        }
    }

    debug!(blocks, "Wrote blocks");
    info!(
        frames = index,
        track_frames = track.number_of_samples(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Render finished"
    );
    index
}
