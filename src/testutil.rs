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
use std::{error::Error, f64::consts::PI, fs::File, path::PathBuf, sync::Arc};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::audio::{SharedTrack, TrackBuffer};

/// Generate `frames` samples of a sine completing `cycles` full periods.
pub fn sine_wave(frames: usize, cycles: f64) -> Vec<f32> {
    (0..frames)
        .map(|i| (2.0 * PI * cycles * i as f64 / frames as f64).sin() as f32)
        .collect()
}

/// A shared stereo track with the same sine on both channels.
pub fn sine_track(rate: u32, frames: usize, cycles: f64) -> SharedTrack {
    Arc::new(TrackBuffer::from_mono(rate, &sine_wave(frames, cycles)))
}

/// A shared stereo track whose left channel rises linearly from 0 to 1 and
/// whose right channel falls from 1 to 0.
pub fn ramp_track(rate: u32, frames: usize) -> SharedTrack {
    let frames: Vec<[f32; 2]> = (0..frames)
        .map(|i| {
            let v = i as f32 / frames as f32;
            [v, 1.0 - v]
        })
        .collect();
    Arc::new(TrackBuffer::from_frames(rate, &frames))
}

/// Calculate RMS (Root Mean Square) of a signal
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|&x| x * x).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Writes planar channels as an interleaved 32-bit float WAV file.
pub fn write_wav(
    path: PathBuf,
    samples: Vec<Vec<f32>>,
    sample_rate: u32,
) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;

    let num_channels = samples.len();
    assert!(num_channels > 0, "At least one channel is required");
    assert!(num_channels <= u16::MAX.into(), "Too many channels!");
    let frames = samples[0].len();
    assert!(
        samples.iter().all(|channel| channel.len() == frames),
        "Channels must have the same length"
    );

    let mut writer = WavWriter::new(
        file,
        WavSpec {
            channels: num_channels as u16,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        },
    )?;

    for frame in 0..frames {
        for channel in &samples {
            writer.write_sample(channel[frame])?;
        }
    }
    writer.finalize()?;

    Ok(())
}
