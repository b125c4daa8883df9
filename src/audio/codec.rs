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

//! Decoding files into stereo tracks and encoding tracks back to disk.
//!
//! Decoding goes through symphonia, so anything it can probe (WAV, MP3, FLAC,
//! Ogg/Vorbis, ...) can be used as a source. Encoding writes WAV through hound.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use hound::{WavSpec, WavWriter};
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::IntoSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use symphonia::default::{get_codecs, get_probe};
use tracing::{debug, info, warn};

use super::buffer::TrackBuffer;
use super::error::AudioError;
use super::format::{OutputFormat, SampleFormat};
use super::traits::StereoSource;

/// Number of frames handed to the writer at a time.
const WRITE_CHUNK_FRAMES: usize = 1152;

/// Decodes an entire audio file into a stereo track at the file's native rate.
/// Mono sources are duplicated to both channels; sources with more than two
/// channels keep only the first two.
pub fn decode<P: AsRef<Path>>(path: P) -> Result<TrackBuffer, AudioError> {
    let path = path.as_ref();
    let file_path = path.to_string_lossy().to_string();
    info!(path = ?path, "Decoding audio file");

    // Include the path in the error so the user sees which file failed.
    let file = File::open(path).map_err(|e| {
        AudioError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();
    let probed = get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| AudioError::Probe(file_path.clone(), e.to_string()))?;
    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::NoAudioTrack(file_path.clone()))?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let sample_rate = params
        .sample_rate
        .ok_or_else(|| AudioError::UnknownSampleRate(file_path.clone()))?;

    let decoder_opts: DecoderOptions = Default::default();
    let mut decoder = get_codecs()
        .make(&params, &decoder_opts)
        .map_err(|e| AudioError::Probe(file_path.clone(), e.to_string()))?;

    let mut samples: Vec<f32> = match params.n_frames {
        Some(n_frames) => Vec::with_capacity(n_frames as usize * 2),
        None => Vec::new(),
    };

    while let Some(packet) = read_next_packet(format_reader.as_mut(), decoder.as_mut())? {
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(decoded) => push_stereo(decoded, &mut samples),
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                let decoded = decoder.decode(&packet)?;
                push_stereo(decoded, &mut samples);
            }
            Err(SymphoniaError::DecodeError(e)) => {
                // A corrupt packet shouldn't take the whole file down with it.
                warn!(path = ?path, error = e, "Skipping undecodable packet");
            }
            Err(e) => return Err(AudioError::Decode(e)),
        }
    }

    let track = TrackBuffer::from_interleaved(sample_rate, samples);
    info!(
        path = ?path,
        sample_rate,
        frames = track.number_of_samples(),
        duration_ms = (track.seconds() * 1000.0) as u64,
        "Audio file decoded"
    );
    Ok(track)
}

/// Reads the next packet, resetting the decoder when the format asks for it.
/// Returns `Ok(None)` at the end of the stream.
fn read_next_packet(
    format_reader: &mut dyn FormatReader,
    decoder: &mut dyn Decoder,
) -> Result<Option<Packet>, AudioError> {
    loop {
        match format_reader.next_packet() {
            Ok(packet) => return Ok(Some(packet)),
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(None)
            }
            // Some formats report DecodeError at EOF instead of IoError
            Err(SymphoniaError::DecodeError(_)) => return Ok(None),
            Err(e) => return Err(AudioError::Decode(e)),
        }
    }
}

/// Appends a decoded buffer to `out` as interleaved stereo.
fn push_stereo(decoded: AudioBufferRef, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::F32(buf) => interleave_stereo(&buf, out),
        AudioBufferRef::F64(buf) => interleave_stereo(&buf, out),
        AudioBufferRef::S8(buf) => interleave_stereo(&buf, out),
        AudioBufferRef::S16(buf) => interleave_stereo(&buf, out),
        AudioBufferRef::S24(buf) => interleave_stereo(&buf, out),
        AudioBufferRef::S32(buf) => interleave_stereo(&buf, out),
        AudioBufferRef::U8(buf) => interleave_stereo(&buf, out),
        AudioBufferRef::U16(buf) => interleave_stereo(&buf, out),
        AudioBufferRef::U24(buf) => interleave_stereo(&buf, out),
        AudioBufferRef::U32(buf) => interleave_stereo(&buf, out),
    }
}

/// Interleaves the first two planes of a planar buffer. A single plane is
/// used for both channels.
fn interleave_stereo<T>(buf: &AudioBuffer<T>, out: &mut Vec<f32>)
where
    T: Sample + IntoSample<f32>,
{
    let frames = buf.frames();
    let channels = buf.spec().channels.count();
    if channels == 0 {
        return;
    }
    let left = buf.chan(0);
    let right = buf.chan(if channels > 1 { 1 } else { 0 });

    out.reserve(frames * 2);
    for frame_idx in 0..frames {
        out.push(left[frame_idx].into_sample());
        out.push(right[frame_idx].into_sample());
    }
}

/// Encodes a track as a stereo WAV file.
pub fn encode_wav<S: StereoSource + ?Sized, P: AsRef<Path>>(
    track: &S,
    path: P,
    format: OutputFormat,
) -> Result<(), AudioError> {
    let path = path.as_ref();
    let spec = WavSpec {
        channels: 2,
        sample_rate: track.rate(),
        bits_per_sample: format.bits_per_sample,
        sample_format: match format.sample_format {
            SampleFormat::Float => hound::SampleFormat::Float,
            SampleFormat::Int => hound::SampleFormat::Int,
        },
    };
    let mut writer = WavWriter::create(path, spec)?;
    let int_scale = ((1i64 << (format.bits_per_sample - 1)) - 1) as f32;

    let mut remaining = track.number_of_samples();
    let mut pos = 0u64;
    let mut chunk = vec![0.0f32; WRITE_CHUNK_FRAMES * 2];
    while remaining > 0 {
        let count = (remaining as usize).min(WRITE_CHUNK_FRAMES);
        track.get_samples(pos, count, &mut chunk);
        for &sample in &chunk[..count * 2] {
            match format.sample_format {
                SampleFormat::Float => writer.write_sample(sample)?,
                SampleFormat::Int => {
                    writer.write_sample((sample.clamp(-1.0, 1.0) * int_scale).round() as i32)?
                }
            }
        }
        remaining -= count as u64;
        pos += count as u64;
    }

    writer.finalize()?;
    info!(path = ?path, format = %format, frames = pos, "Wrote WAV file");
    Ok(())
}

/// Dumps a track as raw interleaved native-endian 32-bit floats with no header.
pub fn dump_raw<S: StereoSource + ?Sized, P: AsRef<Path>>(
    track: &S,
    path: P,
) -> Result<(), AudioError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);

    let mut remaining = track.number_of_samples();
    let mut pos = 0u64;
    let mut chunk = vec![0.0f32; WRITE_CHUNK_FRAMES * 2];
    while remaining > 0 {
        let count = (remaining as usize).min(WRITE_CHUNK_FRAMES);
        track.get_samples(pos, count, &mut chunk);
        for sample in &chunk[..count * 2] {
            writer.write_all(&sample.to_ne_bytes())?;
        }
        remaining -= count as u64;
        pos += count as u64;
    }
    writer.flush()?;

    debug!(path = ?path, frames = pos, "Dumped raw samples");
    Ok(())
}
