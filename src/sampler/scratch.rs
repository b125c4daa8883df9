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

//! The time-warping sampler.
//!
//! A `ScratchSampler` maps every output second to an input second through an
//! editable Hermite time map. Past the last knot the map continues with a
//! ballistic tail that eases playback back to normal speed. The foreground is
//! resampled at the local speed of the map, scaled by a volume envelope and
//! mixed with an optional background track playing at constant speed.
//!
//! The first knot of the time map and the first point of the volume envelope
//! are the "start" point and are never exposed as control points: control
//! point `i` is knot `i + 1`.

use std::io::{Read, Write};

use crate::audio::{SharedTrack, StereoSource};
use crate::curve::{ControlCurve, CurveError, Envelope, EnvelopePoint, Knot};
use crate::resample::{fixed_position, resample};

use super::tail::{BallisticTail, DEFAULT_TAIL_ACCELERATION};
use super::{Sampler, DEFAULT_OUTPUT_RATE};

/// Longest stretch of source, in seconds, played at normal speed after the
/// tail settles.
const MAX_REMAINING_SECONDS: f64 = 1.5;

/// Maps a control point index to the underlying curve index.
#[inline]
fn curve_index(i: usize) -> usize {
    i + 1
}

#[derive(Clone, Debug)]
pub struct ScratchSampler {
    source: SharedTrack,
    background: Option<SharedTrack>,
    background_volume: f64,
    time_map: ControlCurve,
    volume: Envelope,
    rate_out: u32,
    tail_acceleration: f64,
}

impl ScratchSampler {
    /// Creates a sampler that starts at the beginning of `source`, stopped,
    /// at full volume.
    pub fn new(source: SharedTrack) -> Self {
        ScratchSampler {
            source,
            background: None,
            background_volume: 1.0,
            time_map: ControlCurve::new(0.0, 0.0),
            volume: Envelope::new(1.0),
            rate_out: DEFAULT_OUTPUT_RATE,
            tail_acceleration: DEFAULT_TAIL_ACCELERATION,
        }
    }

    pub fn source(&self) -> &SharedTrack {
        &self.source
    }

    /// The full time map, start knot included.
    pub fn time_curve(&self) -> &ControlCurve {
        &self.time_map
    }

    /// The full volume envelope, start point included.
    pub fn volume_curve(&self) -> &Envelope {
        &self.volume
    }

    pub fn start_pos(&self) -> f64 {
        self.time_map.left_bound().y
    }

    pub fn start_slope(&self) -> f64 {
        self.time_map.left_bound().slope
    }

    pub fn set_start_pos(&mut self, y: f64) {
        self.time_map.move_y(0, y);
    }

    pub fn set_start_slope(&mut self, slope: f64) {
        self.time_map.set_slope(0, slope);
    }

    pub fn num_control_points(&self) -> usize {
        self.time_map.len() - 1
    }

    pub fn control_point(&self, i: usize) -> Knot {
        *self.time_map.knot(curve_index(i))
    }

    /// Adds a control point and returns its index. Points at or before the
    /// start point are rejected with `None` and leave the map untouched.
    pub fn add_control_point(&mut self, x: f64, y: f64) -> Option<usize> {
        if x <= self.time_map.left_bound().x {
            return None;
        }
        Some(self.time_map.add(x, y) - 1)
    }

    pub fn move_control_point(&mut self, i: usize, y: f64) {
        self.time_map.move_y(curve_index(i), y);
    }

    /// Moves a control point, clamping `x` between its neighbours. Returns the
    /// `x` actually used.
    pub fn move_control_point_to(&mut self, i: usize, x: f64, y: f64) -> f64 {
        self.time_map.move_to(curve_index(i), x, y)
    }

    pub fn set_control_point_slope(&mut self, i: usize, slope: f64) {
        self.time_map.set_slope(curve_index(i), slope);
    }

    pub fn remove_control_point(&mut self, i: usize) {
        self.time_map.remove(curve_index(i));
    }

    pub fn start_volume(&self) -> f64 {
        self.volume.first().y
    }

    pub fn set_start_volume(&mut self, y: f64) {
        self.volume.move_y(0, y);
    }

    pub fn num_volume_control_points(&self) -> usize {
        self.volume.len() - 1
    }

    pub fn volume_control_point(&self, i: usize) -> EnvelopePoint {
        *self.volume.point(curve_index(i))
    }

    /// Adds a volume control point, see `add_control_point`.
    pub fn add_volume_control_point(&mut self, x: f64, y: f64) -> Option<usize> {
        if x <= self.volume.first().x {
            return None;
        }
        Some(self.volume.add(x, y) - 1)
    }

    pub fn move_volume_control_point(&mut self, i: usize, y: f64) {
        self.volume.move_y(curve_index(i), y);
    }

    pub fn move_volume_control_point_to(&mut self, i: usize, x: f64, y: f64) -> f64 {
        self.volume.move_to(curve_index(i), x, y)
    }

    pub fn remove_volume_control_point(&mut self, i: usize) {
        self.volume.remove(curve_index(i));
    }

    /// Volume at output time `x`, holding the nearest endpoint outside the envelope.
    pub fn volume(&self, x: f64) -> f64 {
        match self.volume.evaluate(x) {
            Some(y) => y,
            None if x < self.volume.first().x => self.volume.first().y,
            None => self.volume.last().y,
        }
    }

    pub fn background(&self) -> Option<&SharedTrack> {
        self.background.as_ref()
    }

    pub fn set_background(&mut self, background: Option<SharedTrack>) {
        self.background = background;
    }

    pub fn background_volume(&self) -> f64 {
        self.background_volume
    }

    pub fn set_background_volume(&mut self, volume: f64) {
        self.background_volume = volume;
    }

    pub fn tail_acceleration(&self) -> f64 {
        self.tail_acceleration
    }

    /// Sets how quickly the tail returns to normal speed. Must be positive.
    pub fn set_tail_acceleration(&mut self, acceleration: f64) {
        assert!(
            acceleration > 0.0 && acceleration.is_finite(),
            "tail acceleration must be positive, got {}",
            acceleration
        );
        self.tail_acceleration = acceleration;
    }

    /// The tail anchored at the current last knot.
    pub fn tail(&self) -> BallisticTail {
        BallisticTail::new(self.time_map.right_bound(), self.tail_acceleration)
    }

    /// Maps output time `x` to `(input time, input seconds per output second)`.
    /// Times before the start point hold the start point's position and slope.
    pub fn time_map(&self, x: f64) -> (f64, f64) {
        if let Some(mapped) = self.time_map.evaluate(x) {
            return mapped;
        }
        let start = self.time_map.left_bound();
        if x < start.x {
            return (start.y, start.slope);
        }
        self.tail().evaluate(x)
    }

    /// Input positions at `0, interval, 2 * interval, ...` up to the end of
    /// the output stream, tail included.
    pub fn uniform_time_samples(&self, interval: f64) -> Vec<f64> {
        let mut samples: Vec<f64> = self
            .time_map
            .uniform_samples(interval, self.time_map.left_bound().x)
            .collect();
        if interval <= 0.0 {
            return samples;
        }

        let tail = self.tail();
        let duration = self.get_duration();
        loop {
            let x = interval * samples.len() as f64;
            if x >= duration {
                break;
            }
            samples.push(tail.evaluate(x).0);
        }
        samples
    }

    /// Writes the time map, the volume envelope and the background gain.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), CurveError> {
        self.time_map.write_to(w)?;
        self.volume.write_to(w)?;
        w.write_all(&(self.background_volume as f32).to_ne_bytes())?;
        Ok(())
    }

    /// Replaces the time map, volume envelope and background gain with ones
    /// written by `write_to`. Nothing changes if reading fails.
    pub fn read_from<R: Read>(&mut self, r: &mut R) -> Result<(), CurveError> {
        let time_map = ControlCurve::read_from(r)?;
        let volume = Envelope::read_from(r)?;
        let mut word = [0u8; 4];
        r.read_exact(&mut word)?;

        self.time_map = time_map;
        self.volume = volume;
        self.background_volume = f32::from_ne_bytes(word) as f64;
        Ok(())
    }

    fn foreground(&self, t_out: f64) -> Option<[f32; 2]> {
        let rate_in = self.source.rate() as f64;
        let (t_in, slope) = self.time_map(t_out);
        let pos = t_in * rate_in;
        if pos < 0.0 || pos >= self.source.number_of_samples() as f64 {
            return None;
        }

        let step = slope.abs() * rate_in / self.rate_out as f64;
        let [l, r] = resample(&*self.source, pos, step);
        let amp = self.volume(t_out) as f32;
        Some([l * amp, r * amp])
    }

    fn background_frame(&self, index: u64) -> Option<[f32; 2]> {
        let background = self.background.as_ref()?;
        let rate_in = background.rate();
        let pos = fixed_position(index, rate_in, self.rate_out);
        if pos >= background.number_of_samples() as f64 {
            return None;
        }

        let step = rate_in as f64 / self.rate_out as f64;
        let [l, r] = resample(&**background, pos, step);
        let gain = self.background_volume as f32;
        Some([l * gain, r * gain])
    }
}

impl Sampler for ScratchSampler {
    fn get_duration(&self) -> f64 {
        let tail = self.tail();
        let remaining = (self.source.seconds() - tail.end_y()).clamp(0.0, MAX_REMAINING_SECONDS);
        tail.end_x() + remaining
    }

    fn set_sample_rate(&mut self, rate: u32) {
        self.rate_out = rate;
    }

    fn sample_rate(&self) -> u32 {
        self.rate_out
    }

    fn get_sample(&self, index: u64) -> Option<[f32; 2]> {
        let t_out = index as f64 / self.rate_out as f64;
        let duration = self.get_duration();
        if duration.is_nan() || t_out >= duration {
            return None;
        }

        let mut out = [0.0f32; 2];
        for [l, r] in [self.foreground(t_out), self.background_frame(index)]
            .into_iter()
            .flatten()
        {
            out[0] += l;
            out[1] += r;
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::audio::TrackBuffer;

    fn constant_track(rate: u32, seconds: f64, value: f32) -> SharedTrack {
        let frames = (rate as f64 * seconds) as usize;
        Arc::new(TrackBuffer::from_frames(rate, &vec![[value, value]; frames]))
    }

    #[test]
    fn test_seed_state() {
        let sampler = ScratchSampler::new(constant_track(1000, 1.0, 0.0));
        assert_eq!(sampler.start_pos(), 0.0);
        assert_eq!(sampler.start_slope(), 0.0);
        assert_eq!(sampler.start_volume(), 1.0);
        assert_eq!(sampler.num_control_points(), 0);
        assert_eq!(sampler.num_volume_control_points(), 0);
        assert_eq!(sampler.background_volume(), 1.0);
        assert!(sampler.background().is_none());
        assert_eq!(sampler.sample_rate(), DEFAULT_OUTPUT_RATE);
    }

    #[test]
    fn test_control_points_are_offset_past_start() {
        let mut sampler = ScratchSampler::new(constant_track(1000, 1.0, 0.0));
        assert_eq!(sampler.add_control_point(1.0, 0.5), Some(0));
        assert_eq!(sampler.add_control_point(0.5, 0.25), Some(0));
        assert_eq!(sampler.add_control_point(2.0, 0.75), Some(2));
        assert_eq!(sampler.num_control_points(), 3);
        assert_eq!(sampler.control_point(1), Knot::new(1.0, 0.5, 0.0));

        sampler.set_control_point_slope(1, 2.0);
        sampler.move_control_point(1, 0.6);
        assert_eq!(sampler.control_point(1), Knot::new(1.0, 0.6, 2.0));

        let x = sampler.move_control_point_to(1, 5.0, 0.6);
        assert!(x > 0.5 && x < 2.0);

        sampler.remove_control_point(0);
        assert_eq!(sampler.num_control_points(), 2);
        assert_eq!(sampler.start_pos(), 0.0);
    }

    #[test]
    fn test_start_point_is_protected() {
        let mut sampler = ScratchSampler::new(constant_track(1000, 1.0, 0.0));
        assert_eq!(sampler.add_control_point(0.0, 0.5), None);
        assert_eq!(sampler.add_control_point(-1.0, 0.5), None);
        assert_eq!(sampler.add_volume_control_point(0.0, 0.5), None);
        assert_eq!(sampler.start_pos(), 0.0);
        assert_eq!(sampler.start_volume(), 1.0);

        sampler.set_start_pos(0.25);
        sampler.set_start_slope(1.0);
        sampler.set_start_volume(0.5);
        assert_eq!(sampler.start_pos(), 0.25);
        assert_eq!(sampler.start_slope(), 1.0);
        assert_eq!(sampler.start_volume(), 0.5);
    }

    #[test]
    fn test_time_map_joins_curve_and_tail() {
        let mut sampler = ScratchSampler::new(constant_track(1000, 5.0, 0.0));
        sampler.set_start_slope(1.0);
        let i = sampler.add_control_point(1.0, 1.0).unwrap();
        sampler.set_control_point_slope(i, 1.0);

        // Straight line inside the curve.
        let (y, slope) = sampler.time_map(0.5);
        assert!((y - 0.5).abs() < 1e-12);
        assert!((slope - 1.0).abs() < 1e-12);

        // Unit-slope tail beyond it.
        assert_eq!(sampler.time_map(1.0), (1.0, 1.0));
        assert_eq!(sampler.time_map(3.0), (3.0, 1.0));

        // Before the start point the start point holds.
        assert_eq!(sampler.time_map(-1.0), (0.0, 1.0));
    }

    #[test]
    fn test_duration_clamps_remaining_source() {
        // Stopped start ramps for 0.2s and ends 0.1s into the source.
        let mut sampler = ScratchSampler::new(constant_track(1000, 10.0, 0.0));
        assert!((sampler.get_duration() - (0.2 + 1.5)).abs() < 1e-9);

        let short = ScratchSampler::new(constant_track(1000, 0.5, 0.0));
        assert!((short.get_duration() - (0.2 + 0.4)).abs() < 1e-9);

        // Tail past the end of the source leaves nothing remaining.
        sampler.set_start_pos(20.0);
        assert!((sampler.get_duration() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_volume_clamps_to_endpoints() {
        let mut sampler = ScratchSampler::new(constant_track(1000, 1.0, 0.0));
        sampler.add_volume_control_point(1.0, 0.0);
        assert_eq!(sampler.volume(-1.0), 1.0);
        assert!((sampler.volume(0.25) - 0.75).abs() < 1e-12);
        assert_eq!(sampler.volume(1.0), 0.0);
        assert_eq!(sampler.volume(7.0), 0.0);

        let p = sampler.volume_control_point(0);
        assert_eq!((p.x, p.y), (1.0, 0.0));
        sampler.move_volume_control_point(0, 0.5);
        assert_eq!(sampler.volume(3.0), 0.5);
        let x = sampler.move_volume_control_point_to(0, -2.0, 0.5);
        assert!(x > 0.0);
        sampler.remove_volume_control_point(0);
        assert_eq!(sampler.num_volume_control_points(), 0);
        assert_eq!(sampler.volume(3.0), 1.0);
    }

    #[test]
    fn test_envelope_scales_foreground() {
        let mut sampler = ScratchSampler::new(constant_track(1000, 2.0, 0.8));
        sampler.set_sample_rate(1000);
        sampler.set_start_slope(1.0);
        sampler.set_start_volume(0.5);

        let [l, r] = sampler.get_sample(100).unwrap();
        assert!((l - 0.4).abs() < 1e-6);
        assert!((r - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_foreground_is_silent() {
        let mut sampler = ScratchSampler::new(constant_track(1000, 1.0, 0.8));
        sampler.set_sample_rate(1000);
        sampler.set_start_slope(1.0);
        sampler.set_start_pos(-0.5);

        // Reading before the source start is silence, yet the stream continues.
        assert_eq!(sampler.get_sample(10), Some([0.0, 0.0]));
        let [l, _] = sampler.get_sample(700).unwrap();
        assert!((l - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_background_mixes_at_fixed_rate() {
        let mut sampler = ScratchSampler::new(constant_track(1000, 0.1, 0.0));
        sampler.set_sample_rate(1000);
        sampler.set_start_slope(1.0);
        sampler.set_background(Some(constant_track(500, 10.0, 0.5)));
        sampler.set_background_volume(0.5);

        let [l, r] = sampler.get_sample(10).unwrap();
        assert!((l - 0.25).abs() < 1e-6);
        assert!((r - 0.25).abs() < 1e-6);

        // The foreground decides when the stream ends.
        let end = (sampler.get_duration() * 1000.0).ceil() as u64;
        assert!(sampler.get_sample(end).is_none());
    }

    #[test]
    fn test_exhausted_background_contributes_silence() {
        let mut sampler = ScratchSampler::new(constant_track(1000, 2.0, 0.0));
        sampler.set_sample_rate(1000);
        sampler.set_start_slope(1.0);
        sampler.set_background(Some(constant_track(1000, 0.1, 0.5)));

        assert!((sampler.get_sample(50).unwrap()[0] - 0.5).abs() < 1e-6);
        assert_eq!(sampler.get_sample(500), Some([0.0, 0.0]));
    }

    #[test]
    fn test_uniform_time_samples_cover_tail() {
        let mut sampler = ScratchSampler::new(constant_track(1000, 2.0, 0.0));
        let i = sampler.add_control_point(0.5, 0.25).unwrap();
        sampler.set_control_point_slope(i, 0.0);

        let interval = 0.05;
        let samples = sampler.uniform_time_samples(interval);
        let duration = sampler.get_duration();
        let expected = (duration / interval).ceil() as usize;
        assert!(samples.len().abs_diff(expected) <= 1);
        assert!(interval * ((samples.len() - 1) as f64) < duration);

        for (n, y) in samples.iter().enumerate() {
            let x = interval * n as f64;
            assert!((y - sampler.time_map(x).0).abs() < 1e-9, "x = {}", x);
        }
    }

    #[test]
    fn test_record_round_trip() {
        let track = constant_track(1000, 1.0, 0.0);
        let mut sampler = ScratchSampler::new(track.clone());
        sampler.set_start_pos(0.25);
        sampler.set_start_slope(0.5);
        let i = sampler.add_control_point(1.5, 0.75).unwrap();
        sampler.set_control_point_slope(i, -1.0);
        sampler.add_volume_control_point(2.0, 0.5);
        sampler.set_background_volume(0.25);

        let mut bytes = Vec::new();
        sampler.write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), (4 + 2 * 12) + (4 + 2 * 8) + 4);

        let mut restored = ScratchSampler::new(track);
        restored.read_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(restored.time_curve(), sampler.time_curve());
        assert_eq!(restored.volume_curve(), sampler.volume_curve());
        assert_eq!(restored.background_volume(), 0.25);
    }

    #[test]
    fn test_point_dragged_onto_neighbour_reloads() {
        let track = constant_track(1000, 1.0, 0.0);
        let mut sampler = ScratchSampler::new(track.clone());
        sampler.add_control_point(1.0, 0.5);
        sampler.add_control_point(2.0, 0.5);
        sampler.add_volume_control_point(1.0, 0.5);
        sampler.add_volume_control_point(2.0, 0.5);

        let x = sampler.move_control_point_to(1, 0.5, 0.7);
        assert!(x > 1.0);
        let x = sampler.move_volume_control_point_to(1, 0.5, 0.7);
        assert!(x > 1.0);

        let mut bytes = Vec::new();
        sampler.write_to(&mut bytes).unwrap();
        let mut restored = ScratchSampler::new(track);
        restored.read_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(restored.num_control_points(), 2);
        assert!(restored.control_point(1).x > restored.control_point(0).x);
        assert!(restored.volume_control_point(1).x > restored.volume_control_point(0).x);
    }

    #[test]
    fn test_failed_read_leaves_sampler_untouched() {
        let mut sampler = ScratchSampler::new(constant_track(1000, 1.0, 0.0));
        sampler.set_start_pos(0.5);
        let mut bytes = Vec::new();
        sampler.time_curve().write_to(&mut bytes).unwrap();

        let mut other = ScratchSampler::new(constant_track(1000, 1.0, 0.0));
        assert!(other.read_from(&mut bytes.as_slice()).is_err());
        assert_eq!(other.start_pos(), 0.0);
    }

    #[test]
    #[should_panic]
    fn test_non_positive_acceleration_panics() {
        let mut sampler = ScratchSampler::new(constant_track(1000, 1.0, 0.0));
        sampler.set_tail_acceleration(0.0);
    }
}
