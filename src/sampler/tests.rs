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
use crate::audio::{StereoSource, TrackBuffer};
use crate::testutil::{calculate_rms, ramp_track, sine_track, sine_wave};

use super::*;

const RATE: u32 = 44100;

#[test]
fn test_direct_reproduces_sine() {
    let track = sine_track(RATE, RATE as usize, 1.0);
    let mut sampler = DirectSampler::new(track);
    sampler.set_sample_rate(RATE);

    let expected = sine_wave(RATE as usize, 1.0);
    for (i, value) in expected.iter().enumerate() {
        let [l, r] = sampler.get_sample(i as u64).unwrap();
        assert!((l - value).abs() <= f32::EPSILON, "frame {}", i);
        assert!((r - value).abs() <= f32::EPSILON, "frame {}", i);
    }
    assert_eq!(sampler.get_sample(RATE as u64), None);
}

#[test]
fn test_unit_speed_scratch_matches_source() {
    let track = sine_track(RATE, RATE as usize, 3.0);
    let mut sampler = ScratchSampler::new(track.clone());
    sampler.set_sample_rate(RATE);
    sampler.set_start_slope(1.0);

    for i in (0..RATE as u64).step_by(7) {
        let [l, r] = sampler.get_sample(i).unwrap();
        let [el, er] = track.sample(i);
        assert!((l - el).abs() < 1e-5, "frame {}", i);
        assert!((r - er).abs() < 1e-5, "frame {}", i);
    }
}

#[test]
fn test_seed_only_scratch_matches_direct() {
    let track = sine_track(RATE, RATE as usize, 5.0);
    let mut direct = DirectSampler::new(track.clone());
    let mut scratch = ScratchSampler::new(track);
    direct.set_sample_rate(RATE);
    scratch.set_sample_rate(RATE);
    scratch.set_start_pos(0.0);
    scratch.set_start_slope(1.0);

    // With unit start slope the tail never ramps, so both play the whole track.
    assert!((scratch.get_duration() - direct.get_duration()).abs() < 1e-12);

    let mut i = 0u64;
    while let Some([dl, dr]) = direct.get_sample(i) {
        let [sl, sr] = scratch.get_sample(i).unwrap();
        assert!((dl - sl).abs() < 1e-5, "frame {}", i);
        assert!((dr - sr).abs() < 1e-5, "frame {}", i);
        i += 1;
    }
    assert_eq!(i, RATE as u64);
    assert_eq!(scratch.get_sample(i), None);
}

#[test]
fn test_reversed_region_plays_backwards() {
    let track = ramp_track(RATE, RATE as usize * 2);
    let mut sampler = ScratchSampler::new(track);
    sampler.set_sample_rate(RATE);
    sampler.set_start_pos(1.0);
    sampler.set_start_slope(0.0);
    let i = sampler.add_control_point(1.0, 0.0).unwrap();
    sampler.set_control_point_slope(i, 0.0);

    let mut previous = sampler.time_map(0.0).0;
    for n in 1..=100 {
        let x = n as f64 * 0.01;
        let (y, slope) = sampler.time_map(x);
        assert!(y < previous, "input position rose at x = {}", x);
        if x < 1.0 {
            assert!(slope < 0.0, "slope at x = {}", x);
        }
        previous = y;
    }

    // The rising left channel therefore falls in the output.
    let mut previous = f32::INFINITY;
    for index in (RATE as u64 / 20..RATE as u64 * 19 / 20).step_by(100) {
        let [l, r] = sampler.get_sample(index).unwrap();
        assert!(l < previous, "output rose at frame {}", index);
        assert!((l + r - 1.0).abs() < 1e-5);
        previous = l;
    }
}

#[test]
fn test_duration_ignores_interior_knots() {
    let track = sine_track(RATE, RATE as usize * 4, 1.0);
    let mut sampler = ScratchSampler::new(track);
    sampler.add_control_point(0.5, 0.3);
    sampler.add_control_point(1.0, 0.6);

    let baseline = sampler.get_duration();
    for y in [0.0, 0.5, 1.0, 2.0, 10.0] {
        sampler.move_control_point(0, y);
        assert!((sampler.get_duration() - baseline).abs() < 1e-12);
    }
}

#[test]
fn test_duration_is_monotone_in_last_knot() {
    let track = sine_track(RATE, RATE as usize * 4, 1.0);
    let mut sampler = ScratchSampler::new(track);
    sampler.add_control_point(1.0, 0.0);

    // Moving the last knot later in the source leaves less of it to play.
    let mut previous = f64::INFINITY;
    for n in 0..=40 {
        sampler.move_control_point(0, n as f64 * 0.125);
        let duration = sampler.get_duration();
        assert!(duration <= previous + 1e-12);
        assert!(duration >= 1.0 + sampler.tail().duration());
        previous = duration;
    }
}

#[test]
fn test_fast_forward_stays_bounded() {
    let track = sine_track(RATE, RATE as usize * 4, 440.0);
    let mut sampler = ScratchSampler::new(track);
    sampler.set_sample_rate(RATE);
    sampler.set_start_slope(4.0);
    let i = sampler.add_control_point(0.5, 2.0).unwrap();
    sampler.set_control_point_slope(i, 4.0);

    // Four times normal speed engages the triangular window, whose output is
    // a convex combination and can't exceed the source's peak.
    for index in (0..RATE as u64 / 2).step_by(13) {
        let (_, slope) = sampler.time_map(index as f64 / RATE as f64);
        assert!(slope > 1.0);
        let [l, r] = sampler.get_sample(index).unwrap();
        assert!(l.abs() <= 1.0 + 1e-6 && r.abs() <= 1.0 + 1e-6);
    }
}

#[test]
fn test_extreme_slope_yields_silence_promptly() {
    let track = sine_track(RATE, RATE as usize, 5.0);
    let mut sampler = ScratchSampler::new(track);
    sampler.set_sample_rate(RATE);
    sampler.set_start_slope(1e12);
    for index in 0..4 {
        let [l, r] = sampler.get_sample(index).unwrap();
        assert!(l.abs() < 1e-3 && r.abs() < 1e-3, "frame {}", index);
    }

    // An infinite slope has no defined duration, so the stream is empty.
    sampler.set_start_slope(f64::INFINITY);
    assert_eq!(sampler.get_sample(0), None);
    let mut out = TrackBuffer::new(RATE);
    assert_eq!(render(&mut sampler, &mut out, DEFAULT_BLOCK_SIZE), 0);
    assert_eq!(out.number_of_samples(), DEFAULT_BLOCK_SIZE as u64);
}

#[test]
fn test_render_scratch_with_background() {
    let track = sine_track(RATE, RATE as usize, 10.0);
    let background = sine_track(22050, 22050 * 3, 30.0);
    let mut sampler = ScratchSampler::new(track);
    sampler.set_start_slope(1.0);
    sampler.set_start_volume(0.0);
    sampler.set_background(Some(background));
    sampler.set_background_volume(0.5);

    let mut out = TrackBuffer::new(48000);
    let frames = render(&mut sampler, &mut out, DEFAULT_BLOCK_SIZE);

    // Foreground is muted, so only the background at half gain remains.
    let expected = (sampler.get_duration() * 48000.0).ceil() as u64;
    assert!(frames.abs_diff(expected) <= 1);
    assert_eq!(out.number_of_samples() % DEFAULT_BLOCK_SIZE as u64, 0);

    let left: Vec<f32> = out.interleaved()[..frames as usize * 2]
        .iter()
        .step_by(2)
        .copied()
        .collect();
    let rms = calculate_rms(&left);
    let sine_rms = 0.5 / 2.0f32.sqrt();
    assert!((rms - sine_rms).abs() < 0.01, "rms {}", rms);
}

#[test]
fn test_boxed_sampler_dispatch() {
    let track = sine_track(RATE, 1000, 1.0);
    let mut samplers: Vec<Box<dyn Sampler>> = vec![
        Box::new(DirectSampler::new(track.clone())),
        Box::new(ScratchSampler::new(track)),
    ];

    for sampler in samplers.iter_mut() {
        sampler.set_sample_rate(8000);
        assert_eq!(sampler.sample_rate(), 8000);
        assert!(sampler.get_duration() > 0.0);
        assert!(sampler.get_sample(0).is_some());
    }
}
