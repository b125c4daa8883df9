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

//! Dual-mode resampling kernel shared by every sampler.
//!
//! `step` is the number of input frames consumed per output frame. At or
//! below unit speed the kernel linearly interpolates between the two frames
//! around `pos`. Above it, the kernel averages every frame within `step` of
//! `pos` under a triangular window, which widens with speed and keeps fast
//! motion from aliasing.

use crate::audio::StereoSource;

/// Reads one stereo frame at fractional input position `pos`.
#[inline]
pub fn resample<S: StereoSource + ?Sized>(source: &S, pos: f64, step: f64) -> [f32; 2] {
    if !pos.is_finite() || !step.is_finite() {
        return [0.0, 0.0];
    }
    if step <= 1.0 {
        linear(source, pos)
    } else {
        triangular(source, pos, step)
    }
}

/// Input position of output frame `index` when playing at a fixed rate ratio.
#[inline]
pub fn fixed_position(index: u64, rate_in: u32, rate_out: u32) -> f64 {
    index as f64 * rate_in as f64 / rate_out as f64
}

/// Frame `k` widened to f64. Negative indices are silence.
#[inline]
fn tap<S: StereoSource + ?Sized>(source: &S, k: i64) -> [f64; 2] {
    if k < 0 {
        return [0.0, 0.0];
    }
    let [l, r] = source.sample(k as u64);
    [l as f64, r as f64]
}

fn linear<S: StereoSource + ?Sized>(source: &S, pos: f64) -> [f32; 2] {
    let floor = pos.floor();
    let frac = pos - floor;
    let k = floor as i64;
    let a = tap(source, k);
    let b = tap(source, k + 1);
    [
        (a[0] * (1.0 - frac) + b[0] * frac) as f32,
        (a[1] * (1.0 - frac) + b[1] * frac) as f32,
    ]
}

fn triangular<S: StereoSource + ?Sized>(source: &S, pos: f64, step: f64) -> [f32; 2] {
    let len = source.number_of_samples() as f64;
    // Frames before the start of the source carry no weight at all, so the
    // result stays normalized near the beginning.
    let first = (pos - step).ceil().max(0.0);
    // Last tap strictly before `pos + step`.
    let last = (pos + step).ceil() - 1.0;
    let last_read = last.min(len - 1.0);

    let (mut sum_w, mut sum_l, mut sum_r) = (0.0f64, 0.0f64, 0.0f64);
    if first <= last_read {
        for k in first as u64..=last_read as u64 {
            let w = step - (k as f64 - pos).abs();
            let [l, r] = tap(source, k as i64);
            sum_w += w;
            sum_l += w * l;
            sum_r += w * r;
        }
    }
    // Taps past the end are silent but still weigh.
    sum_w += window_weight(first.max(len), last, pos, step);

    if sum_w <= 0.0 {
        return [0.0, 0.0];
    }
    [(sum_l / sum_w) as f32, (sum_r / sum_w) as f32]
}

/// Sum of `step - |k - pos|` over the integers `k` in `[first, last]`.
fn window_weight(first: f64, last: f64, pos: f64, step: f64) -> f64 {
    if first > last {
        return 0.0;
    }
    let split = pos.floor().clamp(first - 1.0, last);
    arithmetic_sum(first, split, step - pos, 1.0)
        + arithmetic_sum(split + 1.0, last, step + pos, -1.0)
}

/// Sum of `offset + sign * k` over the integers `k` in `[first, last]`.
fn arithmetic_sum(first: f64, last: f64, offset: f64, sign: f64) -> f64 {
    if first > last {
        return 0.0;
    }
    let count = last - first + 1.0;
    count * offset + sign * (first + last) * count / 2.0
}
