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
use crate::curve::Knot;

/// Acceleration, in input seconds per output second squared, used to bring
/// playback back to normal speed after the last knot.
pub const DEFAULT_TAIL_ACCELERATION: f64 = 5.0;

/// Constant-acceleration extrapolation past the last knot of a time map.
///
/// Starting from the knot's position and slope, the playback speed ramps
/// linearly to 1.0 and then stays there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BallisticTail {
    x0: f64,
    y0: f64,
    slope0: f64,
    /// Signed acceleration, pointing towards unit slope.
    accel: f64,
    /// Output seconds spent ramping.
    duration: f64,
}

impl BallisticTail {
    /// Builds the tail anchored at `anchor`. `acceleration` must be positive.
    pub fn new(anchor: &Knot, acceleration: f64) -> Self {
        let delta = 1.0 - anchor.slope;
        let accel = if delta >= 0.0 {
            acceleration
        } else {
            -acceleration
        };

        BallisticTail {
            x0: anchor.x,
            y0: anchor.y,
            slope0: anchor.slope,
            accel,
            duration: delta / accel,
        }
    }

    /// Output time the ramp starts at.
    pub fn start_x(&self) -> f64 {
        self.x0
    }

    /// Output seconds spent ramping.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Output time the ramp reaches unit slope.
    pub fn end_x(&self) -> f64 {
        self.x0 + self.duration
    }

    /// Input position at the end of the ramp.
    pub fn end_y(&self) -> f64 {
        self.ramp(self.duration)
    }

    #[inline]
    fn ramp(&self, t: f64) -> f64 {
        0.5 * self.accel * t * t + self.slope0 * t + self.y0
    }

    /// Returns `(y, slope)` at output time `x`, which should not precede `start_x`.
    #[inline]
    pub fn evaluate(&self, x: f64) -> (f64, f64) {
        let t = x - self.x0;
        if t < self.duration {
            (self.ramp(t), self.accel * t + self.slope0)
        } else {
            (self.end_y() + (t - self.duration), 1.0)
        }
    }
}
