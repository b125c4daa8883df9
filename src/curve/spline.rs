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

//! Editable cubic Hermite spline.
//!
//! Every knot carries an explicit tangent. Between two knots the curve is the
//! standard cubic Hermite interpolant of their values and tangents; outside
//! the knot range the curve is undefined and `evaluate` returns `None`.

use std::io::{Read, Write};

use super::error::CurveError;
use super::points::{CurvePoint, Points};

/// A spline knot: output time `x`, input time `y` and tangent `slope` (dy/dx).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Knot {
    pub x: f64,
    pub y: f64,
    pub slope: f64,
}

impl Knot {
    pub fn new(x: f64, y: f64, slope: f64) -> Self {
        Knot { x, y, slope }
    }
}

impl CurvePoint for Knot {
    const FIELDS: usize = 3;

    fn at(x: f64, y: f64) -> Self {
        Knot::new(x, y, 0.0)
    }

    fn x(&self) -> f64 {
        self.x
    }

    fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    fn set_y(&mut self, y: f64) {
        self.y = y;
    }

    fn write_fields(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(&[self.x as f32, self.y as f32, self.slope as f32]);
    }

    fn read_fields(fields: &[f32]) -> Self {
        Knot::new(fields[0] as f64, fields[1] as f64, fields[2] as f64)
    }
}

/// An editable cubic Hermite spline with explicit per-knot tangents.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlCurve {
    knots: Points<Knot>,
}

impl Default for ControlCurve {
    fn default() -> Self {
        ControlCurve::new(0.0, 0.0)
    }
}

impl ControlCurve {
    /// Creates a curve seeded with a single knot at `x = 0`.
    pub fn new(y: f64, slope: f64) -> Self {
        ControlCurve {
            knots: Points::new(Knot::new(0.0, y, slope)),
        }
    }

    /// Number of knots, never zero.
    pub fn len(&self) -> usize {
        self.knots.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn knot(&self, i: usize) -> &Knot {
        self.knots.get(i)
    }

    pub fn knots(&self) -> &[Knot] {
        self.knots.as_slice()
    }

    /// The knot with the smallest `x`.
    pub fn left_bound(&self) -> &Knot {
        self.knots.first()
    }

    /// The knot with the largest `x`.
    pub fn right_bound(&self) -> &Knot {
        self.knots.last()
    }

    /// Adds a knot with a zero tangent and returns its index. If a knot
    /// already exists at exactly `x`, only its `y` is replaced.
    pub fn add(&mut self, x: f64, y: f64) -> usize {
        self.knots.add(x, y)
    }

    /// Sets knot `i`'s `y`, keeping its `x` and tangent.
    pub fn move_y(&mut self, i: usize, y: f64) {
        self.knots.get_mut(i).y = y;
    }

    /// Moves knot `i` to `(x, y)`; `x` is clamped between the neighbouring
    /// knots. Returns the `x` actually used.
    pub fn move_to(&mut self, i: usize, x: f64, y: f64) -> f64 {
        self.knots.move_to(i, x, y)
    }

    pub fn set_slope(&mut self, i: usize, slope: f64) {
        self.knots.get_mut(i).slope = slope;
    }

    /// Removes knot `i`. The last remaining knot can't be removed.
    pub fn remove(&mut self, i: usize) {
        self.knots.remove(i);
    }

    /// Evaluates the curve, returning `(y, dy/dx)`. Fails at or after the last
    /// knot and before the first; there is no extrapolation here.
    pub fn evaluate(&self, x: f64) -> Option<(f64, f64)> {
        let i = self.knots.bracket(x)?;
        Some(hermite(self.knots.get(i), self.knots.get(i + 1), x))
    }

    /// Evaluates `y` at `start_x, start_x + interval, ...` across every segment
    /// from the one containing `start_x` up to the last knot. The sequence is
    /// empty when `start_x` is outside the curve or `interval` isn't positive.
    pub fn uniform_samples(&self, interval: f64, start_x: f64) -> UniformSamples<'_> {
        let segment = if interval > 0.0 {
            self.knots.bracket(start_x)
        } else {
            None
        };

        UniformSamples {
            knots: self.knots.as_slice(),
            segment: segment.unwrap_or(usize::MAX),
            start_x,
            interval,
            step: 0,
        }
    }

    /// Writes the curve as `int32 count` + `count` records of `{x, y, slope}` f32.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), CurveError> {
        self.knots.write_to(w)
    }

    /// Reads a curve written by `write_to`.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, CurveError> {
        Ok(ControlCurve {
            knots: Points::read_from(r)?,
        })
    }
}

/// Cubic Hermite interpolation between two knots, returning value and derivative.
#[inline]
fn hermite(k0: &Knot, k1: &Knot, x: f64) -> (f64, f64) {
    let h = k1.x - k0.x;
    let t = (x - k0.x) / h;
    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    let y = h00 * k0.y + h10 * h * k0.slope + h01 * k1.y + h11 * h * k1.slope;

    let slope = ((6.0 * t2 - 6.0 * t) * k0.y + (-6.0 * t2 + 6.0 * t) * k1.y) / h
        + (3.0 * t2 - 4.0 * t + 1.0) * k0.slope
        + (3.0 * t2 - 2.0 * t) * k1.slope;

    (y, slope)
}

/// Uniformly spaced curve values, see `ControlCurve::uniform_samples`.
/// Clone the iterator to restart it.
#[derive(Clone, Debug)]
pub struct UniformSamples<'a> {
    knots: &'a [Knot],
    segment: usize,
    start_x: f64,
    interval: f64,
    step: u64,
}

impl UniformSamples<'_> {
    /// The `x` of the next value to be produced.
    pub fn next_x(&self) -> f64 {
        self.start_x + self.interval * self.step as f64
    }
}

impl Iterator for UniformSamples<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let x = self.next_x();
        while self.segment.checked_add(1)? < self.knots.len() {
            let (k0, k1) = (&self.knots[self.segment], &self.knots[self.segment + 1]);
            if x < k1.x {
                self.step += 1;
                return Some(hermite(k0, k1, x).0);
            }
            self.segment += 1;
        }
        None
    }
}
