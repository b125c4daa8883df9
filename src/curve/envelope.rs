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
use std::io::{Read, Write};

use super::error::CurveError;
use super::points::{CurvePoint, Points};

/// A breakpoint of a piecewise-linear envelope.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopePoint {
    pub x: f64,
    pub y: f64,
}

impl CurvePoint for EnvelopePoint {
    const FIELDS: usize = 2;

    fn at(x: f64, y: f64) -> Self {
        EnvelopePoint { x, y }
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
        out.extend_from_slice(&[self.x as f32, self.y as f32]);
    }

    fn read_fields(fields: &[f32]) -> Self {
        EnvelopePoint {
            x: fields[0] as f64,
            y: fields[1] as f64,
        }
    }
}

/// An editable piecewise-linear curve, used for volume automation.
/// Shares the editing rules of `ControlCurve` but carries no tangents.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    points: Points<EnvelopePoint>,
}

impl Default for Envelope {
    /// Unity gain.
    fn default() -> Self {
        Envelope::new(1.0)
    }
}

impl Envelope {
    /// Creates an envelope seeded with a single point at `x = 0`.
    pub fn new(y: f64) -> Self {
        Envelope {
            points: Points::new(EnvelopePoint { x: 0.0, y }),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn point(&self, i: usize) -> &EnvelopePoint {
        self.points.get(i)
    }

    pub fn points(&self) -> &[EnvelopePoint] {
        self.points.as_slice()
    }

    pub fn first(&self) -> &EnvelopePoint {
        self.points.first()
    }

    pub fn last(&self) -> &EnvelopePoint {
        self.points.last()
    }

    /// Adds a point and returns its index; an existing point at exactly `x`
    /// has its `y` replaced instead.
    pub fn add(&mut self, x: f64, y: f64) -> usize {
        self.points.add(x, y)
    }

    pub fn move_y(&mut self, i: usize, y: f64) {
        self.points.get_mut(i).y = y;
    }

    /// Moves point `i`, clamping `x` between its neighbours.
    /// Returns the `x` actually used.
    pub fn move_to(&mut self, i: usize, x: f64, y: f64) -> f64 {
        self.points.move_to(i, x, y)
    }

    pub fn remove(&mut self, i: usize) {
        self.points.remove(i);
    }

    /// Linear interpolation between the bracketing points. Fails at or after
    /// the last point and before the first.
    pub fn evaluate(&self, x: f64) -> Option<f64> {
        let i = self.points.bracket(x)?;
        let (p0, p1) = (self.points.get(i), self.points.get(i + 1));
        let t = (x - p0.x) / (p1.x - p0.x);
        Some(p0.y * (1.0 - t) + p1.y * t)
    }

    /// Writes the envelope as `int32 count` + `count` records of `{x, y}` f32.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), CurveError> {
        self.points.write_to(w)
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, CurveError> {
        Ok(Envelope {
            points: Points::read_from(r)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_interpolation() {
        let mut env = Envelope::new(1.0);
        env.add(1.0, 0.0);
        env.add(3.0, 1.0);

        assert_eq!(env.evaluate(0.0), Some(1.0));
        assert!((env.evaluate(0.25).unwrap() - 0.75).abs() < 1e-12);
        assert_eq!(env.evaluate(1.0), Some(0.0));
        assert!((env.evaluate(2.0).unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(env.evaluate(3.0), None);
        assert_eq!(env.evaluate(-0.5), None);
    }

    #[test]
    fn test_add_overwrites_duplicate() {
        let mut env = Envelope::new(1.0);
        assert_eq!(env.add(0.5, 0.2), 1);
        assert_eq!(env.add(0.5, 0.4), 1);
        assert_eq!(env.len(), 2);
        assert_eq!(env.point(1).y, 0.4);

        // The seed point can be overwritten the same way.
        assert_eq!(env.add(0.0, 0.3), 0);
        assert_eq!(env.first().y, 0.3);
    }

    #[test]
    fn test_move_to_clamps() {
        let mut env = Envelope::new(1.0);
        env.add(1.0, 0.5);
        env.add(2.0, 0.5);

        let x = env.move_to(1, 2.5, 0.9);
        assert!(x > 0.0 && x < 2.0);
        assert_eq!(env.point(1).y, 0.9);

        let x = env.move_to(1, -3.0, 0.9);
        assert!(x > 0.0 && x < 2.0);
    }

    #[test]
    fn test_remove_and_move_y() {
        let mut env = Envelope::new(1.0);
        env.add(1.0, 0.5);
        env.move_y(1, 0.25);
        assert_eq!(env.last().y, 0.25);
        env.remove(1);
        assert_eq!(env.len(), 1);
        assert_eq!(env.evaluate(0.5), None);
    }

    #[test]
    fn test_record_round_trip() {
        let mut env = Envelope::new(0.5);
        env.add(1.5, 0.25);
        let mut bytes = Vec::new();
        env.write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 4 + 2 * 8);
        assert_eq!(Envelope::read_from(&mut bytes.as_slice()).unwrap(), env);
    }
}
