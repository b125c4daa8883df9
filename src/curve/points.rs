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

/// A point that can live in a `Points` list and be persisted as a run of
/// 32-bit floats in declared field order.
pub trait CurvePoint: Copy {
    /// Number of f32 fields in the on-disk record.
    const FIELDS: usize;

    /// Creates a point at `(x, y)` with every other field zeroed.
    fn at(x: f64, y: f64) -> Self;

    fn x(&self) -> f64;
    fn set_x(&mut self, x: f64);
    fn set_y(&mut self, y: f64);

    /// Appends the record fields in declared order.
    fn write_fields(&self, out: &mut Vec<f32>);

    /// Builds a point from exactly `FIELDS` values.
    fn read_fields(fields: &[f32]) -> Self;
}

/// A non-empty list of points ordered by `x`.
///
/// `x` never decreases. Moved points keep at least one f32 step from their
/// neighbours when there is room, so a saved list reloads in order. Loaded
/// records may repeat an `x`; the zero-width segment between such points is
/// never evaluated.
///
/// Index validity is a caller contract: out-of-range indices panic.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Points<P> {
    points: Vec<P>,
}

impl<P: CurvePoint> Points<P> {
    pub fn new(seed: P) -> Self {
        Self { points: vec![seed] }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn get(&self, i: usize) -> &P {
        &self.points[i]
    }

    pub fn as_slice(&self) -> &[P] {
        &self.points
    }

    pub fn first(&self) -> &P {
        &self.points[0]
    }

    pub fn last(&self) -> &P {
        &self.points[self.points.len() - 1]
    }

    /// Index of the first point whose `x` is strictly greater than `x`.
    fn upper_bound(&self, x: f64) -> usize {
        self.points.partition_point(|p| p.x() <= x)
    }

    /// Inserts a point at `(x, y)`. A point already sitting at exactly `x`
    /// has its `y` overwritten instead, leaving its other fields alone.
    pub fn add(&mut self, x: f64, y: f64) -> usize {
        let i = self.upper_bound(x);
        if i > 0 && self.points[i - 1].x() == x {
            self.points[i - 1].set_y(y);
            i - 1
        } else {
            self.points.insert(i, P::at(x, y));
            i
        }
    }

    pub fn get_mut(&mut self, i: usize) -> &mut P {
        &mut self.points[i]
    }

    /// Moves point `i` to `(x, y)`, clamping `x` between its neighbours so the
    /// list never needs re-sorting. Returns the clamped `x`.
    ///
    /// A clamped `x` lands one f32 step inside the neighbour, so the order
    /// survives a save. Neighbours closer than that pin `x` to the lower one.
    pub fn move_to(&mut self, i: usize, x: f64, y: f64) -> f64 {
        assert!(i < self.points.len(), "point index {} out of range", i);
        let lower = (i > 0).then(|| self.points[i - 1].x());
        let upper = self.points.get(i + 1).map(|p| p.x());

        let mut x = x;
        if let Some(lower) = lower {
            if x <= lower {
                x = step_above(lower);
            }
        }
        if let Some(upper) = upper {
            if x >= upper {
                x = step_below(upper);
            }
        }
        if let Some(lower) = lower {
            x = x.max(lower);
        }

        let point = &mut self.points[i];
        point.set_x(x);
        point.set_y(y);
        x
    }

    pub fn remove(&mut self, i: usize) {
        assert!(self.points.len() > 1, "cannot remove the only point");
        self.points.remove(i);
    }

    /// Index of the segment `[points[i].x, points[i + 1].x)` containing `x`,
    /// or `None` at/after the last point and before the first.
    pub fn bracket(&self, x: f64) -> Option<usize> {
        let i = self.upper_bound(x);
        if i == 0 || i == self.points.len() {
            None
        } else {
            Some(i - 1)
        }
    }

    /// Writes `int32 count` followed by `count` fixed-width records, native endian.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), CurveError> {
        let count = self.points.len() as i32;
        w.write_all(&count.to_ne_bytes())?;

        let mut fields = Vec::with_capacity(self.points.len() * P::FIELDS);
        for point in &self.points {
            point.write_fields(&mut fields);
        }
        let mut bytes = Vec::with_capacity(fields.len() * 4);
        for field in fields {
            bytes.extend_from_slice(&field.to_ne_bytes());
        }
        w.write_all(&bytes)?;
        Ok(())
    }

    /// Reads a list written by `write_to`. Repeated `x` values are accepted;
    /// a decreasing or NaN `x` is not.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, CurveError> {
        let mut word = [0u8; 4];
        r.read_exact(&mut word)?;
        let count = i32::from_ne_bytes(word);
        if count < 0 {
            return Err(CurveError::NegativeCount(count));
        }
        if count == 0 {
            return Err(CurveError::Empty);
        }

        let mut points: Vec<P> = Vec::with_capacity((count as usize).min(4096));
        let mut fields = vec![0.0f32; P::FIELDS];
        for i in 0..count as usize {
            for field in fields.iter_mut() {
                r.read_exact(&mut word)?;
                *field = f32::from_ne_bytes(word);
            }
            let point = P::read_fields(&fields);
            if point.x().is_nan() {
                return Err(CurveError::Unordered(i));
            }
            if let Some(prev) = points.last() {
                if point.x() < prev.x() {
                    return Err(CurveError::Unordered(i));
                }
            }
            points.push(point);
        }

        Ok(Self { points })
    }
}

/// The f32 following `x`'s rounded f32 value, widened back. Always greater
/// than `x` for finite `x` within f32 range.
fn step_above(x: f64) -> f64 {
    let stepped = (x as f32).next_up() as f64;
    if stepped > x {
        stepped
    } else {
        x.next_up()
    }
}

/// The f32 preceding `x`'s rounded f32 value, widened back.
fn step_below(x: f64) -> f64 {
    let stepped = (x as f32).next_down() as f64;
    if stepped < x {
        stepped
    } else {
        x.next_down()
    }
}
