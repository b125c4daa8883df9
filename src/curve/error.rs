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

/// Errors raised while reading a persisted curve record.
#[derive(Debug, thiserror::Error)]
pub enum CurveError {
    #[error("Curve record has a negative point count ({0})")]
    NegativeCount(i32),

    #[error("Curve record has no points")]
    Empty,

    #[error("Curve points are out of order at index {0}")]
    Unordered(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
