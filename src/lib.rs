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

//! Time-warped audio resampling for programmable turntable scratch effects.
//!
//! A `ScratchSampler` maps output time to source position through an editable
//! Hermite spline and renders the result with a speed-dependent kernel. A
//! `DirectSampler` provides the fixed-ratio baseline.

pub mod audio;
pub mod config;
pub mod curve;
pub mod player;
pub mod project;
pub mod resample;
pub mod sampler;
#[cfg(test)]
mod testutil;
