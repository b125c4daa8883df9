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
use std::sync::Arc;

pub mod buffer;
pub mod codec;
pub mod error;
pub mod format;
pub mod traits;

pub use buffer::{StereoBlock, TrackBuffer};
pub use codec::{decode, dump_raw, encode_wav};
pub use error::AudioError;
pub use format::{OutputFormat, SampleFormat};
pub use traits::StereoSource;

/// A track shared between samplers, players and viewers.
pub type SharedTrack = Arc<TrackBuffer>;
