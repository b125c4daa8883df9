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
use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tracing::{debug, info, span, Level, Span};

use crate::sampler::Sampler;

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("Sample rate must be greater than zero")]
    ZeroSampleRate,
}

#[derive(Debug, Default)]
struct PlaybackState {
    playing: bool,
    eof: bool,
    /// Next output frame to pull.
    frame: u64,
}

/// A playback cursor over a sampler.
///
/// An output device callback drives the player by calling `fill`. Edits go
/// through `edit`, which holds the same lock as `fill`, so the sampler never
/// changes while a buffer is being generated.
pub struct Player<S: Sampler> {
    sampler: Arc<Mutex<S>>,
    state: Mutex<PlaybackState>,
    span: Span,
}

impl<S: Sampler> Player<S> {
    /// Creates a stopped player positioned at the start.
    pub fn new(sampler: S) -> Player<S> {
        Player::from_shared(Arc::new(Mutex::new(sampler)))
    }

    /// Creates a player over a sampler that is shared with other owners.
    pub fn from_shared(sampler: Arc<Mutex<S>>) -> Player<S> {
        Player {
            sampler,
            state: Mutex::new(PlaybackState::default()),
            span: span!(Level::INFO, "player"),
        }
    }

    /// The shared sampler handle.
    pub fn sampler(&self) -> Arc<Mutex<S>> {
        self.sampler.clone()
    }

    /// Runs `f` with exclusive access to the sampler.
    pub fn edit<R, F: FnOnce(&mut S) -> R>(&self, f: F) -> R {
        let mut sampler = self.sampler.lock();
        f(&mut *sampler)
    }

    /// Switches the output rate, keeping the playback position in time.
    pub fn set_sample_rate(&self, rate: u32) -> Result<(), PlayerError> {
        if rate == 0 {
            return Err(PlayerError::ZeroSampleRate);
        }
        let mut state = self.state.lock();
        let mut sampler = self.sampler.lock();
        let old_rate = sampler.sample_rate();
        if old_rate == rate {
            return Ok(());
        }

        if old_rate > 0 {
            state.frame = (state.frame as f64 * rate as f64 / old_rate as f64).round() as u64;
        }
        sampler.set_sample_rate(rate);
        debug!(parent: &self.span, old_rate, rate, "Output rate changed");
        Ok(())
    }

    pub fn start(&self) {
        let mut state = self.state.lock();
        state.playing = true;
        state.eof = false;
        info!(parent: &self.span, frame = state.frame, "Playback started");
    }

    /// Stops playback, keeping the current position.
    pub fn stop(&self) {
        let position = self.position();
        let mut state = self.state.lock();
        if !state.playing {
            return;
        }
        if state.eof {
            let rate = self.sampler.lock().sample_rate();
            state.frame = (position.as_secs_f64() * rate as f64).round() as u64;
        }
        state.playing = false;
        state.eof = false;
        info!(parent: &self.span, position = ?position, "Playback stopped");
    }

    /// Moves the cursor to `position` and clears any end-of-stream flag.
    pub fn set_position(&self, position: Duration) {
        let mut state = self.state.lock();
        let rate = self.sampler.lock().sample_rate();
        state.frame = (position.as_secs_f64() * rate as f64).round() as u64;
        state.eof = false;
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    /// Whether playback ran off the end of the stream.
    pub fn is_eof_reached(&self) -> bool {
        let state = self.state.lock();
        state.playing && state.eof
    }

    /// Current playback position. Once the end is reached this is the
    /// duration of the stream.
    pub fn position(&self) -> Duration {
        let state = self.state.lock();
        let sampler = self.sampler.lock();
        let rate = sampler.sample_rate();
        let seconds = if state.playing && state.eof {
            sampler.get_duration()
        } else if rate > 0 {
            state.frame as f64 / rate as f64
        } else {
            0.0
        };
        Duration::try_from_secs_f64(seconds).unwrap_or_default()
    }

    /// Fills `out` with interleaved stereo frames and returns how many frames
    /// came from the sampler. Whatever the sampler doesn't cover, including
    /// everything while stopped, is silence.
    pub fn fill(&self, out: &mut [f32]) -> usize {
        let frames = out.len() / 2;
        let mut state = self.state.lock();
        if !state.playing || state.eof {
            out.fill(0.0);
            return 0;
        }

        let sampler = self.sampler.lock();
        let mut written = 0;
        while written < frames {
            match sampler.get_sample(state.frame) {
                Some([l, r]) => {
                    out[written * 2] = l;
                    out[written * 2 + 1] = r;
                }
                None => {
                    state.eof = true;
                    debug!(parent: &self.span, frame = state.frame, "End of stream");
                    break;
                }
            }
            state.frame += 1;
            written += 1;
        }

        out[written * 2..].fill(0.0);
        written
    }
}
