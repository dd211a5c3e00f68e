//! Sound effect dispatch
//!
//! The simulation reports sounds as events; this layer turns them into
//! playback requests against whatever backend the shell plugs in. Several
//! effects ship with multiple recorded takes, so a variant index is chosen
//! at random here, outside the deterministic core. Playback failures are
//! logged and swallowed so a broken or absent audio device never stops the
//! game.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::Sound;

/// A backend failed to play a sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackError {
    pub name: String,
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to play sound '{}'", self.name)
    }
}

impl std::error::Error for PlaybackError {}

/// Playback backend. `name` is the effect's base name and `variant` selects
/// one of its takes (always 0 for single-take effects).
pub trait AudioSink {
    fn play(&mut self, name: &str, variant: u32) -> Result<(), PlaybackError>;
}

/// Backend that discards everything. Used when no audio device is available
/// and in headless runs.
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _name: &str, _variant: u32) -> Result<(), PlaybackError> {
        Ok(())
    }
}

/// Routes game sounds to a backend, picking a take for multi-take effects.
pub struct AudioManager<S: AudioSink> {
    sink: S,
    rng: Pcg32,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S, seed: u64) -> Self {
        Self {
            sink,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Play one sound effect. Errors are logged, never propagated.
    pub fn play(&mut self, sound: Sound) {
        let variant = self.rng.random_range(0..sound.variants());
        if let Err(err) = self.sink.play(sound.name(), variant) {
            log::warn!("audio: {err}");
        }
    }
}
