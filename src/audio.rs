//! Fire-and-forget sound cues.  A sink that cannot play a cue reports it and
//! the caller moves on; the simulation never waits on audio.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sound {
    /// One-shot, restarted from the beginning on every trigger.
    Shoot,
    /// Looped background track, started with the game.
    Music,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioError {
    /// Playback refused by the platform or not supported by this sink.
    Blocked(Sound),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Blocked(sound) => write!(f, "playback of {sound:?} was blocked"),
        }
    }
}

impl std::error::Error for AudioError {}

pub trait AudioSink {
    /// Play `sound` from the start.
    fn play(&mut self, sound: Sound) -> Result<(), AudioError>;
}

/// Plays nothing and always succeeds.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _sound: Sound) -> Result<(), AudioError> {
        Ok(())
    }
}
