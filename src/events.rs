//! Things that happened during a tick or a command, for the adapters.

use log::debug;

use crate::audio::{AudioSink, Sound};
use crate::geometry::Vec2;
use crate::hud::HudSnapshot;
use crate::leaderboard::ScoreSink;

#[derive(Clone, Debug, PartialEq)]
pub enum FrameEvent {
    /// Cosmetic only; `size` is already scaled.
    Explosion { center: Vec2, size: f32 },
    Sound(Sound),
    PlayerHit { lives: u32 },
    BossDefeated { score_value: u32 },
    LevelStarted { level: u32 },
    GameWon { score: u32 },
    GameOver { score: u32 },
    Hud(HudSnapshot),
}

/// Route audio and score events to their sinks and hand back the rest.
/// Audio failures are dropped here.
pub fn dispatch(
    events: Vec<FrameEvent>,
    audio: &mut dyn AudioSink,
    scores: &mut dyn ScoreSink,
    player_name: &str,
) -> Vec<FrameEvent> {
    let mut rest = Vec::with_capacity(events.len());
    for event in events {
        match event {
            FrameEvent::Sound(sound) => {
                if let Err(e) = audio.play(sound) {
                    debug!("audio: {e}");
                }
            }
            FrameEvent::GameOver { score } => {
                scores.submit(player_name, score);
                rest.push(event);
            }
            other => rest.push(other),
        }
    }
    rest
}
