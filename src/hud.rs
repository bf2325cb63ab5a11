//! Values shown on the heads-up display.

use std::time::Duration;

use crate::config::BombPolicy;
use crate::entities::GameState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BombState {
    /// Charges remaining.
    Ready(u32),
    Used,
    /// Time left until a cooldown bomb is available again.
    Cooling(Duration),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HudSnapshot {
    pub score: u32,
    pub level: u32,
    pub lives: u32,
    pub bomb: BombState,
}

pub fn bomb_state(state: &GameState, now: Duration) -> BombState {
    match state.config.bomb {
        BombPolicy::Charges { .. } if state.bombs_left > 0 => BombState::Ready(state.bombs_left),
        BombPolicy::Charges { .. } => BombState::Used,
        BombPolicy::Cooldown { .. } if now >= state.bomb_ready_at => BombState::Ready(1),
        // Whole seconds, so the HUD only changes once per second while cooling.
        BombPolicy::Cooldown { .. } => {
            let left = state.bomb_ready_at - now;
            let secs = left.as_secs() + u64::from(left.subsec_nanos() > 0);
            BombState::Cooling(Duration::from_secs(secs))
        }
    }
}

pub fn snapshot(state: &GameState, now: Duration) -> HudSnapshot {
    HudSnapshot {
        score: state.score,
        level: state.level,
        lives: state.lives,
        bomb: bomb_state(state, now),
    }
}

/// Returns the new snapshot when it differs from the last one emitted.
pub fn changed(state: &mut GameState, now: Duration) -> Option<HudSnapshot> {
    let current = snapshot(state, now);
    if state.last_hud == Some(current) {
        return None;
    }
    state.last_hud = Some(current);
    Some(current)
}

impl HudSnapshot {
    pub fn bomb_label(&self) -> String {
        match self.bomb {
            BombState::Ready(n) => format!("Bomb: Ready ({n})"),
            BombState::Used => "Bomb: Used".to_string(),
            BombState::Cooling(left) => format!("Bomb: {}s", left.as_secs()),
        }
    }
}
