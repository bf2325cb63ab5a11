//! Level progression: Intro → InProgress → (LevelClear → InProgress)* → Won | Lost.

use std::time::Duration;

use log::info;
use rand::Rng;

use crate::entities::{BossTimer, GameState, GameStatus, Pending};
use crate::events::FrameEvent;
use crate::spawner::{reset_player_position, spawn_wave};

/// No grunt or boss alive and nothing left to arrive.  A pending boss
/// comeback does not hold the level open; a first appearance does.
pub fn level_cleared(state: &GameState) -> bool {
    state.grunts_alive() == 0
        && !state.boss_alive()
        && state.spawn_queue.is_empty()
        && !matches!(state.boss_timer, Some(BossTimer::Appear { .. }))
}

/// Runs after collisions so anything destroyed this tick is already gone.
pub fn check_progress(state: &mut GameState, now: Duration) -> bool {
    if !state.running || state.status != GameStatus::InProgress || state.pending.is_some() {
        return false;
    }
    if !level_cleared(state) {
        return false;
    }
    advance_level(state, now);
    true
}

fn advance_level(state: &mut GameState, now: Duration) {
    state.level += 1;
    state.clear_projectiles();
    state.boss_timer = None;

    if state.level > state.config.max_level {
        state.status = GameStatus::Won;
        state.running = false;
        info!("all levels cleared with score {}", state.score);
        state.push_event(FrameEvent::GameWon { score: state.score });
        return;
    }
    state.status = GameStatus::LevelClear;
    state.pending = Some(Pending::SpawnWave { due: now + state.config.level_banner() });
    info!("level {} cleared", state.level - 1);
}

/// Polled while paused: finish the transition whose time has come.
pub fn resolve_pending<R: Rng>(state: &mut GameState, now: Duration, rng: &mut R) -> bool {
    let Some(pending) = state.pending else {
        return false;
    };
    if now < pending.due() {
        return false;
    }
    match pending {
        Pending::Respawn { .. } => {
            reset_player_position(state);
            state.pending = None;
        }
        Pending::SpawnWave { .. } => {
            let level = state.level;
            spawn_wave(state, level, now, rng);
            state.pending = Some(Pending::Resume { due: now + state.config.resume_delay() });
        }
        Pending::Resume { .. } => {
            state.pending = None;
            state.status = GameStatus::InProgress;
        }
    }
    true
}
