//! Game loop driver.
//!
//! Every function takes the one `GameState` by mutable reference together
//! with the current time and, where needed, an RNG handle.  Time and
//! randomness are injected so tests control both.

use std::time::Duration;

use log::{debug, info, trace};
use rand::Rng;

use crate::audio::Sound;
use crate::combat::{resolve_collisions, use_bomb};
use crate::config::{GameConfig, WaveGenerationMode};
use crate::entities::{GameState, GameStatus, Origin};
use crate::events::FrameEvent;
use crate::hud;
use crate::movement::{
    advance_shots, boss_fire, drift_queue, grunt_fire, move_boss, move_player, sweep_formation,
    update_boss_timer,
};
use crate::scaling::{rescale, scale_factor};
use crate::spawner::{spawn_from_queue, spawn_player, spawn_player_shot, spawn_wave};
use crate::waves::{check_progress, resolve_pending};

pub use crate::movement::InputState;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Fresh session waiting in `Intro` for a start command.
pub fn init_state(config: GameConfig, width: f32, height: f32) -> GameState {
    let scale = scale_factor(width, config.reference_width);
    let bombs_left = config.bomb_charges();
    let lives = config.start_lives;
    GameState {
        config,
        width,
        height,
        scale,
        player: None,
        shots: Vec::new(),
        hostile_shots: Vec::new(),
        grunts: Vec::new(),
        boss: None,
        boss_timer: None,
        spawn_queue: Default::default(),
        last_spawn_at: None,
        sweep_dir: 1.0,
        drift_phase: 0.0,
        score: 0,
        lives,
        level: 1,
        bombs_left,
        bomb_ready_at: Duration::ZERO,
        last_grunt_shot: Duration::ZERO,
        last_boss_shot: Duration::ZERO,
        boss_shots_fired: 0,
        boss_cooling: false,
        status: GameStatus::Intro,
        running: false,
        user_paused: false,
        pending: None,
        frame: 0,
        events: Vec::new(),
        last_hud: None,
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

/// Leave `Intro`: place the player and the first wave and start ticking.
pub fn start<R: Rng>(state: &mut GameState, now: Duration, rng: &mut R) -> bool {
    if state.running || state.status != GameStatus::Intro {
        debug!("start ignored in {:?}", state.status);
        return false;
    }
    state.bomb_ready_at = now;
    spawn_player(state);
    let level = state.level;
    spawn_wave(state, level, now, rng);
    state.status = GameStatus::InProgress;
    state.running = true;
    state.push_event(FrameEvent::Sound(Sound::Music));
    info!("game started");
    true
}

/// Drop everything and go back to `Intro`.  Config and viewport survive.
pub fn restart(state: &mut GameState) {
    let fresh = init_state(state.config.clone(), state.width, state.height);
    *state = fresh;
    info!("game reset");
}

/// Halt ticking without changing anything else.
pub fn stop(state: &mut GameState) {
    state.running = false;
}

/// One player shot if fewer than the cap are in flight.
pub fn player_shoot(state: &mut GameState) -> bool {
    if state.live_player_shots() >= state.config.max_player_shots {
        return false;
    }
    if !spawn_player_shot(state) {
        return false;
    }
    state.push_event(FrameEvent::Sound(Sound::Shoot));
    true
}

/// Fire key.  Starts the game from `Intro` and starts over after it ended.
pub fn press_fire<R: Rng>(state: &mut GameState, now: Duration, rng: &mut R) -> bool {
    match state.status {
        GameStatus::Intro => start(state, now, rng),
        GameStatus::Won | GameStatus::Lost => {
            restart(state);
            start(state, now, rng)
        }
        GameStatus::InProgress | GameStatus::LevelClear => {
            if !state.running || state.paused() {
                debug!("fire ignored while paused");
                return false;
            }
            player_shoot(state)
        }
    }
}

pub fn press_bomb<R: Rng>(state: &mut GameState, now: Duration, rng: &mut R) -> bool {
    let used = use_bomb(state, now, rng);
    if !used {
        debug!("bomb not available");
    }
    used
}

/// Player pause.  Only while a wave is in play; returns whether it toggled.
pub fn toggle_pause(state: &mut GameState) -> bool {
    if !state.running || state.status != GameStatus::InProgress {
        return false;
    }
    state.user_paused = !state.user_paused;
    info!("{}", if state.user_paused { "paused" } else { "resumed" });
    true
}

pub fn resize(state: &mut GameState, width: f32, height: f32) -> f32 {
    rescale(state, width, height)
}

// ── Per-tick update ──────────────────────────────────────────────────────────

fn emit_hud(state: &mut GameState, now: Duration) {
    if let Some(snapshot) = hud::changed(state, now) {
        state.push_event(FrameEvent::Hud(snapshot));
    }
}

/// Advance the simulation by one tick.
///
/// Stopped sessions are left alone.  While paused only the pending
/// transition timer is polled.  Otherwise the order is fixed: player, player
/// shots, hostile shots, grunts, boss, fire timers, collisions, progress, so
/// collisions see this tick's positions and progress sees this tick's deaths.
pub fn tick<R: Rng>(state: &mut GameState, now: Duration, input: InputState, rng: &mut R) {
    if !state.running {
        return;
    }

    if state.pending.is_some() {
        resolve_pending(state, now, rng);
        emit_hud(state, now);
        return;
    }
    if state.user_paused {
        return;
    }
    state.frame += 1;

    move_player(state, input);
    advance_shots(state, Origin::Player);
    advance_shots(state, Origin::Hostile);

    match state.config.wave_mode {
        WaveGenerationMode::Formation => {
            sweep_formation(state);
        }
        WaveGenerationMode::SpawnQueue => {
            spawn_from_queue(state, now);
            drift_queue(state);
        }
    }

    update_boss_timer(state, now);
    move_boss(state);

    grunt_fire(state, now, rng);
    boss_fire(state, now);

    resolve_collisions(state, now);
    check_progress(state, now);
    emit_hud(state, now);

    trace!(
        "tick {}: {} grunts, {} shots, {} hostile",
        state.frame,
        state.grunts.len(),
        state.shots.len(),
        state.hostile_shots.len()
    );
}

// ── Fixed-rate gate ──────────────────────────────────────────────────────────

/// Lets one tick through per `interval` no matter how often it is polled.
#[derive(Clone, Copy, Debug)]
pub struct FrameGate {
    interval: Duration,
    last: Option<Duration>,
}

impl FrameGate {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    pub fn ready(&mut self, now: Duration) -> bool {
        match self.last {
            Some(last) if now.saturating_sub(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}
