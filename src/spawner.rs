//! Population builders: player, shots, grunt waves and the boss.

use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use crate::audio::Sound;
use crate::config::WaveGenerationMode;
use crate::entities::{Body, Boss, BossTimer, GameState, Grunt, Origin, Player, Projectile};
use crate::events::FrameEvent;
use crate::geometry::{Rect, Size, Vec2};

// ── Player ───────────────────────────────────────────────────────────────────

/// Start line on the player's own edge, centred along the sweep axis.
pub fn player_start(state: &GameState) -> Vec2 {
    let cfg = &state.config;
    let fwd = cfg.orientation.forward_axis();
    let sweep = cfg.orientation.sweep_axis();
    let size = cfg.player_size.scaled(state.scale);
    let offset = cfg.player_start_offset * state.scale;

    let mut pos = Vec2::default();
    *pos.along_mut(fwd) = if cfg.orientation.forward_sign() > 0.0 {
        offset
    } else {
        state.extent(fwd) - size.along(fwd) - offset
    };
    *pos.along_mut(sweep) = (state.extent(sweep) - size.along(sweep)) / 2.0;
    pos
}

pub fn spawn_player(state: &mut GameState) {
    let pos = player_start(state);
    state.player = Some(Player {
        body: Body::new(pos, state.config.player_size, state.scale),
    });
}

/// Back to the start line, visible again.
pub fn reset_player_position(state: &mut GameState) {
    let pos = player_start(state);
    if let Some(player) = state.player.as_mut() {
        player.body.pos = pos;
        player.body.alive = true;
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

fn make_shot(state: &GameState, from: Rect, origin: Origin, sprite: Size, hitbox: Size) -> Projectile {
    let cfg = &state.config;
    let fwd = cfg.orientation.forward_axis();
    let sweep = cfg.orientation.sweep_axis();
    let sign = cfg.orientation.forward_sign();
    let hit = hitbox.scaled(state.scale);
    let gap = cfg.muzzle_gap * state.scale;

    // Player shots travel with the forward sign, hostile shots against it.
    let (travel, speed) = match origin {
        Origin::Player => (sign, cfg.player_shot_speed),
        Origin::Hostile => (-sign, cfg.hostile_shot_speed),
    };

    let mut pos = Vec2::default();
    *pos.along_mut(fwd) = if travel > 0.0 {
        from.max_along(fwd) + gap
    } else {
        from.min_along(fwd) - gap - hit.along(fwd)
    };
    *pos.along_mut(sweep) = from.center().along(sweep) - hit.along(sweep) / 2.0;

    Projectile {
        body: Body::new(pos, sprite, state.scale),
        origin,
        velocity: travel * speed * state.scale,
        hitbox: hit,
    }
}

/// Fire from the player's nose.  No cap check here; see `compute::player_shoot`.
pub fn spawn_player_shot(state: &mut GameState) -> bool {
    let Some(player) = state.player.as_ref().filter(|p| p.body.alive) else {
        return false;
    };
    let cfg = &state.config;
    let shot = make_shot(
        state,
        player.rect(),
        Origin::Player,
        cfg.player_shot_sprite,
        cfg.player_shot_hitbox,
    );
    state.shots.push(shot);
    true
}

/// Hostile shots use the same firing cue as the player's.
pub fn spawn_hostile_shot(state: &mut GameState, from: Rect, sprite: Size, hitbox: Size) {
    let shot = make_shot(state, from, Origin::Hostile, sprite, hitbox);
    state.hostile_shots.push(shot);
    state.push_event(FrameEvent::Sound(Sound::Shoot));
}

// ── Grunts ───────────────────────────────────────────────────────────────────

/// Rigid grid: columns along the sweep axis, rows stacked from the far edge.
pub fn build_formation(state: &mut GameState, level: u32) {
    let cfg = &state.config;
    let f = cfg.formation.clone();
    let rows = cfg.wave(level).rows;
    let fwd = cfg.orientation.forward_axis();
    let sweep = cfg.orientation.sweep_axis();
    let far_high = cfg.orientation.forward_sign() > 0.0;
    let (grunt_size, score_value) = (cfg.grunt_size, cfg.grunt_score);
    let scale = state.scale;
    // Far edge in reference units.
    let far = if scale > 0.0 { state.extent(fwd) / scale } else { 0.0 };

    for r in 0..rows {
        for c in 0..f.cols {
            let depth = r as f32 * f.row_spacing;
            let mut pos = Vec2::default();
            *pos.along_mut(fwd) = if far_high {
                far - f.far_margin - rows as f32 * f.row_spacing + depth
            } else {
                f.far_margin + depth
            };
            *pos.along_mut(sweep) = f.sweep_start + c as f32 * f.col_spacing;
            state.grunts.push(Grunt {
                body: Body::new(pos.scaled(scale), grunt_size, scale),
                score_value,
                slot: None,
                arrived: true,
            });
        }
    }
    debug!("formation of {} grunts for level {level}", state.grunts.len());
}

fn sample<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        lo
    } else {
        rng.gen_range(lo..hi)
    }
}

/// Random hover slots in the far part of the field, released one at a time
/// by `spawn_from_queue`.
pub fn build_spawn_queue<R: Rng>(state: &mut GameState, level: u32, rng: &mut R) {
    let cfg = &state.config;
    let q = &cfg.queue;
    let count = cfg.wave(level).spawn_count;
    let fwd = cfg.orientation.forward_axis();
    let sweep = cfg.orientation.sweep_axis();
    let far_high = cfg.orientation.forward_sign() > 0.0;
    let size = cfg.grunt_size.scaled(state.scale);
    let pad = q.edge_padding * state.scale;
    let drift = q.drift_amplitude * state.scale;
    let depth = state.extent(fwd) * q.field_depth;

    let sweep_lo = pad + drift;
    let sweep_hi = state.extent(sweep) - size.along(sweep) - pad - drift;
    let (fwd_lo, fwd_hi) = if far_high {
        (state.extent(fwd) - depth, state.extent(fwd) - size.along(fwd) - pad)
    } else {
        (pad, depth - size.along(fwd))
    };

    let mut slots = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut slot = Vec2::default();
        *slot.along_mut(sweep) = sample(rng, sweep_lo, sweep_hi);
        *slot.along_mut(fwd) = sample(rng, fwd_lo, fwd_hi.max(fwd_lo));
        slots.push(slot);
    }
    state.spawn_queue.extend(slots);
    debug!("queued {count} grunts for level {level}");
}

/// Release the next queued grunt if the spawn interval has elapsed.  It
/// enters from just beyond the far edge, lined up with its slot.
pub fn spawn_from_queue(state: &mut GameState, now: Duration) -> bool {
    let interval = state.config.queue.spawn_interval();
    let due = state.last_spawn_at.map_or(true, |at| now.saturating_sub(at) >= interval);
    if state.spawn_queue.is_empty() || !due {
        return false;
    }
    let Some(slot) = state.spawn_queue.pop_front() else {
        return false;
    };
    state.last_spawn_at = Some(now);

    let cfg = &state.config;
    let fwd = cfg.orientation.forward_axis();
    let size = cfg.grunt_size.scaled(state.scale);
    let mut entry = slot;
    *entry.along_mut(fwd) = if cfg.orientation.forward_sign() > 0.0 {
        state.extent(fwd)
    } else {
        -size.along(fwd)
    };
    state.grunts.push(Grunt {
        body: Body::new(entry, cfg.grunt_size, state.scale),
        score_value: cfg.grunt_score,
        slot: Some(slot),
        arrived: false,
    });
    true
}

// ── Boss ─────────────────────────────────────────────────────────────────────

/// Fresh boss at its default position with full hp.  Refuses while one is
/// alive, so there is never more than one.
pub fn spawn_boss(state: &mut GameState, now: Duration) -> bool {
    if state.boss_alive() {
        return false;
    }
    let cfg = &state.config;
    let b = &cfg.boss;
    let fwd = cfg.orientation.forward_axis();
    let sweep = cfg.orientation.sweep_axis();
    let size = b.size.scaled(state.scale);
    let offset = b.far_offset * state.scale;

    let mut pos = Vec2::default();
    *pos.along_mut(fwd) = if cfg.orientation.forward_sign() > 0.0 {
        state.extent(fwd) - size.along(fwd) - offset
    } else {
        offset
    };
    *pos.along_mut(sweep) = (state.extent(sweep) - size.along(sweep)) / 2.0;

    state.boss = Some(Boss {
        body: Body::new(pos, b.size, state.scale),
        hp: b.hp,
        max_hp: b.hp,
        score_value: b.score_value,
        velocity: b.speed,
    });
    state.last_boss_shot = now;
    state.boss_shots_fired = 0;
    state.boss_cooling = false;
    info!("boss appeared with {} hp", b.hp);
    true
}

// ── Waves ────────────────────────────────────────────────────────────────────

/// Replace the enemy population with the one for `level` and reset the
/// per-wave timers.
pub fn spawn_wave<R: Rng>(state: &mut GameState, level: u32, now: Duration, rng: &mut R) {
    state.grunts.clear();
    state.boss = None;
    state.boss_timer = None;
    state.spawn_queue.clear();
    state.sweep_dir = 1.0;
    state.drift_phase = 0.0;
    state.last_grunt_shot = now;
    state.last_boss_shot = now;
    state.boss_shots_fired = 0;
    state.boss_cooling = false;
    // The first queued grunt leaves on the next tick.
    state.last_spawn_at = None;

    match state.config.wave_mode {
        WaveGenerationMode::Formation => build_formation(state, level),
        WaveGenerationMode::SpawnQueue => build_spawn_queue(state, level, rng),
    }

    if state.config.wave(level).boss {
        let delay = state.config.boss.appear_delay();
        if delay.is_zero() {
            spawn_boss(state, now);
        } else {
            state.boss_timer = Some(BossTimer::Appear { due: now + delay });
        }
    }

    info!("level {level} started");
    state.push_event(FrameEvent::LevelStarted { level });
}
