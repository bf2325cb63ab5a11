//! Per-tick motion and autonomous fire.

use std::time::Duration;

use rand::Rng;

use crate::config::{BossFireMode, PlayerAxes};
use crate::entities::{GameState, Origin};
use crate::geometry::{clamp, Rect, Vec2};
use crate::spawner::{spawn_boss, spawn_hostile_shot};

/// Directions currently held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

// ── Player ───────────────────────────────────────────────────────────────────

/// Keep the player inside the viewport and never behind its start line.
pub fn clamp_player(state: &mut GameState) {
    let fwd = state.config.orientation.forward_axis();
    let sweep = state.config.orientation.sweep_axis();
    let behind = state.config.player_start_offset * state.scale;
    let forward_high = state.config.orientation.forward_sign() > 0.0;
    let (fwd_extent, sweep_extent) = (state.extent(fwd), state.extent(sweep));

    let Some(player) = state.player.as_mut() else {
        return;
    };
    let size = player.body.size();
    let (lo, hi) = if forward_high {
        (behind, fwd_extent - size.along(fwd))
    } else {
        (0.0, fwd_extent - size.along(fwd) - behind)
    };
    let pos = &mut player.body.pos;
    *pos.along_mut(fwd) = clamp(pos.along(fwd), lo, hi);
    *pos.along_mut(sweep) = clamp(pos.along(sweep), 0.0, sweep_extent - size.along(sweep));
}

pub fn move_player(state: &mut GameState, input: InputState) {
    let speed = state.config.player_speed * state.scale;
    let lateral_only = state.config.player_axes == PlayerAxes::Lateral;
    let fwd = state.config.orientation.forward_axis();

    let Some(player) = state.player.as_mut().filter(|p| p.body.alive) else {
        return;
    };
    let mut step = Vec2::default();
    if input.left {
        step.x -= speed;
    }
    if input.right {
        step.x += speed;
    }
    if input.up {
        step.y -= speed;
    }
    if input.down {
        step.y += speed;
    }
    if lateral_only {
        *step.along_mut(fwd) = 0.0;
    }
    player.body.pos.x += step.x;
    player.body.pos.y += step.y;
    clamp_player(state);
}

// ── Projectiles ──────────────────────────────────────────────────────────────

/// Move one origin's shots along the forward axis and drop those that left
/// the field.  A shot is gone once its trailing edge reaches the viewport
/// edge it is heading for.
pub fn advance_shots(state: &mut GameState, origin: Origin) {
    let axis = state.config.orientation.forward_axis();
    let extent = state.extent(axis);
    let shots = match origin {
        Origin::Player => &mut state.shots,
        Origin::Hostile => &mut state.hostile_shots,
    };
    for shot in shots.iter_mut() {
        *shot.body.pos.along_mut(axis) += shot.velocity;
        let pos = shot.body.pos.along(axis);
        let gone = if shot.velocity > 0.0 {
            pos >= extent
        } else {
            pos + shot.hitbox.along(axis) <= 0.0
        };
        if gone {
            shot.body.alive = false;
        }
    }
    shots.retain(|s| s.body.alive);
}

// ── Grunts ───────────────────────────────────────────────────────────────────

fn formation_bounds(state: &GameState) -> Option<Rect> {
    state
        .grunts
        .iter()
        .filter(|g| g.body.alive)
        .map(|g| g.rect())
        .reduce(|acc, r| acc.union(&r))
}

pub fn grunt_speed(state: &GameState) -> f32 {
    let cfg = &state.config;
    (cfg.grunt_speed + cfg.grunt_speed_per_level * state.level.saturating_sub(1) as f32)
        * state.scale
}

/// Sweep the formation as one body.  If the next step would carry its
/// bounding box past the padded edge, reverse and step every member toward
/// the player once instead.
pub fn sweep_formation(state: &mut GameState) -> bool {
    let Some(bounds) = formation_bounds(state) else {
        return false;
    };
    let cfg = &state.config;
    let sweep = cfg.orientation.sweep_axis();
    let fwd = cfg.orientation.forward_axis();
    let toward_player = -cfg.orientation.forward_sign();
    let pad = cfg.formation.edge_padding * state.scale;
    let shift = cfg.formation.drop_on_edge * state.scale;
    let speed = grunt_speed(state);
    let extent = state.extent(sweep);
    let dir = state.sweep_dir;

    let edge = (dir > 0.0 && bounds.max_along(sweep) + speed >= extent - pad)
        || (dir < 0.0 && bounds.min_along(sweep) - speed <= pad);

    if edge {
        state.sweep_dir = -dir;
    }
    for grunt in state.grunts.iter_mut().filter(|g| g.body.alive) {
        if edge {
            *grunt.body.pos.along_mut(fwd) += shift * toward_player;
        } else {
            *grunt.body.pos.along_mut(sweep) += speed * dir;
        }
    }
    edge
}

/// Queued grunts fly to their slot; arrived ones ride a shared sine offset
/// along the sweep axis.
pub fn drift_queue(state: &mut GameState) {
    let cfg = &state.config;
    let sweep = cfg.orientation.sweep_axis();
    let step = cfg.queue.entry_speed * state.scale;
    state.drift_phase += cfg.queue.drift_rate;
    let offset = state.drift_phase.sin() * cfg.queue.drift_amplitude * state.scale;

    for grunt in state.grunts.iter_mut().filter(|g| g.body.alive) {
        let Some(slot) = grunt.slot else {
            continue;
        };
        let mut target = slot;
        *target.along_mut(sweep) += offset;
        if grunt.arrived {
            grunt.body.pos = target;
            continue;
        }
        let dx = target.x - grunt.body.pos.x;
        let dy = target.y - grunt.body.pos.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist <= step {
            grunt.body.pos = target;
            grunt.arrived = true;
        } else {
            grunt.body.pos.x += dx / dist * step;
            grunt.body.pos.y += dy / dist * step;
        }
    }
}

// ── Boss ─────────────────────────────────────────────────────────────────────

/// Bounce along the sweep axis between the padded edges.
pub fn move_boss(state: &mut GameState) {
    let sweep = state.config.orientation.sweep_axis();
    let pad = state.config.boss.edge_padding * state.scale;
    let extent = state.extent(sweep);
    let scale = state.scale;

    let Some(boss) = state.boss.as_mut().filter(|b| b.body.alive) else {
        return;
    };
    let size = boss.body.size().along(sweep);
    let pos = boss.body.pos.along_mut(sweep);
    *pos += boss.velocity * scale;
    if *pos <= pad || *pos + size >= extent - pad {
        boss.velocity = -boss.velocity;
        *pos = clamp(*pos, pad, extent - size - pad);
    }
}

/// Bring the boss in when its appear/respawn timer is due.
pub fn update_boss_timer(state: &mut GameState, now: Duration) -> bool {
    let Some(timer) = state.boss_timer else {
        return false;
    };
    if now < timer.due() {
        return false;
    }
    state.boss_timer = None;
    spawn_boss(state, now)
}

// ── Autonomous fire ──────────────────────────────────────────────────────────

/// One shot from a uniformly chosen grunt per elapsed interval.
pub fn grunt_fire<R: Rng>(state: &mut GameState, now: Duration, rng: &mut R) -> bool {
    if now.saturating_sub(state.last_grunt_shot) < state.config.grunt_fire_interval() {
        return false;
    }
    state.last_grunt_shot = now;

    let shooters: Vec<Rect> = state
        .grunts
        .iter()
        .filter(|g| g.body.alive)
        .map(|g| g.rect())
        .collect();
    if shooters.is_empty() {
        return false;
    }
    let from = shooters[rng.gen_range(0..shooters.len())];
    let (sprite, hitbox) = (state.config.hostile_shot_sprite, state.config.hostile_shot_hitbox);
    spawn_hostile_shot(state, from, sprite, hitbox);
    true
}

/// Boss fire on its own timer, either a plain interval or bursts separated
/// by a cooldown.
pub fn boss_fire(state: &mut GameState, now: Duration) -> bool {
    let Some(from) = state.boss.as_ref().filter(|b| b.body.alive).map(|b| b.rect()) else {
        return false;
    };
    let since = now.saturating_sub(state.last_boss_shot);

    match state.config.boss.fire {
        BossFireMode::Interval { interval_ms } => {
            if since < Duration::from_millis(interval_ms) {
                return false;
            }
        }
        BossFireMode::Burst { shots, interval_ms, cooldown_ms } => {
            if state.boss_cooling {
                if since < Duration::from_millis(cooldown_ms) {
                    return false;
                }
                state.boss_cooling = false;
                state.boss_shots_fired = 0;
            }
            if since < Duration::from_millis(interval_ms) {
                return false;
            }
            if state.boss_shots_fired >= shots {
                state.boss_cooling = true;
                state.last_boss_shot = now;
                return false;
            }
            state.boss_shots_fired += 1;
        }
    }

    state.last_boss_shot = now;
    let (sprite, hitbox) = (state.config.boss.shot_sprite, state.config.boss.shot_hitbox);
    spawn_hostile_shot(state, from, sprite, hitbox);
    true
}
