//! Hit detection, damage, scoring and the bomb.

use std::time::Duration;

use log::{debug, info};
use rand::seq::index;
use rand::Rng;

use crate::config::{BombPolicy, ReachPolicy};
use crate::entities::{BossTimer, GameState, GameStatus, Pending};
use crate::events::FrameEvent;
use crate::geometry::{rects_overlap, Rect};

fn explode(state: &mut GameState, rect: &Rect, base_size: f32) {
    let size = base_size * state.scale;
    state.push_event(FrameEvent::Explosion { center: rect.center(), size });
}

// ── Player shots ─────────────────────────────────────────────────────────────

/// Player shots against the boss first, then grunts in collection order.
/// A shot stops at its first target; a dead grunt leaves the collection
/// before the next shot is tested.
fn resolve_player_shots(state: &mut GameState, now: Duration) {
    let mut i = state.shots.len();
    while i > 0 {
        i -= 1;
        let shot = state.shots[i].rect();

        let boss_hit = state
            .boss
            .as_ref()
            .map_or(false, |b| b.body.alive && rects_overlap(&shot, &b.rect()));
        if boss_hit {
            state.shots.remove(i);
            explode(state, &shot, 50.0);
            let hp_left = match state.boss.as_mut() {
                Some(boss) => {
                    boss.hp = boss.hp.saturating_sub(1);
                    boss.hp
                }
                None => continue,
            };
            if hp_left == 0 {
                defeat_boss(state, now);
            }
            continue;
        }

        let target = state
            .grunts
            .iter()
            .position(|g| g.body.alive && rects_overlap(&shot, &g.rect()));
        if let Some(j) = target {
            let mut grunt = state.grunts.remove(j);
            grunt.body.alive = false;
            state.shots.remove(i);
            state.score += grunt.score_value;
            explode(state, &grunt.rect(), 36.0);
        }
    }
}

fn defeat_boss(state: &mut GameState, now: Duration) {
    let Some(mut boss) = state.boss.take() else {
        return;
    };
    boss.body.alive = false;
    state.score += boss.score_value;
    explode(state, &boss.rect(), 100.0);
    state.push_event(FrameEvent::BossDefeated { score_value: boss.score_value });

    match state.config.boss.respawn_delay() {
        Some(delay) => {
            state.boss_timer = Some(BossTimer::Respawn { due: now + delay });
            info!("boss defeated, back in {}ms", delay.as_millis());
        }
        None => info!("boss defeated"),
    }
}

// ── Hostile side ─────────────────────────────────────────────────────────────

fn resolve_hostile_shots(state: &mut GameState, now: Duration) {
    let Some(player_rect) = state.player.as_ref().filter(|p| p.body.alive).map(|p| p.rect()) else {
        return;
    };
    let mut i = state.hostile_shots.len();
    while i > 0 {
        i -= 1;
        if rects_overlap(&state.hostile_shots[i].rect(), &player_rect) {
            state.hostile_shots.remove(i);
            explode(state, &player_rect, 50.0);
            // Clears every shot, so nothing left to test this tick.
            player_hit(state, now);
            return;
        }
    }
}

/// True once a grunt's leading edge has passed the player's front.
fn grunt_reached(state: &GameState, grunt: &Rect, player: &Rect) -> bool {
    let fwd = state.config.orientation.forward_axis();
    if state.config.orientation.forward_sign() > 0.0 {
        grunt.min_along(fwd) <= player.max_along(fwd)
    } else {
        grunt.max_along(fwd) >= player.min_along(fwd)
    }
}

fn resolve_reach(state: &mut GameState, now: Duration) {
    let policy = state.config.reach_policy;
    if policy == ReachPolicy::Ignore || state.pending.is_some() || !state.running {
        return;
    }
    let Some(player_rect) = state.player.as_ref().filter(|p| p.body.alive).map(|p| p.rect()) else {
        return;
    };
    let reached = state
        .grunts
        .iter()
        .any(|g| g.body.alive && grunt_reached(state, &g.rect(), &player_rect));
    if !reached {
        return;
    }
    debug!("grunt reached the player");
    match policy {
        ReachPolicy::Ignore => {}
        ReachPolicy::LoseLife => player_hit(state, now),
        ReachPolicy::GameOver => {
            state.lives = 0;
            state.clear_projectiles();
            state.push_event(FrameEvent::PlayerHit { lives: 0 });
            game_over(state);
        }
    }
}

/// Lose a life and wipe every shot.  With lives left the player is hidden
/// until the respawn pause runs out; otherwise the game is lost.
pub fn player_hit(state: &mut GameState, now: Duration) {
    state.lives = state.lives.saturating_sub(1);
    state.clear_projectiles();
    state.push_event(FrameEvent::PlayerHit { lives: state.lives });

    if state.lives == 0 {
        game_over(state);
        return;
    }
    if let Some(player) = state.player.as_mut() {
        player.body.alive = false;
    }
    state.pending = Some(Pending::Respawn { due: now + state.config.respawn_pause() });
    debug!("player hit, {} lives left", state.lives);
}

fn game_over(state: &mut GameState) {
    state.status = GameStatus::Lost;
    state.running = false;
    state.pending = None;
    info!("game over with score {}", state.score);
    state.push_event(FrameEvent::GameOver { score: state.score });
}

/// Everything that can collide this tick, in order: player shots, hostile
/// shots, grunts reaching the player.
pub fn resolve_collisions(state: &mut GameState, now: Duration) {
    resolve_player_shots(state, now);
    resolve_hostile_shots(state, now);
    resolve_reach(state, now);
}

// ── Bomb ─────────────────────────────────────────────────────────────────────

/// Number of grunts a bomb takes out of `alive`.
pub fn bomb_kill_count(alive: usize, fraction: f32) -> usize {
    // Slack for f32 rounding: 10 × 0.3 must give 3, not 4.
    let raw = alive as f64 * f64::from(fraction) - 1e-4;
    (raw.ceil().max(0.0) as usize).min(alive)
}

/// Destroy a random share of the living grunts, sampled without
/// replacement.  The boss only gets an explosion.
pub fn use_bomb<R: Rng>(state: &mut GameState, now: Duration, rng: &mut R) -> bool {
    if !state.running || state.paused() || state.status != GameStatus::InProgress {
        return false;
    }
    match state.config.bomb {
        BombPolicy::Charges { .. } => {
            if state.bombs_left == 0 {
                return false;
            }
            state.bombs_left -= 1;
        }
        BombPolicy::Cooldown { cooldown_ms } => {
            if now < state.bomb_ready_at {
                return false;
            }
            state.bomb_ready_at = now + Duration::from_millis(cooldown_ms);
        }
    }

    let alive: Vec<usize> = (0..state.grunts.len())
        .filter(|&i| state.grunts[i].body.alive)
        .collect();
    let kills = bomb_kill_count(alive.len(), state.config.bomb_kill_fraction);
    for pick in index::sample(rng, alive.len(), kills).iter() {
        let grunt = &mut state.grunts[alive[pick]];
        grunt.body.alive = false;
        let (rect, value) = (grunt.rect(), grunt.score_value);
        state.score += value;
        explode(state, &rect, 70.0);
    }
    if let Some(rect) = state.boss.as_ref().filter(|b| b.body.alive).map(|b| b.rect()) {
        explode(state, &rect, 100.0);
    }
    state.grunts.retain(|g| g.body.alive);

    info!("bomb destroyed {kills} grunts");
    true
}
