use std::collections::HashSet;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use wave_shooter::combat::{bomb_kill_count, resolve_collisions, use_bomb};
use wave_shooter::compute::{init_state, player_shoot, start};
use wave_shooter::config::{GameConfig, ReachPolicy};
use wave_shooter::entities::*;
use wave_shooter::events::FrameEvent;
use wave_shooter::geometry::{Rect, Vec2};
use wave_shooter::spawner::{spawn_boss, spawn_hostile_shot};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn started(config: GameConfig, seed: u64) -> (GameState, StdRng) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut s = init_state(config, 800.0, 600.0);
    assert!(start(&mut s, ms(0), &mut rng));
    s.drain_events();
    (s, rng)
}

fn explosions(events: &[FrameEvent]) -> usize {
    events.iter().filter(|e| matches!(e, FrameEvent::Explosion { .. })).count()
}

// ── Bomb ──────────────────────────────────────────────────────────────────────

#[test]
fn kill_count_is_the_ceiling_share() {
    assert_eq!(bomb_kill_count(10, 0.7), 7);
    assert_eq!(bomb_kill_count(10, 0.3), 3);
    assert_eq!(bomb_kill_count(14, 0.7), 10);
    assert_eq!(bomb_kill_count(1, 0.7), 1);
    assert_eq!(bomb_kill_count(0, 0.7), 0);
    assert_eq!(bomb_kill_count(3, 1.0), 3);
    assert_eq!(bomb_kill_count(5, 0.0), 0);
}

#[test]
fn bomb_on_ten_grunts_destroys_seven_distinct() {
    for seed in 0..20 {
        let (mut s, mut rng) = started(GameConfig::side_scroller(), seed);
        s.grunts.truncate(10);
        let before: HashSet<(u32, u32)> = s
            .grunts
            .iter()
            .map(|g| (g.body.pos.x.to_bits(), g.body.pos.y.to_bits()))
            .collect();

        assert!(use_bomb(&mut s, ms(100), &mut rng));
        assert_eq!(s.grunts.len(), 3);
        assert_eq!(s.score, 70);
        assert_eq!(explosions(&s.drain_events()), 7);
        assert!(s
            .grunts
            .iter()
            .all(|g| before.contains(&(g.body.pos.x.to_bits(), g.body.pos.y.to_bits()))));
    }
}

#[test]
fn bomb_charge_is_spent() {
    let (mut s, mut rng) = started(GameConfig::side_scroller(), 1);
    assert!(use_bomb(&mut s, ms(100), &mut rng));
    assert_eq!(s.bombs_left, 0);
    let left = s.grunts.len();
    assert!(!use_bomb(&mut s, ms(200), &mut rng));
    assert_eq!(s.grunts.len(), left);
}

#[test]
fn cooldown_bomb_recharges() {
    let (mut s, mut rng) = started(GameConfig::top_down(), 1);
    assert!(use_bomb(&mut s, ms(0), &mut rng));
    assert!(!use_bomb(&mut s, ms(14_999), &mut rng));
    assert!(use_bomb(&mut s, ms(15_000), &mut rng));
}

#[test]
fn bomb_only_rattles_the_boss() {
    let (mut s, mut rng) = started(GameConfig::top_down(), 3);
    assert!(spawn_boss(&mut s, ms(0)));
    assert!(use_bomb(&mut s, ms(10), &mut rng));
    assert_eq!(s.boss.as_ref().map(|b| b.hp), Some(15));
    assert_eq!(explosions(&s.drain_events()), 1);
}

#[test]
fn bomb_needs_a_running_game() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut s = init_state(GameConfig::side_scroller(), 800.0, 600.0);
    assert!(!use_bomb(&mut s, ms(0), &mut rng));
    assert_eq!(s.bombs_left, 1);
}

// ── Player shots ──────────────────────────────────────────────────────────────

#[test]
fn shot_kills_only_the_first_overlapping_grunt() {
    let (mut s, _) = started(GameConfig::side_scroller(), 0);
    // Two grunts on top of each other.
    let twin = s.grunts[0].clone();
    s.grunts.truncate(1);
    s.grunts.push(twin);
    assert!(player_shoot(&mut s));
    s.shots[0].body.pos = s.grunts[0].body.pos;

    resolve_collisions(&mut s, ms(16));
    assert_eq!(s.grunts.len(), 1);
    assert!(s.shots.is_empty());
    assert_eq!(s.score, 10);
}

#[test]
fn boss_takes_the_shot_before_grunts() {
    let (mut s, _) = started(GameConfig::side_scroller(), 0);
    assert!(spawn_boss(&mut s, ms(0)));
    let boss_pos = s.boss.as_ref().map(|b| b.body.pos).unwrap_or_default();
    s.grunts[0].body.pos = boss_pos;
    assert!(player_shoot(&mut s));
    s.shots[0].body.pos = boss_pos;

    resolve_collisions(&mut s, ms(16));
    assert_eq!(s.boss.as_ref().map(|b| b.hp), Some(24));
    assert_eq!(s.grunts.len(), 14);
    assert_eq!(s.score, 0);
}

#[test]
fn defeated_boss_without_respawn_stays_gone() {
    let (mut s, _) = started(GameConfig::side_scroller(), 0);
    assert!(spawn_boss(&mut s, ms(0)));
    if let Some(boss) = s.boss.as_mut() {
        boss.hp = 1;
    }
    let boss_pos = s.boss.as_ref().map(|b| b.body.pos).unwrap_or_default();
    assert!(player_shoot(&mut s));
    s.shots[0].body.pos = boss_pos;

    resolve_collisions(&mut s, ms(16));
    assert!(s.boss.is_none());
    assert!(s.boss_timer.is_none());
    assert_eq!(s.score, 100);
}

// ── Grunts reaching the player ────────────────────────────────────────────────

fn grunt_on_player(s: &mut GameState) {
    let pos = s.player.as_ref().map(|p| p.body.pos).unwrap_or_default();
    s.grunts[0].body.pos = Vec2::new(pos.x + 10.0, pos.y);
}

#[test]
fn formation_reaching_the_player_costs_one_life() {
    let (mut s, _) = started(GameConfig::side_scroller(), 0);
    grunt_on_player(&mut s);

    resolve_collisions(&mut s, ms(16));
    assert_eq!(s.lives, 2);
    assert_eq!(s.status, GameStatus::InProgress);
    assert_eq!(s.pending, Some(Pending::Respawn { due: ms(16 + 900) }));
    // The grunt that got through stays in play, unscored.
    assert_eq!(s.grunts.len(), 14);
    assert_eq!(s.score, 0);
    assert!(s.events.contains(&FrameEvent::PlayerHit { lives: 2 }));
}

#[test]
fn reach_ends_game_under_game_over_policy() {
    let mut config = GameConfig::side_scroller();
    config.reach_policy = ReachPolicy::GameOver;
    let (mut s, _) = started(config, 0);
    grunt_on_player(&mut s);

    resolve_collisions(&mut s, ms(16));
    assert_eq!(s.lives, 0);
    assert_eq!(s.status, GameStatus::Lost);
    assert!(s.events.iter().any(|e| matches!(e, FrameEvent::GameOver { .. })));
}

#[test]
fn reach_is_harmless_under_ignore_policy() {
    let mut config = GameConfig::side_scroller();
    config.reach_policy = ReachPolicy::Ignore;
    let (mut s, _) = started(config, 0);
    grunt_on_player(&mut s);

    resolve_collisions(&mut s, ms(16));
    assert_eq!(s.lives, 3);
    assert_eq!(s.status, GameStatus::InProgress);
}

#[test]
fn hostile_hit_clears_every_shot() {
    let (mut s, _) = started(GameConfig::side_scroller(), 0);
    assert!(player_shoot(&mut s));
    let pos = s.player.as_ref().map(|p| p.body.pos).unwrap_or_default();
    let from = Rect { left: 0.0, top: 0.0, right: 1.0, bottom: 1.0 };
    let (sprite, hitbox) = (s.config.hostile_shot_sprite, s.config.hostile_shot_hitbox);
    spawn_hostile_shot(&mut s, from, sprite, hitbox);
    spawn_hostile_shot(&mut s, from, sprite, hitbox);
    s.hostile_shots[1].body.pos = pos;

    resolve_collisions(&mut s, ms(16));
    assert_eq!(s.lives, 2);
    assert!(s.shots.is_empty());
    assert!(s.hostile_shots.is_empty());
    assert!(s.events.contains(&FrameEvent::PlayerHit { lives: 2 }));
}
