use std::time::Duration;

use wave_shooter::audio::{AudioError, AudioSink, SilentAudio, Sound};
use wave_shooter::combat::player_hit;
use wave_shooter::compute::*;
use wave_shooter::config::{GameConfig, WaveGenerationMode};
use wave_shooter::entities::*;
use wave_shooter::events::{dispatch, FrameEvent};
use wave_shooter::geometry::Size;
use wave_shooter::leaderboard::Leaderboard;
use wave_shooter::spawner::player_start;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// A session on an 800×600 viewport (scale 1.0), started at t=0 with the
/// start events already drained.
fn started(config: GameConfig) -> (GameState, StdRng) {
    let mut rng = seeded_rng();
    let mut s = init_state(config, 800.0, 600.0);
    assert!(start(&mut s, ms(0), &mut rng));
    s.drain_events();
    (s, rng)
}

fn hostile_shot_at_player(s: &GameState) -> Projectile {
    let pos = s.player.as_ref().map(|p| p.body.pos).unwrap_or_default();
    Projectile {
        body: Body::new(pos, Size::new(60.0, 40.0), 1.0),
        origin: Origin::Hostile,
        velocity: 0.0,
        hitbox: Size::new(14.0, 24.0),
    }
}

// ── init_state / start ────────────────────────────────────────────────────────

#[test]
fn init_state_waits_in_intro() {
    let s = init_state(GameConfig::side_scroller(), 800.0, 600.0);
    assert_eq!(s.status, GameStatus::Intro);
    assert!(!s.running);
    assert_eq!(s.lives, 3);
    assert_eq!(s.level, 1);
    assert_eq!(s.score, 0);
    assert_eq!(s.bombs_left, 1);
    assert!(s.player.is_none());
    assert!(s.grunts.is_empty());
    assert_eq!(s.scale, 1.0);
}

#[test]
fn tick_before_start_changes_nothing() {
    let mut s = init_state(GameConfig::side_scroller(), 800.0, 600.0);
    tick(&mut s, ms(16), InputState::default(), &mut seeded_rng());
    assert_eq!(s.frame, 0);
    assert!(s.events.is_empty());
}

#[test]
fn start_spawns_player_wave_and_music() {
    let mut rng = seeded_rng();
    let mut s = init_state(GameConfig::side_scroller(), 800.0, 600.0);
    assert!(start(&mut s, ms(0), &mut rng));

    assert_eq!(s.status, GameStatus::InProgress);
    assert!(s.running);
    assert!(s.player.is_some());
    assert_eq!(s.grunts.len(), 14); // 7 cols × 2 rows
    assert!(s.events.contains(&FrameEvent::Sound(Sound::Music)));
    assert!(s.events.contains(&FrameEvent::LevelStarted { level: 1 }));

    // A second start is ignored
    assert!(!start(&mut s, ms(5), &mut rng));
}

// ── Formation sweep ───────────────────────────────────────────────────────────

#[test]
fn formation_reverses_and_steps_once_at_edge() {
    let mut config = GameConfig::top_down();
    config.wave_mode = WaveGenerationMode::Formation;
    let (mut s, mut rng) = started(config);
    assert_eq!(s.grunts.len(), 14);

    // Push the grid so its right edge sits exactly on the padded edge.
    let right = s.grunts.iter().map(|g| g.rect().right).fold(f32::MIN, f32::max);
    let shift = 790.0 - right;
    for g in s.grunts.iter_mut() {
        g.body.pos.x += shift;
    }
    let before: Vec<(f32, f32)> = s.grunts.iter().map(|g| (g.body.pos.x, g.body.pos.y)).collect();

    tick(&mut s, ms(16), InputState::default(), &mut rng);
    assert_eq!(s.sweep_dir, -1.0);
    for (g, (x, y)) in s.grunts.iter().zip(&before) {
        assert_eq!(g.body.pos.x, *x);
        assert!((g.body.pos.y - (y + 20.0)).abs() < 1e-4);
    }

    // Next tick sweeps back left without another step down.
    tick(&mut s, ms(32), InputState::default(), &mut rng);
    assert_eq!(s.sweep_dir, -1.0);
    for (g, (x, y)) in s.grunts.iter().zip(&before) {
        assert!((g.body.pos.x - (x - 0.9)).abs() < 1e-4);
        assert!((g.body.pos.y - (y + 20.0)).abs() < 1e-4);
    }
}

// ── Player fire cap ───────────────────────────────────────────────────────────

#[test]
fn fourth_shot_waits_for_a_free_slot() {
    let (mut s, mut rng) = started(GameConfig::side_scroller());
    assert!(player_shoot(&mut s));
    assert!(player_shoot(&mut s));
    assert!(player_shoot(&mut s));
    assert!(!player_shoot(&mut s));
    assert_eq!(s.shots.len(), 3);

    // One shot leaves through the far edge on the next tick.
    s.shots[0].body.pos.x = 795.0;
    tick(&mut s, ms(16), InputState::default(), &mut rng);
    assert_eq!(s.live_player_shots(), 2);
    assert!(player_shoot(&mut s));
    assert_eq!(s.shots.len(), 3);
}

#[test]
fn shooting_queues_a_sound() {
    let (mut s, _) = started(GameConfig::side_scroller());
    assert!(player_shoot(&mut s));
    assert_eq!(s.drain_events(), vec![FrameEvent::Sound(Sound::Shoot)]);
}

// ── Boss defeat and comeback ──────────────────────────────────────────────────

#[test]
fn boss_last_hit_scores_and_arms_respawn() {
    let (mut s, mut rng) = started(GameConfig::top_down());
    assert!(wave_shooter::spawner::spawn_boss(&mut s, ms(0)));
    if let Some(boss) = s.boss.as_mut() {
        boss.hp = 1;
    }
    assert!(player_shoot(&mut s));
    let target = s.boss.as_ref().map(|b| b.rect().center()).unwrap_or_default();
    s.shots[0].body.pos = target;
    s.shots[0].velocity = 0.0;

    tick(&mut s, ms(16), InputState::default(), &mut rng);
    assert!(s.boss.is_none());
    assert_eq!(s.score, 150);
    assert_eq!(s.boss_timer, Some(BossTimer::Respawn { due: ms(16 + 8000) }));
    assert!(s.events.contains(&FrameEvent::BossDefeated { score_value: 150 }));
    // Queued grunts keep the level open.
    assert_eq!(s.status, GameStatus::InProgress);

    tick(&mut s, ms(8015), InputState::default(), &mut rng);
    assert!(s.boss.is_none());
    tick(&mut s, ms(8016), InputState::default(), &mut rng);
    let boss = s.boss.as_ref().map(|b| (b.hp, b.body.alive));
    assert_eq!(boss, Some((15, true)));
}

// ── Losing ────────────────────────────────────────────────────────────────────

#[test]
fn last_life_lost_ends_game_and_records_score() {
    let (mut s, mut rng) = started(GameConfig::side_scroller());
    s.lives = 1;
    s.score = 40;
    let shot = hostile_shot_at_player(&s);
    s.hostile_shots.push(shot);

    tick(&mut s, ms(16), InputState::default(), &mut rng);
    assert_eq!(s.lives, 0);
    assert_eq!(s.status, GameStatus::Lost);
    assert!(!s.running);

    let mut board = Leaderboard::new();
    let rest = dispatch(s.drain_events(), &mut SilentAudio, &mut board, "Ace");
    assert!(rest.contains(&FrameEvent::GameOver { score: 40 }));
    assert_eq!(board.best(), 40);

    // Nothing moves after the game is over.
    let grunts = s.grunts.clone();
    let frame = s.frame;
    tick(&mut s, ms(32), InputState { right: true, ..Default::default() }, &mut rng);
    assert_eq!(s.grunts, grunts);
    assert_eq!(s.frame, frame);
}

/// Refuses every cue, like a platform that blocks playback.
#[derive(Default)]
struct RefusingAudio {
    refused: Vec<Sound>,
}

impl AudioSink for RefusingAudio {
    fn play(&mut self, sound: Sound) -> Result<(), AudioError> {
        self.refused.push(sound);
        Err(AudioError::Blocked(sound))
    }
}

#[test]
fn refused_audio_leaves_the_game_alone() {
    let mut rng = seeded_rng();
    let mut s = init_state(GameConfig::side_scroller(), 800.0, 600.0);
    assert!(start(&mut s, ms(0), &mut rng));
    let mut audio = RefusingAudio::default();
    let mut board = Leaderboard::new();

    let rest = dispatch(s.drain_events(), &mut audio, &mut board, "Ace");
    assert_eq!(audio.refused, vec![Sound::Music]);
    assert!(rest.contains(&FrameEvent::LevelStarted { level: 1 }));
    assert!(!rest.iter().any(|e| matches!(e, FrameEvent::Sound(_))));

    tick(&mut s, ms(16), InputState::default(), &mut rng);
    assert_eq!(s.frame, 1);
    assert_eq!(s.status, GameStatus::InProgress);

    s.lives = 1;
    s.score = 40;
    assert!(player_shoot(&mut s));
    let shot = hostile_shot_at_player(&s);
    s.hostile_shots.push(shot);
    tick(&mut s, ms(32), InputState::default(), &mut rng);
    assert_eq!(s.status, GameStatus::Lost);

    let rest = dispatch(s.drain_events(), &mut audio, &mut board, "Ace");
    assert!(audio.refused.contains(&Sound::Shoot));
    assert!(rest.contains(&FrameEvent::PlayerHit { lives: 0 }));
    assert!(rest.contains(&FrameEvent::GameOver { score: 40 }));
    assert_eq!(board.best(), 40);
}

#[test]
fn hit_with_lives_left_pauses_until_respawn() {
    let (mut s, mut rng) = started(GameConfig::side_scroller());
    player_shoot(&mut s);
    player_hit(&mut s, ms(100));

    assert_eq!(s.lives, 2);
    assert!(s.shots.is_empty());
    assert_eq!(s.pending, Some(Pending::Respawn { due: ms(1000) }));
    assert!(s.paused());
    assert!(s.player.as_ref().map_or(false, |p| !p.body.alive));

    tick(&mut s, ms(500), InputState::default(), &mut rng);
    assert_eq!(s.frame, 0);
    assert!(s.pending.is_some());

    tick(&mut s, ms(1000), InputState::default(), &mut rng);
    assert!(s.pending.is_none());
    let player = s.player.as_ref().map(|p| (p.body.alive, p.body.pos));
    assert_eq!(player, Some((true, player_start(&s))));
}

#[test]
fn flying_into_the_formation_costs_one_life_then_respawns() {
    let mut config = GameConfig::side_scroller();
    config.grunt_fire_interval_ms = 600_000;
    let (mut s, mut rng) = started(config);
    let right = InputState { right: true, ..Default::default() };

    let mut now = ms(0);
    for _ in 0..2000 {
        now += ms(16);
        tick(&mut s, now, right, &mut rng);
        if s.pending.is_some() || s.status != GameStatus::InProgress {
            break;
        }
    }
    assert_eq!(s.lives, 2);
    assert_eq!(s.status, GameStatus::InProgress);
    assert_eq!(s.pending, Some(Pending::Respawn { due: now + ms(900) }));
    assert_eq!(s.grunts.len(), 14);

    tick(&mut s, now + ms(900), InputState::default(), &mut rng);
    assert!(s.pending.is_none());
    let player = s.player.as_ref().map(|p| (p.body.alive, p.body.pos));
    assert_eq!(player, Some((true, player_start(&s))));

    let frame = s.frame;
    tick(&mut s, now + ms(916), InputState::default(), &mut rng);
    assert_eq!(s.frame, frame + 1);
    assert_eq!(s.lives, 2);
}

// ── Levels ────────────────────────────────────────────────────────────────────

#[test]
fn cleared_level_shows_banner_then_next_wave() {
    let (mut s, mut rng) = started(GameConfig::side_scroller());
    s.grunts.clear();

    tick(&mut s, ms(16), InputState::default(), &mut rng);
    assert_eq!(s.level, 2);
    assert_eq!(s.status, GameStatus::LevelClear);
    assert_eq!(s.pending, Some(Pending::SpawnWave { due: ms(1016) }));

    tick(&mut s, ms(1016), InputState::default(), &mut rng);
    assert_eq!(s.grunts.len(), 21); // 7 cols × 3 rows
    assert_eq!(s.pending, Some(Pending::Resume { due: ms(1216) }));
    assert!(s.events.contains(&FrameEvent::LevelStarted { level: 2 }));

    tick(&mut s, ms(1215), InputState::default(), &mut rng);
    assert_eq!(s.status, GameStatus::LevelClear);
    tick(&mut s, ms(1216), InputState::default(), &mut rng);
    assert_eq!(s.status, GameStatus::InProgress);
    assert!(s.pending.is_none());
}

#[test]
fn clearing_the_last_level_wins() {
    let (mut s, mut rng) = started(GameConfig::side_scroller());
    s.level = 3;
    s.score = 500;
    s.grunts.clear();

    tick(&mut s, ms(16), InputState::default(), &mut rng);
    assert_eq!(s.status, GameStatus::Won);
    assert!(!s.running);
    assert!(s.events.contains(&FrameEvent::GameWon { score: 500 }));
}

// ── Commands ──────────────────────────────────────────────────────────────────

#[test]
fn restart_goes_back_to_intro_keeping_config() {
    let (mut s, _) = started(GameConfig::top_down());
    s.score = 90;
    s.lives = 1;
    resize(&mut s, 400.0, 300.0);

    restart(&mut s);
    assert_eq!(s.status, GameStatus::Intro);
    assert!(!s.running);
    assert_eq!(s.score, 0);
    assert_eq!(s.lives, 3);
    assert!(s.grunts.is_empty() && s.spawn_queue.is_empty());
    assert_eq!(s.config, GameConfig::top_down());
    assert_eq!((s.width, s.height, s.scale), (400.0, 300.0, 0.5));
}

#[test]
fn fire_after_game_over_starts_fresh() {
    let (mut s, mut rng) = started(GameConfig::side_scroller());
    s.status = GameStatus::Lost;
    s.running = false;
    s.score = 70;

    assert!(press_fire(&mut s, ms(5000), &mut rng));
    assert_eq!(s.status, GameStatus::InProgress);
    assert_eq!(s.score, 0);
    assert_eq!(s.lives, 3);
    assert_eq!(s.grunts.len(), 14);
}

#[test]
fn fire_from_intro_starts() {
    let mut rng = seeded_rng();
    let mut s = init_state(GameConfig::side_scroller(), 800.0, 600.0);
    assert!(press_fire(&mut s, ms(0), &mut rng));
    assert_eq!(s.status, GameStatus::InProgress);
    assert!(s.shots.is_empty());
}

#[test]
fn user_pause_freezes_everything() {
    let (mut s, mut rng) = started(GameConfig::side_scroller());
    assert!(toggle_pause(&mut s));
    let grunts = s.grunts.clone();

    tick(&mut s, ms(16), InputState { up: true, ..Default::default() }, &mut rng);
    assert_eq!(s.frame, 0);
    assert_eq!(s.grunts, grunts);
    assert!(!press_fire(&mut s, ms(20), &mut rng));
    assert!(!press_bomb(&mut s, ms(20), &mut rng));

    assert!(toggle_pause(&mut s));
    tick(&mut s, ms(32), InputState::default(), &mut rng);
    assert_eq!(s.frame, 1);
}

#[test]
fn stopped_session_ignores_ticks() {
    let (mut s, mut rng) = started(GameConfig::side_scroller());
    stop(&mut s);
    let grunts = s.grunts.clone();
    tick(&mut s, ms(16), InputState::default(), &mut rng);
    assert_eq!(s.frame, 0);
    assert_eq!(s.grunts, grunts);
    assert_eq!(s.status, GameStatus::InProgress);
}

#[test]
fn pause_is_refused_outside_play() {
    let mut s = init_state(GameConfig::side_scroller(), 800.0, 600.0);
    assert!(!toggle_pause(&mut s));
    assert!(!s.user_paused);
}

#[test]
fn hud_is_sent_only_when_it_changes() {
    let (mut s, mut rng) = started(GameConfig::side_scroller());
    tick(&mut s, ms(16), InputState::default(), &mut rng);
    let huds = |events: &[FrameEvent]| {
        events.iter().filter(|e| matches!(e, FrameEvent::Hud(_))).count()
    };
    assert_eq!(huds(&s.drain_events()), 1);

    tick(&mut s, ms(32), InputState::default(), &mut rng);
    assert_eq!(huds(&s.drain_events()), 0);

    s.score += 10;
    tick(&mut s, ms(48), InputState::default(), &mut rng);
    assert_eq!(huds(&s.drain_events()), 1);
}

#[test]
fn score_never_drops_and_lives_never_grow() {
    for config in [GameConfig::side_scroller(), GameConfig::top_down()] {
        let (mut s, mut rng) = started(config);
        let (mut score, mut lives) = (s.score, s.lives);
        for i in 1..=3000u64 {
            let now = ms(i * 16);
            if i % 7 == 0 {
                press_fire(&mut s, now, &mut rng);
            }
            if i % 500 == 0 {
                press_bomb(&mut s, now, &mut rng);
            }
            let input = InputState { left: i % 200 < 100, right: i % 200 >= 100, ..Default::default() };
            tick(&mut s, now, input, &mut rng);
            s.drain_events();

            assert!(s.score >= score);
            assert!(s.lives <= lives);
            assert!(s.live_player_shots() <= s.config.max_player_shots);
            assert!(s.boss.iter().filter(|b| b.body.alive).count() <= 1);
            score = s.score;
            lives = s.lives;
            if !s.running {
                break;
            }
        }
    }
}

// ── FrameGate ─────────────────────────────────────────────────────────────────

#[test]
fn frame_gate_lets_one_tick_through_per_interval() {
    let mut gate = FrameGate::new(ms(16));
    assert!(gate.ready(ms(0)));
    assert!(!gate.ready(ms(10)));
    assert!(gate.ready(ms(16)));
    assert!(!gate.ready(ms(20)));
    assert!(!gate.ready(ms(31)));
    assert!(gate.ready(ms(40)));
}

#[test]
fn resize_reports_new_scale() {
    let (mut s, _) = started(GameConfig::side_scroller());
    assert_eq!(resize(&mut s, 1600.0, 1200.0), 2.0);
    assert_eq!(s.scale, 2.0);
}
