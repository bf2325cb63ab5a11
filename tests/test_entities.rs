use wave_shooter::compute::init_state;
use wave_shooter::config::GameConfig;
use wave_shooter::entities::*;
use wave_shooter::geometry::{rects_overlap, Rect, Size, Vec2};

fn grunt_at(x: f32, y: f32) -> Grunt {
    Grunt {
        body: Body::new(Vec2::new(x, y), Size::new(70.0, 50.0), 1.0),
        score_value: 10,
        slot: None,
        arrived: true,
    }
}

#[test]
fn body_rect_follows_scale() {
    let body = Body::new(Vec2::new(10.0, 20.0), Size::new(100.0, 50.0), 0.5);
    assert_eq!(body.size(), Size::new(50.0, 25.0));
    assert_eq!(
        body.rect(),
        Rect { left: 10.0, top: 20.0, right: 60.0, bottom: 45.0 }
    );
    assert!(body.alive);
}

#[test]
fn projectile_collides_with_its_hitbox_not_its_sprite() {
    let shot = Projectile {
        body: Body::new(Vec2::new(0.0, 0.0), Size::new(80.0, 50.0), 1.0),
        origin: Origin::Player,
        velocity: 5.0,
        hitbox: Size::new(10.0, 18.0),
    };
    assert_eq!(shot.rect(), Rect { left: 0.0, top: 0.0, right: 10.0, bottom: 18.0 });
    assert_eq!(shot.body.rect().right, 80.0);
}

#[test]
fn touching_rects_overlap() {
    let a = Rect { left: 0.0, top: 0.0, right: 10.0, bottom: 10.0 };
    let b = Rect { left: 10.0, top: 10.0, right: 20.0, bottom: 20.0 };
    let c = Rect { left: 10.1, top: 0.0, right: 20.0, bottom: 10.0 };
    assert!(rects_overlap(&a, &b));
    assert!(!rects_overlap(&a, &c));
}

#[test]
fn boss_hp_fraction() {
    let boss = Boss {
        body: Body::new(Vec2::default(), Size::new(240.0, 120.0), 1.0),
        hp: 5,
        max_hp: 20,
        score_value: 150,
        velocity: 1.5,
    };
    assert_eq!(boss.hp_fraction(), 0.25);
}

#[test]
fn pending_and_timer_report_due_time() {
    use std::time::Duration;
    let due = Duration::from_millis(900);
    assert_eq!(Pending::Respawn { due }.due(), due);
    assert_eq!(Pending::Resume { due }.due(), due);
    assert_eq!(BossTimer::Appear { due }.due(), due);
}

#[test]
fn drawables_skip_the_dead_and_tag_each_kind() {
    let mut s = init_state(GameConfig::side_scroller(), 800.0, 600.0);
    s.grunts.push(grunt_at(600.0, 100.0));
    let mut dead = grunt_at(600.0, 200.0);
    dead.body.alive = false;
    s.grunts.push(dead);
    s.player = Some(Player {
        body: Body::new(Vec2::new(30.0, 265.0), Size::new(100.0, 70.0), 1.0),
    });
    s.boss = Some(Boss {
        body: Body::new(Vec2::new(420.0, 200.0), Size::new(350.0, 171.5), 1.0),
        hp: 10,
        max_hp: 25,
        score_value: 100,
        velocity: 0.9,
    });
    s.shots.push(Projectile {
        body: Body::new(Vec2::new(140.0, 290.0), Size::new(80.0, 50.0), 1.0),
        origin: Origin::Player,
        velocity: 5.0,
        hitbox: Size::new(10.0, 18.0),
    });

    let drawn = s.drawables();
    let kinds: Vec<SpriteKind> = drawn.iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![SpriteKind::Grunt, SpriteKind::Boss, SpriteKind::PlayerShot, SpriteKind::Player]
    );
    assert_eq!(drawn[1].hp_fraction, Some(0.4));
    assert_ne!(drawn[2].rect, drawn[2].hitbox);
}

#[test]
fn game_state_clone_is_independent() {
    let original = init_state(GameConfig::top_down(), 800.0, 600.0);
    let mut cloned = original.clone();

    cloned.score = 999;
    cloned.grunts.push(grunt_at(5.0, 5.0));
    cloned.user_paused = true;

    assert_eq!(original.score, 0);
    assert!(original.grunts.is_empty());
    assert!(!original.paused());
    assert!(cloned.paused());
}
