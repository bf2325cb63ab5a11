//! Game entity types and the simulation state that owns them.
//!
//! Every entity embeds a [`Body`] (position, size, scale, liveness); the
//! variant structs add only what their behaviour needs.  Drawing goes through
//! [`Drawable`], tagged by [`SpriteKind`].

use std::collections::VecDeque;
use std::time::Duration;

use crate::config::GameConfig;
use crate::events::FrameEvent;
use crate::geometry::{Axis, Rect, Size, Vec2};
use crate::hud::HudSnapshot;

// ── Shared record ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    /// Top-left corner in viewport pixels.
    pub pos: Vec2,
    pub base_size: Size,
    pub scale: f32,
    /// Cleared when the entity dies; a dead body is never revived.
    pub alive: bool,
}

impl Body {
    pub fn new(pos: Vec2, base_size: Size, scale: f32) -> Self {
        Self { pos, base_size, scale, alive: true }
    }

    pub fn size(&self) -> Size {
        self.base_size.scaled(self.scale)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size())
    }
}

// ── Variants ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub body: Body,
}

impl Player {
    pub fn rect(&self) -> Rect {
        self.body.rect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Player,
    Hostile,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    /// Sprite geometry.  `body.scale` is fixed at spawn time.
    pub body: Body,
    pub origin: Origin,
    /// Signed distance per tick along the forward axis.
    pub velocity: f32,
    /// Collision size, already scaled when the shot was fired.
    pub hitbox: Size,
}

impl Projectile {
    /// The hit box, anchored at the sprite's corner.
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.body.pos, self.hitbox)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Grunt {
    pub body: Body,
    pub score_value: u32,
    /// Hover slot for queued grunts; `None` inside a rigid formation.
    pub slot: Option<Vec2>,
    /// Queued grunts fly in first and only drift once they reach the slot.
    pub arrived: bool,
}

impl Grunt {
    pub fn rect(&self) -> Rect {
        self.body.rect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Boss {
    pub body: Body,
    pub hp: u32,
    pub max_hp: u32,
    pub score_value: u32,
    /// Signed unscaled speed along the sweep axis.
    pub velocity: f32,
}

impl Boss {
    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.hp as f32 / self.max_hp as f32
    }
}

// ── Draw contract ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteKind {
    Player,
    PlayerShot,
    HostileShot,
    Grunt,
    Boss,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Drawable {
    pub kind: SpriteKind,
    /// Visual bounds.
    pub rect: Rect,
    /// Collision bounds; differs from `rect` only for projectiles.
    pub hitbox: Rect,
    /// Boss health bar, 0.0..=1.0.
    pub hp_fraction: Option<f32>,
}

// ── State machine ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Intro,
    InProgress,
    LevelClear,
    Won,
    Lost,
}

/// A timed transition that runs while the simulation is paused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pending {
    /// Player was hit; put them back at the start line when due.
    Respawn { due: Duration },
    /// Level banner is showing; build the next wave when due.
    SpawnWave { due: Duration },
    /// Wave is built; unpause when due.
    Resume { due: Duration },
}

impl Pending {
    pub fn due(&self) -> Duration {
        match *self {
            Pending::Respawn { due } | Pending::SpawnWave { due } | Pending::Resume { due } => due,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossTimer {
    /// First appearance in this wave; counts as a pending spawn.
    Appear { due: Duration },
    /// Comeback after a defeat; dropped when the wave clears.
    Respawn { due: Duration },
}

impl BossTimer {
    pub fn due(&self) -> Duration {
        match *self {
            BossTimer::Appear { due } | BossTimer::Respawn { due } => due,
        }
    }
}

// ── Master game state ────────────────────────────────────────────────────────

/// The whole simulation.  Only the functions in `compute` and the systems it
/// calls mutate it, one tick at a time.
#[derive(Clone, Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub width: f32,
    pub height: f32,
    /// Cached `width / reference_width`.
    pub scale: f32,

    pub player: Option<Player>,
    pub shots: Vec<Projectile>,
    pub hostile_shots: Vec<Projectile>,
    pub grunts: Vec<Grunt>,
    pub boss: Option<Boss>,
    pub boss_timer: Option<BossTimer>,

    pub spawn_queue: VecDeque<Vec2>,
    /// Release time of the latest queued grunt; `None` until the wave's first.
    pub last_spawn_at: Option<Duration>,
    /// +1.0 / −1.0 along the sweep axis.
    pub sweep_dir: f32,
    pub drift_phase: f32,

    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub bombs_left: u32,
    pub bomb_ready_at: Duration,

    pub last_grunt_shot: Duration,
    pub last_boss_shot: Duration,
    pub boss_shots_fired: u32,
    pub boss_cooling: bool,

    pub status: GameStatus,
    pub running: bool,
    /// Pause requested by the player.
    pub user_paused: bool,
    pub pending: Option<Pending>,

    pub frame: u64,
    pub events: Vec<FrameEvent>,
    pub last_hud: Option<HudSnapshot>,
}

impl GameState {
    /// True when tick bodies are skipped: user pause or a timed transition.
    pub fn paused(&self) -> bool {
        self.user_paused || self.pending.is_some()
    }

    /// Viewport length along `axis`.
    pub fn extent(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    pub fn push_event(&mut self, event: FrameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<FrameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn grunts_alive(&self) -> usize {
        self.grunts.iter().filter(|g| g.body.alive).count()
    }

    pub fn boss_alive(&self) -> bool {
        self.boss.as_ref().map_or(false, |b| b.body.alive)
    }

    pub fn live_player_shots(&self) -> usize {
        self.shots.iter().filter(|s| s.body.alive).count()
    }

    pub fn clear_projectiles(&mut self) {
        self.shots.clear();
        self.hostile_shots.clear();
    }

    /// Everything the renderer should draw this frame, tagged by kind.
    pub fn drawables(&self) -> Vec<Drawable> {
        let mut out = Vec::new();
        for grunt in self.grunts.iter().filter(|g| g.body.alive) {
            out.push(Drawable {
                kind: SpriteKind::Grunt,
                rect: grunt.rect(),
                hitbox: grunt.rect(),
                hp_fraction: None,
            });
        }
        if let Some(boss) = self.boss.as_ref().filter(|b| b.body.alive) {
            out.push(Drawable {
                kind: SpriteKind::Boss,
                rect: boss.rect(),
                hitbox: boss.rect(),
                hp_fraction: Some(boss.hp_fraction()),
            });
        }
        let shots = self.shots.iter().map(|s| (SpriteKind::PlayerShot, s));
        let hostile = self.hostile_shots.iter().map(|s| (SpriteKind::HostileShot, s));
        for (kind, shot) in shots.chain(hostile).filter(|(_, s)| s.body.alive) {
            out.push(Drawable {
                kind,
                rect: shot.body.rect(),
                hitbox: shot.rect(),
                hp_fraction: None,
            });
        }
        if let Some(player) = self.player.as_ref().filter(|p| p.body.alive) {
            out.push(Drawable {
                kind: SpriteKind::Player,
                rect: player.rect(),
                hitbox: player.rect(),
                hp_fraction: None,
            });
        }
        out
    }
}
