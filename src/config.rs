//! Game tuning tables.  Every distance is in reference pixels (a viewport
//! `reference_width` wide) and gets multiplied by the live scale factor.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::geometry::{Axis, Size};

// ── Variant switches ─────────────────────────────────────────────────────────

/// Which way the player faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Player on the left edge, firing toward +x.  Enemies sweep vertically.
    SideScroll,
    /// Player on the bottom edge, firing toward −y.  Enemies sweep horizontally.
    TopDown,
}

impl Orientation {
    /// Axis player shots travel along.
    pub fn forward_axis(self) -> Axis {
        match self {
            Orientation::SideScroll => Axis::X,
            Orientation::TopDown => Axis::Y,
        }
    }

    /// Axis the formation and the boss sweep along.
    pub fn sweep_axis(self) -> Axis {
        self.forward_axis().other()
    }

    /// +1.0 when player shots move toward increasing coordinates.
    pub fn forward_sign(self) -> f32 {
        match self {
            Orientation::SideScroll => 1.0,
            Orientation::TopDown => -1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAxes {
    /// Both axes.
    Free,
    /// Only along the sweep axis.
    Lateral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveGenerationMode {
    /// Rigid grid placed at once, swept edge to edge.
    Formation,
    /// Randomized slots released one by one, hovering with a shared drift.
    SpawnQueue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum BossFireMode {
    Interval { interval_ms: u64 },
    /// `shots` shots spaced by at least `interval_ms`, then a `cooldown_ms` gap.
    Burst { shots: u32, interval_ms: u64, cooldown_ms: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BombPolicy {
    Charges { count: u32 },
    Cooldown { cooldown_ms: u64 },
}

/// What happens when a grunt's leading edge reaches the player's line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReachPolicy {
    Ignore,
    /// Counts as a hit: one life and the respawn pause.
    LoseLife,
    GameOver,
}

// ── Sub-tables ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Formation rows (Formation mode).
    pub rows: u32,
    /// Queued grunts (SpawnQueue mode).
    pub spawn_count: u32,
    pub boss: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormationConfig {
    pub cols: u32,
    /// Distance between columns along the sweep axis.
    pub col_spacing: f32,
    /// Distance between rows along the forward axis.
    pub row_spacing: f32,
    /// Offset of the first column from the sweep-axis origin.
    pub sweep_start: f32,
    /// Gap between the formation and the far edge.
    pub far_margin: f32,
    /// Step toward the player on every edge contact.
    pub drop_on_edge: f32,
    pub edge_padding: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnQueueConfig {
    pub spawn_interval_ms: u64,
    pub entry_speed: f32,
    pub drift_amplitude: f32,
    /// Phase advance per tick, radians.
    pub drift_rate: f32,
    /// Fraction of the field (from the far edge) slots are drawn from.
    pub field_depth: f32,
    pub edge_padding: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossConfig {
    pub size: Size,
    pub hp: u32,
    pub score_value: u32,
    pub speed: f32,
    pub edge_padding: f32,
    /// Gap between the boss and the far edge.
    pub far_offset: f32,
    pub fire: BossFireMode,
    pub shot_sprite: Size,
    pub shot_hitbox: Size,
    pub appear_delay_ms: u64,
    /// `None`: a defeated boss stays dead for the rest of the wave.
    pub respawn_delay_ms: Option<u64>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub orientation: Orientation,
    pub player_axes: PlayerAxes,
    pub wave_mode: WaveGenerationMode,
    pub reach_policy: ReachPolicy,
    pub bomb: BombPolicy,
    pub bomb_kill_fraction: f32,

    pub tick_rate_hz: u32,
    pub reference_width: f32,

    pub player_size: Size,
    pub player_speed: f32,
    /// Distance of the start line from the player's own edge.
    pub player_start_offset: f32,
    pub start_lives: u32,

    pub max_player_shots: usize,
    pub player_shot_speed: f32,
    pub hostile_shot_speed: f32,
    pub player_shot_sprite: Size,
    pub player_shot_hitbox: Size,
    pub hostile_shot_sprite: Size,
    pub hostile_shot_hitbox: Size,
    /// Gap between a shooter and the shot it spawns.
    pub muzzle_gap: f32,

    pub grunt_size: Size,
    pub grunt_score: u32,
    pub grunt_speed: f32,
    pub grunt_speed_per_level: f32,
    pub grunt_fire_interval_ms: u64,

    pub formation: FormationConfig,
    pub queue: SpawnQueueConfig,
    pub boss: BossConfig,

    pub respawn_pause_ms: u64,
    pub level_banner_ms: u64,
    pub resume_delay_ms: u64,
    pub max_level: u32,
    pub waves: Vec<WaveConfig>,
}

impl GameConfig {
    /// Horizontal shooter: a 7-column formation that sweeps up and down and
    /// creeps toward the player, mothership on the last level.
    pub fn side_scroller() -> Self {
        Self {
            orientation: Orientation::SideScroll,
            player_axes: PlayerAxes::Free,
            wave_mode: WaveGenerationMode::Formation,
            reach_policy: ReachPolicy::LoseLife,
            bomb: BombPolicy::Charges { count: 1 },
            bomb_kill_fraction: 0.7,
            tick_rate_hz: 60,
            reference_width: 800.0,
            player_size: Size::new(100.0, 70.0),
            player_speed: 3.0,
            player_start_offset: 30.0,
            start_lives: 3,
            max_player_shots: 3,
            player_shot_speed: 5.0,
            hostile_shot_speed: 4.0,
            player_shot_sprite: Size::new(80.0, 50.0),
            player_shot_hitbox: Size::new(10.0, 18.0),
            hostile_shot_sprite: Size::new(60.0, 40.0),
            hostile_shot_hitbox: Size::new(14.0, 24.0),
            muzzle_gap: 5.0,
            grunt_size: Size::new(70.0, 50.0),
            grunt_score: 10,
            grunt_speed: 0.9,
            grunt_speed_per_level: 0.25,
            grunt_fire_interval_ms: 1200,
            formation: FormationConfig {
                cols: 7,
                col_spacing: 65.0,
                row_spacing: 80.0,
                sweep_start: 60.0,
                far_margin: 10.0,
                drop_on_edge: 20.0,
                edge_padding: 10.0,
            },
            queue: SpawnQueueConfig::default(),
            boss: BossConfig {
                size: Size::new(350.0, 171.5),
                hp: 25,
                score_value: 100,
                speed: 0.9,
                edge_padding: 10.0,
                far_offset: 30.0,
                fire: BossFireMode::Burst { shots: 1, interval_ms: 10, cooldown_ms: 5000 },
                shot_sprite: Size::new(200.0, 133.0),
                shot_hitbox: Size::new(14.0, 24.0),
                appear_delay_ms: 0,
                respawn_delay_ms: None,
            },
            respawn_pause_ms: 900,
            level_banner_ms: 1000,
            resume_delay_ms: 200,
            max_level: 3,
            waves: vec![
                WaveConfig { rows: 2, spawn_count: 0, boss: false },
                WaveConfig { rows: 3, spawn_count: 0, boss: false },
                WaveConfig { rows: 4, spawn_count: 0, boss: true },
            ],
        }
    }

    /// Vertical shooter: grunts fly in one by one and hover, a patrolling boss
    /// that keeps coming back, a bomb on a cooldown.
    pub fn top_down() -> Self {
        Self {
            orientation: Orientation::TopDown,
            player_axes: PlayerAxes::Lateral,
            wave_mode: WaveGenerationMode::SpawnQueue,
            reach_policy: ReachPolicy::Ignore,
            bomb: BombPolicy::Cooldown { cooldown_ms: 15_000 },
            bomb_kill_fraction: 0.7,
            player_size: Size::new(70.0, 100.0),
            player_shot_sprite: Size::new(50.0, 80.0),
            player_shot_hitbox: Size::new(18.0, 10.0),
            hostile_shot_sprite: Size::new(40.0, 60.0),
            hostile_shot_hitbox: Size::new(24.0, 14.0),
            player_speed: 4.0,
            grunt_fire_interval_ms: 900,
            formation: FormationConfig {
                cols: 7,
                col_spacing: 90.0,
                row_spacing: 60.0,
                sweep_start: 80.0,
                far_margin: 10.0,
                drop_on_edge: 20.0,
                edge_padding: 10.0,
            },
            queue: SpawnQueueConfig::default(),
            boss: BossConfig {
                size: Size::new(240.0, 120.0),
                hp: 15,
                score_value: 150,
                speed: 1.5,
                edge_padding: 10.0,
                far_offset: 30.0,
                fire: BossFireMode::Interval { interval_ms: 1500 },
                shot_sprite: Size::new(40.0, 60.0),
                shot_hitbox: Size::new(24.0, 14.0),
                appear_delay_ms: 3000,
                respawn_delay_ms: Some(8000),
            },
            max_level: 5,
            waves: vec![
                WaveConfig { rows: 2, spawn_count: 8, boss: false },
                WaveConfig { rows: 3, spawn_count: 12, boss: true },
                WaveConfig { rows: 4, spawn_count: 16, boss: true },
            ],
            ..Self::side_scroller()
        }
    }

    /// Read a JSON config and validate it.
    pub fn load(path: &Path) -> Result<Self, GameError> {
        let raw = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig = serde_json::from_str(&raw).map_err(|e| GameError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let fail = |reason: &str| Err(GameError::InvalidConfig(reason.to_string()));
        if self.reference_width <= 0.0 {
            return fail("reference_width must be positive");
        }
        if self.tick_rate_hz == 0 {
            return fail("tick_rate_hz must be positive");
        }
        if self.waves.is_empty() {
            return fail("at least one wave is required");
        }
        if self.max_level == 0 {
            return fail("max_level must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.bomb_kill_fraction) {
            return fail("bomb_kill_fraction must be within 0..=1");
        }
        if self.max_player_shots == 0 {
            return fail("max_player_shots must be at least 1");
        }
        if self.start_lives == 0 {
            return fail("start_lives must be at least 1");
        }
        if self.boss.hp == 0 {
            return fail("boss hp must be at least 1");
        }
        Ok(())
    }

    /// Wave parameters for `level` (1-based).  Levels past the end of the
    /// table reuse the last entry.
    pub fn wave(&self, level: u32) -> &WaveConfig {
        let idx = (level.max(1) - 1) as usize;
        self.waves
            .get(idx)
            .or_else(|| self.waves.last())
            .unwrap_or(&FALLBACK_WAVE)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }

    pub fn grunt_fire_interval(&self) -> Duration {
        Duration::from_millis(self.grunt_fire_interval_ms)
    }

    pub fn respawn_pause(&self) -> Duration {
        Duration::from_millis(self.respawn_pause_ms)
    }

    pub fn level_banner(&self) -> Duration {
        Duration::from_millis(self.level_banner_ms)
    }

    pub fn resume_delay(&self) -> Duration {
        Duration::from_millis(self.resume_delay_ms)
    }

    /// Starting bomb charges; a cooldown bomb is one reusable charge.
    pub fn bomb_charges(&self) -> u32 {
        match self.bomb {
            BombPolicy::Charges { count } => count,
            BombPolicy::Cooldown { .. } => 1,
        }
    }
}

static FALLBACK_WAVE: WaveConfig = WaveConfig { rows: 1, spawn_count: 1, boss: false };

impl Default for GameConfig {
    fn default() -> Self {
        Self::side_scroller()
    }
}

impl Default for SpawnQueueConfig {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 200,
            entry_speed: 4.0,
            drift_amplitude: 40.0,
            drift_rate: 0.03,
            field_depth: 0.4,
            edge_padding: 10.0,
        }
    }
}

impl SpawnQueueConfig {
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }
}

impl BossConfig {
    pub fn appear_delay(&self) -> Duration {
        Duration::from_millis(self.appear_delay_ms)
    }

    pub fn respawn_delay(&self) -> Option<Duration> {
        self.respawn_delay_ms.map(Duration::from_millis)
    }
}
