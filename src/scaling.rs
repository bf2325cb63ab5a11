//! Resolution independence: one uniform factor derived from viewport width.

use log::debug;

use crate::entities::GameState;
use crate::movement::clamp_player;

pub fn scale_factor(viewport_width: f32, reference_width: f32) -> f32 {
    if reference_width <= 0.0 {
        return 1.0;
    }
    viewport_width / reference_width
}

/// Apply a new viewport size.  Player, grunts and boss take the new factor
/// and their positions follow proportionally; projectiles keep the scale they
/// were fired with.  Same dimensions in, same numbers out.
pub fn rescale(state: &mut GameState, width: f32, height: f32) -> f32 {
    let old = state.scale;
    let new = scale_factor(width, state.config.reference_width);
    let ratio = if old > 0.0 { new / old } else { 1.0 };

    state.width = width;
    state.height = height;
    state.scale = new;

    if let Some(player) = state.player.as_mut() {
        player.body.scale = new;
        player.body.pos = player.body.pos.scaled(ratio);
    }
    for grunt in state.grunts.iter_mut() {
        grunt.body.scale = new;
        grunt.body.pos = grunt.body.pos.scaled(ratio);
        grunt.slot = grunt.slot.map(|s| s.scaled(ratio));
    }
    if let Some(boss) = state.boss.as_mut() {
        boss.body.scale = new;
        boss.body.pos = boss.body.pos.scaled(ratio);
    }
    clamp_player(state);

    debug!("viewport {width}x{height}, scale {new}");
    new
}
