//! Fixed-timestep arcade shooter simulation.
//!
//! The whole simulation lives in one [`entities::GameState`] value that is
//! passed by reference into the functions of [`compute`].  Rendering, audio
//! and score persistence are adapters fed by the events the simulation emits.

pub mod audio;
pub mod combat;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod geometry;
pub mod hud;
pub mod leaderboard;
pub mod movement;
pub mod scaling;
pub mod spawner;
pub mod waves;
