//! Arcade Minis - single-screen arcade games on a 2D canvas
//!
//! Core modules:
//! - `input`: Coordinate mapping and gesture recognition (tap / swipe / drag)
//! - `fx`: Particle pool, palette and win-screen confetti
//! - `sim`: Game loop contract, geometry, randomized layout helpers
//! - `games`: The seven mini-games built on the loop contract
//! - `renderer`: 2D drawing surface abstraction
//! - `platform`: Browser scheduler, presenter and canvas wiring
//! - `highscores`, `settings`, `audio`: Collaborators that degrade silently

pub mod audio;
pub mod fx;
pub mod games;
pub mod highscores;
pub mod input;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::{BestScores, MemoryScoreStore, ScoreStore, StoreError};
pub use settings::Settings;

/// Shared configuration constants
pub mod consts {
    /// Movement below this distance (logical px) is a tap
    pub const TAP_THRESHOLD: f32 = 10.0;
    /// Movement at or above this distance (logical px) is a swipe
    pub const SWIPE_THRESHOLD: f32 = 30.0;

    /// Largest frame delta fed to a game update (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Delta used for the first frame after (re)scheduling
    pub const DEFAULT_FRAME_DT: f32 = 1.0 / 60.0;
    /// Frames rendered after a run ends so outcome effects can finish
    pub const OUTRO_FRAMES: u32 = 90;

    /// Default logical canvas size used by most games
    pub const LOGICAL_WIDTH: f32 = 400.0;
    pub const LOGICAL_HEIGHT: f32 = 600.0;
}
