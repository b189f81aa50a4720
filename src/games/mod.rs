//! The mini-games
//!
//! Every game is a plain struct implementing `sim::Game`: seeded, owned by
//! exactly one `GameLoop`, driven only through `handle_gesture` and `update`.

pub mod breakout;
pub mod flappy;
pub mod jumper;
pub mod rhythm;
pub mod shooter;
pub mod snake;
pub mod stacker;

pub use breakout::Breakout;
pub use flappy::Flappy;
pub use jumper::Jumper;
pub use rhythm::Rhythm;
pub use shooter::Shooter;
pub use snake::Snake;
pub use stacker::Stacker;

use serde::{Deserialize, Serialize};

/// Game selector (URL hash on the web, CLI argument natively)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameId {
    Breakout,
    Flappy,
    Jumper,
    Shooter,
    Rhythm,
    Snake,
    Stacker,
}

impl GameId {
    pub const ALL: [GameId; 7] = [
        GameId::Breakout,
        GameId::Flappy,
        GameId::Jumper,
        GameId::Shooter,
        GameId::Rhythm,
        GameId::Snake,
        GameId::Stacker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Breakout => "breakout",
            GameId::Flappy => "flappy",
            GameId::Jumper => "jumper",
            GameId::Shooter => "shooter",
            GameId::Rhythm => "rhythm",
            GameId::Snake => "snake",
            GameId::Stacker => "stacker",
        }
    }

    /// Display name for menus
    pub fn title(&self) -> &'static str {
        match self {
            GameId::Breakout => "Breakout",
            GameId::Flappy => "Flappy",
            GameId::Jumper => "Jumper",
            GameId::Shooter => "Shooter",
            GameId::Rhythm => "Rhythm",
            GameId::Snake => "Snake",
            GameId::Stacker => "Stacker",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches('#').to_lowercase();
        GameId::ALL.into_iter().find(|id| id.as_str() == s)
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use crate::audio::SilentAudio;
    use crate::fx::ParticlePool;
    use crate::sim::Effects;

    /// Owns the collaborators a game needs when driven directly in tests
    pub struct FxHarness {
        pub particles: ParticlePool,
        pub audio: SilentAudio,
    }

    impl FxHarness {
        pub fn new() -> Self {
            Self {
                particles: ParticlePool::new(0),
                audio: SilentAudio,
            }
        }

        pub fn fx(&mut self) -> Effects<'_> {
            Effects {
                particles: &mut self.particles,
                audio: &mut self.audio,
            }
        }
    }
}
