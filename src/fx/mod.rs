//! Visual effects shared by all games
//!
//! - `palette`: Colors and HSL helpers
//! - `particles`: Emit / tick / render particle pool
//! - `confetti`: Win-screen confetti burst

pub mod confetti;
pub mod palette;
pub mod particles;

pub use confetti::{Confetti, ConfettiPiece};
pub use palette::Color;
pub use particles::{Particle, ParticlePool, ParticleSprite};
