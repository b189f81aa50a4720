//! Short-lived particle effects
//!
//! Purely visual: nothing here feeds back into gameplay.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::palette::{Color, WARM_PINK_HUE};

/// Max initial speed per axis (logical px per tick)
pub const SPREAD: f32 = 4.0;
/// Downward acceleration added to vy each tick
pub const GRAVITY: f32 = 0.15;
/// Life lost per tick (life starts at 1.0, so particles live 32 ticks)
pub const DECAY: f32 = 1.0 / 32.0;
/// Draw radius of a particle
pub const RADIUS: f32 = 3.0;
/// Default cap on live particles
pub const MAX_PARTICLES: usize = 512;

/// A single particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    /// 0-1, decreases every tick
    pub life: f32,
}

/// What the draw callback receives for one particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSprite {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Color,
    pub alpha: f32,
}

/// Emit / tick / render particle collection
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    rng: Pcg32,
    max_particles: usize,
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ParticlePool {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            max_particles: MAX_PARTICLES,
        }
    }

    /// Cap the number of live particles (0 disables emission)
    pub fn with_max_particles(mut self, max: usize) -> Self {
        self.set_max_particles(max);
        self
    }

    pub fn set_max_particles(&mut self, max: usize) {
        self.max_particles = max;
        self.enforce_cap();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Spawn `count` particles at `(x, y)`; `None` picks a warm-pink hue per particle
    pub fn emit(&mut self, x: f32, y: f32, count: usize, color: Option<Color>) {
        if !x.is_finite() || !y.is_finite() || self.max_particles == 0 {
            return;
        }
        self.particles.reserve(count);
        for _ in 0..count {
            let vel = Vec2::new(
                self.rng.random_range(-SPREAD..=SPREAD),
                self.rng.random_range(-SPREAD..=SPREAD),
            );
            let color = color.unwrap_or_else(|| {
                let hue = self.rng.random_range(WARM_PINK_HUE);
                Color::hsl(hue, 0.9, 0.7)
            });
            self.particles.push(Particle {
                pos: Vec2::new(x, y),
                vel,
                color,
                life: 1.0,
            });
        }
        self.enforce_cap();
    }

    /// Advance every particle by one tick and drop the dead ones
    pub fn tick(&mut self) {
        if self.particles.is_empty() {
            return;
        }
        for p in self.particles.iter_mut() {
            p.pos += p.vel;
            p.vel.y += GRAVITY;
            p.life -= DECAY;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    /// Call `draw` once per live particle
    pub fn render(&self, mut draw: impl FnMut(ParticleSprite)) {
        for p in &self.particles {
            draw(ParticleSprite {
                pos: p.pos,
                radius: RADIUS,
                color: p.color,
                alpha: p.life.clamp(0.0, 1.0),
            });
        }
    }

    fn enforce_cap(&mut self) {
        if self.particles.len() > self.max_particles {
            // Oldest first
            let excess = self.particles.len() - self.max_particles;
            self.particles.drain(..excess);
        }
    }
}
