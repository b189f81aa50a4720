//! Win-screen confetti burst

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::palette::{Color, GOLD, LILAC, MINT, PEACH, PINK, SKY};

const COLORS: [Color; 6] = [PINK, GOLD, MINT, SKY, LILAC, PEACH];
/// Downward acceleration per tick
const FALL: f32 = 0.08;
/// Horizontal air drag per tick
const DRAG: f32 = 0.99;

/// One confetti piece (a spinning rectangle)
#[derive(Debug, Clone)]
pub struct ConfettiPiece {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub rotation: f32,
    pub spin: f32,
    pub color: Color,
}

/// Confetti state for the outcome overlay
#[derive(Debug, Clone)]
pub struct Confetti {
    pieces: Vec<ConfettiPiece>,
    floor: f32,
    rng: Pcg32,
}

impl Confetti {
    pub fn new(seed: u64) -> Self {
        Self {
            pieces: Vec::new(),
            floor: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Launch `count` pieces from above the top edge of a `width` x `height` area
    pub fn burst(&mut self, width: f32, height: f32, count: usize) {
        self.floor = height;
        for _ in 0..count {
            let piece = ConfettiPiece {
                pos: Vec2::new(
                    self.rng.random_range(0.0..width.max(1.0)),
                    self.rng.random_range(-height * 0.3..0.0),
                ),
                vel: Vec2::new(
                    self.rng.random_range(-1.5..1.5),
                    self.rng.random_range(1.0..3.0),
                ),
                size: Vec2::new(
                    self.rng.random_range(5.0..10.0),
                    self.rng.random_range(3.0..6.0),
                ),
                rotation: self.rng.random_range(0.0..std::f32::consts::TAU),
                spin: self.rng.random_range(-0.2..0.2),
                color: COLORS[self.rng.random_range(0..COLORS.len())],
            };
            self.pieces.push(piece);
        }
    }

    pub fn tick(&mut self) {
        for piece in self.pieces.iter_mut() {
            piece.pos += piece.vel;
            piece.vel.x *= DRAG;
            piece.vel.y += FALL;
            piece.rotation += piece.spin;
        }
        let floor = self.floor;
        self.pieces.retain(|p| p.pos.y - p.size.y < floor);
    }

    pub fn render(&self, mut draw: impl FnMut(&ConfettiPiece)) {
        for piece in &self.pieces {
            draw(piece);
        }
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_done(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn clear(&mut self) {
        self.pieces.clear();
    }
}
