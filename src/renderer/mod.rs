//! 2D drawing surface abstraction
//!
//! Games draw through the `Canvas` trait so the simulation stays independent
//! of the browser. `canvas2d` wraps a `CanvasRenderingContext2d` on wasm and
//! `recording` captures draw calls for tests and headless runs.

#[cfg(target_arch = "wasm32")]
pub mod canvas2d;
pub mod recording;

#[cfg(target_arch = "wasm32")]
pub use canvas2d::Canvas2d;
pub use recording::{DrawCommand, RecordingCanvas};

use glam::Vec2;

use crate::fx::palette::{self, Color};
use crate::fx::{Confetti, ParticlePool};
use crate::input::LogicalSize;

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Immediate-mode drawing primitives in logical coordinates
pub trait Canvas {
    fn size(&self) -> LogicalSize;

    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// Rectangle rotated about its center (radians)
    fn fill_rotated_rect(&mut self, center: Vec2, size: Vec2, rotation: f32, color: Color);

    fn fill_text(&mut self, text: &str, pos: Vec2, px: f32, align: TextAlign, color: Color);
}

/// Draw every live particle as a faded circle
pub fn draw_particles(canvas: &mut dyn Canvas, particles: &ParticlePool) {
    particles.render(|sprite| {
        canvas.fill_circle(sprite.pos, sprite.radius, sprite.color.with_alpha(sprite.alpha));
    });
}

pub fn draw_confetti(canvas: &mut dyn Canvas, confetti: &Confetti) {
    confetti.render(|piece| {
        canvas.fill_rotated_rect(piece.pos, piece.size, piece.rotation, piece.color);
    });
}

/// Score / lives line at the top of the screen
pub fn draw_hud(canvas: &mut dyn Canvas, score: u64, extra: Option<&str>) {
    let width = canvas.size().width;
    canvas.fill_text(
        &score.to_string(),
        Vec2::new(12.0, 28.0),
        22.0,
        TextAlign::Left,
        palette::TEXT,
    );
    if let Some(extra) = extra {
        canvas.fill_text(
            extra,
            Vec2::new(width - 12.0, 28.0),
            18.0,
            TextAlign::Right,
            palette::MUTED,
        );
    }
}

/// Centered "tap to start" style prompt over a dimmed background
pub fn draw_prompt(canvas: &mut dyn Canvas, title: &str, subtitle: &str) {
    let size = canvas.size();
    let center = Vec2::new(size.width / 2.0, size.height / 2.0);
    canvas.fill_rect(
        Vec2::ZERO,
        Vec2::new(size.width, size.height),
        palette::BACKGROUND.with_alpha(0.55),
    );
    canvas.fill_text(title, center, 34.0, TextAlign::Center, palette::TEXT);
    canvas.fill_text(
        subtitle,
        center + Vec2::new(0.0, 36.0),
        18.0,
        TextAlign::Center,
        palette::PINK,
    );
}
