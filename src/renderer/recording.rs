//! Draw-call recorder used by tests and the native demo

use glam::Vec2;

use super::{Canvas, TextAlign};
use crate::fx::palette::Color;
use crate::input::LogicalSize;

/// A captured draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Rect { pos: Vec2, size: Vec2, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
    RotatedRect { center: Vec2, size: Vec2, rotation: f32, color: Color },
    Text { text: String, pos: Vec2, px: f32, align: TextAlign },
}

/// Canvas that records every call
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    size: LogicalSize,
    pub commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(size: LogicalSize) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.commands.clear();
    }

    pub fn count_circles(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }

    /// True if any recorded text contains `needle`
    pub fn has_text(&self, needle: &str) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Text { text, .. } if text.contains(needle)))
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> LogicalSize {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color) {
        self.commands.push(DrawCommand::Rect { pos, size, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn fill_rotated_rect(&mut self, center: Vec2, size: Vec2, rotation: f32, color: Color) {
        self.commands.push(DrawCommand::RotatedRect {
            center,
            size,
            rotation,
            color,
        });
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, px: f32, align: TextAlign, _color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            px,
            align,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::ParticlePool;
    use crate::renderer::draw_particles;

    #[test]
    fn test_particles_draw_one_circle_each() {
        let mut pool = ParticlePool::new(9);
        pool.emit(50.0, 50.0, 12, None);
        let mut canvas = RecordingCanvas::new(LogicalSize::new(100.0, 100.0));
        draw_particles(&mut canvas, &pool);
        assert_eq!(canvas.count_circles(), 12);
    }
}
