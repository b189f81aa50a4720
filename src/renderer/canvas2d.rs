//! `CanvasRenderingContext2d` backend (wasm only)

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Canvas, TextAlign};
use crate::fx::palette::Color;
use crate::input::LogicalSize;

/// Canvas backed by a browser 2D context sized to the logical resolution
pub struct Canvas2d {
    ctx: CanvasRenderingContext2d,
    size: LogicalSize,
}

impl Canvas2d {
    /// Grab the 2D context and set the backing store to the logical size.
    ///
    /// CSS decides the on-screen size; input is mapped back through
    /// `input::map_to_logical`.
    pub fn new(canvas: &HtmlCanvasElement, size: LogicalSize) -> Option<Self> {
        canvas.set_width(size.width as u32);
        canvas.set_height(size.height as u32);
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { ctx, size })
    }

    fn set_fill(&self, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
    }
}

impl Canvas for Canvas2d {
    fn size(&self) -> LogicalSize {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.set_fill(color);
        self.ctx
            .fill_rect(0.0, 0.0, self.size.width as f64, self.size.height as f64);
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color) {
        self.set_fill(color);
        self.ctx
            .fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.set_fill(color);
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius.max(0.0) as f64,
            0.0,
            std::f64::consts::TAU,
        );
        self.ctx.fill();
    }

    fn fill_rotated_rect(&mut self, center: Vec2, size: Vec2, rotation: f32, color: Color) {
        self.set_fill(color);
        self.ctx.save();
        let _ = self.ctx.translate(center.x as f64, center.y as f64);
        let _ = self.ctx.rotate(rotation as f64);
        self.ctx.fill_rect(
            -size.x as f64 / 2.0,
            -size.y as f64 / 2.0,
            size.x as f64,
            size.y as f64,
        );
        self.ctx.restore();
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, px: f32, align: TextAlign, color: Color) {
        self.set_fill(color);
        self.ctx
            .set_font(&format!("bold {}px system-ui, sans-serif", px.round()));
        self.ctx.set_text_align(match align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        });
        let _ = self.ctx.fill_text(text, pos.x as f64, pos.y as f64);
    }
}
