//! Display-to-logical coordinate mapping
//!
//! The canvas backing store has a fixed logical size while CSS may stretch it
//! to any on-screen size. Each axis is scaled independently.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// On-screen bounding rectangle of the drawing surface (client pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A surface that has not been laid out yet cannot be mapped from
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || !self.left.is_finite()
            || !self.top.is_finite()
            || !self.width.is_finite()
            || !self.height.is_finite()
    }
}

/// Logical (unscaled) canvas dimensions used by game logic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicalSize {
    pub width: f32,
    pub height: f32,
}

impl LogicalSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Map a client-space point into logical canvas space.
///
/// Returns `None` for a degenerate surface or non-finite input.
pub fn map_to_logical(
    rect: &SurfaceRect,
    logical: LogicalSize,
    client_x: f32,
    client_y: f32,
) -> Option<Vec2> {
    if rect.is_degenerate() || !client_x.is_finite() || !client_y.is_finite() {
        return None;
    }
    let scale_x = logical.width / rect.width;
    let scale_y = logical.height / rect.height;
    Some(Vec2::new(
        (client_x - rect.left) * scale_x,
        (client_y - rect.top) * scale_y,
    ))
}

/// Stateful wrapper that falls back to the last good point
///
/// The rect is never cached: callers pass the current bounding rect with every
/// event because it changes on resize and orientation change.
#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    logical: LogicalSize,
    last_good: Vec2,
}

impl CoordinateMapper {
    pub fn new(logical: LogicalSize) -> Self {
        Self {
            logical,
            last_good: Vec2::ZERO,
        }
    }

    /// Map a point, returning the last known good point on failure
    pub fn to_logical(&mut self, rect: &SurfaceRect, client_x: f32, client_y: f32) -> Vec2 {
        match map_to_logical(rect, self.logical, client_x, client_y) {
            Some(p) => {
                self.last_good = p;
                p
            }
            None => {
                log::debug!("Degenerate surface mapping, reusing last point");
                self.last_good
            }
        }
    }
}
