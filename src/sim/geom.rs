//! Axis-aligned bounding boxes

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left origin, +y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            pos: center - size / 2.0,
            size,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Strict overlap test (touching edges do not collide)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Penetration depth along each axis, if overlapping
    pub fn overlap(&self, other: &Rect) -> Option<Vec2> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.right().min(other.right()) - self.left().max(other.left());
        let y = self.bottom().min(other.bottom()) - self.top().max(other.top());
        Some(Vec2::new(x, y))
    }

    /// Horizontal overlap between two spans, for stacking checks
    pub fn horizontal_overlap(&self, other: &Rect) -> Option<(f32, f32)> {
        let left = self.left().max(other.left());
        let right = self.right().min(other.right());
        (right > left).then_some((left, right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.intersects(&Rect::new(0.0, 20.0, 5.0, 5.0)));
    }

    #[test]
    fn test_overlap_depth() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(8.0, 6.0, 10.0, 10.0);
        assert_eq!(a.overlap(&b), Some(Vec2::new(2.0, 4.0)));
    }

    #[test]
    fn test_horizontal_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 10.0);
        let b = Rect::new(60.0, 20.0, 100.0, 10.0);
        assert_eq!(a.horizontal_overlap(&b), Some((60.0, 100.0)));
        assert_eq!(a.horizontal_overlap(&Rect::new(100.0, 0.0, 5.0, 5.0)), None);
    }
}
