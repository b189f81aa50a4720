//! Stacker: drop sliding layers onto the tower
//!
//! Whatever hangs over the layer below is cut off, so the tower narrows with
//! every sloppy drop. Missing the tower entirely ends the run.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::audio::Cue;
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::fx::palette;
use crate::input::Gesture;
use crate::renderer::{self, Canvas};
use crate::sim::{Effects, Game, Rect, Terminal};

pub mod consts {
    pub const LAYER_HEIGHT: f32 = 24.0;
    pub const BASE_WIDTH: f32 = 200.0;
    /// Base layer bottom distance from the screen bottom
    pub const BASE_OFFSET: f32 = 40.0;

    /// Horizontal speed of the first sliding layer (px/s)
    pub const BASE_SLIDE_SPEED: f32 = 130.0;
    /// Speed added per placed layer
    pub const SLIDE_SPEEDUP: f32 = 12.0;
    pub const MAX_SLIDE_SPEED: f32 = 440.0;

    /// Overhang below this snaps to a perfect drop
    pub const PERFECT_TOLERANCE: f32 = 3.0;
    /// The sliding layer stays at or below this screen y
    pub const SCROLL_LINE: f32 = 220.0;
    pub const WIN_LAYERS: u64 = 30;
}

use consts::*;

/// Slide speed for the layer placed after `layers` successful drops
pub fn slide_speed(layers: u64) -> f32 {
    (BASE_SLIDE_SPEED + SLIDE_SPEEDUP * layers as f32).min(MAX_SLIDE_SPEED)
}

#[derive(Debug, Clone)]
pub struct Stacker {
    /// Placed layers, bottom first
    pub stack: Vec<Rect>,
    /// Layer currently sliding
    pub current: Rect,
    /// +1 moving right, -1 moving left
    pub dir: f32,
    pub score: u64,
    pub perfect_streak: u32,
    pub missed: bool,
    /// The layer only slides once the run's first tap is consumed
    pub launched: bool,
    rng: Pcg32,
}

impl Stacker {
    fn top(&self) -> Option<&Rect> {
        self.stack.last()
    }

    fn spawn_layer(&mut self, width: f32) {
        let y = self
            .top()
            .map_or(LOGICAL_HEIGHT - BASE_OFFSET, |top| top.top())
            - LAYER_HEIGHT;
        let from_left = self.rng.random_bool(0.5);
        let x = if from_left { 0.0 } else { LOGICAL_WIDTH - width };
        self.dir = if from_left { 1.0 } else { -1.0 };
        self.current = Rect::new(x, y, width, LAYER_HEIGHT);
    }

    /// Drop the sliding layer onto the stack
    pub fn drop_layer(&mut self, fx: &mut Effects<'_>) {
        let Some(&below) = self.top() else {
            return;
        };
        let Some((left, right)) = self.current.horizontal_overlap(&below) else {
            self.missed = true;
            fx.burst(self.current.center(), 20, Some(palette::DANGER));
            fx.play(Cue::Miss);
            return;
        };

        let overhang = self.current.size.x - (right - left);
        let placed = if overhang < PERFECT_TOLERANCE {
            self.perfect_streak += 1;
            fx.play(Cue::Score);
            Rect::new(below.left(), self.current.top(), below.size.x, LAYER_HEIGHT)
        } else {
            self.perfect_streak = 0;
            let cut_left = self.current.left() < left;
            let cut_x = if cut_left { self.current.left() + overhang / 2.0 } else { right + overhang / 2.0 };
            fx.burst(
                Vec2::new(cut_x, self.current.center().y),
                (overhang / 4.0).clamp(4.0, 24.0) as usize,
                Some(self.color(self.stack.len())),
            );
            fx.play(Cue::Tap);
            Rect::new(left, self.current.top(), right - left, LAYER_HEIGHT)
        };

        self.stack.push(placed);
        self.score += 1;
        self.spawn_layer(placed.size.x);
    }

    fn color(&self, layer: usize) -> palette::Color {
        palette::row_color(layer)
    }

    /// Screen offset that keeps the sliding layer below `SCROLL_LINE`
    pub fn scroll(&self) -> f32 {
        (SCROLL_LINE - self.current.top()).max(0.0)
    }
}

impl Game for Stacker {
    fn new(seed: u64) -> Self {
        let base = Rect::new(
            (LOGICAL_WIDTH - BASE_WIDTH) / 2.0,
            LOGICAL_HEIGHT - BASE_OFFSET - LAYER_HEIGHT,
            BASE_WIDTH,
            LAYER_HEIGHT,
        );
        let mut game = Self {
            stack: vec![base],
            current: base,
            dir: 1.0,
            score: 0,
            perfect_streak: 0,
            missed: false,
            launched: false,
            rng: Pcg32::seed_from_u64(seed),
        };
        game.spawn_layer(BASE_WIDTH);
        game
    }

    fn name(&self) -> &'static str {
        "stacker"
    }

    fn title(&self) -> &'static str {
        "Stacker"
    }

    fn start_hint(&self) -> &'static str {
        "Tap to start, tap again to drop"
    }

    fn handle_gesture(&mut self, gesture: &Gesture, fx: &mut Effects<'_>) {
        if let Gesture::Tap { .. } = gesture {
            if !self.launched {
                self.launched = true;
                return;
            }
            self.drop_layer(fx);
        }
    }

    fn update(&mut self, dt: f32, _fx: &mut Effects<'_>) {
        if !self.launched {
            return;
        }
        let speed = slide_speed(self.score);
        let max_x = LOGICAL_WIDTH - self.current.size.x;
        let mut x = self.current.pos.x + self.dir * speed * dt;
        if x <= 0.0 {
            x = -x;
            self.dir = 1.0;
        } else if x >= max_x {
            x = 2.0 * max_x - x;
            self.dir = -1.0;
        }
        self.current.pos.x = x.clamp(0.0, max_x.max(0.0));
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        let offset = Vec2::new(0.0, self.scroll());
        for (i, layer) in self.stack.iter().enumerate() {
            canvas.fill_rect(layer.pos + offset, layer.size, self.color(i));
        }
        if !self.missed {
            canvas.fill_rect(
                self.current.pos + offset,
                self.current.size,
                self.color(self.stack.len()),
            );
        }
        let streak = (self.perfect_streak >= 2).then(|| format!("perfect x{}", self.perfect_streak));
        renderer::draw_hud(canvas, self.score, streak.as_deref());
    }

    fn terminal(&self) -> Option<Terminal> {
        if self.missed {
            Some(Terminal::loss(format!("Toppled! Layers: {}", self.score)))
        } else if self.score >= WIN_LAYERS {
            Some(Terminal::win(format!("Tower complete! Layers: {}", self.score)))
        } else {
            None
        }
    }

    fn score(&self) -> u64 {
        self.score
    }
}
