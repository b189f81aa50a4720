//! Jumper: bounce upward from platform to platform
//!
//! World coordinates share the screen's axes (+y down); the camera tracks the
//! highest point reached and never scrolls back down.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::Cue;
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::fx::palette;
use crate::input::{Gesture, SwipeDirection};
use crate::renderer::{self, Canvas};
use crate::sim::{sample_one, Effects, Game, Rect, Terminal, DEFAULT_ATTEMPTS};

pub mod consts {
    pub const PLAYER_SIZE: f32 = 26.0;
    pub const GRAVITY: f32 = 1500.0;
    /// Velocity after landing on a platform (px/s, negative is up)
    pub const BOUNCE_VELOCITY: f32 = -780.0;
    /// Horizontal speed while steering toward the pointer
    pub const STEER_SPEED: f32 = 420.0;
    /// Horizontal shift of the steering target per left/right swipe
    pub const SWIPE_NUDGE: f32 = 90.0;

    pub const PLATFORM_WIDTH: f32 = 72.0;
    pub const PLATFORM_HEIGHT: f32 = 12.0;
    /// Platform x positions snap to this many columns
    pub const PLATFORM_COLUMNS: usize = 8;
    /// Max columns between consecutive platforms
    pub const MAX_COLUMN_STEP: usize = 3;
    pub const BASE_SPACING: f32 = 70.0;
    /// Extra spacing per pixel climbed
    pub const SPACING_GROWTH: f32 = 0.004;
    pub const MAX_SPACING: f32 = 160.0;

    /// Camera keeps the player at or below this fraction of the screen
    pub const CAMERA_LINE: f32 = 0.4;
    /// Pixels climbed per point
    pub const PIXELS_PER_POINT: f32 = 10.0;
    pub const WIN_HEIGHT: u64 = 1500;
}

use consts::*;

/// Vertical gap between platforms at a given climbed height (px)
pub fn platform_spacing(climbed: f32) -> f32 {
    (BASE_SPACING + climbed.max(0.0) * SPACING_GROWTH).min(MAX_SPACING)
}

fn column_x(column: usize) -> f32 {
    column as f32 * (LOGICAL_WIDTH - PLATFORM_WIDTH) / (PLATFORM_COLUMNS - 1) as f32
}

#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    pub rect: Rect,
    pub column: usize,
}

#[derive(Debug, Clone)]
pub struct Jumper {
    /// Player center, world coordinates
    pub pos: Vec2,
    pub vel: Vec2,
    /// Where steering is heading
    pub target_x: f32,
    pub platforms: Vec<Platform>,
    /// World y at the top of the screen
    pub camera_top: f32,
    pub start_y: f32,
    /// Highest (smallest) y reached
    pub best_y: f32,
    rng: Pcg32,
}

impl Jumper {
    fn player_rect(&self) -> Rect {
        Rect::from_center(self.pos, Vec2::splat(PLAYER_SIZE))
    }

    /// Height climbed in pixels
    pub fn climbed(&self) -> f32 {
        self.start_y - self.best_y
    }

    fn highest_platform(&self) -> Option<&Platform> {
        self.platforms
            .iter()
            .min_by(|a, b| a.rect.top().total_cmp(&b.rect.top()))
    }

    /// Add platforms until they extend a screen above the camera
    fn fill_platforms(&mut self) {
        let limit = self.camera_top - LOGICAL_HEIGHT;
        while let Some(top) = self.highest_platform().cloned() {
            if top.rect.top() <= limit {
                break;
            }
            let climbed = self.start_y - top.rect.top();
            let y = top.rect.top() - platform_spacing(climbed);
            let prev = top.column;
            let column = sample_one(&mut self.rng, PLATFORM_COLUMNS, DEFAULT_ATTEMPTS, |c| {
                c != prev && c.abs_diff(prev) <= MAX_COLUMN_STEP
            })
            .unwrap_or(prev);
            self.platforms.push(Platform {
                rect: Rect::new(column_x(column), y, PLATFORM_WIDTH, PLATFORM_HEIGHT),
                column,
            });
        }
        let bottom = self.camera_top + LOGICAL_HEIGHT + PLATFORM_HEIGHT;
        self.platforms.retain(|p| p.rect.top() < bottom);
    }

    fn steer(&mut self, dt: f32) {
        let dx = self.target_x - self.pos.x;
        let step = STEER_SPEED * dt;
        self.vel.x = if dx.abs() <= step {
            if dt > 0.0 { dx / dt } else { 0.0 }
        } else {
            STEER_SPEED * dx.signum()
        };
        let half = PLAYER_SIZE / 2.0;
        self.pos.x = (self.pos.x + self.vel.x * dt).clamp(half, LOGICAL_WIDTH - half);
    }

    fn land(&mut self, prev_bottom: f32, fx: &mut Effects<'_>) {
        if self.vel.y <= 0.0 {
            return;
        }
        let player = self.player_rect();
        let landed = self.platforms.iter().find(|p| {
            let top = p.rect.top();
            prev_bottom <= top
                && player.bottom() >= top
                && player.horizontal_overlap(&p.rect).is_some()
        });
        if let Some(platform) = landed {
            self.pos.y = platform.rect.top() - PLAYER_SIZE / 2.0;
            self.vel.y = BOUNCE_VELOCITY;
            fx.play_at(Cue::Bounce, 0.5);
        }
    }
}

impl Game for Jumper {
    fn new(seed: u64) -> Self {
        let start_y = LOGICAL_HEIGHT - 120.0;
        let base_column = PLATFORM_COLUMNS / 2;
        let base = Platform {
            rect: Rect::new(
                column_x(base_column),
                start_y + PLAYER_SIZE / 2.0,
                PLATFORM_WIDTH,
                PLATFORM_HEIGHT,
            ),
            column: base_column,
        };
        let x = base.rect.center().x;
        let mut game = Self {
            pos: Vec2::new(x, start_y),
            vel: Vec2::ZERO,
            target_x: x,
            platforms: vec![base],
            camera_top: 0.0,
            start_y,
            best_y: start_y,
            rng: Pcg32::seed_from_u64(seed),
        };
        game.fill_platforms();
        game
    }

    fn name(&self) -> &'static str {
        "jumper"
    }

    fn title(&self) -> &'static str {
        "Jumper"
    }

    fn wants_drag(&self) -> bool {
        true
    }

    fn handle_gesture(&mut self, gesture: &Gesture, _fx: &mut Effects<'_>) {
        match *gesture {
            Gesture::DragStart { position } | Gesture::DragMove { position } => {
                self.target_x = position.x;
            }
            Gesture::Swipe { direction, .. } => match direction {
                SwipeDirection::Left => self.target_x = self.pos.x - SWIPE_NUDGE,
                SwipeDirection::Right => self.target_x = self.pos.x + SWIPE_NUDGE,
                SwipeDirection::Up | SwipeDirection::Down => {}
            },
            Gesture::Tap { .. } => {}
        }
        let half = PLAYER_SIZE / 2.0;
        self.target_x = self.target_x.clamp(half, LOGICAL_WIDTH - half);
    }

    fn update(&mut self, dt: f32, fx: &mut Effects<'_>) {
        self.steer(dt);

        let prev_bottom = self.player_rect().bottom();
        self.vel.y += GRAVITY * dt;
        self.pos.y += self.vel.y * dt;
        self.land(prev_bottom, fx);

        if self.pos.y < self.best_y {
            let before = self.score();
            self.best_y = self.pos.y;
            if self.score() / 100 > before / 100 {
                fx.play_at(Cue::Score, 0.4);
            }
        }

        let camera_line = self.camera_top + LOGICAL_HEIGHT * CAMERA_LINE;
        if self.pos.y < camera_line {
            self.camera_top = self.pos.y - LOGICAL_HEIGHT * CAMERA_LINE;
        }
        self.fill_platforms();
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        let offset = Vec2::new(0.0, -self.camera_top);
        for (i, platform) in self.platforms.iter().enumerate() {
            canvas.fill_rect(
                platform.rect.pos + offset,
                platform.rect.size,
                palette::row_color(i),
            );
        }
        let player = self.player_rect();
        canvas.fill_rect(player.pos + offset, player.size, palette::PINK);
        renderer::draw_hud(canvas, self.score(), None);
    }

    fn terminal(&self) -> Option<Terminal> {
        let screen_y = self.pos.y - self.camera_top;
        if screen_y - PLAYER_SIZE / 2.0 > LOGICAL_HEIGHT {
            Some(Terminal::loss(format!("You fell! Height: {}", self.score())))
        } else if self.score() >= WIN_HEIGHT {
            Some(Terminal::win(format!("Sky high! Height: {}", self.score())))
        } else {
            None
        }
    }

    fn score(&self) -> u64 {
        (self.climbed() / PIXELS_PER_POINT).max(0.0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::test_util::FxHarness;
    use crate::sim::Outcome;

    #[test]
    fn test_bounces_off_starting_platform() {
        let mut h = FxHarness::new();
        let mut game = Jumper::new(1);
        let mut bounced = false;
        for _ in 0..10 {
            game.update(0.016, &mut h.fx());
            if game.vel.y < 0.0 {
                bounced = true;
                break;
            }
        }
        assert!(bounced);
        assert!(game.terminal().is_none());
    }

    #[test]
    fn test_platforms_reachable() {
        let game = Jumper::new(5);
        let max_jump = BOUNCE_VELOCITY * BOUNCE_VELOCITY / (2.0 * GRAVITY);
        let mut tops: Vec<_> = game.platforms.iter().map(|p| p.rect.top()).collect();
        tops.sort_by(|a, b| a.total_cmp(b));
        assert!(tops.len() > 5);
        for pair in tops.windows(2) {
            assert!(pair[1] - pair[0] < max_jump);
        }
        // Extends at least a screen above the camera
        assert!(tops[0] <= game.camera_top - LOGICAL_HEIGHT);
    }

    #[test]
    fn test_consecutive_columns_within_step() {
        let mut game = Jumper::new(11);
        game.camera_top -= 5000.0;
        game.fill_platforms();
        let mut platforms = game.platforms.clone();
        platforms.sort_by(|a, b| b.rect.top().total_cmp(&a.rect.top()));
        for pair in platforms.windows(2) {
            assert_ne!(pair[0].column, pair[1].column);
            assert!(pair[0].column.abs_diff(pair[1].column) <= MAX_COLUMN_STEP);
        }
    }

    #[test]
    fn test_spacing_grows_with_height() {
        let mut last = platform_spacing(0.0);
        for step in 1..200 {
            let spacing = platform_spacing(step as f32 * 100.0);
            assert!(spacing >= last);
            last = spacing;
        }
        assert!(platform_spacing(10_000.0) > platform_spacing(0.0));
    }

    #[test]
    fn test_drag_and_swipe_steer() {
        let mut h = FxHarness::new();
        let mut game = Jumper::new(1);
        let x = game.pos.x;
        game.handle_gesture(&Gesture::DragMove { position: Vec2::new(x + 100.0, 0.0) }, &mut h.fx());
        game.update(0.05, &mut h.fx());
        assert!(game.pos.x > x);

        let x = game.pos.x;
        game.handle_gesture(
            &Gesture::Swipe {
                direction: SwipeDirection::Left,
                delta: Vec2::new(-60.0, 0.0),
                duration_ms: 120.0,
            },
            &mut h.fx(),
        );
        assert_eq!(game.target_x, x - SWIPE_NUDGE);
    }

    #[test]
    fn test_climbing_scrolls_and_scores() {
        let mut h = FxHarness::new();
        let mut game = Jumper::new(1);
        game.pos.y -= 400.0;
        game.vel.y = -10.0;
        game.update(0.001, &mut h.fx());
        assert!(game.score() >= 39);
        assert!(game.camera_top < 0.0);
        assert!(game.terminal().is_none());
    }

    #[test]
    fn test_falling_off_screen_loses() {
        let mut h = FxHarness::new();
        let mut game = Jumper::new(1);
        game.platforms.clear();
        for _ in 0..200 {
            game.update(0.016, &mut h.fx());
        }
        assert_eq!(game.terminal().map(|t| t.outcome), Some(Outcome::Loss));
    }

    #[test]
    fn test_win_height() {
        let mut game = Jumper::new(1);
        game.best_y = game.start_y - WIN_HEIGHT as f32 * PIXELS_PER_POINT;
        game.pos.y = game.best_y;
        game.camera_top = game.pos.y - 100.0;
        assert_eq!(game.terminal().map(|t| t.outcome), Some(Outcome::Win));
    }
}
