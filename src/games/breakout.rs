//! Breakout: paddle, ball, brick wall
//!
//! The paddle follows the drag stream; tapping launches the ball. Each brick
//! hit speeds the ball up a little.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::audio::Cue;
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::fx::palette;
use crate::input::Gesture;
use crate::renderer::{self, Canvas};
use crate::sim::{Effects, Game, Rect, Terminal};

/// Tuning constants
pub mod consts {
    pub const PADDLE_WIDTH: f32 = 80.0;
    pub const PADDLE_HEIGHT: f32 = 12.0;
    /// Paddle top edge distance from the bottom
    pub const PADDLE_OFFSET: f32 = 48.0;

    pub const BALL_RADIUS: f32 = 7.0;
    /// Ball speed at launch (px/s)
    pub const BALL_START_SPEED: f32 = 300.0;
    /// Speed added per brick destroyed
    pub const BALL_SPEEDUP: f32 = 6.0;
    pub const BALL_MAX_SPEED: f32 = 560.0;
    /// Max bounce angle off the paddle edge (radians from vertical)
    pub const MAX_BOUNCE_ANGLE: f32 = 1.05;

    pub const BRICK_ROWS: usize = 6;
    pub const BRICK_COLS: usize = 8;
    pub const BRICK_HEIGHT: f32 = 18.0;
    pub const BRICK_GAP: f32 = 4.0;
    pub const BRICK_MARGIN: f32 = 16.0;
    pub const BRICK_TOP: f32 = 80.0;
    pub const BRICK_POINTS: u64 = 10;

    pub const START_LIVES: u8 = 3;
}

use consts::*;

/// Collision substeps needed to move the ball `distance` px
fn substeps(distance: f32) -> u32 {
    if !distance.is_finite() || distance <= BALL_RADIUS {
        return 1;
    }
    (distance / BALL_RADIUS).ceil() as u32
}

/// A brick in the wall
#[derive(Debug, Clone, PartialEq)]
pub struct Brick {
    pub rect: Rect,
    pub row: usize,
}

/// Breakout game state
#[derive(Debug, Clone)]
pub struct Breakout {
    pub paddle_x: f32,
    pub ball_pos: Vec2,
    pub ball_vel: Vec2,
    /// Ball rides on the paddle until launched
    pub attached: bool,
    pub speed: f32,
    pub bricks: Vec<Brick>,
    pub score: u64,
    pub lives: u8,
    rng: Pcg32,
}

impl Breakout {
    fn paddle_rect(&self) -> Rect {
        Rect::new(
            self.paddle_x - PADDLE_WIDTH / 2.0,
            LOGICAL_HEIGHT - PADDLE_OFFSET,
            PADDLE_WIDTH,
            PADDLE_HEIGHT,
        )
    }

    fn ball_rect(&self) -> Rect {
        Rect::from_center(self.ball_pos, Vec2::splat(BALL_RADIUS * 2.0))
    }

    fn build_wall() -> Vec<Brick> {
        let width = (LOGICAL_WIDTH - 2.0 * BRICK_MARGIN - (BRICK_COLS - 1) as f32 * BRICK_GAP)
            / BRICK_COLS as f32;
        let mut bricks = Vec::with_capacity(BRICK_ROWS * BRICK_COLS);
        for row in 0..BRICK_ROWS {
            for col in 0..BRICK_COLS {
                bricks.push(Brick {
                    rect: Rect::new(
                        BRICK_MARGIN + col as f32 * (width + BRICK_GAP),
                        BRICK_TOP + row as f32 * (BRICK_HEIGHT + BRICK_GAP),
                        width,
                        BRICK_HEIGHT,
                    ),
                    row,
                });
            }
        }
        bricks
    }

    fn attach_ball(&mut self) {
        self.attached = true;
        self.ball_vel = Vec2::ZERO;
        self.ball_pos = Vec2::new(
            self.paddle_x,
            LOGICAL_HEIGHT - PADDLE_OFFSET - BALL_RADIUS - 1.0,
        );
    }

    /// Release the ball upward with a slight random tilt
    pub fn launch(&mut self) {
        if !self.attached {
            return;
        }
        let tilt = self.rng.random_range(-0.35..0.35f32);
        self.ball_vel = Vec2::new(tilt.sin(), -tilt.cos()) * self.speed;
        self.attached = false;
    }

    fn move_paddle(&mut self, x: f32) {
        let half = PADDLE_WIDTH / 2.0;
        self.paddle_x = x.clamp(half, LOGICAL_WIDTH - half);
        if self.attached {
            self.ball_pos.x = self.paddle_x;
        }
    }

    fn bounce_walls(&mut self, fx: &mut Effects<'_>) {
        let r = BALL_RADIUS;
        if self.ball_pos.x < r && self.ball_vel.x < 0.0 {
            self.ball_pos.x = r;
            self.ball_vel.x = -self.ball_vel.x;
            fx.play_at(Cue::Bounce, 0.4);
        } else if self.ball_pos.x > LOGICAL_WIDTH - r && self.ball_vel.x > 0.0 {
            self.ball_pos.x = LOGICAL_WIDTH - r;
            self.ball_vel.x = -self.ball_vel.x;
            fx.play_at(Cue::Bounce, 0.4);
        }
        if self.ball_pos.y < r && self.ball_vel.y < 0.0 {
            self.ball_pos.y = r;
            self.ball_vel.y = -self.ball_vel.y;
            fx.play_at(Cue::Bounce, 0.4);
        }
    }

    fn bounce_paddle(&mut self, fx: &mut Effects<'_>) {
        let paddle = self.paddle_rect();
        if self.ball_vel.y <= 0.0 || !self.ball_rect().intersects(&paddle) {
            return;
        }
        // Angle depends on where the ball meets the paddle
        let offset = ((self.ball_pos.x - self.paddle_x) / (PADDLE_WIDTH / 2.0)).clamp(-1.0, 1.0);
        let angle = offset * MAX_BOUNCE_ANGLE;
        self.ball_vel = Vec2::new(angle.sin(), -angle.cos()) * self.speed;
        self.ball_pos.y = paddle.top() - BALL_RADIUS;
        fx.play(Cue::Bounce);
    }

    fn hit_bricks(&mut self, fx: &mut Effects<'_>) {
        let ball = self.ball_rect();
        let Some(index) = self.bricks.iter().position(|b| b.rect.intersects(&ball)) else {
            return;
        };
        let brick = self.bricks.remove(index);
        if let Some(depth) = brick.rect.overlap(&ball) {
            if depth.x < depth.y {
                self.ball_vel.x = -self.ball_vel.x;
            } else {
                self.ball_vel.y = -self.ball_vel.y;
            }
        }

        self.score += BRICK_POINTS;
        self.speed = (self.speed + BALL_SPEEDUP).min(BALL_MAX_SPEED);
        self.ball_vel = self.ball_vel.normalize_or_zero() * self.speed;

        fx.burst(brick.rect.center(), 12, Some(palette::row_color(brick.row)));
        fx.play(Cue::Hit);
    }
}

impl Game for Breakout {
    fn new(seed: u64) -> Self {
        let mut game = Self {
            paddle_x: LOGICAL_WIDTH / 2.0,
            ball_pos: Vec2::ZERO,
            ball_vel: Vec2::ZERO,
            attached: true,
            speed: BALL_START_SPEED,
            bricks: Self::build_wall(),
            score: 0,
            lives: START_LIVES,
            rng: Pcg32::seed_from_u64(seed),
        };
        game.attach_ball();
        game
    }

    fn name(&self) -> &'static str {
        "breakout"
    }

    fn title(&self) -> &'static str {
        "Breakout"
    }

    fn wants_drag(&self) -> bool {
        true
    }

    fn handle_gesture(&mut self, gesture: &Gesture, fx: &mut Effects<'_>) {
        match *gesture {
            Gesture::DragStart { position } | Gesture::DragMove { position } => {
                self.move_paddle(position.x);
            }
            Gesture::Tap { position } => {
                self.move_paddle(position.x);
                if self.attached {
                    self.launch();
                    fx.play(Cue::Tap);
                }
            }
            Gesture::Swipe { .. } => {}
        }
    }

    fn update(&mut self, dt: f32, fx: &mut Effects<'_>) {
        if self.attached {
            return;
        }
        // Never move the ball further than its radius between collision checks
        let steps = substeps(self.ball_vel.length() * dt);
        let step_dt = dt / steps as f32;
        for _ in 0..steps {
            self.ball_pos += self.ball_vel * step_dt;
            self.bounce_walls(fx);
            self.bounce_paddle(fx);
            self.hit_bricks(fx);
            if self.ball_pos.y - BALL_RADIUS > LOGICAL_HEIGHT {
                break;
            }
        }

        if self.ball_pos.y - BALL_RADIUS > LOGICAL_HEIGHT {
            self.lives = self.lives.saturating_sub(1);
            fx.play(Cue::Miss);
            log::debug!("Breakout ball lost, {} lives left", self.lives);
            if self.lives > 0 {
                self.attach_ball();
            }
        }
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        for brick in &self.bricks {
            canvas.fill_rect(brick.rect.pos, brick.rect.size, palette::row_color(brick.row));
        }
        let paddle = self.paddle_rect();
        canvas.fill_rect(paddle.pos, paddle.size, palette::TEXT);
        canvas.fill_circle(self.ball_pos, BALL_RADIUS, palette::GOLD);
        let lives = "♥".repeat(self.lives as usize);
        renderer::draw_hud(canvas, self.score, Some(&lives));
    }

    fn terminal(&self) -> Option<Terminal> {
        if self.lives == 0 {
            Some(Terminal::loss(format!("Game over! Score: {}", self.score)))
        } else if self.bricks.is_empty() {
            Some(Terminal::win(format!("Wall cleared! Score: {}", self.score)))
        } else {
            None
        }
    }

    fn score(&self) -> u64 {
        self.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::test_util::FxHarness;
    use crate::sim::Outcome;

    #[test]
    fn test_initial_state() {
        let game = Breakout::new(1);
        assert_eq!(game.bricks.len(), BRICK_ROWS * BRICK_COLS);
        assert!(game.attached);
        assert_eq!(game.lives, START_LIVES);
        assert!(game.terminal().is_none());
        // Wall fits inside the canvas
        let last = game.bricks.last().unwrap();
        assert!(last.rect.right() <= LOGICAL_WIDTH - BRICK_MARGIN + 0.01);
    }

    #[test]
    fn test_drag_moves_paddle_and_clamps() {
        let mut h = FxHarness::new();
        let mut game = Breakout::new(1);
        game.handle_gesture(&Gesture::DragMove { position: Vec2::new(100.0, 500.0) }, &mut h.fx());
        assert_eq!(game.paddle_x, 100.0);
        assert_eq!(game.ball_pos.x, 100.0);
        game.handle_gesture(&Gesture::DragMove { position: Vec2::new(-50.0, 500.0) }, &mut h.fx());
        assert_eq!(game.paddle_x, PADDLE_WIDTH / 2.0);
    }

    #[test]
    fn test_tap_launches_upward() {
        let mut h = FxHarness::new();
        let mut game = Breakout::new(1);
        game.handle_gesture(&Gesture::Tap { position: Vec2::new(200.0, 500.0) }, &mut h.fx());
        assert!(!game.attached);
        assert!(game.ball_vel.y < 0.0);
        assert!((game.ball_vel.length() - BALL_START_SPEED).abs() < 0.01);
    }

    #[test]
    fn test_brick_hit_scores_and_speeds_up() {
        let mut h = FxHarness::new();
        let mut game = Breakout::new(1);
        game.attached = false;
        let target = game.bricks[BRICK_COLS * (BRICK_ROWS - 1) + 2].rect;
        game.ball_pos = Vec2::new(target.center().x, target.bottom() + BALL_RADIUS + 1.0);
        game.ball_vel = Vec2::new(0.0, -300.0);

        let before = game.speed;
        game.update(0.02, &mut h.fx());

        assert_eq!(game.bricks.len(), BRICK_ROWS * BRICK_COLS - 1);
        assert_eq!(game.score, BRICK_POINTS);
        assert!(game.ball_vel.y > 0.0);
        assert!(game.speed > before);
        assert!(!h.particles.is_empty());
    }

    #[test]
    fn test_speed_is_monotonic_and_capped() {
        let mut h = FxHarness::new();
        let mut game = Breakout::new(3);
        game.attached = false;
        let mut last = game.speed;
        for _ in 0..BRICK_ROWS * BRICK_COLS {
            let target = game.bricks[0].rect;
            game.ball_pos = Vec2::new(target.center().x, target.bottom() + BALL_RADIUS - 1.0);
            game.ball_vel = Vec2::new(0.0, -1.0);
            game.update(0.0, &mut h.fx());
            assert!(game.speed >= last);
            last = game.speed;
        }
        assert!(game.speed <= BALL_MAX_SPEED);
        assert_eq!(game.terminal().map(|t| t.outcome), Some(Outcome::Win));
    }

    #[test]
    fn test_paddle_bounce() {
        let mut h = FxHarness::new();
        let mut game = Breakout::new(1);
        game.attached = false;
        let paddle = game.paddle_rect();
        game.ball_pos = Vec2::new(game.paddle_x + 20.0, paddle.top() - BALL_RADIUS + 2.0);
        game.ball_vel = Vec2::new(0.0, 200.0);
        game.update(0.001, &mut h.fx());
        assert!(game.ball_vel.y < 0.0);
        // Right of center sends the ball right
        assert!(game.ball_vel.x > 0.0);
    }

    #[test]
    fn test_fast_ball_cannot_tunnel_through_paddle() {
        let mut h = FxHarness::new();
        let mut game = Breakout::new(1);
        game.attached = false;
        game.speed = BALL_MAX_SPEED;
        let paddle = game.paddle_rect();
        // One clamped frame at max speed covers more than the paddle band
        game.ball_pos = Vec2::new(game.paddle_x, paddle.top() - BALL_RADIUS - 20.0);
        game.ball_vel = Vec2::new(0.0, BALL_MAX_SPEED);
        game.update(crate::consts::MAX_FRAME_DT, &mut h.fx());

        assert!(game.ball_vel.y < 0.0);
        assert!(game.ball_pos.y < paddle.top());
        assert_eq!(game.lives, START_LIVES);
    }

    #[test]
    fn test_substeps_bound_travel() {
        assert_eq!(substeps(0.0), 1);
        assert_eq!(substeps(BALL_RADIUS), 1);
        assert_eq!(substeps(f32::NAN), 1);
        let distance = BALL_MAX_SPEED * crate::consts::MAX_FRAME_DT;
        assert!(distance / substeps(distance) as f32 <= BALL_RADIUS);
    }

    #[test]
    fn test_losing_all_lives() {
        let mut h = FxHarness::new();
        let mut game = Breakout::new(1);
        for expected in (0..START_LIVES).rev() {
            game.attached = false;
            game.ball_pos = Vec2::new(200.0, LOGICAL_HEIGHT + 50.0);
            game.ball_vel = Vec2::new(0.0, 100.0);
            game.update(0.016, &mut h.fx());
            assert_eq!(game.lives, expected);
        }
        let terminal = game.terminal().unwrap();
        assert_eq!(terminal.outcome, Outcome::Loss);
        assert!(terminal.message.contains("Score"));
    }
}
