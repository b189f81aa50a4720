//! Flappy: tap to flap through gaps between pipes

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
    pub const BIRD_X: f32 = 110.0;
    pub const BIRD_RADIUS: f32 = 14.0;
    /// Downward acceleration (px/s²)
    pub const GRAVITY: f32 = 1400.0;
    /// Vertical velocity set by a flap (px/s, negative is up)
    pub const FLAP_VELOCITY: f32 = -420.0;
    pub const MAX_FALL_SPEED: f32 = 700.0;

    pub const PIPE_WIDTH: f32 = 60.0;
    pub const PIPE_GAP: f32 = 160.0;
    /// Min distance between a gap and the ceiling or ground
    pub const GAP_MARGIN: f32 = 60.0;
    /// Seconds between pipe spawns
    pub const PIPE_INTERVAL: f32 = 1.6;
    pub const PIPE_START_SPEED: f32 = 140.0;
    /// Pipe speed added per point
    pub const PIPE_SPEEDUP: f32 = 5.0;
    pub const PIPE_MAX_SPEED: f32 = 260.0;

    pub const GROUND_HEIGHT: f32 = 40.0;
    pub const WIN_SCORE: u64 = 50;
}

use consts::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub x: f32,
    /// Vertical center of the gap
    pub gap_y: f32,
    pub scored: bool,
}

impl Pipe {
    pub fn top_rect(&self) -> Rect {
        Rect::new(self.x, 0.0, PIPE_WIDTH, self.gap_y - PIPE_GAP / 2.0)
    }

    pub fn bottom_rect(&self) -> Rect {
        let top = self.gap_y + PIPE_GAP / 2.0;
        Rect::new(self.x, top, PIPE_WIDTH, ground_y() - top)
    }
}

fn ground_y() -> f32 {
    LOGICAL_HEIGHT - GROUND_HEIGHT
}

/// Pipe speed for a given score
pub fn pipe_speed(score: u64) -> f32 {
    (PIPE_START_SPEED + PIPE_SPEEDUP * score as f32).min(PIPE_MAX_SPEED)
}

#[derive(Debug, Clone)]
pub struct Flappy {
    pub bird_y: f32,
    pub bird_vel: f32,
    pub pipes: Vec<Pipe>,
    /// Seconds until the next pipe spawns
    pub spawn_timer: f32,
    pub score: u64,
    pub crashed: bool,
    rng: Pcg32,
}

impl Flappy {
    fn bird_rect(&self) -> Rect {
        // Slightly forgiving hitbox
        Rect::from_center(
            Vec2::new(BIRD_X, self.bird_y),
            Vec2::splat(BIRD_RADIUS * 1.6),
        )
    }

    pub fn flap(&mut self) {
        self.bird_vel = FLAP_VELOCITY;
    }

    fn spawn_pipe(&mut self) {
        let low = GAP_MARGIN + PIPE_GAP / 2.0;
        let high = ground_y() - GAP_MARGIN - PIPE_GAP / 2.0;
        let gap_y = self.rng.random_range(low..high);
        self.pipes.push(Pipe {
            x: LOGICAL_WIDTH,
            gap_y,
            scored: false,
        });
    }

    fn crash(&mut self, fx: &mut Effects<'_>) {
        if self.crashed {
            return;
        }
        self.crashed = true;
        fx.burst(Vec2::new(BIRD_X, self.bird_y), 20, Some(palette::GOLD));
        fx.play(Cue::Miss);
    }
}

impl Game for Flappy {
    fn new(seed: u64) -> Self {
        Self {
            bird_y: LOGICAL_HEIGHT / 2.0 - 40.0,
            bird_vel: 0.0,
            pipes: Vec::new(),
            spawn_timer: PIPE_INTERVAL / 2.0,
            score: 0,
            crashed: false,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    fn name(&self) -> &'static str {
        "flappy"
    }

    fn title(&self) -> &'static str {
        "Flappy"
    }

    fn start_hint(&self) -> &'static str {
        "Tap to flap"
    }

    fn handle_gesture(&mut self, gesture: &Gesture, fx: &mut Effects<'_>) {
        if let Gesture::Tap { .. } = gesture {
            self.flap();
            fx.play_at(Cue::Tap, 0.5);
        }
    }

    fn update(&mut self, dt: f32, fx: &mut Effects<'_>) {
        self.bird_vel = (self.bird_vel + GRAVITY * dt).min(MAX_FALL_SPEED);
        self.bird_y += self.bird_vel * dt;

        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn_pipe();
            self.spawn_timer += PIPE_INTERVAL;
        }

        let speed = pipe_speed(self.score);
        for pipe in self.pipes.iter_mut() {
            pipe.x -= speed * dt;
        }
        self.pipes.retain(|p| p.x + PIPE_WIDTH > 0.0);

        for pipe in self.pipes.iter_mut() {
            if !pipe.scored && pipe.x + PIPE_WIDTH < BIRD_X - BIRD_RADIUS {
                pipe.scored = true;
                self.score += 1;
                fx.play(Cue::Score);
            }
        }

        let bird = self.bird_rect();
        let hit_pipe = self
            .pipes
            .iter()
            .any(|p| bird.intersects(&p.top_rect()) || bird.intersects(&p.bottom_rect()));
        let hit_bounds = self.bird_y + BIRD_RADIUS >= ground_y() || self.bird_y - BIRD_RADIUS <= 0.0;
        if hit_pipe || hit_bounds {
            self.crash(fx);
        }
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        for pipe in &self.pipes {
            let top = pipe.top_rect();
            let bottom = pipe.bottom_rect();
            canvas.fill_rect(top.pos, top.size, palette::MINT);
            canvas.fill_rect(bottom.pos, bottom.size, palette::MINT);
        }
        canvas.fill_rect(
            Vec2::new(0.0, ground_y()),
            Vec2::new(LOGICAL_WIDTH, GROUND_HEIGHT),
            palette::SURFACE,
        );
        canvas.fill_circle(Vec2::new(BIRD_X, self.bird_y), BIRD_RADIUS, palette::GOLD);
        renderer::draw_hud(canvas, self.score, None);
    }

    fn terminal(&self) -> Option<Terminal> {
        if self.crashed {
            Some(Terminal::loss(format!("Crashed! Score: {}", self.score)))
        } else if self.score >= WIN_SCORE {
            Some(Terminal::win(format!("You made it! Score: {}", self.score)))
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

    fn tap() -> Gesture {
        Gesture::Tap {
            position: Vec2::new(200.0, 300.0),
        }
    }

    #[test]
    fn test_flap_and_gravity() {
        let mut h = FxHarness::new();
        let mut game = Flappy::new(1);
        let start = game.bird_y;
        game.handle_gesture(&tap(), &mut h.fx());
        game.update(0.05, &mut h.fx());
        assert!(game.bird_y < start);

        for _ in 0..20 {
            game.update(0.05, &mut h.fx());
        }
        assert!(game.bird_vel > 0.0);
    }

    #[test]
    fn test_falling_to_ground_loses() {
        let mut h = FxHarness::new();
        let mut game = Flappy::new(1);
        for _ in 0..200 {
            game.update(0.016, &mut h.fx());
            if game.terminal().is_some() {
                break;
            }
        }
        assert_eq!(game.terminal().map(|t| t.outcome), Some(Outcome::Loss));
    }

    #[test]
    fn test_passing_pipe_scores() {
        let mut h = FxHarness::new();
        let mut game = Flappy::new(1);
        game.spawn_timer = 100.0;
        game.pipes.push(Pipe {
            x: BIRD_X - BIRD_RADIUS - PIPE_WIDTH - 1.0,
            gap_y: game.bird_y,
            scored: false,
        });
        game.update(0.001, &mut h.fx());
        assert_eq!(game.score, 1);
        game.update(0.001, &mut h.fx());
        assert_eq!(game.score, 1);
        assert!(game.terminal().is_none());
    }

    #[test]
    fn test_pipe_collision() {
        let mut h = FxHarness::new();
        let mut game = Flappy::new(1);
        game.spawn_timer = 100.0;
        game.pipes.push(Pipe {
            x: BIRD_X - PIPE_WIDTH / 2.0,
            gap_y: game.bird_y + 200.0,
            scored: false,
        });
        game.update(0.001, &mut h.fx());
        assert!(game.crashed);
        assert!(!h.particles.is_empty());
    }

    #[test]
    fn test_pipes_spawn_inside_margins() {
        let mut h = FxHarness::new();
        let mut game = Flappy::new(7);
        for _ in 0..20 {
            game.bird_y = LOGICAL_HEIGHT / 2.0;
            game.bird_vel = 0.0;
            game.pipes.clear();
            game.spawn_timer = 0.0;
            game.update(0.001, &mut h.fx());
            let pipe = &game.pipes[0];
            assert!(pipe.top_rect().size.y >= GAP_MARGIN);
            assert!(pipe.bottom_rect().size.y >= GAP_MARGIN);
        }
    }

    #[test]
    fn test_speed_grows_with_score() {
        let mut last = pipe_speed(0);
        for score in 1..100 {
            let speed = pipe_speed(score);
            assert!(speed >= last);
            last = speed;
        }
        assert!(pipe_speed(1) > pipe_speed(0));
        assert_eq!(pipe_speed(1000), PIPE_MAX_SPEED);
    }

    #[test]
    fn test_win_score() {
        let mut game = Flappy::new(1);
        game.score = WIN_SCORE;
        assert_eq!(game.terminal().map(|t| t.outcome), Some(Outcome::Win));
    }
}
