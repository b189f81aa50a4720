//! Snake on a 20x20 grid, steered by swipes

use std::collections::VecDeque;

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::Cue;
use crate::fx::palette;
use crate::input::{Gesture, LogicalSize, SwipeDirection};
use crate::renderer::{self, Canvas};
use crate::sim::{sample_one, Effects, Game, Terminal, DEFAULT_ATTEMPTS};

pub mod consts {
    pub const GRID: i32 = 20;
    pub const CELL: f32 = 20.0;
    pub const START_LENGTH: usize = 3;
    /// Seconds per step at score 0
    pub const BASE_STEP: f32 = 0.16;
    /// Step time removed per food eaten
    pub const STEP_SPEEDUP: f32 = 0.004;
    pub const MIN_STEP: f32 = 0.06;
    pub const WIN_LENGTH: usize = 60;
}

use consts::*;

const CELLS: usize = (GRID * GRID) as usize;

/// Seconds between steps at `score`
pub fn step_interval(score: u64) -> f32 {
    (BASE_STEP - STEP_SPEEDUP * score as f32).max(MIN_STEP)
}

fn offset(direction: SwipeDirection) -> IVec2 {
    match direction {
        SwipeDirection::Up => IVec2::NEG_Y,
        SwipeDirection::Down => IVec2::Y,
        SwipeDirection::Left => IVec2::NEG_X,
        SwipeDirection::Right => IVec2::X,
    }
}

fn in_bounds(cell: IVec2) -> bool {
    cell.x >= 0 && cell.y >= 0 && cell.x < GRID && cell.y < GRID
}

fn cell_at(index: usize) -> IVec2 {
    IVec2::new(index as i32 % GRID, index as i32 / GRID)
}

#[derive(Debug, Clone)]
pub struct Snake {
    /// Head first
    pub body: VecDeque<IVec2>,
    /// Direction of the last step
    pub direction: SwipeDirection,
    /// Direction for the next step
    pub heading: SwipeDirection,
    pub food: Option<IVec2>,
    /// Time accumulated toward the next step
    pub step_timer: f32,
    pub score: u64,
    pub dead: bool,
    rng: Pcg32,
}

impl Snake {
    pub fn head(&self) -> IVec2 {
        self.body[0]
    }

    /// Put food on a free cell; `None` when the board is full
    pub fn place_food(&mut self) {
        let body = &self.body;
        self.food = sample_one(&mut self.rng, CELLS, DEFAULT_ATTEMPTS, |i| {
            !body.contains(&cell_at(i))
        })
        .map(cell_at);
    }

    fn turn(&mut self, direction: SwipeDirection) {
        if direction == self.direction.opposite() {
            log::debug!("Ignoring reversal to {:?}", direction);
            return;
        }
        self.heading = direction;
    }

    /// Move one cell in the current heading
    pub fn step(&mut self, fx: &mut Effects<'_>) {
        self.direction = self.heading;
        let next = self.head() + offset(self.direction);
        let grows = self.food == Some(next);

        // The tail moves out of the way unless we grow this step
        let body_len = if grows {
            self.body.len()
        } else {
            self.body.len() - 1
        };
        if !in_bounds(next) || self.body.iter().take(body_len).any(|&c| c == next) {
            self.dead = true;
            fx.burst(cell_center(self.head()), 24, Some(palette::DANGER));
            fx.play(Cue::Miss);
            return;
        }

        self.body.push_front(next);
        if grows {
            self.score += 1;
            fx.burst(cell_center(next), 12, Some(palette::GOLD));
            fx.play(Cue::Hit);
            self.place_food();
        } else {
            self.body.pop_back();
        }
    }
}

fn cell_center(cell: IVec2) -> Vec2 {
    (cell.as_vec2() + Vec2::splat(0.5)) * CELL
}

impl Game for Snake {
    fn new(seed: u64) -> Self {
        let head = IVec2::new(GRID / 2, GRID / 2);
        let body = (0..START_LENGTH as i32)
            .map(|i| head - IVec2::new(i, 0))
            .collect();
        let mut game = Self {
            body,
            direction: SwipeDirection::Right,
            heading: SwipeDirection::Right,
            food: None,
            step_timer: 0.0,
            score: 0,
            dead: false,
            rng: Pcg32::seed_from_u64(seed),
        };
        game.place_food();
        game
    }

    fn name(&self) -> &'static str {
        "snake"
    }

    fn title(&self) -> &'static str {
        "Snake"
    }

    fn logical_size(&self) -> LogicalSize {
        LogicalSize::new(GRID as f32 * CELL, GRID as f32 * CELL)
    }

    fn start_hint(&self) -> &'static str {
        "Swipe to start"
    }

    fn is_start_gesture(&self, gesture: &Gesture) -> bool {
        matches!(gesture, Gesture::Swipe { .. })
    }

    fn handle_gesture(&mut self, gesture: &Gesture, _fx: &mut Effects<'_>) {
        if let Gesture::Swipe { direction, .. } = gesture {
            self.turn(*direction);
        }
    }

    fn update(&mut self, dt: f32, fx: &mut Effects<'_>) {
        self.step_timer += dt;
        let interval = step_interval(self.score);
        // At most one step per frame keeps turns from being skipped
        if self.step_timer >= interval {
            self.step_timer = (self.step_timer - interval).min(interval);
            self.step(fx);
        }
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        let cell = Vec2::splat(CELL - 2.0);
        if let Some(food) = self.food {
            canvas.fill_circle(cell_center(food), CELL * 0.4, palette::GOLD);
        }
        for (i, part) in self.body.iter().enumerate() {
            let color = if i == 0 {
                palette::PINK
            } else {
                palette::MINT.lerp(palette::SKY, i as f32 / self.body.len() as f32)
            };
            canvas.fill_rect(part.as_vec2() * CELL + Vec2::ONE, cell, color);
        }
        let length = format!("len {}", self.body.len());
        renderer::draw_hud(canvas, self.score, Some(&length));
    }

    fn terminal(&self) -> Option<Terminal> {
        if self.dead {
            Some(Terminal::loss(format!("Crashed! Score: {}", self.score)))
        } else if self.body.len() >= WIN_LENGTH || self.food.is_none() {
            Some(Terminal::win(format!("Well fed! Score: {}", self.score)))
        } else {
            None
        }
    }

    fn score(&self) -> u64 {
        self.score
    }
}
