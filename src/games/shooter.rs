//! Shooter: drag the ship, it fires on its own

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
    pub const SHIP_WIDTH: f32 = 36.0;
    pub const SHIP_HEIGHT: f32 = 24.0;
    /// Ship center distance from the bottom
    pub const SHIP_OFFSET: f32 = 60.0;

    /// Seconds between shots
    pub const FIRE_INTERVAL: f32 = 0.25;
    pub const BULLET_SPEED: f32 = 520.0;
    pub const BULLET_WIDTH: f32 = 4.0;
    pub const BULLET_HEIGHT: f32 = 12.0;

    pub const ENEMY_SIZE: f32 = 30.0;
    pub const ENEMY_START_SPEED: f32 = 90.0;
    pub const ENEMY_SPEEDUP: f32 = 2.0;
    pub const ENEMY_MAX_SPEED: f32 = 220.0;
    /// Enemy spawns per second at score 0
    pub const SPAWN_BASE_RATE: f32 = 0.8;
    /// Extra spawns per second per point
    pub const SPAWN_GROWTH: f32 = 0.06;
    pub const SPAWN_MAX_RATE: f32 = 3.5;

    pub const START_LIVES: u8 = 3;
    pub const WIN_SCORE: u64 = 40;
}

use consts::*;

/// Expected enemy spawns per second at `score`
pub fn spawn_rate(score: u64) -> f32 {
    (SPAWN_BASE_RATE + SPAWN_GROWTH * score as f32).min(SPAWN_MAX_RATE)
}

pub fn enemy_speed(score: u64) -> f32 {
    (ENEMY_START_SPEED + ENEMY_SPEEDUP * score as f32).min(ENEMY_MAX_SPEED)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub rect: Rect,
    pub speed: f32,
}

#[derive(Debug, Clone)]
pub struct Shooter {
    pub ship_x: f32,
    pub bullets: Vec<Rect>,
    pub enemies: Vec<Enemy>,
    /// Seconds until the next shot
    pub fire_timer: f32,
    pub score: u64,
    pub lives: u8,
    rng: Pcg32,
}

fn ship_y() -> f32 {
    LOGICAL_HEIGHT - SHIP_OFFSET
}

impl Shooter {
    pub fn ship_rect(&self) -> Rect {
        Rect::from_center(
            Vec2::new(self.ship_x, ship_y()),
            Vec2::new(SHIP_WIDTH, SHIP_HEIGHT),
        )
    }

    fn move_ship(&mut self, x: f32) {
        let half = SHIP_WIDTH / 2.0;
        self.ship_x = x.clamp(half, LOGICAL_WIDTH - half);
    }

    fn fire(&mut self, fx: &mut Effects<'_>) {
        let nose = Vec2::new(self.ship_x, ship_y() - SHIP_HEIGHT / 2.0);
        self.bullets.push(Rect::from_center(
            nose,
            Vec2::new(BULLET_WIDTH, BULLET_HEIGHT),
        ));
        fx.play_at(Cue::Shoot, 0.25);
    }

    fn maybe_spawn(&mut self, dt: f32) {
        let chance = (spawn_rate(self.score) * dt).clamp(0.0, 1.0) as f64;
        if !self.rng.random_bool(chance) {
            return;
        }
        let x = self.rng.random_range(0.0..LOGICAL_WIDTH - ENEMY_SIZE);
        self.enemies.push(Enemy {
            rect: Rect::new(x, -ENEMY_SIZE, ENEMY_SIZE, ENEMY_SIZE),
            speed: enemy_speed(self.score),
        });
    }

    fn lose_life(&mut self, fx: &mut Effects<'_>) {
        self.lives = self.lives.saturating_sub(1);
        fx.burst(Vec2::new(self.ship_x, ship_y()), 16, Some(palette::DANGER));
        fx.play(Cue::Miss);
        log::debug!("Shooter hit, {} lives left", self.lives);
    }

    fn resolve_hits(&mut self, fx: &mut Effects<'_>) {
        let mut i = 0;
        while i < self.enemies.len() {
            let enemy = self.enemies[i].rect;
            match self.bullets.iter().position(|b| b.intersects(&enemy)) {
                Some(b) => {
                    self.bullets.swap_remove(b);
                    self.enemies.remove(i);
                    self.score += 1;
                    fx.burst(enemy.center(), 14, Some(palette::LILAC));
                    fx.play(Cue::Hit);
                }
                None => i += 1,
            }
        }
    }
}

impl Game for Shooter {
    fn new(seed: u64) -> Self {
        Self {
            ship_x: LOGICAL_WIDTH / 2.0,
            bullets: Vec::new(),
            enemies: Vec::new(),
            fire_timer: FIRE_INTERVAL,
            score: 0,
            lives: START_LIVES,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    fn name(&self) -> &'static str {
        "shooter"
    }

    fn title(&self) -> &'static str {
        "Shooter"
    }

    fn start_hint(&self) -> &'static str {
        "Tap, then drag to steer"
    }

    fn wants_drag(&self) -> bool {
        true
    }

    fn handle_gesture(&mut self, gesture: &Gesture, _fx: &mut Effects<'_>) {
        match *gesture {
            Gesture::Tap { position }
            | Gesture::DragStart { position }
            | Gesture::DragMove { position } => self.move_ship(position.x),
            Gesture::Swipe { .. } => {}
        }
    }

    fn update(&mut self, dt: f32, fx: &mut Effects<'_>) {
        self.fire_timer -= dt;
        if self.fire_timer <= 0.0 {
            self.fire(fx);
            self.fire_timer += FIRE_INTERVAL;
        }

        for bullet in self.bullets.iter_mut() {
            bullet.pos.y -= BULLET_SPEED * dt;
        }
        self.bullets.retain(|b| b.bottom() > 0.0);

        self.maybe_spawn(dt);
        for enemy in self.enemies.iter_mut() {
            enemy.rect.pos.y += enemy.speed * dt;
        }

        self.resolve_hits(fx);

        let ship = self.ship_rect();
        let before = self.enemies.len();
        self.enemies
            .retain(|e| !e.rect.intersects(&ship) && e.rect.top() < LOGICAL_HEIGHT);
        for _ in self.enemies.len()..before {
            self.lose_life(fx);
        }
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        for bullet in &self.bullets {
            canvas.fill_rect(bullet.pos, bullet.size, palette::GOLD);
        }
        for enemy in &self.enemies {
            canvas.fill_rotated_rect(
                enemy.rect.center(),
                enemy.rect.size,
                std::f32::consts::FRAC_PI_4,
                palette::LILAC,
            );
        }
        let ship = self.ship_rect();
        canvas.fill_rect(ship.pos, ship.size, palette::SKY);
        let lives = "♥".repeat(self.lives as usize);
        renderer::draw_hud(canvas, self.score, Some(&lives));
    }

    fn terminal(&self) -> Option<Terminal> {
        if self.lives == 0 {
            Some(Terminal::loss(format!("Overrun! Score: {}", self.score)))
        } else if self.score >= WIN_SCORE {
            Some(Terminal::win(format!("Sector clear! Score: {}", self.score)))
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

    fn enemy_at(x: f32, y: f32) -> Enemy {
        Enemy {
            rect: Rect::new(x, y, ENEMY_SIZE, ENEMY_SIZE),
            speed: 0.0,
        }
    }

    #[test]
    fn test_auto_fire() {
        let mut h = FxHarness::new();
        let mut game = Shooter::new(1);
        game.update(FIRE_INTERVAL / 2.0, &mut h.fx());
        assert!(game.bullets.is_empty());
        game.update(FIRE_INTERVAL / 2.0 + 0.01, &mut h.fx());
        assert_eq!(game.bullets.len(), 1);
        assert!(game.bullets[0].center().y < ship_y());
    }

    #[test]
    fn test_drag_moves_ship() {
        let mut h = FxHarness::new();
        let mut game = Shooter::new(1);
        game.handle_gesture(&Gesture::DragMove { position: Vec2::new(50.0, 0.0) }, &mut h.fx());
        assert_eq!(game.ship_x, 50.0);
        game.handle_gesture(&Gesture::DragMove { position: Vec2::new(900.0, 0.0) }, &mut h.fx());
        assert_eq!(game.ship_x, LOGICAL_WIDTH - SHIP_WIDTH / 2.0);
    }

    #[test]
    fn test_bullet_destroys_enemy() {
        let mut h = FxHarness::new();
        let mut game = Shooter::new(1);
        game.fire_timer = 100.0;
        game.enemies.push(enemy_at(100.0, 200.0));
        game.bullets.push(Rect::new(110.0, 215.0, BULLET_WIDTH, BULLET_HEIGHT));
        game.update(0.0, &mut h.fx());
        assert!(game.enemies.is_empty());
        assert!(game.bullets.is_empty());
        assert_eq!(game.score, 1);
        assert!(!h.particles.is_empty());
    }

    #[test]
    fn test_enemy_reaching_bottom_costs_life() {
        let mut h = FxHarness::new();
        let mut game = Shooter::new(1);
        game.fire_timer = 100.0;
        game.enemies.push(enemy_at(0.0, LOGICAL_HEIGHT + 1.0));
        game.update(0.0, &mut h.fx());
        assert!(game.enemies.is_empty());
        assert_eq!(game.lives, START_LIVES - 1);
    }

    #[test]
    fn test_ship_collision_and_loss() {
        let mut h = FxHarness::new();
        let mut game = Shooter::new(1);
        game.fire_timer = 100.0;
        for _ in 0..START_LIVES {
            let ship = game.ship_rect();
            game.enemies.push(enemy_at(ship.left(), ship.top() - 5.0));
            game.update(0.0, &mut h.fx());
        }
        assert_eq!(game.lives, 0);
        assert_eq!(game.terminal().map(|t| t.outcome), Some(Outcome::Loss));
    }

    #[test]
    fn test_difficulty_rises_with_score() {
        for score in 0..200 {
            assert!(spawn_rate(score + 1) >= spawn_rate(score));
            assert!(enemy_speed(score + 1) >= enemy_speed(score));
        }
        assert!(spawn_rate(20) > spawn_rate(0));
        assert!(spawn_rate(10_000) <= SPAWN_MAX_RATE);
    }

    #[test]
    fn test_spawns_are_seeded() {
        let mut h = FxHarness::new();
        let mut a = Shooter::new(9);
        let mut b = Shooter::new(9);
        for _ in 0..300 {
            a.update(0.016, &mut h.fx());
            b.update(0.016, &mut h.fx());
        }
        assert_eq!(a.enemies, b.enemies);
        assert_eq!(a.lives, b.lives);
    }

    #[test]
    fn test_win_score() {
        let mut game = Shooter::new(1);
        game.score = WIN_SCORE;
        assert_eq!(game.terminal().map(|t| t.outcome), Some(Outcome::Win));
    }
}
