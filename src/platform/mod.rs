//! Platform layer
//!
//! Browser glue lives in `web` (wasm only): the `requestAnimationFrame`
//! scheduler, the DOM outcome overlay, canvas sizing and pointer wiring.
//! The helpers here are plain functions so they run in native tests.

#[cfg(target_arch = "wasm32")]
pub mod web;

use glam::Vec2;

use crate::games::GameId;
use crate::input::{Gesture, SwipeDirection};
use crate::sim::{Outcome, OutcomeReport};

/// Keyboard fallback for desktop play.
///
/// Arrow keys act as swipes from the canvas center; space and enter tap it.
pub fn key_gesture(key: &str, center: Vec2) -> Option<Gesture> {
    let direction = match key {
        "ArrowUp" => SwipeDirection::Up,
        "ArrowDown" => SwipeDirection::Down,
        "ArrowLeft" => SwipeDirection::Left,
        "ArrowRight" => SwipeDirection::Right,
        " " | "Enter" => return Some(Gesture::Tap { position: center }),
        _ => return None,
    };
    Some(Gesture::Swipe {
        direction,
        delta: direction.as_vec2() * crate::consts::SWIPE_THRESHOLD,
        duration_ms: 0.0,
    })
}

/// Heading for the outcome overlay
pub fn outcome_heading(report: &OutcomeReport) -> &'static str {
    match (report.outcome, report.new_best) {
        (_, true) => "New best!",
        (Outcome::Win, false) => "You win!",
        (Outcome::Loss, false) => "Game over",
    }
}

/// Score line under the outcome message
pub fn best_line(report: &OutcomeReport) -> String {
    match report.previous_best {
        Some(best) if !report.new_best => format!("Score {} - best {}", report.score, best),
        _ => format!("Score {}", report.score),
    }
}

/// Link list for the game picker shown when the hash names no game
pub fn menu_html(games: &[GameId]) -> String {
    games
        .iter()
        .map(|id| format!("<a class=\"game-link\" href=\"#{}\">{}</a>", id.as_str(), id.title()))
        .collect::<Vec<_>>()
        .join("")
}
