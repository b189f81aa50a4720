//! Rhythm: tap the lane as its note crosses the hit line
//!
//! The chart is generated from the seed. Notes are timed in seconds of song
//! time; their screen position is derived from the time left until the hit.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::audio::Cue;
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::fx::palette;
use crate::input::Gesture;
use crate::renderer::{self, Canvas, TextAlign};
use crate::sim::{sample_distinct, Effects, Game, Terminal, DEFAULT_ATTEMPTS};

pub mod consts {
    pub const LANES: usize = 4;
    /// Hit line distance from the bottom
    pub const HIT_LINE_OFFSET: f32 = 110.0;
    pub const NOTE_RADIUS: f32 = 22.0;
    /// Fall speed (px/s)
    pub const NOTE_SPEED: f32 = 320.0;

    /// Song time before the first note (s)
    pub const LEAD_IN: f32 = 2.0;
    pub const CHART_BEATS: usize = 64;
    /// Seconds between beats at the start of the chart
    pub const BASE_BEAT: f32 = 0.6;
    /// Beat interval removed per beat
    pub const BEAT_ACCEL: f32 = 0.004;
    pub const MIN_BEAT: f32 = 0.35;
    /// Min time between two notes in the same lane (s)
    pub const MIN_LANE_GAP: f32 = 0.5;
    /// Probability that a beat carries two notes
    pub const CHORD_CHANCE: f64 = 0.15;

    /// Max |tap time - note time| for a hit (s)
    pub const HIT_WINDOW: f32 = 0.15;
    pub const PERFECT_WINDOW: f32 = 0.05;
    pub const GOOD_POINTS: u64 = 1;
    pub const PERFECT_POINTS: u64 = 3;
    pub const MAX_MISSES: u32 = 8;
}

use consts::*;

/// Seconds between beat `index` and the next one
pub fn beat_interval(index: usize) -> f32 {
    (BASE_BEAT - BEAT_ACCEL * index as f32).max(MIN_BEAT)
}

fn lane_width() -> f32 {
    LOGICAL_WIDTH / LANES as f32
}

fn hit_line_y() -> f32 {
    LOGICAL_HEIGHT - HIT_LINE_OFFSET
}

/// Lane under a logical x coordinate
pub fn lane_at(x: f32) -> usize {
    ((x / lane_width()).floor().max(0.0) as usize).min(LANES - 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    Pending,
    Hit,
    Missed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub lane: usize,
    /// Song time at which the note crosses the hit line
    pub time: f32,
    pub state: NoteState,
}

impl Note {
    pub fn new(lane: usize, time: f32) -> Self {
        Self {
            lane,
            time,
            state: NoteState::Pending,
        }
    }
}

/// Build a chart: one or two notes per beat, lanes spaced by `MIN_LANE_GAP`
pub fn generate_chart(rng: &mut Pcg32) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut last_in_lane = [f32::NEG_INFINITY; LANES];
    let mut time = LEAD_IN;

    for beat in 0..CHART_BEATS {
        let count = if rng.random_bool(CHORD_CHANCE) { 2 } else { 1 };
        let lanes = sample_distinct(rng, LANES, count, DEFAULT_ATTEMPTS, |lane, _| {
            time - last_in_lane[lane] >= MIN_LANE_GAP
        });
        for lane in lanes {
            last_in_lane[lane] = time;
            notes.push(Note::new(lane, time));
        }
        time += beat_interval(beat);
    }
    notes
}

#[derive(Debug, Clone)]
pub struct Rhythm {
    pub notes: Vec<Note>,
    /// Song time (s)
    pub time: f32,
    pub score: u64,
    pub combo: u32,
    pub misses: u32,
}

impl Rhythm {
    fn note_pos(&self, note: &Note) -> Vec2 {
        Vec2::new(
            (note.lane as f32 + 0.5) * lane_width(),
            hit_line_y() - (note.time - self.time) * NOTE_SPEED,
        )
    }

    /// Hit the lowest pending note in `lane` inside the window
    pub fn hit_lane(&mut self, lane: usize, fx: &mut Effects<'_>) -> bool {
        let now = self.time;
        let candidate = self
            .notes
            .iter()
            .enumerate()
            .filter(|(_, n)| {
                n.lane == lane && n.state == NoteState::Pending && (n.time - now).abs() <= HIT_WINDOW
            })
            .min_by(|(_, a), (_, b)| a.time.total_cmp(&b.time))
            .map(|(i, _)| i);

        let Some(index) = candidate else {
            self.combo = 0;
            return false;
        };

        let error = (self.notes[index].time - now).abs();
        let points = if error <= PERFECT_WINDOW {
            PERFECT_POINTS
        } else {
            GOOD_POINTS
        };
        self.combo += 1;
        self.score += points * (1 + u64::from(self.combo / 10));

        let pos = self.note_pos(&self.notes[index]);
        self.notes[index].state = NoteState::Hit;
        fx.burst(pos, 10, Some(palette::LANES[lane]));
        fx.play_at(Cue::Hit, 0.6);
        true
    }

    fn is_complete(&self) -> bool {
        self.notes.iter().all(|n| n.state != NoteState::Pending)
    }
}

impl Game for Rhythm {
    fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        Self {
            notes: generate_chart(&mut rng),
            time: 0.0,
            score: 0,
            combo: 0,
            misses: 0,
        }
    }

    fn name(&self) -> &'static str {
        "rhythm"
    }

    fn title(&self) -> &'static str {
        "Rhythm"
    }

    fn start_hint(&self) -> &'static str {
        "Tap the lanes on the beat"
    }

    fn handle_gesture(&mut self, gesture: &Gesture, fx: &mut Effects<'_>) {
        if let Gesture::Tap { position } = gesture {
            self.hit_lane(lane_at(position.x), fx);
        }
    }

    fn update(&mut self, dt: f32, fx: &mut Effects<'_>) {
        self.time += dt;
        let now = self.time;
        let mut missed = 0;
        for note in self.notes.iter_mut() {
            if note.state == NoteState::Pending && now - note.time > HIT_WINDOW {
                note.state = NoteState::Missed;
                missed += 1;
            }
        }
        if missed > 0 {
            self.misses += missed;
            self.combo = 0;
            fx.play_at(Cue::Miss, 0.5);
        }
    }

    fn render(&self, canvas: &mut dyn Canvas) {
        let width = lane_width();
        for lane in 0..LANES {
            if lane % 2 == 1 {
                canvas.fill_rect(
                    Vec2::new(lane as f32 * width, 0.0),
                    Vec2::new(width, LOGICAL_HEIGHT),
                    palette::SURFACE,
                );
            }
        }
        canvas.fill_rect(
            Vec2::new(0.0, hit_line_y() - 2.0),
            Vec2::new(LOGICAL_WIDTH, 4.0),
            palette::TEXT.with_alpha(0.6),
        );
        for note in self.notes.iter().filter(|n| n.state == NoteState::Pending) {
            let pos = self.note_pos(note);
            if pos.y < -NOTE_RADIUS {
                // Sorted by time: everything after is off screen too
                break;
            }
            canvas.fill_circle(pos, NOTE_RADIUS, palette::LANES[note.lane]);
        }
        if self.combo >= 2 {
            canvas.fill_text(
                &format!("x{}", self.combo),
                Vec2::new(LOGICAL_WIDTH / 2.0, 80.0),
                20.0,
                TextAlign::Center,
                palette::GOLD,
            );
        }
        let misses = format!("miss {}/{}", self.misses, MAX_MISSES);
        renderer::draw_hud(canvas, self.score, Some(&misses));
    }

    fn terminal(&self) -> Option<Terminal> {
        if self.misses >= MAX_MISSES {
            Some(Terminal::loss(format!("Lost the beat! Score: {}", self.score)))
        } else if self.is_complete() {
            Some(Terminal::win(format!("Song complete! Score: {}", self.score)))
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

    fn lane_x(lane: usize) -> f32 {
        (lane as f32 + 0.5) * lane_width()
    }

    fn tap_lane(game: &mut Rhythm, h: &mut FxHarness, lane: usize) {
        game.handle_gesture(
            &Gesture::Tap {
                position: Vec2::new(lane_x(lane), 500.0),
            },
            &mut h.fx(),
        );
    }

    fn scripted(notes: Vec<Note>) -> Rhythm {
        let mut game = Rhythm::new(0);
        game.notes = notes;
        game
    }

    #[test]
    fn test_chart_is_seeded() {
        assert_eq!(Rhythm::new(3).notes, Rhythm::new(3).notes);
        assert_ne!(Rhythm::new(3).notes, Rhythm::new(4).notes);
    }

    #[test]
    fn test_chart_respects_lane_gap() {
        for seed in 0..20 {
            let game = Rhythm::new(seed);
            assert!(game.notes.len() >= CHART_BEATS);
            for lane in 0..LANES {
                let times: Vec<f32> = game
                    .notes
                    .iter()
                    .filter(|n| n.lane == lane)
                    .map(|n| n.time)
                    .collect();
                for pair in times.windows(2) {
                    assert!(pair[1] - pair[0] >= MIN_LANE_GAP - 1e-4);
                }
            }
            // Sorted by time
            assert!(game.notes.windows(2).all(|w| w[0].time <= w[1].time));
        }
    }

    #[test]
    fn test_tempo_never_slows() {
        for beat in 0..CHART_BEATS * 2 {
            assert!(beat_interval(beat + 1) <= beat_interval(beat));
        }
        assert!(beat_interval(CHART_BEATS) < beat_interval(0));
    }

    #[test]
    fn test_lane_at() {
        assert_eq!(lane_at(-5.0), 0);
        assert_eq!(lane_at(lane_x(2)), 2);
        assert_eq!(lane_at(LOGICAL_WIDTH + 10.0), LANES - 1);
    }

    #[test]
    fn test_tap_hits_note_in_window() {
        let mut h = FxHarness::new();
        let mut game = scripted(vec![Note::new(1, 1.0)]);
        game.time = 1.0;
        tap_lane(&mut game, &mut h, 1);
        assert_eq!(game.notes[0].state, NoteState::Hit);
        assert_eq!(game.score, PERFECT_POINTS);
        assert_eq!(game.combo, 1);
    }

    #[test]
    fn test_tap_outside_window_or_lane_misses_nothing() {
        let mut h = FxHarness::new();
        let mut game = scripted(vec![Note::new(1, 1.0)]);
        game.time = 1.0 - HIT_WINDOW - 0.05;
        tap_lane(&mut game, &mut h, 1);
        game.time = 1.0;
        tap_lane(&mut game, &mut h, 2);
        assert_eq!(game.notes[0].state, NoteState::Pending);
        assert_eq!(game.score, 0);
    }

    #[test]
    fn test_hits_lowest_note_first() {
        let mut h = FxHarness::new();
        let mut game = scripted(vec![Note::new(0, 1.0), Note::new(0, 1.1)]);
        game.time = 1.05;
        tap_lane(&mut game, &mut h, 0);
        assert_eq!(game.notes[0].state, NoteState::Hit);
        assert_eq!(game.notes[1].state, NoteState::Pending);
        // 50ms off sits on the perfect boundary, either grade is fine
        assert!(game.score >= GOOD_POINTS);
    }

    #[test]
    fn test_late_notes_are_missed() {
        let mut h = FxHarness::new();
        let mut game = scripted(vec![Note::new(0, 1.0), Note::new(1, 1.0), Note::new(2, 3.0)]);
        game.combo = 4;
        game.update(1.0 + HIT_WINDOW + 0.01, &mut h.fx());
        assert_eq!(game.misses, 2);
        assert_eq!(game.combo, 0);
        assert_eq!(game.notes[2].state, NoteState::Pending);
    }

    #[test]
    fn test_too_many_misses_loses() {
        let mut h = FxHarness::new();
        let notes = (0..MAX_MISSES + 2)
            .map(|i| Note::new(i as usize % LANES, 1.0 + i as f32))
            .collect();
        let mut game = scripted(notes);
        while game.terminal().is_none() {
            game.update(0.1, &mut h.fx());
        }
        assert_eq!(game.terminal().map(|t| t.outcome), Some(Outcome::Loss));
        assert_eq!(game.misses, MAX_MISSES);
    }

    #[test]
    fn test_full_chart_wins() {
        let mut h = FxHarness::new();
        let mut game = Rhythm::new(8);
        let step = 0.01;
        while game.terminal().is_none() {
            game.update(step, &mut h.fx());
            let due: Vec<usize> = game
                .notes
                .iter()
                .filter(|n| n.state == NoteState::Pending && (n.time - game.time).abs() <= PERFECT_WINDOW)
                .map(|n| n.lane)
                .collect();
            for lane in due {
                tap_lane(&mut game, &mut h, lane);
            }
        }
        assert_eq!(game.misses, 0);
        assert_eq!(game.terminal().map(|t| t.outcome), Some(Outcome::Win));
        assert!(game.score >= game.notes.len() as u64 * PERFECT_POINTS);
    }
}
