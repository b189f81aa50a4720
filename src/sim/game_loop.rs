//! Per-game loop: not started -> running -> ended
//!
//! One `GameLoop` owns one game's state and drives it from display frames.
//! Each frame while running: apply queued gestures and advance the game
//! (movement, collisions, scoring), check terminal conditions, then render.
//! The loop never holds more than one scheduled frame: every request is
//! preceded by a cancel, and callbacks with a stale token are dropped.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::outcome::{LogPresenter, Outcome, OutcomePresenter, OutcomeReport, Terminal};
use super::scheduler::{FrameHandle, FrameScheduler, FrameToken};
use crate::audio::{AudioSink, Cue, SilentAudio};
use crate::consts::{DEFAULT_FRAME_DT, LOGICAL_HEIGHT, LOGICAL_WIDTH, MAX_FRAME_DT, OUTRO_FRAMES};
use crate::fx::palette::{self, Color};
use crate::fx::{Confetti, ParticlePool};
use crate::highscores::{self, MemoryScoreStore, ScoreStore};
use crate::input::{Gesture, LogicalSize};
use crate::renderer::{self, Canvas};
use crate::settings::Settings;

/// Confetti pieces launched on a win
const CONFETTI_COUNT: usize = 120;

/// Loop phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Initialized, rendering a start prompt, waiting for a start gesture
    NotStarted,
    Running,
    Ended(Outcome),
}

/// Effect collaborators handed to a game during a tick
pub struct Effects<'a> {
    pub particles: &'a mut ParticlePool,
    pub audio: &'a mut dyn AudioSink,
}

impl Effects<'_> {
    /// Particle burst at `pos`
    pub fn burst(&mut self, pos: Vec2, count: usize, color: Option<Color>) {
        self.particles.emit(pos.x, pos.y, count, color);
    }

    pub fn play(&mut self, cue: Cue) {
        self.audio.play(cue, None);
    }

    pub fn play_at(&mut self, cue: Cue, volume: f32) {
        self.audio.play(cue, Some(volume));
    }
}

/// Hooks every mini-game supplies
pub trait Game {
    /// Fresh state, identical to first load for the same seed
    fn new(seed: u64) -> Self
    where
        Self: Sized;

    /// Stable key used for best-score storage
    fn name(&self) -> &'static str;

    /// Display title for the start prompt
    fn title(&self) -> &'static str;

    fn logical_size(&self) -> LogicalSize {
        LogicalSize::new(LOGICAL_WIDTH, LOGICAL_HEIGHT)
    }

    fn start_hint(&self) -> &'static str {
        "Tap to start"
    }

    /// Whether the game consumes the drag stream
    fn wants_drag(&self) -> bool {
        false
    }

    /// Gesture that moves the loop from not-started to running
    fn is_start_gesture(&self, gesture: &Gesture) -> bool {
        matches!(gesture, Gesture::Tap { .. })
    }

    /// Single input entry point
    fn handle_gesture(&mut self, gesture: &Gesture, fx: &mut Effects<'_>);

    /// Advance one frame: movement, then collisions and scoring
    fn update(&mut self, dt: f32, fx: &mut Effects<'_>);

    fn render(&self, canvas: &mut dyn Canvas);

    /// Terminal condition, if reached
    fn terminal(&self) -> Option<Terminal>;

    fn score(&self) -> u64;
}

/// Collaborators shared by the page's game (one set per page)
pub struct Services {
    pub particles: ParticlePool,
    pub confetti: Confetti,
    pub confetti_enabled: bool,
    pub audio: Box<dyn AudioSink>,
    pub scores: Box<dyn ScoreStore>,
    pub presenter: Box<dyn OutcomePresenter>,
}

impl Services {
    pub fn new(
        settings: &Settings,
        seed: u64,
        audio: Box<dyn AudioSink>,
        scores: Box<dyn ScoreStore>,
        presenter: Box<dyn OutcomePresenter>,
    ) -> Self {
        Self {
            particles: ParticlePool::new(seed).with_max_particles(settings.max_particles()),
            confetti: Confetti::new(seed ^ 0x9e37_79b9),
            confetti_enabled: settings.effective_confetti(),
            audio,
            scores,
            presenter,
        }
    }

    /// Silent audio, in-memory scores, logging presenter
    pub fn headless(seed: u64) -> Self {
        Self::new(
            &Settings::default(),
            seed,
            Box::new(SilentAudio),
            Box::new(MemoryScoreStore::new()),
            Box::new(LogPresenter),
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingFrame {
    token: FrameToken,
    handle: FrameHandle,
}

/// Drives one game instance
pub struct GameLoop<G: Game, S: FrameScheduler> {
    game: G,
    phase: LoopPhase,
    scheduler: S,
    services: Services,
    pending: Option<PendingFrame>,
    next_token: FrameToken,
    last_frame_ms: Option<f64>,
    gestures: VecDeque<Gesture>,
    outro_frames: u32,
    seeds: Pcg32,
    updates: u64,
}

impl<G: Game, S: FrameScheduler> GameLoop<G, S> {
    pub fn new(seed: u64, scheduler: S, services: Services) -> Self {
        let mut seeds = Pcg32::seed_from_u64(seed);
        let game = G::new(seeds.random());
        log::info!("{} initialized with seed {}", game.name(), seed);
        Self {
            game,
            phase: LoopPhase::NotStarted,
            scheduler,
            services,
            pending: None,
            next_token: 1,
            last_frame_ms: None,
            gestures: VecDeque::new(),
            outro_frames: 0,
            seeds,
            updates: 0,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// True while a frame callback is outstanding
    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of game updates executed since creation
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Begin frame scheduling (cancels any frame already scheduled)
    pub fn start(&mut self) {
        self.last_frame_ms = None;
        self.schedule();
    }

    /// Cancel the outstanding frame, if any
    pub fn stop(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.scheduler.cancel_frame(pending.handle);
        }
    }

    /// Queue a gesture; applied at the start of the next frame
    pub fn push_gesture(&mut self, gesture: Gesture) {
        self.gestures.push_back(gesture);
    }

    /// Throw away the current run and re-initialize.
    ///
    /// Only honored outside `Running`; returns false when ignored.
    pub fn restart(&mut self) -> bool {
        if self.phase == LoopPhase::Running {
            log::warn!("Ignoring restart of {} while running", self.game.name());
            return false;
        }
        self.game = G::new(self.seeds.random());
        self.phase = LoopPhase::NotStarted;
        self.gestures.clear();
        self.outro_frames = 0;
        self.services.particles.clear();
        self.services.confetti.clear();
        self.services.presenter.dismiss();
        log::info!("{} restarted", self.game.name());
        self.start();
        true
    }

    /// Frame callback from the host.
    ///
    /// Returns false (and does nothing) for a token that is no longer current.
    pub fn on_frame(&mut self, token: FrameToken, now_ms: f64, canvas: &mut dyn Canvas) -> bool {
        match self.pending {
            Some(pending) if pending.token == token => self.pending = None,
            _ => {
                log::debug!("Dropping stale frame {}", token);
                return false;
            }
        }

        let dt = match self.last_frame_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => DEFAULT_FRAME_DT,
        };
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            DEFAULT_FRAME_DT
        };
        self.last_frame_ms = Some(now_ms);

        self.step(dt, canvas);

        if self.wants_frames() {
            self.schedule();
        } else {
            log::debug!("{} idle until restart", self.game.name());
        }
        true
    }

    fn wants_frames(&self) -> bool {
        match self.phase {
            LoopPhase::NotStarted | LoopPhase::Running => true,
            LoopPhase::Ended(_) => self.outro_frames > 0,
        }
    }

    fn schedule(&mut self) {
        self.stop();
        let token = self.next_token;
        self.next_token += 1;
        match self.scheduler.request_frame(token) {
            Some(handle) => self.pending = Some(PendingFrame { token, handle }),
            None => log::error!("Host refused a frame for {}", self.game.name()),
        }
    }

    /// One tick: gestures, update, terminal check, render
    fn step(&mut self, dt: f32, canvas: &mut dyn Canvas) {
        while let Some(gesture) = self.gestures.pop_front() {
            self.apply_gesture(gesture);
        }

        match self.phase {
            LoopPhase::Running => {
                let mut fx = Effects {
                    particles: &mut self.services.particles,
                    audio: self.services.audio.as_mut(),
                };
                self.game.update(dt, &mut fx);
                self.updates += 1;

                if let Some(terminal) = self.game.terminal() {
                    self.finish(terminal);
                }
            }
            LoopPhase::Ended(_) => {
                self.outro_frames = self.outro_frames.saturating_sub(1);
                self.services.confetti.tick();
            }
            LoopPhase::NotStarted => {}
        }
        self.services.particles.tick();

        self.render(canvas);
    }

    fn apply_gesture(&mut self, gesture: Gesture) {
        self.services.audio.unlock();
        match self.phase {
            LoopPhase::NotStarted => {
                if !self.game.is_start_gesture(&gesture) {
                    return;
                }
                self.phase = LoopPhase::Running;
                log::info!("{} started", self.game.name());
                self.services.audio.play(Cue::Start, None);
                self.dispatch(&gesture);
            }
            LoopPhase::Running => self.dispatch(&gesture),
            LoopPhase::Ended(_) => {
                log::debug!("Ignoring {:?} after run ended", gesture.kind());
            }
        }
    }

    fn dispatch(&mut self, gesture: &Gesture) {
        let mut fx = Effects {
            particles: &mut self.services.particles,
            audio: self.services.audio.as_mut(),
        };
        self.game.handle_gesture(gesture, &mut fx);
    }

    /// Enter `Ended`: persist a new best, play the cue, present exactly once
    fn finish(&mut self, terminal: Terminal) {
        let name = self.game.name();
        let score = self.game.score();
        self.phase = LoopPhase::Ended(terminal.outcome);
        self.outro_frames = OUTRO_FRAMES;

        let previous_best = match self.services.scores.best(name) {
            Ok(best) => best,
            Err(e) => {
                log::warn!("Could not read best score for {}: {}", name, e);
                None
            }
        };
        let mut new_best = highscores::qualifies(previous_best, score);
        if new_best {
            if let Err(e) = self.services.scores.set_best(name, score) {
                log::warn!("Could not save best score for {}: {}", name, e);
                new_best = false;
            }
        }

        let cue = match (terminal.outcome, new_best) {
            (_, true) => Cue::HighScore,
            (Outcome::Win, false) => Cue::Win,
            (Outcome::Loss, false) => Cue::Lose,
        };
        self.services.audio.play(cue, None);

        if terminal.outcome == Outcome::Win && self.services.confetti_enabled {
            let size = self.game.logical_size();
            self.services
                .confetti
                .burst(size.width, size.height, CONFETTI_COUNT);
        }

        log::info!(
            "{} ended: {:?} with score {}",
            name,
            terminal.outcome,
            score
        );
        let report = OutcomeReport {
            game: name.to_string(),
            outcome: terminal.outcome,
            message: terminal.message,
            score,
            previous_best,
            new_best,
        };
        self.services.presenter.present(&report);
    }

    fn render(&mut self, canvas: &mut dyn Canvas) {
        canvas.clear(palette::BACKGROUND);
        self.game.render(canvas);
        renderer::draw_particles(canvas, &self.services.particles);
        match self.phase {
            LoopPhase::NotStarted => {
                renderer::draw_prompt(canvas, self.game.title(), self.game.start_hint());
            }
            LoopPhase::Ended(_) => renderer::draw_confetti(canvas, &self.services.confetti),
            LoopPhase::Running => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::UnavailableScoreStore;
    use crate::input::SwipeDirection;
    use crate::renderer::RecordingCanvas;
    use crate::sim::outcome::RecordingPresenter;
    use crate::sim::scheduler::ManualScheduler;

    /// Minimal game: scores one point per update, ends at `goal`
    struct Counter {
        seed: u64,
        score: u64,
        lives: u8,
        goal: u64,
        taps: u32,
    }

    impl Game for Counter {
        fn new(seed: u64) -> Self {
            Self {
                seed,
                score: 0,
                lives: 3,
                goal: 5,
                taps: 0,
            }
        }

        fn name(&self) -> &'static str {
            "counter"
        }

        fn title(&self) -> &'static str {
            "Counter"
        }

        fn handle_gesture(&mut self, gesture: &Gesture, _fx: &mut Effects<'_>) {
            if let Gesture::Tap { .. } = gesture {
                self.taps += 1;
            }
            if let Gesture::Swipe { .. } = gesture {
                self.lives = 0;
            }
        }

        fn update(&mut self, _dt: f32, fx: &mut Effects<'_>) {
            self.score += 1;
            fx.burst(Vec2::new(10.0, 10.0), 2, None);
        }

        fn render(&self, canvas: &mut dyn Canvas) {
            renderer::draw_hud(canvas, self.score, None);
        }

        fn terminal(&self) -> Option<Terminal> {
            if self.lives == 0 {
                Some(Terminal::loss("Out of lives"))
            } else if self.score >= self.goal {
                Some(Terminal::win("Goal reached"))
            } else {
                None
            }
        }

        fn score(&self) -> u64 {
            self.score
        }
    }

    struct Harness {
        game_loop: GameLoop<Counter, ManualScheduler>,
        canvas: RecordingCanvas,
        presenter: RecordingPresenter,
        now: f64,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_store(Box::new(MemoryScoreStore::new()))
        }

        fn with_store(scores: Box<dyn ScoreStore>) -> Self {
            let presenter = RecordingPresenter::new();
            let services = Services::new(
                &Settings::default(),
                1,
                Box::new(SilentAudio),
                scores,
                Box::new(presenter.clone()),
            );
            Self {
                game_loop: GameLoop::new(42, ManualScheduler::new(), services),
                canvas: RecordingCanvas::new(LogicalSize::new(400.0, 600.0)),
                presenter,
                now: 0.0,
            }
        }

        /// Fire every due frame; returns how many actually ran
        fn frame(&mut self) -> usize {
            self.now += 16.0;
            let due = self.game_loop.scheduler_mut().take_due();
            due.into_iter()
                .filter(|&token| self.game_loop.on_frame(token, self.now, &mut self.canvas))
                .count()
        }

        fn tap(&mut self) {
            self.game_loop.push_gesture(Gesture::Tap {
                position: Vec2::new(200.0, 300.0),
            });
        }
    }

    #[test]
    fn test_not_started_renders_without_update() {
        let mut h = Harness::new();
        h.game_loop.start();
        for _ in 0..3 {
            assert_eq!(h.frame(), 1);
        }
        assert_eq!(h.game_loop.phase(), LoopPhase::NotStarted);
        assert_eq!(h.game_loop.updates(), 0);
        assert!(h.canvas.has_text("Tap to start"));
    }

    #[test]
    fn test_start_gesture_moves_to_running() {
        let mut h = Harness::new();
        h.game_loop.start();
        // Swipes are not start gestures for the default game
        h.game_loop.push_gesture(Gesture::Swipe {
            direction: SwipeDirection::Left,
            delta: Vec2::new(-50.0, 0.0),
            duration_ms: 100.0,
        });
        h.frame();
        assert_eq!(h.game_loop.phase(), LoopPhase::NotStarted);

        h.tap();
        h.frame();
        assert_eq!(h.game_loop.phase(), LoopPhase::Running);
        // The starting tap is delivered to the game too
        assert_eq!(h.game_loop.game().taps, 1);
        assert_eq!(h.game_loop.updates(), 1);
    }

    #[test]
    fn test_win_presents_once_and_persists() {
        let mut h = Harness::new();
        h.game_loop.start();
        h.tap();
        for _ in 0..10 {
            h.frame();
        }
        assert_eq!(h.game_loop.phase(), LoopPhase::Ended(Outcome::Win));
        assert_eq!(h.game_loop.game().score, 5);
        assert_eq!(h.presenter.len(), 1);

        let report = &h.presenter.reports()[0];
        assert_eq!(report.outcome, Outcome::Win);
        assert_eq!(report.score, 5);
        assert!(report.new_best);
        assert_eq!(report.previous_best, None);
        assert_eq!(h.game_loop.services().scores.best("counter").unwrap(), Some(5));
        assert!(!h.game_loop.services().confetti.is_done());

        // Updates stopped at the terminal tick
        assert_eq!(h.game_loop.updates(), 5);
    }

    #[test]
    fn test_lower_score_keeps_stored_best() {
        let mut store = MemoryScoreStore::new();
        store.set_best("counter", 10).unwrap();
        let mut h = Harness::with_store(Box::new(store));
        h.game_loop.start();
        h.tap();
        for _ in 0..10 {
            h.frame();
        }
        let report = &h.presenter.reports()[0];
        assert_eq!(report.score, 5);
        assert_eq!(report.previous_best, Some(10));
        assert!(!report.new_best);
        assert_eq!(h.game_loop.services().scores.best("counter").unwrap(), Some(10));
    }

    #[test]
    fn test_outro_then_idle() {
        let mut h = Harness::new();
        h.game_loop.start();
        h.tap();
        let mut frames = 0;
        while h.frame() > 0 {
            frames += 1;
            assert!(frames < 1000);
        }
        assert!(!h.game_loop.is_scheduled());
        assert_eq!(frames as u32, 5 + OUTRO_FRAMES);
        assert_eq!(h.presenter.len(), 1);
    }

    #[test]
    fn test_store_failure_still_presents() {
        let mut h = Harness::with_store(Box::new(UnavailableScoreStore));
        h.game_loop.start();
        h.tap();
        h.game_loop.push_gesture(Gesture::Swipe {
            direction: SwipeDirection::Up,
            delta: Vec2::new(0.0, -40.0),
            duration_ms: 50.0,
        });
        h.frame();
        assert_eq!(h.game_loop.phase(), LoopPhase::Ended(Outcome::Loss));
        let reports = h.presenter.reports();
        assert_eq!(reports.len(), 1);
        assert!(!reports[0].new_best);
        assert_eq!(reports[0].message, "Out of lives");
    }

    #[test]
    fn test_single_active_loop() {
        let mut h = Harness::new();
        h.game_loop.start();
        h.game_loop.start();
        h.game_loop.start();
        assert_eq!(h.game_loop.scheduler().pending(), 1);
        assert_eq!(h.game_loop.scheduler().cancelled(), 2);

        h.tap();
        assert_eq!(h.frame(), 1);
        assert_eq!(h.game_loop.updates(), 1);

        // Start again mid-run: still one tick per frame
        h.game_loop.start();
        h.game_loop.start();
        assert_eq!(h.frame(), 1);
        assert_eq!(h.game_loop.updates(), 2);
        assert_eq!(h.game_loop.scheduler().pending(), 1);
    }

    #[test]
    fn test_stale_token_ignored() {
        let mut h = Harness::new();
        h.game_loop.start();
        let stale = h.game_loop.scheduler_mut().take_due()[0];
        // Reschedule: the old token must not run
        h.game_loop.start();
        assert!(!h.game_loop.on_frame(stale, 16.0, &mut h.canvas));
        assert!(h.game_loop.is_scheduled());
        assert_eq!(h.frame(), 1);
    }

    #[test]
    fn test_restart_ignored_while_running() {
        let mut h = Harness::new();
        h.game_loop.start();
        h.tap();
        h.frame();
        assert!(!h.game_loop.restart());
        assert_eq!(h.game_loop.phase(), LoopPhase::Running);
        assert_eq!(h.game_loop.game().score, 1);
    }

    #[test]
    fn test_idempotent_restart() {
        let mut h = Harness::new();
        h.game_loop.start();
        h.tap();
        for _ in 0..10 {
            h.frame();
        }
        assert!(matches!(h.game_loop.phase(), LoopPhase::Ended(_)));

        assert!(h.game_loop.restart());
        assert!(h.game_loop.restart());
        assert_eq!(h.game_loop.scheduler().pending(), 1);

        let fresh = Counter::new(h.game_loop.game().seed);
        let game = h.game_loop.game();
        assert_eq!(h.game_loop.phase(), LoopPhase::NotStarted);
        assert_eq!(game.score, fresh.score);
        assert_eq!(game.lives, fresh.lives);
        assert_eq!(game.taps, 0);
        assert!(h.game_loop.services().particles.is_empty());
        assert!(h.game_loop.services().confetti.is_done());

        // And the new run plays normally
        h.tap();
        h.frame();
        assert_eq!(h.game_loop.phase(), LoopPhase::Running);
        assert_eq!(h.game_loop.game().score, 1);
    }

    #[test]
    fn test_stop_cancels() {
        let mut h = Harness::new();
        h.game_loop.start();
        h.game_loop.stop();
        assert!(!h.game_loop.is_scheduled());
        assert_eq!(h.frame(), 0);
    }

    #[test]
    fn test_dt_clamped() {
        let mut h = Harness::new();
        h.game_loop.start();
        let token = h.game_loop.scheduler_mut().take_due()[0];
        assert!(h.game_loop.on_frame(token, 0.0, &mut h.canvas));
        let token = h.game_loop.scheduler_mut().take_due()[0];
        // A 10 second gap must not explode the sim
        assert!(h.game_loop.on_frame(token, 10_000.0, &mut h.canvas));
        let token = h.game_loop.scheduler_mut().take_due()[0];
        assert!(h.game_loop.on_frame(token, f64::NAN, &mut h.canvas));
    }
}
