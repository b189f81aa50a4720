//! Single-pointer gesture recognizer
//!
//! Converts down/move/up/cancel pointer events (already in logical space)
//! into taps, four-way swipes and an optional drag stream.
//!
//! Classification on release, with `d = |end - start|`:
//! - `d < tap_threshold`: tap at the release point
//! - `d >= swipe_threshold`: swipe, direction bucketed into 90° sectors
//! - anything in between is a dead zone and produces nothing

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{SWIPE_THRESHOLD, TAP_THRESHOLD};

/// Four-way swipe direction (screen space, +y is down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SwipeDirection {
    /// Bucket a delta into a sector.
    ///
    /// Sectors by `atan2(dy, dx)`: `[-45°, 45°)` right, `[45°, 135°)` down,
    /// `[135°, 180°] ∪ [-180°, -135°)` left, `[-135°, -45°)` up. The diagonal
    /// boundaries are compared directly on the components so that exact
    /// diagonals land in the documented sector regardless of float rounding.
    pub fn from_delta(delta: Vec2) -> Option<Self> {
        let Vec2 { x: dx, y: dy } = delta;
        if !dx.is_finite() || !dy.is_finite() || (dx == 0.0 && dy == 0.0) {
            return None;
        }
        let dir = if dx > 0.0 && -dx <= dy && dy < dx {
            SwipeDirection::Right
        } else if dy > 0.0 && -dy < dx && dx <= dy {
            SwipeDirection::Down
        } else if dx < 0.0 && dx < dy && dy <= -dx {
            SwipeDirection::Left
        } else {
            SwipeDirection::Up
        };
        Some(dir)
    }

    /// Unit vector pointing in this direction
    pub fn as_vec2(&self) -> Vec2 {
        match self {
            SwipeDirection::Up => Vec2::NEG_Y,
            SwipeDirection::Down => Vec2::Y,
            SwipeDirection::Left => Vec2::NEG_X,
            SwipeDirection::Right => Vec2::X,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            SwipeDirection::Up => SwipeDirection::Down,
            SwipeDirection::Down => SwipeDirection::Up,
            SwipeDirection::Left => SwipeDirection::Right,
            SwipeDirection::Right => SwipeDirection::Left,
        }
    }
}

/// Kind tag used for callback registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureKind {
    Tap,
    Swipe,
    DragStart,
    DragMove,
}

/// A classified gesture, consumed once by the game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gesture {
    Tap {
        position: Vec2,
    },
    Swipe {
        direction: SwipeDirection,
        delta: Vec2,
        duration_ms: f64,
    },
    DragStart {
        position: Vec2,
    },
    DragMove {
        position: Vec2,
    },
}

impl Gesture {
    pub fn kind(&self) -> GestureKind {
        match self {
            Gesture::Tap { .. } => GestureKind::Tap,
            Gesture::Swipe { .. } => GestureKind::Swipe,
            Gesture::DragStart { .. } => GestureKind::DragStart,
            Gesture::DragMove { .. } => GestureKind::DragMove,
        }
    }
}

/// Low-level pointer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A raw pointer event already mapped into logical space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    /// Pointer / touch identifier (mouse uses a constant id)
    pub pointer_id: i32,
    pub position: Vec2,
    /// Host timestamp in milliseconds
    pub time_ms: f64,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, pointer_id: i32, position: Vec2, time_ms: f64) -> Self {
        Self {
            phase,
            pointer_id,
            position,
            time_ms,
        }
    }

    pub fn down(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Down, 0, Vec2::new(x, y), 0.0)
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Move, 0, Vec2::new(x, y), 0.0)
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Up, 0, Vec2::new(x, y), 0.0)
    }

    pub fn cancel() -> Self {
        Self::new(PointerPhase::Cancel, 0, Vec2::ZERO, 0.0)
    }

    pub fn with_pointer(mut self, pointer_id: i32) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    pub fn at_time(mut self, time_ms: f64) -> Self {
        self.time_ms = time_ms;
        self
    }
}

/// Classification thresholds (logical pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    pub tap_threshold: f32,
    pub swipe_threshold: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_threshold: TAP_THRESHOLD,
            swipe_threshold: SWIPE_THRESHOLD,
        }
    }
}

/// One down-to-up pointer cycle
#[derive(Debug, Clone, Copy)]
struct PointerSession {
    pointer_id: i32,
    start: Vec2,
    last: Vec2,
    start_ms: f64,
}

type Callback = Box<dyn FnMut(&Gesture)>;

/// Gesture recognizer (idle -> active -> idle)
pub struct GestureRecognizer {
    config: GestureConfig,
    session: Option<PointerSession>,
    /// Emit DragStart/DragMove even without a registered drag callback
    drag_stream: bool,
    callbacks: Vec<(GestureKind, Callback)>,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl std::fmt::Debug for GestureRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureRecognizer")
            .field("config", &self.config)
            .field("active", &self.session.is_some())
            .field("drag_stream", &self.drag_stream)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            session: None,
            drag_stream: false,
            callbacks: Vec::new(),
        }
    }

    pub fn config(&self) -> GestureConfig {
        self.config
    }

    /// Enable the drag stream for consumers that pull gestures from `classify`
    pub fn with_drag_stream(mut self, enabled: bool) -> Self {
        self.drag_stream = enabled;
        self
    }

    /// Register a callback for one gesture kind
    pub fn on(&mut self, kind: GestureKind, callback: impl FnMut(&Gesture) + 'static) {
        if matches!(kind, GestureKind::DragStart | GestureKind::DragMove) {
            self.drag_stream = true;
        }
        self.callbacks.push((kind, Box::new(callback)));
    }

    /// True while a pointer is down
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Classify one event and dispatch the result to the registered callbacks
    pub fn feed(&mut self, event: PointerEvent) -> Option<Gesture> {
        let gesture = self.classify(event)?;
        let kind = gesture.kind();
        for (_, cb) in self.callbacks.iter_mut().filter(|(k, _)| *k == kind) {
            cb(&gesture);
        }
        Some(gesture)
    }

    /// Advance the state machine with one event, returning at most one gesture
    pub fn classify(&mut self, event: PointerEvent) -> Option<Gesture> {
        match event.phase {
            PointerPhase::Down => self.on_down(event),
            PointerPhase::Move => self.on_move(event),
            PointerPhase::Up => self.on_up(event),
            PointerPhase::Cancel => {
                if self
                    .session
                    .is_some_and(|s| s.pointer_id == event.pointer_id)
                {
                    self.session = None;
                }
                None
            }
        }
    }

    fn on_down(&mut self, event: PointerEvent) -> Option<Gesture> {
        if let Some(active) = self.session {
            log::debug!(
                "Ignoring pointer {} while pointer {} is active",
                event.pointer_id,
                active.pointer_id
            );
            return None;
        }
        if !event.position.is_finite() {
            return None;
        }
        self.session = Some(PointerSession {
            pointer_id: event.pointer_id,
            start: event.position,
            last: event.position,
            start_ms: event.time_ms,
        });
        self.drag_stream.then_some(Gesture::DragStart {
            position: event.position,
        })
    }

    fn on_move(&mut self, event: PointerEvent) -> Option<Gesture> {
        let session = self.session.as_mut()?;
        if session.pointer_id != event.pointer_id || !event.position.is_finite() {
            return None;
        }
        session.last = event.position;
        self.drag_stream.then_some(Gesture::DragMove {
            position: event.position,
        })
    }

    fn on_up(&mut self, event: PointerEvent) -> Option<Gesture> {
        let session = self.session?;
        if session.pointer_id != event.pointer_id {
            return None;
        }
        self.session = None;

        // A non-finite release falls back to the last seen position
        let end = if event.position.is_finite() {
            event.position
        } else {
            session.last
        };
        let delta = end - session.start;
        let distance = delta.length();
        if !distance.is_finite() {
            return None;
        }

        if distance < self.config.tap_threshold {
            Some(Gesture::Tap { position: end })
        } else if distance >= self.config.swipe_threshold {
            SwipeDirection::from_delta(delta).map(|direction| Gesture::Swipe {
                direction,
                delta,
                duration_ms: (event.time_ms - session.start_ms).max(0.0),
            })
        } else {
            None
        }
    }
}
