//! Input handling
//!
//! Raw pointer/touch positions are mapped into the game's logical coordinate
//! space and then classified into high-level gestures:
//! - `mapper`: display pixels -> logical canvas pixels
//! - `gesture`: single-pointer tap / swipe / drag recognizer

pub mod gesture;
pub mod mapper;

pub use gesture::{
    Gesture, GestureConfig, GestureKind, GestureRecognizer, PointerEvent, PointerPhase,
    SwipeDirection,
};
pub use mapper::{CoordinateMapper, LogicalSize, SurfaceRect, map_to_logical};
