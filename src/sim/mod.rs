//! Game simulation core
//!
//! Everything here is platform independent and deterministic for a seed:
//! - `game_loop`: the not-started / running / ended loop every game runs in
//! - `scheduler`: frame request/cancel boundary to the host
//! - `outcome`: terminal conditions and the presentation boundary
//! - `geom`: axis-aligned bounding boxes
//! - `layout`: bounded rejection sampling for randomized placement

pub mod game_loop;
pub mod geom;
pub mod layout;
pub mod outcome;
pub mod scheduler;

pub use game_loop::{Effects, Game, GameLoop, LoopPhase, Services};
pub use geom::Rect;
pub use layout::{DEFAULT_ATTEMPTS, sample_distinct, sample_one};
pub use outcome::{
    LogPresenter, Outcome, OutcomePresenter, OutcomeReport, RecordingPresenter, Terminal,
};
pub use scheduler::{FrameHandle, FrameScheduler, FrameToken, ManualScheduler};
