//! Run outcomes and the presentation boundary

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
}

/// Terminal condition reported by a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terminal {
    pub outcome: Outcome,
    pub message: String,
}

impl Terminal {
    pub fn win(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Win,
            message: message.into(),
        }
    }

    pub fn loss(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Loss,
            message: message.into(),
        }
    }
}

/// Everything the presenter gets when a run ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeReport {
    pub game: String,
    pub outcome: Outcome,
    pub message: String,
    pub score: u64,
    /// Best score before this run (None if unknown or never set)
    pub previous_best: Option<u64>,
    pub new_best: bool,
}

/// Shows win/loss screens; receives each outcome exactly once
pub trait OutcomePresenter {
    fn present(&mut self, report: &OutcomeReport);

    /// Hide any outcome screen (called on restart)
    fn dismiss(&mut self) {}
}

/// Presenter that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

impl OutcomePresenter for LogPresenter {
    fn present(&mut self, report: &OutcomeReport) {
        log::info!(
            "{} ended: {:?} - {} (score {}{})",
            report.game,
            report.outcome,
            report.message,
            report.score,
            if report.new_best { ", new best" } else { "" }
        );
    }
}

/// Presenter that keeps every report; clones share the same log
#[derive(Debug, Default, Clone)]
pub struct RecordingPresenter {
    reports: Rc<RefCell<Vec<OutcomeReport>>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<OutcomeReport> {
        self.reports.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.reports.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.borrow().is_empty()
    }
}

impl OutcomePresenter for RecordingPresenter {
    fn present(&mut self, report: &OutcomeReport) {
        self.reports.borrow_mut().push(report.clone());
    }
}
