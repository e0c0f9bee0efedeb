use std::collections::VecDeque;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Idle,
    Processing,
}

/// A discovered source and the moment it was offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeItem {
    pub path: PathBuf,
    pub discovered_at: String,
}

impl IntakeItem {
    pub fn new(path: impl Into<PathBuf>, discovered_at: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            discovered_at: discovered_at.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Offer {
    /// The queue was idle; the caller must start processing this item now.
    Start(IntakeItem),
    /// Something is already in flight; the path waits at this pending position.
    Queued { position: usize },
}

/// One-at-a-time intake queue. Every offered path is processed exactly once
/// per offer, in arrival order, and never two at the same time.
#[derive(Debug)]
pub struct IntakeQueue {
    state: QueueState,
    in_flight: Option<IntakeItem>,
    pending: VecDeque<IntakeItem>,
}

impl Default for IntakeQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeQueue {
    pub fn new() -> Self {
        Self {
            state: QueueState::Idle,
            in_flight: None,
            pending: VecDeque::new(),
        }
    }

    pub fn offer(&mut self, item: IntakeItem) -> Offer {
        match self.state {
            QueueState::Idle => {
                self.state = QueueState::Processing;
                self.in_flight = Some(item.clone());
                Offer::Start(item)
            }
            QueueState::Processing => {
                self.pending.push_back(item);
                Offer::Queued {
                    position: self.pending.len(),
                }
            }
        }
    }

    /// Finishes the in-flight item and hands back the next one, if any.
    pub fn complete(&mut self) -> Option<IntakeItem> {
        match self.pending.pop_front() {
            Some(next) => {
                self.in_flight = Some(next.clone());
                Some(next)
            }
            None => {
                self.state = QueueState::Idle;
                self.in_flight = None;
                None
            }
        }
    }

    /// Drops everything that has not started yet.
    pub fn clear_pending(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    pub fn in_flight(&self) -> Option<&Path> {
        self.in_flight.as_ref().map(|item| item.path.as_path())
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
