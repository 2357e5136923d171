//! Seam to the external undo/redo log. The engine only announces that an
//! action is about to happen; snapshotting and restoring belong to the log.

use std::cell::RefCell;
use std::rc::Rc;

pub trait ActionRecorder {
    /// Called immediately before a gesture or batch operation mutates state,
    /// so the pre-gesture state is what gets snapshotted.
    fn record_action(&mut self, label: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecorder;

impl ActionRecorder for NoopRecorder {
    fn record_action(&mut self, _label: &str) {}
}

/// Keeps every label in order. Clones share the same log, so a caller can keep
/// a handle after giving one to the timeline.
#[derive(Debug, Default, Clone)]
pub struct ActionLog {
    labels: Rc<RefCell<Vec<String>>>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> Vec<String> {
        self.labels.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.labels.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.labels.borrow_mut().clear();
    }
}

impl ActionRecorder for ActionLog {
    fn record_action(&mut self, label: &str) {
        tracing::debug!(label, "record action");
        self.labels.borrow_mut().push(label.to_string());
    }
}
