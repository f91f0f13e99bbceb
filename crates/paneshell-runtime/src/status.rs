#![forbid(unsafe_code)]

//! Status bar updates routed through the task pool.
//!
//! The UI thread calls [`StatusController::update`]; formatting runs on a
//! pool worker and the result comes back as a [`StatusEvent`] on a channel.
//! The UI thread later calls [`StatusController::drain`] to apply pending
//! events to its [`StatusBar`]. Workers never touch UI state directly.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use paneshell_core::StatusConfig;

use crate::pool::{Task, TaskHandle, TaskPool};

/// A change to apply to the status bar on the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    Text(String),
    Busy(bool),
    Cleared,
}

/// UI-side state of the status bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBar {
    pub text: String,
    /// Mirrors `text`.
    pub tooltip: String,
    pub busy: bool,
}

impl StatusBar {
    #[must_use]
    pub fn new(initial_text: impl Into<String>) -> Self {
        let text = initial_text.into();
        Self {
            tooltip: text.clone(),
            text,
            busy: false,
        }
    }

    pub fn apply(&mut self, event: StatusEvent) {
        match event {
            StatusEvent::Text(text) => {
                self.tooltip.clone_from(&text);
                self.text = text;
            }
            StatusEvent::Busy(busy) => self.busy = busy,
            StatusEvent::Cleared => {
                self.text.clear();
                self.tooltip.clear();
            }
        }
    }
}

type Formatter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Offloads status text formatting onto a shared [`TaskPool`].
pub struct StatusController {
    pool: Arc<TaskPool>,
    tag: String,
    initial_text: String,
    formatter: Formatter,
    sender: Sender<StatusEvent>,
    receiver: Receiver<StatusEvent>,
}

impl std::fmt::Debug for StatusController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusController")
            .field("tag", &self.tag)
            .field("initial_text", &self.initial_text)
            .finish_non_exhaustive()
    }
}

impl StatusController {
    #[must_use]
    pub fn new(config: &StatusConfig, pool: Arc<TaskPool>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            pool,
            tag: config.tag.clone(),
            initial_text: config.initial_text.clone(),
            formatter: Arc::new(|text: &str| text.trim().to_string()),
            sender,
            receiver,
        }
    }

    /// Replace the text transform run on the worker. The default trims
    /// surrounding whitespace.
    #[must_use]
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.formatter = Arc::new(formatter);
        self
    }

    /// Status bar in its initial state.
    #[must_use]
    pub fn initial_bar(&self) -> StatusBar {
        StatusBar::new(self.initial_text.clone())
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn pool(&self) -> &Arc<TaskPool> {
        &self.pool
    }

    /// Format `text` on the pool and queue the result for [`drain`](Self::drain).
    ///
    /// Returns `None` if the pool is shutting down. A job that observes a
    /// cancel request for the status tag drops its result.
    pub fn update(&self, text: impl Into<String>) -> Option<TaskHandle> {
        let text = text.into();
        let sender = self.sender.clone();
        let formatter = Arc::clone(&self.formatter);
        let handle = self.pool.submit(
            Task::new(move |token| {
                if token.is_cancelled() {
                    return;
                }
                let formatted = formatter(&text);
                // The receiver only goes away with the controller.
                let _ = sender.send(StatusEvent::Text(formatted));
            })
            .tag(self.tag.clone()),
        );
        if handle.is_none() {
            tracing::debug!(target: "paneshell.status", "status update dropped; pool shutting down");
        }
        handle
    }

    /// Toggle the busy indicator.
    pub fn set_busy(&self, busy: bool) {
        let _ = self.sender.send(StatusEvent::Busy(busy));
    }

    /// Blank the status text. An update already in flight may still land
    /// after the clear.
    pub fn clear(&self) {
        let _ = self.sender.send(StatusEvent::Cleared);
    }

    /// Drop results of in-flight updates until [`resume`](Self::resume).
    pub fn cancel_pending(&self) {
        self.pool.request_cancel(&self.tag);
    }

    pub fn resume(&self) {
        self.pool.clear_cancel(&self.tag);
    }

    /// Apply every pending event to `bar`. Returns the number applied.
    pub fn drain(&self, bar: &mut StatusBar) -> usize {
        let mut applied = 0;
        for event in self.receiver.try_iter() {
            tracing::trace!(target: "paneshell.status", event = ?event, "status event applied");
            bar.apply(event);
            applied += 1;
        }
        applied
    }
}
