use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;

/// Lifecycle of an emulator session.
///
/// `Disabled → Starting → Running → Stopping → Disabled`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum SessionState {
    /// No background task.
    Disabled = 0,
    /// A task has been spawned but has not begun its first pass.
    Starting = 1,
    /// The task is sweeping channels.
    Running = 2,
    /// Stop requested; the task has not exited yet.
    Stopping = 3,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Disabled => "disabled",
            SessionState::Starting => "starting",
            SessionState::Running => "running",
            SessionState::Stopping => "stopping",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => SessionState::Starting,
            2 => SessionState::Running,
            3 => SessionState::Stopping,
            _ => SessionState::Disabled,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic cell holding a [`SessionState`].
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(SessionState::Disabled as u8))
    }

    pub(crate) fn load(&self) -> SessionState {
        SessionState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move `from → to` only if the cell currently holds `from`.
    pub(crate) fn transition(&self, from: SessionState, to: SessionState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn store(&self, state: SessionState) {
        self.0.store(state as u8, Ordering::Release);
    }
}
