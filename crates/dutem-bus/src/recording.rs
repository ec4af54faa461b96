use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dutem_frame::CanFrame;

use crate::error::{BusError, Result};
use crate::traits::FrameSink;

/// In-memory bus that keeps every frame it accepts.
///
/// Clones share the same capture, so one clone can be handed to the emulator
/// while another is inspected.
#[derive(Debug, Clone, Default)]
pub struct RecordingBus {
    frames: Arc<Mutex<Vec<CanFrame>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all frames accepted so far, in submission order.
    pub fn frames(&self) -> Vec<CanFrame> {
        self.lock().clone()
    }

    /// Identifiers of all accepted frames, in submission order.
    pub fn ids(&self) -> Vec<u32> {
        self.lock().iter().map(|frame| frame.id).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop everything captured so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// While set, every send fails with [`BusError::Device`] and nothing is recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CanFrame>> {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FrameSink for RecordingBus {
    fn send(&mut self, frame: &CanFrame) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BusError::Device("simulated bus failure".to_string()));
        }
        self.lock().push(*frame);
        Ok(())
    }
}
