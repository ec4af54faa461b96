//! Periodic multi-channel DUT-EM fuel-level sensor emulator.
//!
//! Configure channels on an [`Emulator`], then [`Emulator::start`] it with any
//! [`FrameSink`]. A single background task sweeps the channels and submits one
//! frame per enabled channel until the session is stopped.
//!
//! ```no_run
//! # async fn demo() {
//! use dutem_bus::RecordingBus;
//! use dutem_emulator::Emulator;
//!
//! let emulator = Emulator::default();
//! emulator.enable(0);
//! emulator.set(0, 0.25, -10);
//!
//! let bus = RecordingBus::new();
//! let handle = emulator.start(bus.clone()).expect("session was idle");
//! // ...
//! emulator.stop();
//! let report = handle.wait().await.expect("emission task panicked");
//! println!("sent {} frames", report.frames_sent);
//! # }
//! ```

pub mod config;
mod emitter;
pub mod error;
pub mod session;
pub mod state;
pub mod store;

pub use config::{EmulatorConfig, SweepMode};
pub use emitter::EmissionReport;
pub use error::{EmulatorError, Result};
pub use session::{EmissionHandle, Emulator};
pub use state::SessionState;
pub use store::{ChannelParams, ChannelStore};

pub use dutem_bus::FrameSink;
