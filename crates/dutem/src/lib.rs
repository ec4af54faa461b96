//! DUT-EM fuel-level sensor emulator for CAN buses.
//!
//! Emulates up to N fuel-level sensors (8 by default) that each report their
//! level and temperature on their own CAN identifier once per interval.
//!
//! # Crate Structure
//!
//! - [`frame`]: CAN frame value type, identifier scheme and reading encoding
//! - [`bus`]: The send-one-frame capability and its adapters
//! - [`emulator`]: Channel store, session lifecycle and the periodic emitter

/// Re-export frame types.
pub mod frame {
    pub use dutem_frame::*;
}

/// Re-export bus types.
pub mod bus {
    pub use dutem_bus::*;
}

/// Re-export emulator types.
pub mod emulator {
    pub use dutem_emulator::*;
}

pub use dutem_bus::{FrameSink, LineWriter, RecordingBus};
pub use dutem_emulator::{EmissionHandle, EmissionReport, Emulator, EmulatorConfig, SweepMode};
pub use dutem_frame::CanFrame;
