//! Bus capability consumed by the DUT-EM emulator.
//!
//! The emulator only ever needs to hand one frame at a time to a bus. This
//! crate defines that seam ([`FrameSink`]) and a few adapters:
//! - [`LineWriter`]: `cansend`-style text lines on any `Write`
//! - [`RecordingBus`]: in-memory capture, shareable across threads
//! - [`EmbeddedCanBus`]: any `embedded_can::blocking::Can` device (behind `embedded-can`)

pub mod error;
pub mod recording;
pub mod traits;
pub mod writer;

#[cfg(feature = "embedded-can")]
pub mod embedded;

pub use error::{BusError, Result};
pub use recording::RecordingBus;
pub use traits::{sink_fn, FnSink, FrameSink};
pub use writer::{LineWriter, LineWriterConfig};

#[cfg(feature = "embedded-can")]
pub use embedded::EmbeddedCanBus;

pub use dutem_frame::CanFrame;
