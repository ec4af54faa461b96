/// Errors that can occur while building sensor frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The identifier does not fit a 29-bit extended CAN identifier.
    #[error("identifier 0x{id:X} exceeds extended CAN range (max 0x{max:X})")]
    IdOutOfRange { id: u64, max: u32 },

    /// The payload does not fit a classic CAN frame.
    #[error("payload too long ({len} bytes, max {max})")]
    PayloadTooLong { len: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
