/// Errors a bus adapter can report for a single frame.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// An I/O error occurred while writing the frame.
    #[error("bus I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The identifier cannot be represented on this bus.
    #[error("invalid CAN identifier 0x{0:X}")]
    InvalidId(u32),

    /// The device rejected the frame.
    #[error("device error: {0}")]
    Device(String),

    /// The bus has been closed.
    #[error("bus closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, BusError>;
