/// Errors that can occur when creating or driving an emulator session.
#[derive(Debug, thiserror::Error)]
pub enum EmulatorError {
    /// The configuration cannot produce valid sensor frames.
    #[error("invalid emulator config: {0}")]
    InvalidConfig(String),

    /// The background task ended abnormally.
    #[error("emission task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, EmulatorError>;
