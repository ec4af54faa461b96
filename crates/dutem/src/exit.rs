use std::fmt;
use std::io;

use dutem_emulator::EmulatorError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const BUS_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn emulator_error(context: &str, err: EmulatorError) -> CliError {
    match err {
        EmulatorError::InvalidConfig(_) => CliError::new(USAGE, format!("{context}: {err}")),
        EmulatorError::TaskFailed(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}
