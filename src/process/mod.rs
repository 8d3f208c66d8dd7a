use std::fmt;

pub mod executor;
pub mod foreground;
pub mod signal;

pub use executor::{spawn_command, wait_foreground};
pub use foreground::ForegroundSlot;
pub use signal::SignalRelay;

#[derive(Debug)]
pub enum ProcessError {
    CommandNotFound(String),
    InputRedirect(String, std::io::Error),
    OutputRedirect(String, std::io::Error),
    Spawn(std::io::Error),
    Wait(std::io::Error),
    SignalSetup(String),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::CommandNotFound(cmd) => write!(f, "command not found: {}", cmd),
            ProcessError::InputRedirect(path, err) => {
                write!(f, "cannot open {} for reading: {}", path, err)
            }
            ProcessError::OutputRedirect(path, err) => {
                write!(f, "cannot open {} for writing: {}", path, err)
            }
            ProcessError::Spawn(err) => write!(f, "failed to start process: {}", err),
            ProcessError::Wait(err) => write!(f, "failed to wait for child: {}", err),
            ProcessError::SignalSetup(msg) => write!(f, "signal setup failed: {}", msg),
        }
    }
}

impl std::error::Error for ProcessError {}
