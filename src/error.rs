use std::ffi::NulError;
use std::io;
use std::path::PathBuf;

use nix::errno::Errno;

/// Failures seen by the interpreter process itself.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("fork failed: {0}")]
    Fork(Errno),

    #[error("expected filename after '{operator}'")]
    MalformedRedirection { operator: char },

    #[error("cd: {}: {source}", path.display())]
    DirectoryChange {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("waiting for child failed: {0}")]
    Wait(Errno),

    #[error("argument contains a NUL byte")]
    NulByte(#[from] NulError),

    #[error("input line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("failed to install signal handler: {0}")]
    Signal(Errno),

    #[error("{0}")]
    Usage(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Whether the interpreter has to stop instead of re-prompting.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Fork(_) | ShellError::Signal(_))
    }
}

pub type Result<T> = std::result::Result<T, ShellError>;

/// Failures inside a forked child, before the program image is replaced.
/// They never reach the parent except through the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildFailure {
    RedirectionOpen,
    RedirectionWire,
    Exec,
}

impl ChildFailure {
    pub fn exit_code(self) -> i32 {
        match self {
            ChildFailure::RedirectionOpen => 1,
            ChildFailure::RedirectionWire | ChildFailure::Exec => 2,
        }
    }
}
