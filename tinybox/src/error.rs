//! Error taxonomy for the VM, filestore, and shell (spec.md §7).
//!
//! The VM itself never panics or unwinds on a malformed guest program —
//! faults are represented as values (see `cpu::StepOutcome`). `VmError` only
//! covers the load-time failure a caller can actually act on.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum VmError {
    #[error("program is {len} bytes, exceeds the {max}-byte memory")]
    ImageTooLarge { len: usize, max: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("file name too long (max 63 bytes): {0}")]
    NameTooLong(String),
    #[error("filestore is full (64 entries)")]
    StoreFull,
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error(transparent)]
    Fs(#[from] FsError),
    #[error(transparent)]
    Vm(#[from] VmError),
    #[error("usage: {0}")]
    Usage(String),
}
