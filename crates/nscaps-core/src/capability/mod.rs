//! Effective capabilities of processes.
//!
//! Reads a process' status record through a [`StatusSource`], parses the
//! `CapEff` bitmask and maps the set bits to capability names. Processes
//! whose status cannot be read simply have no known capabilities.

pub mod names;
pub mod status;

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use nscaps_common::constants::{DEFAULT_PROC_ROOT, STATUS_FILE};
use nscaps_common::types::Pid;

pub use names::{CAPABILITY_NAMES, caps_to_names};
pub use status::ProcessStatus;

/// Provider of per-process status text, as found in `/proc/<pid>/status`.
pub trait StatusSource {
    /// Returns the complete status text of process `pid`.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be read, for instance because
    /// the process has exited or access is denied.
    fn read_status(&self, pid: Pid) -> io::Result<String>;
}

/// Status source backed by a mounted proc filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcFs {
    root: PathBuf,
}

impl ProcFs {
    /// Creates a source reading below `root` instead of `/proc`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the path of the status file of `pid`.
    #[must_use]
    pub fn status_path(&self, pid: Pid) -> PathBuf {
        self.root.join(pid.to_string()).join(STATUS_FILE)
    }
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

impl StatusSource for ProcFs {
    fn read_status(&self, pid: Pid) -> io::Result<String> {
        std::fs::read_to_string(self.status_path(pid))
    }
}

/// In-memory status texts keyed by PID; unknown PIDs read as not found.
impl<S: std::hash::BuildHasher> StatusSource for HashMap<Pid, String, S> {
    fn read_status(&self, pid: Pid) -> io::Result<String> {
        self.get(&pid)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no status for PID {pid}")))
    }
}

impl<T: StatusSource + ?Sized> StatusSource for &T {
    fn read_status(&self, pid: Pid) -> io::Result<String> {
        (**self).read_status(pid)
    }
}

/// Reads and parses the status of `pid`; unreadable status yields an
/// empty [`ProcessStatus`].
pub fn process_status(source: &impl StatusSource, pid: Pid) -> ProcessStatus {
    match source.read_status(pid) {
        Ok(text) => {
            tracing::trace!(pid, "read process status");
            ProcessStatus::parse(&text)
        }
        Err(e) => {
            tracing::debug!(pid, error = %e, "process status unavailable");
            ProcessStatus::default()
        }
    }
}

/// Returns the names of the effective capabilities of `pid`, ordered by
/// bit number.
pub fn capabilities_of(source: &impl StatusSource, pid: Pid) -> Vec<String> {
    caps_to_names(&process_status(source, pid).effective)
}
