//! Query entry point: capabilities of a process in a target namespace.

use nscaps_common::constants::INIT_PID;
use nscaps_common::error::Result;
use nscaps_common::types::{CapabilityLevel, Pid};

use crate::branch::{self, BranchTree, ProcessChain, TargetChain};
use crate::capability::{self, ProcFs, ProcessStatus, StatusSource};
use crate::classify::{self, Classification};
use crate::namespace::{Namespace, Process, Snapshot};

/// Resolves capability queries against a namespace snapshot.
///
/// The resolver holds no mutable state; the only I/O it performs is
/// reading the status of the queried process.
#[derive(Debug)]
pub struct Resolver<'a, S = ProcFs> {
    snapshot: &'a Snapshot,
    status: S,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver reading process status from `/proc`.
    #[must_use]
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self::with_status_source(snapshot, ProcFs::default())
    }
}

impl<'a, S: StatusSource> Resolver<'a, S> {
    /// Creates a resolver reading process status from `status`.
    #[must_use]
    pub const fn with_status_source(snapshot: &'a Snapshot, status: S) -> Self {
        Self { snapshot, status }
    }

    /// Returns the snapshot queries run against.
    #[must_use]
    pub const fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    /// Returns the effective capability names of `pid`; empty if its
    /// status cannot be read.
    pub fn capabilities_of(&self, pid: Pid) -> Vec<String> {
        capability::capabilities_of(&self.status, pid)
    }

    /// Classifies the capabilities `process` has in `target`.
    ///
    /// The effective UID comes from the snapshot, or else from the
    /// process status.
    ///
    /// # Errors
    ///
    /// Returns an error if the process' or the target's user namespace
    /// cannot be resolved, or the owner rule needs an unknown effective UID.
    pub fn classify(&self, process: &Process, target: &Namespace) -> Result<Classification> {
        let euid = process
            .euid
            .or_else(|| capability::process_status(&self.status, process.pid).euid);
        classify::classify(self.snapshot, process, target, euid)
    }

    /// Builds the merged tree of `process` and `target`, annotated with
    /// the capabilities the process has along the way.
    ///
    /// # Errors
    ///
    /// Returns an error if classification fails, or the process and target
    /// do not share a user namespace hierarchy.
    pub fn resolve_tree(&self, process: &'a Process, target: &'a Namespace) -> Result<BranchTree<'a>> {
        let status = capability::process_status(&self.status, process.pid);
        let euid = process.euid.or(status.euid);
        let classification = classify::classify(self.snapshot, process, target, euid)?;
        tracing::debug!(
            pid = process.pid,
            target = %target.id,
            level = ?classification.level,
            "classified process capabilities"
        );
        let ProcessStatus { effective, .. } = status;
        let process_chain = ProcessChain::build(
            self.snapshot,
            process,
            euid,
            capability::caps_to_names(&effective),
        )?;
        let target_chain = TargetChain::build(self.snapshot, target, classification.level)?;
        branch::merge(process_chain, target_chain)
    }

    /// Returns the capabilities `process` gains in a namespace classified
    /// as `level`: none, its own effective set, or the full set held by
    /// the initial process.
    pub fn target_capabilities(&self, process: &Process, level: CapabilityLevel) -> Vec<String> {
        match level {
            CapabilityLevel::None => Vec::new(),
            CapabilityLevel::Effective => self.capabilities_of(process.pid),
            CapabilityLevel::Full => self.capabilities_of(INIT_PID),
        }
    }
}
