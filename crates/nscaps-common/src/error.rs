//! Unified error types for the nscaps workspace.
//!
//! Classification and merge failures abort a single query and carry the
//! PID or namespace that triggered them. Unreadable process status is not
//! an error anywhere in the workspace; it degrades to "no capabilities".

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{NamespaceId, Pid};

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum NscapsError {
    /// The process has no resolvable user namespace membership.
    #[error("cannot access namespace information of process PID {pid}")]
    MissingNamespaceInfo {
        /// Process whose membership could not be resolved.
        pid: Pid,
    },

    /// The effective UID of the process is unknown, so the owner rule
    /// cannot be evaluated.
    #[error("cannot query effective UID of process PID {pid}")]
    UnknownEffectiveUid {
        /// Process whose effective UID is unknown.
        pid: Pid,
    },

    /// A user namespace lacks the UID of its owner, so the owner rule
    /// cannot be evaluated.
    #[error("cannot query owner UID of user namespace {namespace}")]
    UnknownOwnerUid {
        /// User namespace without owner UID.
        namespace: NamespaceId,
    },

    /// A non-user namespace lacks its owning user namespace.
    #[error("cannot access owning user namespace information of target namespace {namespace}")]
    MissingOwner {
        /// Namespace without owner.
        namespace: NamespaceId,
    },

    /// The process and target chains do not share a root user namespace.
    #[error("process PID {pid} and target namespace {namespace} live in disjoint user namespace hierarchies")]
    DisjointHierarchy {
        /// Process of the query.
        pid: Pid,
        /// Target namespace of the query.
        namespace: NamespaceId,
    },

    /// A user namespace hierarchy is dangling, cyclic, or deeper than the
    /// kernel allows.
    #[error("broken user namespace hierarchy at {namespace}")]
    BrokenHierarchy {
        /// Namespace where climbing had to stop.
        namespace: NamespaceId,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// A textual namespace reference could not be parsed.
    #[error("not a valid namespace: {input:?}")]
    InvalidReference {
        /// The offending input.
        input: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, NscapsError>;
