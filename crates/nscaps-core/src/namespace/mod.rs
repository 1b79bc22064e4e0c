//! Read-only model of discovered Linux namespaces and processes.
//!
//! Discovery itself happens elsewhere; this module only describes what it
//! delivers. User namespaces form a parent/child hierarchy and record the
//! UID of their creator, all other namespaces record their owning user
//! namespace.

pub mod snapshot;

use std::collections::BTreeMap;

use nscaps_common::types::{NamespaceId, NamespaceKind, Pid, Uid};
use serde::{Deserialize, Serialize};

pub use snapshot::Snapshot;

/// A single namespace as seen by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Namespace identity.
    pub id: NamespaceId,
    /// Namespace kind.
    pub kind: NamespaceKind,
    /// Owning user namespace; only set for non-user namespaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<NamespaceId>,
    /// Parent user namespace; only set for non-initial user namespaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NamespaceId>,
    /// UID of the creator of a user namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_uid: Option<Uid>,
    /// Topmost processes attached to this namespace.
    #[serde(default)]
    pub leaders: Vec<Pid>,
}

impl Namespace {
    /// Creates a user namespace below `parent`, created by `owner_uid`.
    #[must_use]
    pub const fn user(id: NamespaceId, parent: Option<NamespaceId>, owner_uid: Uid) -> Self {
        Self {
            id,
            kind: NamespaceKind::User,
            owner: None,
            parent,
            owner_uid: Some(owner_uid),
            leaders: Vec::new(),
        }
    }

    /// Creates a non-user namespace owned by the user namespace `owner`.
    #[must_use]
    pub const fn owned(kind: NamespaceKind, id: NamespaceId, owner: NamespaceId) -> Self {
        Self {
            id,
            kind,
            owner: Some(owner),
            parent: None,
            owner_uid: None,
            leaders: Vec::new(),
        }
    }

    /// Sets the leader processes of this namespace.
    #[must_use]
    pub fn with_leaders(mut self, leaders: impl Into<Vec<Pid>>) -> Self {
        self.leaders = leaders.into();
        self
    }

    /// Returns `true` if this is a user namespace.
    #[must_use]
    pub const fn is_user(&self) -> bool {
        self.kind.is_user()
    }
}

/// A process and the namespaces it is currently attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    /// Process ID in the initial PID namespace.
    pub pid: Pid,
    /// Parent process ID, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppid: Option<Pid>,
    /// Process name.
    #[serde(default)]
    pub name: String,
    /// Effective UID, if discovery could determine it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub euid: Option<Uid>,
    /// Current namespace of each kind.
    #[serde(default)]
    pub namespaces: BTreeMap<NamespaceKind, NamespaceId>,
}

impl Process {
    /// Creates a process without namespace memberships.
    #[must_use]
    pub fn new(pid: Pid, name: impl Into<String>) -> Self {
        Self {
            pid,
            ppid: None,
            name: name.into(),
            euid: None,
            namespaces: BTreeMap::new(),
        }
    }

    /// Attaches the process to a namespace of the given kind.
    #[must_use]
    pub fn with_namespace(mut self, kind: NamespaceKind, id: NamespaceId) -> Self {
        let _ = self.namespaces.insert(kind, id);
        self
    }

    /// Records the effective UID.
    #[must_use]
    pub const fn with_euid(mut self, euid: Uid) -> Self {
        self.euid = Some(euid);
        self
    }

    /// Returns the current namespace of the given kind.
    #[must_use]
    pub fn namespace(&self, kind: NamespaceKind) -> Option<NamespaceId> {
        self.namespaces.get(&kind).copied()
    }

    /// Returns the user namespace the process is attached to.
    #[must_use]
    pub fn user_namespace(&self) -> Option<NamespaceId> {
        self.namespace(NamespaceKind::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_memberships_are_per_kind() {
        let proc = Process::new(42, "sleep")
            .with_namespace(NamespaceKind::User, NamespaceId::new(1))
            .with_namespace(NamespaceKind::Net, NamespaceId::new(2));
        assert_eq!(proc.user_namespace(), Some(NamespaceId::new(1)));
        assert_eq!(proc.namespace(NamespaceKind::Net), Some(NamespaceId::new(2)));
        assert_eq!(proc.namespace(NamespaceKind::Pid), None);
    }

    #[test]
    fn user_namespace_has_no_owner() {
        let ns = Namespace::user(NamespaceId::new(7), None, 0);
        assert!(ns.is_user());
        assert_eq!(ns.owner, None);
        assert_eq!(ns.owner_uid, Some(0));
    }

    #[test]
    fn namespace_deserializes_with_defaults() {
        let ns: Namespace = serde_json::from_str(r#"{"id": 5, "kind": "net", "owner": 1}"#)
            .expect("should deserialize");
        assert_eq!(ns, Namespace::owned(NamespaceKind::Net, NamespaceId::new(5), NamespaceId::new(1)));
    }
}
