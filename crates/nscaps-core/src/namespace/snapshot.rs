//! The namespace snapshot delivered by discovery.
//!
//! A snapshot is built once and only read afterwards, so it can be shared
//! between concurrent queries without any locking.

use std::collections::HashMap;
use std::path::Path;

use nscaps_common::constants::MAX_USERNS_NESTING;
use nscaps_common::error::{NscapsError, Result};
use nscaps_common::types::{NamespaceId, NamespaceRef, Pid};
use serde::{Deserialize, Serialize};

use super::{Namespace, Process};

/// On-disk JSON layout of a snapshot.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotDocument {
    #[serde(default)]
    namespaces: Vec<Namespace>,
    #[serde(default)]
    processes: Vec<Process>,
}

/// Discovered namespaces and processes, indexed by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    namespaces: HashMap<NamespaceId, Namespace>,
    processes: HashMap<Pid, Process>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a namespace, replacing any namespace with the same identity.
    #[must_use]
    pub fn with_namespace(mut self, ns: Namespace) -> Self {
        let _ = self.namespaces.insert(ns.id, ns);
        self
    }

    /// Adds a process, replacing any process with the same PID.
    #[must_use]
    pub fn with_process(mut self, proc: Process) -> Self {
        let _ = self.processes.insert(proc.pid, proc);
        self
    }

    /// Parses a snapshot from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: SnapshotDocument = serde_json::from_str(json)?;
        let snapshot = doc
            .namespaces
            .into_iter()
            .fold(Self::new(), Self::with_namespace);
        Ok(doc
            .processes
            .into_iter()
            .fold(snapshot, Self::with_process))
    }

    /// Loads a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading namespace snapshot");
        let content = std::fs::read_to_string(path).map_err(|e| NscapsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let snapshot = Self::from_json(&content)?;
        tracing::info!(
            namespaces = snapshot.namespaces.len(),
            processes = snapshot.processes.len(),
            "namespace snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Serializes the snapshot into JSON, namespaces and processes sorted
    /// by identity.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let mut doc = SnapshotDocument {
            namespaces: self.namespaces.values().cloned().collect(),
            processes: self.processes.values().cloned().collect(),
        };
        doc.namespaces.sort_by_key(|ns| ns.id);
        doc.processes.sort_by_key(|proc| proc.pid);
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Returns the namespace with the given identity.
    #[must_use]
    pub fn namespace(&self, id: NamespaceId) -> Option<&Namespace> {
        self.namespaces.get(&id)
    }

    /// Returns the process with the given PID.
    #[must_use]
    pub fn get_process(&self, pid: Pid) -> Option<&Process> {
        self.processes.get(&pid)
    }

    /// Looks up a process.
    ///
    /// # Errors
    ///
    /// Returns [`NscapsError::NotFound`] for an unknown PID.
    pub fn process(&self, pid: Pid) -> Result<&Process> {
        self.get_process(pid).ok_or_else(|| NscapsError::NotFound {
            kind: "process",
            id: pid.to_string(),
        })
    }

    /// Looks up the namespace a reference points to.
    ///
    /// # Errors
    ///
    /// Returns [`NscapsError::NotFound`] if no namespace has the referenced
    /// identity, or if its kind differs from the referenced kind.
    pub fn lookup(&self, reference: NamespaceRef) -> Result<&Namespace> {
        self.namespace(reference.id)
            .filter(|ns| reference.kind.is_none_or(|kind| kind == ns.kind))
            .ok_or_else(|| NscapsError::NotFound {
                kind: "namespace",
                id: reference.to_string(),
            })
    }

    /// Returns the user namespace owning `ns`, or `ns` itself if it is a
    /// user namespace.
    ///
    /// # Errors
    ///
    /// Returns [`NscapsError::MissingOwner`] if a non-user namespace has no
    /// owner, or its owner is not part of the snapshot.
    pub fn owning_user_namespace<'a>(&'a self, ns: &'a Namespace) -> Result<&'a Namespace> {
        if ns.is_user() {
            return Ok(ns);
        }
        ns.owner
            .and_then(|owner| self.namespace(owner))
            .filter(|owner| owner.is_user())
            .ok_or(NscapsError::MissingOwner { namespace: ns.id })
    }

    /// Returns the user namespace `start` followed by all its ancestors,
    /// ending in the root of its hierarchy.
    ///
    /// # Errors
    ///
    /// Returns [`NscapsError::BrokenHierarchy`] if a parent is missing or not
    /// a user namespace, or the chain is longer than the kernel permits
    /// (which includes parent cycles).
    pub fn user_ancestry(&self, start: NamespaceId) -> Result<Vec<&Namespace>> {
        let mut ancestry = Vec::new();
        let mut next = Some(start);
        while let Some(id) = next {
            if ancestry.len() > MAX_USERNS_NESTING {
                return Err(NscapsError::BrokenHierarchy { namespace: id });
            }
            let userns = self
                .namespace(id)
                .filter(|ns| ns.is_user())
                .ok_or(NscapsError::BrokenHierarchy { namespace: id })?;
            ancestry.push(userns);
            next = userns.parent;
        }
        Ok(ancestry)
    }

    /// Returns the number of namespaces.
    #[must_use]
    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    /// Returns the number of processes.
    #[must_use]
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }
}

#[cfg(test)]
mod tests {
    use nscaps_common::types::NamespaceKind;

    use super::*;
    use crate::test_utils::{self, NET0, NET2, U0, U1, U2};

    #[test]
    fn ancestry_climbs_to_root() {
        let snapshot = test_utils::snapshot();
        let ids: Vec<_> = snapshot
            .user_ancestry(U2)
            .expect("should climb")
            .iter()
            .map(|ns| ns.id)
            .collect();
        assert_eq!(ids, vec![U2, U1, U0]);
    }

    #[test]
    fn ancestry_of_root_is_root() {
        let snapshot = test_utils::snapshot();
        let ancestry = snapshot.user_ancestry(U0).expect("should climb");
        assert_eq!(ancestry.len(), 1);
    }

    #[test]
    fn ancestry_detects_cycles() {
        let a = NamespaceId::new(1);
        let b = NamespaceId::new(2);
        let snapshot = Snapshot::new()
            .with_namespace(Namespace::user(a, Some(b), 0))
            .with_namespace(Namespace::user(b, Some(a), 0));
        let err = snapshot.user_ancestry(a).expect_err("should detect cycle");
        assert!(matches!(err, NscapsError::BrokenHierarchy { .. }));
    }

    #[test]
    fn ancestry_detects_dangling_parent() {
        let a = NamespaceId::new(1);
        let snapshot = Snapshot::new().with_namespace(Namespace::user(a, Some(NamespaceId::new(99)), 0));
        let err = snapshot.user_ancestry(a).expect_err("should fail");
        assert!(
            matches!(err, NscapsError::BrokenHierarchy { namespace } if namespace.ino() == 99)
        );
    }

    #[test]
    fn deepest_permitted_nesting_is_accepted() {
        let snapshot = (0..=MAX_USERNS_NESTING as u64).fold(Snapshot::new(), |s, level| {
            let parent = level.checked_sub(1).map(NamespaceId::new);
            s.with_namespace(Namespace::user(NamespaceId::new(level), parent, 0))
        });
        let leaf = NamespaceId::new(MAX_USERNS_NESTING as u64);
        let ancestry = snapshot.user_ancestry(leaf).expect("should climb");
        assert_eq!(ancestry.len(), MAX_USERNS_NESTING + 1);
    }

    #[test]
    fn owner_of_user_namespace_is_itself() {
        let snapshot = test_utils::snapshot();
        let u1 = snapshot.namespace(U1).expect("U1");
        let owner = snapshot.owning_user_namespace(u1).expect("should resolve");
        assert_eq!(owner.id, U1);
    }

    #[test]
    fn owner_of_net_namespace_is_recorded_owner() {
        let snapshot = test_utils::snapshot();
        let net2 = snapshot.namespace(NET2).expect("NET2");
        let owner = snapshot.owning_user_namespace(net2).expect("should resolve");
        assert_eq!(owner.id, U2);
    }

    #[test]
    fn missing_owner_is_reported() {
        let mut orphan = Namespace::owned(NamespaceKind::Net, NamespaceId::new(5), U0);
        orphan.owner = None;
        let snapshot = test_utils::snapshot();
        let err = snapshot.owning_user_namespace(&orphan).expect_err("should fail");
        assert!(matches!(err, NscapsError::MissingOwner { namespace } if namespace.ino() == 5));
    }

    #[test]
    fn lookup_checks_kind() {
        let snapshot = test_utils::snapshot();
        let found = snapshot
            .lookup(NamespaceRef::parse(&format!("net:[{NET0}]")).expect("ref"))
            .expect("should find");
        assert_eq!(found.id, NET0);
        assert!(snapshot
            .lookup(NamespaceRef::parse(&format!("pid:[{NET0}]")).expect("ref"))
            .is_err());
        assert!(snapshot
            .lookup(NamespaceRef::parse(&NET0.to_string()).expect("ref"))
            .is_ok());
    }

    #[test]
    fn unknown_process_is_not_found() {
        let snapshot = test_utils::snapshot();
        let msg = snapshot.process(4242).expect_err("should fail").to_string();
        assert_eq!(msg, "process not found: 4242");
    }

    #[test]
    fn json_round_trip_preserves_snapshot() {
        let snapshot = test_utils::snapshot();
        let json = snapshot.to_json().expect("should serialize");
        let restored = Snapshot::from_json(&json).expect("should parse");
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn load_reads_json_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("snapshot.json");
        std::fs::write(
            &path,
            r#"{
                "namespaces": [
                    {"id": 1, "kind": "user", "owner_uid": 0, "leaders": [1]},
                    {"id": 2, "kind": "net", "owner": 1}
                ],
                "processes": [
                    {"pid": 1, "name": "init", "euid": 0, "namespaces": {"user": 1, "net": 2}}
                ]
            }"#,
        )
        .expect("write");
        let snapshot = Snapshot::load(&path).expect("should load");
        assert_eq!(snapshot.namespace_count(), 2);
        assert_eq!(snapshot.process_count(), 1);
        let init = snapshot.process(1).expect("init");
        assert_eq!(init.namespace(NamespaceKind::Net), Some(NamespaceId::new(2)));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Snapshot::load(&dir.path().join("absent.json")).expect_err("should fail");
        assert!(matches!(err, NscapsError::Io { .. }));
    }
}
