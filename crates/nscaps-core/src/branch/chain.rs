//! Ancestor chains of a process and of a target namespace.
//!
//! Both chains are collected by climbing from the bottom towards the root
//! user namespace, and are then read top-down.

use nscaps_common::error::{NscapsError, Result};
use nscaps_common::types::{CapabilityLevel, Uid};

use super::BranchNode;
use crate::namespace::{Namespace, Process, Snapshot};

/// The user namespaces from the root down to a process, and the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessChain<'a> {
    user_namespaces: Vec<&'a Namespace>,
    process: &'a Process,
    euid: Option<Uid>,
    capabilities: Vec<String>,
}

impl<'a> ProcessChain<'a> {
    /// Builds the chain of `process`, annotated with its effective UID and
    /// effective capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`NscapsError::MissingNamespaceInfo`] if the process' user
    /// namespace is unknown, or [`NscapsError::BrokenHierarchy`] if its
    /// ancestry is broken.
    pub fn build(
        snapshot: &'a Snapshot,
        process: &'a Process,
        euid: Option<Uid>,
        capabilities: Vec<String>,
    ) -> Result<Self> {
        let userns = process
            .user_namespace()
            .filter(|id| snapshot.namespace(*id).is_some())
            .ok_or(NscapsError::MissingNamespaceInfo { pid: process.pid })?;
        let mut user_namespaces = snapshot.user_ancestry(userns)?;
        user_namespaces.reverse();
        Ok(Self {
            user_namespaces,
            process,
            euid,
            capabilities,
        })
    }

    /// Returns the process at the end of the chain.
    #[must_use]
    pub const fn process(&self) -> &'a Process {
        self.process
    }

    /// Turns the chain into branch nodes, root first and process last.
    #[must_use]
    pub fn into_nodes(self) -> Vec<BranchNode<'a>> {
        let mut nodes: Vec<_> = self
            .user_namespaces
            .into_iter()
            .map(BranchNode::namespace)
            .collect();
        nodes.push(BranchNode::Process {
            process: self.process,
            euid: self.euid,
            capabilities: self.capabilities,
        });
        nodes
    }
}

/// The user namespaces from the root down to a target namespace, and the
/// target itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetChain<'a> {
    user_namespaces: Vec<&'a Namespace>,
    target: &'a Namespace,
    level: CapabilityLevel,
}

impl<'a> TargetChain<'a> {
    /// Builds the chain of `target`, annotated with the capability level
    /// the process has in it.
    ///
    /// # Errors
    ///
    /// Returns [`NscapsError::MissingOwner`] if a non-user target has no
    /// owner, or [`NscapsError::BrokenHierarchy`] if the owner's ancestry is
    /// broken.
    pub fn build(snapshot: &'a Snapshot, target: &'a Namespace, level: CapabilityLevel) -> Result<Self> {
        let owner = snapshot.owning_user_namespace(target)?;
        let mut user_namespaces = snapshot.user_ancestry(owner.id)?;
        user_namespaces.reverse();
        Ok(Self {
            user_namespaces,
            target,
            level,
        })
    }

    /// Returns the target namespace.
    #[must_use]
    pub const fn target(&self) -> &'a Namespace {
        self.target
    }

    /// Turns the chain into branch nodes, root first and the target last.
    #[must_use]
    pub fn into_nodes(self) -> Vec<BranchNode<'a>> {
        let mut nodes: Vec<_> = self
            .user_namespaces
            .into_iter()
            .map(BranchNode::namespace)
            .collect();
        if self.target.is_user() {
            if let Some(last) = nodes.pop() {
                nodes.push(last.with_target(self.level));
            }
        } else {
            nodes.push(BranchNode::target(self.target, self.level));
        }
        nodes
    }
}

impl BranchNode<'_> {
    fn with_target(self, level: CapabilityLevel) -> Self {
        match self {
            Self::Namespace { namespace, .. } => Self::target(namespace, level),
            process @ Self::Process { .. } => process,
        }
    }
}
