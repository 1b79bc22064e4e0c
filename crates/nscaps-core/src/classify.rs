//! Classification of a process' capabilities in a target namespace.
//!
//! Implements the rules of `user_namespaces(7)`:
//!
//! 1. A process has its effective capabilities inside the user namespace
//!    it is a member of.
//! 2. Capabilities in a user namespace extend to all descendant user
//!    namespaces.
//! 3. A process in the parent of a user namespace whose effective UID
//!    matches the owner of that namespace has all capabilities in it, and
//!    by rule 2 in all of its descendants.
//!
//! Non-user namespaces are judged by their owning user namespace.

use nscaps_common::error::{NscapsError, Result};
use nscaps_common::types::{CapabilityLevel, Uid};

use crate::namespace::{Namespace, Process, Snapshot};

/// Outcome of classifying a process against a target namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Capabilities the process has in the target.
    pub level: CapabilityLevel,
    /// Effective UID the classification was based on, if known.
    pub euid: Option<Uid>,
}

/// Classifies the capabilities `process`, running with effective UID
/// `euid`, holds in `target`.
///
/// # Errors
///
/// - [`NscapsError::MissingNamespaceInfo`] if the process' user namespace
///   is unknown.
/// - [`NscapsError::MissingOwner`] if a non-user target has no owner.
/// - [`NscapsError::BrokenHierarchy`] if the owner's ancestry is broken.
/// - [`NscapsError::UnknownEffectiveUid`] if rule 3 needs an unknown `euid`.
/// - [`NscapsError::UnknownOwnerUid`] if rule 3 needs the unknown owner of
///   the user namespace below the process'.
pub fn classify(
    snapshot: &Snapshot,
    process: &Process,
    target: &Namespace,
    euid: Option<Uid>,
) -> Result<Classification> {
    let proc_userns = process
        .user_namespace()
        .filter(|id| snapshot.namespace(*id).is_some())
        .ok_or(NscapsError::MissingNamespaceInfo { pid: process.pid })?;
    let target_userns = snapshot.owning_user_namespace(target)?;
    let classified = |level| Ok(Classification { level, euid });

    if target_userns.id == proc_userns {
        tracing::debug!(pid = process.pid, target = %target.id, "process is member of target's user namespace");
        return classified(CapabilityLevel::Effective);
    }

    // Climb from the target's user namespace towards the root, looking for
    // the process' user namespace; remember where we came from.
    let ancestry = snapshot.user_ancestry(target_userns.id)?;
    let Some(found) = ancestry.iter().position(|ns| ns.id == proc_userns) else {
        tracing::debug!(pid = process.pid, target = %target.id, "target outside process' user namespace hierarchy");
        return classified(CapabilityLevel::None);
    };
    // found > 0, as index 0 is the target's user namespace itself.
    let child = ancestry[found - 1];

    let euid = euid.ok_or(NscapsError::UnknownEffectiveUid { pid: process.pid })?;
    let owner_uid = child
        .owner_uid
        .ok_or(NscapsError::UnknownOwnerUid { namespace: child.id })?;
    if owner_uid == euid {
        tracing::debug!(pid = process.pid, euid, child = %child.id, "process owns child user namespace");
        return classified(CapabilityLevel::Full);
    }
    tracing::debug!(pid = process.pid, euid, child = %child.id, "target below process' user namespace");
    classified(CapabilityLevel::Effective)
}
