//! Merging of a process chain and a target chain into one tree.
//!
//! Both chains start at the root user namespace. They are walked in
//! lock-step as long as they pass through the same namespaces; where they
//! part, the rest of the target chain is grafted next to the rest of the
//! process chain.
//!
//! ```text
//! U0                   U0 ⛛ (fork)
//! └─ process    +      └─ U1 ─── U2 ─── target net
//!
//!              =       U0 ⛛
//!                      ├─ process
//!                      └─ U1 ⛛ ─── U2 ✓ ─── target net (as classified)
//! ```

use nscaps_common::error::{NscapsError, Result};
use nscaps_common::types::CapabilityLevel;

use super::{BranchNode, BranchTree, ProcessChain, TargetChain};

/// Combines the process and target chains into a single tree rooted at
/// their common root user namespace.
///
/// Shared namespaces appear once; the target flag and level carry over
/// when the target is one of them. The process' own user namespace is
/// marked as granting its effective capabilities. When the target chain
/// continues below the process' user namespace, the first grafted node
/// gets the effective capabilities and deeper ones get all capabilities,
/// while the target keeps its classified level. When the target chain
/// forks off elsewhere, grafted nodes are out of reach.
///
/// # Errors
///
/// Returns [`NscapsError::DisjointHierarchy`] if the chains do not share
/// their root.
pub fn merge<'a>(process: ProcessChain<'a>, target: TargetChain<'a>) -> Result<BranchTree<'a>> {
    let disjoint = NscapsError::DisjointHierarchy {
        pid: process.process().pid,
        namespace: target.target().id,
    };
    let process_nodes = process.into_nodes();
    let target_nodes = target.into_nodes();

    let shared = process_nodes
        .iter()
        .zip(&target_nodes)
        .take_while(|(p, t)| p.same_namespace(t))
        .count();
    // The process chain ends in its user namespace and the process node.
    let own_userns = process_nodes.len().saturating_sub(2);
    let reaches_target = shared == process_nodes.len() - 1;

    let mark_own = |index: usize, node: BranchNode<'a>| {
        if index == own_userns && !node.is_target() {
            node.with_level(CapabilityLevel::Effective)
        } else {
            node
        }
    };

    let mut process_rest = process_nodes.into_iter().enumerate();
    let mut target_rest = target_nodes.into_iter();

    let mut common = process_rest
        .by_ref()
        .zip(target_rest.by_ref())
        .take(shared)
        .map(|((index, p), t)| if t.is_target() { t } else { mark_own(index, p) });
    let mut tree = BranchTree::new(common.next().ok_or(disjoint)?);
    let mut fork = BranchTree::ROOT;
    for node in common {
        fork = tree.push(fork, node);
    }

    let mut parent = fork;
    for (index, node) in process_rest {
        parent = tree.push(parent, mark_own(index, node));
    }

    let grafted: Vec<_> = target_rest.collect();
    if grafted.is_empty() {
        tracing::debug!(nodes = tree.len(), "target lies on the process branch");
        return Ok(tree);
    }
    tracing::debug!(fork, grafted = grafted.len(), reaches_target, "target branch forks off");
    let last = grafted.len() - 1;
    let mut parent = fork;
    for (depth, node) in grafted.into_iter().enumerate() {
        let node = match (depth, reaches_target) {
            (d, _) if d == last => node,
            (_, false) => node.with_level(CapabilityLevel::None),
            (0, true) => node.with_level(CapabilityLevel::Effective),
            (_, true) => node.with_level(CapabilityLevel::Full),
        };
        parent = tree.push(parent, node);
    }
    Ok(tree)
}
