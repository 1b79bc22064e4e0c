//! Branches of the user namespace hierarchy and their combined tree.
//!
//! A process branch runs from the root user namespace down to the process'
//! user namespace and ends in the process itself. A target branch runs
//! from the root down to the target namespace. [`merge`] joins both at
//! the point where they part ways.
//!
//! Trees are stored as an arena: nodes live in a vector and refer to their
//! children by index, with the root at index [`BranchTree::ROOT`].

pub mod chain;
pub mod merge;

use nscaps_common::types::{CapabilityLevel, Uid};

use crate::namespace::{Namespace, Process};

pub use chain::{ProcessChain, TargetChain};
pub use merge::merge;

/// A node of a branch or of a merged tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchNode<'a> {
    /// A namespace, possibly the target of the query.
    Namespace {
        /// The namespace.
        namespace: &'a Namespace,
        /// Whether this is the target namespace.
        is_target: bool,
        /// Capabilities the process has in this namespace.
        level: CapabilityLevel,
    },
    /// The process whose capabilities are evaluated.
    Process {
        /// The process.
        process: &'a Process,
        /// Its effective UID, if known.
        euid: Option<Uid>,
        /// Its own effective capabilities.
        capabilities: Vec<String>,
    },
}

impl<'a> BranchNode<'a> {
    /// Creates a plain namespace node without capabilities.
    #[must_use]
    pub const fn namespace(namespace: &'a Namespace) -> Self {
        Self::Namespace {
            namespace,
            is_target: false,
            level: CapabilityLevel::None,
        }
    }

    /// Creates a target namespace node.
    #[must_use]
    pub const fn target(namespace: &'a Namespace, level: CapabilityLevel) -> Self {
        Self::Namespace {
            namespace,
            is_target: true,
            level,
        }
    }

    /// Returns the namespace of a namespace node.
    #[must_use]
    pub const fn as_namespace(&self) -> Option<&'a Namespace> {
        match self {
            Self::Namespace { namespace, .. } => Some(*namespace),
            Self::Process { .. } => None,
        }
    }

    /// Returns the process of a process node.
    #[must_use]
    pub const fn as_process(&self) -> Option<&'a Process> {
        match self {
            Self::Process { process, .. } => Some(*process),
            Self::Namespace { .. } => None,
        }
    }

    /// Returns `true` for the target namespace node.
    #[must_use]
    pub const fn is_target(&self) -> bool {
        matches!(self, Self::Namespace { is_target: true, .. })
    }

    /// Returns the capability level of a namespace node.
    #[must_use]
    pub const fn level(&self) -> Option<CapabilityLevel> {
        match self {
            Self::Namespace { level, .. } => Some(*level),
            Self::Process { .. } => None,
        }
    }

    /// Returns the node with its capability level replaced; process nodes
    /// are returned unchanged.
    #[must_use]
    pub fn with_level(self, level: CapabilityLevel) -> Self {
        match self {
            Self::Namespace {
                namespace,
                is_target,
                ..
            } => Self::Namespace {
                namespace,
                is_target,
                level,
            },
            process @ Self::Process { .. } => process,
        }
    }

    /// Returns `true` if both nodes stand for the same namespace.
    #[must_use]
    pub fn same_namespace(&self, other: &Self) -> bool {
        match (self.as_namespace(), other.as_namespace()) {
            (Some(a), Some(b)) => a.id == b.id,
            _ => false,
        }
    }
}

/// A node stored in a [`BranchTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode<'a> {
    /// The node itself.
    pub node: BranchNode<'a>,
    /// Indices of the child nodes.
    pub children: Vec<usize>,
}

/// A merged tree of namespace and process nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTree<'a> {
    nodes: Vec<TreeNode<'a>>,
}

impl<'a> BranchTree<'a> {
    /// Index of the root node.
    pub const ROOT: usize = 0;

    /// Creates a tree consisting of only its root.
    #[must_use]
    pub fn new(root: BranchNode<'a>) -> Self {
        Self {
            nodes: vec![TreeNode {
                node: root,
                children: Vec::new(),
            }],
        }
    }

    /// Appends `node` as last child of `parent` and returns its index.
    pub(crate) fn push(&mut self, parent: usize, node: BranchNode<'a>) -> usize {
        let index = self.nodes.len();
        self.nodes.push(TreeNode {
            node,
            children: Vec::new(),
        });
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.push(index);
        }
        index
    }

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> &BranchNode<'a> {
        &self.nodes[Self::ROOT].node
    }

    /// Returns the node at `index`.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&BranchNode<'a>> {
        self.nodes.get(index).map(|n| &n.node)
    }

    /// Returns the child indices of the node at `index`.
    #[must_use]
    pub fn children(&self, index: usize) -> &[usize] {
        self.nodes
            .get(index)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode<'a>> {
        self.nodes.iter()
    }

    fn position(&self, pred: impl Fn(&TreeNode<'a>) -> bool) -> Option<usize> {
        self.nodes.iter().position(pred)
    }

    /// Returns the index of the node with two children, if any.
    #[must_use]
    pub fn fork(&self) -> Option<usize> {
        self.position(|n| n.children.len() == 2)
    }

    /// Returns the index of the process node.
    #[must_use]
    pub fn process_leaf(&self) -> Option<usize> {
        self.position(|n| n.node.as_process().is_some())
    }

    /// Returns the index of the target namespace node.
    #[must_use]
    pub fn target(&self) -> Option<usize> {
        self.position(|n| n.node.is_target())
    }

    /// Returns `(depth, index)` of all nodes in depth-first pre-order,
    /// children in insertion order.
    #[must_use]
    pub fn walk(&self) -> Vec<(usize, usize)> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(0, Self::ROOT)];
        while let Some((depth, index)) = stack.pop() {
            order.push((depth, index));
            stack.extend(self.children(index).iter().rev().map(|&child| (depth + 1, child)));
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, U0, U1, UNSHARE};

    #[test]
    fn push_links_children_in_order() {
        let snapshot = test_utils::snapshot();
        let u0 = snapshot.namespace(U0).expect("U0");
        let u1 = snapshot.namespace(U1).expect("U1");
        let proc = snapshot.process(UNSHARE).expect("process");

        let mut tree = BranchTree::new(BranchNode::namespace(u0));
        let child = tree.push(BranchTree::ROOT, BranchNode::namespace(u1));
        let leaf = tree.push(
            BranchTree::ROOT,
            BranchNode::Process {
                process: proc,
                euid: Some(0),
                capabilities: Vec::new(),
            },
        );

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.children(BranchTree::ROOT), &[child, leaf]);
        assert_eq!(tree.fork(), Some(BranchTree::ROOT));
        assert_eq!(tree.process_leaf(), Some(leaf));
        assert_eq!(tree.target(), None);
        assert_eq!(tree.walk(), vec![(0, 0), (1, child), (1, leaf)]);
    }

    #[test]
    fn with_level_keeps_target_flag() {
        let snapshot = test_utils::snapshot();
        let u1 = snapshot.namespace(U1).expect("U1");
        let node = BranchNode::target(u1, CapabilityLevel::None).with_level(CapabilityLevel::Full);
        assert!(node.is_target());
        assert_eq!(node.level(), Some(CapabilityLevel::Full));
    }

    #[test]
    fn same_namespace_compares_identity() {
        let snapshot = test_utils::snapshot();
        let u0 = snapshot.namespace(U0).expect("U0");
        let u1 = snapshot.namespace(U1).expect("U1");
        assert!(BranchNode::namespace(u0).same_namespace(&BranchNode::target(u0, CapabilityLevel::Full)));
        assert!(!BranchNode::namespace(u0).same_namespace(&BranchNode::namespace(u1)));
    }

    #[test]
    fn out_of_range_index_has_no_children() {
        let snapshot = test_utils::snapshot();
        let tree = BranchTree::new(BranchNode::namespace(snapshot.namespace(U0).expect("U0")));
        assert!(tree.children(9).is_empty());
        assert!(tree.node(9).is_none());
    }
}
