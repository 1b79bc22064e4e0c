//! Plain-text rendering of capability trees.
//!
//! ```text
//! ⛛ user:[4026531837] process "systemd" (1)
//! ├─ process "bash" (1000), euid 1000
//! │     ⋄─ (no capabilities)
//! └─ ⛛ user:[4026532001]
//!    └─ ✓ user:[4026532002]
//!       └─ target net:[4026532102]
//!          ⋄─ cap_chown  cap_kill
//! ```
//!
//! User namespaces carry a mark for the capabilities the process has in
//! them: ⛔ none, ⛛ its effective capabilities, ✓ all capabilities.

use nscaps_common::config::NscapsConfig;
use nscaps_common::types::CapabilityLevel;
use nscaps_core::branch::{BranchNode, BranchTree};
use nscaps_core::capability::StatusSource;
use nscaps_core::namespace::{Process, Snapshot};
use nscaps_core::resolver::Resolver;

/// Shown in place of an empty capability list.
pub const NO_CAPABILITIES: &str = "(no capabilities)";

const BRIEF_EFFECTIVE: &str = "(process effective capabilities)";
const BRIEF_FULL: &str = "(ALL capabilities)";

/// Returns the mark of a user namespace with capability `level`.
#[must_use]
pub const fn level_mark(level: CapabilityLevel) -> &'static str {
    match level {
        CapabilityLevel::None => "⛔",
        CapabilityLevel::Effective => "⛛",
        CapabilityLevel::Full => "✓",
    }
}

/// Lays out capability names in left-aligned columns, `per_line` names to
/// a line.
#[must_use]
pub fn columns(caps: &[String], per_line: usize) -> Vec<String> {
    let width = caps.iter().map(|c| c.chars().count()).max().unwrap_or(0);
    caps.chunks(per_line.max(1))
        .map(|row| {
            row.iter()
                .map(|cap| format!("{cap:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect()
}

/// Renders `tree` line by line, with the capability properties of the
/// process and target nodes below them.
pub fn render_tree<'a, S: StatusSource>(
    tree: &BranchTree<'a>,
    resolver: &Resolver<'a, S>,
    config: &NscapsConfig,
) -> Vec<String> {
    let renderer = Renderer {
        tree,
        resolver,
        config,
        process: tree
            .process_leaf()
            .and_then(|leaf| tree.node(leaf))
            .and_then(BranchNode::as_process),
    };
    let mut lines = Vec::with_capacity(tree.len() * 2);
    renderer.subtree(BranchTree::ROOT, "", "", &mut lines);
    lines
}

struct Renderer<'r, 'a, S> {
    tree: &'r BranchTree<'a>,
    resolver: &'r Resolver<'a, S>,
    config: &'r NscapsConfig,
    process: Option<&'a Process>,
}

impl<S: StatusSource> Renderer<'_, '_, S> {
    fn subtree(&self, index: usize, lead: &str, trail: &str, lines: &mut Vec<String>) {
        let Some(node) = self.tree.node(index) else {
            return;
        };
        lines.push(format!("{lead}{}", label(node, self.resolver.snapshot())));

        let children = self.tree.children(index);
        let bar = if children.is_empty() { "   " } else { "│  " };
        lines.extend(
            self.properties(node)
                .into_iter()
                .map(|prop| format!("{trail}{bar}⋄─ {prop}")),
        );

        for (i, &child) in children.iter().enumerate() {
            let (connector, indent) = if i + 1 == children.len() {
                ("└─ ", "   ")
            } else {
                ("├─ ", "│  ")
            };
            self.subtree(
                child,
                &format!("{trail}{connector}"),
                &format!("{trail}{indent}"),
                lines,
            );
        }
    }

    fn properties(&self, node: &BranchNode<'_>) -> Vec<String> {
        match node {
            BranchNode::Namespace {
                is_target: true,
                level,
                ..
            } => self.target_properties(*level),
            BranchNode::Process { capabilities, .. } if self.config.show_proc_caps => {
                self.caps_or_none(capabilities)
            }
            _ => Vec::new(),
        }
    }

    fn target_properties(&self, level: CapabilityLevel) -> Vec<String> {
        match (level, self.config.brief) {
            (CapabilityLevel::None, _) => vec![NO_CAPABILITIES.to_string()],
            (CapabilityLevel::Effective, true) => vec![BRIEF_EFFECTIVE.to_string()],
            (CapabilityLevel::Full, true) => vec![BRIEF_FULL.to_string()],
            (level, false) => {
                let caps = self
                    .process
                    .map(|process| self.resolver.target_capabilities(process, level))
                    .unwrap_or_default();
                self.caps_or_none(&caps)
            }
        }
    }

    fn caps_or_none(&self, caps: &[String]) -> Vec<String> {
        if caps.is_empty() {
            vec![NO_CAPABILITIES.to_string()]
        } else {
            columns(caps, self.config.caps_per_line)
        }
    }
}

fn label(node: &BranchNode<'_>, snapshot: &Snapshot) -> String {
    match node {
        BranchNode::Namespace {
            namespace,
            is_target,
            level,
        } => {
            let mut label = String::new();
            if namespace.is_user() {
                label.push_str(level_mark(*level));
                label.push(' ');
            }
            if *is_target {
                label.push_str("target ");
            }
            label.push_str(&format!("{}:[{}]", namespace.kind, namespace.id));
            if let Some(leader) = namespace
                .leaders
                .first()
                .and_then(|&pid| snapshot.get_process(pid))
            {
                label.push_str(&format!(" process {:?} ({})", leader.name, leader.pid));
            }
            label
        }
        BranchNode::Process { process, euid, .. } => {
            let mut label = format!("process {:?} ({})", process.name, process.pid);
            if let Some(euid) = euid {
                label.push_str(&format!(", euid {euid}"));
            }
            label
        }
    }
}
