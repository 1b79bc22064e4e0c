//! # nscaps-core
//!
//! Determines which capabilities a process holds inside a target Linux
//! namespace, and builds the combined tree of the process' and the
//! target's user namespace ancestry.
//!
//! This crate provides:
//! - **Namespace snapshot**: a read-only view of discovered namespaces and
//!   processes, loadable from JSON.
//! - **Capabilities**: parsing of `CapEff` bitmasks from `/proc/<pid>/status`
//!   and mapping of capability bits to names.
//! - **Classification**: the three user namespace privilege rules, yielding
//!   no, effective, or full capabilities.
//! - **Branches**: process and target ancestor chains, merged into a single
//!   tree at their point of divergence.
//!
//! The [`Resolver`](resolver::Resolver) ties these together for a single
//! query and is the entry point for the CLI.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod branch;
pub mod capability;
pub mod classify;
pub mod namespace;
pub mod resolver;

#[cfg(test)]
mod test_utils;
