//! Shared fixture for unit tests.
//!
//! ```text
//! U0 (uid 0) ─┬─ U1 (uid 1000) ─── U2 (uid 1000) ─── NET2
//!             │   └─ NET1
//!             ├─ U3 (uid 1001) ─── U4 (uid 1001)
//!             └─ NET0
//! U9 (uid 0, separate root) ─── NET9
//! ```

use nscaps_common::types::{NamespaceId, NamespaceKind, Pid};

use crate::namespace::{Namespace, Process, Snapshot};

pub const U0: NamespaceId = NamespaceId::new(4_026_531_837);
pub const U1: NamespaceId = NamespaceId::new(4_026_532_001);
pub const U2: NamespaceId = NamespaceId::new(4_026_532_002);
pub const U3: NamespaceId = NamespaceId::new(4_026_532_003);
pub const U4: NamespaceId = NamespaceId::new(4_026_532_004);
pub const U9: NamespaceId = NamespaceId::new(4_026_532_009);
pub const NET0: NamespaceId = NamespaceId::new(4_026_531_905);
pub const NET1: NamespaceId = NamespaceId::new(4_026_532_101);
pub const NET2: NamespaceId = NamespaceId::new(4_026_532_102);
pub const NET9: NamespaceId = NamespaceId::new(4_026_532_109);

/// `systemd`, root in the initial user namespace.
pub const INIT: Pid = 1;
/// Unprivileged shell of UID 1000 in the initial user namespace.
pub const SHELL_1000: Pid = 100;
/// Unprivileged shell of UID 1001 in the initial user namespace.
pub const SHELL_1001: Pid = 101;
/// Root inside U1.
pub const UNSHARE: Pid = 200;
/// Root inside U3.
pub const SLEEPER: Pid = 300;
/// Process without any namespace information.
pub const GHOST: Pid = 400;

fn process(pid: Pid, name: &str, userns: NamespaceId, net: NamespaceId) -> Process {
    Process::new(pid, name)
        .with_namespace(NamespaceKind::User, userns)
        .with_namespace(NamespaceKind::Net, net)
}

pub fn snapshot() -> Snapshot {
    Snapshot::new()
        .with_namespace(Namespace::user(U0, None, 0).with_leaders([INIT]))
        .with_namespace(Namespace::user(U1, Some(U0), 1000).with_leaders([UNSHARE]))
        .with_namespace(Namespace::user(U2, Some(U1), 1000))
        .with_namespace(Namespace::user(U3, Some(U0), 1001).with_leaders([SLEEPER]))
        .with_namespace(Namespace::user(U4, Some(U3), 1001))
        .with_namespace(Namespace::user(U9, None, 0))
        .with_namespace(Namespace::owned(NamespaceKind::Net, NET0, U0).with_leaders([INIT]))
        .with_namespace(Namespace::owned(NamespaceKind::Net, NET1, U1).with_leaders([UNSHARE]))
        .with_namespace(Namespace::owned(NamespaceKind::Net, NET2, U2))
        .with_namespace(Namespace::owned(NamespaceKind::Net, NET9, U9))
        .with_process(process(INIT, "systemd", U0, NET0).with_euid(0))
        .with_process(process(SHELL_1000, "bash", U0, NET0).with_euid(1000))
        .with_process(process(SHELL_1001, "bash", U0, NET0).with_euid(1001))
        .with_process(process(UNSHARE, "unshare", U1, NET1).with_euid(0))
        .with_process(process(SLEEPER, "sleep", U3, NET0).with_euid(0))
        .with_process(Process::new(GHOST, "ghost"))
}
