//! System-wide constants and default paths.

/// Default mount point of the proc filesystem.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Name of the per-process status file below `/proc/<pid>/`.
pub const STATUS_FILE: &str = "status";

/// Status record holding the effective capability set.
pub const CAP_EFF_KEY: &str = "CapEff:";

/// Status record holding real, effective, saved and filesystem UIDs.
pub const UID_KEY: &str = "Uid:";

/// Maximum nesting of user namespaces below the initial one
/// (see `user_namespaces(7)`).
pub const MAX_USERNS_NESTING: usize = 32;

/// Number of capability names rendered per output line.
pub const DEFAULT_CAPS_PER_LINE: usize = 4;

/// PID of the initial process, whose effective set stands in for
/// "all capabilities".
pub const INIT_PID: u32 = 1;
