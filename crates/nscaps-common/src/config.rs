//! Global configuration model for nscaps queries and output.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for a resolver run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NscapsConfig {
    /// Mount point of the proc filesystem used for status reads.
    pub proc_root: PathBuf,
    /// Whether the process' own capabilities are shown.
    pub show_proc_caps: bool,
    /// Show only a summary line for the target's capabilities.
    pub brief: bool,
    /// Number of capability names per rendered line.
    pub caps_per_line: usize,
}

impl Default for NscapsConfig {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from(crate::constants::DEFAULT_PROC_ROOT),
            show_proc_caps: true,
            brief: false,
            caps_per_line: crate::constants::DEFAULT_CAPS_PER_LINE,
        }
    }
}

impl NscapsConfig {
    /// Checks the configuration for values that cannot be rendered.
    ///
    /// # Errors
    ///
    /// Returns an error if `caps_per_line` is zero.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.caps_per_line == 0 {
            return Err(crate::error::NscapsError::Config {
                message: "caps_per_line must be at least 1".into(),
            });
        }
        Ok(())
    }
}
