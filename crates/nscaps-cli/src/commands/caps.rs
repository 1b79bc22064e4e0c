//! `nscaps caps`: List the effective capabilities of a process.

use clap::Args;
use nscaps_common::config::NscapsConfig;
use nscaps_common::types::Pid;
use nscaps_core::capability::{self, ProcFs};

use crate::output;

/// Arguments for the `caps` command.
#[derive(Args, Debug)]
pub struct CapsArgs {
    /// PID of the process; defaults to this process.
    #[arg(short, long)]
    pub pid: Option<Pid>,
}

/// Executes the `caps` command.
///
/// # Errors
///
/// Returns an error if the own PID cannot be determined.
pub fn execute(args: &CapsArgs, config: &NscapsConfig) -> anyhow::Result<()> {
    let pid = super::pid_or_self(args.pid)?;
    let caps = capability::capabilities_of(&ProcFs::new(&config.proc_root), pid);
    if caps.is_empty() {
        println!("{}", output::NO_CAPABILITIES);
        return Ok(());
    }
    for line in output::columns(&caps, config.caps_per_line) {
        println!("{line}");
    }
    Ok(())
}
