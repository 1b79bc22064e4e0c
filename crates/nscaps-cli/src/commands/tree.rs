//! `nscaps tree`: Show the capabilities of a process in a namespace.

use std::path::PathBuf;

use clap::Args;
use nscaps_common::config::NscapsConfig;
use nscaps_common::types::{NamespaceRef, Pid};
use nscaps_core::capability::ProcFs;
use nscaps_core::namespace::Snapshot;
use nscaps_core::resolver::Resolver;

use crate::output;

/// Arguments for the `tree` command.
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Target namespace, as `kind:[inode]` or a bare inode number.
    pub namespace: String,

    /// Namespace snapshot produced by discovery.
    #[arg(long, env = "NSCAPS_SNAPSHOT")]
    pub snapshot: PathBuf,

    /// PID of the process; defaults to this process.
    #[arg(short, long)]
    pub pid: Option<Pid>,

    /// Summarize the target's capabilities instead of listing them.
    #[arg(long)]
    pub brief: bool,

    /// Do not list the process' own capabilities.
    #[arg(long)]
    pub no_proccaps: bool,
}

/// Executes the `tree` command.
///
/// Loads the snapshot, resolves the process and the target namespace,
/// and prints their merged user namespace tree.
///
/// # Errors
///
/// Returns an error if the reference is malformed, the snapshot cannot be
/// loaded, or the process or target cannot be resolved.
pub fn execute(args: TreeArgs, mut config: NscapsConfig) -> anyhow::Result<()> {
    config.brief |= args.brief;
    config.show_proc_caps &= !args.no_proccaps;

    let reference = NamespaceRef::parse(&args.namespace)?;
    let snapshot = Snapshot::load(&args.snapshot)?;
    let process = snapshot.process(super::pid_or_self(args.pid)?)?;
    let target = snapshot.lookup(reference)?;
    tracing::info!(pid = process.pid, target = %reference, "resolving capabilities");

    let resolver = Resolver::with_status_source(&snapshot, ProcFs::new(&config.proc_root));
    let tree = resolver.resolve_tree(process, target)?;
    for line in output::render_tree(&tree, &resolver, &config) {
        println!("{line}");
    }
    Ok(())
}
