//! CLI command definitions and dispatch.

pub mod caps;
pub mod tree;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use nscaps_common::config::NscapsConfig;
use nscaps_common::types::Pid;

/// nscaps: capabilities of a process in a Linux namespace.
#[derive(Parser, Debug)]
#[command(name = "nscaps", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// JSON configuration file.
    #[arg(long, global = true, env = "NSCAPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Mount point of the proc filesystem.
    #[arg(long, global = true)]
    pub proc_root: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the capabilities of a process in a target namespace.
    Tree(tree::TreeArgs),
    /// List the effective capabilities of a process.
    Caps(caps::CapsArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the command fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref(), cli.proc_root)?;
    match cli.command {
        Command::Tree(args) => tree::execute(args, config),
        Command::Caps(args) => caps::execute(&args, &config),
    }
}

/// Reads the configuration file, if given, and applies the global
/// command line overrides.
fn load_config(path: Option<&Path>, proc_root: Option<PathBuf>) -> anyhow::Result<NscapsConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => NscapsConfig::default(),
    };
    if let Some(root) = proc_root {
        config.proc_root = root;
    }
    config.validate()?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

/// Returns the PID to query: the given one, or this process.
fn pid_or_self(pid: Option<Pid>) -> anyhow::Result<Pid> {
    match pid {
        Some(pid) => Ok(pid),
        None => Pid::try_from(nix::unistd::getpid().as_raw()).context("invalid own PID"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_command_parses_reference_and_flags() {
        let cli = Cli::try_parse_from([
            "nscaps",
            "tree",
            "--snapshot",
            "/tmp/ns.json",
            "--pid",
            "42",
            "--brief",
            "net:[4026531905]",
        ])
        .expect("should parse");
        let Command::Tree(args) = cli.command else {
            panic!("not the tree command");
        };
        assert_eq!(args.namespace, "net:[4026531905]");
        assert_eq!(args.pid, Some(42));
        assert!(args.brief);
        assert!(!args.no_proccaps);
    }

    #[test]
    fn global_proc_root_after_subcommand() {
        let cli = Cli::try_parse_from(["nscaps", "caps", "--proc-root", "/host/proc"])
            .expect("should parse");
        assert_eq!(cli.proc_root, Some(PathBuf::from("/host/proc")));
    }

    #[test]
    fn config_file_is_overridden_by_flags() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nscaps.json");
        std::fs::write(&path, r#"{"brief": true, "caps_per_line": 2}"#).expect("write");

        let config =
            load_config(Some(&path), Some(PathBuf::from("/host/proc"))).expect("should load");
        assert!(config.brief);
        assert_eq!(config.caps_per_line, 2);
        assert_eq!(config.proc_root, PathBuf::from("/host/proc"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nscaps.json");
        std::fs::write(&path, r#"{"caps_per_line": 0}"#).expect("write");
        assert!(load_config(Some(&path), None).is_err());
    }

    #[test]
    fn explicit_pid_wins() {
        assert_eq!(pid_or_self(Some(7)).expect("pid"), 7);
        assert!(pid_or_self(None).expect("own pid") > 0);
    }
}
