// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::loader::default_manifest_path;

/// Command-line arguments for `neuroforge`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "neuroforge",
    version,
    about = "Build, validate and schedule a model graph, then generate code for a hardware target.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the compile manifest (TOML).
    #[arg(long, value_name = "PATH", default_value_os_t = default_manifest_path())]
    pub config: PathBuf,

    /// Override `[config].target` from the manifest.
    #[arg(long, value_name = "TAG")]
    pub target: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `NEUROFORGE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Build and validate the graph, print its schedule, but don't generate
    /// code.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::try_parse_from(["neuroforge"]).unwrap();
        assert_eq!(args.config, default_manifest_path());
        assert!(args.target.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn flags_are_parsed() {
        let args = CliArgs::try_parse_from([
            "neuroforge",
            "--config",
            "models/mnist.toml",
            "--target",
            "dpu_v2",
            "--log-level",
            "debug",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("models/mnist.toml"));
        assert_eq!(args.target.as_deref(), Some("dpu_v2"));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(args.dry_run);
    }
}
