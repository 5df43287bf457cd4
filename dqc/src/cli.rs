// dqc/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dqc")]
#[command(about = "Compiles data-quality configs into warehouse SQL", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Resolves rule bindings and writes the generated SQL
    Generate(GenerateArgs),

    /// 🔍 Loads and validates every config kind without generating anything
    Validate {
        /// Config file or directory
        config_path: PathBuf,

        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long)]
        debug: bool,
    },
}

impl Commands {
    pub fn debug(&self) -> bool {
        match self {
            Commands::Generate(args) => args.debug,
            Commands::Validate { debug, .. } => *debug,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// `ALL` or comma-separated rule binding ids
    pub rule_binding_ids: String,

    /// Config file or directory
    pub config_path: PathBuf,

    /// Project directory
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,

    /// Entity environment override to apply (ex: "test")
    #[arg(long, env = "ENV")]
    pub environment_target: Option<String>,

    /// Value substituted for `$tgt_tbl_snapshot_value`
    #[arg(long)]
    pub snapshot_date: Option<String>,

    /// Bound on concurrent rule binding resolutions (default: project `threads`)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Resolve and render, write nothing
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long)]
    pub skip_sql_validation: bool,

    #[arg(long, default_value = "true", action = clap::ArgAction::Set)]
    pub progress_watermark: bool,

    /// Extra run metadata as a JSON object
    #[arg(long)]
    pub metadata: Option<String>,

    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_generate_defaults() -> Result<()> {
        let args = Cli::parse_from(["dqc", "generate", "ALL", "configs"]);
        match args.command {
            Commands::Generate(args) => {
                assert_eq!(args.rule_binding_ids, "ALL");
                assert_eq!(args.config_path.to_string_lossy(), "configs");
                assert_eq!(args.project_dir.to_string_lossy(), ".");
                assert!(args.progress_watermark);
                assert!(!args.dry_run);
                assert_eq!(args.threads, None);
                Ok(())
            }
            _ => bail!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_parse_generate_flags() -> Result<()> {
        let args = Cli::parse_from([
            "dqc",
            "generate",
            "orders_checks,orders_incremental",
            "configs/",
            "--environment-target",
            "test",
            "--snapshot-date",
            "202407",
            "--threads",
            "4",
            "--progress-watermark",
            "false",
            "--dry-run",
            "--debug",
        ]);
        assert!(args.command.debug());
        match args.command {
            Commands::Generate(args) => {
                assert_eq!(args.environment_target.as_deref(), Some("test"));
                assert_eq!(args.snapshot_date.as_deref(), Some("202407"));
                assert_eq!(args.threads, Some(4));
                assert!(!args.progress_watermark);
                assert!(args.dry_run);
                Ok(())
            }
            _ => bail!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_parse_validate() -> Result<()> {
        let args = Cli::parse_from(["dqc", "validate", "configs"]);
        match args.command {
            Commands::Validate { config_path, .. } => {
                assert_eq!(config_path.to_string_lossy(), "configs");
                Ok(())
            }
            _ => bail!("Expected Validate command"),
        }
    }
}
