// dqc/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing::Level;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 1. Logging: `--debug` on any subcommand lowers the threshold
    let level = if cli.command.debug() {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    // 2. Dispatch
    let result = match cli.command {
        Commands::Generate(args) => commands::generate::execute(args).await,
        Commands::Validate {
            config_path,
            project_dir,
            ..
        } => commands::validate::execute(config_path, project_dir),
    };

    if let Err(e) = result {
        eprintln!("\n💥 {:?}", e);
        std::process::exit(1);
    }
}
