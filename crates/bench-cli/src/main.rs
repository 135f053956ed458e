mod cli;
mod commands;
mod config;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::config::CONFIG;

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Pipeline(command) => commands::pipeline::run(command),
        Commands::Weights(command) => commands::weights::run(command),
        Commands::Trends(args) => commands::trends::run_trends(args),
        Commands::Summary(args) => commands::trends::run_summary(args),
        Commands::Compare(args) => commands::compare::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_new(&CONFIG.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter)
                             .with_target(false)
                             .with_writer(std::io::stderr)
                             .init();
}
