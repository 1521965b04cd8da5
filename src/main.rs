// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! e2eflow - End-to-end test orchestrator
//!
//! Start your dev server, keep the browser driver fresh, and launch the
//! test runner with a consistent base URL.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use e2eflow::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "e2eflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Run(args) => e2eflow::cli::run::run(args, cli.verbose).await,
        Commands::Update { config } => e2eflow::cli::update::run(config, cli.verbose).await,
        Commands::Validate { config } => e2eflow::cli::validate::run(config, cli.verbose).await,
        Commands::Init { name } => e2eflow::cli::init::run(name, cli.verbose).await,
    }
}
