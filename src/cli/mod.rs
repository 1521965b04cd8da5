// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for e2eflow.

pub mod init;
pub mod run;
pub mod update;
pub mod validate;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// End-to-end test orchestrator
///
/// Starts your dev server, keeps the browser driver fresh, and launches the
/// test runner with a consistent base URL.
#[derive(Parser, Debug)]
#[clap(
    name = "e2eflow",
    version,
    about = "End-to-end test orchestrator: dev server, driver updates, and runner launch",
    long_about = None,
    after_help = "Examples:\n\
        e2eflow init                            Initialize a workspace file\n\
        e2eflow run --dev-server app:serve      Serve the app, then run the suite\n\
        e2eflow run --base-url http://host:80   Run against an already-running server\n\
        e2eflow update                          Refresh the browser driver\n\n\
        See 'e2eflow <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the end-to-end pipeline
    Run(RunArgs),

    /// Update the browser driver (the standalone remediation path)
    Update {
        /// Workspace file
        #[clap(short, long, default_value = ".e2eflow.yaml")]
        config: PathBuf,
    },

    /// Validate the workspace configuration
    Validate {
        /// Workspace file to validate
        #[clap(default_value = ".e2eflow.yaml")]
        config: PathBuf,
    },

    /// Initialize a new e2eflow workspace
    Init {
        /// Workspace name (defaults to current directory name)
        name: Option<String>,
    },
}

/// Options for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Workspace file
    #[clap(short, long, default_value = ".e2eflow.yaml")]
    pub config: PathBuf,

    /// Serve target to launch first (project:target[:configuration]);
    /// mutually exclusive with --base-url
    #[clap(short, long, value_name = "TARGET")]
    pub dev_server: Option<String>,

    /// Base URL of an already-running server; mutually exclusive with
    /// --dev-server
    #[clap(short, long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Host used when synthesizing the base URL
    #[clap(long)]
    pub host: Option<String>,

    /// Pin the dev-server port
    #[clap(short, long)]
    pub port: Option<u16>,

    /// Spec file pattern; repeatable
    #[clap(short, long = "spec", value_name = "PATTERN")]
    pub specs: Vec<String>,

    /// Suite selector
    #[clap(short = 'u', long)]
    pub suite: Option<String>,

    /// Update the browser driver before running
    #[clap(long)]
    pub update_driver: bool,

    /// Launch the runner's interactive element explorer instead of the suite
    #[clap(long)]
    pub element_explorer: bool,

    /// Synthesize https URLs
    #[clap(long)]
    pub tls: bool,

    /// Public-facing address to use verbatim as the base URL
    #[clap(long, value_name = "HOST")]
    pub public_host: Option<String>,

    /// Path to the runner's own configuration file
    #[clap(long, value_name = "PATH")]
    pub runner_config: Option<PathBuf>,
}
