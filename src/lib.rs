// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! # e2eflow - End-to-end Test Orchestrator
//!
//! `e2eflow` drives an end-to-end test run as a strictly sequential
//! pipeline: optionally start a dev server and wait for readiness,
//! optionally update the browser driver, then launch the external test
//! runner as an isolated subprocess with merged configuration.
//!
//! ## Features
//!
//! - **Sequential pipeline** - each stage commits its side effects before
//!   the next starts; the first failure is the terminal result
//! - **Dev-server launch** - fire-and-abandon after the first readiness
//!   event; the server outlives the pipeline
//! - **Base-URL derivation** - synthesized from host/port/TLS, or an
//!   explicit public address used verbatim
//! - **Driver updates** - ordered probing of known install layouts
//!
//! ## Quick Start
//!
//! ```bash
//! # Initialize a workspace
//! e2eflow init
//!
//! # Serve the app, then run the suite
//! e2eflow run --dev-server app:serve
//!
//! # Run against an already-running server
//! e2eflow run --base-url http://staging:9000
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod runner;
pub mod server;
pub mod utils;

// Re-export commonly used types
pub use config::{ComputedFields, RunOptions, RunnerInvocation, TargetRef, WorkspaceConfig};
pub use errors::{E2eflowError, E2eflowResult};
pub use pipeline::{PipelineResult, Stage, TaskPipeline};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
