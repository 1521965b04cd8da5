// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! External-process stages
//!
//! The driver-update stage and the test-runner stage both shell out: the
//! update tool because it manages binaries on disk, the runner because it
//! terminates its own process on completion and must not take the
//! orchestrator down with it.

mod run;
mod update;

pub use run::{build_runner_args, BuildEvent, NodeRunnerLauncher, RunnerLauncher, RunnerStage};
pub use update::{locate_driver_tool, update_driver, DriverUpdateStage};

#[cfg(test)]
pub(crate) use run::test_support;
