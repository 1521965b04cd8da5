// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! Configuration layer
//!
//! The workspace file (`.e2eflow.yaml`) supplies defaults and serve-target
//! definitions; `RunOptions` is the per-invocation option set assembled from
//! the file plus CLI flags. Computed values produced by earlier pipeline
//! stages live in `ComputedFields` and are merged into a `RunnerInvocation`
//! at the point of final consumption.

pub mod baseurl;
mod file;
mod options;

pub use file::{Project, RunnerDefaults, ServeTarget, TargetOverlay, WorkspaceConfig};
pub use options::{ComputedFields, RunOptions, RunnerInvocation, TargetRef};
