// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! Browser-driver update stage
//!
//! The driver-management tool may be installed in two layouts depending on
//! how the package manager hoisted it. Resolution is an ordered chain of
//! candidates: first one that exists wins, exhaustion is `ToolNotFound`
//! with a manual-update hint.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::config::{ComputedFields, RunOptions};
use crate::errors::{E2eflowError, E2eflowResult};
use crate::pipeline::Stage;

/// Candidate locations for the driver-management tool, in probe order:
/// nested under the runner's own dependency tree first, then hoisted to a
/// top-level sibling dependency.
fn candidate_layouts(root: &Path) -> Vec<PathBuf> {
    vec![
        root.join("node_modules")
            .join("protractor")
            .join("node_modules")
            .join("webdriver-manager")
            .join("bin")
            .join("webdriver-manager"),
        root.join("node_modules")
            .join("webdriver-manager")
            .join("bin")
            .join("webdriver-manager"),
    ]
}

/// Probe the candidate layouts in order; first hit wins
pub fn locate_driver_tool(root: &Path) -> E2eflowResult<PathBuf> {
    let candidates = candidate_layouts(root);

    for candidate in &candidates {
        if candidate.is_file() {
            tracing::debug!(tool = %candidate.display(), "driver tool resolved");
            return Ok(candidate.clone());
        }
        tracing::debug!(probe = %candidate.display(), "driver tool probe missed");
    }

    Err(E2eflowError::driver_tool_not_found(&candidates))
}

/// Run the driver update with the fixed policy flags: no standalone server,
/// no legacy gecko driver, quiet output. Not configurable at this layer.
pub async fn update_driver(root: &Path) -> E2eflowResult<()> {
    let tool = locate_driver_tool(root)?;
    let node = which::which("node").map_err(|_| E2eflowError::ToolNotFound {
        tool: "node".to_string(),
        suggestion: "Install Node.js and ensure 'node' is on your PATH".to_string(),
    })?;

    tracing::info!(tool = %tool.display(), "updating browser driver");

    let output = Command::new(node)
        .arg(&tool)
        .args(["update", "--standalone", "false", "--gecko", "false", "--quiet"])
        .current_dir(root)
        .output()
        .await
        .map_err(|e| E2eflowError::ExecutionFailed {
            message: format!("failed to launch driver update: {}", e),
            help: None,
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(E2eflowError::ExecutionFailed {
            message: format!(
                "driver update exited with {}: {}",
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            ),
            help: Some("Run 'e2eflow update' for the full tool output".to_string()),
        })
    }
}

/// Pipeline stage wrapper; disabled unless the caller asked for an update
pub struct DriverUpdateStage;

#[async_trait]
impl Stage for DriverUpdateStage {
    fn name(&self) -> &str {
        "driver-update"
    }

    fn enabled(&self, opts: &RunOptions) -> bool {
        opts.update_driver
    }

    async fn run(&self, opts: &RunOptions, _computed: &mut ComputedFields) -> E2eflowResult<()> {
        update_driver(&opts.root).await
    }
}
