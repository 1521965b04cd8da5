// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! Test-runner launch stage
//!
//! The runner unconditionally terminates its own process when the suite
//! finishes, so it always runs out of process; the orchestrator must stay
//! alive past the child's exit. The child's outcome is translated into
//! exactly one `BuildEvent`, never a propagated OS fault.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::config::{ComputedFields, RunOptions, RunnerInvocation};
use crate::errors::{E2eflowError, E2eflowResult};
use crate::pipeline::Stage;

/// The single terminal outcome of a runner subprocess
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEvent {
    pub success: bool,
    pub detail: Option<String>,
}

impl BuildEvent {
    pub fn success() -> Self {
        Self {
            success: true,
            detail: None,
        }
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: Some(detail.into()),
        }
    }
}

/// Launches the runner subprocess. A trait seam so tests can observe the
/// merged invocation without spawning anything.
#[async_trait]
pub trait RunnerLauncher: Send + Sync {
    async fn launch(
        &self,
        root: &Path,
        entry: &Path,
        invocation_name: &str,
        invocation: &RunnerInvocation,
    ) -> BuildEvent;
}

/// Build the argument list from the merged invocation: the runner's own
/// config file first, then only the fields that were computed or
/// explicitly given.
pub fn build_runner_args(invocation: &RunnerInvocation) -> Vec<String> {
    let mut args = vec![invocation.tool_config.to_string_lossy().to_string()];

    if let Some(ref base_url) = invocation.base_url {
        args.push("--baseUrl".to_string());
        args.push(base_url.clone());
    }

    if !invocation.specs.is_empty() {
        args.push("--specs".to_string());
        args.push(
            invocation
                .specs
                .iter()
                .map(|s| s.to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join(","),
        );
    }

    if let Some(ref suite) = invocation.suite {
        args.push("--suite".to_string());
        args.push(suite.clone());
    }

    if invocation.element_explorer {
        args.push("--elementExplorer".to_string());
    }

    args
}

/// Default launcher: runs the JS entry point through node
pub struct NodeRunnerLauncher;

#[async_trait]
impl RunnerLauncher for NodeRunnerLauncher {
    async fn launch(
        &self,
        root: &Path,
        entry: &Path,
        invocation_name: &str,
        invocation: &RunnerInvocation,
    ) -> BuildEvent {
        let node = match which::which("node") {
            Ok(node) => node,
            Err(_) => return BuildEvent::failure("'node' not found on PATH"),
        };

        let args = build_runner_args(invocation);
        tracing::info!(runner = invocation_name, entry = %entry.display(), "launching test runner");
        tracing::debug!(?args, "runner arguments");

        let output = Command::new(node)
            .arg(entry)
            .args(&args)
            .current_dir(root)
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => BuildEvent::success(),
            Ok(output) => BuildEvent::failure(format!(
                "{} exited with {}",
                invocation_name,
                output.status.code().unwrap_or(-1)
            )),
            // Spawn errors are still a failed event, not a raised fault
            Err(e) => BuildEvent::failure(format!("failed to launch {}: {}", invocation_name, e)),
        }
    }
}

/// Resolve the runner entry point: the configured path when given,
/// otherwise the conventional install location under the root
pub fn resolve_runner_entry(root: &Path, configured: Option<&Path>) -> E2eflowResult<PathBuf> {
    if let Some(entry) = configured {
        let entry = if entry.is_absolute() {
            entry.to_path_buf()
        } else {
            root.join(entry)
        };
        return Ok(entry);
    }

    let conventional = root
        .join("node_modules")
        .join("protractor")
        .join("bin")
        .join("protractor");

    if conventional.is_file() {
        Ok(conventional)
    } else {
        Err(E2eflowError::ToolNotFound {
            tool: "protractor".to_string(),
            suggestion: format!(
                "Probed {}. Install the runner in your project or set 'runner.entry' in .e2eflow.yaml",
                conventional.display()
            ),
        })
    }
}

/// Final pipeline stage: merge options with computed fields and launch
pub struct RunnerStage<L: RunnerLauncher> {
    launcher: L,
    invocation_name: String,
}

impl<L: RunnerLauncher> RunnerStage<L> {
    pub fn new(launcher: L, invocation_name: impl Into<String>) -> Self {
        Self {
            launcher,
            invocation_name: invocation_name.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn launcher(&self) -> &L {
        &self.launcher
    }
}

#[async_trait]
impl<L: RunnerLauncher> Stage for RunnerStage<L> {
    fn name(&self) -> &str {
        "test-runner"
    }

    async fn run(&self, opts: &RunOptions, computed: &mut ComputedFields) -> E2eflowResult<()> {
        let invocation = RunnerInvocation::merge(opts, computed)?;
        let entry = resolve_runner_entry(&opts.root, opts.runner_entry.as_deref())?;

        let event = self
            .launcher
            .launch(&opts.root, &entry, &self.invocation_name, &invocation)
            .await;

        if event.success {
            Ok(())
        } else {
            Err(E2eflowError::SubprocessFailure {
                detail: event.detail,
            })
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::StubLauncher;
    use super::*;

    fn invocation(base_url: Option<&str>) -> RunnerInvocation {
        RunnerInvocation {
            tool_config: PathBuf::from("/app/e2e/runner.conf.js"),
            base_url: base_url.map(String::from),
            specs: vec![],
            suite: None,
            element_explorer: false,
        }
    }

    #[test]
    fn args_start_with_the_config_path() {
        let args = build_runner_args(&invocation(None));
        assert_eq!(args, vec!["/app/e2e/runner.conf.js"]);
    }

    #[test]
    fn args_include_only_set_fields() {
        let mut inv = invocation(Some("http://localhost:4200"));
        inv.specs = vec![PathBuf::from("a.e2e.js"), PathBuf::from("b.e2e.js")];
        inv.suite = Some("smoke".to_string());
        inv.element_explorer = true;

        let args = build_runner_args(&inv);
        assert_eq!(
            args,
            vec![
                "/app/e2e/runner.conf.js",
                "--baseUrl",
                "http://localhost:4200",
                "--specs",
                "a.e2e.js,b.e2e.js",
                "--suite",
                "smoke",
                "--elementExplorer",
            ]
        );
    }

    #[test]
    fn empty_specs_and_absent_suite_are_omitted() {
        let args = build_runner_args(&invocation(Some("http://localhost:4200")));
        assert!(!args.iter().any(|a| a == "--specs"));
        assert!(!args.iter().any(|a| a == "--suite"));
        assert!(!args.iter().any(|a| a == "--elementExplorer"));
    }

    #[test]
    fn configured_entry_is_used_as_given() {
        let entry = resolve_runner_entry(
            Path::new("/app"),
            Some(Path::new("tools/runner.js")),
        )
        .unwrap();
        assert_eq!(entry, PathBuf::from("/app/tools/runner.js"));
    }

    #[test]
    fn missing_conventional_entry_is_tool_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_runner_entry(dir.path(), None).unwrap_err();
        assert!(matches!(err, E2eflowError::ToolNotFound { .. }));
    }

    #[tokio::test]
    async fn failed_event_becomes_subprocess_failure() {
        let stage = RunnerStage::new(StubLauncher::failing("3 specs failed"), "protractor");
        let opts = RunOptions {
            runner_entry: Some(PathBuf::from("tools/runner.js")),
            ..Default::default()
        };
        let mut computed = ComputedFields::default();

        let err = stage.run(&opts, &mut computed).await.unwrap_err();
        let E2eflowError::SubprocessFailure { detail } = err else {
            panic!("expected SubprocessFailure");
        };
        assert_eq!(detail.as_deref(), Some("3 specs failed"));
    }

    #[tokio::test]
    async fn stage_passes_merged_invocation_to_the_launcher() {
        let stage = RunnerStage::new(StubLauncher::succeeding(), "protractor");
        let opts = RunOptions {
            runner_entry: Some(PathBuf::from("tools/runner.js")),
            suite: Some("smoke".to_string()),
            ..Default::default()
        };
        let mut computed = ComputedFields::default();
        computed
            .record_base_url("http://localhost:4300".to_string())
            .unwrap();

        stage.run(&opts, &mut computed).await.unwrap();

        let seen = stage.launcher.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].base_url.as_deref(), Some("http://localhost:4300"));
        assert_eq!(seen[0].suite.as_deref(), Some("smoke"));
    }

    #[tokio::test]
    async fn node_launcher_translates_spawn_failure_to_failed_event() {
        // An entry that cannot possibly exist; node itself may be absent
        // too, which is the same failed-event path.
        let event = NodeRunnerLauncher
            .launch(
                Path::new("/"),
                Path::new("/definitely/not/here.js"),
                "protractor",
                &invocation(None),
            )
            .await;

        assert!(!event.success);
        assert!(event.detail.is_some());
    }
}
