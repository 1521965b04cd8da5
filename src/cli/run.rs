// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! Run command - execute the end-to-end pipeline

use colored::Colorize;
use miette::Result;
use std::str::FromStr;

use super::RunArgs;
use crate::config::{RunOptions, TargetRef, WorkspaceConfig};
use crate::pipeline::TaskPipeline;
use crate::runner::{DriverUpdateStage, NodeRunnerLauncher, RunnerStage};
use crate::server::{CommandServiceProvider, DevServerStage};

/// Run the pipeline
pub async fn run(args: RunArgs, verbose: bool) -> Result<()> {
    // Check workspace file exists
    if !args.config.exists() {
        return Err(miette::miette!(
            "Workspace file not found: {}\n\n\
             Run 'e2eflow init' to create a new workspace.",
            args.config.display()
        ));
    }

    // Load workspace
    let workspace = WorkspaceConfig::from_file(&args.config)
        .map_err(|e| miette::miette!("Failed to load workspace: {}", e))?;

    let opts = assemble_options(&args, &workspace)?;

    if verbose {
        tracing::debug!(?opts, "assembled run options");
    }

    // Assemble the stage sequence: dev server, driver update, runner.
    // Disabled stages skip themselves based on the options.
    let pipeline = TaskPipeline::new()
        .stage(Box::new(DevServerStage::new(CommandServiceProvider::new(
            workspace,
        ))))
        .stage(Box::new(DriverUpdateStage))
        .stage(Box::new(RunnerStage::new(NodeRunnerLauncher, "protractor")));

    println!();
    crate::utils::print_header("End-to-end pipeline");

    let result = pipeline.run(&opts).await?;

    println!();
    if result.success {
        println!(
            "{}",
            format!(
                "Pipeline completed successfully in {:.2}s",
                result.duration.as_secs_f64()
            )
            .green()
        );
        Ok(())
    } else {
        println!(
            "{}",
            format!("Pipeline failed after {:.2}s", result.duration.as_secs_f64()).red()
        );

        match result.failure {
            Some(cause) => Err(cause.into()),
            None => Err(miette::miette!("Pipeline execution failed")),
        }
    }
}

/// Merge the workspace file's runner defaults with the CLI flags; flags
/// always win over file values.
fn assemble_options(args: &RunArgs, workspace: &WorkspaceConfig) -> Result<RunOptions> {
    let root = std::env::current_dir()
        .map_err(|e| miette::miette!("Failed to get current directory: {}", e))?;

    let dev_server = args
        .dev_server
        .as_deref()
        .map(TargetRef::from_str)
        .transpose()?;

    let defaults = &workspace.runner;
    let fallback = RunOptions::default();

    let specs = if args.specs.is_empty() {
        defaults.specs.clone()
    } else {
        args.specs.clone()
    };

    Ok(RunOptions {
        root,
        tool_config: args
            .runner_config
            .clone()
            .or_else(|| defaults.config.clone())
            .unwrap_or(fallback.tool_config),
        runner_entry: defaults.entry.clone(),
        dev_server,
        specs,
        suite: args.suite.clone().or_else(|| defaults.suite.clone()),
        element_explorer: args.element_explorer,
        update_driver: args.update_driver,
        host: args
            .host
            .clone()
            .or_else(|| defaults.host.clone())
            .unwrap_or(fallback.host),
        port: args.port,
        base_url: args.base_url.clone(),
        public_host: args.public_host.clone(),
        tls: args.tls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComputedFields;
    use crate::errors::E2eflowError;
    use crate::pipeline::Stage;
    use crate::runner::test_support::StubLauncher;
    use crate::server::test_support::StubProvider;
    use std::path::PathBuf;
    use std::sync::atomic::Ordering;

    fn pipeline_opts(dev_server: Option<&str>) -> RunOptions {
        RunOptions {
            runner_entry: Some(PathBuf::from("tools/runner.js")),
            dev_server: dev_server.map(|s| TargetRef::from_str(s).unwrap()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn end_to_end_with_stubbed_dev_server() {
        // Stub dev server comes up on port 4300; the run stage must see the
        // merged base URL with the host value carried through literally.
        let provider = StubProvider::ready(4300);
        let launcher = StubLauncher::succeeding();
        let runner = RunnerStage::new(launcher, "protractor");

        let opts = pipeline_opts(Some("app:serve:production"));
        let mut computed = ComputedFields::default();

        DevServerStage::new(provider)
            .run(&opts, &mut computed)
            .await
            .unwrap();
        runner.run(&opts, &mut computed).await.unwrap();

        let seen = runner.launcher().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].base_url.as_deref(), Some("http://localhost:4300"));
        assert!(seen[0].specs.is_empty());
        assert!(seen[0].suite.is_none());
        assert!(!seen[0].element_explorer);
    }

    #[tokio::test]
    async fn conflict_spawns_nothing() {
        let provider = StubProvider::ready(4300);
        let starts = provider.starts.clone();

        let pipeline = TaskPipeline::new()
            .quiet()
            .stage(Box::new(DevServerStage::new(provider)))
            .stage(Box::new(RunnerStage::new(
                StubLauncher::succeeding(),
                "protractor",
            )));

        let opts = RunOptions {
            base_url: Some("http://myhost:9000".to_string()),
            ..pipeline_opts(Some("app:serve"))
        };

        let err = pipeline.run(&opts).await.unwrap_err();
        assert!(matches!(err, E2eflowError::ConfigurationConflict { .. }));
        assert_eq!(starts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_driver_update_skips_the_run_stage() {
        // Both driver probes miss in an empty temp root; the runner stage
        // must never be invoked.
        let dir = tempfile::tempdir().unwrap();
        let launcher = StubLauncher::succeeding();
        let runner = RunnerStage::new(launcher, "protractor");

        let pipeline = TaskPipeline::new()
            .quiet()
            .stage(Box::new(DriverUpdateStage))
            .stage(Box::new(runner));

        let opts = RunOptions {
            root: dir.path().to_path_buf(),
            runner_entry: Some(PathBuf::from("tools/runner.js")),
            base_url: Some("http://myhost:9000".to_string()),
            update_driver: true,
            ..Default::default()
        };

        let result = pipeline.run(&opts).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.executed, vec!["driver-update"]);

        let Some(E2eflowError::StageFailed { cause, .. }) = result.failure else {
            panic!("expected StageFailed");
        };
        assert!(matches!(*cause, E2eflowError::ToolNotFound { .. }));
    }

    #[tokio::test]
    async fn disabled_update_goes_straight_from_server_to_runner() {
        let pipeline = TaskPipeline::new()
            .quiet()
            .stage(Box::new(DevServerStage::new(StubProvider::ready(4200))))
            .stage(Box::new(DriverUpdateStage))
            .stage(Box::new(RunnerStage::new(
                StubLauncher::succeeding(),
                "protractor",
            )));

        let result = pipeline.run(&pipeline_opts(Some("app:serve"))).await.unwrap();
        assert!(result.success);
        assert_eq!(result.executed, vec!["dev-server", "test-runner"]);
    }

    #[test]
    fn cli_flags_win_over_workspace_defaults() {
        let workspace = WorkspaceConfig::from_yaml(
            r#"
name: fixture
runner:
  config: e2e/from-file.conf.js
  suite: nightly
  host: filehost
"#,
        )
        .unwrap();

        let args = RunArgs {
            suite: Some("smoke".to_string()),
            host: Some("clihost".to_string()),
            ..Default::default()
        };

        let opts = assemble_options(&args, &workspace).unwrap();
        assert_eq!(opts.suite.as_deref(), Some("smoke"));
        assert_eq!(opts.host, "clihost");
        assert_eq!(opts.tool_config, PathBuf::from("e2e/from-file.conf.js"));
    }

    #[test]
    fn workspace_defaults_fill_unset_flags() {
        let workspace = WorkspaceConfig::from_yaml(
            r#"
name: fixture
runner:
  suite: nightly
  specs:
    - "e2e/**/*.e2e.js"
"#,
        )
        .unwrap();

        let opts = assemble_options(&RunArgs::default(), &workspace).unwrap();
        assert_eq!(opts.suite.as_deref(), Some("nightly"));
        assert_eq!(opts.specs, vec!["e2e/**/*.e2e.js"]);
        assert_eq!(opts.host, "localhost");
    }
}
