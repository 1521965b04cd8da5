// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! Sequential task pipeline
//!
//! Stages run strictly in order: a stage is awaited to full completion,
//! including its side effects, before the next one starts, because later
//! stages read configuration the earlier ones computed. The first failing
//! stage aborts the run and becomes the single terminal result.
//!
//! Cancellation is not wired in yet; the stage-boundary awaits are the spot
//! a token would be checked without changing the computed-fields contract.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use colored::Colorize;

use crate::config::{ComputedFields, RunOptions};
use crate::errors::{E2eflowError, E2eflowResult};

/// One ordered step of the pipeline
#[async_trait]
pub trait Stage: Send + Sync {
    /// Stage name, used in progress output and failure reporting
    fn name(&self) -> &str;

    /// Whether the stage runs at all; a disabled stage is skipped as an
    /// immediate success with no side effect
    fn enabled(&self, _opts: &RunOptions) -> bool {
        true
    }

    /// Execute the stage. Values for later stages go through `computed`.
    async fn run(
        &self,
        opts: &RunOptions,
        computed: &mut ComputedFields,
    ) -> E2eflowResult<()>;
}

/// The single terminal outcome of a pipeline run
#[derive(Debug)]
pub struct PipelineResult {
    /// Whether every executed stage succeeded
    pub success: bool,
    /// The failure that aborted the run, if any
    pub failure: Option<E2eflowError>,
    /// Total execution time
    pub duration: Duration,
    /// Names of stages that actually executed, in order
    pub executed: Vec<String>,
}

/// Strictly ordered sequence of stages with fail-fast semantics
#[derive(Default)]
pub struct TaskPipeline {
    stages: Vec<Box<dyn Stage>>,
    quiet: bool,
}

impl TaskPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage; stages execute in the order they were added
    pub fn stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Suppress per-stage terminal output (used by tests)
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Run the pipeline to its single terminal result.
    ///
    /// Mutual-exclusivity validation happens once, before stage 1; a
    /// conflict is returned as `Err` since no stage has started. Stage
    /// failures are captured in the `PipelineResult` instead.
    pub async fn run(&self, opts: &RunOptions) -> E2eflowResult<PipelineResult> {
        opts.validate()?;

        let start = Instant::now();
        let mut computed = ComputedFields::default();
        let mut executed = Vec::new();

        for (index, stage) in self.stages.iter().enumerate() {
            if !stage.enabled(opts) {
                tracing::debug!(stage = stage.name(), "stage disabled, skipping");
                if !self.quiet {
                    println!("  {} {} (skipped)", "○".dimmed(), stage.name().dimmed());
                }
                continue;
            }

            tracing::info!(stage = stage.name(), index, "stage starting");
            executed.push(stage.name().to_string());

            match stage.run(opts, &mut computed).await {
                Ok(()) => {
                    if !self.quiet {
                        println!("  {} {}", "✓".green(), stage.name().bold());
                    }
                }
                Err(cause) => {
                    if !self.quiet {
                        println!("  {} {} failed", "✗".red(), stage.name().bold());
                    }
                    tracing::warn!(stage = stage.name(), index, error = %cause, "stage failed");

                    return Ok(PipelineResult {
                        success: false,
                        failure: Some(E2eflowError::StageFailed {
                            stage: stage.name().to_string(),
                            index,
                            cause: Box::new(cause),
                        }),
                        duration: start.elapsed(),
                        executed,
                    });
                }
            }
        }

        Ok(PipelineResult {
            success: true,
            failure: None,
            duration: start.elapsed(),
            executed,
        })
    }
}
