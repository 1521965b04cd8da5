// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! Command-backed service provider
//!
//! Resolves a serve target from the workspace config, spawns its command,
//! and scans stdout for the readiness line. Emits exactly one event into
//! the handle: ready-with-port, or a failure if the process errors or
//! exits first. The child is left running detached once ready.

use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use super::{ServeOverrides, ServiceEvent, ServiceHandle, ServiceProvider};
use crate::config::{ServeTarget, TargetRef, WorkspaceConfig};
use crate::errors::{E2eflowError, E2eflowResult};

/// Default readiness pattern: a port following "port", or the port of a
/// printed local URL
const DEFAULT_READY_PATTERN: &str = r"(?i)(?:port[:\s]+|https?://[^\s/]+:)(\d{2,5})";

/// Service provider backed by workspace serve targets
pub struct CommandServiceProvider {
    config: WorkspaceConfig,
}

impl CommandServiceProvider {
    pub fn new(config: WorkspaceConfig) -> Self {
        Self { config }
    }

    fn build_command(target: &ServeTarget, overrides: &ServeOverrides, root: &Path) -> Command {
        let mut cmd = Command::new(&target.command);
        cmd.args(&target.args);
        cmd.current_dir(root);
        cmd.envs(&target.env);

        // Overrides win over target defaults. Serve commands pick these up
        // from the environment; watch mode is forced off for one-shot runs.
        cmd.env("HOST", &overrides.host);
        if let Some(port) = overrides.port {
            cmd.env("PORT", port.to_string());
        }
        if !overrides.watch {
            cmd.env("WATCH", "false");
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::null());
        cmd
    }
}

#[async_trait]
impl ServiceProvider for CommandServiceProvider {
    async fn start(
        &self,
        target_ref: &TargetRef,
        overrides: &ServeOverrides,
        root: &Path,
    ) -> E2eflowResult<ServiceHandle> {
        let target = self.config.resolve_target(target_ref)?;

        let pattern = target
            .ready_pattern
            .as_deref()
            .unwrap_or(DEFAULT_READY_PATTERN);
        // resolve_target validated custom patterns already
        let ready = Regex::new(pattern).map_err(|e| {
            E2eflowError::invalid_service(&target_ref.to_string(), e.to_string())
        })?;

        let mut cmd = Self::build_command(&target, overrides, root);

        tracing::info!(server = %target_ref, command = %target.command, "starting dev server");

        let mut child = cmd.spawn().map_err(|e| E2eflowError::ServiceStartFailure {
            target: target_ref.to_string(),
            detail: format!("failed to spawn '{}': {}", target.command, e),
            help: Some(format!("Check that '{}' is installed and on PATH", target.command)),
        })?;

        let stdout = child.stdout.take().ok_or_else(|| E2eflowError::ServiceStartFailure {
            target: target_ref.to_string(),
            detail: "could not capture server output".to_string(),
            help: None,
        })?;

        let fallback_port = overrides.port.or(target.port);
        let tls = target.tls;
        let (tx, rx) = mpsc::channel(4);
        let target_name = target_ref.to_string();

        // Reader task outlives the pipeline stage: it keeps draining output
        // so the pipe never fills, and it holds the child handle so the
        // server stays up after the handle is abandoned.
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            let mut ready_sent = false;

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if ready_sent || !ready.is_match(&line) {
                            continue;
                        }
                        // A matched line with no capturable port and no
                        // configured fallback fails right away instead of
                        // stalling to the readiness timeout.
                        let event = match extract_port(&ready, &line).or(fallback_port) {
                            Some(port) => {
                                tracing::debug!(server = %target_name, port, "readiness line matched");
                                ServiceEvent::ready(port, tls)
                            }
                            None => ServiceEvent::failed(
                                "readiness line matched but carried no port and none is configured; \
                                 set 'port' on the serve target or pass --port",
                            ),
                        };
                        let _ = tx.send(event).await;
                        ready_sent = true;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        if !ready_sent {
                            let _ = tx
                                .send(ServiceEvent::failed(format!("output read error: {}", e)))
                                .await;
                        }
                        return;
                    }
                }
            }

            // Output closed; the child has exited or shut its pipe.
            if !ready_sent {
                let detail = match child.wait().await {
                    Ok(status) => format!("server exited before readiness ({})", status),
                    Err(e) => format!("server exited before readiness: {}", e),
                };
                let _ = tx.send(ServiceEvent::failed(detail)).await;
            } else {
                // Keep waiting so the child is reaped whenever it ends.
                let _ = child.wait().await;
            }
        });

        Ok(ServiceHandle::new(rx))
    }
}

/// Pull the port out of a readiness line via the pattern's first
/// non-empty capture group
fn extract_port(pattern: &Regex, line: &str) -> Option<u16> {
    let captures = pattern.captures(line)?;
    captures
        .iter()
        .skip(1)
        .flatten()
        .next()
        .and_then(|m| m.as_str().parse().ok())
}
