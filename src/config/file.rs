// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! Workspace file definition structures
//!
//! Defines the schema for .e2eflow.yaml files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::TargetRef;
use crate::errors::E2eflowError;

/// Workspace definition from .e2eflow.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Config version (for future compatibility)
    #[serde(default = "default_version")]
    pub version: String,

    /// Workspace name
    pub name: String,

    /// Default runner settings, overridable per invocation
    #[serde(default)]
    pub runner: RunnerDefaults,

    /// Projects with their serve targets
    #[serde(default)]
    pub projects: HashMap<String, Project>,
}

fn default_version() -> String {
    "1".to_string()
}

/// Default runner settings from the workspace file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerDefaults {
    /// Path to the runner's own configuration file
    #[serde(default)]
    pub config: Option<PathBuf>,

    /// Entry point of the runner tool (a JS module run via node)
    #[serde(default)]
    pub entry: Option<PathBuf>,

    /// Default spec patterns
    #[serde(default)]
    pub specs: Vec<String>,

    /// Default suite selector
    #[serde(default)]
    pub suite: Option<String>,

    /// Default host for base-URL synthesis
    #[serde(default)]
    pub host: Option<String>,
}

/// A project with named serve targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub targets: HashMap<String, ServeTarget>,
}

/// A serve target: a long-lived command the pipeline can launch as a
/// dev server and wait on for readiness
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeTarget {
    /// Command to execute
    pub command: String,

    /// Command arguments
    #[serde(default)]
    pub args: Vec<String>,

    /// Port the server is expected to bind when its output names none
    #[serde(default)]
    pub port: Option<u16>,

    /// Whether the server speaks TLS
    #[serde(default)]
    pub tls: bool,

    /// Regex applied to output lines to detect readiness; the first capture
    /// group, when present, is the bound port
    #[serde(default)]
    pub ready_pattern: Option<String>,

    /// Environment variables for the serve command
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Named configuration overlays (e.g. "production")
    #[serde(default)]
    pub configurations: HashMap<String, TargetOverlay>,
}

/// Per-configuration overrides layered on top of a serve target
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetOverlay {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Option<Vec<String>>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub tls: Option<bool>,
    #[serde(default)]
    pub ready_pattern: Option<String>,
    #[serde(default)]
    pub env: Option<HashMap<String, String>>,
}

impl WorkspaceConfig {
    /// Load workspace config from a YAML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, E2eflowError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| E2eflowError::FileReadError {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        Self::from_yaml(&content)
    }

    /// Parse workspace config from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, E2eflowError> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, E2eflowError> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Resolve a target reference into a runnable serve target, applying the
    /// named configuration overlay when one is requested.
    ///
    /// Unknown project, target, or configuration is `InvalidServiceConfig`.
    pub fn resolve_target(&self, target_ref: &TargetRef) -> Result<ServeTarget, E2eflowError> {
        let project = self.projects.get(&target_ref.project).ok_or_else(|| {
            E2eflowError::invalid_service(
                &target_ref.to_string(),
                format!("unknown project '{}'", target_ref.project),
            )
        })?;

        let base = project.targets.get(&target_ref.target).ok_or_else(|| {
            E2eflowError::invalid_service(
                &target_ref.to_string(),
                format!(
                    "project '{}' has no target '{}'",
                    target_ref.project, target_ref.target
                ),
            )
        })?;

        let mut resolved = base.clone();

        if let Some(ref config_name) = target_ref.configuration {
            let overlay = base.configurations.get(config_name).ok_or_else(|| {
                E2eflowError::invalid_service(
                    &target_ref.to_string(),
                    format!("unknown configuration '{}'", config_name),
                )
            })?;
            resolved.apply(overlay);
        }

        resolved.validate(target_ref)?;
        Ok(resolved)
    }
}

impl ServeTarget {
    /// Layer a configuration overlay on top of this target (overlay wins)
    fn apply(&mut self, overlay: &TargetOverlay) {
        if let Some(ref command) = overlay.command {
            self.command = command.clone();
        }
        if let Some(ref args) = overlay.args {
            self.args = args.clone();
        }
        if let Some(port) = overlay.port {
            self.port = Some(port);
        }
        if let Some(tls) = overlay.tls {
            self.tls = tls;
        }
        if let Some(ref pattern) = overlay.ready_pattern {
            self.ready_pattern = Some(pattern.clone());
        }
        if let Some(ref env) = overlay.env {
            self.env.extend(env.clone());
        }
    }

    /// Validate the combined configuration before running
    fn validate(&self, target_ref: &TargetRef) -> Result<(), E2eflowError> {
        if self.command.trim().is_empty() {
            return Err(E2eflowError::invalid_service(
                &target_ref.to_string(),
                "serve command is empty",
            ));
        }

        if let Some(ref pattern) = self.ready_pattern {
            regex::Regex::new(pattern).map_err(|e| {
                E2eflowError::invalid_service(
                    &target_ref.to_string(),
                    format!("invalid ready_pattern: {}", e),
                )
            })?;
        }

        Ok(())
    }
}
