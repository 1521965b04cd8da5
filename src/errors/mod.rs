// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! Error types with remediation hints
//!
//! Fatal configuration and tool-resolution errors carry a human-readable
//! hint (what flag to pass or what manual step to run) rather than a raw
//! fault trace.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for e2eflow operations
pub type E2eflowResult<T> = Result<T, E2eflowError>;

/// Main error type for e2eflow
#[derive(Error, Debug, Diagnostic)]
pub enum E2eflowError {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Options '{first}' and '{second}' are mutually exclusive")]
    #[diagnostic(
        code(e2eflow::configuration_conflict),
        help("Pass either {first} or {second}, not both. A dev-server target derives the base URL itself.")
    )]
    ConfigurationConflict { first: String, second: String },

    #[error("Invalid dev-server configuration for '{target}': {reason}")]
    #[diagnostic(code(e2eflow::invalid_service_config))]
    InvalidServiceConfig {
        target: String,
        reason: String,
        #[help]
        help: Option<String>,
    },

    #[error("Computed field '{field}' was already recorded by an earlier stage")]
    #[diagnostic(
        code(e2eflow::computed_field_conflict),
        help("Computed fields are append-only; a field may be recorded at most once per run")
    )]
    ComputedFieldConflict { field: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Service Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Dev server '{target}' failed to start: {detail}")]
    #[diagnostic(code(e2eflow::service_start_failure))]
    ServiceStartFailure {
        target: String,
        detail: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Tool Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Tool '{tool}' not found")]
    #[diagnostic(code(e2eflow::tool_not_found), help("{suggestion}"))]
    ToolNotFound { tool: String, suggestion: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Execution Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Test runner reported failure{}", detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    #[diagnostic(code(e2eflow::subprocess_failure))]
    SubprocessFailure { detail: Option<String> },

    #[error("Stage '{stage}' (#{index}) failed")]
    #[diagnostic(code(e2eflow::stage_failed))]
    StageFailed {
        stage: String,
        index: usize,
        #[source]
        cause: Box<E2eflowError>,
    },

    #[error("Execution failed: {message}")]
    #[diagnostic(code(e2eflow::execution_failed))]
    ExecutionFailed {
        message: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(e2eflow::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(e2eflow::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    #[error("No spec files matched pattern: {pattern}")]
    #[diagnostic(
        code(e2eflow::no_spec_files),
        help("Check that files matching '{pattern}' exist under your project root")
    )]
    NoSpecFiles { pattern: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(e2eflow::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(e2eflow::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(e2eflow::json_error))]
    Json { message: String },

    #[error("Glob pattern error: {message}")]
    #[diagnostic(code(e2eflow::glob_error))]
    GlobPattern { message: String },
}

impl From<std::io::Error> for E2eflowError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for E2eflowError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for E2eflowError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<glob::PatternError> for E2eflowError {
    fn from(e: glob::PatternError) -> Self {
        Self::GlobPattern { message: e.to_string() }
    }
}

impl E2eflowError {
    /// Mutually exclusive options were both set
    pub fn conflict(first: &str, second: &str) -> Self {
        Self::ConfigurationConflict {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    /// Driver-update tool resolution exhausted every probe location
    pub fn driver_tool_not_found(probed: &[PathBuf]) -> Self {
        let locations = probed
            .iter()
            .map(|p| format!("  - {}", p.display()))
            .collect::<Vec<_>>()
            .join("\n");

        Self::ToolNotFound {
            tool: "webdriver-manager".to_string(),
            suggestion: format!(
                "Probed:\n{}\nUpdate the driver manually ('e2eflow update' or 'webdriver-manager update'), \
                 then re-run without --update-driver.",
                locations
            ),
        }
    }

    /// Invalid service configuration with context
    pub fn invalid_service(target: &str, reason: impl Into<String>) -> Self {
        Self::InvalidServiceConfig {
            target: target.to_string(),
            reason: reason.into(),
            help: None,
        }
    }

    /// Returns true for the variants that represent a failed terminal event
    /// rather than a raised fault.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, Self::SubprocessFailure { .. })
    }
}
