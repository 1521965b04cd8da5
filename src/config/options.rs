// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! Run options and computed-field merging
//!
//! `RunOptions` holds the caller-supplied inputs for one pipeline run.
//! Stages never mutate it; values computed along the way accumulate in
//! `ComputedFields`, and the two are merged into a `RunnerInvocation` just
//! before the final stage consumes them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::E2eflowError;

/// Reference to a serve target: `project:target[:configuration]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRef {
    pub project: String,
    pub target: String,
    pub configuration: Option<String>,
}

impl FromStr for TargetRef {
    type Err = E2eflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();

        let valid = matches!(parts.len(), 2 | 3) && parts.iter().all(|p| !p.is_empty());
        if !valid {
            return Err(E2eflowError::invalid_service(
                s,
                "expected 'project:target' or 'project:target:configuration'",
            ));
        }

        Ok(Self {
            project: parts[0].to_string(),
            target: parts[1].to_string(),
            configuration: parts.get(2).map(|c| c.to_string()),
        })
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project, self.target)?;
        if let Some(ref config) = self.configuration {
            write!(f, ":{}", config)?;
        }
        Ok(())
    }
}

/// Caller-supplied options for one pipeline run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Project root; subprocesses run here and probe paths resolve against it
    pub root: PathBuf,

    /// Path to the runner's own configuration file
    pub tool_config: PathBuf,

    /// Entry point of the runner tool; probed under the root when unset
    pub runner_entry: Option<PathBuf>,

    /// Serve target to launch before running (mutually exclusive with `base_url`)
    pub dev_server: Option<TargetRef>,

    /// Spec file patterns; empty means "let the runner config decide"
    pub specs: Vec<String>,

    /// Suite selector
    pub suite: Option<String>,

    /// Non-executing introspection mode of the runner
    pub element_explorer: bool,

    /// Update the browser driver before running
    pub update_driver: bool,

    /// Host used for base-URL synthesis
    pub host: String,

    /// Port override for the launched server
    pub port: Option<u16>,

    /// Explicit base URL (mutually exclusive with `dev_server`)
    pub base_url: Option<String>,

    /// Public-facing address override, used verbatim for the base URL
    pub public_host: Option<String>,

    /// Synthesize https URLs
    pub tls: bool,
}

impl RunOptions {
    /// Pre-flight validation, run once before any stage starts.
    ///
    /// `dev_server` and `base_url` are mutually exclusive: the dev-server
    /// stage exists to derive the base URL, so an explicit one contradicts it.
    pub fn validate(&self) -> Result<(), E2eflowError> {
        if self.dev_server.is_some() && self.base_url.is_some() {
            return Err(E2eflowError::conflict("--dev-server", "--base-url"));
        }
        Ok(())
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            tool_config: PathBuf::from("e2e/runner.conf.js"),
            runner_entry: None,
            dev_server: None,
            specs: Vec::new(),
            suite: None,
            element_explorer: false,
            update_driver: false,
            host: "localhost".to_string(),
            port: None,
            base_url: None,
            public_host: None,
            tls: false,
        }
    }
}

/// Append-only accumulator for values computed by earlier stages.
///
/// Replaces in-place mutation of the shared options object: a field is
/// recorded at most once, and later stages read it through the merge step.
#[derive(Debug, Clone, Default)]
pub struct ComputedFields {
    base_url: Option<String>,
}

impl ComputedFields {
    /// Record the base URL derived from a launched service. Recording twice
    /// is a contract violation, not a silent overwrite.
    pub fn record_base_url(&mut self, url: String) -> Result<(), E2eflowError> {
        if self.base_url.is_some() {
            return Err(E2eflowError::ComputedFieldConflict {
                field: "base_url".to_string(),
            });
        }
        self.base_url = Some(url);
        Ok(())
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }
}

/// The merged settings the final run stage consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerInvocation {
    /// Absolute path to the runner's configuration file
    pub tool_config: PathBuf,

    /// Final base URL; caller-supplied value wins over a computed one
    pub base_url: Option<String>,

    /// Resolved spec files; empty stays empty ("unset" for the runner)
    pub specs: Vec<PathBuf>,

    /// Suite selector, omitted when absent
    pub suite: Option<String>,

    /// Introspection mode flag
    pub element_explorer: bool,
}

impl RunnerInvocation {
    /// Merge the read-only base options with the computed fields.
    ///
    /// Caller-supplied values take precedence over computed ones; the
    /// conflicting case (both explicitly set) is rejected up front by
    /// `RunOptions::validate`, so precedence here is a plain `or`.
    pub fn merge(opts: &RunOptions, computed: &ComputedFields) -> Result<Self, E2eflowError> {
        let base_url = opts
            .base_url
            .clone()
            .or_else(|| computed.base_url().map(String::from));

        let tool_config = if opts.tool_config.is_absolute() {
            opts.tool_config.clone()
        } else {
            opts.root.join(&opts.tool_config)
        };

        Ok(Self {
            tool_config,
            base_url,
            specs: resolve_spec_patterns(&opts.specs, &opts.root)?,
            suite: opts.suite.clone(),
            element_explorer: opts.element_explorer,
        })
    }
}

/// Resolve spec glob patterns relative to the project root
fn resolve_spec_patterns(patterns: &[String], root: &Path) -> Result<Vec<PathBuf>, E2eflowError> {
    let mut files = Vec::new();

    for pattern in patterns {
        let full_pattern = if Path::new(pattern).is_absolute() {
            pattern.clone()
        } else {
            root.join(pattern).to_string_lossy().to_string()
        };

        let matches: Vec<_> = glob::glob(&full_pattern)?
            .filter_map(Result::ok)
            .collect();

        if matches.is_empty() {
            return Err(E2eflowError::NoSpecFiles {
                pattern: pattern.clone(),
            });
        }

        files.extend(matches);
    }

    Ok(files)
}
