// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! Validate command - check the workspace configuration

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::{TargetRef, WorkspaceConfig};
use crate::utils::{print_error, print_success, print_warning};

/// Validate the workspace file
pub async fn run(config_path: PathBuf, verbose: bool) -> Result<()> {
    if !config_path.exists() {
        return Err(miette::miette!(
            "Workspace file not found: {}\n\n\
             Run 'e2eflow init' to create a new workspace.",
            config_path.display()
        ));
    }

    let workspace = WorkspaceConfig::from_file(&config_path)?;

    println!();
    println!("{}: {}", "Workspace".bold(), workspace.name);

    let mut errors = 0usize;

    // Every target, including each configuration overlay, must resolve
    for (project_name, project) in &workspace.projects {
        for (target_name, target) in &project.targets {
            let mut refs = vec![format!("{}:{}", project_name, target_name)];
            refs.extend(
                target
                    .configurations
                    .keys()
                    .map(|c| format!("{}:{}:{}", project_name, target_name, c)),
            );

            for reference in refs {
                let target_ref = TargetRef::from_str(&reference)?;
                match workspace.resolve_target(&target_ref) {
                    Ok(_) => {
                        if verbose {
                            print_success(&reference);
                        }
                    }
                    Err(e) => {
                        print_error(&format!("{}: {}", reference, e));
                        errors += 1;
                    }
                }
            }
        }
    }

    if workspace.runner.config.is_none() {
        print_warning("runner.config is unset; runs will use e2e/runner.conf.js");
    }

    if workspace.projects.is_empty() {
        print_warning("no projects defined; --dev-server will have nothing to launch");
    }

    println!();
    if errors == 0 {
        println!("{}", "Workspace configuration is valid".green());
        Ok(())
    } else {
        Err(miette::miette!(
            "Workspace configuration has {} invalid target(s)",
            errors
        ))
    }
}
