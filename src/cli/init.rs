// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! Init command - create a starter workspace file

use colored::Colorize;
use miette::Result;
use std::path::Path;

use crate::utils::{print_info, print_success};

const WORKSPACE_FILE: &str = ".e2eflow.yaml";

/// Initialize a new e2eflow workspace
pub async fn run(name: Option<String>, _verbose: bool) -> Result<()> {
    let path = Path::new(WORKSPACE_FILE);

    if path.exists() {
        return Err(miette::miette!(
            "{} already exists; remove it first to re-initialize",
            WORKSPACE_FILE
        ));
    }

    let name = match name {
        Some(name) => name,
        None => std::env::current_dir()
            .ok()
            .and_then(|d| d.file_name().map(|n| n.to_string_lossy().to_string()))
            .unwrap_or_else(|| "my-app".to_string()),
    };

    let content = starter_workspace(&name);
    std::fs::write(path, content)
        .map_err(|e| miette::miette!("Failed to write {}: {}", WORKSPACE_FILE, e))?;

    print_success(&format!("Created {}", WORKSPACE_FILE));
    println!();
    println!("{}", "Next steps:".bold());
    print_info("edit the serve target to match how your app starts");
    print_info("e2eflow validate");
    print_info(&format!("e2eflow run --dev-server {}:serve", name));

    Ok(())
}

fn starter_workspace(name: &str) -> String {
    format!(
        r#"version: "1"
name: {name}

runner:
  config: e2e/runner.conf.js
  specs:
    - "e2e/**/*.e2e.js"

projects:
  {name}:
    targets:
      serve:
        command: npm
        args: ["start"]
        port: 4200
        configurations:
          production:
            args: ["run", "start:prod"]
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkspaceConfig;

    #[test]
    fn starter_workspace_parses_and_resolves() {
        use std::str::FromStr;

        let yaml = starter_workspace("demo");
        let workspace = WorkspaceConfig::from_yaml(&yaml).unwrap();
        assert_eq!(workspace.name, "demo");

        let target_ref = crate::config::TargetRef::from_str("demo:serve:production").unwrap();
        let target = workspace.resolve_target(&target_ref).unwrap();
        assert_eq!(target.args, vec!["run", "start:prod"]);
        assert_eq!(target.port, Some(4200));
    }
}
