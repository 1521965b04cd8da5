// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! Update command - refresh the browser driver outside a pipeline run

use miette::Result;
use std::path::PathBuf;

use crate::runner::locate_driver_tool;
use crate::utils::{create_spinner, print_success};

/// Update the browser driver
pub async fn run(_config: PathBuf, verbose: bool) -> Result<()> {
    let root = std::env::current_dir()
        .map_err(|e| miette::miette!("Failed to get current directory: {}", e))?;

    if verbose {
        let tool = locate_driver_tool(&root)?;
        tracing::info!(tool = %tool.display(), "driver tool resolved");
    }

    let spinner = create_spinner("Updating browser driver...");
    let outcome = crate::runner::update_driver(&root).await;
    spinner.finish_and_clear();

    outcome?;
    print_success("Browser driver is up to date");
    Ok(())
}
