//! CLI command implementations

pub mod config;
pub mod create;
pub mod delete;
pub mod list;

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use comptes_core::domain::result::Result as CoreResult;
use comptes_core::{ComptesContext, OperationResult};

use crate::output;

/// Get the comptes directory from environment or default
pub fn get_comptes_dir() -> Result<PathBuf> {
    comptes_core::config::default_dir()
}

/// Get comptes context
pub fn get_context() -> Result<ComptesContext> {
    let dir = get_comptes_dir()?;
    ComptesContext::new(&dir).context("Failed to initialize comptes context")
}

/// Print a remote call outcome
///
/// With `json` the outcome is printed as an OperationResult and a failure
/// exits with status 1. Otherwise `render` gets the value, and an error
/// becomes a message chosen by its kind.
pub fn finish<T: Serialize>(
    result: CoreResult<T>,
    json: bool,
    render: impl FnOnce(T) -> Result<()>,
) -> Result<()> {
    if json {
        let failed = result.is_err();
        output::json(&OperationResult::from(result))?;
        if failed {
            std::process::exit(1);
        }
        return Ok(());
    }

    match result {
        Ok(value) => render(value),
        Err(e) => Err(anyhow::anyhow!(output::describe(&e))),
    }
}
