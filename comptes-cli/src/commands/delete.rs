//! Delete command - remove an account

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;

use comptes_core::domain::result::Result as CoreResult;
use comptes_core::Error;

use super::{finish, get_context};
use crate::output;

pub fn run(id: i64, force: bool, json: bool) -> Result<()> {
    let ctx = get_context()?;

    let proceed = confirm(id, force, json, || {
        Ok(Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?)
    })?;
    if !proceed {
        return Ok(());
    }

    let result = require_deleted(id, ctx.account_service.delete_account(id));

    finish(result, json, |id| {
        output::success(&format!("Account {} deleted", id));
        Ok(())
    })
}

/// Confirm removal unless --force
///
/// In JSON mode the prompt text goes to stderr so stdout stays a single
/// JSON document.
fn confirm(
    id: i64,
    force: bool,
    json: bool,
    ask: impl FnOnce() -> Result<bool>,
) -> Result<bool> {
    if force {
        return Ok(true);
    }

    let warning = format!("This will delete account {} on the server.", id);
    if json {
        eprintln!("{}", warning.yellow());
    } else {
        println!("\n{}", warning.yellow());
    }

    let confirmed = ask()?;
    if !confirmed {
        if json {
            eprintln!("{}", "Cancelled".dimmed());
        } else {
            println!("{}\n", "Cancelled".dimmed());
        }
    }
    Ok(confirmed)
}

/// A delete the server did not perform is a refusal, whatever the output mode
fn require_deleted(id: i64, result: CoreResult<bool>) -> CoreResult<i64> {
    match result? {
        true => Ok(id),
        false => Err(Error::domain(format!(
            "account {} was not deleted: the server reported no such account",
            id
        ))),
    }
}
