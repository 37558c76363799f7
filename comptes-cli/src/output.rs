//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use serde::Serialize;

use comptes_core::{Error, ErrorKind, OperationResult};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Print an operation result as pretty JSON
pub fn json<T: Serialize>(result: &OperationResult<T>) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

/// User-facing message for a failed remote call, chosen by error kind
pub fn describe(error: &Error) -> String {
    let headline = match error.kind() {
        ErrorKind::Connectivity => "Could not reach the bank server.",
        ErrorKind::Protocol => "The bank server sent a reply that could not be understood.",
        ErrorKind::Domain => "The bank server refused the request.",
        ErrorKind::Config => "The client is not configured correctly.",
        ErrorKind::Internal => "Unexpected error.",
    };
    format!("{}\n{}", headline, error)
}
