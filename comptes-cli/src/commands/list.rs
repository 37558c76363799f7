//! List command - show every account

use anyhow::Result;
use colored::Colorize;

use comptes_core::services::AccountService;

use super::{finish, get_context};
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.account_service.list_accounts();

    finish(result, json, |accounts| {
        if accounts.is_empty() {
            output::info("No accounts");
            return Ok(());
        }

        let mut table = output::create_table();
        table.set_header(vec!["ID", "Balance", "Created", "Type"]);
        for account in &accounts {
            table.add_row(vec![
                account.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
                account.balance.to_string(),
                account.created_at.to_string(),
                account.account_type.label().to_string(),
            ]);
        }

        println!("{}", table);
        println!(
            "{} {}  ({} accounts)",
            "Total:".bold(),
            AccountService::total_balance(&accounts),
            accounts.len()
        );
        Ok(())
    })
}
