//! Create command - open a new account

use anyhow::Result;
use rust_decimal::Decimal;

use comptes_core::AccountType;

use super::{finish, get_context};
use crate::output;

/// Clap value parser for the account type
pub fn parse_account_type(input: &str) -> std::result::Result<AccountType, String> {
    AccountType::parse_label(input)
        .ok_or_else(|| format!("unknown account type '{}' (use checking or savings)", input))
}

pub fn run(balance: Decimal, account_type: AccountType, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.account_service.create_account(balance, account_type);

    finish(result, json, |()| {
        output::success(&format!("Created {} account with balance {}", account_type, balance));
        output::info("Run `comptes list` to see its id");
        Ok(())
    })
}
