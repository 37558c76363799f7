//! Account service - the three remote operations for consumers
//!
//! Two surfaces over the same gateway:
//! - typed operations returning [`Result`], which keep "no accounts",
//!   "server unreachable" and "reply malformed" apart
//! - a lenient boundary returning `bool` / an empty list, logging whatever
//!   it swallows

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{Account, AccountType};
use crate::ports::AccountGateway;

pub struct AccountService {
    gateway: Arc<dyn AccountGateway>,
}

impl AccountService {
    pub fn new(gateway: Arc<dyn AccountGateway>) -> Self {
        Self { gateway }
    }

    /// Fetch every account from the server
    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        debug!(gateway = self.gateway.name(), "listing accounts");
        self.gateway.list_accounts()
    }

    /// Create an account; re-list to observe its id
    pub fn create_account(&self, balance: Decimal, account_type: AccountType) -> Result<()> {
        debug!(gateway = self.gateway.name(), %balance, %account_type, "creating account");
        self.gateway.create_account(balance, account_type)
    }

    /// Delete an account; `Ok(false)` when the server reports nothing was deleted
    pub fn delete_account(&self, id: i64) -> Result<bool> {
        debug!(gateway = self.gateway.name(), id, "deleting account");
        self.gateway.delete_account(id)
    }

    /// Accounts, or an empty list on any failure
    pub fn list_accounts_or_empty(&self) -> Vec<Account> {
        self.list_accounts()
            .unwrap_or_else(|e| swallow("list_accounts", e, Vec::new()))
    }

    /// True when the server accepted the creation
    pub fn try_create_account(&self, balance: Decimal, account_type: AccountType) -> bool {
        self.create_account(balance, account_type)
            .map(|()| true)
            .unwrap_or_else(|e| swallow("create_account", e, false))
    }

    /// The server's flag, or false on any failure
    pub fn try_delete_account(&self, id: i64) -> bool {
        self.delete_account(id)
            .unwrap_or_else(|e| swallow("delete_account", e, false))
    }

    /// Sum of the balances
    pub fn total_balance(accounts: &[Account]) -> Decimal {
        accounts.iter().map(|a| a.balance).sum()
    }
}

fn swallow<T>(operation: &str, error: Error, fallback: T) -> T {
    warn!(
        operation,
        kind = error.kind().as_str(),
        error = %error,
        "remote call failed"
    );
    fallback
}
