//! Account domain model

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::Error;

/// Kind of bank account. The remote service only knows these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Current account ("COURANT" on the wire)
    Checking,
    /// Savings account ("EPARGNE" on the wire)
    Savings,
}

impl AccountType {
    pub const ALL: [AccountType; 2] = [AccountType::Checking, AccountType::Savings];

    /// Symbolic name used by the remote service
    pub fn wire_name(&self) -> &'static str {
        match self {
            AccountType::Checking => "COURANT",
            AccountType::Savings => "EPARGNE",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
        }
    }

    /// Parse user input: English labels or wire names, any case
    pub fn parse_label(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "checking" | "courant" => Some(AccountType::Checking),
            "savings" | "epargne" => Some(AccountType::Savings),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Exact match on the wire name. Anything else is a protocol error.
impl FromStr for AccountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountType::ALL
            .into_iter()
            .find(|t| t.wire_name() == s)
            .ok_or_else(|| {
                Error::protocol(
                    "type",
                    format!("unknown account type '{}' (expected COURANT or EPARGNE)", s),
                )
            })
    }
}

/// A bank account as reported by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Server-assigned identifier, absent until the server persists the account
    pub id: Option<i64>,
    pub balance: Decimal,
    pub created_at: NaiveDate,
    pub account_type: AccountType,
}

impl Account {
    pub fn new(
        id: Option<i64>,
        balance: Decimal,
        created_at: NaiveDate,
        account_type: AccountType,
    ) -> Self {
        Self {
            id,
            balance,
            created_at,
            account_type,
        }
    }

    /// True once the server has assigned an identifier
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
