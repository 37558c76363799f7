//! Remote bank service client
//!
//! Implements [`AccountGateway`] over the SOAP transport. The service exposes
//! three operations:
//! - `getComptes` returns a sequence of `{id, solde, dateCreation, type}`
//! - `createCompte(solde, type)` returns nothing of interest
//! - `deleteCompte(id)` returns a boolean

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::envelope::{SoapArg, SoapCall, SoapValue};
use super::soap::SoapClient;
use crate::config::Endpoint;
use crate::domain::result::{Error, Result};
use crate::domain::{Account, AccountType};
use crate::ports::{AccountGateway, Clock, SystemClock};

pub const LIST_ACCOUNTS: &str = "getComptes";
pub const CREATE_ACCOUNT: &str = "createCompte";
pub const DELETE_ACCOUNT: &str = "deleteCompte";

/// Pattern applied to the leading characters of `dateCreation`
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Account client for the remote bank service
pub struct RemoteAccountClient {
    soap: SoapClient,
    clock: Arc<dyn Clock>,
}

impl RemoteAccountClient {
    /// Create a client using the system clock
    pub fn new(endpoint: &Endpoint) -> Result<Self> {
        Self::with_clock(endpoint, Arc::new(SystemClock))
    }

    /// Create a client with an explicit clock for the creation-date fallback
    pub fn with_clock(endpoint: &Endpoint, clock: Arc<dyn Clock>) -> Result<Self> {
        Ok(Self {
            soap: SoapClient::new(endpoint)?,
            clock,
        })
    }

    pub fn endpoint_url(&self) -> &str {
        self.soap.url()
    }

    /// Map one reply element to an Account
    ///
    /// `id`, `solde` and `dateCreation` have fallbacks; `type` does not.
    fn map_account(value: &SoapValue, index: usize, today: NaiveDate) -> Result<Account> {
        if !value.is_struct() {
            return Err(Error::protocol(
                "return",
                format!("element {} is not a structure", index),
            ));
        }
        let text = |name: &str| value.field(name).and_then(SoapValue::as_text);

        let account_type = match text("type") {
            Some(raw) => raw.trim().parse::<AccountType>().map_err(|e| match e {
                Error::Protocol { field, message } => {
                    Error::protocol(field, format!("element {}: {}", index, message))
                }
                other => other,
            })?,
            None => {
                return Err(Error::protocol(
                    "type",
                    format!("element {} has no account type", index),
                ))
            }
        };

        Ok(Account {
            id: parse_id(text("id")),
            balance: parse_balance(text("solde")),
            created_at: parse_date(text("dateCreation"), today),
            account_type,
        })
    }
}

/// Integer id; absent or unparseable gives None
fn parse_id(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

/// Decimal balance; absent or unparseable gives zero
///
/// Accepts scientific notation (`1.0E7`) as written by Java doubles.
/// Digit separators are not part of the double syntax and are refused.
/// Values outside `Decimal`'s range also give zero, with a warning.
fn parse_balance(raw: Option<&str>) -> Decimal {
    let Some(raw) = raw.map(str::trim) else {
        return Decimal::ZERO;
    };
    if raw.is_empty() {
        return Decimal::ZERO;
    }
    if raw.contains('_') {
        warn!(value = raw, "balance is not a number, using 0");
        return Decimal::ZERO;
    }
    raw.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&raw.to_lowercase()))
        .unwrap_or_else(|e| {
            warn!(value = raw, error = %e, "balance unparseable or out of range, using 0");
            Decimal::ZERO
        })
}

/// Calendar date from the leading `YYYY-MM-DD`; otherwise `today`
fn parse_date(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    raw.map(str::trim)
        .and_then(|s| s.get(..10))
        .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
        .unwrap_or_else(|| {
            debug!(value = ?raw, "unparseable creation date, using today");
            today
        })
}

/// Boolean reply payload
fn parse_flag(values: &[SoapValue]) -> Result<bool> {
    let raw = values
        .first()
        .ok_or_else(|| Error::protocol("return", "reply carries no value"))?;
    let text = raw
        .as_text()
        .ok_or_else(|| Error::protocol("return", "expected a boolean, got a structure or nil"))?;

    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(Error::protocol(
            "return",
            format!("expected a boolean, got '{}'", other),
        )),
    }
}

impl AccountGateway for RemoteAccountClient {
    fn name(&self) -> &str {
        "soap"
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        let values = self.soap.call(&SoapCall::new(LIST_ACCOUNTS))?;
        let today = self.clock.today();

        let accounts = values
            .iter()
            .enumerate()
            .map(|(index, value)| Self::map_account(value, index, today))
            .collect::<Result<Vec<_>>>()?;

        info!(count = accounts.len(), "accounts listed");
        Ok(accounts)
    }

    fn create_account(&self, balance: Decimal, account_type: AccountType) -> Result<()> {
        let call = SoapCall::new(CREATE_ACCOUNT)
            .arg("solde", SoapArg::Decimal(balance))
            .arg("type", SoapArg::Text(account_type.wire_name().to_string()));
        self.soap.call(&call)?;

        info!(%balance, account_type = account_type.wire_name(), "account created");
        Ok(())
    }

    fn delete_account(&self, id: i64) -> Result<bool> {
        let call = SoapCall::new(DELETE_ACCOUNT).arg("id", SoapArg::Long(id));
        let deleted = parse_flag(&self.soap.call(&call)?)?;

        info!(id, deleted, "account delete answered");
        Ok(deleted)
    }
}
