//! Account gateway port
//!
//! Defines the interface for reading and mutating accounts held by the
//! remote bank service.

use rust_decimal::Decimal;

use crate::domain::result::Result;
use crate::domain::{Account, AccountType};

/// Remote account gateway trait
///
/// Every call is one stateless, blocking round trip. Implementations hold no
/// session and no copy of the accounts; callers re-list after a mutation.
pub trait AccountGateway: Send + Sync {
    /// Gateway name used in logs (e.g., "soap")
    fn name(&self) -> &str;

    /// Fetch every account, in server order
    fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Ask the server to create an account. The new id is not returned.
    fn create_account(&self, balance: Decimal, account_type: AccountType) -> Result<()>;

    /// Ask the server to delete an account
    ///
    /// Returns the flag reported by the server; `false` usually means the id
    /// did not exist.
    fn delete_account(&self, id: i64) -> Result<bool>;
}
