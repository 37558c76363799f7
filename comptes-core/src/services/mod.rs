//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions.

mod accounts;

pub use accounts::AccountService;
