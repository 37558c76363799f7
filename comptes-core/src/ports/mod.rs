//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod clock;
mod gateway;

pub use clock::{Clock, FixedClock, SystemClock};
pub use gateway::AccountGateway;
