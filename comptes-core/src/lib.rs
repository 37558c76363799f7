//! Comptes Core - client for the remote bank-account service
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Account, AccountType, error and result types
//! - **ports**: Trait definitions for external dependencies (AccountGateway, Clock)
//! - **services**: AccountService, the consumer-facing operations
//! - **adapters**: SOAP envelopes, HTTP transport and the remote client

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::remote::RemoteAccountClient;
use config::Config;
use services::AccountService;

// Re-export commonly used types at crate root
pub use config::Endpoint;
pub use domain::result::{Error, ErrorKind, OperationResult};
pub use domain::{Account, AccountType};

/// Main context for client operations
///
/// Holds the loaded configuration and the account service wired to the
/// configured endpoint.
pub struct ComptesContext {
    pub config: Config,
    pub account_service: AccountService,
}

impl ComptesContext {
    /// Create a context from the settings in `dir`
    pub fn new(dir: &Path) -> Result<Self> {
        let config = Config::load(dir)?;
        Self::from_config(config)
    }

    /// Create a context from an already loaded configuration
    pub fn from_config(config: Config) -> Result<Self> {
        let client = RemoteAccountClient::new(&config.endpoint)
            .with_context(|| format!("Failed to create client for {}", config.endpoint.url))?;
        let account_service = AccountService::new(Arc::new(client));

        Ok(Self {
            config,
            account_service,
        })
    }
}
