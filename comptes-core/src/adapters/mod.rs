//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - SOAP 1.1 envelopes (quick-xml) and an HTTP transport (reqwest)
//! - RemoteAccountClient for the AccountGateway port

pub mod envelope;
pub mod remote;
pub mod soap;

#[cfg(test)]
pub mod soap_mock;
