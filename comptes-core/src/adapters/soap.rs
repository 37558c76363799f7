//! SOAP transport
//!
//! Posts one envelope per call to the configured endpoint and decodes the
//! reply. Idle connections are not kept: every call opens its own connection.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tracing::debug;

use super::envelope::{parse_response, SoapCall, SoapValue};
use crate::config::Endpoint;
use crate::domain::result::{Error, ErrorKind, Result};

/// Transport-level timeout applied by the HTTP client
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// SOAP 1.1 client bound to one endpoint
#[derive(Debug, Clone)]
pub struct SoapClient {
    client: Client,
    url: String,
    namespace: String,
}

impl SoapClient {
    /// Create a client for the given endpoint
    pub fn new(endpoint: &Endpoint) -> Result<Self> {
        endpoint.validate()?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: endpoint.url.clone(),
            namespace: endpoint.namespace.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Perform one blocking call and return the values carried by the reply
    pub fn call(&self, call: &SoapCall) -> Result<Vec<SoapValue>> {
        let envelope = call.to_envelope(&self.namespace)?;
        debug!(method = call.method(), url = %self.url, "sending SOAP request");

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{}{}\"", self.namespace, call.method()))
            .body(envelope)
            .send()
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        let body = response.text().map_err(|e| self.map_request_error(e))?;
        debug!(
            method = call.method(),
            status = status.as_u16(),
            bytes = body.len(),
            "SOAP reply received"
        );

        self.check_response(status, &body)
    }

    /// Map request errors to connectivity errors with readable messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::connectivity(format!(
                "Connection to {} timed out after {} seconds",
                self.url,
                REQUEST_TIMEOUT.as_secs()
            ))
        } else if error.is_connect() {
            Error::connectivity(format!("Unable to connect to {}", self.url))
        } else {
            Error::connectivity(format!("Request to {} failed: {}", self.url, error))
        }
    }

    /// Decode the reply according to the HTTP status
    ///
    /// SOAP 1.1 servers report faults with status 500, so that status is
    /// decoded too; a 500 without a fault is a protocol error.
    fn check_response(&self, status: StatusCode, body: &str) -> Result<Vec<SoapValue>> {
        match status.as_u16() {
            200 => parse_response(body),
            500 => match parse_response(body) {
                Err(e) if e.kind() == ErrorKind::Domain => Err(e),
                _ => Err(Error::protocol(
                    "http",
                    "HTTP 500 without a readable SOAP fault",
                )),
            },
            code => Err(Error::protocol(
                "http",
                format!("unexpected HTTP status {} from {}", code, self.url),
            )),
        }
    }
}
