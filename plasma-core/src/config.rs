//! # Client configuration
//!
//! Where the Plasma server lives and how to reach it.
//!
//! A [`ClientConfig`] can be built in code or deserialized from JSON:
//!
//! ```json
//! { "host": "localhost", "port": 50051, "pem_root_cert": null, "connect_timeout_ms": 5000 }
//! ```
//!
//! When a PEM root certificate is provided the connection uses TLS and the certificate
//! is trusted for `host`. Otherwise the connection is plaintext HTTP/2.
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tonic::transport::{Certificate, ClientTlsConfig, Endpoint};

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("No host configured for the Plasma endpoint")]
    EmptyHost,
    #[error("Invalid URL '{0}': {1}")]
    InvalidUrl(String, #[source] tonic::transport::Error),
    #[error("Invalid TLS configuration for '{0}': {1}")]
    Tls(String, #[source] tonic::transport::Error),
    #[error("Failed to connect to '{0}': {1}")]
    ConnectionFailed(String, #[source] tonic::transport::Error),
    #[error("A lazy connection needs a running tokio runtime: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// PEM encoded root certificate. Enables TLS when set.
    #[serde(default)]
    pub pem_root_cert: Option<String>,
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            pem_root_cert: None,
            connect_timeout_ms: None,
        }
    }

    pub fn with_pem_root_cert(mut self, pem: impl Into<String>) -> Self {
        self.pem_root_cert = Some(pem.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn is_tls(&self) -> bool {
        self.pem_root_cert.is_some()
    }

    /// The URI the channel connects to, `https://` when TLS is enabled.
    pub fn endpoint_uri(&self) -> String {
        let scheme = if self.is_tls() { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host.trim(), self.port)
    }

    /// Builds the `tonic` endpoint, without connecting.
    pub fn endpoint(&self) -> Result<Endpoint, ConnectError> {
        if self.host.trim().is_empty() {
            return Err(ConnectError::EmptyHost);
        }

        let uri = self.endpoint_uri();
        let mut endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| ConnectError::InvalidUrl(uri.clone(), e))?;

        if let Some(timeout) = self.connect_timeout_ms {
            endpoint = endpoint.connect_timeout(Duration::from_millis(timeout));
        }

        if let Some(pem) = &self.pem_root_cert {
            let tls = ClientTlsConfig::new()
                .ca_certificate(Certificate::from_pem(pem))
                .domain_name(self.host.trim());
            endpoint = endpoint
                .tls_config(tls)
                .map_err(|e| ConnectError::Tls(uri, e))?;
        }

        Ok(endpoint)
    }
}
