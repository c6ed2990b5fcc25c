// Error types for certalert
//
// Structured error types using thiserror. The monitoring core works with these enums;
// command-line glue converts them into anyhow::Error at the edges.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors, fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is absent or empty
    #[error("{key} is required but was not set")]
    Missing { key: String },

    /// A setting is present but cannot be used
    #[error("Invalid {key}: {message}")]
    Invalid { key: String, message: String },

    /// Config file could not be read
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse TOML config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Config could not be serialized
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Config file could not be written
    #[error("Failed to write config file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConfigError {
    pub fn missing(key: &str) -> Self {
        ConfigError::Missing {
            key: key.to_string(),
        }
    }

    pub fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Certificate retrieval errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS resolution failed for the hostname
    #[error("DNS resolution failed for {hostname}: {details}")]
    DnsResolutionFailed { hostname: String, details: String },

    /// TCP connection could not be established
    #[error("Connection to {host}:{port} failed: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// Connection or handshake did not finish in time
    #[error("Timed out after {duration:?} while {stage} {host}:{port}")]
    Timeout {
        host: String,
        port: u16,
        stage: &'static str,
        duration: Duration,
    },

    /// Hostname is not usable as a TLS server name
    #[error("Invalid server name: {hostname}")]
    InvalidServerName { hostname: String },

    /// TLS handshake failed
    #[error("TLS handshake with {host} failed: {details}")]
    Handshake { host: String, details: String },

    /// Server completed the handshake without presenting a certificate
    #[error("No certificates received from {host}")]
    NoCertificate { host: String },

    /// Peer certificate could not be decoded
    #[error("Certificate parsing error: {details}")]
    CertificateParse { details: String },
}

impl FetchError {
    /// Coarse classification used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::DnsResolutionFailed { .. } | FetchError::ConnectionFailed { .. } => {
                "network"
            }
            FetchError::Timeout { .. } => "timeout",
            FetchError::InvalidServerName { .. }
            | FetchError::Handshake { .. }
            | FetchError::NoCertificate { .. }
            | FetchError::CertificateParse { .. } => "tls",
        }
    }
}

/// Alert ledger persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read alert history {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Alert history {path:?} is corrupt: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize alert history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to back up alert history to {path:?}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write alert history {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("{channel} request failed: {source}")]
    Request {
        channel: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{channel} returned status {status}: {body}")]
    Status {
        channel: String,
        status: u16,
        body: String,
    },
}

/// Everything that can stop one domain's check
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl CheckError {
    /// Classification used in logs and cycle reports
    pub fn kind(&self) -> &'static str {
        match self {
            CheckError::Fetch(e) => e.kind(),
            CheckError::Storage(_) => "storage",
            CheckError::Delivery(_) => "delivery",
        }
    }
}
