//! Error type definitions for the job digest
//!
//! Errors are split by the boundary they cross: source fetches degrade to an
//! empty contribution, while configuration and mail errors end the run.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Source handling errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Mail delivery errors
    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem errors (config file, rendered output)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while fetching or decoding a single job source
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network connection timeouts
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Request could not be sent or the body could not be read
    #[error("Request failed: {url} - {message}")]
    Request { url: String, message: String },

    /// Non-success HTTP status from the upstream API
    #[error("HTTP error: {status} - {url}")]
    Http { status: u16, url: String },

    /// Payload did not match the expected shape
    #[error("Parse error: {url} - {message}")]
    ParseError { url: String, message: String },
}

/// Mail delivery errors
#[derive(Error, Debug)]
pub enum MailError {
    /// Sender or recipient could not be parsed as a mailbox
    #[error("Invalid address '{address}': {message}")]
    Address { address: String, message: String },

    /// Message could not be assembled
    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    /// SMTP transport failure (connect, TLS, auth, send)
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The blocking send task panicked or was cancelled
    #[error("Mail task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Create a timeout error
    pub fn timeout<U: Into<String>>(url: U) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Create a request error
    pub fn request<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Request {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::ParseError {
            url: url.into(),
            message: message.into(),
        }
    }
}

impl MailError {
    /// Create an address error
    pub fn address<A: Into<String>, M: Into<String>>(address: A, message: M) -> Self {
        Self::Address {
            address: address.into(),
            message: message.into(),
        }
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        Self::configuration(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        Self::configuration(format!("Failed to serialize default config: {err}"))
    }
}
