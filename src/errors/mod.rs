//! Centralized error handling for the job digest
//!
//! # Error Categories
//!
//! - **Source Errors**: board API connectivity and payload decoding. These are
//!   caught at the fetch boundary; a failing source contributes no records.
//! - **Configuration Errors**: unreadable config, bad timezone, missing mail
//!   credentials. These are fatal.
//! - **Mail Errors**: message assembly and SMTP delivery. Also fatal.
//!
//! Timestamp parsing never produces an error: see `utils::time`.

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;

/// Convenience type alias for Mail Results
pub type MailResult<T> = Result<T, MailError>;
