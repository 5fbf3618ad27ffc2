pub mod config;
pub mod digest;
pub mod errors;
pub mod mailer;
pub mod models;
pub mod pipeline;
pub mod runner;
pub mod sources;
pub mod utils;
