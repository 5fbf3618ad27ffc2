use chrono::{FixedOffset, Utc};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub mod defaults;
pub mod duration_serde;

use crate::errors::{AppError, AppResult};
use crate::utils::time::resolve_canonical_offset;
use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Terms matched against title, location and company; empty disables the check
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Terms matched against the same text as `keywords`; empty disables the check
    #[serde(default)]
    pub locations: Vec<String>,
    /// Greenhouse board tokens, also used as the company name
    #[serde(default)]
    pub greenhouse_boards: Vec<String>,
    #[serde(default)]
    pub lever_companies: Vec<String>,
    #[serde(default)]
    pub ashby_companies: Vec<String>,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub digest: DigestConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

/// Job search aggregator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_enabled")]
    pub enabled: bool,
    #[serde(default = "default_search_query")]
    pub query: String,
    /// One search request is made per location
    #[serde(default = "default_search_locations")]
    pub locations: Vec<String>,
    #[serde(default = "default_search_language")]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout for ATS board APIs
    #[serde(default = "default_http_timeout", with = "duration_serde::duration")]
    pub timeout: Duration,
    /// Per-request timeout for the search aggregator
    #[serde(default = "default_search_timeout", with = "duration_serde::duration")]
    pub search_timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_greenhouse_base_url")]
    pub greenhouse: String,
    #[serde(default = "default_lever_base_url")]
    pub lever: String,
    #[serde(default = "default_ashby_base_url")]
    pub ashby: String,
    #[serde(default = "default_search_url")]
    pub search: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Canonical timezone: a fixed offset (`+05:30`) or an IANA name (`Asia/Kolkata`)
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Suffix printed after rendered timestamps
    #[serde(default = "default_timezone_label")]
    pub timezone_label: String,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
    #[serde(default = "default_heading")]
    pub heading: String,
    /// Checked in order; the first region with a matching marker wins
    #[serde(default = "default_regions")]
    pub regions: Vec<RegionConfig>,
    #[serde(default = "default_fallback_region")]
    pub fallback_region: String,
}

/// Named digest section selected by case-insensitive location markers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub name: String,
    pub markers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

fn default_search_enabled() -> bool {
    DEFAULT_SEARCH_ENABLED
}

fn default_search_query() -> String {
    DEFAULT_SEARCH_QUERY.to_string()
}

fn default_search_locations() -> Vec<String> {
    to_strings(DEFAULT_SEARCH_LOCATIONS)
}

fn default_search_language() -> String {
    DEFAULT_SEARCH_LANGUAGE.to_string()
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)
}

fn default_search_timeout() -> Duration {
    Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS)
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_greenhouse_base_url() -> String {
    DEFAULT_GREENHOUSE_BASE_URL.to_string()
}

fn default_lever_base_url() -> String {
    DEFAULT_LEVER_BASE_URL.to_string()
}

fn default_ashby_base_url() -> String {
    DEFAULT_ASHBY_BASE_URL.to_string()
}

fn default_search_url() -> String {
    DEFAULT_SEARCH_URL.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_timezone_label() -> String {
    DEFAULT_TIMEZONE_LABEL.to_string()
}

fn default_subject_prefix() -> String {
    DEFAULT_SUBJECT_PREFIX.to_string()
}

fn default_heading() -> String {
    DEFAULT_HEADING.to_string()
}

fn default_regions() -> Vec<RegionConfig> {
    vec![
        RegionConfig {
            name: "India".to_string(),
            markers: to_strings(DEFAULT_INDIA_MARKERS),
        },
        RegionConfig {
            name: "UAE".to_string(),
            markers: to_strings(DEFAULT_UAE_MARKERS),
        },
    ]
}

fn default_fallback_region() -> String {
    DEFAULT_FALLBACK_REGION.to_string()
}

fn default_smtp_host() -> String {
    DEFAULT_SMTP_HOST.to_string()
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: default_search_enabled(),
            query: default_search_query(),
            locations: default_search_locations(),
            language: default_search_language(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_http_timeout(),
            search_timeout: default_search_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            greenhouse: default_greenhouse_base_url(),
            lever: default_lever_base_url(),
            ashby: default_ashby_base_url(),
            search: default_search_url(),
        }
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            timezone_label: default_timezone_label(),
            subject_prefix: default_subject_prefix(),
            heading: default_heading(),
            regions: default_regions(),
            fallback_region: default_fallback_region(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            locations: Vec::new(),
            greenhouse_boards: Vec::new(),
            lever_companies: Vec::new(),
            ashby_companies: Vec::new(),
            search: SearchConfig::default(),
            http: HttpConfig::default(),
            endpoints: EndpointsConfig::default(),
            digest: DigestConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl Config {
    /// Load the config file, layering environment overrides on top
    ///
    /// A missing file is created with the default configuration first.
    pub fn load_from_file(config_file: impl AsRef<Path>) -> AppResult<Self> {
        let config_file = config_file.as_ref();
        if !config_file.exists() {
            let contents = toml::to_string_pretty(&Self::starter())?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file.display());
        }

        let config: Config = Self::figment(config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Contents of a freshly created config file: defaults plus starter keywords
    ///
    /// The keywords live only in the written file, so a file without a
    /// `keywords` key disables keyword filtering.
    pub fn starter() -> Self {
        Self {
            keywords: to_strings(DEFAULT_KEYWORDS),
            ..Self::default()
        }
    }

    /// Defaults, then the TOML file, then `JOB_DIGEST_*` variables (`__` separates nesting)
    pub fn figment(config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> AppResult<()> {
        self.canonical_offset()?;

        if self.http.timeout.is_zero() {
            return Err(AppError::configuration("http.timeout must be greater than zero"));
        }
        if self.http.search_timeout.is_zero() {
            return Err(AppError::configuration(
                "http.search_timeout must be greater than zero",
            ));
        }
        if self.mail.smtp_port == 0 {
            return Err(AppError::configuration("mail.smtp_port must be non-zero"));
        }
        if self.search.enabled && self.search.locations.is_empty() {
            warn!("Search is enabled but no search locations are configured");
        }

        Ok(())
    }

    /// Offset every timestamp in this run is expressed in, resolved for the current instant
    pub fn canonical_offset(&self) -> AppResult<FixedOffset> {
        resolve_canonical_offset(&self.digest.timezone, Utc::now()).map_err(|e| {
            AppError::configuration(format!(
                "Invalid digest.timezone '{}': {}",
                self.digest.timezone, e
            ))
        })
    }

    pub fn keyword_terms(&self) -> Option<&[String]> {
        Some(self.keywords.as_slice()).filter(|terms| !terms.is_empty())
    }

    pub fn location_terms(&self) -> Option<&[String]> {
        Some(self.locations.as_slice()).filter(|terms| !terms.is_empty())
    }
}

/// Secrets read from the process environment, never from the config file
#[derive(Clone, Default)]
pub struct Credentials {
    pub sender: Option<String>,
    pub app_password: Option<String>,
    pub recipient: Option<String>,
    pub search_api_key: Option<String>,
}

/// Resolved SMTP identity for one delivery
#[derive(Clone)]
pub struct MailAccount {
    pub sender: String,
    pub password: String,
    pub recipient: String,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            sender: read_env(ENV_SENDER),
            app_password: read_env(ENV_APP_PASSWORD),
            recipient: read_env(ENV_RECIPIENT),
            search_api_key: read_env(ENV_SEARCH_API_KEY),
        }
    }

    /// Sender and password are required; the recipient defaults to the sender
    pub fn mail_account(&self) -> AppResult<MailAccount> {
        let sender = self
            .sender
            .clone()
            .ok_or_else(|| AppError::configuration(format!("{ENV_SENDER} is not set")))?;
        let password = self
            .app_password
            .clone()
            .ok_or_else(|| AppError::configuration(format!("{ENV_APP_PASSWORD} is not set")))?;
        let recipient = self.recipient.clone().unwrap_or_else(|| sender.clone());

        Ok(MailAccount {
            sender,
            password,
            recipient,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("sender", &self.sender)
            .field("app_password", &self.app_password.as_ref().map(|_| "<redacted>"))
            .field("recipient", &self.recipient)
            .field(
                "search_api_key",
                &self.search_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
