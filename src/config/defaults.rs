/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Config file
pub const DEFAULT_CONFIG_FILE: &str = "digest.toml";
pub const ENV_PREFIX: &str = "JOB_DIGEST_";

// Source endpoints
pub const DEFAULT_GREENHOUSE_BASE_URL: &str = "https://boards-api.greenhouse.io/v1/boards";
pub const DEFAULT_LEVER_BASE_URL: &str = "https://api.lever.co/v0/postings";
pub const DEFAULT_ASHBY_BASE_URL: &str = "https://jobs.ashbyhq.com";
pub const DEFAULT_SEARCH_URL: &str = "https://serpapi.com/search.json";

// HTTP defaults
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 25;
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("job-digest/", env!("CARGO_PKG_VERSION"));

// Search defaults
pub const DEFAULT_SEARCH_ENABLED: bool = true;
pub const DEFAULT_SEARCH_LANGUAGE: &str = "en";
pub const DEFAULT_SEARCH_QUERY: &str = concat!(
    r#"(CRM OR "Customer Retention" OR Retention OR "Lifecycle Marketing" "#,
    r#"OR "Lifecycle" OR "Marketing Automation" OR "Customer Engagement" "#,
    r#"OR "Engagement Marketing" OR "Retention Marketing" OR "Loyalty Marketing" "#,
    r#"OR "Growth Marketing" OR "MarTech" OR "Marketing Technology") "#,
    "(Manager OR Lead OR Specialist OR Head OR Executive OR Analyst OR Consultant)"
);
pub const DEFAULT_SEARCH_LOCATIONS: &[&str] = &[
    "India",
    "Bengaluru, India",
    "Mumbai, India",
    "Delhi, India",
    "Hyderabad, India",
    "Pune, India",
    "Chennai, India",
    "Gurugram, India",
    "Remote",
    "Dubai, United Arab Emirates",
    "Abu Dhabi, United Arab Emirates",
    "United Arab Emirates",
];

// Filter defaults
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "crm",
    "retention",
    "lifecycle",
    "marketing automation",
    "customer engagement",
    "loyalty",
    "martech",
];

// Digest defaults
pub const DEFAULT_TIMEZONE: &str = "+05:30";
pub const DEFAULT_TIMEZONE_LABEL: &str = "IST";
pub const DEFAULT_SUBJECT_PREFIX: &str = "CRM/Retention Jobs";
pub const DEFAULT_HEADING: &str = "CRM / Retention Job Digest";
pub const DEFAULT_FALLBACK_REGION: &str = "Others";
pub const DEFAULT_INDIA_MARKERS: &[&str] = &[
    "india",
    "bengaluru",
    "mumbai",
    "delhi",
    "pune",
    "chennai",
    "gurugram",
    "hyderabad",
];
pub const DEFAULT_UAE_MARKERS: &[&str] = &["dubai", "abu dhabi", "uae", "united arab emirates"];

// Mail defaults
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

// Credential environment variables
pub const ENV_SENDER: &str = "GMAIL_USERNAME";
pub const ENV_APP_PASSWORD: &str = "GMAIL_APP_PASSWORD";
pub const ENV_RECIPIENT: &str = "TO_EMAIL";
pub const ENV_SEARCH_API_KEY: &str = "SERPAPI_KEY";
