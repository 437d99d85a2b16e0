// --- File: crates/slotbook_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with a prebuilt web front end, served as fallback when set.
    #[serde(default)]
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
            static_dir: None,
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite:data/slotbook.db, loaded via SLOTBOOK_DATABASE__URL
}

// --- Campaign Config ---
// The single day being booked and the shape of its slot catalog.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CampaignConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// ISO date of the campaign day (YYYY-MM-DD).
    #[serde(default = "default_event_date")]
    pub event_date: String,
    /// First slot of the day, HH:MM.
    #[serde(default = "default_opens_at")]
    pub opens_at: String,
    /// End of the day, HH:MM. Only booked itself when `include_closing_slot` is set.
    #[serde(default = "default_closes_at")]
    pub closes_at: String,
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,
    #[serde(default = "default_true")]
    pub include_closing_slot: bool,
    /// IANA zone used when printing timestamps (export, lists).
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// Buffered change events per subscriber before it is told to resync.
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,
}

fn default_title() -> String {
    "Blood Donation Campaign".to_string()
}
fn default_event_date() -> String {
    "2025-11-13".to_string()
}
fn default_opens_at() -> String {
    "10:00".to_string()
}
fn default_closes_at() -> String {
    "16:00".to_string()
}
fn default_slot_minutes() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_time_zone() -> String {
    "America/Sao_Paulo".to_string()
}
fn default_feed_capacity() -> usize {
    256
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            event_date: default_event_date(),
            opens_at: default_opens_at(),
            closes_at: default_closes_at(),
            slot_minutes: default_slot_minutes(),
            include_closing_slot: true,
            time_zone: default_time_zone(),
            feed_capacity: default_feed_capacity(),
        }
    }
}

// --- Admin Config ---
// Credential pair for export / clear. Password usually comes from ADMIN_PASSWORD
// through the "secret_from_env" marker.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdminConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,
    #[serde(default = "default_admin_password")]
    pub password: String,
}

fn default_admin_username() -> String {
    "admin".to_string()
}
fn default_admin_password() -> String {
    "Dgp@2025".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password: default_admin_password(),
        }
    }
}

// --- Client Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, including the /api prefix.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8086/api".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub campaign: CampaignConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}
