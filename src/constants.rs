use serde::{Deserialize, Serialize};

use crate::service_manager::Backend;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: String,
    pub allow_services: Vec<String>,
    #[serde(default)]
    pub backend: Option<Backend>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Body of a `/control` request.
///
/// Absent fields decode as empty strings, so a body without `service` is
/// refused by the allow-list rather than by the decoder.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Command {
    #[serde(alias = "Action")]
    pub action: String,
    #[serde(alias = "Service")]
    pub service: String,
}

/// One entry of the `/services` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceInfo {
    pub name: String,
    pub display_name: String,
    pub state: String,
}

pub const CONFIG_NAME: &str = "config.json";
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const CORS_HEADER: &str = "Allow-Access-Control-Origin";
pub const CORS_ORIGIN: &str = "http://localhost";

pub const NOT_ALLOWED: &str = "Service is not allowed";
pub const COMMAND_FAILED: &str = "Service command failed";
pub const UNKNOWN_ACTION: &str = "Unknown action";
pub const EMPTY_BODY: &str = "EOF";
pub const LIST_FAILED: &str = "Error get services";

pub const NAME_ENV: &str = "SERVICE_PANEL_NAME";
pub const NAMES_ENV: &str = "SERVICE_PANEL_NAMES";
