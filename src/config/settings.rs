use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, AppResult};

const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_CACHE_TTL_MS: u64 = 30_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    #[serde(default)]
    pub cache_ttl_ms: Option<u64>,
    #[serde(default)]
    pub endpoints: EndpointTemplates,
}

/// Path templates for the letter store, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointTemplates {
    #[serde(default = "default_letters_endpoint")]
    pub letters: String,
    #[serde(default = "default_letter_by_id_endpoint")]
    pub letter_by_id: String,
    #[serde(default = "default_folder_endpoint")]
    pub folder: String,
}

impl Default for EndpointTemplates {
    fn default() -> Self {
        Self {
            letters: default_letters_endpoint(),
            letter_by_id: default_letter_by_id_endpoint(),
            folder: default_folder_endpoint(),
        }
    }
}

impl Settings {
    pub fn base_url(&self) -> AppResult<Url> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL).trim();
        let url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "base_url `{raw}` cannot be used as a base for endpoint paths"
            )));
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(
            self.request_timeout_ms
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        )
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms.unwrap_or(DEFAULT_CACHE_TTL_MS))
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if base_url.is_some() {
            self.base_url = base_url;
        }
        self
    }
}

fn default_letters_endpoint() -> String {
    "/letters".to_string()
}

fn default_letter_by_id_endpoint() -> String {
    "/letters/:id".to_string()
}

fn default_folder_endpoint() -> String {
    "/folders/:name".to_string()
}

pub fn load(path: PathBuf) -> AppResult<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path)?;
    let settings = serde_json::from_str(&raw)?;
    Ok(settings)
}

pub fn save(path: PathBuf, settings: &Settings) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let payload = serde_json::to_string_pretty(settings)?;
    fs::write(&path, payload)?;
    Ok(())
}
