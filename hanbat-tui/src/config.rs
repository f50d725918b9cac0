use std::path::PathBuf;

use anyhow::{Context, Result};

const DATA_SERVICE_KEY: &str = "HANBAT_DATA_SERVICE_KEY";
const MAP_API_KEY: &str = "HANBAT_MAP_API_KEY";
const PAGE_SIZE: &str = "HANBAT_PAGE_SIZE";
const LOG_FILE: &str = "HANBAT_LOG_FILE";

const DEFAULT_PAGE_SIZE: u32 = 100;
const DEFAULT_LOG_FILE: &str = "hanbat.log";

/// Runtime settings read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settings {
    pub data_service_key: String,
    /// Missing keys are reported on the map, not at startup.
    pub map_api_key: Option<String>,
    pub page_size: u32,
    pub log_file: PathBuf,
}

impl Settings {
    pub(crate) fn from_env() -> Result<Self> {
        // A missing .env file is fine; real environment variables still apply.
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            return Err(err).context("Failed to read .env");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let page_size = match non_blank(PAGE_SIZE) {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .with_context(|| format!("{PAGE_SIZE} must be a positive number, got {raw:?}"))?,
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            data_service_key: non_blank(DATA_SERVICE_KEY).unwrap_or_default(),
            map_api_key: non_blank(MAP_API_KEY),
            page_size,
            log_file: non_blank(LOG_FILE)
                .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from),
        })
    }
}
