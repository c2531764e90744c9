//! Run configuration, taken from flags or the matching environment keys

use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::Args;

use crate::services::document::{DEFAULT_END_MARKER, DEFAULT_START_MARKER};
use crate::services::summaries::{DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::services::{MarkerRegion, Renderer, StoreService};
use crate::types::{CodetallyError, IgnoreSet, Result};

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// WakaTime API key
    #[arg(long, global = true, env = "CODETALLY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the summaries API
    #[arg(long, global = true, env = "CODETALLY_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Range label shown when the store holds no dates
    #[arg(long, global = true, env = "CODETALLY_TIME_RANGE", default_value = "last_7_days")]
    pub time_range: String,

    /// Languages to show (0 = all)
    #[arg(long, global = true, env = "CODETALLY_LANG_COUNT", default_value_t = 0)]
    pub lang_count: usize,

    /// Comma-separated language names to leave out entirely
    #[arg(long, global = true, env = "CODETALLY_IGNORED_LANGUAGES", default_value = "")]
    pub ignored_languages: String,

    /// Document holding the marker region
    #[arg(long, global = true, env = "CODETALLY_README_PATH", default_value = "README.md")]
    pub readme_path: PathBuf,

    /// Store file [default: ~/.codetally/store.json]
    #[arg(long, global = true, env = "CODETALLY_STORE_PATH")]
    pub store_path: Option<PathBuf>,

    /// Trailing days to refetch (0 = automatic)
    #[arg(long, global = true, env = "CODETALLY_BACKFILL_DAYS")]
    pub backfill_days: Option<u32>,

    /// Fetch this date (YYYY-MM-DD) instead of the automatic choice
    #[arg(long, global = true, env = "CODETALLY_SUMMARY_DATE")]
    pub summary_date: Option<String>,

    /// Triggering event name; "schedule" marks an unattended run
    #[arg(long, global = true, env = "GITHUB_EVENT_NAME")]
    pub event_name: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "CODETALLY_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    #[arg(long, global = true, env = "CODETALLY_START_MARKER", default_value = DEFAULT_START_MARKER)]
    pub start_marker: String,

    #[arg(long, global = true, env = "CODETALLY_END_MARKER", default_value = DEFAULT_END_MARKER)]
    pub end_marker: String,

    /// Verbose logging
    #[arg(long, global = true, env = "CODETALLY_DEBUG", value_parser = FalseyValueParser::new())]
    pub debug: bool,
}

impl Settings {
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                CodetallyError::Config(
                    "API key missing: set CODETALLY_API_KEY or pass --api-key".into(),
                )
            })
    }

    pub fn ignore_set(&self) -> IgnoreSet {
        IgnoreSet::parse(&self.ignored_languages)
    }

    pub fn store_service(&self) -> Result<StoreService> {
        let path = match &self.store_path {
            Some(path) => path.clone(),
            None => StoreService::default_path()?,
        };
        Ok(StoreService::new(path))
    }

    pub fn region(&self) -> Result<MarkerRegion> {
        MarkerRegion::new(&self.start_marker, &self.end_marker)
    }

    pub fn renderer(&self) -> Renderer {
        Renderer::new(self.lang_count, self.ignore_set(), self.time_range.as_str())
    }
}
