use serde::Deserialize;

/// Main configuration structure for Query-Harvest
///
/// Every section is optional in the TOML file; missing sections and keys
/// fall back to the defaults documented on each field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub search: SearchConfig,
    pub campaign: CampaignConfig,
    pub retry: RetryConfig,
    pub pacing: PacingConfig,
    pub output: OutputConfig,
    pub modifiers: ModifiersConfig,
}

/// Search backend connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Search endpoint URL (default: `http://localhost:8080/search`)
    pub url: String,

    /// Per-request timeout in seconds (default: 30)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Seconds to wait after a successful response before parsing it (default: 2)
    #[serde(rename = "settle-delay")]
    pub settle_delay: f64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/search".to_string(),
            request_timeout: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            settle_delay: 2.0,
        }
    }
}

/// Search parameters passed through to the backend unchanged
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result language (default: `en-US`)
    pub language: String,

    /// Comma-separated backend categories (default: `general`)
    pub categories: String,

    /// Safe-search level, 0 to 2 (default: 0)
    pub safesearch: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            categories: "general".to_string(),
            safesearch: 0,
        }
    }
}

/// Per-query pagination limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    /// New unique items to collect per query variant (default: 6)
    pub quota: usize,

    /// Maximum pages fetched per query variant (default: 100)
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Seconds to pause after an empty page before the single retry (default: 600)
    #[serde(rename = "stall-pause")]
    pub stall_pause: u64,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            quota: 6,
            max_pages: 100,
            stall_pause: 600,
        }
    }
}

/// Automatic retry of failed page requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per page, including the first (default: 3)
    pub attempts: u32,

    /// Exponential backoff multiplier (default: 1)
    pub multiplier: f64,

    /// Lower bound of the backoff wait in seconds (default: 30)
    #[serde(rename = "min-wait")]
    pub min_wait: f64,

    /// Upper bound of the backoff wait in seconds (default: 300)
    #[serde(rename = "max-wait")]
    pub max_wait: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            multiplier: 1.0,
            min_wait: 30.0,
            max_wait: 300.0,
        }
    }
}

/// Randomized delay before every request
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Minimum delay in seconds (default: 94.2)
    #[serde(rename = "min-delay")]
    pub min_delay: f64,

    /// Maximum delay in seconds (default: 300)
    #[serde(rename = "max-delay")]
    pub max_delay: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_delay: 94.2,
            max_delay: 300.0,
        }
    }
}

/// Output file configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the CSV file results are appended to
    pub filename: String,

    /// Header of the title column
    #[serde(rename = "title-column")]
    pub title_column: String,

    /// Header of the URL column
    #[serde(rename = "url-column")]
    pub url_column: String,

    /// Path of the JSON checkpoint written on interruption
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filename: "queries_with_urls.csv".to_string(),
            title_column: "search_query_title".to_string(),
            url_column: "url".to_string(),
            checkpoint_path: "searxng_scraper_state.json".to_string(),
        }
    }
}

/// Modifier term source
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModifiersConfig {
    /// File with one modifier term per line
    pub path: String,
}

impl Default for ModifiersConfig {
    fn default() -> Self {
        Self {
            path: "modifiers.csv".to_string(),
        }
    }
}
