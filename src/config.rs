use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main harvester configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct HarvestConfig {
    /// Target site layout
    #[serde(default)]
    pub site: SiteConfig,
    /// Archive pagination settings
    #[serde(default)]
    pub crawler: CrawlerConfig,
    /// Per-recipe harvesting settings
    #[serde(default)]
    pub harvest: PipelineConfig,
    /// Output files and database
    #[serde(default)]
    pub output: OutputConfig,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            crawler: CrawlerConfig::default(),
            harvest: PipelineConfig::default(),
            output: OutputConfig::default(),
            timeout: default_timeout(),
        }
    }
}

/// URL layout of the recipe site
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SiteConfig {
    /// Scheme and host, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the paginated recipe archive
    #[serde(default = "default_archive_path")]
    pub archive_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            archive_path: default_archive_path(),
        }
    }
}

impl SiteConfig {
    /// Site rooted at another host, keeping the default path layout
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Every recipe page URL starts with this
    pub fn recipe_prefix(&self) -> String {
        format!("{}/rezepte", self.base_url)
    }

    /// Archive links must start with this to count as recipes
    pub fn recipe_link_prefix(&self) -> String {
        format!("{}/rezepte/", self.base_url)
    }

    pub fn archive_url(&self) -> String {
        format!("{}{}", self.base_url, self.archive_path)
    }
}

/// Configuration for archive pagination
#[derive(Debug, Deserialize, Clone)]
pub struct CrawlerConfig {
    /// Delay between archive pages in milliseconds
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    /// Hard ceiling on archive pages, whatever the pagination says
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// Without pagination links, a page with fewer candidates is the last one
    #[serde(default = "default_low_count_threshold")]
    pub low_count_threshold: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: default_page_delay_ms(),
            max_pages: default_max_pages(),
            low_count_threshold: default_low_count_threshold(),
        }
    }
}

impl CrawlerConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

/// Configuration for the per-recipe harvest loop
#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Delay between recipe pages in milliseconds
    #[serde(default = "default_recipe_delay_ms")]
    pub recipe_delay_ms: u64,
    /// Write a progress snapshot after this many successes
    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            recipe_delay_ms: default_recipe_delay_ms(),
            checkpoint_every: default_checkpoint_every(),
        }
    }
}

impl PipelineConfig {
    pub fn recipe_delay(&self) -> Duration {
        Duration::from_millis(self.recipe_delay_ms)
    }
}

/// Where results end up
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    /// Directory for JSON output, checkpoints and failure lists
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            database_path: default_database_path(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://www.essen-und-trinken.de".to_string()
}

fn default_archive_path() -> String {
    "/rezepte/archiv/".to_string()
}

fn default_page_delay_ms() -> u64 {
    1000
}

fn default_max_pages() -> usize {
    100
}

fn default_low_count_threshold() -> usize {
    10
}

fn default_recipe_delay_ms() -> u64 {
    500
}

fn default_checkpoint_every() -> usize {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("recipes.db")
}

fn default_timeout() -> u64 {
    30
}

impl HarvestConfig {
    /// Load configuration from `harvest.toml` and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        load_config(None)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Load configuration from file and environment variables
///
/// Configuration is loaded with the following priority (highest to lowest):
/// 1. Environment variables with HARVEST__ prefix
/// 2. The given file, or harvest.toml in the current directory
/// 3. Default values
///
/// Environment variable format: HARVEST__CRAWLER__PAGE_DELAY_MS
pub fn load_config(path: Option<&Path>) -> Result<HarvestConfig, ConfigError> {
    let file = match path {
        // An explicitly named file has to exist
        Some(path) => File::from(path).required(true),
        None => File::with_name("harvest").required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("HARVEST")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
