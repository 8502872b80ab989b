use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Default ITKC database host
pub const DEFAULT_ITKC_BASE_URL: &str = "http://db.itkc.or.kr";

/// Default Annals of the Joseon Dynasty host
pub const DEFAULT_SILLOK_BASE_URL: &str = "https://sillok.history.go.kr";

/// Main configuration structure for archive-tree
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub cache: CacheConfig,
    pub sources: SourcesConfig,

    /// Extra glyph codes, merged over the built-in table
    pub glyphs: HashMap<String, String>,
}

impl Config {
    /// Returns the `[glyphs]` table as code -> character
    ///
    /// Entries whose value is not a single character are skipped; validation
    /// rejects them before this is reached.
    pub fn glyph_table(&self) -> HashMap<String, char> {
        self.glyphs
            .iter()
            .filter_map(|(code, value)| {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Some((code.clone(), ch)),
                    _ => None,
                }
            })
            .collect()
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// TCP connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("archive-tree/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Where cached listings and documents live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Sqlite,
}

/// Fetch cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time-to-live for every entry (seconds)
    #[serde(rename = "ttl-secs")]
    pub ttl_secs: u64,

    pub backend: CacheBackend,

    /// Database file, required for the sqlite backend
    #[serde(rename = "sqlite-path")]
    pub sqlite_path: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            backend: CacheBackend::Memory,
            sqlite_path: None,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Remote archive base URLs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    #[serde(rename = "itkc-base-url")]
    pub itkc_base_url: String,

    #[serde(rename = "sillok-base-url")]
    pub sillok_base_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            itkc_base_url: DEFAULT_ITKC_BASE_URL.to_string(),
            sillok_base_url: DEFAULT_SILLOK_BASE_URL.to_string(),
        }
    }
}
