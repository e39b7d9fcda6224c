use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_CALENDAR_DELAY_MS, DEFAULT_LOCALE, DEFAULT_OUTPUT_PATH,
    DEFAULT_PAGE_DELAY_MS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, MAX_LISTING_PAGES,
    MIN_REQUEST_DELAY_MS,
};
use crate::error::{Result, ScraperError};
use chrono::Datelike;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "crawler.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub base_url: String,
    pub max_pages: u32,
    /// Calendar year to crawl; defaults to the current local year
    pub year: Option<i32>,
    pub page_delay_ms: u64,
    pub calendar_delay_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub locale: String,
    pub output_path: PathBuf,
    pub sqlite_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_pages: MAX_LISTING_PAGES,
            year: None,
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
            calendar_delay_ms: DEFAULT_CALENDAR_DELAY_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            sqlite_path: None,
            log_dir: None,
        }
    }
}

impl CrawlerConfig {
    /// Load defaults, then the TOML file (explicit path must exist, the default
    /// path is optional), then `WEDDING_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CrawlerConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("WEDDING_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("WEDDING_YEAR") {
            self.year = Some(parse_env("WEDDING_YEAR", &v)?);
        }
        if let Some(v) = lookup("WEDDING_OUTPUT") {
            self.output_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("WEDDING_PAGE_DELAY_MS") {
            self.page_delay_ms = parse_env("WEDDING_PAGE_DELAY_MS", &v)?;
        }
        if let Some(v) = lookup("WEDDING_CALENDAR_DELAY_MS") {
            self.calendar_delay_ms = parse_env("WEDDING_CALENDAR_DELAY_MS", &v)?;
        }
        if let Some(v) = lookup("WEDDING_TIMEOUT_SECS") {
            self.timeout_secs = parse_env("WEDDING_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("WEDDING_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(v));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(ScraperError::Config("base_url must not be empty".into()));
        }
        if self.max_pages == 0 {
            return Err(ScraperError::Config("max_pages must be at least 1".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ScraperError::Config("timeout_secs must be at least 1".into()));
        }
        for (key, value) in [
            ("page_delay_ms", self.page_delay_ms),
            ("calendar_delay_ms", self.calendar_delay_ms),
        ] {
            if value < MIN_REQUEST_DELAY_MS {
                return Err(ScraperError::Config(format!(
                    "{} must be at least {} (got {})",
                    key, MIN_REQUEST_DELAY_MS, value
                )));
            }
        }
        Ok(())
    }

    pub fn year(&self) -> i32 {
        self.year.unwrap_or_else(|| chrono::Local::now().year())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn calendar_delay(&self) -> Duration {
        Duration::from_millis(self.calendar_delay_ms)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ScraperError::Config(format!("{} has invalid value '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_site() {
        let config = CrawlerConfig::default();
        assert_eq!(config.base_url, "https://wedding.seoulwomen.or.kr");
        assert_eq!(config.max_pages, 10);
        assert_eq!(config.calendar_delay(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_overrides_only_given_fields() {
        let config = CrawlerConfig::from_toml_str(
            r#"
            year = 2026
            page_delay_ms = 1500
            sqlite_path = "data/reservations.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.year(), 2026);
        assert_eq!(config.page_delay_ms, 1500);
        assert_eq!(config.sqlite_path, Some(PathBuf::from("data/reservations.db")));
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn env_overrides_and_rejects_garbage() {
        let vars: HashMap<&str, &str> =
            [("WEDDING_YEAR", "2027"), ("WEDDING_OUTPUT", "out/data.json")].into();
        let mut config = CrawlerConfig::default();
        config
            .apply_env(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.year, Some(2027));
        assert_eq!(config.output_path, PathBuf::from("out/data.json"));

        let err = config
            .apply_env(|k| (k == "WEDDING_TIMEOUT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ScraperError::Config(_)));
    }

    #[test]
    fn delays_below_floor_are_invalid() {
        let vars: HashMap<&str, &str> =
            [("WEDDING_PAGE_DELAY_MS", "0"), ("WEDDING_CALENDAR_DELAY_MS", "0")].into();
        let mut config = CrawlerConfig::default();
        config
            .apply_env(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert!(matches!(config.validate(), Err(ScraperError::Config(_))));

        let config = CrawlerConfig {
            calendar_delay_ms: 499,
            ..CrawlerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CrawlerConfig::from_toml_str("page_delay_ms = 0").unwrap();
        assert!(config.validate().is_err());

        let config = CrawlerConfig {
            page_delay_ms: 500,
            calendar_delay_ms: 500,
            ..CrawlerConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_pages_is_invalid() {
        let config = CrawlerConfig {
            max_pages: 0,
            ..CrawlerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
