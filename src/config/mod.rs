use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_OUTPUT_DIR: &str = "reports";
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const PAGES_VAR: &str = "GRITAUDIT_PAGES";
pub const PAGES_FILE_VAR: &str = "GRITAUDIT_PAGES_FILE";
pub const WEBHOOK_VAR: &str = "SHEETS_WEBHOOK_URL";
pub const OUTPUT_DIR_VAR: &str = "GRITAUDIT_OUTPUT_DIR";
pub const CHROME_PATH_VAR: &str = "GRITAUDIT_CHROME_PATH";
pub const LIGHTHOUSE_PATH_VAR: &str = "GRITAUDIT_LIGHTHOUSE_PATH";
pub const PAGE_TIMEOUT_VAR: &str = "GRITAUDIT_PAGE_TIMEOUT_SECS";
pub const LOG_LEVEL_VAR: &str = "GRITAUDIT_LOG_LEVEL";

/// Everything one audit run needs. Built once at startup and passed down.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditConfig {
    pub pages: Vec<String>,
    pub webhook_url: Option<String>,
    pub output_dir: PathBuf,
    pub chrome_path: Option<PathBuf>,
    pub lighthouse_path: Option<PathBuf>,
    pub page_timeout: Option<Duration>,
    pub log_level: String,
}

/// Command-line values layered over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub pages: Vec<String>,
    pub pages_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub webhook_url: Option<String>,
    pub disable_webhook: bool,
    pub page_timeout_secs: Option<u64>,
    pub chrome_path: Option<PathBuf>,
    pub lighthouse_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no pages configured: set GRITAUDIT_PAGES or GRITAUDIT_PAGES_FILE, or pass --url")]
    NoPages,
    #[error("invalid page URL '{0}': expected an absolute http(s) URL")]
    InvalidUrl(String),
    #[error("page timeout must be a positive number of seconds, got '{0}'")]
    InvalidTimeout(String),
    #[error("failed to read pages file {}: {source}", .path.display())]
    PagesFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AuditConfig {
    /// Load from `.env` and the process environment, then apply CLI overrides.
    pub fn load(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::resolve(|key| env::var(key).ok(), overrides)
    }

    /// `from_lookup` then `apply`. CLI pages hide the env page sources, so a
    /// stale `GRITAUDIT_PAGES_FILE` is never read when `--url` is given.
    pub fn resolve<F>(lookup: F, overrides: ConfigOverrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cli_pages = !overrides.pages.is_empty() || overrides.pages_file.is_some();
        let env_lookup = |key: &str| {
            if cli_pages && (key == PAGES_VAR || key == PAGES_FILE_VAR) {
                None
            } else {
                lookup(key)
            }
        };
        Self::from_lookup(env_lookup)?.apply(overrides)
    }

    /// Build from an arbitrary key lookup. Page validation happens in `apply`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut pages = lookup(PAGES_VAR)
            .map(|raw| parse_page_list(&raw))
            .unwrap_or_default();
        if let Some(path) = non_empty(lookup(PAGES_FILE_VAR)) {
            pages.extend(read_pages_file(Path::new(&path))?);
        }

        let page_timeout = match non_empty(lookup(PAGE_TIMEOUT_VAR)) {
            Some(raw) => Some(parse_timeout(&raw)?),
            None => None,
        };

        Ok(Self {
            pages,
            webhook_url: non_empty(lookup(WEBHOOK_VAR)),
            output_dir: non_empty(lookup(OUTPUT_DIR_VAR))
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            chrome_path: non_empty(lookup(CHROME_PATH_VAR)).map(PathBuf::from),
            lighthouse_path: non_empty(lookup(LIGHTHOUSE_PATH_VAR)).map(PathBuf::from),
            page_timeout,
            log_level: non_empty(lookup(LOG_LEVEL_VAR))
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }

    /// Layer CLI values on top and validate the final page list.
    pub fn apply(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if !overrides.pages.is_empty() || overrides.pages_file.is_some() {
            let mut pages = overrides.pages;
            if let Some(path) = overrides.pages_file.as_deref() {
                pages.extend(read_pages_file(path)?);
            }
            self.pages = pages;
        }

        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        if let Some(webhook) = overrides.webhook_url {
            self.webhook_url = non_empty(Some(webhook));
        }
        if overrides.disable_webhook {
            self.webhook_url = None;
        }
        if let Some(secs) = overrides.page_timeout_secs {
            self.page_timeout = Some(parse_timeout(&secs.to_string())?);
        }
        if overrides.chrome_path.is_some() {
            self.chrome_path = overrides.chrome_path;
        }
        if overrides.lighthouse_path.is_some() {
            self.lighthouse_path = overrides.lighthouse_path;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pages.is_empty() {
            return Err(ConfigError::NoPages);
        }
        for page in &self.pages {
            let valid = Url::parse(page)
                .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
                .unwrap_or(false);
            if !valid {
                return Err(ConfigError::InvalidUrl(page.clone()));
            }
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split a comma or newline separated page list, dropping blanks.
pub fn parse_page_list(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// One URL per line; blank lines and `#` comments are skipped.
pub fn read_pages_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::PagesFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
