use crate::{cache::DEFAULT_LIFETIME_SECS, rss::CutoffStrategy};
use simple_error::{SimpleError, SimpleResult};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 6.0; Nexus 5 Build/MRA58N) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/141.0.0.0 Mobile Safari/537.36";

pub const ENV_FEEDS: &str = "PODCASTS_FEEDS";
pub const ENV_CACHE_DIR: &str = "PODCASTS_CACHE_DIR";
pub const ENV_DUMP_DIR: &str = "PODCASTS_DUMP_DIR";
pub const ENV_CACHE_TTL: &str = "PODCASTS_CACHE_TTL";
pub const ENV_MAX_AGE: &str = "PODCASTS_MAX_AGE";
pub const ENV_TIMEOUT: &str = "PODCASTS_TIMEOUT";
pub const ENV_USER_AGENT: &str = "PODCASTS_USER_AGENT";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub feeds_file: PathBuf,
    pub cache_dir: PathBuf,
    pub dump_dir: PathBuf,
    /// seconds a cached feed stays fresh
    pub cache_ttl: u32,
    /// days an episode stays listed
    pub max_age_days: u32,
    /// seconds per feed request
    pub fetch_timeout: u32,
    pub user_agent: String,
    pub cutoff: CutoffStrategy,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            feeds_file: PathBuf::from("./feeds.txt"),
            cache_dir: PathBuf::from(".cache"),
            dump_dir: PathBuf::from("./dump"),
            cache_ttl: DEFAULT_LIFETIME_SECS,
            max_age_days: 30,
            fetch_timeout: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cutoff: CutoffStrategy::default(),
        }
    }
}

impl Settings {
    /// Defaults overlaid with the `PODCASTS_*` environment variables.
    pub fn from_env() -> SimpleResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> SimpleResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut s = Settings::default();
        if let Some(v) = lookup(ENV_FEEDS) {
            s.feeds_file = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_CACHE_DIR) {
            s.cache_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_DUMP_DIR) {
            s.dump_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_CACHE_TTL) {
            s.cache_ttl = parse_number(ENV_CACHE_TTL, &v)?;
        }
        if let Some(v) = lookup(ENV_MAX_AGE) {
            s.max_age_days = parse_number(ENV_MAX_AGE, &v)?;
        }
        if let Some(v) = lookup(ENV_TIMEOUT) {
            s.fetch_timeout = parse_number(ENV_TIMEOUT, &v)?;
        }
        if let Some(v) = lookup(ENV_USER_AGENT) {
            s.user_agent = v;
        }
        Ok(s)
    }

    pub fn cache_lifetime(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.cache_ttl))
    }

    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.max_age_days))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.fetch_timeout))
    }
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> SimpleResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| SimpleError::new(format!("{} must be a whole number, got '{}'", name, value)))
}
