use crate::entity::Episode;
use chrono::{DateTime, Utc};
use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle};
use sha2::{Digest, Sha256};

pub fn init_log(default_spec: &str) -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_env_or_str(default_spec)?
        .log_to_stdout()
        .start()
}

/// Keep episodes not strictly older than `cutoff`.
pub fn filter_time(cutoff: DateTime<Utc>) -> impl Fn(&Episode) -> bool {
    move |e: &Episode| -> bool { !e.is_stale(cutoff) }
}

/// Cache key for a feed url: hex SHA-256 of the url string.
pub fn url_digest(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}
