//! File-backed key/value cache. Entry files are `<UTC timestamp><payload>`.

use crate::report::Reporter;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use simple_error::{SimpleError, SimpleResult};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
pub const TIMESTAMP_WIDTH: usize = 20;
pub const DEFAULT_LIFETIME_SECS: u32 = 3600;

const TMP_SUFFIX: &str = "tmp";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub payload: Vec<u8>,
    pub written_at: DateTime<Utc>,
}

pub struct TtlCache<'r> {
    root: PathBuf,
    lifetime: Duration,
    reporter: &'r dyn Reporter,
}

impl<'r> TtlCache<'r> {
    pub fn new(root: impl Into<PathBuf>, lifetime: Duration, reporter: &'r dyn Reporter) -> Self {
        TtlCache {
            root: root.into(),
            lifetime,
            reporter,
        }
    }

    pub fn write(
        &self,
        key: &str,
        payload: &[u8],
        timestamp: Option<DateTime<Utc>>,
    ) -> SimpleResult<()> {
        let result = self.write_atomic(key, payload, timestamp.unwrap_or_else(Utc::now));
        if let Err(e) = &result {
            self.reporter
                .error(&format!("Failed to write cache {}: {}", key, e));
        }
        result
    }

    /// `Ok(None)` when there is no entry for `key` or it has expired.
    pub fn read(&self, key: &str) -> SimpleResult<Option<CacheEntry>> {
        self.read_at(key, Utc::now())
    }

    pub fn read_at(&self, key: &str, now: DateTime<Utc>) -> SimpleResult<Option<CacheEntry>> {
        let result = self.load(key, now);
        if let Err(e) = &result {
            self.reporter
                .error(&format!("Failed to read cache {}: {}", key, e));
        }
        result
    }

    /// Remove the entry for `key`, or every entry when `key` is `None`.
    pub fn clear(&self, key: Option<&str>) -> SimpleResult<()> {
        let result = match key {
            Some(key) => self.entry_path(key).and_then(|path| {
                remove_if_present(&path).map_err(|e| SimpleError::with("remove failed", e))
            }),
            None => self.clear_all(),
        };
        if let Err(e) = &result {
            self.reporter.error(&format!("Failed to clear cache: {}", e));
        }
        result
    }

    pub fn is_expired(&self, written_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(written_at) >= self.lifetime
    }

    fn write_atomic(&self, key: &str, payload: &[u8], timestamp: DateTime<Utc>) -> SimpleResult<()> {
        let path = self.entry_path(key)?;
        let stamp = encode_timestamp(timestamp)?;
        fs::create_dir_all(&self.root)
            .map_err(|e| SimpleError::with("cannot create cache directory", e))?;

        let tmp = self.root.join(format!(
            ".{}.{}.{}.{}",
            key,
            process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed),
            TMP_SUFFIX
        ));
        let written =
            write_file(&tmp, stamp.as_bytes(), payload).and_then(|_| fs::rename(&tmp, &path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    self.reporter.warn(&format!(
                        "Could not remove temporary file {}: {}",
                        tmp.display(),
                        cleanup
                    ));
                }
            }
            return Err(SimpleError::with("atomic write failed", e));
        }
        self.reporter
            .debug(&format!("Cached {} bytes in '{}'.", payload.len(), key));
        Ok(())
    }

    fn load(&self, key: &str, now: DateTime<Utc>) -> SimpleResult<Option<CacheEntry>> {
        let path = self.entry_path(key)?;
        let mut file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SimpleError::with("open failed", e)),
        };
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| SimpleError::with("read failed", e))?;

        let split = bytes.len().min(TIMESTAMP_WIDTH);
        let written_at = match decode_timestamp(&bytes[..split]) {
            Some(ts) => ts,
            None => {
                self.reporter.warn(&format!(
                    "Invalid timestamp in cache {}, falling back to modification time.",
                    key
                ));
                let modified = file
                    .metadata()
                    .and_then(|m| m.modified())
                    .map_err(|e| SimpleError::with("no modification time", e))?;
                DateTime::<Utc>::from(modified)
            }
        };

        if self.is_expired(written_at, now) {
            self.reporter
                .debug(&format!("Cache entry '{}' from {} expired.", key, written_at));
            return Ok(None);
        }

        Ok(Some(CacheEntry {
            key: key.to_string(),
            payload: bytes.split_off(split),
            written_at,
        }))
    }

    fn clear_all(&self) -> SimpleResult<()> {
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(SimpleError::with("cannot list cache directory", e)),
        };

        let mut failed = 0usize;
        for entry in dir {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    self.reporter.warn(&format!("Cannot inspect cache entry: {}", e));
                    failed += 1;
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            if let Err(e) = remove_if_present(&path) {
                self.reporter
                    .warn(&format!("Cannot remove {}: {}", path.display(), e));
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(SimpleError::new(format!(
                "{} cache file(s) could not be removed",
                failed
            )));
        }
        Ok(())
    }

    fn entry_path(&self, key: &str) -> SimpleResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

/// Keys become file names; temporary files start with a dot.
fn validate_key(key: &str) -> SimpleResult<()> {
    if key.is_empty() || key.starts_with('.') || key.contains(|c: char| c == '/' || c == '\\') {
        return Err(SimpleError::new(format!("invalid cache key '{}'", key)));
    }
    Ok(())
}

pub fn encode_timestamp(ts: DateTime<Utc>) -> SimpleResult<String> {
    let stamp = ts.format(TIMESTAMP_FORMAT).to_string();
    if stamp.len() != TIMESTAMP_WIDTH {
        return Err(SimpleError::new(format!(
            "timestamp {} does not fit {} bytes",
            stamp, TIMESTAMP_WIDTH
        )));
    }
    Ok(stamp)
}

pub fn decode_timestamp(prefix: &[u8]) -> Option<DateTime<Utc>> {
    if prefix.len() != TIMESTAMP_WIDTH {
        return None;
    }
    let s = std::str::from_utf8(prefix).ok()?;
    let naive = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

fn write_file(path: &Path, stamp: &[u8], payload: &[u8]) -> io::Result<()> {
    let mut f = File::create(path)?;
    f.write_all(stamp)?;
    f.write_all(payload)?;
    f.sync_all()
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
