//! Size-rotated log file
//!
//! [`RotatingFileWriter`] appends to one file and, when the next write would
//! push it past the configured size, moves it aside to a timestamped backup
//! and starts a fresh file. After each rotation, backups beyond the retention
//! limits are removed and the remaining ones optionally gzipped.

use crate::core::error::{LoggerError, Result};
use crate::core::timestamp::{system_clock, TimestampFn};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime, Utc};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const MEGABYTE: u64 = 1024 * 1024;

/// Size used when the configured maximum is zero
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;

const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const COMPRESS_SUFFIX: &str = ".gz";
const MAX_AGE_DAYS: u64 = 365_000;

/// When to rotate and which backups to keep
///
/// # Examples
///
/// ```
/// use rust_leveled_logger::appenders::RotationPolicy;
///
/// // Rotate at 50 MB, keep a week of gzipped backups, at most 10 of them
/// let policy = RotationPolicy::new()
///     .with_max_size_mb(50)
///     .with_max_age_days(7)
///     .with_max_backups(10)
///     .with_compression(true);
/// assert_eq!(policy.max_bytes(), 50 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    max_bytes: u64,
    /// Backups older than this many days are removed; zero keeps them all
    pub max_age_days: u64,
    /// Number of backups to keep; zero keeps them all
    pub max_backups: usize,
    /// Gzip backups after rotation
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_SIZE_MB * MEGABYTE,
            max_age_days: 0,
            max_backups: 0,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum file size in megabytes. Zero selects the default.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size_mb(self, megabytes: u64) -> Self {
        let megabytes = if megabytes == 0 {
            DEFAULT_MAX_SIZE_MB
        } else {
            megabytes
        };
        self.with_max_bytes(megabytes.saturating_mul(MEGABYTE))
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes.max(1);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age_days(mut self, days: u64) -> Self {
        self.max_age_days = days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }
}

/// A log file that rotates itself by size
///
/// # Examples
///
/// ```no_run
/// use rust_leveled_logger::appenders::{RotatingFileWriter, RotationPolicy};
/// use std::io::Write;
///
/// let policy = RotationPolicy::new().with_max_size_mb(100).with_max_age_days(7);
/// let mut writer = RotatingFileWriter::with_policy("log/app.log", policy).unwrap();
/// writer.write_all(b"{\"level\":\"info\",\"msg\":\"hello\"}\n").unwrap();
/// ```
pub struct RotatingFileWriter {
    path: PathBuf,
    policy: RotationPolicy,
    file: Option<File>,
    size: u64,
    clock: TimestampFn,
}

impl RotatingFileWriter {
    /// Open `path` for appending with the default policy
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created or opened
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// Open `path` for appending with a custom policy
    ///
    /// # Errors
    ///
    /// Returns error if the path is empty or the file cannot be opened
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.as_os_str().is_empty() {
            return Err(LoggerError::config("RotatingFileWriter", "empty log file path"));
        }

        let mut writer = Self {
            path,
            policy,
            file: None,
            size: 0,
            clock: system_clock(),
        };
        writer.open_existing()?;
        Ok(writer)
    }

    /// Replace the clock used to name backups and judge their age
    #[must_use]
    pub fn with_clock(mut self, clock: TimestampFn) -> Self {
        self.clock = clock;
        self
    }

    fn open_existing(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                LoggerError::file_appender(
                    self.path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;

        let metadata = file.metadata().map_err(|e| {
            LoggerError::file_appender(
                self.path.display().to_string(),
                format!("Cannot access file metadata: {}", e),
            )
        })?;

        self.size = metadata.len();
        self.file = Some(file);
        Ok(())
    }

    /// Close the current file, move it to a backup and open a new one
    ///
    /// Pruning and compressing older backups happens afterwards; a failure
    /// there is reported on stderr and leaves the fresh file in place.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be renamed or reopened
    pub fn rotate(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        if self.path.exists() {
            let backup = self.free_backup_path();
            fs::rename(&self.path, &backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;
        }

        self.open_existing()?;
        self.size = 0;
        if let Err(e) = self.prune_backups() {
            eprintln!(
                "[WARN] Failed to clean up backups of {}: {}",
                self.path.display(),
                e
            );
        }
        Ok(())
    }

    /// Backup name for now, moved forward a millisecond at a time past
    /// names already taken by an earlier rotation
    fn free_backup_path(&self) -> PathBuf {
        let mut at = (self.clock)();
        loop {
            let candidate = self.backup_path(at);
            let mut compressed = candidate.as_os_str().to_os_string();
            compressed.push(COMPRESS_SUFFIX);
            if !candidate.exists() && !Path::new(&compressed).exists() {
                return candidate;
            }
            at += ChronoDuration::milliseconds(1);
        }
    }

    /// `dir/app.log` at `t` -> `dir/app-<t>.log`
    fn backup_path(&self, at: DateTime<Utc>) -> PathBuf {
        let (stem, ext) = self.name_parts();
        let stamp = at.format(BACKUP_TIME_FORMAT);
        self.path.with_file_name(format!("{}-{}{}", stem, stamp, ext))
    }

    fn name_parts(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("app")
            .to_string();
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        (stem, ext)
    }

    /// Backups of this file, newest first
    pub fn backups(&self) -> Result<Vec<Backup>> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        };
        let (stem, ext) = self.name_parts();
        let prefix = format!("{}-", stem);

        let entries = fs::read_dir(&dir).map_err(|e| {
            LoggerError::io_operation(
                "list log backups",
                format!("Cannot read directory '{}'", dir.display()),
                e,
            )
        })?;

        let mut backups: Vec<Backup> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                let (plain, compressed) = match name.strip_suffix(COMPRESS_SUFFIX) {
                    Some(plain) => (plain.to_string(), true),
                    None => (name.clone(), false),
                };
                let stamp = plain.strip_prefix(&prefix)?.strip_suffix(ext.as_str())?;
                let created = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT)
                    .ok()?
                    .and_utc();
                Some(Backup {
                    path: entry.path(),
                    created,
                    compressed,
                })
            })
            .collect();

        backups.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(backups)
    }

    /// Remove backups beyond the retention limits, then compress the rest
    fn prune_backups(&self) -> Result<()> {
        if self.policy.max_backups == 0 && self.policy.max_age_days == 0 && !self.policy.compress
        {
            return Ok(());
        }

        let mut backups = self.backups()?;

        if self.policy.max_backups > 0 && backups.len() > self.policy.max_backups {
            for stale in backups.split_off(self.policy.max_backups) {
                self.remove_backup(&stale);
            }
        }

        if self.policy.max_age_days > 0 {
            let days = i64::try_from(self.policy.max_age_days.min(MAX_AGE_DAYS)).unwrap_or(0);
            let cutoff = (self.clock)() - ChronoDuration::days(days);
            let (keep, stale): (Vec<Backup>, Vec<Backup>) =
                backups.into_iter().partition(|b| b.created >= cutoff);
            for backup in &stale {
                self.remove_backup(backup);
            }
            backups = keep;
        }

        if self.policy.compress {
            for backup in backups.iter().filter(|b| !b.compressed) {
                compress_file(&backup.path)?;
            }
        }

        Ok(())
    }

    fn remove_backup(&self, backup: &Backup) {
        if let Err(e) = fs::remove_file(&backup.path) {
            eprintln!(
                "[WARN] Failed to remove old backup {}: {}",
                backup.path.display(),
                e
            );
        }
    }

    /// Bytes written to the current file
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    fn write_event(&mut self, buf: &[u8]) -> Result<usize> {
        let len = buf.len() as u64;
        if len > self.policy.max_bytes {
            return Err(LoggerError::file_appender(
                self.path.display().to_string(),
                format!(
                    "write length {} exceeds maximum file size {}",
                    len, self.policy.max_bytes
                ),
            ));
        }

        if self.file.is_none() {
            self.open_existing()?;
        }
        if self.size + len > self.policy.max_bytes {
            self.rotate()?;
        }

        let file = self.file.as_mut().ok_or_else(|| {
            LoggerError::file_appender(self.path.display().to_string(), "file is not open")
        })?;
        let written = file.write(buf)?;
        self.size += written as u64;
        Ok(written)
    }
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_event(buf).map_err(|e| match e {
            LoggerError::IoError(io) => io,
            other => io::Error::other(other),
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for RotatingFileWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotatingFileWriter")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// A rotated-out copy of the log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    pub path: PathBuf,
    /// Rotation time recorded in the file name
    pub created: DateTime<Utc>,
    pub compressed: bool,
}

/// Gzip `path` to `path.gz`, removing the original only once the compressed
/// copy is complete.
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, BufWriter};

    let mut gz_name = path.as_os_str().to_os_string();
    gz_name.push(COMPRESS_SUFFIX);
    let gz_path = PathBuf::from(gz_name);
    let mut tmp_name = gz_path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let temp_gz_path = PathBuf::from(tmp_name);

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!(
                "Failed to create temporary compressed file: {}",
                temp_gz_path.display()
            ),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let streamed = io::copy(&mut reader, &mut encoder)
        .and_then(|_| encoder.finish())
        .and_then(|mut out| out.flush());
    if let Err(e) = streamed {
        let _ = fs::remove_file(&temp_gz_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz_path.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[WARN] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }

    Ok(())
}
