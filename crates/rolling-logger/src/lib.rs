//! Rolling Logger
//!
//! Size-rotated file logging with an in-memory ring of the most recent lines.
//!
//! `init_logger` installs a global `tracing` subscriber writing to stderr and
//! to `<log_dir>/<app_name>.log`. When the active file grows past
//! `MAX_FILE_BYTES` it is shifted to `<app_name>.log.1` (older files move up
//! to `.MAX_FILES`, the oldest is dropped). `log` records are bridged into the
//! same subscriber, so library code can keep using the `log` macros.

use std::collections::VecDeque;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
#[cfg(not(target_os = "android"))]
use tracing_subscriber::util::SubscriberInitExt;

/// Rotate once the active file reaches this size
pub const MAX_FILE_BYTES: u64 = 1024 * 1024;
/// Number of rotated files kept next to the active one
pub const MAX_FILES: usize = 3;
/// Lines kept in the in-memory ring
pub const RING_CAPACITY: usize = 500;

static LOGGER: OnceLock<RollingFile> = OnceLock::new();

/// Logger errors
#[derive(Debug)]
pub enum LoggerError {
    Io(io::Error),
    AlreadyInitialized,
    NotInitialized,
    Install(String),
}

impl fmt::Display for LoggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerError::Io(e) => write!(f, "Log file error: {}", e),
            LoggerError::AlreadyInitialized => write!(f, "Logger already initialized"),
            LoggerError::NotInitialized => write!(f, "Logger not initialized"),
            LoggerError::Install(msg) => write!(f, "Failed to install subscriber: {}", msg),
        }
    }
}

impl std::error::Error for LoggerError {}

impl From<io::Error> for LoggerError {
    fn from(e: io::Error) -> Self {
        LoggerError::Io(e)
    }
}

// ========================
// Rolling file writer
// ========================

struct RollingState {
    dir: PathBuf,
    app_name: String,
    file: Option<File>,
    written: u64,
    max_bytes: u64,
    max_files: usize,
    recent: VecDeque<String>,
    capacity: usize,
    partial: String,
}

impl RollingState {
    fn active_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.app_name))
    }

    fn rotated_path(&self, n: usize) -> PathBuf {
        self.dir.join(format!("{}.log.{}", self.app_name, n))
    }

    fn open(&mut self) -> io::Result<()> {
        let path = self.active_path();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        self.written = file.metadata().map(|m| m.len()).unwrap_or(0);
        self.file = Some(file);
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file = None;
        if self.max_files == 0 {
            fs::remove_file(self.active_path()).or_else(ignore_missing)?;
            return self.open();
        }
        fs::remove_file(self.rotated_path(self.max_files)).or_else(ignore_missing)?;
        for n in (1..self.max_files).rev() {
            let from = self.rotated_path(n);
            if from.exists() {
                fs::rename(&from, self.rotated_path(n + 1))?;
            }
        }
        let active = self.active_path();
        if active.exists() {
            fs::rename(&active, self.rotated_path(1))?;
        }
        self.open()
    }

    fn remember(&mut self, buf: &[u8]) {
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(pos) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=pos).collect();
            if self.recent.len() == self.capacity {
                self.recent.pop_front();
            }
            self.recent.push_back(line.trim_end().to_string());
        }
    }
}

fn ignore_missing(e: io::Error) -> io::Result<()> {
    if e.kind() == io::ErrorKind::NotFound {
        Ok(())
    } else {
        Err(e)
    }
}

/// Size-rotated log file shared between the subscriber and `recent_lines`
#[derive(Clone)]
pub struct RollingFile {
    state: Arc<Mutex<RollingState>>,
}

impl RollingFile {
    /// Open (or create) `<dir>/<app_name>.log` with the default limits
    pub fn new(dir: impl AsRef<Path>, app_name: &str) -> Result<Self, LoggerError> {
        Self::with_limits(dir, app_name, MAX_FILE_BYTES, MAX_FILES, RING_CAPACITY)
    }

    pub fn with_limits(
        dir: impl AsRef<Path>,
        app_name: &str,
        max_bytes: u64,
        max_files: usize,
        capacity: usize,
    ) -> Result<Self, LoggerError> {
        fs::create_dir_all(dir.as_ref())?;
        let mut state = RollingState {
            dir: dir.as_ref().to_path_buf(),
            app_name: app_name.to_string(),
            file: None,
            written: 0,
            max_bytes,
            max_files,
            recent: VecDeque::with_capacity(capacity),
            capacity,
            partial: String::new(),
        };
        state.open()?;
        Ok(Self { state: Arc::new(Mutex::new(state)) })
    }

    /// Path of the file currently written to
    pub fn path(&self) -> PathBuf {
        match self.state.lock() {
            Ok(state) => state.active_path(),
            Err(poisoned) => poisoned.into_inner().active_path(),
        }
    }

    /// Most recent lines, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        match self.state.lock() {
            Ok(state) => state.recent.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Writer handed out per event
pub struct RollingWriter {
    state: Arc<Mutex<RollingState>>,
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log state poisoned"))?;
        if state.written + buf.len() as u64 > state.max_bytes && state.written > 0 {
            state.rotate()?;
        }
        if state.file.is_none() {
            state.open()?;
        }
        if let Some(file) = state.file.as_mut() {
            file.write_all(buf)?;
        }
        state.written += buf.len() as u64;
        state.remember(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log state poisoned"))?;
        match state.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for RollingFile {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RollingWriter { state: self.state.clone() }
    }
}

/// Local wall-clock timestamps
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

// ========================
// Global logger
// ========================

/// Install the global subscriber. Call once, before any logging.
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), LoggerError> {
    if LOGGER.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }

    let rolling = RollingFile::new(log_dir, app_name)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(rolling.clone())
        .with_ansi(false)
        .with_timer(LocalTime);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_timer(LocalTime);

    let subscriber = tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(file_layer)
        .with(stderr_layer);

    // On Android `log` records go to logcat instead of the subscriber
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default().with_max_level(log::LevelFilter::Info),
        );
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| LoggerError::Install(e.to_string()))?;
    }
    #[cfg(not(target_os = "android"))]
    subscriber
        .try_init()
        .map_err(|e| LoggerError::Install(e.to_string()))?;

    LOGGER
        .set(rolling)
        .map_err(|_| LoggerError::AlreadyInitialized)
}

/// Recent lines of the global logger (empty before `init_logger`)
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(RollingFile::recent_lines).unwrap_or_default()
}

fn ensure_initialized() -> Result<(), LoggerError> {
    if LOGGER.get().is_some() {
        Ok(())
    } else {
        Err(LoggerError::NotInitialized)
    }
}

pub fn info(msg: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    log::info!("{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    log::warn!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    log::error!("{}", msg);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_and_remembers_lines() {
        let dir = tempfile::tempdir().unwrap();
        let rolling = RollingFile::new(dir.path(), "Checklist").unwrap();

        let mut writer = rolling.make_writer();
        writer.write_all(b"first line\nsecond ").unwrap();
        writer.write_all(b"line\n").unwrap();

        assert_eq!(rolling.recent_lines(), vec!["first line", "second line"]);
        let content = fs::read_to_string(rolling.path()).unwrap();
        assert_eq!(content, "first line\nsecond line\n");
    }

    #[test]
    fn test_ring_drops_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let rolling = RollingFile::with_limits(dir.path(), "Checklist", MAX_FILE_BYTES, MAX_FILES, 2).unwrap();

        let mut writer = rolling.make_writer();
        writer.write_all(b"a\nb\nc\n").unwrap();

        assert_eq!(rolling.recent_lines(), vec!["b", "c"]);
    }

    #[test]
    fn test_rotates_past_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let rolling = RollingFile::with_limits(dir.path(), "Checklist", 16, 2, 10).unwrap();

        let mut writer = rolling.make_writer();
        writer.write_all(b"0123456789\n").unwrap();
        writer.write_all(b"abcdefghij\n").unwrap();
        writer.write_all(b"ABCDEFGHIJ\n").unwrap();

        let active = fs::read_to_string(dir.path().join("Checklist.log")).unwrap();
        let first = fs::read_to_string(dir.path().join("Checklist.log.1")).unwrap();
        let second = fs::read_to_string(dir.path().join("Checklist.log.2")).unwrap();
        assert_eq!(active, "ABCDEFGHIJ\n");
        assert_eq!(first, "abcdefghij\n");
        assert_eq!(second, "0123456789\n");
    }

    #[test]
    fn test_helpers_require_init() {
        if LOGGER.get().is_none() {
            assert!(matches!(info("hello"), Err(LoggerError::NotInitialized)));
        }
    }
}
