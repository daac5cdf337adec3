//! Console logger plus an optional per-run log file, both env_logger
//! `Logger`s behind one `log::Log`.

use anyhow::{Context, Result};
use chrono::Local;
use env_logger::{Builder, Logger, Target, WriteStyle};
use log::{LevelFilter, Log, Metadata, Record};
use once_cell::sync::OnceCell;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

const FILE_LEVEL: LevelFilter = LevelFilter::Info;
const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static FILE_LOGGER: OnceCell<Logger> = OnceCell::new();

struct DualLogger {
    console: Logger,
}

impl Log for DualLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata) || FILE_LOGGER.get().is_some_and(|f| f.enabled(metadata))
    }

    fn log(&self, record: &Record) {
        if self.console.matches(record) {
            self.console.log(record);
        }
        if let Some(file) = FILE_LOGGER.get() {
            if file.matches(record) {
                file.log(record);
            }
        }
    }

    fn flush(&self) {
        self.console.flush();
        if let Some(file) = FILE_LOGGER.get() {
            file.flush();
        }
    }
}

pub fn console_level(quiet: bool, verbose: u8) -> LevelFilter {
    if quiet {
        LevelFilter::Off
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

pub fn setup_logging(quiet: bool, verbose: u8) {
    let level = console_level(quiet, verbose);
    let console = Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .target(Target::Stderr)
        .build();
    if log::set_boxed_logger(Box::new(DualLogger { console })).is_ok() {
        log::set_max_level(level);
    }
    log::trace!("Logger initialized with level: {:?}", level);
}

/// Starts mirroring records at info level and above into `path`.
/// Only the first call per process takes effect.
pub fn attach_log_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let logger = Builder::new()
        .filter_level(FILE_LEVEL)
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                Local::now().format(FILE_TIMESTAMP_FORMAT),
                record.level(),
                record.args()
            )
        })
        .build();

    if FILE_LOGGER.set(logger).is_err() {
        log::warn!("A log file is already attached; not switching to {}", path.display());
        return Ok(());
    }
    if log::max_level() < FILE_LEVEL {
        log::set_max_level(FILE_LEVEL);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(console_level(true, 3), LevelFilter::Off);
        assert_eq!(console_level(false, 0), LevelFilter::Warn);
        assert_eq!(console_level(false, 1), LevelFilter::Info);
        assert_eq!(console_level(false, 2), LevelFilter::Debug);
        assert_eq!(console_level(false, 9), LevelFilter::Trace);
    }
}
