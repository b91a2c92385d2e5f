use crate::config::LoggingConfig;
use flexi_logger::{DeferredNow, Duplicate, FileSpec, Logger, LoggerHandle, WriteMode};
use log::Record;
use std::io::Write;
use std::thread;

/// Initializes the logger from the `[logging]` section.
pub fn init_logger(cfg: &LoggingConfig) -> Result<LoggerHandle, Box<dyn std::error::Error>> {
    let logger = Logger::try_with_str(&cfg.spec)?
        .log_to_file(
            FileSpec::default()
                .directory(cfg.directory.clone())
                .basename("viosock-probe")
                .suppress_timestamp(),
        )
        .append()
        .write_mode(WriteMode::BufferAndFlush)
        .format(log_format);

    let logger = if cfg.stderr {
        logger.duplicate_to_stderr(Duplicate::Info)
    } else {
        logger
    };

    Ok(logger.start()?)
}

/// timestamp, level, source file/line, thread name, message.
fn log_format(w: &mut dyn Write, now: &mut DeferredNow, record: &Record) -> std::io::Result<()> {
    write!(
        w,
        "{} [{:<5}] [{}:{}] [{}] {}",
        now.format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.file().unwrap_or("<unknown>"),
        record.line().unwrap_or(0),
        thread::current().name().unwrap_or("<unnamed>"),
        &record.args()
    )
}
