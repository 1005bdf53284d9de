use crate::Result;
use flexi_logger::{opt_format, Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};
use std::path::PathBuf;

/// Where and how much to log
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Fallback spec when `RUST_LOG` is unset, e.g. `"info"` or `"civ_mcts=debug"`
    pub level: String,
    /// Log to rotated files in this directory; stderr only when `None`
    pub directory: Option<PathBuf>,
    pub rotate_bytes: u64,
    pub keep_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            rotate_bytes: 10 * 1024 * 1024,
            keep_files: 1,
        }
    }
}

/// Starts the global logger. Keep the returned handle alive for the whole run.
pub fn setup_logging(config: &LogConfig) -> Result<LoggerHandle> {
    let logger = Logger::try_with_env_or_str(&config.level)?.format(opt_format);

    let handle = match &config.directory {
        Some(directory) => logger
            .log_to_file(FileSpec::default().directory(directory.clone()))
            .rotate(
                Criterion::Size(config.rotate_bytes),
                Naming::Numbers,
                Cleanup::KeepLogFiles(config.keep_files),
            )
            .duplicate_to_stderr(Duplicate::Warn)
            .start()?,
        None => logger.log_to_stderr().start()?,
    };
    Ok(handle)
}
