//! Process-wide logging.
//!
//! Built once in `main` before anything else runs. Every record goes to a
//! per-day file under `logs/` next to the executable, and to stderr unless
//! the server runs in MCP mode (where stdout/stderr belong to the host).

use chrono::{DateTime, Local, NaiveDate};
use env_logger::{Builder, Env, Target};
use log::Record;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const LOG_FILE_PREFIX: &str = "azure-devops-mcp";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to open log file {path}: {source}")]
    File { path: PathBuf, source: io::Error },
    #[error("Failed to locate the executable directory: {0}")]
    ExecutableDir(io::Error),
    #[error("Logger already initialized: {0}")]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

/// Writes every line to the log file and, optionally, to stderr.
struct TeeWriter {
    file: File,
    echo_to_stderr: bool,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        if self.echo_to_stderr {
            // stderr failures must not stop file logging
            let _ = io::stderr().write_all(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.echo_to_stderr {
            let _ = io::stderr().flush();
        }
        Ok(())
    }
}

/// `logs` directory next to the running executable.
pub fn log_dir_for_exe() -> Result<PathBuf, LoggingError> {
    let exe = std::env::current_exe().map_err(LoggingError::ExecutableDir)?;
    let dir = exe.parent().ok_or_else(|| {
        LoggingError::ExecutableDir(io::Error::new(
            io::ErrorKind::NotFound,
            "executable has no parent directory",
        ))
    })?;
    Ok(dir.join("logs"))
}

pub fn log_file_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}-{}.log", LOG_FILE_PREFIX, date.format("%Y-%m-%d")))
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let to_error = |source| LoggingError::File {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(to_error)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_error)
}

/// `[2024-05-01T10:00:00.000+02:00] [INFO] target: message`
fn format_record(buf: &mut impl Write, now: DateTime<Local>, record: &Record) -> io::Result<()> {
    writeln!(
        buf,
        "[{}] [{}] {}: {}",
        now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"),
        record.level(),
        record.target(),
        record.args()
    )
}

/// Installs the global logger and returns the path of today's log file.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init(log_dir: &Path, mcp_mode: bool) -> Result<PathBuf, LoggingError> {
    let path = log_file_path(log_dir, Local::now().date_naive());
    let file = open_log_file(&path)?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| format_record(buf, Local::now(), record))
        .target(Target::Pipe(Box::new(TeeWriter {
            file,
            echo_to_stderr: !mcp_mode,
        })))
        .try_init()?;

    log::info!("Logging to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use log::Level;

    #[test]
    fn log_file_is_named_after_the_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            log_file_path(Path::new("/var/app/logs"), date),
            PathBuf::from("/var/app/logs/azure-devops-mcp-2024-03-07.log")
        );
    }

    #[test]
    fn records_are_formatted_with_timestamp_level_and_target() {
        let now = Local.with_ymd_and_hms(2024, 3, 7, 9, 30, 0).unwrap();
        let mut buf = Vec::new();
        format_record(
            &mut buf,
            now,
            &Record::builder()
                .level(Level::Warn)
                .target("azure_devops_mcp::azure::client")
                .args(format_args!("Operation failed: {}", "wit.get"))
                .build(),
        )
        .unwrap();

        let line = String::from_utf8(buf).unwrap();
        assert!(line.starts_with("[2024-03-07T09:30:00.000"));
        assert!(
            line.ends_with("] [WARN] azure_devops_mcp::azure::client: Operation failed: wit.get\n")
        );
    }

    #[test]
    fn log_file_and_directory_are_created_and_appended() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let path = log_file_path(&dir.path().join("logs"), date);

        for line in ["first\n", "second\n"] {
            let mut writer = TeeWriter {
                file: open_log_file(&path).unwrap(),
                echo_to_stderr: false,
            };
            writer.write_all(line.as_bytes()).unwrap();
            writer.flush().unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
