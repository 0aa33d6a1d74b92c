//! Logging setup.
//!
//! The terminal is busy showing slides so logs go to a file in the project's data directory.

use directories::ProjectDirs;
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_ENV: &str = "LIVEDECK_LOG";
const LOG_FILE: &str = "livedeck.log";

/// The directory logs are written to.
pub fn log_directory() -> Option<PathBuf> {
    ProjectDirs::from("", "", "livedeck").map(|dirs| dirs.data_local_dir().to_path_buf())
}

/// Initialize logging into a file.
pub fn initialize_logging() -> Result<PathBuf, LoggingError> {
    let directory = log_directory().ok_or(LoggingError::NoDataDirectory)?;
    let (log_path, log_file) = create_log_file(&directory)?;

    let file_layer = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_filter(EnvFilter::new(filter_directives(|name| env::var(name).ok())));
    tracing_subscriber::registry().with(file_layer).init();
    Ok(log_path)
}

fn create_log_file(directory: &Path) -> Result<(PathBuf, fs::File), LoggingError> {
    fs::create_dir_all(directory).map_err(|e| LoggingError::Io(directory.to_path_buf(), e))?;
    let log_path = directory.join(LOG_FILE);
    let log_file = fs::File::create(&log_path).map_err(|e| LoggingError::Io(log_path.clone(), e))?;
    Ok((log_path, log_file))
}

fn filter_directives<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(LOG_ENV).or_else(|| lookup("RUST_LOG")).unwrap_or_else(|| format!("{}=info", env!("CARGO_CRATE_NAME")))
}

/// An error setting up logging.
#[derive(thiserror::Error, Debug)]
pub enum LoggingError {
    #[error("no data directory found")]
    NoDataDirectory,

    #[error("creating {}: {}", .0.display(), .1)]
    Io(PathBuf, io::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    #[case::own_variable(Some("livedeck=debug"), Some("warn"), "livedeck=debug")]
    #[case::rust_log(None, Some("warn"), "warn")]
    #[case::default(None, None, "livedeck=info")]
    fn directives(#[case] own: Option<&str>, #[case] rust_log: Option<&str>, #[case] expected: &str) {
        let lookup = |name: &str| match name {
            LOG_ENV => own.map(String::from),
            "RUST_LOG" => rust_log.map(String::from),
            _ => None,
        };
        assert_eq!(filter_directives(lookup), expected);
    }

    #[test]
    fn log_file_created() {
        let dir = tempdir().expect("no tempdir");
        let directory = dir.path().join("logs");
        let (path, _) = create_log_file(&directory).expect("create failed");
        assert_eq!(path, directory.join(LOG_FILE));
        assert!(path.exists());
    }

    #[test]
    fn log_directory_is_a_file() {
        let dir = tempdir().expect("no tempdir");
        let directory = dir.path().join("logs");
        fs::write(&directory, "").expect("write failed");
        let error = create_log_file(&directory).expect_err("created log file");
        assert!(matches!(&error, LoggingError::Io(path, _) if path == &directory));
        assert!(error.to_string().starts_with(&format!("creating {}", directory.display())));
    }
}
