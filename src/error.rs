use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while scraping, persisting or exporting products
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Chrome could not be started
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    /// Navigation did not complete
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// JavaScript evaluation in the page failed
    #[error("Script evaluation failed: {0}")]
    EvaluationFailed(String),

    /// Reading or writing the state file failed
    #[error("Failed to access state file {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state file is not valid JSON of the expected shape
    #[error("Malformed state file {path}: {source}")]
    StoreFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("State lock poisoned")]
    LockPoisoned,

    /// Building the spreadsheet failed
    #[error("Spreadsheet export failed: {0}")]
    ExportFailed(#[from] rust_xlsxwriter::XlsxError),

    /// The blocking scrape task panicked or was cancelled
    #[error("Scrape task aborted: {0}")]
    TaskAborted(String),

    /// A user-supplied value was rejected
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, BrowserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_io_display_includes_path() {
        let err = BrowserError::StoreIo {
            path: PathBuf::from("state.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let text = err.to_string();
        assert!(text.contains("state.json"));
        assert!(text.contains("denied"));
    }

    #[test]
    fn test_navigation_failed_display() {
        let err = BrowserError::NavigationFailed("timeout".to_string());
        assert_eq!(err.to_string(), "Navigation failed: timeout");
    }
}
