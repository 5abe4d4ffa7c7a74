//! Token dump loading with compile-time size limits and global logging
//!
//! A token dump is the JSON form of a lexer's output for one PHP file:
//! an array of `[kind, text, line]` triples or `{"kind", "text", "line"}`
//! objects.

use crate::config::compile_time::file_processing::MAX_FILE_SIZE;
use crate::logging::codes;
use crate::tokens::RawToken;
use crate::{log_debug, log_error};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Token dump loading errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Not a regular file: {path}")]
    InvalidPath { path: String },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid token dump {path}: {message}")]
    InvalidFormat { path: String, message: String },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::input::FILE_NOT_FOUND,
            FileProcessorError::FileTooLarge { .. } => codes::input::FILE_TOO_LARGE,
            FileProcessorError::InvalidFormat { .. } => codes::input::INVALID_TOKEN_DUMP,
            FileProcessorError::InvalidPath { .. }
            | FileProcessorError::PermissionDenied { .. }
            | FileProcessorError::IoError { .. } => codes::input::IO_ERROR,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

/// Raw tokens read from one dump file
#[derive(Debug, Clone)]
pub struct TokenDump {
    pub path: PathBuf,
    pub size: u64,
    pub raw_tokens: Vec<RawToken>,
}

/// Parse a dump already held in memory
pub fn parse_token_dump(path: &str, source: &str) -> Result<Vec<RawToken>, FileProcessorError> {
    serde_json::from_str(source).map_err(|e| FileProcessorError::InvalidFormat {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Read and parse a token dump from disk
pub fn load_token_dump(path: &Path) -> Result<TokenDump, FileProcessorError> {
    let display = path.display().to_string();
    log_debug!("Loading token dump", "file" => display);

    let result = read_dump(path, &display);
    match &result {
        Ok(dump) => log_debug!(
            "Token dump loaded",
            "file" => display,
            "size_bytes" => dump.size,
            "tokens" => dump.raw_tokens.len()
        ),
        Err(error) => log_error!(error.error_code(), "Failed to load token dump",
            "file" => display,
            "error" => error
        ),
    }
    result
}

fn read_dump(path: &Path, display: &str) -> Result<TokenDump, FileProcessorError> {
    let metadata = fs::metadata(path).map_err(|e| io_error(e, display))?;
    if !metadata.is_file() {
        return Err(FileProcessorError::InvalidPath {
            path: display.to_string(),
        });
    }

    let size = metadata.len();
    if size > MAX_FILE_SIZE {
        return Err(FileProcessorError::FileTooLarge {
            size,
            max_size: MAX_FILE_SIZE,
        });
    }

    let source = fs::read_to_string(path).map_err(|e| io_error(e, display))?;
    let raw_tokens = parse_token_dump(display, &source)?;

    Ok(TokenDump {
        path: path.to_path_buf(),
        size,
        raw_tokens,
    })
}

fn io_error(error: std::io::Error, path: &str) -> FileProcessorError {
    match error.kind() {
        ErrorKind::NotFound => FileProcessorError::FileNotFound {
            path: path.to_string(),
        },
        ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
            path: path.to_string(),
        },
        _ => FileProcessorError::IoError {
            message: format!("{}: {}", path, error),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_load_token_dump() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.tokens.json");
        fs::write(
            &path,
            r#"[["T_OPEN_TAG", "<?php ", 1], {"kind": "T_FUNCTION", "text": "function", "line": 1}]"#,
        )
        .unwrap();

        let dump = load_token_dump(&path).unwrap();
        assert_eq!(dump.raw_tokens.len(), 2);
        assert_eq!(dump.raw_tokens[1].kind, "T_FUNCTION");
        assert!(dump.size > 0);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let error = load_token_dump(&dir.path().join("absent.tokens.json")).unwrap_err();
        assert_matches!(error, FileProcessorError::FileNotFound { .. });
        assert_eq!(error.error_code(), codes::input::FILE_NOT_FOUND);
    }

    #[test]
    fn test_directory_is_not_a_dump() {
        let dir = tempdir().unwrap();
        assert_matches!(
            load_token_dump(dir.path()),
            Err(FileProcessorError::InvalidPath { .. })
        );
    }

    #[test]
    fn test_malformed_json() {
        let error = parse_token_dump("x.tokens.json", "{not json").unwrap_err();
        assert_matches!(error, FileProcessorError::InvalidFormat { .. });
        assert_eq!(error.error_code(), codes::input::INVALID_TOKEN_DUMP);
    }
}
