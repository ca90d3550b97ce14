use std::fs;
use std::path::Path;

use log::warn;

use crate::checks::Diagnostic;
use crate::errors::ReadError;
use crate::parsers::ParserChain;

// @module: File reading for validation runs

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    /// Read a file's raw bytes
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, ReadError> {
        let path = path.as_ref();
        if !Self::file_exists(path) {
            return Err(ReadError::Missing(path.to_path_buf()));
        }
        fs::read(path).map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a file and run it through `parser`.
    ///
    /// Failures are returned as the diagnostic that should be reported for
    /// this file; the caller moves on to the next one.
    pub fn load_content<P: AsRef<Path>>(path: P, parser: &ParserChain) -> Result<String, Diagnostic> {
        let path = path.as_ref();
        let raw = match Self::read_bytes(path) {
            Ok(raw) => raw,
            Err(ReadError::Missing(path)) => {
                warn!("{} does not exist", path.display());
                return Err(Diagnostic::MissingFile { path });
            }
            Err(e) => {
                warn!("{}", e);
                return Err(Diagnostic::ParseFailure {
                    path: path.to_path_buf(),
                    cause: e.to_string(),
                });
            }
        };

        parser.parse(&raw).map_err(|e| {
            warn!("Failed to parse {}: {}", path.display(), e);
            Diagnostic::ParseFailure {
                path: path.to_path_buf(),
                cause: e.to_string(),
            }
        })
    }
}
