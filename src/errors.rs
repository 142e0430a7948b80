use std::path::PathBuf;

use thiserror::Error;

/// Failures while filling the encoding registry. These only happen at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("extension is empty")]
    EmptyExtension,

    /// `.gz` marks an encoding, it is never a source type for a gzip sibling
    #[error("'.gz' is a content encoding and cannot be registered as a gzip-eligible extension")]
    GzipExtension,

    /// Only a single suffix after the last `.` can ever match a request
    #[error("invalid extension '{0}': must be a single suffix without '.' or path separators")]
    InvalidExtension(String),

    #[error("unknown extension '{0}': no MIME type is known for it and no override was given")]
    UnknownExtension(String),

    #[error("MIME type override for extension '{0}' is empty")]
    EmptyMimeType(String),
}

/// Why a request path was refused. Every variant maps to `403 Forbidden`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("path contains a NUL byte")]
    NulByte,

    #[error("path contains the native path separator")]
    NativeSeparator,

    #[error("path escapes the serve root")]
    Traversal,

    #[error("hidden or implementation file name")]
    HiddenName,
}

#[derive(Debug, Error)]
pub enum StartupError {
    /// Any kind of IO errors
    #[error("{0}\ncaused by: {1}")]
    IoError(String, std::io::Error),

    #[error("serve directory '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("invalid --gzip-ext value '{0}': expected EXT or EXT=MIME")]
    InvalidGzipExt(String),

    #[error("failed to register gzip extension\ncaused by: {0}")]
    Registry(#[from] RegistryError),
}

pub fn log_error_chain(description: String) {
    for cause in description.lines() {
        log::error!("{cause}");
    }
}
