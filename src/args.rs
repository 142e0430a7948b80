use clap::Parser;
use std::fs;
use std::path::PathBuf;

use crate::errors::StartupError;
use crate::file_serving::HandlerFlags;
use crate::logging::LoggingExt;
use crate::registry::EncodingRegistry;

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Static file server with gzip precompression",
    long_about = None
)]
pub struct Args {
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    pub listen_addr: String,

    #[arg(short, long)]
    pub serve_dir: PathBuf,

    /// Extra gzip-eligible extension, optionally with its MIME type
    /// (e.g. `svg` or `.wasm=application/wasm`)
    #[arg(short, long = "gzip-ext", value_name = "EXT[=MIME]")]
    pub gzip_ext: Vec<String>,

    /// Never serve paths without an extension
    #[arg(long)]
    pub ignore_empty_ext: bool,

    /// Render an HTML listing for directories
    #[arg(long)]
    pub dir_listing: bool,

    /// Redirect `/dir` to `/dir/`
    #[arg(long)]
    pub dir_redirect: bool,
}

impl Args {
    pub fn handler_flags(&self) -> HandlerFlags {
        HandlerFlags {
            ignore_empty_extension: self.ignore_empty_ext,
            directory_listing: self.dir_listing,
            directory_redirect: self.dir_redirect,
        }
    }

    /// Default registry plus every `--gzip-ext`.
    pub fn build_registry(&self) -> Result<EncodingRegistry, StartupError> {
        let registry = EncodingRegistry::new();
        for value in &self.gzip_ext {
            let (ext, mime) = parse_gzip_ext(value)?;
            registry.register(ext, mime)?;
        }
        Ok(registry)
    }

    /// Canonical serve directory; fails unless it exists and is a directory.
    pub fn canonical_serve_dir(&self) -> Result<PathBuf, StartupError> {
        let dir = self
            .serve_dir
            .display()
            .log_operation("canonicalize", || fs::canonicalize(&self.serve_dir))
            .map_err(|e| {
                StartupError::IoError(
                    format!("Failed to open serve directory {}", self.serve_dir.display()),
                    e,
                )
            })?;
        if !dir.is_dir() {
            return Err(StartupError::NotADirectory(dir));
        }
        Ok(dir)
    }
}

fn parse_gzip_ext(value: &str) -> Result<(&str, Option<&str>), StartupError> {
    let (ext, mime) = match value.split_once('=') {
        Some((ext, mime)) => (ext.trim(), Some(mime.trim())),
        None => (value.trim(), None),
    };
    if ext.is_empty() {
        return Err(StartupError::InvalidGzipExt(value.to_string()));
    }
    Ok((ext, mime))
}
