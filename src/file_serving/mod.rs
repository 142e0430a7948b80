pub mod content;
pub mod handlers;
pub mod listing;
pub mod path_utils;
pub mod redirect;

use std::fs::{self, File, Metadata, ReadDir};
use std::io;
use std::path::{Path, PathBuf};

use crate::compression::{ContentEncoding, GZIP_SUFFIX};
use crate::errors::Rejection;
use crate::http::Response;

/// Behavior toggles, fixed when the handler is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandlerFlags {
    /// Never serve paths without an extension.
    pub ignore_empty_extension: bool,
    /// Render an HTML listing for directories.
    pub directory_listing: bool,
    /// Redirect `/dir` to `/dir/`. Listing takes precedence when both are set.
    pub directory_redirect: bool,
}

/// A request path after sanitizing, rooted under the serve directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Path relative to root, `index.html` appended for index requests.
    pub relative: PathBuf,
    /// `root` joined with `relative`.
    pub path: PathBuf,
    /// Directory the request points into; the directory itself for index requests.
    pub dir_path: PathBuf,
    pub basename: String,
    /// Extension with its leading dot, empty when there is none.
    pub extension: String,
    pub content_type: Option<String>,
    pub is_index: bool,
}

impl ResolvedTarget {
    /// `<path>.gz`
    pub fn gzip_sibling(&self) -> PathBuf {
        let mut sibling = self.path.clone().into_os_string();
        sibling.push(GZIP_SUFFIX);
        PathBuf::from(sibling)
    }

    /// The request names a `.gz` file directly.
    pub fn is_gzip_literal(&self) -> bool {
        self.extension.eq_ignore_ascii_case(GZIP_SUFFIX)
    }
}

#[derive(Debug)]
pub enum OpenedHandle {
    File(File),
    Directory(ReadDir),
}

/// An opened file or directory. The handle is released when this is dropped,
/// whichever way the request ends.
#[derive(Debug)]
pub struct CandidateOpen {
    pub path: PathBuf,
    pub handle: OpenedHandle,
    pub metadata: Metadata,
    pub encoding: ContentEncoding,
}

impl CandidateOpen {
    pub fn open(path: &Path, encoding: ContentEncoding) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        if metadata.is_dir() {
            let entries = fs::read_dir(path)?;
            return Ok(Self {
                path: path.to_path_buf(),
                handle: OpenedHandle::Directory(entries),
                metadata,
                encoding,
            });
        }

        let file = File::open(path)?;
        let metadata = file.metadata()?;
        Ok(Self {
            path: path.to_path_buf(),
            handle: OpenedHandle::File(file),
            metadata,
            encoding,
        })
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.handle, OpenedHandle::Directory(_))
    }
}

/// Result of handling one request.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A file, a listing, or a conditional/range reply for a file.
    Served(Response),
    /// `301 Moved Permanently` to the given location.
    Redirect(String),
    Forbidden(Rejection),
    /// Nothing was written; the host decides the status.
    NotFound,
}

impl Outcome {
    pub fn status(&self) -> Option<u16> {
        match self {
            Outcome::Served(response) => Some(response.status),
            Outcome::Redirect(_) => Some(301),
            Outcome::Forbidden(_) => Some(403),
            Outcome::NotFound => None,
        }
    }

    /// Response the bundled host writes. `NotFound` becomes a plain 404.
    pub fn into_response(self) -> Response {
        match self {
            Outcome::Served(response) => response,
            Outcome::Redirect(location) => Response::new(301).with_header("Location", location),
            Outcome::Forbidden(_) => Response::new(403),
            Outcome::NotFound => Response::new(404)
                .with_header("Content-Type", "text/plain")
                .with_body("Not Found"),
        }
    }
}
