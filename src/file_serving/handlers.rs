use std::fs::{File, ReadDir};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::content::serve_content;
use super::listing::{render_listing, LISTING_CONTENT_TYPE};
use super::path_utils::resolve;
use super::redirect::{directory_redirect, index_redirect};
use super::{CandidateOpen, HandlerFlags, OpenedHandle, Outcome, ResolvedTarget};
use crate::compression::{accepts_gzip, ContentEncoding};
use crate::http::{Request, Response};
use crate::log_error;
use crate::registry::EncodingRegistry;

const GZIP_CONTENT_TYPE: &str = "application/gzip";

/// Serves files under `root`, preferring a `.gz` sibling when the client takes
/// gzip and the extension is registered.
#[derive(Debug, Clone)]
pub struct StaticHandler {
    root: PathBuf,
    flags: HandlerFlags,
    registry: Arc<EncodingRegistry>,
}

impl StaticHandler {
    pub fn new(
        root: impl Into<PathBuf>,
        flags: HandlerFlags,
        registry: Arc<EncodingRegistry>,
    ) -> Self {
        Self {
            root: root.into(),
            flags,
            registry,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn flags(&self) -> HandlerFlags {
        self.flags
    }

    pub fn registry(&self) -> &EncodingRegistry {
        &self.registry
    }

    pub fn handle(&self, req: &Request) -> Outcome {
        if !req.is_get_or_head() || self.root.as_os_str().is_empty() {
            log::debug!("Ignoring {} {}", req.method, req.path);
            return Outcome::NotFound;
        }

        if let Some(location) = index_redirect(req) {
            log::debug!("Canonical index redirect {} -> {}", req.path, location);
            return Outcome::Redirect(location);
        }

        let mut target = match resolve(&self.root, &req.path) {
            Ok(target) => target,
            Err(rejection) => {
                log::warn!("Forbidden request path {:?}: {}", req.path, rejection);
                return Outcome::Forbidden(rejection);
            }
        };

        if target.extension.is_empty() && self.flags.ignore_empty_extension {
            log::debug!("Ignoring extensionless path {}", req.path);
            return Outcome::NotFound;
        }

        // Only registered types get a sibling lookup; `.gz` itself never does
        let gzip_eligible =
            !target.is_gzip_literal() && self.registry.is_gzip_eligible(&target.extension);
        target.content_type = if target.is_gzip_literal() {
            Some(GZIP_CONTENT_TYPE.to_string())
        } else {
            self.registry.content_type(&target.extension)
        };

        let accept_gzip = req
            .header("Accept-Encoding")
            .map(accepts_gzip)
            .unwrap_or(false);
        let candidate = match self.open_candidate(&target, gzip_eligible && accept_gzip) {
            Some(candidate) => candidate,
            None => {
                log::debug!("Nothing to serve for {}", req.path);
                return Outcome::NotFound;
            }
        };

        let CandidateOpen {
            path,
            handle,
            metadata,
            encoding,
        } = candidate;
        match handle {
            OpenedHandle::Directory(entries) => {
                if target.is_index && path != target.dir_path {
                    log::debug!("{} is a directory, not an index file", path.display());
                    return Outcome::NotFound;
                }
                self.directory_outcome(req, entries)
            }
            OpenedHandle::File(mut file) => {
                self.file_outcome(req, &target, &mut file, &metadata, encoding)
            }
        }
    }

    /// Gzip sibling first when allowed, then the plain file, then (for index
    /// requests with listing on) the directory itself.
    fn open_candidate(&self, target: &ResolvedTarget, try_gzip: bool) -> Option<CandidateOpen> {
        if try_gzip {
            let sibling = target.gzip_sibling();
            match CandidateOpen::open(&sibling, ContentEncoding::Gzip) {
                Ok(candidate) if !candidate.is_dir() => {
                    log::debug!("Using pre-compressed file: {}", sibling.display());
                    return Some(candidate);
                }
                Ok(_) => log::debug!("{} is a directory, skipping", sibling.display()),
                Err(e) => log::trace!("No gzip sibling {}: {}", sibling.display(), e),
            }
        }

        match CandidateOpen::open(&target.path, ContentEncoding::Identity) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                log::trace!("Cannot open {}: {}", target.path.display(), e);
                if target.is_index && self.flags.directory_listing {
                    CandidateOpen::open(&target.dir_path, ContentEncoding::Identity)
                        .map_err(|e| {
                            log::trace!("Cannot open {}: {}", target.dir_path.display(), e)
                        })
                        .ok()
                } else {
                    None
                }
            }
        }
    }

    /// Listing wins over the redirect. A listing served for `/dir` (no
    /// trailing slash) carries hrefs that a browser resolves against the
    /// parent, so enable `directory_redirect` alone when relative links matter.
    fn directory_outcome(&self, req: &Request, entries: ReadDir) -> Outcome {
        if self.flags.directory_listing {
            let html = render_listing(entries);
            let mut response = Response::new(200)
                .with_header("Content-Type", LISTING_CONTENT_TYPE)
                .with_header("Content-Length", html.len().to_string());
            if !req.is_head() {
                response.body = html.into_bytes();
            }
            return Outcome::Served(response);
        }

        if self.flags.directory_redirect && !req.path.ends_with('/') {
            let location = directory_redirect(req);
            log::debug!("Directory redirect {} -> {}", req.path, location);
            return Outcome::Redirect(location);
        }

        Outcome::NotFound
    }

    fn file_outcome(
        &self,
        req: &Request,
        target: &ResolvedTarget,
        file: &mut File,
        metadata: &std::fs::Metadata,
        encoding: ContentEncoding,
    ) -> Outcome {
        let served = serve_content(
            req,
            &target.basename,
            metadata.modified().ok(),
            file,
            metadata.len(),
            target.content_type.as_deref(),
        );

        match served {
            Ok(mut response) => {
                if let Some(value) = encoding.header_value() {
                    if matches!(response.status, 200 | 206 | 304) {
                        response.set_header("Content-Encoding", value);
                    }
                }
                Outcome::Served(response)
            }
            Err(e) => {
                log_error!(e, format!("Failed to read {}", target.path.display()));
                Outcome::NotFound
            }
        }
    }
}
