//! Extension to content-type registry.
//!
//! Only registered extensions are eligible for the `.gz` sibling lookup. The
//! registry is filled at startup and read by every request afterwards; it sits
//! behind a `RwLock` so late registrations stay sound.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::compression::GZIP_SUFFIX;
use crate::errors::RegistryError;

const DEFAULT_TYPES: &[(&str, &str)] = &[
    (".css", "text/css; charset=utf-8"),
    (".html", "text/html; charset=utf-8"),
    (".js", "application/x-javascript; charset=utf-8"),
];

#[derive(Debug)]
pub struct EncodingRegistry {
    types: RwLock<HashMap<String, String>>,
}

impl Default for EncodingRegistry {
    fn default() -> Self {
        let types = DEFAULT_TYPES
            .iter()
            .map(|(ext, mime)| (ext.to_string(), mime.to_string()))
            .collect();
        Self {
            types: RwLock::new(types),
        }
    }
}

impl EncodingRegistry {
    /// Registry seeded with `.css`, `.html` and `.js`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with no entries; nothing is gzip-eligible until registered.
    pub fn empty() -> Self {
        Self {
            types: RwLock::new(HashMap::new()),
        }
    }

    /// Make `extension` gzip-eligible. Without `mime_override` the MIME type
    /// comes from the system database and an unknown extension is an error.
    pub fn register(
        &self,
        extension: &str,
        mime_override: Option<&str>,
    ) -> Result<(), RegistryError> {
        let ext = normalize_extension(extension)?;

        let mime = match mime_override.map(str::trim) {
            Some("") => return Err(RegistryError::EmptyMimeType(ext)),
            Some(mime) => mime.to_string(),
            None => mime_guess::from_ext(&ext[1..])
                .first_raw()
                .map(str::to_string)
                .ok_or_else(|| RegistryError::UnknownExtension(ext.clone()))?,
        };

        log::debug!("Registering gzip-eligible extension {} as {}", ext, mime);
        let mut types = match self.types.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        types.insert(ext, mime);
        Ok(())
    }

    /// Content type for a gzip-eligible extension, `None` when unregistered.
    pub fn content_type(&self, extension: &str) -> Option<String> {
        if extension.is_empty() {
            return None;
        }
        let types = match self.types.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        types.get(&extension.to_lowercase()).cloned()
    }

    pub fn is_gzip_eligible(&self, extension: &str) -> bool {
        self.content_type(extension).is_some()
    }
}

fn normalize_extension(extension: &str) -> Result<String, RegistryError> {
    let trimmed = extension.trim();
    if trimmed.is_empty() || trimmed == "." {
        return Err(RegistryError::EmptyExtension);
    }
    let ext = if trimmed.starts_with('.') {
        trimmed.to_lowercase()
    } else {
        format!(".{}", trimmed.to_lowercase())
    };
    if ext == GZIP_SUFFIX {
        return Err(RegistryError::GzipExtension);
    }
    // Request extensions are the last-dot suffix of the basename
    if ext[1..].contains(|c: char| c == '.' || c == '/' || c == '\\') {
        return Err(RegistryError::InvalidExtension(ext));
    }
    Ok(ext)
}
