use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

use super::ResolvedTarget;
use crate::errors::Rejection;

const INDEX_FILE: &str = "index.html";

/// Map a decoded URL path onto `root`. Pure: touches no filesystem.
///
/// A trailing `/` is an implicit request for `index.html`. Any `..` segment,
/// NUL byte, native separator (where it differs from `/`) or a basename
/// starting with `.` or `_` is rejected.
pub fn resolve(root: &Path, url_path: &str) -> Result<ResolvedTarget, Rejection> {
    if url_path.contains('\0') {
        return Err(Rejection::NulByte);
    }
    if MAIN_SEPARATOR != '/' && url_path.contains(MAIN_SEPARATOR) {
        return Err(Rejection::NativeSeparator);
    }

    let mut segments = Vec::new();
    for segment in url_path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(Rejection::Traversal),
            _ => {}
        }
        // Drive prefixes and the like would replace root on join
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => segments.push(segment),
            _ => return Err(Rejection::Traversal),
        }
    }

    let is_index = url_path.ends_with('/') || segments.is_empty();
    let dir_segments = if is_index {
        &segments[..]
    } else {
        &segments[..segments.len() - 1]
    };
    let basename = if is_index {
        INDEX_FILE
    } else {
        segments[segments.len() - 1]
    };

    if basename.starts_with('.') || basename.starts_with('_') {
        return Err(Rejection::HiddenName);
    }

    let dir_relative: PathBuf = dir_segments.iter().collect();
    let relative = dir_relative.join(basename);
    let path = root.join(&relative);
    if !path.starts_with(root) {
        return Err(Rejection::Traversal);
    }

    log::trace!("Resolved {} to {}", url_path, path.display());
    Ok(ResolvedTarget {
        dir_path: root.join(&dir_relative),
        relative,
        path,
        basename: basename.to_string(),
        extension: extension_of(basename).to_string(),
        content_type: None,
        is_index,
    })
}

/// Suffix from the last `.` of the basename, dot included.
pub fn extension_of(basename: &str) -> &str {
    basename.rfind('.').map(|i| &basename[i..]).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/srv/www")
    }

    #[test]
    fn plain_file() {
        let target = resolve(&root(), "/css/site.min.css").unwrap();
        assert_eq!(target.relative, PathBuf::from("css/site.min.css"));
        assert_eq!(target.path, PathBuf::from("/srv/www/css/site.min.css"));
        assert_eq!(target.dir_path, PathBuf::from("/srv/www/css"));
        assert_eq!(target.basename, "site.min.css");
        assert_eq!(target.extension, ".css");
        assert!(!target.is_index);
    }

    #[test]
    fn trailing_slash_is_index_request() {
        let target = resolve(&root(), "/docs/").unwrap();
        assert!(target.is_index);
        assert_eq!(target.path, PathBuf::from("/srv/www/docs/index.html"));
        assert_eq!(target.dir_path, PathBuf::from("/srv/www/docs"));
        assert_eq!(target.basename, "index.html");
        assert_eq!(target.extension, ".html");

        let root_target = resolve(&root(), "/").unwrap();
        assert!(root_target.is_index);
        assert_eq!(root_target.path, PathBuf::from("/srv/www/index.html"));
        assert_eq!(root_target.dir_path, root());
    }

    #[test]
    fn collapses_dot_and_duplicate_separators() {
        let target = resolve(&root(), "//a/./b//c.js").unwrap();
        assert_eq!(target.relative, PathBuf::from("a/b/c.js"));
    }

    #[test]
    fn extensionless_path() {
        let target = resolve(&root(), "/LICENSE").unwrap();
        assert_eq!(target.extension, "");
        assert!(!target.is_index);
    }

    #[test]
    fn rejects_traversal() {
        for path in ["/../etc/passwd", "/a/../../b", "/a/..", "/..", "/a/../b.html"] {
            assert_eq!(resolve(&root(), path), Err(Rejection::Traversal), "{}", path);
        }
    }

    #[test]
    fn rejects_nul_byte() {
        assert_eq!(resolve(&root(), "/a\0.html"), Err(Rejection::NulByte));
    }

    #[test]
    fn rejects_hidden_and_underscore_names() {
        assert_eq!(resolve(&root(), "/.env"), Err(Rejection::HiddenName));
        assert_eq!(resolve(&root(), "/a/.htaccess"), Err(Rejection::HiddenName));
        assert_eq!(resolve(&root(), "/_layout.html"), Err(Rejection::HiddenName));
        // Only the basename is checked
        assert!(resolve(&root(), "/_drafts/").is_ok());
    }

    #[test]
    fn only_the_basename_is_checked_for_hidden_names() {
        let target = resolve(&root(), "/.git/config").unwrap();
        assert_eq!(target.relative, PathBuf::from(".git/config"));

        let target = resolve(&root(), "/_drafts/").unwrap();
        assert_eq!(target.relative, PathBuf::from("_drafts/index.html"));

        assert_eq!(resolve(&root(), "/.git"), Err(Rejection::HiddenName));
    }

    #[test]
    fn extension_of_takes_last_dot() {
        assert_eq!(extension_of("a.tar.gz"), ".gz");
        assert_eq!(extension_of("index.html"), ".html");
        assert_eq!(extension_of("Makefile"), "");
    }
}
