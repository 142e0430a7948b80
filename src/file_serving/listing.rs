//! HTML listing of a directory's immediate children.
//!
//! Entries keep the order the filesystem hands them out in; only the grouping
//! (parent, directories, everything else) is fixed.

use std::fs::ReadDir;

use percent_encoding::utf8_percent_encode;

use super::redirect::PATH_ENCODE_SET;

pub const LISTING_CONTENT_TYPE: &str = "text/html; charset=utf-8";

const BATCH_SIZE: usize = 100;

pub fn render_listing(mut entries: ReadDir) -> String {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    'read: loop {
        let batch: Vec<_> = entries.by_ref().take(BATCH_SIZE).collect();
        if batch.is_empty() {
            break;
        }
        for entry in batch {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Directory enumeration stopped early: {}", e);
                    break 'read;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            match entry.file_type() {
                Ok(file_type) if file_type.is_dir() => dirs.push(format!("{}/", name)),
                Ok(_) => files.push(name),
                Err(e) => log::debug!("Skipping {}: {}", name, e),
            }
        }
    }

    let mut html = String::from("<pre>\n<a href=\"../\">..</a>\n");
    for name in dirs.iter().chain(files.iter()) {
        html.push_str(&format!(
            "<a href=\"{}\">{}</a>\n",
            escape_html(&href_for(name)),
            escape_html(name)
        ));
    }
    html.push_str("</pre>\n");
    html
}

/// Relative href for a child; a leading `./` keeps `a:b` from reading as a scheme.
fn href_for(name: &str) -> String {
    let encoded = utf8_percent_encode(name, PATH_ENCODE_SET).to_string();
    if name.contains(':') {
        format!("./{}", encoded)
    } else {
        encoded
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn empty_directory_lists_parent_only() {
        let dir = tempdir().unwrap();
        let html = render_listing(fs::read_dir(dir.path()).unwrap());
        assert_eq!(html, "<pre>\n<a href=\"../\">..</a>\n</pre>\n");
    }

    #[test]
    fn directories_come_before_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("assets")).unwrap();

        let html = render_listing(fs::read_dir(dir.path()).unwrap());
        assert_eq!(
            html,
            "<pre>\n<a href=\"../\">..</a>\n<a href=\"assets/\">assets/</a>\n\
             <a href=\"notes.txt\">notes.txt</a>\n</pre>\n"
        );
    }

    #[test]
    fn names_are_escaped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a <b>&'c'.txt"), b"x").unwrap();

        let html = render_listing(fs::read_dir(dir.path()).unwrap());
        assert!(html.contains(
            "<a href=\"a%20%3Cb%3E&amp;&#39;c&#39;.txt\">a &lt;b&gt;&amp;&#39;c&#39;.txt</a>"
        ));
    }

    #[test]
    fn colon_names_get_dot_slash_prefix() {
        assert_eq!(href_for("mailto:x"), "./mailto:x");
        assert_eq!(href_for("plain.txt"), "plain.txt");
    }

    #[test]
    fn escape_html_replaces_specials() {
        assert_eq!(escape_html("normal text"), "normal text");
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("\"a\" & 'b'"), "&#34;a&#34; &amp; &#39;b&#39;");
    }
}
