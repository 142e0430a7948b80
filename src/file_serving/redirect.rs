use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::http::Request;

const INDEX_SUFFIX: &str = "/index.html";

/// Characters escaped when a decoded path goes back into a header or href.
pub const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// `/a/index.html?q` redirects to `/a/?q`. Checked before any filesystem access.
pub fn index_redirect(req: &Request) -> Option<String> {
    let stripped = req.path.strip_suffix(INDEX_SUFFIX)?;
    Some(location(&format!("{}/", stripped), req.query.as_deref()))
}

/// `/dir?q` redirects to `/dir/?q`.
pub fn directory_redirect(req: &Request) -> String {
    location(&format!("{}/", req.path), req.query.as_deref())
}

/// Leading slashes collapse to one so `//host/` never becomes a
/// protocol-relative URL.
fn location(path: &str, query: Option<&str>) -> String {
    let path = format!("/{}", path.trim_start_matches('/'));
    let mut location = utf8_percent_encode(&path, PATH_ENCODE_SET).to_string();
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        location.push('?');
        location.push_str(query);
    }
    location
}
