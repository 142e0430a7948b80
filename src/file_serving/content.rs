//! Byte serving for an already opened file: `Last-Modified`, conditional
//! requests and single byte ranges.

use std::io::{self, Read, Seek, SeekFrom};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::http::{Request, Response};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ByteRange {
    /// No usable `Range`, send everything.
    Full,
    /// Inclusive bounds.
    Partial(u64, u64),
    Unsatisfiable,
}

/// Build the response for `reader`. `name` is only used to guess a content
/// type when none is given.
pub fn serve_content<R: Read + Seek>(
    req: &Request,
    name: &str,
    modified: Option<SystemTime>,
    reader: &mut R,
    size: u64,
    content_type: Option<&str>,
) -> io::Result<Response> {
    let modified_secs = modified
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .filter(|secs| *secs > 0);
    let last_modified = modified
        .filter(|_| modified_secs.is_some())
        .map(httpdate::fmt_http_date);

    if let (Some(mtime), Some(since)) = (
        modified_secs,
        header_time(req, "If-Unmodified-Since"),
    ) {
        if mtime > since {
            log::debug!("{} modified after If-Unmodified-Since", name);
            return Ok(Response::new(412));
        }
    }

    if let (Some(mtime), Some(since)) = (modified_secs, header_time(req, "If-Modified-Since")) {
        if req.header("If-None-Match").is_none() && mtime <= since {
            let mut response = Response::new(304);
            if let Some(last_modified) = &last_modified {
                response.set_header("Last-Modified", last_modified.as_str());
            }
            return Ok(response);
        }
    }

    let mut response = Response::new(200);
    let content_type = match content_type {
        Some(content_type) => content_type.to_string(),
        None => mime_guess::from_path(name)
            .first_or_octet_stream()
            .to_string(),
    };
    response.set_header("Content-Type", content_type);
    response.set_header("Accept-Ranges", "bytes");
    if let Some(last_modified) = &last_modified {
        response.set_header("Last-Modified", last_modified.as_str());
    }

    let range = match req.header("Range") {
        Some(range) if if_range_matches(req, last_modified.as_deref()) => {
            parse_range(range, size)
        }
        _ => ByteRange::Full,
    };

    let (start, length) = match range {
        ByteRange::Full => (0, size),
        ByteRange::Partial(start, end) => {
            response.status = 206;
            response.set_header("Content-Range", format!("bytes {}-{}/{}", start, end, size));
            (start, end - start + 1)
        }
        ByteRange::Unsatisfiable => {
            let content_range = format!("bytes */{}", size);
            return Ok(Response::new(416).with_header("Content-Range", content_range));
        }
    };

    response.set_header("Content-Length", length.to_string());
    if req.is_head() {
        return Ok(response);
    }

    reader.seek(SeekFrom::Start(start))?;
    let mut body = Vec::with_capacity(length as usize);
    reader.take(length).read_to_end(&mut body)?;
    if body.len() as u64 != length {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("{} shrank while being served", name),
        ));
    }
    response.body = body;
    Ok(response)
}

/// Parse a single `bytes=` range. Multiple ranges and malformed values fall
/// back to the full body.
pub fn parse_range(header: &str, size: u64) -> ByteRange {
    let Some(ranges) = header.trim().strip_prefix("bytes=") else {
        return ByteRange::Full;
    };
    if ranges.contains(',') {
        return ByteRange::Full;
    }
    let Some((start, end)) = ranges.trim().split_once('-') else {
        return ByteRange::Full;
    };
    let (start, end) = (start.trim(), end.trim());

    if start.is_empty() {
        let Ok(suffix) = end.parse::<u64>() else {
            return ByteRange::Full;
        };
        if suffix == 0 || size == 0 {
            return ByteRange::Unsatisfiable;
        }
        return ByteRange::Partial(size.saturating_sub(suffix), size - 1);
    }

    let Ok(start) = start.parse::<u64>() else {
        return ByteRange::Full;
    };
    if start >= size {
        return ByteRange::Unsatisfiable;
    }
    let end = if end.is_empty() {
        size - 1
    } else {
        match end.parse::<u64>() {
            Ok(end) if end >= start => end.min(size - 1),
            _ => return ByteRange::Full,
        }
    };
    ByteRange::Partial(start, end)
}

fn header_time(req: &Request, name: &str) -> Option<u64> {
    let value = req.header(name)?;
    httpdate::parse_http_date(value)
        .ok()?
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

/// Without `If-Range` any range applies; with it, only an exact date match.
fn if_range_matches(req: &Request, last_modified: Option<&str>) -> bool {
    match req.header("If-Range") {
        None => true,
        Some(value) => Some(value.trim()) == last_modified,
    }
}
