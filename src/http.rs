//! Minimal request/response types shared by the handler and the host.

use std::io::{self, BufRead, Write};

use percent_encoding::percent_decode_str;

/// What the handler needs to know about one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    /// Percent-decoded path, always starting with `/`.
    pub path: String,
    /// Raw query string without the `?`, kept verbatim for redirects.
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// Build a request from a request-target such as `/a%20b/?x=1`.
    pub fn from_target(
        method: &str,
        target: &str,
        headers: Vec<(String, String)>,
    ) -> io::Result<Self> {
        let (raw_path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (target, None),
        };

        let decoded = percent_decode_str(raw_path)
            .decode_utf8()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let path = if decoded.starts_with('/') {
            decoded.into_owned()
        } else {
            format!("/{}", decoded)
        };

        Ok(Self {
            method: method.to_uppercase(),
            path,
            query,
            headers,
        })
    }

    pub fn get(target: &str) -> io::Result<Self> {
        Self::from_target("GET", target, Vec::new())
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Case-insensitive header lookup, first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_head(&self) -> bool {
        self.method == "HEAD"
    }

    pub fn is_get_or_head(&self) -> bool {
        self.method == "GET" || self.is_head()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Set a header, replacing any existing value.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Serialize as HTTP/1.1. `Content-Length` is taken from the headers when
    /// present (HEAD responses carry it without a body).
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(
            writer,
            "HTTP/1.1 {} {}\r\n",
            self.status,
            reason_phrase(self.status)
        )?;
        for (key, value) in &self.headers {
            write!(writer, "{}: {}\r\n", key, value)?;
        }
        if self.header("Content-Length").is_none() {
            write!(writer, "Content-Length: {}\r\n", self.body.len())?;
        }
        writer.write_all(b"Connection: close\r\n\r\n")?;
        writer.write_all(&self.body)?;
        writer.flush()
    }
}

pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        206 => "Partial Content",
        301 => "Moved Permanently",
        304 => "Not Modified",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        412 => "Precondition Failed",
        416 => "Range Not Satisfiable",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Read the request line and headers up to the blank line.
/// Returns the request line and the headers in order.
pub fn read_request_head<R: BufRead>(
    reader: &mut R,
) -> io::Result<(String, Vec<(String, String)>)> {
    let mut first_line = String::new();
    reader.read_line(&mut first_line)?;

    let mut headers = Vec::new();
    let mut line = String::new();
    while {
        line.clear();
        reader.read_line(&mut line)? > 0 && !line.trim().is_empty()
    } {
        log::trace!("Header line: {}", line.trim());
        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_string(), value.trim().to_string()));
        } else {
            log::debug!("Skipping invalid header line: {}", line.trim());
        }
    }

    Ok((first_line.trim_end().to_string(), headers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn from_target_splits_and_decodes() {
        let req = Request::from_target("get", "/a%20b/c.html?x=%41&y", Vec::new()).unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/a b/c.html");
        assert_eq!(req.query.as_deref(), Some("x=%41&y"));
    }

    #[test]
    fn from_target_rejects_invalid_utf8() {
        let err = Request::from_target("GET", "/%ff", Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = Request::get("/").unwrap().with_header("Accept-Encoding", "gzip");
        assert_eq!(req.header("accept-encoding"), Some("gzip"));
        assert_eq!(req.header("range"), None);
    }

    #[test]
    fn read_request_head_parses_headers() {
        let raw = "GET /x HTTP/1.1\r\nHost: localhost\r\n\
                   Accept-Encoding: gzip, br\r\nbogus\r\n\r\nbody";
        let (line, headers) = read_request_head(&mut Cursor::new(raw)).unwrap();
        assert_eq!(line, "GET /x HTTP/1.1");
        assert_eq!(
            headers,
            vec![
                ("Host".to_string(), "localhost".to_string()),
                ("Accept-Encoding".to_string(), "gzip, br".to_string()),
            ]
        );
    }

    #[test]
    fn write_to_adds_length_and_close() {
        let mut out = Vec::new();
        Response::new(301)
            .with_header("Location", "/dir/")
            .write_to(&mut out)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "HTTP/1.1 301 Moved Permanently\r\nLocation: /dir/\r\n\
             Content-Length: 0\r\nConnection: close\r\n\r\n"
        );
    }
}
