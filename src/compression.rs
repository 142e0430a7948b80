/// Suffix of a precompressed sibling file.
pub const GZIP_SUFFIX: &str = ".gz";

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ContentEncoding {
    Gzip,
    Identity,
}

impl ContentEncoding {
    /// Value for the `Content-Encoding` header, `None` for identity.
    pub fn header_value(self) -> Option<&'static str> {
        match self {
            ContentEncoding::Gzip => Some("gzip"),
            ContentEncoding::Identity => None,
        }
    }
}

/// Substring match on the raw header, so `x-gzip` and `gzip;q=0.5` count too.
pub fn accepts_gzip(accept_encoding: &str) -> bool {
    accept_encoding.to_lowercase().contains("gzip")
}
