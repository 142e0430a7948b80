//! Static file serving with gzip precompression.
//!
//! When a client accepts gzip and `<path>.gz` exists next to a file whose
//! extension is registered in the [`registry::EncodingRegistry`], the sibling
//! is served with `Content-Encoding: gzip`. Nothing is compressed on the fly.

pub mod args;
pub mod compression;
pub mod errors;
pub mod file_serving;
pub mod http;
pub mod logging;
pub mod registry;
pub mod server;

pub use errors::{RegistryError, Rejection, StartupError};
pub use file_serving::handlers::StaticHandler;
pub use file_serving::{HandlerFlags, Outcome};
pub use http::{Request, Response};
pub use registry::EncodingRegistry;
