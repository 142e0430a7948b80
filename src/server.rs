use log::{debug, info};
use std::io::{self, BufReader};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::args::Args;
use crate::errors::StartupError;
use crate::file_serving::handlers::StaticHandler;
use crate::http::{read_request_head, Request, Response};
use crate::{log_error, log_request, log_response};

pub fn start_server(args: Args) -> Result<(), StartupError> {
    let root = args.canonical_serve_dir()?;
    let registry = args.build_registry()?;
    let handler = Arc::new(StaticHandler::new(
        root,
        args.handler_flags(),
        Arc::new(registry),
    ));

    let listener = TcpListener::bind(&args.listen_addr)
        .map_err(|e| StartupError::IoError(format!("Failed to bind {}", args.listen_addr), e))?;
    info!("Listening on: {}", args.listen_addr);
    info!("Serving directory: {}", handler.root().display());
    debug!("Handler flags: {:?}", handler.flags());

    serve(listener, handler)
        .map_err(|e| StartupError::IoError("Listener failed".to_string(), e))
}

/// Accept loop, one thread per connection.
pub fn serve(listener: TcpListener, handler: Arc<StaticHandler>) -> io::Result<()> {
    for stream in listener.incoming() {
        let stream = stream?;
        let handler = Arc::clone(&handler);

        thread::spawn(move || {
            if let Err(e) = handle_connection(stream, &handler) {
                log_error!(e, "Error handling connection");
            }
        });
    }

    Ok(())
}

fn handle_connection(mut client: TcpStream, handler: &StaticHandler) -> io::Result<()> {
    let start_time = Instant::now();
    let (request_line, headers) = read_request_head(&mut BufReader::new(&client))?;
    log_request!(request_line);

    let response = match parse_request(&request_line, headers) {
        Some(req) => handler.handle(&req).into_response(),
        None => Response::new(400)
            .with_header("Content-Type", "text/plain")
            .with_body("Bad Request"),
    };

    log_response!(
        response.status,
        start_time.elapsed(),
        response.body.len(),
        response.header("Content-Encoding").unwrap_or("identity")
    );
    response.write_to(&mut client)
}

fn parse_request(request_line: &str, headers: Vec<(String, String)>) -> Option<Request> {
    let mut parts = request_line.split_whitespace();
    let (method, target) = (parts.next()?, parts.next()?);
    if !target.starts_with('/') {
        debug!("Unsupported request target: {}", target);
        return None;
    }
    match Request::from_target(method, target, headers) {
        Ok(req) => Some(req),
        Err(e) => {
            debug!("Rejecting request target {}: {}", target, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_request_line() {
        let req = parse_request("GET /a%20b.css?v=2 HTTP/1.1", Vec::new()).unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/a b.css");
        assert_eq!(req.query.as_deref(), Some("v=2"));
    }

    #[test]
    fn parse_request_rejects_malformed_lines() {
        assert!(parse_request("", Vec::new()).is_none());
        assert!(parse_request("GET", Vec::new()).is_none());
        assert!(parse_request("GET http://host/x HTTP/1.1", Vec::new()).is_none());
        assert!(parse_request("GET /%c3%28 HTTP/1.1", Vec::new()).is_none());
    }
}
