use std::fs;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use gzstatic::server::serve;
use gzstatic::{EncodingRegistry, HandlerFlags, StaticHandler};
use tempfile::{tempdir, TempDir};

fn start(flags: HandlerFlags) -> (SocketAddr, TempDir) {
    let root = tempdir().unwrap();
    fs::write(root.path().join("index.html"), b"static").unwrap();
    fs::write(root.path().join("index.html.gz"), b"not-really-gzip").unwrap();
    fs::create_dir(root.path().join("docs")).unwrap();
    fs::write(root.path().join("docs").join("guide.txt"), b"guide").unwrap();

    let handler = Arc::new(StaticHandler::new(
        root.path(),
        flags,
        Arc::new(EncodingRegistry::new()),
    ));
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || serve(listener, handler));
    (addr, root)
}

fn send(addr: SocketAddr, raw: &str) -> (String, Vec<u8>) {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(raw.as_bytes()).unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).unwrap();

    let split = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has a header block");
    let head = String::from_utf8(response[..split].to_vec()).unwrap();
    (head, response[split + 4..].to_vec())
}

#[test]
fn serves_gzip_sibling_over_tcp() {
    let (addr, _root) = start(HandlerFlags::default());
    let (head, body) = send(
        addr,
        "GET / HTTP/1.1\r\nHost: localhost\r\nAccept-Encoding: gzip\r\n\r\n",
    );
    assert!(head.starts_with("HTTP/1.1 200 OK"), "{}", head);
    assert!(head.contains("Content-Encoding: gzip"), "{}", head);
    assert!(head.contains("Content-Type: text/html; charset=utf-8"), "{}", head);
    assert_eq!(body, b"not-really-gzip");
}

#[test]
fn head_request_has_no_body() {
    let (addr, _root) = start(HandlerFlags::default());
    let (head, body) = send(addr, "HEAD / HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert!(head.starts_with("HTTP/1.1 200 OK"), "{}", head);
    assert!(head.contains("Content-Length: 6"), "{}", head);
    assert!(body.is_empty());
}

#[test]
fn redirects_and_status_codes() {
    let flags = HandlerFlags {
        directory_redirect: true,
        ..Default::default()
    };
    let (addr, _root) = start(flags);

    let (head, body) = send(addr, "GET /docs?x=1 HTTP/1.1\r\n\r\n");
    assert!(head.starts_with("HTTP/1.1 301 Moved Permanently"), "{}", head);
    assert!(head.contains("Location: /docs/?x=1"), "{}", head);
    assert!(body.is_empty());

    let (head, _) = send(addr, "GET /docs/guide.txt HTTP/1.1\r\n\r\n");
    assert!(head.starts_with("HTTP/1.1 200 OK"), "{}", head);

    let (head, _) = send(addr, "GET /../etc/passwd HTTP/1.1\r\n\r\n");
    assert!(head.starts_with("HTTP/1.1 403 Forbidden"), "{}", head);

    let (head, body) = send(addr, "GET /missing.css HTTP/1.1\r\n\r\n");
    assert!(head.starts_with("HTTP/1.1 404 Not Found"), "{}", head);
    assert_eq!(body, b"Not Found");

    let (head, _) = send(addr, "GET /%ff HTTP/1.1\r\n\r\n");
    assert!(head.starts_with("HTTP/1.1 400 Bad Request"), "{}", head);
}
