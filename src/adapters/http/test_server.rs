//! Minimal HTTP/1.1 responder on 127.0.0.1 for link resolution tests.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

pub const KEY_TEXT: &str =
    "-----BEGIN PGP PUBLIC KEY BLOCK-----\nkey data\n-----END PGP PUBLIC KEY BLOCK-----";

/// Routes:
/// - `/short` redirects to `/key`
/// - `/key` serves [`KEY_TEXT`] (or the body given to `with_key_body`)
/// - `/loop` redirects to itself
/// - `/slow` answers after two seconds
/// - `/broken` answers 500, anything else 404
pub struct TestServer {
    port: u16,
}

impl TestServer {
    pub fn start() -> Self {
        Self::with_key_body(KEY_TEXT.as_bytes().to_vec())
    }

    pub fn with_key_body(key_body: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let body = key_body.clone();
                thread::spawn(move || handle(stream, &body));
            }
        });

        Self { port }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    /// A URL on a port nothing listens on.
    pub fn unreachable_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}/key")
    }
}

fn read_head(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn handle(mut stream: TcpStream, key_body: &[u8]) {
    let head = read_head(&mut stream);
    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    let (status, location, body): (&str, Option<&str>, &[u8]) = match path.as_str() {
        "/short" => ("301 Moved Permanently", Some("/key"), b""),
        "/loop" => ("302 Found", Some("/loop"), b""),
        "/key" => ("200 OK", None, key_body),
        "/slow" => {
            thread::sleep(Duration::from_secs(2));
            ("200 OK", None, key_body)
        }
        "/broken" => ("500 Internal Server Error", None, b"boom"),
        _ => ("404 Not Found", None, b"not found"),
    };

    let body = if method == "HEAD" { &[][..] } else { body };
    let mut response = format!(
        "HTTP/1.1 {status}\r\nContent-Length: {}\r\nContent-Type: text/plain\r\nConnection: close\r\n",
        body.len()
    );
    if let Some(location) = location {
        response.push_str(&format!("Location: {location}\r\n"));
    }
    response.push_str("\r\n");

    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}
