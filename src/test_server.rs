//! A one-shot HTTP responder for exercising the feed fetchers against a real
//! socket.

use reqwest::blocking::Client;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use url::Url;

/// Listens on an ephemeral local port and answers the first request with
/// `status` and `body`. Returns the server's base URL and the serving
/// thread.
pub fn serve_once(status: &'static str, body: &'static str) -> (Url, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf).unwrap() {
                0 => break,
                n => request.extend_from_slice(&buf[..n]),
            }
        }
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
        .unwrap();
    });
    (url, handle)
}

/// A base URL nothing is listening on.
pub fn unreachable() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}/", addr)).unwrap()
}

/// A client that talks to the local server directly, whatever proxy the
/// environment configures.
pub fn client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}
