//! Fetcher tests against a throwaway local HTTP server.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::thread;
use std::time::Duration;

use dormmail::config::SourceConfig;
use dormmail::export::MailResponse;
use dormmail::{fetch_page, fetch_records, FetchError, ParseOptions};

fn fixture_bytes(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read(path).unwrap()
}

fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

/// Serve exactly one canned response and return the base URL.
fn serve_once(status_line: &'static str, content_type: &'static str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            read_request(&mut stream);
            let head = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
            let _ = stream.flush();
        }
    });
    format!("http://{addr}/dormmail/Default.asp")
}

fn source(url: String) -> SourceConfig {
    SourceConfig {
        url,
        timeout_secs: 2,
        system_proxy: false,
        ..SourceConfig::default()
    }
}

fn opts() -> ParseOptions {
    ParseOptions::new(2010, 2030)
}

#[test]
fn test_fetch_big5_page_without_charset() {
    let url = serve_once("200 OK", "text/html", fixture_bytes("dormmail_big5.html"));
    let records = fetch_records(&source(url), &opts()).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].recipient, "王Ｏ明");
    assert_eq!(records[3].carrier, "蝦皮店到店");
}

#[test]
fn test_fetch_honours_header_charset() {
    let url = serve_once(
        "200 OK",
        "text/html; charset=utf-8",
        "<body>　1　2025/1/1　李Ｏ　郵局　包裹　R1　中文系　1　</body>".as_bytes().to_vec(),
    );
    let html = fetch_page(&source(url)).unwrap();
    assert!(html.contains("李Ｏ"));
}

#[test]
fn test_declared_big5_page_with_unmapped_pair_still_parses() {
    let mut body = fixture_bytes("dormmail_big5.html");
    let at = body.windows(7).position(|w| w == b"</body>").unwrap();
    body.splice(at..at, [0x81, 0x40]);

    let url = serve_once("200 OK", "text/html; charset=big5", body);
    let records = fetch_records(&source(url), &opts()).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(dormmail::filter_by_name(&records, "王小明").len(), 1);
}

#[test]
fn test_server_error_is_status_failure() {
    let url = serve_once("503 Service Unavailable", "text/html", b"busy".to_vec());
    let err = fetch_page(&source(url)).unwrap_err();
    match err {
        FetchError::Status { status, .. } => assert_eq!(status.as_u16(), 503),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[test]
fn test_empty_body_is_distinct_failure() {
    let url = serve_once("200 OK", "text/html", Vec::new());
    let err = fetch_page(&source(url)).unwrap_err();
    assert!(matches!(err, FetchError::EmptyBody { .. }));
}

#[test]
fn test_unreachable_host_returns_error_not_empty_list() {
    // Grab a free port, then close it so nothing is listening.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let result = fetch_records(&source(format!("http://127.0.0.1:{port}/")), &opts());
    let err = result.unwrap_err();
    assert!(
        matches!(err, FetchError::Connect { .. } | FetchError::Transport { .. }),
        "got {err:?}"
    );
    assert!(err.is_unavailable());

    let resp = MailResponse::unavailable(&err);
    let empty = MailResponse::ok(Vec::new());
    assert!(!resp.success);
    assert!(empty.success);
    assert_ne!(resp.success, empty.success);
}

#[test]
fn test_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            read_request(&mut stream);
            thread::sleep(Duration::from_secs(5));
        }
    });
    let mut cfg = source(format!("http://{addr}/"));
    cfg.timeout_secs = 1;
    let err = fetch_page(&cfg).unwrap_err();
    assert!(matches!(err, FetchError::Timeout { .. }), "got {err:?}");
}
