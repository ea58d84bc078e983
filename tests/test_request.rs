use std::collections::HashMap;
use switchyard::http::request::{Method, RequestHead};

fn head(version: &str, headers: &[(&str, &str)]) -> RequestHead {
    RequestHead {
        method: Method::GET,
        target: "/".to_string(),
        version: version.to_string(),
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    }
}

#[test]
fn test_request_header_retrieval_is_case_insensitive() {
    let req = head("HTTP/1.1", &[("host", "example.com")]);

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("HOST"), Some("example.com"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_content_length_parsing() {
    assert_eq!(head("HTTP/1.1", &[("content-length", "42")]).content_length(), 42);
    assert_eq!(head("HTTP/1.1", &[]).content_length(), 0);
}

#[test]
fn test_request_chunked_detection() {
    assert!(head("HTTP/1.1", &[("transfer-encoding", "chunked")]).is_chunked());
    assert!(head("HTTP/1.1", &[("transfer-encoding", "gzip, Chunked")]).is_chunked());
    assert!(!head("HTTP/1.1", &[("transfer-encoding", "gzip")]).is_chunked());
    assert!(!head("HTTP/1.1", &[]).is_chunked());
}

#[test]
fn test_request_keep_alive_http11_default() {
    assert!(head("HTTP/1.1", &[]).keep_alive());
}

#[test]
fn test_request_keep_alive_close() {
    assert!(!head("HTTP/1.1", &[("connection", "close")]).keep_alive());
    assert!(!head("HTTP/1.1", &[("connection", "Close")]).keep_alive());
}

#[test]
fn test_request_keep_alive_http10() {
    assert!(!head("HTTP/1.0", &[]).keep_alive());
    assert!(head("HTTP/1.0", &[("connection", "Keep-Alive")]).keep_alive());
}

#[test]
fn test_request_method_from_string() {
    assert_eq!(Method::from_str("GET"), Some(Method::GET));
    assert_eq!(Method::from_str("POST"), Some(Method::POST));
    assert_eq!(
        Method::from_str("get"),
        Some(Method::Other("get".to_string()))
    ); // Case-sensitive
    assert_eq!(Method::from_str(""), None);
    assert_eq!(Method::from_str("GET/1"), None);
    assert_eq!(Method::from_str("P URGE"), None);
}

#[test]
fn test_request_extension_method_kept_verbatim() {
    let method = Method::from_str("MKCOL").unwrap();

    assert_eq!(method.as_str(), "MKCOL");
    assert_eq!(method.to_string(), "MKCOL");
}

#[test]
fn test_request_expects_continue() {
    assert!(head("HTTP/1.1", &[("expect", "100-continue")]).expects_continue());
    assert!(head("HTTP/1.1", &[("expect", "100-Continue")]).expects_continue());
    assert!(!head("HTTP/1.0", &[("expect", "100-continue")]).expects_continue());
    assert!(!head("HTTP/1.1", &[]).expects_continue());
}

#[test]
fn test_request_method_display_round_trips() {
    for method in [Method::GET, Method::POST, Method::DELETE, Method::TRACE] {
        assert_eq!(Method::from_str(&method.to_string()), Some(method.clone()));
    }
}
