use switchyard::http::parser::{ParseError, parse_request_head};
use switchyard::http::request::Method;

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, consumed) = parse_request_head(req).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.target, "/");
    assert_eq!(parsed.version, "HTTP/1.1");
    assert_eq!(parsed.headers.get("host").unwrap(), "example.com");
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_post_head_leaves_body() {
    let req = b"POST /api HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello";
    let (parsed, consumed) = parse_request_head(req).unwrap();

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.target, "/api");
    assert_eq!(parsed.content_length(), 5);
    assert_eq!(&req[consumed..], b"hello");
}

#[test]
fn test_parse_head_does_not_wait_for_body() {
    // the head is usable before any body byte has arrived
    let req = b"POST /api HTTP/1.1\r\nContent-Length: 10\r\n\r\n";
    let (parsed, consumed) = parse_request_head(req).unwrap();

    assert_eq!(parsed.content_length(), 10);
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_multiple_headers() {
    let req = b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test-client\r\nAccept: */*\r\n\r\n";
    let (parsed, _) = parse_request_head(req).unwrap();

    assert_eq!(parsed.header("Host"), Some("example.com"));
    assert_eq!(parsed.header("User-Agent"), Some("test-client"));
    assert_eq!(parsed.header("Accept"), Some("*/*"));
}

#[test]
fn test_parse_request_with_path_and_query_string() {
    let req = b"GET /search?q=rust HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, _) = parse_request_head(req).unwrap();

    assert_eq!(parsed.target, "/search?q=rust");
}

#[test]
fn test_parse_incomplete_request_missing_blank_line() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n";
    let result = parse_request_head(req);

    assert!(matches!(result, Err(ParseError::Incomplete)));
}

#[test]
fn test_parse_invalid_http_method() {
    let req = b"GE(T / HTTP/1.1\r\n\r\n";
    let result = parse_request_head(req);

    assert!(matches!(result, Err(ParseError::InvalidMethod)));
}

#[test]
fn test_parse_invalid_version() {
    let req = b"GET / HTTP/2.0\r\n\r\n";

    assert!(matches!(
        parse_request_head(req),
        Err(ParseError::InvalidVersion)
    ));
}

#[test]
fn test_parse_malformed_request_line() {
    let req = b"GET /a b HTTP/1.1\r\n\r\n";

    assert!(matches!(
        parse_request_head(req),
        Err(ParseError::InvalidRequest)
    ));
}

#[test]
fn test_parse_malformed_header() {
    let req = b"GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n";
    let result = parse_request_head(req);

    assert!(matches!(result, Err(ParseError::InvalidHeader)));
}

#[test]
fn test_parse_invalid_content_length() {
    let req = b"POST / HTTP/1.1\r\nContent-Length: lots\r\n\r\n";

    assert!(matches!(
        parse_request_head(req),
        Err(ParseError::InvalidContentLength)
    ));
}

#[test]
fn test_parse_various_http_methods() {
    let methods = vec![
        ("GET", Method::GET),
        ("POST", Method::POST),
        ("PUT", Method::PUT),
        ("DELETE", Method::DELETE),
        ("HEAD", Method::HEAD),
        ("OPTIONS", Method::OPTIONS),
        ("PATCH", Method::PATCH),
        ("PROPFIND", Method::Other("PROPFIND".to_string())),
    ];

    for (method_str, expected_method) in methods {
        let req = format!("{} / HTTP/1.1\r\n\r\n", method_str);
        let (parsed, _) = parse_request_head(req.as_bytes()).unwrap();
        assert_eq!(parsed.method, expected_method);
    }
}

#[test]
fn test_parse_header_names_lowercased() {
    let req = b"GET / HTTP/1.1\r\nContent-Type: application/json\r\n\r\n";
    let (parsed, _) = parse_request_head(req).unwrap();

    assert!(parsed.headers.contains_key("content-type"));
    assert!(!parsed.headers.contains_key("Content-Type"));
}
