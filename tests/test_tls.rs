//! Handshake and request round trip over TLS, using a throwaway certificate.

use std::sync::Arc;

use rcgen::CertifiedKey;
use switchyard::handlers;
use switchyard::server::{RequestServer, SecurityMaterial};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};

fn self_signed() -> CertifiedKey {
    rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap()
}

fn connector(trusted: &CertifiedKey) -> TlsConnector {
    let mut roots = RootCertStore::empty();
    roots.add(trusted.cert.der().clone()).unwrap();

    let config = ClientConfig::builder_with_provider(Arc::new(ring::default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_root_certificates(roots)
        .with_no_client_auth();
    TlsConnector::from(Arc::new(config))
}

#[tokio::test]
async fn test_tls_ping_round_trip() {
    let certified = self_signed();
    let material = SecurityMaterial::new(certified.key_pair.serialize_pem(), certified.cert.pem());
    let server = RequestServer::create(handlers::https_routes(), Some(material)).unwrap();
    assert!(server.is_encrypted());

    let (client, server_side) = tokio::io::duplex(64 * 1024);
    let task = tokio::spawn(async move { server.handle(server_side).await });

    let domain = ServerName::try_from("localhost").unwrap();
    let mut tls = connector(&certified).connect(domain, client).await.unwrap();

    tls.write_all(b"GET /ping HTTP/1.1\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut out = Vec::new();
    tls.read_to_end(&mut out).await.unwrap();
    task.await.unwrap().unwrap();

    let response = String::from_utf8(out).unwrap();
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("connection: close\r\n"));
}

#[tokio::test]
async fn test_tls_handshake_with_untrusted_certificate_fails() {
    let served = self_signed();
    let material = SecurityMaterial::new(served.key_pair.serialize_pem(), served.cert.pem());
    let server = RequestServer::create(handlers::https_routes(), Some(material)).unwrap();

    let (client, server_side) = tokio::io::duplex(64 * 1024);
    let task = tokio::spawn(async move { server.handle(server_side).await });

    // The client trusts a different certificate than the one served
    let domain = ServerName::try_from("localhost").unwrap();
    let result = connector(&self_signed()).connect(domain, client).await;

    assert!(result.is_err());
    assert!(task.await.unwrap().is_err());
}
