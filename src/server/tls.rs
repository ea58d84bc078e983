//! TLS key and certificate loading.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::pki_types::pem::PemObject;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("no certificate found in PEM data")]
    NoCertificates,
    #[error("invalid certificate PEM: {0}")]
    Certificate(tokio_rustls::rustls::pki_types::pem::Error),
    #[error("invalid private key PEM: {0}")]
    PrivateKey(tokio_rustls::rustls::pki_types::pem::Error),
    #[error("TLS configuration rejected: {0}")]
    Config(#[from] tokio_rustls::rustls::Error),
}

/// PEM-encoded private key and certificate chain.
#[derive(Clone)]
pub struct SecurityMaterial {
    pub key: Vec<u8>,
    pub cert: Vec<u8>,
}

impl SecurityMaterial {
    pub fn new(key: impl Into<Vec<u8>>, cert: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            cert: cert.into(),
        }
    }

    /// Reads the key and certificate files.
    pub fn load(key_path: &Path, cert_path: &Path) -> anyhow::Result<Self> {
        let key = std::fs::read(key_path)
            .with_context(|| format!("Private key file not readable: {}", key_path.display()))?;
        let cert = std::fs::read(cert_path)
            .with_context(|| format!("Certificate file not readable: {}", cert_path.display()))?;
        Ok(Self { key, cert })
    }

    /// Builds the acceptor used to terminate TLS on accepted sockets.
    pub fn acceptor(&self) -> Result<TlsAcceptor, TlsError> {
        let certs = CertificateDer::pem_slice_iter(&self.cert)
            .collect::<Result<Vec<_>, _>>()
            .map_err(TlsError::Certificate)?;
        if certs.is_empty() {
            return Err(TlsError::NoCertificates);
        }
        let key = PrivateKeyDer::from_pem_slice(&self.key).map_err(TlsError::PrivateKey)?;

        let config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
            .with_safe_default_protocol_versions()?
            .with_no_client_auth()
            .with_single_cert(certs, key)?;

        Ok(TlsAcceptor::from(Arc::new(config)))
    }
}

impl std::fmt::Debug for SecurityMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityMaterial")
            .field("key", &"<redacted>")
            .field("cert_len", &self.cert.len())
            .finish()
    }
}
