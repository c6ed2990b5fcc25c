// Certificate Fetcher - Retrieve the peer certificate over TLS

use crate::certificates::parser::{parse_certificate, CertificateInfo};
use crate::error::FetchError;
use crate::utils::network::{connect_with_timeout, resolve_hostname};
use async_trait::async_trait;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;

/// Capability: fetch peer certificate metadata for host:port
#[async_trait]
pub trait CertificateFetcher: Send + Sync {
    async fn fetch(&self, host: &str, port: u16) -> Result<CertificateInfo, FetchError>;
}

/// Fetcher performing a real TLS handshake
pub struct TlsCertificateFetcher {
    connect_timeout: Duration,
    handshake_timeout: Duration,
    connector: TlsConnector,
}

impl TlsCertificateFetcher {
    pub fn new(connect_timeout: Duration, handshake_timeout: Duration) -> Result<Self, FetchError> {
        // Expired and self-signed certificates must still be observable
        let config = ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .map_err(|e| FetchError::Handshake {
            host: String::new(),
            details: format!("TLS client setup failed: {}", e),
        })?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate))
        .with_no_client_auth();

        Ok(Self {
            connect_timeout,
            handshake_timeout,
            connector: TlsConnector::from(Arc::new(config)),
        })
    }
}

#[async_trait]
impl CertificateFetcher for TlsCertificateFetcher {
    async fn fetch(&self, host: &str, port: u16) -> Result<CertificateInfo, FetchError> {
        let addresses = resolve_hostname(host).await?;
        let stream = connect_with_timeout(host, port, &addresses, self.connect_timeout).await?;

        let server_name = ServerName::try_from(host.to_string()).map_err(|_| {
            FetchError::InvalidServerName {
                hostname: host.to_string(),
            }
        })?;

        let tls_stream = timeout(
            self.handshake_timeout,
            self.connector.connect(server_name, stream),
        )
        .await
        .map_err(|_| FetchError::Timeout {
            host: host.to_string(),
            port,
            stage: "handshaking with",
            duration: self.handshake_timeout,
        })?
        .map_err(|e| FetchError::Handshake {
            host: host.to_string(),
            details: e.to_string(),
        })?;

        let (_io, connection) = tls_stream.get_ref();
        let leaf = connection
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or_else(|| FetchError::NoCertificate {
                host: host.to_string(),
            })?;

        parse_certificate(leaf.as_ref())
    }
}

/// Verifier that accepts any server certificate; trust is not this tool's concern
#[derive(Debug)]
struct AcceptAnyCertificate;

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}
