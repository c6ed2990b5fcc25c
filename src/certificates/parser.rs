// Certificate Parser - Extract certificate metadata from DER bytes

use crate::error::FetchError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use x509_parser::prelude::*;

/// Certificate information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateInfo {
    pub subject: String,
    pub issuer: String,
    pub serial_number: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub fingerprint_sha256: String, // SHA256 of the DER encoding (colon-separated hex)
}

/// Parse a single certificate from DER bytes
pub fn parse_certificate(der_bytes: &[u8]) -> Result<CertificateInfo, FetchError> {
    let (_, cert) = X509Certificate::from_der(der_bytes).map_err(|e| {
        FetchError::CertificateParse {
            details: format!("{:?}", e),
        }
    })?;

    let validity = cert.validity();

    Ok(CertificateInfo {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        serial_number: cert.raw_serial_as_string(),
        not_before: asn1_to_utc(validity.not_before, "notBefore")?,
        not_after: asn1_to_utc(validity.not_after, "notAfter")?,
        fingerprint_sha256: fingerprint_sha256(der_bytes),
    })
}

fn asn1_to_utc(time: ASN1Time, field: &str) -> Result<DateTime<Utc>, FetchError> {
    DateTime::from_timestamp(time.timestamp(), 0).ok_or_else(|| FetchError::CertificateParse {
        details: format!("{} is out of range: {}", field, time),
    })
}

/// SHA256 of the entire DER-encoded certificate, as uppercase colon-separated hex
pub fn fingerprint_sha256(der_bytes: &[u8]) -> String {
    Sha256::digest(der_bytes)
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_format() {
        let fp = fingerprint_sha256(b"");
        // SHA256 of the empty input
        assert!(fp.starts_with("E3:B0:C4:42"));
        assert_eq!(fp.split(':').count(), 32);
        assert!(fp.chars().all(|c| c == ':' || c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_parse_garbage_fails() {
        let result = parse_certificate(&[0x30, 0x03, 0x02, 0x01]);
        assert!(matches!(result, Err(FetchError::CertificateParse { .. })));
    }
}
