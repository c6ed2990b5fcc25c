// Certificates module - Peer certificate retrieval and parsing

pub mod fetcher;
pub mod parser;

pub use fetcher::{CertificateFetcher, TlsCertificateFetcher};
pub use parser::CertificateInfo;
