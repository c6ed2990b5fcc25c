// Network utilities - target parsing, DNS resolution, socket helpers

use crate::error::FetchError;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Default HTTPS port
pub const DEFAULT_TLS_PORT: u16 = 443;

/// Split a configured domain into host and port (`host` or `host:port`)
pub fn split_host_port(input: &str) -> (String, u16) {
    let input = input.trim();

    // Bare IPv6 addresses contain colons but no port
    if input.parse::<IpAddr>().is_ok() {
        return (input.to_string(), DEFAULT_TLS_PORT);
    }

    if let Some((host, port_str)) = input.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            let host = host.trim_start_matches('[').trim_end_matches(']');
            return (host.to_string(), port);
        }
    }

    (input.to_string(), DEFAULT_TLS_PORT)
}

/// Resolve hostname to IP addresses
pub async fn resolve_hostname(hostname: &str) -> Result<Vec<IpAddr>, FetchError> {
    // Check if it's already an IP address
    if let Ok(ip) = hostname.parse::<IpAddr>() {
        return Ok(vec![ip]);
    }

    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

    let response = resolver
        .lookup_ip(hostname)
        .await
        .map_err(|e| FetchError::DnsResolutionFailed {
            hostname: hostname.to_string(),
            details: e.to_string(),
        })?;

    let ips: Vec<IpAddr> = response.iter().collect();

    if ips.is_empty() {
        return Err(FetchError::DnsResolutionFailed {
            hostname: hostname.to_string(),
            details: "no addresses returned".to_string(),
        });
    }

    Ok(ips)
}

/// Connect to the first reachable address, each attempt bounded by `connect_timeout`
pub async fn connect_with_timeout(
    host: &str,
    port: u16,
    addresses: &[IpAddr],
    connect_timeout: Duration,
) -> Result<TcpStream, FetchError> {
    let mut last_error = None;

    for ip in addresses {
        let addr = SocketAddr::new(*ip, port);
        match timeout(connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => return Ok(stream),
            Ok(Err(source)) => {
                tracing::debug!("Connection to {} failed: {}", addr, source);
                last_error = Some(FetchError::ConnectionFailed {
                    host: host.to_string(),
                    port,
                    source,
                });
            }
            Err(_) => {
                tracing::debug!("Connection to {} timed out", addr);
                last_error = Some(FetchError::Timeout {
                    host: host.to_string(),
                    port,
                    stage: "connecting to",
                    duration: connect_timeout,
                });
            }
        }
    }

    Err(last_error.unwrap_or_else(|| FetchError::DnsResolutionFailed {
        hostname: host.to_string(),
        details: "no addresses to connect to".to_string(),
    }))
}
