// Core types for certificate monitoring

use crate::certificates::CertificateInfo;
use crate::error::CheckError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// Snapshot of one domain's certificate at check time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateObservation {
    pub domain: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub days_to_expiration: i64,
    pub observed_at: DateTime<Utc>,
    pub issuer: String,
    pub subject: String,
    pub serial_number: String,
    pub fingerprint: String,
}

impl CertificateObservation {
    /// Build an observation of `cert` as seen at `now`
    pub fn new(domain: impl Into<String>, cert: CertificateInfo, now: DateTime<Utc>) -> Self {
        Self {
            domain: domain.into(),
            valid_from: cert.not_before,
            valid_to: cert.not_after,
            days_to_expiration: days_until(cert.not_after, now),
            observed_at: now,
            issuer: cert.issuer,
            subject: cert.subject,
            serial_number: cert.serial_number,
            fingerprint: cert.fingerprint_sha256,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.valid_to <= self.observed_at
    }

    /// Calendar day (UTC) the observation belongs to
    pub fn observed_on(&self) -> NaiveDate {
        self.observed_at.date_naive()
    }
}

/// Whole days from `now` until `expiry`, rounded toward negative infinity
pub fn days_until(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expiry - now).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// What happened to one domain during a check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Certificate is further out than every threshold
    WithinLimits { days_to_expiration: i64 },
    /// Notification delivered and recorded
    Alerted {
        days_to_expiration: i64,
        threshold: u32,
    },
    /// Threshold reached but an alert was already recorded today
    AlreadyAlerted {
        days_to_expiration: i64,
        threshold: u32,
        last_alert: NaiveDate,
    },
}

impl CheckOutcome {
    pub fn days_to_expiration(&self) -> i64 {
        match self {
            CheckOutcome::WithinLimits { days_to_expiration }
            | CheckOutcome::Alerted {
                days_to_expiration, ..
            }
            | CheckOutcome::AlreadyAlerted {
                days_to_expiration, ..
            } => *days_to_expiration,
        }
    }
}

impl std::fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckOutcome::WithinLimits { days_to_expiration } => {
                write!(f, "OK ({} days remaining)", days_to_expiration)
            }
            CheckOutcome::Alerted {
                days_to_expiration,
                threshold,
            } => write!(
                f,
                "Alert sent for {}-day threshold ({} days remaining)",
                threshold, days_to_expiration
            ),
            CheckOutcome::AlreadyAlerted {
                days_to_expiration,
                threshold,
                last_alert,
            } => write!(
                f,
                "Already alerted for {}-day threshold on {} ({} days remaining)",
                threshold, last_alert, days_to_expiration
            ),
        }
    }
}

/// Result of checking one domain
#[derive(Debug)]
pub struct DomainReport {
    pub domain: String,
    pub result: Result<CheckOutcome, CheckError>,
}

/// Summary of one pass over all configured domains
#[derive(Debug)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub domains: Vec<DomainReport>,
}

impl CycleReport {
    pub fn alerts_sent(&self) -> usize {
        self.domains
            .iter()
            .filter(|d| matches!(d.result, Ok(CheckOutcome::Alerted { .. })))
            .count()
    }

    pub fn failures(&self) -> usize {
        self.domains.iter().filter(|d| d.result.is_err()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn cert_expiring(not_after: DateTime<Utc>) -> CertificateInfo {
        CertificateInfo {
            subject: "CN=example.com".to_string(),
            issuer: "CN=Test CA".to_string(),
            serial_number: "01:02:03".to_string(),
            not_before: not_after - Duration::days(90),
            not_after,
            fingerprint_sha256: "AB:CD".to_string(),
        }
    }

    #[test]
    fn test_days_until_floors() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        assert_eq!(days_until(now + Duration::days(6) + Duration::hours(23), now), 6);
        assert_eq!(days_until(now + Duration::days(7), now), 7);
        assert_eq!(days_until(now + Duration::hours(1), now), 0);
        // Expired one hour ago is day -1, not day 0
        assert_eq!(days_until(now - Duration::hours(1), now), -1);
        assert_eq!(days_until(now - Duration::days(3), now), -3);
    }

    #[test]
    fn test_observation_from_certificate() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let cert = cert_expiring(now + Duration::days(6) + Duration::hours(2));

        let obs = CertificateObservation::new("a.com", cert, now);
        assert_eq!(obs.domain, "a.com");
        assert_eq!(obs.days_to_expiration, 6);
        assert_eq!(obs.issuer, "CN=Test CA");
        assert_eq!(obs.fingerprint, "AB:CD");
        assert_eq!(obs.observed_on(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(!obs.is_expired());
    }

    #[test]
    fn test_expired_observation() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let obs = CertificateObservation::new("a.com", cert_expiring(now - Duration::days(2)), now);
        assert!(obs.is_expired());
        assert_eq!(obs.days_to_expiration, -2);
    }

    #[test]
    fn test_outcome_display() {
        let outcome = CheckOutcome::Alerted {
            days_to_expiration: 6,
            threshold: 7,
        };
        assert_eq!(
            outcome.to_string(),
            "Alert sent for 7-day threshold (6 days remaining)"
        );
        assert_eq!(outcome.days_to_expiration(), 6);
    }
}
