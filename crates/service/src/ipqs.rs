use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;
use tracing::debug;

use crate::errors::ServiceError;

/// Fabricated IP quality report. The whole module is a deterministic
/// stand-in for a real fraud-detection integration: the score is a hash of
/// the dotted-quad string, so a given IP always classifies the same way.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IpqsReport {
    pub ip: String,
    pub fraud_score: u8,
    pub proxy: bool,
    pub vpn: bool,
    pub tor: bool,
    pub recent_abuse: bool,
    pub country_code: String,
    pub isp: String,
    pub checked_at: DateTime<Utc>,
}

const COUNTRIES: [&str; 10] = ["US", "DE", "NL", "GB", "FR", "PL", "CA", "SE", "SG", "JP"];
const ISPS: [&str; 8] = [
    "Hetzner Online",
    "OVH SAS",
    "DigitalOcean",
    "Comcast Cable",
    "Deutsche Telekom",
    "Vodafone",
    "M247 Europe",
    "Cogent Communications",
];

fn fnv1a(input: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in input.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[derive(Clone)]
pub struct IpqsService {
    cache: Cache<String, IpqsReport>,
}

impl IpqsService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            // Repeated checks of one IP within the TTL return the cached report.
            cache: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(300))
                .build(),
        })
    }

    /// Score an IPv4 address. Rejects anything that does not parse as a
    /// dotted quad.
    pub async fn check(&self, ip: &str) -> Result<IpqsReport, ServiceError> {
        let addr: Ipv4Addr = ip
            .trim()
            .parse()
            .map_err(|_| ServiceError::Validation(format!("'{ip}' is not a valid IPv4 address")))?;
        let key = addr.to_string();
        let report = self
            .cache
            .get_with(key.clone(), async move { synthesize(&key) })
            .await;
        debug!(ip = %report.ip, score = report.fraud_score, "ipqs check");
        Ok(report)
    }
}

fn synthesize(ip: &str) -> IpqsReport {
    let hash = fnv1a(ip);
    let score = (hash % 101) as u8;
    IpqsReport {
        ip: ip.to_string(),
        fraud_score: score,
        proxy: score >= 75,
        vpn: score >= 60,
        tor: score >= 90,
        recent_abuse: score >= 80,
        country_code: COUNTRIES[((hash >> 32) as usize) % COUNTRIES.len()].to_string(),
        isp: ISPS[((hash >> 16) as usize) % ISPS.len()].to_string(),
        checked_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn score_is_deterministic_per_ip() {
        let svc = IpqsService::new();
        let a = svc.check("8.8.8.8").await.unwrap();
        let b = svc.check("8.8.8.8").await.unwrap();
        assert_eq!(a.fraud_score, b.fraud_score);
        assert_eq!(a.country_code, b.country_code);
        // cached within the TTL, so the timestamp does not move either
        assert_eq!(a.checked_at, b.checked_at);
    }

    #[tokio::test]
    async fn flags_follow_score_thresholds() {
        let svc = IpqsService::new();
        for ip in ["1.2.3.4", "198.51.100.23", "203.0.113.99", "10.1.2.3"] {
            let r = svc.check(ip).await.unwrap();
            assert!(r.fraud_score <= 100);
            assert_eq!(r.proxy, r.fraud_score >= 75);
            assert_eq!(r.vpn, r.fraud_score >= 60);
            assert_eq!(r.tor, r.fraud_score >= 90);
            assert_eq!(r.recent_abuse, r.fraud_score >= 80);
        }
    }

    #[tokio::test]
    async fn rejects_non_ipv4() {
        let svc = IpqsService::new();
        assert!(svc.check("not-an-ip").await.is_err());
        assert!(svc.check("256.1.1.1").await.is_err());
        assert!(svc.check("::1").await.is_err());
    }

    #[test]
    fn fnv1a_is_stable() {
        // spot value so the hash never drifts silently
        assert_eq!(fnv1a(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a("8.8.8.8"), fnv1a("8.8.8.8"));
        assert_ne!(fnv1a("8.8.8.8"), fnv1a("8.8.4.4"));
    }
}
