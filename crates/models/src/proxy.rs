use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proxy {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub protocol: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub status: String,
    pub bot_id: Option<String>,
    pub fraud_score: Option<u8>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const PROXY_PROTOCOLS: [&str; 3] = ["http", "https", "socks5"];
pub const PROXY_STATUSES: [&str; 3] = ["unchecked", "alive", "dead"];

pub fn validate_protocol(p: &str) -> Result<String, ModelError> {
    let low = p.to_ascii_lowercase();
    if !PROXY_PROTOCOLS.contains(&low.as_str()) {
        return Err(ModelError::Validation(format!(
            "invalid proxy protocol '{p}' (expected {})",
            PROXY_PROTOCOLS.join("|")
        )));
    }
    Ok(low)
}

pub fn validate_status(s: &str) -> Result<String, ModelError> {
    let low = s.to_ascii_lowercase();
    if !PROXY_STATUSES.contains(&low.as_str()) {
        return Err(ModelError::Validation(format!("invalid proxy status '{s}'")));
    }
    Ok(low)
}

pub fn validate_host(host: &str) -> Result<(), ModelError> {
    if host.trim().is_empty() {
        return Err(ModelError::Validation("host must not be empty".into()));
    }
    Ok(())
}

pub fn validate_port(port: u16) -> Result<(), ModelError> {
    if port == 0 {
        return Err(ModelError::Validation("port must be in 1..=65535".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_set_is_closed() {
        assert_eq!(validate_protocol("SOCKS5").unwrap(), "socks5");
        assert!(validate_protocol("socks4").is_err());
    }

    #[test]
    fn port_zero_rejected() {
        assert!(validate_port(0).is_err());
        assert!(validate_port(1080).is_ok());
    }
}
