use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use models::ids;
use models::proxy::{self, Proxy};

use crate::errors::ServiceError;
use crate::ipqs::IpqsService;
use crate::pagination::{paginate, Pagination};
use crate::storage::map_store::MapStore;

#[derive(Clone, Debug, Deserialize)]
pub struct ProxyInput {
    pub host: String,
    pub port: u16,
    pub protocol: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProxyPatch {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub protocol: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub status: Option<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ProxyFilter<'a> {
    pub status: Option<&'a str>,
    pub protocol: Option<&'a str>,
}

#[derive(Clone)]
pub struct ProxyService {
    store: Arc<MapStore<Proxy>>,
}

impl ProxyService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { store: MapStore::new() })
    }

    pub async fn list(&self, filter: ProxyFilter<'_>, page: Pagination) -> (Vec<Proxy>, u64) {
        let mut proxies: Vec<Proxy> = self
            .store
            .values()
            .await
            .into_iter()
            .filter(|p| filter.status.is_none_or(|s| p.status == s))
            .filter(|p| filter.protocol.is_none_or(|proto| p.protocol == proto))
            .collect();
        proxies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = proxies.len() as u64;
        (paginate(proxies, page), total)
    }

    pub async fn get(&self, id: &str) -> Result<Proxy, ServiceError> {
        self.store.get(id).await.ok_or_else(|| ServiceError::not_found("proxy"))
    }

    pub async fn create(&self, input: ProxyInput) -> Result<Proxy, ServiceError> {
        proxy::validate_host(&input.host)?;
        proxy::validate_port(input.port)?;
        let protocol = proxy::validate_protocol(&input.protocol)?;
        let now = Utc::now();
        let rec = Proxy {
            id: ids::uuid(),
            host: input.host,
            port: input.port,
            protocol,
            username: input.username,
            password: input.password,
            status: "unchecked".into(),
            bot_id: None,
            fraud_score: None,
            last_checked_at: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(rec.id.clone(), rec.clone()).await;
        Ok(rec)
    }

    pub async fn patch(&self, id: &str, patch: ProxyPatch) -> Result<Proxy, ServiceError> {
        if let Some(host) = &patch.host {
            proxy::validate_host(host)?;
        }
        if let Some(port) = patch.port {
            proxy::validate_port(port)?;
        }
        let protocol = match patch.protocol.as_deref() {
            Some(p) => Some(proxy::validate_protocol(p)?),
            None => None,
        };
        let status = match patch.status.as_deref() {
            Some(s) => Some(proxy::validate_status(s)?),
            None => None,
        };
        self.store
            .update_entry(id, |p| {
                if let Some(host) = patch.host { p.host = host; }
                if let Some(port) = patch.port { p.port = port; }
                if let Some(protocol) = protocol { p.protocol = protocol; }
                if let Some(username) = patch.username { p.username = Some(username); }
                if let Some(password) = patch.password { p.password = Some(password); }
                if let Some(status) = status { p.status = status; }
                p.updated_at = Utc::now();
                Ok(())
            })
            .await
            .map_err(|_| ServiceError::not_found("proxy"))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if !self.store.remove(id).await {
            return Err(ServiceError::not_found("proxy"));
        }
        Ok(())
    }

    /// Score the proxy host with the IPQS mock and persist the result.
    pub async fn check(&self, ipqs: &IpqsService, id: &str) -> Result<Proxy, ServiceError> {
        let current = self.get(id).await?;
        let report = ipqs.check(&current.host).await?;
        self.store
            .update_entry(id, |p| {
                p.fraud_score = Some(report.fraud_score);
                p.last_checked_at = Some(report.checked_at);
                p.updated_at = Utc::now();
                Ok(())
            })
            .await
    }

    /// Back-reference written when a bot gets this proxy assigned.
    pub(crate) async fn set_bot(&self, id: &str, bot_id: &str) -> Result<Proxy, ServiceError> {
        self.store
            .update_entry(id, |p| {
                p.bot_id = Some(bot_id.to_string());
                p.updated_at = Utc::now();
                Ok(())
            })
            .await
            .map_err(|_| ServiceError::not_found("proxy"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(host: &str) -> ProxyInput {
        ProxyInput {
            host: host.into(),
            port: 1080,
            protocol: "socks5".into(),
            username: None,
            password: None,
        }
    }

    #[tokio::test]
    async fn create_starts_unchecked() {
        let svc = ProxyService::new();
        let p = svc.create(input("203.0.113.7")).await.unwrap();
        assert_eq!(p.status, "unchecked");
        assert!(p.fraud_score.is_none());
    }

    #[tokio::test]
    async fn create_rejects_bad_protocol_and_port() {
        let svc = ProxyService::new();
        let mut bad = input("203.0.113.7");
        bad.protocol = "socks4".into();
        assert!(svc.create(bad).await.is_err());
        let mut bad = input("203.0.113.7");
        bad.port = 0;
        assert!(svc.create(bad).await.is_err());
    }

    #[tokio::test]
    async fn check_persists_fraud_score() {
        let svc = ProxyService::new();
        let ipqs = IpqsService::new();
        let p = svc.create(input("203.0.113.7")).await.unwrap();

        let checked = svc.check(&ipqs, &p.id).await.unwrap();
        let expected = ipqs.check("203.0.113.7").await.unwrap();
        assert_eq!(checked.fraud_score, Some(expected.fraud_score));
        assert!(checked.last_checked_at.is_some());
    }

    #[tokio::test]
    async fn list_filters_by_protocol() {
        let svc = ProxyService::new();
        svc.create(input("10.0.0.1")).await.unwrap();
        let mut http = input("10.0.0.2");
        http.protocol = "http".into();
        svc.create(http).await.unwrap();

        let (items, total) = svc
            .list(
                ProxyFilter { status: None, protocol: Some("socks5") },
                Pagination::default(),
            )
            .await;
        assert_eq!(total, 1);
        assert_eq!(items[0].host, "10.0.0.1");
    }
}
