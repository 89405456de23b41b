use std::sync::Arc;

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use models::bot::{self, Bot};
use models::ids;

use crate::errors::ServiceError;
use crate::pagination::{paginate, Pagination};
use crate::proxies::ProxyService;
use crate::storage::map_store::MapStore;

/// Word pools for persona generation.
const ADJECTIVES: [&str; 20] = [
    "swift", "quiet", "brave", "lucky", "rusty", "sly", "calm", "grim", "merry", "pale",
    "keen", "bold", "dusty", "wild", "sharp", "slow", "proud", "sour", "stern", "witty",
];
const NOUNS: [&str; 20] = [
    "falcon", "badger", "willow", "ember", "otter", "raven", "thistle", "marten", "heron", "aspen",
    "viper", "lynx", "crow", "ferret", "boar", "finch", "stoat", "elm", "pike", "wren",
];

#[derive(Clone, Debug, Deserialize)]
pub struct BotInput {
    pub login: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BotPatch {
    pub login: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub project_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GenerateInput {
    pub count: u32,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub email_domain: Option<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BotFilter<'a> {
    pub status: Option<&'a str>,
    pub project_id: Option<&'a str>,
}

#[derive(Clone)]
pub struct BotService {
    store: Arc<MapStore<Bot>>,
}

impl BotService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { store: MapStore::new() })
    }

    /// Filtered, paginated list sorted by `created_at` descending.
    /// Returns the page slice and the total count after filtering.
    pub async fn list(&self, filter: BotFilter<'_>, page: Pagination) -> (Vec<Bot>, u64) {
        let mut bots: Vec<Bot> = self
            .store
            .values()
            .await
            .into_iter()
            .filter(|b| filter.status.is_none_or(|s| b.status == s))
            .filter(|b| filter.project_id.is_none_or(|p| b.project_id.as_deref() == Some(p)))
            .collect();
        bots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = bots.len() as u64;
        (paginate(bots, page), total)
    }

    pub async fn get(&self, id: &str) -> Result<Bot, ServiceError> {
        self.store.get(id).await.ok_or_else(|| ServiceError::not_found("bot"))
    }

    pub async fn create(&self, input: BotInput) -> Result<Bot, ServiceError> {
        bot::validate_login(&input.login)?;
        let status = match input.status.as_deref() {
            Some(s) => bot::validate_status(s)?,
            None => "fresh".to_string(),
        };
        let email = match input.email {
            Some(e) => {
                bot::validate_email(&e)?;
                e
            }
            None => format!("{}@gmail.com", input.login.to_ascii_lowercase()),
        };
        let now = Utc::now();
        let rec = Bot {
            id: ids::uuid(),
            display_name: input.display_name.unwrap_or_else(|| input.login.clone()),
            login: input.login,
            email,
            status,
            project_id: input.project_id,
            proxy_id: None,
            license_id: None,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(rec.id.clone(), rec.clone()).await;
        Ok(rec)
    }

    /// Generate `count` persona accounts with random logins, display names
    /// and mailbox addresses.
    pub async fn generate(&self, input: GenerateInput) -> Result<Vec<Bot>, ServiceError> {
        if input.count == 0 || input.count > 50 {
            return Err(ServiceError::Validation("count must be in 1..=50".into()));
        }
        let domain = input.email_domain.unwrap_or_else(|| "gmail.com".to_string());
        if !domain.contains('.') {
            return Err(ServiceError::Validation(format!("invalid email domain '{domain}'")));
        }

        let mut out = Vec::with_capacity(input.count as usize);
        for _ in 0..input.count {
            let (adj, noun, digits) = {
                let mut rng = rand::thread_rng();
                (
                    *ADJECTIVES.choose(&mut rng).unwrap_or(&ADJECTIVES[0]),
                    *NOUNS.choose(&mut rng).unwrap_or(&NOUNS[0]),
                    rng.gen_range(10..100),
                )
            };
            let login = format!("{adj}{noun}{digits}");
            let display_name = format!("{}{} {}{}",
                &adj[..1].to_ascii_uppercase(), &adj[1..],
                &noun[..1].to_ascii_uppercase(), &noun[1..]);
            let now = Utc::now();
            let rec = Bot {
                id: ids::uuid(),
                email: format!("{login}@{domain}"),
                login,
                display_name,
                status: "fresh".into(),
                project_id: input.project_id.clone(),
                proxy_id: None,
                license_id: None,
                notes: None,
                created_at: now,
                updated_at: now,
            };
            self.store.insert(rec.id.clone(), rec.clone()).await;
            out.push(rec);
        }
        Ok(out)
    }

    /// Merge provided fields and bump `updated_at`.
    pub async fn patch(&self, id: &str, patch: BotPatch) -> Result<Bot, ServiceError> {
        if let Some(login) = &patch.login {
            bot::validate_login(login)?;
        }
        if let Some(email) = &patch.email {
            bot::validate_email(email)?;
        }
        let status = match patch.status.as_deref() {
            Some(s) => Some(bot::validate_status(s)?),
            None => None,
        };
        self.store
            .update_entry(id, |b| {
                if let Some(login) = patch.login { b.login = login; }
                if let Some(name) = patch.display_name { b.display_name = name; }
                if let Some(email) = patch.email { b.email = email; }
                if let Some(status) = status { b.status = status; }
                if let Some(project_id) = patch.project_id { b.project_id = Some(project_id); }
                if let Some(notes) = patch.notes { b.notes = Some(notes); }
                b.updated_at = Utc::now();
                Ok(())
            })
            .await
            .map_err(|_| ServiceError::not_found("bot"))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if !self.store.remove(id).await {
            return Err(ServiceError::not_found("bot"));
        }
        Ok(())
    }

    /// Record the assignment on both sides. 404 if either record is missing.
    pub async fn assign_proxy(
        &self,
        proxies: &ProxyService,
        bot_id: &str,
        proxy_id: &str,
    ) -> Result<Bot, ServiceError> {
        proxies.get(proxy_id).await?;
        let bot = self
            .store
            .update_entry(bot_id, |b| {
                b.proxy_id = Some(proxy_id.to_string());
                b.updated_at = Utc::now();
                Ok(())
            })
            .await
            .map_err(|_| ServiceError::not_found("bot"))?;
        proxies.set_bot(proxy_id, bot_id).await?;
        Ok(bot)
    }

    pub async fn assign_license(
        &self,
        licenses: &crate::licenses::LicenseService,
        bot_id: &str,
        license_id: &str,
    ) -> Result<Bot, ServiceError> {
        licenses.get(license_id).await?;
        let bot = self
            .store
            .update_entry(bot_id, |b| {
                b.license_id = Some(license_id.to_string());
                b.updated_at = Utc::now();
                Ok(())
            })
            .await
            .map_err(|_| ServiceError::not_found("bot"))?;
        licenses.set_bot(license_id, bot_id).await?;
        Ok(bot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(login: &str) -> BotInput {
        BotInput {
            login: login.into(),
            display_name: None,
            email: None,
            status: None,
            project_id: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_and_get() {
        let svc = BotService::new();
        let created = svc.create(input("swiftfalcon42")).await.unwrap();
        assert_eq!(created.status, "fresh");
        assert_eq!(created.email, "swiftfalcon42@gmail.com");

        let got = svc.get(&created.id).await.unwrap();
        assert_eq!(got, created);
    }

    #[tokio::test]
    async fn patch_merges_and_bumps_updated_at() {
        let svc = BotService::new();
        let created = svc.create(input("patchme")).await.unwrap();

        let patched = svc
            .patch(&created.id, BotPatch { status: Some("Active".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(patched.status, "active");
        assert_eq!(patched.login, "patchme");
        assert!(patched.updated_at >= created.updated_at);

        assert!(matches!(
            svc.patch(&created.id, BotPatch { status: Some("zombie".into()), ..Default::default() })
                .await,
            Err(ServiceError::Model(_))
        ));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let svc = BotService::new();
        let created = svc.create(input("gone")).await.unwrap();
        svc.delete(&created.id).await.unwrap();
        assert!(matches!(svc.get(&created.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete(&created.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn generate_produces_personas() {
        let svc = BotService::new();
        let bots = svc
            .generate(GenerateInput { count: 5, project_id: Some("p1".into()), email_domain: None })
            .await
            .unwrap();
        assert_eq!(bots.len(), 5);
        for b in &bots {
            assert!(b.email.ends_with("@gmail.com"));
            assert_eq!(b.status, "fresh");
            assert_eq!(b.project_id.as_deref(), Some("p1"));
            models::bot::validate_login(&b.login).unwrap();
        }
        assert!(svc
            .generate(GenerateInput { count: 0, project_id: None, email_domain: None })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn list_filters_and_paginates() {
        let svc = BotService::new();
        for i in 0..15 {
            let mut inp = input(&format!("bot{i}"));
            inp.project_id = Some(if i % 2 == 0 { "even" } else { "odd" }.into());
            svc.create(inp).await.unwrap();
        }
        let (page, total) = svc
            .list(
                BotFilter { status: None, project_id: Some("even") },
                Pagination { page: 1, limit: 5 },
            )
            .await;
        assert_eq!(total, 8);
        assert_eq!(page.len(), 5);
    }

    #[tokio::test]
    async fn assign_proxy_records_both_sides() {
        let bots = BotService::new();
        let proxies = crate::proxies::ProxyService::new();
        let bot = bots.create(input("linked")).await.unwrap();
        let proxy = proxies
            .create(crate::proxies::ProxyInput {
                host: "10.0.0.1".into(),
                port: 1080,
                protocol: "socks5".into(),
                username: None,
                password: None,
            })
            .await
            .unwrap();

        let bot = bots.assign_proxy(&proxies, &bot.id, &proxy.id).await.unwrap();
        assert_eq!(bot.proxy_id.as_deref(), Some(proxy.id.as_str()));
        let proxy = proxies.get(&proxy.id).await.unwrap();
        assert_eq!(proxy.bot_id.as_deref(), Some(bot.id.as_str()));

        assert!(matches!(
            bots.assign_proxy(&proxies, &bot.id, "missing").await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
