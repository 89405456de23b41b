use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use models::ids;
use models::note::{self, Note};

use crate::errors::ServiceError;
use crate::storage::map_store::MapStore;

#[derive(Clone, Debug, Deserialize)]
pub struct NoteInput {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub pinned: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub pinned: Option<bool>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoteFilter<'a> {
    pub tag: Option<&'a str>,
    /// Case-insensitive substring over title and content.
    pub q: Option<&'a str>,
}

#[derive(Clone)]
pub struct NoteService {
    store: Arc<MapStore<Note>>,
}

impl NoteService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { store: MapStore::new() })
    }

    /// Pinned first, then most recently updated.
    pub async fn list(&self, filter: NoteFilter<'_>) -> Vec<Note> {
        let q = filter.q.map(|q| q.to_lowercase());
        let mut notes: Vec<Note> = self
            .store
            .values()
            .await
            .into_iter()
            .filter(|n| filter.tag.is_none_or(|t| n.tags.iter().any(|nt| nt == t)))
            .filter(|n| {
                q.as_deref().is_none_or(|q| {
                    n.title.to_lowercase().contains(q) || n.content.to_lowercase().contains(q)
                })
            })
            .collect();
        notes.sort_by(|a, b| {
            b.pinned.cmp(&a.pinned).then_with(|| b.updated_at.cmp(&a.updated_at))
        });
        notes
    }

    pub async fn get(&self, id: &str) -> Result<Note, ServiceError> {
        self.store.get(id).await.ok_or_else(|| ServiceError::not_found("note"))
    }

    pub async fn create(&self, input: NoteInput) -> Result<Note, ServiceError> {
        note::validate_title(&input.title)?;
        let now = Utc::now();
        let rec = Note {
            id: ids::timestamped(),
            title: input.title,
            content: input.content,
            tags: note::normalize_tags(input.tags),
            pinned: input.pinned,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(rec.id.clone(), rec.clone()).await;
        Ok(rec)
    }

    pub async fn patch(&self, id: &str, patch: NotePatch) -> Result<Note, ServiceError> {
        if let Some(title) = &patch.title {
            note::validate_title(title)?;
        }
        self.store
            .update_entry(id, |n| {
                if let Some(title) = patch.title { n.title = title; }
                if let Some(content) = patch.content { n.content = content; }
                if let Some(tags) = patch.tags { n.tags = note::normalize_tags(tags); }
                if let Some(pinned) = patch.pinned { n.pinned = pinned; }
                n.updated_at = Utc::now();
                Ok(())
            })
            .await
            .map_err(|_| ServiceError::not_found("note"))
    }

    pub async fn toggle_pin(&self, id: &str) -> Result<Note, ServiceError> {
        self.store
            .update_entry(id, |n| {
                n.pinned = !n.pinned;
                n.updated_at = Utc::now();
                Ok(())
            })
            .await
            .map_err(|_| ServiceError::not_found("note"))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if !self.store.remove(id).await {
            return Err(ServiceError::not_found("note"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, tags: &[&str]) -> NoteInput {
        NoteInput {
            title: title.into(),
            content: format!("{title} body"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            pinned: false,
        }
    }

    #[tokio::test]
    async fn create_normalizes_tags() {
        let svc = NoteService::new();
        let n = svc.create(input("gold route", &["GP", "gp", "route"])).await.unwrap();
        assert_eq!(n.tags, vec!["gp".to_string(), "route".to_string()]);
    }

    #[tokio::test]
    async fn list_filters_by_tag_and_query() {
        let svc = NoteService::new();
        svc.create(input("mule schedule", &["logistics"])).await.unwrap();
        svc.create(input("ban wave postmortem", &["bans"])).await.unwrap();

        let by_tag = svc.list(NoteFilter { tag: Some("bans"), q: None }).await;
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].title, "ban wave postmortem");

        let by_q = svc.list(NoteFilter { tag: None, q: Some("MULE") }).await;
        assert_eq!(by_q.len(), 1);
        assert_eq!(by_q[0].title, "mule schedule");
    }

    #[tokio::test]
    async fn pinned_notes_sort_first() {
        let svc = NoteService::new();
        svc.create(input("old plain", &[])).await.unwrap();
        let pinned = svc.create(input("sticky", &[])).await.unwrap();
        svc.create(input("new plain", &[])).await.unwrap();
        svc.toggle_pin(&pinned.id).await.unwrap();

        let notes = svc.list(NoteFilter::default()).await;
        assert_eq!(notes[0].title, "sticky");
    }

    #[tokio::test]
    async fn toggle_pin_flips_state() {
        let svc = NoteService::new();
        let n = svc.create(input("flip", &[])).await.unwrap();
        assert!(!n.pinned);
        assert!(svc.toggle_pin(&n.id).await.unwrap().pinned);
        assert!(!svc.toggle_pin(&n.id).await.unwrap().pinned);
        assert!(matches!(svc.toggle_pin("missing").await, Err(ServiceError::NotFound(_))));
    }
}
