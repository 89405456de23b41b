use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use models::ids;
use models::vm_command::{self, VmCommand};

use crate::errors::ServiceError;
use crate::pagination::{paginate, Pagination};
use crate::storage::map_store::MapStore;

#[derive(Clone, Debug, Deserialize)]
pub struct DispatchInput {
    pub vm_id: String,
    pub action: String,
    #[serde(default)]
    pub payload: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CommandPatch {
    pub status: Option<String>,
    pub result: Option<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CommandFilter<'a> {
    pub vm_id: Option<&'a str>,
    pub status: Option<&'a str>,
}

/// Command queue without an execution engine behind it: dispatch inserts a
/// `queued` record, and an external agent is expected to walk the statuses
/// forward over PATCH.
#[derive(Clone)]
pub struct VmOpsService {
    store: Arc<MapStore<VmCommand>>,
}

impl VmOpsService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { store: MapStore::new() })
    }

    pub async fn dispatch(&self, input: DispatchInput) -> Result<VmCommand, ServiceError> {
        if input.vm_id.trim().is_empty() {
            return Err(ServiceError::Validation("vm_id must not be empty".into()));
        }
        let action = vm_command::validate_action(&input.action)?;
        if action == "exec" && input.payload.as_deref().map_or(true, |p| p.trim().is_empty()) {
            return Err(ServiceError::Validation("exec commands require a payload".into()));
        }
        let now = Utc::now();
        let rec = VmCommand {
            id: ids::timestamped(),
            vm_id: input.vm_id,
            action,
            payload: input.payload,
            status: "queued".into(),
            result: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(rec.id.clone(), rec.clone()).await;
        info!(id = %rec.id, vm_id = %rec.vm_id, action = %rec.action, "queued vm command");
        Ok(rec)
    }

    /// Newest first, filtered, with total count after filtering.
    pub async fn list(&self, filter: CommandFilter<'_>, page: Pagination) -> (Vec<VmCommand>, u64) {
        let mut commands: Vec<VmCommand> = self
            .store
            .values()
            .await
            .into_iter()
            .filter(|c| filter.vm_id.is_none_or(|v| c.vm_id == v))
            .filter(|c| filter.status.is_none_or(|s| c.status == s))
            .collect();
        commands.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = commands.len() as u64;
        (paginate(commands, page), total)
    }

    pub async fn get(&self, id: &str) -> Result<VmCommand, ServiceError> {
        self.store.get(id).await.ok_or_else(|| ServiceError::not_found("command"))
    }

    /// Status may only move `queued -> sent -> done | failed`.
    pub async fn patch(&self, id: &str, patch: CommandPatch) -> Result<VmCommand, ServiceError> {
        let status = match patch.status.as_deref() {
            Some(s) => Some(vm_command::validate_status(s)?),
            None => None,
        };
        if let Some(next) = &status {
            let current = self.get(id).await?;
            if !vm_command::transition_allowed(&current.status, next) {
                return Err(ServiceError::Validation(format!(
                    "illegal status transition {} -> {}",
                    current.status, next
                )));
            }
        }
        self.store
            .update_entry(id, |c| {
                if let Some(status) = status { c.status = status; }
                if let Some(result) = patch.result { c.result = Some(result); }
                c.updated_at = Utc::now();
                Ok(())
            })
            .await
            .map_err(|_| ServiceError::not_found("command"))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if !self.store.remove(id).await {
            return Err(ServiceError::not_found("command"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatch(vm: &str, action: &str) -> DispatchInput {
        DispatchInput { vm_id: vm.into(), action: action.into(), payload: None }
    }

    #[tokio::test]
    async fn dispatch_queues_a_record() {
        let svc = VmOpsService::new();
        let cmd = svc.dispatch(dispatch("vm-1", "restart")).await.unwrap();
        assert_eq!(cmd.status, "queued");
        assert_eq!(svc.get(&cmd.id).await.unwrap(), cmd);
    }

    #[tokio::test]
    async fn exec_requires_payload() {
        let svc = VmOpsService::new();
        assert!(svc.dispatch(dispatch("vm-1", "exec")).await.is_err());
        let mut ok = dispatch("vm-1", "exec");
        ok.payload = Some("sc stop wuauserv".into());
        assert!(svc.dispatch(ok).await.is_ok());
    }

    #[tokio::test]
    async fn status_walks_forward_only() {
        let svc = VmOpsService::new();
        let cmd = svc.dispatch(dispatch("vm-1", "start")).await.unwrap();

        // queued -> done is not allowed
        let err = svc
            .patch(&cmd.id, CommandPatch { status: Some("done".into()), result: None })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let sent = svc
            .patch(&cmd.id, CommandPatch { status: Some("sent".into()), result: None })
            .await
            .unwrap();
        assert_eq!(sent.status, "sent");

        let done = svc
            .patch(&cmd.id, CommandPatch { status: Some("done".into()), result: Some("ok".into()) })
            .await
            .unwrap();
        assert_eq!(done.status, "done");
        assert_eq!(done.result.as_deref(), Some("ok"));
        assert!(done.updated_at >= cmd.updated_at);

        // terminal states stay put
        let err = svc
            .patch(&cmd.id, CommandPatch { status: Some("sent".into()), result: None })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn list_filters_by_vm_and_status() {
        let svc = VmOpsService::new();
        for i in 0..3 {
            svc.dispatch(dispatch(&format!("vm-{}", i % 2), "stop")).await.unwrap();
        }
        let (items, total) = svc
            .list(CommandFilter { vm_id: Some("vm-0"), status: None }, Pagination::default())
            .await;
        assert_eq!(total, 2);
        assert!(items.iter().all(|c| c.vm_id == "vm-0"));

        let (queued, _) = svc
            .list(CommandFilter { vm_id: None, status: Some("queued") }, Pagination::default())
            .await;
        assert_eq!(queued.len(), 3);
    }
}
