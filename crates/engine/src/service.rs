// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Workspace Service (C5): pure orchestration logic over the adapter
//! traits, independent of HTTP transport. See §4.5.

use std::time::Duration;

use hatch_adapters::{ObjectStorageAdapter, OrchestratorAdapter, SessionStore};
use hatch_core::{CoreError, Login, Workspace, WorkspaceId, PER_USER_CAP};

use crate::error::{from_object_storage, from_orchestrator, from_session_store};
use crate::readiness::ReadinessProber;

const DEFAULT_READINESS_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_READINESS_DEADLINE: Duration = Duration::from_secs(60);

pub struct WorkspaceService<Store, Storage, Orch, Prober> {
    store: Store,
    storage: Storage,
    orchestrator: Orch,
    prober: Prober,
    base_domain: String,
    readiness_poll_interval: Duration,
    readiness_deadline: Duration,
}

impl<Store, Storage, Orch, Prober> WorkspaceService<Store, Storage, Orch, Prober>
where
    Store: SessionStore,
    Storage: ObjectStorageAdapter,
    Orch: OrchestratorAdapter,
    Prober: ReadinessProber,
{
    pub fn new(store: Store, storage: Storage, orchestrator: Orch, prober: Prober, base_domain: impl Into<String>) -> Self {
        Self {
            store,
            storage,
            orchestrator,
            prober,
            base_domain: base_domain.into(),
            readiness_poll_interval: DEFAULT_READINESS_POLL_INTERVAL,
            readiness_deadline: DEFAULT_READINESS_DEADLINE,
        }
    }

    /// Overrides the readiness polling cadence; used by tests to avoid
    /// waiting the real 60s deadline.
    pub fn with_readiness_timing(mut self, poll_interval: Duration, deadline: Duration) -> Self {
        self.readiness_poll_interval = poll_interval;
        self.readiness_deadline = deadline;
        self
    }

    fn ingress_url(&self, id: &WorkspaceId) -> String {
        format!("https://{id}.{}", self.base_domain)
    }

    async fn authorize(&self, user: &Login, id: &WorkspaceId) -> Result<Workspace, CoreError> {
        let record = self.store.get(id).await.map_err(from_session_store)?;
        if &record.owner != user {
            return Err(CoreError::Forbidden);
        }
        Ok(record)
    }

    pub async fn create(&self, user: &Login, name: &str, template: &str) -> Result<Workspace, CoreError> {
        let existing = self.store.list_by_owner(user).await.map_err(from_session_store)?;
        if existing.len() as u32 >= PER_USER_CAP {
            return Err(CoreError::QuotaExceeded);
        }

        let id = WorkspaceId::generate();
        let src_prefix = format!("templates/{template}");
        let dst_prefix = format!("workspaces/{user}/{id}");

        self.storage.copy_prefix(&src_prefix, &dst_prefix).await.map_err(from_object_storage)?;

        if let Err(e) = self.store.create(template, user, name, &id).await {
            // Template copy succeeded but the record failed to land: clean up
            // the orphaned tree and surface the original error (§4.5, §7).
            if let Err(cleanup_err) = self.storage.delete_prefix(&dst_prefix).await {
                tracing::warn!(%id, error = %cleanup_err, "compensating delete_prefix failed after session-store create error, leaving orphaned tree");
            }
            return Err(from_session_store(e));
        }

        Ok(Workspace::new(id, name, user.clone(), template))
    }

    pub async fn list(&self, user: &Login) -> Result<Vec<Workspace>, CoreError> {
        let ids = self.store.list_by_owner(user).await.map_err(from_session_store)?;
        let mut workspaces = Vec::with_capacity(ids.len());
        for id in ids {
            match self.store.get(&id).await {
                Ok(workspace) => workspaces.push(workspace),
                Err(hatch_adapters::SessionStoreError::NotFound) => {
                    tracing::warn!(%id, "stale owner-index entry: record missing, skipping");
                }
                Err(e) => return Err(from_session_store(e)),
            }
        }
        Ok(workspaces)
    }

    pub async fn activate(&self, user: &Login, id: &WorkspaceId) -> Result<ActivateOutcome, CoreError> {
        let record = self.authorize(user, id).await?;

        self.store.set_active(id, true).await.map_err(from_session_store)?;
        self.orchestrator.provision(user, id, &record.template).await.map_err(from_orchestrator)?;

        let url = self.ingress_url(id);
        let ping_url = format!("{url}/{id}/ping");

        let deadline = tokio::time::Instant::now() + self.readiness_deadline;
        loop {
            if self.prober.is_ready(&ping_url).await {
                return Ok(ActivateOutcome { url, name: record.name });
            }
            if tokio::time::Instant::now() >= deadline {
                // The compute instance is left running; C10 reclaims it later.
                return Err(CoreError::NotReady);
            }
            tokio::time::sleep(self.readiness_poll_interval).await;
        }
    }

    pub async fn deactivate(&self, user: &Login, id: &WorkspaceId) -> Result<(), CoreError> {
        self.authorize(user, id).await?;
        self.store.set_active(id, false).await.map_err(from_session_store)?;
        self.orchestrator.deprovision(user, id).await.map_err(from_orchestrator)?;
        Ok(())
    }

    pub async fn delete(&self, user: &Login, id: &WorkspaceId) -> Result<(), CoreError> {
        let record = self.authorize(user, id).await?;

        if record.active {
            self.store.set_active(id, false).await.map_err(from_session_store)?;
            if let Err(e) = self.orchestrator.deprovision(user, id).await {
                tracing::warn!(%id, error = %e, "best-effort deprovision on delete failed, continuing");
            }
        }

        let prefix = format!("workspaces/{user}/{id}");
        self.storage.delete_prefix(&prefix).await.map_err(from_object_storage)?;
        self.store.delete(id).await.map_err(from_session_store)?;
        Ok(())
    }

    /// Callable by the Runtime Agent (§4.5): skips the ownership check
    /// because the caller is infrastructure, not an end user.
    pub async fn end_session(&self, id: &WorkspaceId) -> Result<(), CoreError> {
        let record = self.store.get(id).await.map_err(from_session_store)?;
        self.store.set_active(id, false).await.map_err(from_session_store)?;
        self.orchestrator.deprovision(&record.owner, id).await.map_err(from_orchestrator)?;
        Ok(())
    }

    /// Per-dependency health for `GET /ping` (§6). Each leg is probed
    /// independently so a single failing backend doesn't hide the others.
    pub async fn health(&self) -> HealthReport {
        HealthReport {
            session_store: self.store.ping().await.is_ok(),
            object_storage: self.storage.ping().await.is_ok(),
            orchestrator: self.orchestrator.check_status().await.is_ok(),
        }
    }
}

/// Result of a successful `activate`: the ingress URL and the workspace's
/// display name, matching §4.5's `replId`/`replName` response pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateOutcome {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct HealthReport {
    pub session_store: bool,
    pub object_storage: bool,
    pub orchestrator: bool,
}

impl HealthReport {
    pub fn all_ok(&self) -> bool {
        self.session_store && self.object_storage && self.orchestrator
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
