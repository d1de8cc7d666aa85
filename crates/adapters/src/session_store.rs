// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Session Store (C1): the authoritative workspace directory.
//!
//! Schema (§6): hash key `workspace:<id>` with fields `{id,name,user,template,isActive}`;
//! set key `user:<login>` holding the owner's workspace ids.

use async_trait::async_trait;
use hatch_core::{Login, Workspace, WorkspaceId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("not found")]
    NotFound,

    /// The record exists but is missing its owner field — violates the
    /// store's own invariant (§4.1: "fails with Corrupt if record lacks owner").
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("session store unreachable: {0}")]
    Unreachable(String),
}

fn workspace_key(id: &WorkspaceId) -> String {
    format!("workspace:{id}")
}

fn owner_set_key(owner: &Login) -> String {
    format!("user:{owner}")
}

#[async_trait]
pub trait SessionStore: Clone + Send + Sync + 'static {
    /// Atomically write the record and insert the id into the owner's set.
    async fn create(&self, template: &str, owner: &Login, name: &str, id: &WorkspaceId) -> Result<(), SessionStoreError>;

    /// Read the record, remove the id from the owner's set, delete the record.
    async fn delete(&self, id: &WorkspaceId) -> Result<(), SessionStoreError>;

    async fn get(&self, id: &WorkspaceId) -> Result<Workspace, SessionStoreError>;

    /// May include ids whose records were subsequently deleted; callers skip
    /// missing records (§4.1).
    async fn list_by_owner(&self, owner: &Login) -> Result<Vec<WorkspaceId>, SessionStoreError>;

    /// Idempotent flag flip. Last-writer-wins under concurrent calls.
    async fn set_active(&self, id: &WorkspaceId, active: bool) -> Result<(), SessionStoreError>;

    async fn ping(&self) -> Result<(), SessionStoreError>;
}

pub mod redis_store {
    use super::*;
    use redis::aio::ConnectionManager;
    use redis::AsyncCommands;

    /// Redis-backed Session Store. Every write is a single Redis command or
    /// pipeline, matching the "all writes are single-operation" contract in
    /// §4.1 — there is no cross-key transaction.
    #[derive(Clone)]
    pub struct RedisSessionStore {
        manager: ConnectionManager,
    }

    impl RedisSessionStore {
        pub async fn connect(redis_url: &str) -> Result<Self, SessionStoreError> {
            let client = redis::Client::open(redis_url)
                .map_err(|e| SessionStoreError::Unreachable(e.to_string()))?;
            let manager = client
                .get_connection_manager()
                .await
                .map_err(|e| SessionStoreError::Unreachable(e.to_string()))?;
            Ok(Self { manager })
        }
    }

    #[async_trait]
    impl SessionStore for RedisSessionStore {
        async fn create(&self, template: &str, owner: &Login, name: &str, id: &WorkspaceId) -> Result<(), SessionStoreError> {
            let mut conn = self.manager.clone();
            let key = workspace_key(id);
            redis::pipe()
                .atomic()
                .hset(&key, "id", id.as_str())
                .hset(&key, "name", name)
                .hset(&key, "user", owner.as_str())
                .hset(&key, "template", template)
                .hset(&key, "isActive", false)
                .sadd(owner_set_key(owner), id.as_str())
                .query_async::<()>(&mut conn)
                .await
                .map_err(|e| SessionStoreError::Unreachable(e.to_string()))
        }

        async fn delete(&self, id: &WorkspaceId) -> Result<(), SessionStoreError> {
            let record = self.get(id).await?;
            let mut conn = self.manager.clone();
            let _: () = conn
                .srem(owner_set_key(&record.owner), id.as_str())
                .await
                .map_err(|e| SessionStoreError::Unreachable(e.to_string()))?;
            let _: () = conn
                .del(workspace_key(id))
                .await
                .map_err(|e| SessionStoreError::Unreachable(e.to_string()))?;
            Ok(())
        }

        async fn get(&self, id: &WorkspaceId) -> Result<Workspace, SessionStoreError> {
            let mut conn = self.manager.clone();
            let fields: std::collections::HashMap<String, String> = conn
                .hgetall(workspace_key(id))
                .await
                .map_err(|e| SessionStoreError::Unreachable(e.to_string()))?;
            if fields.is_empty() {
                return Err(SessionStoreError::NotFound);
            }
            let owner = fields
                .get("user")
                .ok_or_else(|| SessionStoreError::Corrupt(format!("{id} has no owner")))?;
            let name = fields.get("name").cloned().unwrap_or_default();
            let template = fields.get("template").cloned().unwrap_or_default();
            let active = fields.get("isActive").map(|v| v == "true" || v == "1").unwrap_or(false);
            Ok(Workspace {
                id: id.clone(),
                name,
                owner: Login::new(owner),
                template,
                active,
            })
        }

        async fn list_by_owner(&self, owner: &Login) -> Result<Vec<WorkspaceId>, SessionStoreError> {
            let mut conn = self.manager.clone();
            let ids: Vec<String> = conn
                .smembers(owner_set_key(owner))
                .await
                .map_err(|e| SessionStoreError::Unreachable(e.to_string()))?;
            Ok(ids.into_iter().map(WorkspaceId::from_string).collect())
        }

        async fn set_active(&self, id: &WorkspaceId, active: bool) -> Result<(), SessionStoreError> {
            let mut conn = self.manager.clone();
            let _: () = conn
                .hset(workspace_key(id), "isActive", active)
                .await
                .map_err(|e| SessionStoreError::Unreachable(e.to_string()))?;
            Ok(())
        }

        async fn ping(&self) -> Result<(), SessionStoreError> {
            let mut conn = self.manager.clone();
            redis::cmd("PING")
                .query_async::<String>(&mut conn)
                .await
                .map(|_| ())
                .map_err(|e| SessionStoreError::Unreachable(e.to_string()))
        }
    }
}

pub use redis_store::RedisSessionStore;

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub struct FakeSessionStore {
        inner: Arc<Mutex<Inner>>,
    }

    #[derive(Default)]
    struct Inner {
        records: HashMap<String, Workspace>,
        by_owner: HashMap<String, HashSet<String>>,
    }

    impl FakeSessionStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl SessionStore for FakeSessionStore {
        async fn create(&self, template: &str, owner: &Login, name: &str, id: &WorkspaceId) -> Result<(), SessionStoreError> {
            let mut inner = self.inner.lock();
            let record = Workspace::new(id.clone(), name, owner.clone(), template);
            inner.records.insert(id.as_str().to_string(), record);
            inner.by_owner.entry(owner.as_str().to_string()).or_default().insert(id.as_str().to_string());
            Ok(())
        }

        async fn delete(&self, id: &WorkspaceId) -> Result<(), SessionStoreError> {
            let mut inner = self.inner.lock();
            let record = inner.records.get(id.as_str()).cloned().ok_or(SessionStoreError::NotFound)?;
            if let Some(set) = inner.by_owner.get_mut(record.owner.as_str()) {
                set.remove(id.as_str());
            }
            inner.records.remove(id.as_str());
            Ok(())
        }

        async fn get(&self, id: &WorkspaceId) -> Result<Workspace, SessionStoreError> {
            self.inner.lock().records.get(id.as_str()).cloned().ok_or(SessionStoreError::NotFound)
        }

        async fn list_by_owner(&self, owner: &Login) -> Result<Vec<WorkspaceId>, SessionStoreError> {
            Ok(self
                .inner
                .lock()
                .by_owner
                .get(owner.as_str())
                .map(|set| set.iter().cloned().map(WorkspaceId::from_string).collect())
                .unwrap_or_default())
        }

        async fn set_active(&self, id: &WorkspaceId, active: bool) -> Result<(), SessionStoreError> {
            let mut inner = self.inner.lock();
            match inner.records.get_mut(id.as_str()) {
                Some(record) => {
                    record.active = active;
                    Ok(())
                }
                None => Err(SessionStoreError::NotFound),
            }
        }

        async fn ping(&self) -> Result<(), SessionStoreError> {
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "session_store_tests.rs"]
mod tests;
