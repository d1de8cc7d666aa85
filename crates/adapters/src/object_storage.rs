// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Object Storage Adapter (C2): template copy, workspace delete, health
//! probe. Failures are `Transient` (retryable) or `Permanent`.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStorageError {
    #[error("transient failure, retry advised: {0}")]
    Transient(String),

    #[error("permanent failure: {0}")]
    Permanent(String),
}

#[async_trait]
pub trait ObjectStorageAdapter: Clone + Send + Sync + 'static {
    /// Recursive copy of a template tree to a workspace tree.
    async fn copy_prefix(&self, src_prefix: &str, dst_prefix: &str) -> Result<(), ObjectStorageError>;

    /// Recursive delete of a workspace tree. Idempotent: deleting an
    /// already-empty or nonexistent prefix succeeds.
    async fn delete_prefix(&self, prefix: &str) -> Result<(), ObjectStorageError>;

    async fn ping(&self) -> Result<(), ObjectStorageError>;
}

pub mod s3 {
    use super::*;
    use opendal::{Operator, services::S3};

    #[derive(Clone)]
    pub struct S3ObjectStorageAdapter {
        op: Operator,
    }

    impl S3ObjectStorageAdapter {
        pub fn new(bucket: &str, region: &str, endpoint: Option<&str>) -> Result<Self, ObjectStorageError> {
            let mut builder = S3::default().bucket(bucket).region(region);
            if let Some(endpoint) = endpoint {
                builder = builder.endpoint(endpoint);
            }
            let op = Operator::new(builder)
                .map_err(|e| ObjectStorageError::Permanent(e.to_string()))?
                .finish();
            Ok(Self { op })
        }
    }

    #[async_trait]
    impl ObjectStorageAdapter for S3ObjectStorageAdapter {
        async fn copy_prefix(&self, src_prefix: &str, dst_prefix: &str) -> Result<(), ObjectStorageError> {
            let src_prefix = normalize_prefix(src_prefix);
            let dst_prefix = normalize_prefix(dst_prefix);

            let mut lister = self
                .op
                .lister_with(&src_prefix)
                .recursive(true)
                .await
                .map_err(classify)?;

            use futures_util::TryStreamExt;
            while let Some(entry) = lister.try_next().await.map_err(classify)? {
                let path = entry.path();
                if path.ends_with('/') {
                    continue;
                }
                let relative = path.strip_prefix(&src_prefix).unwrap_or(path);
                let dst_path = format!("{dst_prefix}{relative}");
                self.op.copy(path, &dst_path).await.map_err(classify)?;
            }
            Ok(())
        }

        async fn delete_prefix(&self, prefix: &str) -> Result<(), ObjectStorageError> {
            let prefix = normalize_prefix(prefix);
            self.op.remove_all(&prefix).await.map_err(classify)
        }

        async fn ping(&self) -> Result<(), ObjectStorageError> {
            self.op.check().await.map_err(classify)
        }
    }

    fn normalize_prefix(prefix: &str) -> String {
        if prefix.ends_with('/') {
            prefix.to_string()
        } else {
            format!("{prefix}/")
        }
    }

    fn classify(err: opendal::Error) -> ObjectStorageError {
        use opendal::ErrorKind;
        match err.kind() {
            ErrorKind::RateLimited | ErrorKind::Unexpected => ObjectStorageError::Transient(err.to_string()),
            _ => ObjectStorageError::Permanent(err.to_string()),
        }
    }
}

pub use s3::S3ObjectStorageAdapter;

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub struct FakeObjectStorageAdapter {
        prefixes: Arc<Mutex<HashSet<String>>>,
    }

    impl FakeObjectStorageAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn contains(&self, prefix: &str) -> bool {
            self.prefixes.lock().contains(prefix)
        }
    }

    #[async_trait]
    impl ObjectStorageAdapter for FakeObjectStorageAdapter {
        async fn copy_prefix(&self, _src_prefix: &str, dst_prefix: &str) -> Result<(), ObjectStorageError> {
            self.prefixes.lock().insert(dst_prefix.to_string());
            Ok(())
        }

        async fn delete_prefix(&self, prefix: &str) -> Result<(), ObjectStorageError> {
            self.prefixes.lock().remove(prefix);
            Ok(())
        }

        async fn ping(&self) -> Result<(), ObjectStorageError> {
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "object_storage_tests.rs"]
mod tests;
