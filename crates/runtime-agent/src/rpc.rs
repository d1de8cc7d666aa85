// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `FetchContent` RPC surface (§6): a single method, served on its own
//! TCP port, consumed by the model-assisted tooling server rather than the
//! browser.

use std::sync::Arc;

use tonic::{Request, Response, Status};

use crate::fs::{FilesystemOperator, FsError};

pub mod proto {
    tonic::include_proto!("hatch.agent.v1");
}

use proto::content_service_server::{ContentService, ContentServiceServer};
use proto::{FetchContentRequest, FetchContentResponse};

pub struct ContentServiceImpl {
    fs: Arc<FilesystemOperator>,
}

impl ContentServiceImpl {
    pub fn server(fs: Arc<FilesystemOperator>) -> ContentServiceServer<Self> {
        ContentServiceServer::new(Self { fs })
    }
}

#[tonic::async_trait]
impl ContentService for ContentServiceImpl {
    async fn fetch_content(&self, request: Request<FetchContentRequest>) -> Result<Response<FetchContentResponse>, Status> {
        let path = request.into_inner().path;
        match self.fs.fetch_content(&path).await {
            Ok(content) => Ok(Response::new(FetchContentResponse { content: content.into_bytes() })),
            Err(err @ FsError::NotFound(_)) => Err(Status::not_found(err.to_string())),
            Err(err @ FsError::InvalidPath(_)) => Err(Status::invalid_argument(err.to_string())),
            Err(err) => Err(Status::internal(err.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod tests;
