// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin HTTP client over the Control Plane's `/api/repl` surface (§4.5, §6).

use hatch_core::Workspace;
use serde::{Deserialize, Serialize};

const SESSION_COOKIE: &str = "hatch_session";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActivateResult {
    #[serde(rename = "replId")]
    pub repl_id: String,
    #[serde(rename = "replName")]
    pub repl_name: String,
}

pub struct HatchClient {
    http: reqwest::Client,
    base_url: String,
}

impl HatchClient {
    /// `session` is the value of the `hatch_session` cookie issued by the
    /// Auth Service (§4.4); the CLI is an operator tool, not a browser, so it
    /// carries the cookie explicitly rather than going through OAuth itself.
    pub fn new(base_url: String, session: &str) -> Result<Self, ClientError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let cookie = format!("{SESSION_COOKIE}={session}");
        headers.insert(reqwest::header::COOKIE, reqwest::header::HeaderValue::from_str(&cookie).unwrap_or_else(|_| reqwest::header::HeaderValue::from_static("")));
        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self { http, base_url })
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body: serde_json::Value = resp.json().await.unwrap_or_default();
        let message = body.get("error").and_then(|v| v.as_str()).unwrap_or("request failed").to_string();
        Err(ClientError::Api { status, message })
    }

    pub async fn create_workspace(&self, repl_name: &str, template: &str) -> Result<Workspace, ClientError> {
        #[derive(Serialize)]
        struct Body<'a> {
            template: &'a str,
            #[serde(rename = "replName")]
            repl_name: &'a str,
        }
        let resp = self.http.post(format!("{}/api/repl/new", self.base_url)).json(&Body { template, repl_name }).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn list_workspaces(&self) -> Result<Vec<Workspace>, ClientError> {
        let resp = self.http.get(format!("{}/api/repl", self.base_url)).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn activate(&self, id: &str) -> Result<ActivateResult, ClientError> {
        let resp = self.http.get(format!("{}/api/repl/session/{id}", self.base_url)).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn deactivate(&self, id: &str) -> Result<(), ClientError> {
        let resp = self.http.delete(format!("{}/api/repl/session/{id}", self.base_url)).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn delete_workspace(&self, id: &str) -> Result<(), ClientError> {
        let resp = self.http.delete(format!("{}/api/repl/{id}", self.base_url)).send().await?;
        Self::check(resp).await?;
        Ok(())
    }
}
