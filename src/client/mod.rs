// This file is part of the terraform-provider-pfptmeta project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Authenticated client for the management API.
//!
//! The client owns the bearer token: it is fetched when the client is built,
//! and fetched again before any request once it gets within
//! [`token::REFRESH_MARGIN_SECS`] of its expiry. Requests are never retried.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, Response, StatusCode};
use tokio::sync::Mutex;
use tracing::{debug, info};

pub mod credentials;
pub mod error;
mod json;
pub mod token;

pub use credentials::{CredentialSource, Credentials};
pub use error::{ClientError, ErrorResponse, Result};

use token::{now_epoch, Token, TokenResponse, TokenState};

pub const BASE_URL_ENV: &str = "PFPTMETA_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.metanetworks.com";

const DEFAULT_USER_AGENT: &str = concat!("terraform-provider-pfptmeta/", env!("CARGO_PKG_VERSION"));

const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const JSON: &str = "application/json";
const MERGE_PATCH_JSON: &str = "application/merge-patch+json";

/// Query parameters appended to GET and DELETE requests.
pub type Query<'q> = [(&'q str, &'q str)];

#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
    credentials: Credentials,
    token: Mutex<Option<TokenState>>,
}

/// Builder for [`Client`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    source: CredentialSource,
    credentials: Option<Credentials>,
    base_url: Option<String>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Credentials as configured; resolved against the credentials file on build.
    pub fn credential_source(mut self, source: CredentialSource) -> Self {
        self.source = source;
        self
    }

    /// Already resolved credentials, bypassing the credentials file.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Override the base url, otherwise taken from `PFPTMETA_BASE_URL` or the default endpoint.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the client and acquire a first token, so bad credentials fail here.
    pub async fn build(self) -> Result<Client> {
        let credentials = match self.credentials {
            Some(credentials) => credentials,
            None => Credentials::resolve(self.source).await?,
        };

        let base_url = self
            .base_url
            .or_else(|| std::env::var(BASE_URL_ENV).ok().filter(|url| !url.is_empty()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::Build)?;

        let client = Client {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
            credentials,
            token: Mutex::new(None),
        };
        client.bearer().await?;

        Ok(client)
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute url of an api path such as `v1/groups`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request a new token from the authentication endpoint.
    async fn token_request(&self) -> Result<Token> {
        let url = self.url("v1/oauth/token");
        let body = serde_json::to_vec(&self.credentials.token_request()).map_err(|source| {
            ClientError::Serialize {
                entity: "credentials",
                source,
            }
        })?;

        let transport = |source| ClientError::Transport {
            method: Method::POST,
            url: url.clone(),
            source,
        };
        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, JSON)
            .header(USER_AGENT, &self.user_agent)
            .body(body)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport)?;

        if status != StatusCode::OK {
            return Err(ErrorResponse::from_body(&Method::POST, &url, status, &body).into());
        }

        let token: TokenResponse =
            serde_json::from_slice(&body).map_err(|source| ClientError::Deserialize {
                entity: "authentication",
                source,
            })?;
        Ok(token.into())
    }

    /// Authorization header value, refreshing the token first if it is
    /// missing or about to expire.
    ///
    /// The lock is held during the refresh: concurrent callers wait for the
    /// ongoing refresh instead of starting their own.
    async fn bearer(&self) -> Result<String> {
        let mut state = self.token.lock().await;
        if let Some(current) = state.as_ref() {
            if !current.needs_refresh(now_epoch()) {
                return Ok(current.token.bearer());
            }
        }

        let token = self.token_request().await?;
        let fresh = TokenState::new(token, now_epoch());
        info!(expires_in = fresh.token.expires_in, "acquired access token");
        let bearer = fresh.token.bearer();
        *state = Some(fresh);

        Ok(bearer)
    }

    /// Send an authenticated request to `path`.
    ///
    /// Statuses outside `200..=226` are turned into an [`ErrorResponse`].
    pub async fn send_request(
        &self,
        method: Method,
        path: &str,
        query: Option<&Query<'_>>,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        let bearer = self.bearer().await?;
        let url = self.url(path);

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(AUTHORIZATION, bearer)
            .header(USER_AGENT, &self.user_agent);
        if let Some(query) = query {
            builder = builder.query(query);
        }
        if method == Method::POST || method == Method::PUT {
            builder = builder.header(CONTENT_TYPE, JSON);
        } else if method == Method::PATCH {
            builder = builder.header(CONTENT_TYPE, MERGE_PATCH_JSON);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let request = builder.build().map_err(|source| ClientError::Transport {
            method: method.clone(),
            url: url.clone(),
            source,
        })?;
        let url = request.url().to_string();
        let transport = |source| ClientError::Transport {
            method: method.clone(),
            url: url.clone(),
            source,
        };

        debug!(%method, %url, "sending request");
        let response = self.http.execute(request).await.map_err(transport)?;
        let status = response.status();
        debug!(%method, %url, %status, "received response");

        if !(200..=226).contains(&status.as_u16()) {
            let body = response.bytes().await.map_err(transport)?;
            return Err(ErrorResponse::from_body(&method, &url, status, &body).into());
        }

        Ok(response)
    }

    pub async fn get(&self, path: &str, query: Option<&Query<'_>>) -> Result<Response> {
        self.send_request(Method::GET, path, query, None).await
    }

    pub async fn delete(&self, path: &str, query: Option<&Query<'_>>) -> Result<Response> {
        self.send_request(Method::DELETE, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: Vec<u8>) -> Result<Response> {
        self.send_request(Method::POST, path, None, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Vec<u8>) -> Result<Response> {
        self.send_request(Method::PUT, path, None, Some(body)).await
    }

    /// PATCH with a JSON merge patch body.
    pub async fn patch(&self, path: &str, body: Vec<u8>) -> Result<Response> {
        self.send_request(Method::PATCH, path, None, Some(body)).await
    }

    #[cfg(test)]
    pub(crate) async fn age_token(&self, seconds: i64) {
        if let Some(state) = self.token.lock().await.as_mut() {
            state.created_at -= seconds;
        }
    }
}
