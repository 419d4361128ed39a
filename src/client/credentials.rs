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

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::error::{ClientError, Result};

pub const API_KEY_ENV: &str = "PFPTMETA_API_KEY";
pub const API_SECRET_ENV: &str = "PFPTMETA_API_SECRET";
pub const ORG_SHORTNAME_ENV: &str = "PFPTMETA_ORG_SHORTNAME";

const CREDENTIALS_DIR: &str = ".pfptmeta";
const CREDENTIALS_FILE: &str = "credentials.json";

/// Key/secret/org triple as given by the user, each part possibly missing.
#[derive(Debug, Clone, Default)]
pub struct CredentialSource {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub org_shortname: Option<String>,
}

impl CredentialSource {
    /// Fill the parts left empty by the configuration from the environment.
    pub fn with_env_fallback(mut self) -> Self {
        fn env(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|value| !value.is_empty())
        }
        self.api_key = self.api_key.or_else(|| env(API_KEY_ENV));
        self.api_secret = self.api_secret.or_else(|| env(API_SECRET_ENV));
        self.org_shortname = self.org_shortname.or_else(|| env(ORG_SHORTNAME_ENV));
        self
    }

    fn is_empty(&self) -> bool {
        self.api_key.is_none() && self.api_secret.is_none() && self.org_shortname.is_none()
    }
}

/// Shape of `~/.pfptmeta/credentials.json`.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    api_key: String,
    api_secret: String,
    org_shortname: String,
}

/// Resolved credentials, immutable once the client is built.
#[derive(Debug)]
pub struct Credentials {
    pub(crate) grant_type: String,
    pub(crate) scope: String,
    pub(crate) client_id: String,
    pub(crate) client_secret: SecretString,
}

/// Body of the token request.
#[derive(Serialize)]
pub(crate) struct TokenRequest<'a> {
    grant_type: &'a str,
    scope: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

impl Credentials {
    pub fn new(api_key: String, api_secret: String, org_shortname: &str) -> Self {
        Self {
            grant_type: "client_credentials".to_owned(),
            scope: format!("org:{org_shortname}"),
            client_id: api_key,
            client_secret: SecretString::from(api_secret),
        }
    }

    /// Resolve credentials from an explicit triple, or from the default credentials file.
    pub async fn resolve(source: CredentialSource) -> Result<Self> {
        if source.is_empty() {
            Self::from_file(&default_credentials_path()?).await
        } else {
            Self::from_explicit(source)
        }
    }

    /// Same as [`Credentials::resolve`] with an explicit credentials file location.
    pub async fn resolve_with_file(source: CredentialSource, path: &Path) -> Result<Self> {
        if source.is_empty() {
            Self::from_file(path).await
        } else {
            Self::from_explicit(source)
        }
    }

    fn from_explicit(source: CredentialSource) -> Result<Self> {
        match source {
            CredentialSource {
                api_key: Some(api_key),
                api_secret: Some(api_secret),
                org_shortname: Some(org_shortname),
            } => Ok(Self::new(api_key, api_secret, &org_shortname)),
            _ => Err(ClientError::IncompleteCredentials),
        }
    }

    async fn from_file(path: &Path) -> Result<Self> {
        let content =
            tokio::fs::read(path)
                .await
                .map_err(|source| ClientError::CredentialsFile {
                    path: path.to_owned(),
                    source,
                })?;
        let file: CredentialsFile =
            serde_json::from_slice(&content).map_err(|source| ClientError::CredentialsFormat {
                path: path.to_owned(),
                source,
            })?;
        Ok(Self::new(file.api_key, file.api_secret, &file.org_shortname))
    }

    pub(crate) fn token_request(&self) -> TokenRequest<'_> {
        TokenRequest {
            grant_type: &self.grant_type,
            scope: &self.scope,
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret(),
        }
    }
}

pub fn default_credentials_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(ClientError::NoHomeDirectory)?;
    Ok(home.join(CREDENTIALS_DIR).join(CREDENTIALS_FILE))
}
