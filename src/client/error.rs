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

use std::path::PathBuf;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Deserializer};

/// Body of a non-2xx API response, annotated with the request that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("{method} request to {url} failed with status code {status}: {title} - {detail}")]
pub struct ErrorResponse {
    #[serde(skip)]
    pub url: String,
    #[serde(skip)]
    pub method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub detail: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: u16,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub error_type: String,
}

/// `null` fields of the error document read as their empty value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ErrorResponse {
    /// Build the error from a raw response body.
    ///
    /// Bodies that are not the JSON error document (proxies answering with html,
    /// empty bodies) keep the HTTP status, the canonical reason as title and
    /// the raw text as detail.
    pub(crate) fn from_body(method: &Method, url: &str, status: StatusCode, body: &[u8]) -> Self {
        let mut error = serde_json::from_slice::<ErrorResponse>(body).unwrap_or_else(|_| Self {
            title: status.canonical_reason().unwrap_or_default().to_owned(),
            detail: String::from_utf8_lossy(body).trim().to_owned(),
            ..Default::default()
        });
        if error.status == 0 {
            error.status = status.as_u16();
        }
        error.method = method.to_string();
        error.url = url.to_owned();
        error
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("please provide an api_key, api_secret and org shortname")]
    IncompleteCredentials,

    #[error("could not locate the home directory to read the credentials file")]
    NoHomeDirectory,

    #[error("could not read credentials file {}: {source}", .path.display())]
    CredentialsFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse credentials file {}: {source}", .path.display())]
    CredentialsFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("could not build http client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("failed to execute {method} request to {url}: {source}")]
    Transport {
        method: Method,
        url: String,
        source: reqwest::Error,
    },

    #[error(transparent)]
    Api(#[from] ErrorResponse),

    #[error("could not convert {entity} to json: {source}")]
    Serialize {
        entity: &'static str,
        source: serde_json::Error,
    },

    #[error("could not parse {entity} response: {source}")]
    Deserialize {
        entity: &'static str,
        source: serde_json::Error,
    },
}

impl ClientError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(response) => Some(response.status),
            _ => None,
        }
    }

    /// The remote object does not exist (anymore).
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
