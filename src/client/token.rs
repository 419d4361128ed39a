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

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Tokens expiring within this many seconds are refreshed before use.
pub const REFRESH_MARGIN_SECS: i64 = 30;

/// Authentication response body.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    token_type: String,
}

/// Bearer token currently held by a client.
#[derive(Debug)]
pub struct Token {
    access_token: SecretString,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<TokenResponse> for Token {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: SecretString::from(response.access_token),
            expires_in: response.expires_in,
            token_type: response.token_type,
        }
    }
}

impl Token {
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }
}

/// Token together with the epoch second it was received at.
///
/// Both are only ever replaced together, under the client token lock.
#[derive(Debug)]
pub(crate) struct TokenState {
    pub(crate) token: Token,
    pub(crate) created_at: i64,
}

impl TokenState {
    pub(crate) fn new(token: Token, created_at: i64) -> Self {
        Self { token, created_at }
    }

    /// Seconds left before expiry at `now`.
    pub(crate) fn remaining(&self, now: i64) -> i64 {
        self.created_at
            .saturating_add(self.token.expires_in)
            .saturating_sub(now)
    }

    pub(crate) fn needs_refresh(&self, now: i64) -> bool {
        self.remaining(now) < REFRESH_MARGIN_SECS
    }
}

pub(crate) fn now_epoch() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}
