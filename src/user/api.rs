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

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::client::{Client, Result};
use crate::merge_patch::MergePatch;

const ENTITY: &str = "user";
const PATH: &str = "v1/users";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct User {
    pub id: String,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct NewUser<'b> {
    pub given_name: &'b str,
    pub family_name: &'b str,
    pub email: &'b str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'b str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Default, Serialize)]
pub struct UserPatch<'b> {
    #[serde(skip_serializing_if = "MergePatch::is_absent")]
    pub given_name: MergePatch<Cow<'b, str>>,
    #[serde(skip_serializing_if = "MergePatch::is_absent")]
    pub family_name: MergePatch<Cow<'b, str>>,
    #[serde(skip_serializing_if = "MergePatch::is_absent")]
    pub phone: MergePatch<Cow<'b, str>>,
    #[serde(skip_serializing_if = "MergePatch::is_absent")]
    pub enabled: MergePatch<bool>,
    #[serde(skip_serializing_if = "MergePatch::is_absent")]
    pub tags: MergePatch<BTreeMap<String, Option<String>>>,
}

/// Merge patch turning the `prior` tags into the `planned` ones.
///
/// Objects are merged key by key, so a removed tag must be sent as `null`.
pub fn tags_patch(
    prior: &BTreeMap<String, String>,
    planned: &BTreeMap<String, String>,
) -> MergePatch<BTreeMap<String, Option<String>>> {
    let mut patch: BTreeMap<_, _> = planned
        .iter()
        .filter(|(key, value)| prior.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), Some(value.clone())))
        .collect();
    patch.extend(
        prior
            .keys()
            .filter(|key| !planned.contains_key(*key))
            .map(|key| (key.clone(), None)),
    );

    if patch.is_empty() {
        MergePatch::Absent
    } else {
        MergePatch::Value(patch)
    }
}

fn user_path(id: &str) -> String {
    format!("{PATH}/{id}")
}

pub async fn create(client: &Client, user: &NewUser<'_>) -> Result<User> {
    client.post_json(ENTITY, PATH, user).await
}

pub async fn get(client: &Client, id: &str) -> Result<User> {
    client.get_json(ENTITY, &user_path(id), None).await
}

pub async fn update(client: &Client, id: &str, patch: &UserPatch<'_>) -> Result<User> {
    client.patch_json(ENTITY, &user_path(id), patch).await
}

pub async fn delete(client: &Client, id: &str) -> Result<()> {
    client.delete_object(&user_path(id)).await
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::tests::{mount_token_endpoint, test_client};

    fn tags(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn removed_tags_are_nulled() {
        let patch = tags_patch(
            &tags(&[("team", "edge"), ("site", "paris")]),
            &tags(&[("team", "core"), ("site", "paris"), ("tier", "1")]),
        );
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"team": "core", "tier": "1"})
        );

        let patch = tags_patch(&tags(&[("team", "edge")]), &BTreeMap::new());
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"team": null}));
    }

    #[test]
    fn identical_tags_are_not_patched() {
        let current = tags(&[("team", "edge")]);
        assert!(tags_patch(&current, &current).is_absent());
    }

    #[tokio::test]
    async fn create_omits_unset_fields() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("POST"))
            .and(path("/v1/users"))
            .and(body_json(json!({
                "given_name": "Ada",
                "family_name": "Lovelace",
                "email": "ada@example.com",
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "usr-1",
                "given_name": "Ada",
                "family_name": "Lovelace",
                "email": "ada@example.com",
                "phone": null,
                "enabled": true,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let user = create(
            &client,
            &NewUser {
                given_name: "Ada",
                family_name: "Lovelace",
                email: "ada@example.com",
                phone: None,
                enabled: None,
                tags: BTreeMap::new(),
            },
        )
        .await
        .unwrap();

        assert_eq!(user.id, "usr-1");
        assert!(user.enabled);
        assert!(user.tags.is_empty());
    }
}
