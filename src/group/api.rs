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

use serde::{Deserialize, Serialize};

use crate::client::{Client, Result};
use crate::merge_patch::MergePatch;

const ENTITY: &str = "group";
const PATH: &str = "v1/groups";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(default)]
    pub provisioned_by: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub users: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NewGroup<'b> {
    pub name: &'b str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'b str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<&'b str>,
}

#[derive(Debug, Default, Serialize)]
pub struct GroupPatch<'b> {
    #[serde(skip_serializing_if = "MergePatch::is_absent")]
    pub name: MergePatch<Cow<'b, str>>,
    #[serde(skip_serializing_if = "MergePatch::is_absent")]
    pub description: MergePatch<Cow<'b, str>>,
    #[serde(skip_serializing_if = "MergePatch::is_absent")]
    pub expression: MergePatch<Cow<'b, str>>,
}

fn group_path(id: &str) -> String {
    format!("{PATH}/{id}")
}

pub async fn create(client: &Client, group: &NewGroup<'_>) -> Result<Group> {
    client.post_json(ENTITY, PATH, group).await
}

pub async fn get(client: &Client, id: &str) -> Result<Group> {
    client.get_json(ENTITY, &group_path(id), None).await
}

/// All groups, with their members expanded.
pub async fn list(client: &Client) -> Result<Vec<Group>> {
    client
        .get_json("group list", PATH, Some(&[("expand", "true")]))
        .await
}

pub async fn update(client: &Client, id: &str, patch: &GroupPatch<'_>) -> Result<Group> {
    client.patch_json(ENTITY, &group_path(id), patch).await
}

pub async fn delete(client: &Client, id: &str) -> Result<()> {
    client.delete_object(&group_path(id)).await
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::tests::{mount_token_endpoint, test_client};

    #[tokio::test]
    async fn patch_only_sends_changed_fields() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("PATCH"))
            .and(path("/v1/groups/grp-1"))
            .and(header("content-type", "application/merge-patch+json"))
            .and(body_json(json!({"description": null, "expression": "tags.team == 'edge'"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "grp-1",
                "name": "edge",
                "expression": "tags.team == 'edge'",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let patch = GroupPatch {
            description: MergePatch::Null,
            expression: MergePatch::Value("tags.team == 'edge'".into()),
            ..Default::default()
        };
        let group = update(&client, "grp-1", &patch).await.unwrap();

        assert_eq!(group.description, None);
        assert!(group.users.is_empty());
    }

    #[tokio::test]
    async fn list_requests_expanded_groups() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/groups"))
            .and(query_param("expand", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "grp-1", "name": "edge", "users": ["usr-1"]},
                {"id": "grp-2", "name": "core", "roles": ["rol-1"]},
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let groups = list(&client).await.unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].users, ["usr-1"]);
        assert_eq!(groups[1].roles, ["rol-1"]);
    }
}
