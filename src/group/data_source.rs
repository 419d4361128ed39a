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

use async_trait::async_trait;

use tf_provider::{AttributePath, DataSource, Diagnostics, Schema, ValueEmpty};

use crate::client::{Client, Result};
use crate::meta_provider::ClientHandle;
use crate::utils::report;

use super::api::{self, Group};
use super::state::GroupState;

#[derive(Debug, Default, Clone)]
pub struct GroupDataSource {
    client: ClientHandle,
}

impl GroupDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

/// Find a group by id, or by name among the expanded group list.
pub(crate) async fn lookup(
    client: &Client,
    id: Option<&str>,
    name: Option<&str>,
) -> Result<Option<Group>> {
    match (id, name) {
        (Some(id), _) => api::get(client, id).await.map(Some),
        (None, Some(name)) => Ok(api::list(client)
            .await?
            .into_iter()
            .find(|group| group.name == name)),
        (None, None) => Ok(None),
    }
}

#[async_trait]
impl DataSource for GroupDataSource {
    type State<'a> = GroupState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(GroupState::data_source_schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        if config.id.is_null() && config.name.is_null() {
            diags.root_error(
                "Missing group reference",
                "One of `id` or `name` must be set",
            );
        } else if !config.id.is_null() && !config.name.is_null() {
            diags.error_short(
                "`id` and `name` are mutually exclusive",
                AttributePath::new("name"),
            );
        }

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags).await?;

        let id = config.id.as_deref_option();
        let name = config.name.as_deref_option();
        match lookup(&client, id, name).await {
            Ok(Some(group)) => {
                let mut state = config.clone();
                state.apply(group);
                Some(state)
            }
            Ok(None) => {
                diags.root_error(
                    "Group not found",
                    format!("No group is named `{}`", name.unwrap_or_default()),
                );
                None
            }
            Err(err) => {
                report(diags, "Failed to read group", &err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tf_provider::Value;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::tests::{mount_token_endpoint, test_client};

    #[tokio::test]
    async fn lookup_by_name_scans_the_list() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/groups"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "grp-1", "name": "edge"},
                {"id": "grp-2", "name": "core"},
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server).await;

        let found = lookup(&client, None, Some("core")).await.unwrap();
        assert_eq!(found.map(|group| group.id).as_deref(), Some("grp-2"));

        let missing = lookup(&client, None, Some("lab")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn lookup_by_id_gets_the_group() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/groups/grp-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "grp-1", "name": "edge"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let found = lookup(&client, Some("grp-1"), None).await.unwrap().unwrap();

        let mut state = GroupState::default();
        state.apply(found);
        assert_eq!(state.name, Value::Value("edge".into()));
        assert!(state.description.is_null());
    }
}
