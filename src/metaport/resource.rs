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

use async_trait::async_trait;

use tf_provider::value::{Value, ValueEmpty, ValueString};
use tf_provider::{schema::Schema, AttributePath, Diagnostics, Resource};

use crate::merge_patch::MergePatch;
use crate::meta_provider::ClientHandle;
use crate::utils::{report, report_removed, set_items, WithSchema, WithValidate};

use super::api::{self, MetaportPatch, NewMetaport};
use super::state::MetaportState;

#[derive(Debug, Default, Clone)]
pub struct MetaportResource {
    client: ClientHandle,
}

impl MetaportResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for MetaportResource {
    type State<'a> = MetaportState<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(MetaportState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        config.validate(diags, AttributePath::default());

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags).await?;

        match api::get(&client, state.id.as_str()).await {
            Ok(metaport) => {
                let mut state = state;
                state.apply(metaport);
                Some((state, private_state))
            }
            Err(err) if err.is_not_found() => {
                report_removed(diags, "metaport", state.id.as_str());
                None
            }
            Err(err) => {
                report(diags, "Failed to read metaport", &err);
                None
            }
        }
    }

    async fn plan_create<'a>(
        &self,
        _diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = proposed_state;
        state.id = ValueString::Unknown;
        state.allow_support = Value::Unknown;
        if state.enabled.is_null() {
            state.enabled = Value::Unknown;
        }

        Some((state, Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(
        Self::State<'a>,
        Self::PrivateState<'a>,
        Vec<AttributePath>,
    )> {
        let mut state = proposed_state;
        state.id = prior_state.id;
        state.allow_support = prior_state.allow_support;

        Some((state, prior_private_state, Vec::new()))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        _prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        Some(())
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags).await?;

        let body = NewMetaport {
            name: planned_state.name.as_str(),
            description: planned_state.description.as_deref_option(),
            enabled: match planned_state.enabled {
                Value::Value(enabled) => Some(enabled),
                _ => None,
            },
        };
        let elements: Vec<String> = set_items(&planned_state.mapped_elements)
            .into_iter()
            .collect();

        match api::create_with_elements(&client, &body, &elements).await {
            Ok(metaport) => {
                let mut state = planned_state.clone();
                state.apply(metaport);
                Some((state, private_state))
            }
            Err(err) => {
                report(diags, "Failed to create metaport", &err);
                None
            }
        }
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags).await?;
        let id = prior_state.id.as_str();

        let patch = MetaportPatch {
            name: MergePatch::changed(&prior_state.name, planned_state.name.clone()),
            description: MergePatch::changed(
                &prior_state.description,
                planned_state.description.clone(),
            ),
            enabled: MergePatch::changed(&prior_state.enabled, planned_state.enabled.clone()),
        };
        let mut metaport = match api::update(&client, id, &patch).await {
            Ok(metaport) => metaport,
            Err(err) => {
                report(diags, "Failed to update metaport", &err);
                return None;
            }
        };

        let desired = set_items(&planned_state.mapped_elements);
        if let Err(err) = api::reconcile_mapped_elements(
            &client,
            id,
            &set_items(&prior_state.mapped_elements),
            &desired,
        )
        .await
        {
            report(diags, "Failed to update metaport mapped elements", &err);
            return None;
        }
        metaport.mapped_elements = desired.into_iter().collect();

        let mut state = planned_state;
        state.apply(metaport);
        Some((state, private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let client = self.client.get(diags).await?;

        match api::delete(&client, state.id.as_str()).await {
            Ok(()) => Some(()),
            Err(err) if err.is_not_found() => Some(()),
            Err(err) => {
                report(diags, "Failed to delete metaport", &err);
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = MetaportState {
            id: Value::Value(Cow::Owned(id)),
            ..Default::default()
        };
        Some((state, Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::tests::{mount_token_endpoint, test_client};
    use crate::utils::string_set;

    #[tokio::test]
    async fn update_patches_then_remaps() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("PATCH"))
            .and(path("/v1/metaports/mp-1"))
            .and(body_json(json!({"description": null})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "mp-1",
                "name": "paris",
                "enabled": true,
                "mapped_elements": ["ne-1"],
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/metaports/mp-1/add_mapped_elements"))
            .and(body_json(json!({"mapped_elements": ["ne-2"]})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let handle = ClientHandle::default();
        handle.set(test_client(&server).await).await;
        let resource = MetaportResource::new(handle);

        let prior = MetaportState {
            id: Value::Value(Cow::Borrowed("mp-1")),
            name: Value::Value(Cow::Borrowed("paris")),
            description: Value::Value(Cow::Borrowed("edge site")),
            enabled: Value::Value(true),
            allow_support: Value::Value(false),
            mapped_elements: string_set(vec!["ne-1".to_owned()]),
        };
        let planned = MetaportState {
            description: Value::Null,
            mapped_elements: string_set(vec!["ne-1".to_owned(), "ne-2".to_owned()]),
            ..prior.clone()
        };

        let mut diags = Diagnostics::default();
        let (state, _) = resource
            .update(
                &mut diags,
                prior,
                planned.clone(),
                planned.clone(),
                Default::default(),
                Default::default(),
            )
            .await
            .unwrap();

        assert_eq!(state, planned);
    }

    #[tokio::test]
    async fn failed_create_reports_the_mapping_error() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("POST"))
            .and(path("/v1/metaports"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"id": "mp-1", "name": "paris"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/metaports/mp-1/add_mapped_elements"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v1/metaports/mp-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let handle = ClientHandle::default();
        handle.set(test_client(&server).await).await;
        let resource = MetaportResource::new(handle);

        let planned = MetaportState {
            name: Value::Value(Cow::Borrowed("paris")),
            mapped_elements: string_set(vec!["ne-9".to_owned()]),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        let created = resource
            .create(
                &mut diags,
                planned.clone(),
                planned,
                Default::default(),
                Default::default(),
            )
            .await;

        assert!(created.is_none());
        assert_eq!(diags.errors.len(), 1);
    }
}
