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

use tf_provider::{DataSource, Diagnostics, Schema, ValueEmpty};

use crate::meta_provider::ClientHandle;
use crate::utils::{report, require_non_empty};

use super::api;
use super::state::MetaportState;

#[derive(Debug, Default, Clone)]
pub struct MetaportDataSource {
    client: ClientHandle,
}

impl MetaportDataSource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for MetaportDataSource {
    type State<'a> = MetaportState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(MetaportState::data_source_schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        require_non_empty(diags, &config.id, "id");

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

        match api::get(&client, config.id.as_str()).await {
            Ok(metaport) => {
                let mut state = config;
                state.apply(metaport);
                Some(state)
            }
            Err(err) => {
                report(diags, "Failed to read metaport", &err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use serde_json::json;
    use tf_provider::Value;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::tests::{mount_token_endpoint, test_client};
    use crate::utils::set_items;

    #[tokio::test]
    async fn read_fills_computed_attributes() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/metaports/mp-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "mp-1",
                "name": "paris",
                "enabled": true,
                "allow_support": true,
                "mapped_elements": ["ne-1"],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let handle = ClientHandle::default();
        handle.set(test_client(&server).await).await;
        let data_source = MetaportDataSource::new(handle);

        let config = MetaportState {
            id: Value::Value(Cow::Borrowed("mp-1")),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        let state = data_source
            .read(&mut diags, config, Default::default())
            .await
            .unwrap();

        assert_eq!(state.name.as_str(), "paris");
        assert_eq!(state.allow_support, Value::Value(true));
        assert_eq!(set_items(&state.mapped_elements).len(), 1);
    }

    #[tokio::test]
    async fn missing_metaport_is_an_error() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;

        let handle = ClientHandle::default();
        handle.set(test_client(&server).await).await;
        let data_source = MetaportDataSource::new(handle);

        let config = MetaportState {
            id: Value::Value(Cow::Borrowed("mp-404")),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        let state = data_source
            .read(&mut diags, config, Default::default())
            .await;

        assert!(state.is_none());
        assert_eq!(diags.errors.len(), 1);
    }
}
