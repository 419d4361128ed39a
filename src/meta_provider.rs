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

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use tf_provider::value::{Value, ValueString};
use tf_provider::{
    map, AttributeConstraint, AttributePath, AttributeType, Block, Description, Diagnostics,
    Provider, Schema,
};

use crate::client::{Client, CredentialSource};
use crate::group::{GroupDataSource, GroupResource};
use crate::group_members::{GroupMembersResource, Membership};
use crate::metaport::{MetaportDataSource, MetaportResource};
use crate::user::UserResource;
use crate::utils::{attribute, report};

/// Client shared between the provider and its resources, set on `configure`.
#[derive(Debug, Default, Clone)]
pub struct ClientHandle(Arc<RwLock<Option<Arc<Client>>>>);

impl ClientHandle {
    pub async fn get(&self, diags: &mut Diagnostics) -> Option<Arc<Client>> {
        let client = self.0.read().await.clone();
        if client.is_none() {
            diags.root_error(
                "Provider is not configured",
                "The API client has not been created: the provider configuration was not applied.",
            );
        }
        client
    }

    pub async fn set(&self, client: Client) {
        *self.0.write().await = Some(Arc::new(client));
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig<'a> {
    #[serde(borrow = "'a")]
    pub api_key: ValueString<'a>,
    pub api_secret: ValueString<'a>,
    pub org_shortname: ValueString<'a>,
}

impl ProviderConfig<'_> {
    fn credential_source(&self) -> CredentialSource {
        let known = |value: &ValueString| {
            value
                .as_deref_option()
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };
        CredentialSource {
            api_key: known(&self.api_key),
            api_secret: known(&self.api_secret),
            org_shortname: known(&self.org_shortname),
        }
        .with_env_fallback()
    }
}

#[derive(Debug, Default, Clone)]
pub struct MetaProvider {
    client: ClientHandle,
}

#[async_trait]
impl Provider for MetaProvider {
    type Config<'a> = ProviderConfig<'a>;
    type MetaState<'a> = tf_provider::ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        let mut api_secret = attribute(
            AttributeType::String,
            "API secret. Can also be set with the PFPTMETA_API_SECRET environment variable.",
            AttributeConstraint::Optional,
        );
        api_secret.sensitive = true;

        Some(Schema {
            version: 1,
            block: Block {
                description: Description::plain(
                    "Proofpoint Meta management API. Without any credential, they are read from ~/.pfptmeta/credentials.json",
                ),
                attributes: map! {
                    "api_key" => attribute(
                        AttributeType::String,
                        "API key. Can also be set with the PFPTMETA_API_KEY environment variable.",
                        AttributeConstraint::Optional,
                    ),
                    "api_secret" => api_secret,
                    "org_shortname" => attribute(
                        AttributeType::String,
                        "Organization short name. Can also be set with the PFPTMETA_ORG_SHORTNAME environment variable.",
                        AttributeConstraint::Optional,
                    ),
                },
                ..Default::default()
            },
        })
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::Config<'a>) -> Option<()> {
        for (name, value) in [
            ("api_key", &config.api_key),
            ("api_secret", &config.api_secret),
            ("org_shortname", &config.org_shortname),
        ] {
            if let Value::Value(value) = value {
                if value.is_empty() {
                    diags.error_short(format!("`{name}` must not be empty"), AttributePath::new(name));
                }
            }
        }

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        let user_agent = format!(
            "terraform-provider-pfptmeta/{} (terraform {terraform_version})",
            env!("CARGO_PKG_VERSION")
        );

        match Client::builder()
            .credential_source(config.credential_source())
            .user_agent(user_agent)
            .build()
            .await
        {
            Ok(client) => {
                info!(base_url = client.base_url(), "provider configured");
                self.client.set(client).await;
                Some(())
            }
            Err(err) => {
                report(diags, "Unable to create the API client", &err);
                None
            }
        }
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<std::collections::HashMap<String, Box<dyn tf_provider::resource::DynamicResource>>>
    {
        Some(map! {
            "group"       => GroupResource::new(self.client.clone()),
            "group_users" => GroupMembersResource::new(Membership::Users, self.client.clone()),
            "group_roles" => GroupMembersResource::new(Membership::Roles, self.client.clone()),
            "user"        => UserResource::new(self.client.clone()),
            "metaport"    => MetaportResource::new(self.client.clone()),
        })
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<
        std::collections::HashMap<String, Box<dyn tf_provider::data_source::DynamicDataSource>>,
    > {
        Some(map! {
            "group"    => GroupDataSource::new(self.client.clone()),
            "metaport" => MetaportDataSource::new(self.client.clone()),
        })
    }
}
