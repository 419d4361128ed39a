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
use crate::utils::{report, report_removed, WithSchema, WithValidate};

use super::api::{self, GroupPatch, NewGroup};
use super::state::GroupState;

#[derive(Debug, Default, Clone)]
pub struct GroupResource {
    client: ClientHandle,
}

impl GroupResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for GroupResource {
    type State<'a> = GroupState<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(GroupState::schema())
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
            Ok(group) => {
                let mut state = state;
                state.apply(group);
                Some((state, private_state))
            }
            Err(err) if err.is_not_found() => {
                report_removed(diags, "group", state.id.as_str());
                None
            }
            Err(err) => {
                report(diags, "Failed to read group", &err);
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
        state.provisioned_by = ValueString::Unknown;
        state.roles = Value::Unknown;
        state.users = Value::Unknown;

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
        Vec<tf_provider::AttributePath>,
    )> {
        let mut state = proposed_state;
        state.id = prior_state.id;
        state.provisioned_by = prior_state.provisioned_by;
        state.roles = prior_state.roles;
        state.users = prior_state.users;

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

        let body = NewGroup {
            name: planned_state.name.as_str(),
            description: planned_state.description.as_deref_option(),
            expression: planned_state.expression.as_deref_option(),
        };

        match api::create(&client, &body).await {
            Ok(group) => {
                let mut state = planned_state.clone();
                state.apply(group);
                Some((state, private_state))
            }
            Err(err) => {
                report(diags, "Failed to create group", &err);
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

        let patch = GroupPatch {
            name: MergePatch::changed(&prior_state.name, planned_state.name.clone()),
            description: MergePatch::changed(
                &prior_state.description,
                planned_state.description.clone(),
            ),
            expression: MergePatch::changed(
                &prior_state.expression,
                planned_state.expression.clone(),
            ),
        };

        match api::update(&client, prior_state.id.as_str(), &patch).await {
            Ok(group) => {
                let mut state = planned_state;
                state.apply(group);
                Some((state, private_state))
            }
            Err(err) => {
                report(diags, "Failed to update group", &err);
                None
            }
        }
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
                report(diags, "Failed to delete group", &err);
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = GroupState {
            id: Value::Value(Cow::Owned(id)),
            ..Default::default()
        };
        Some((state, Default::default()))
    }
}
