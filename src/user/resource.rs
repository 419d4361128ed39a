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
use crate::utils::{map_items, report, report_removed, WithSchema, WithValidate};

use super::api::{self, NewUser, UserPatch};
use super::state::UserState;

#[derive(Debug, Default, Clone)]
pub struct UserResource {
    client: ClientHandle,
}

impl UserResource {
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }
}

fn known(value: &Value<bool>) -> Option<bool> {
    match value {
        Value::Value(value) => Some(*value),
        _ => None,
    }
}

#[async_trait]
impl Resource for UserResource {
    type State<'a> = UserState<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(UserState::schema())
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
            Ok(user) => {
                let mut state = state;
                state.apply(user);
                Some((state, private_state))
            }
            Err(err) if err.is_not_found() => {
                report_removed(diags, "user", state.id.as_str());
                None
            }
            Err(err) => {
                report(diags, "Failed to read user", &err);
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
        let mut trigger_replace = Vec::new();
        let mut state = proposed_state;
        if state.email != prior_state.email {
            trigger_replace.push(AttributePath::new("email"));
            state.id = ValueString::Unknown;
        } else {
            state.id = prior_state.id;
        }

        Some((state, prior_private_state, trigger_replace))
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

        let body = NewUser {
            given_name: planned_state.given_name.as_str(),
            family_name: planned_state.family_name.as_str(),
            email: planned_state.email.as_str(),
            phone: planned_state.phone.as_deref_option(),
            enabled: known(&planned_state.enabled),
            tags: map_items(&planned_state.tags),
        };

        match api::create(&client, &body).await {
            Ok(user) => {
                let mut state = planned_state.clone();
                state.apply(user);
                Some((state, private_state))
            }
            Err(err) => {
                report(diags, "Failed to create user", &err);
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

        let patch = UserPatch {
            given_name: MergePatch::changed(
                &prior_state.given_name,
                planned_state.given_name.clone(),
            ),
            family_name: MergePatch::changed(
                &prior_state.family_name,
                planned_state.family_name.clone(),
            ),
            phone: MergePatch::changed(&prior_state.phone, planned_state.phone.clone()),
            enabled: MergePatch::changed(&prior_state.enabled, planned_state.enabled.clone()),
            tags: api::tags_patch(
                &map_items(&prior_state.tags),
                &map_items(&planned_state.tags),
            ),
        };

        match api::update(&client, prior_state.id.as_str(), &patch).await {
            Ok(user) => {
                let mut state = planned_state;
                state.apply(user);
                Some((state, private_state))
            }
            Err(err) => {
                report(diags, "Failed to update user", &err);
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
                report(diags, "Failed to delete user", &err);
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = UserState {
            id: Value::Value(Cow::Owned(id)),
            ..Default::default()
        };
        Some((state, Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::client::tests::{mount_token_endpoint, test_client};

    fn prior() -> UserState<'static> {
        UserState {
            id: Value::Value(Cow::Borrowed("usr-1")),
            given_name: Value::Value(Cow::Borrowed("Ada")),
            family_name: Value::Value(Cow::Borrowed("Lovelace")),
            email: Value::Value(Cow::Borrowed("ada@example.com")),
            phone: Value::Value(Cow::Borrowed("+33100000000")),
            enabled: Value::Value(true),
            tags: Value::Value(
                [(Cow::Borrowed("team"), Value::Value(Cow::Borrowed("edge")))]
                    .into_iter()
                    .collect(),
            ),
        }
    }

    #[tokio::test]
    async fn update_clears_phone_and_removed_tags() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("PATCH"))
            .and(path("/v1/users/usr-1"))
            .and(header("content-type", "application/merge-patch+json"))
            .and(body_json(json!({
                "family_name": "Byron",
                "phone": null,
                "tags": {"team": null},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "usr-1",
                "given_name": "Ada",
                "family_name": "Byron",
                "email": "ada@example.com",
                "enabled": true,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let handle = ClientHandle::default();
        handle.set(test_client(&server).await).await;
        let resource = UserResource::new(handle);

        let planned = UserState {
            family_name: Value::Value(Cow::Borrowed("Byron")),
            phone: Value::Null,
            tags: Value::Null,
            ..prior()
        };
        let mut diags = Diagnostics::default();
        let (state, _) = resource
            .update(
                &mut diags,
                prior(),
                planned.clone(),
                planned,
                Default::default(),
                Default::default(),
            )
            .await
            .unwrap();

        assert_eq!(state.family_name.as_str(), "Byron");
        assert!(state.phone.is_null());
        assert!(state.tags.is_null());
    }

    #[tokio::test]
    async fn changing_the_email_replaces_the_user() {
        let resource = UserResource::default();
        let proposed = UserState {
            email: Value::Value(Cow::Borrowed("ada@lovelace.org")),
            ..prior()
        };

        let mut diags = Diagnostics::default();
        let (state, _, replace) = resource
            .plan_update(
                &mut diags,
                prior(),
                proposed.clone(),
                proposed,
                Default::default(),
                Default::default(),
            )
            .await
            .unwrap();

        assert_eq!(replace.len(), 1);
        assert!(state.id.is_unknown());
    }

    #[tokio::test]
    async fn deleted_user_is_dropped_from_state() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/users/usr-1"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let handle = ClientHandle::default();
        handle.set(test_client(&server).await).await;
        let resource = UserResource::new(handle);

        let mut diags = Diagnostics::default();
        let read = resource
            .read(&mut diags, prior(), Default::default(), Default::default())
            .await;

        assert!(read.is_none());
        assert!(diags.errors.is_empty());
        assert_eq!(diags.warnings.len(), 1);
    }
}
