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

//! Attachments of users and roles to a group.
//!
//! Both resources only track the membership list: changes are applied as
//! the difference between the prior and the planned sets.

use std::collections::{BTreeMap, BTreeSet};

use tf_provider::Diagnostics;
use tracing::{debug, info};

use crate::client::{Client, Result};
use crate::reconcile::{difference, Changes};
use crate::utils::{report, report_removed, set_items, string_set, DisplayJoinable, StringSet};

mod resource;
mod state;

pub use resource::GroupMembersResource;
pub use state::GroupMembersState;

/// Kind of members attached to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Users,
    Roles,
}

impl Membership {
    /// Attribute and request field holding the member ids.
    pub fn field(self) -> &'static str {
        match self {
            Membership::Users => "users",
            Membership::Roles => "roles",
        }
    }

    fn from_field(field: &str) -> Option<Self> {
        match field {
            "users" => Some(Membership::Users),
            "roles" => Some(Membership::Roles),
            _ => None,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Membership::Users => "Users",
            Membership::Roles => "Roles",
        }
    }

    fn entity(self) -> &'static str {
        match self {
            Membership::Users => "group users",
            Membership::Roles => "group roles",
        }
    }

    async fn call(self, client: &Client, group_id: &str, action: &str, ids: &[String]) -> Result<()> {
        let path = format!("v1/groups/{group_id}/{action}_{}", self.field());
        let body = BTreeMap::from([(self.field(), ids)]);
        debug!(group_id, action, members = %ids.iter().join_with(", "), "updating {}", self.entity());
        client.post_action(self.entity(), &path, &body).await
    }

    pub(crate) async fn add(self, client: &Client, group_id: &str, ids: &[String]) -> Result<()> {
        self.call(client, group_id, "add", ids).await
    }

    pub(crate) async fn remove(self, client: &Client, group_id: &str, ids: &[String]) -> Result<()> {
        self.call(client, group_id, "remove", ids).await
    }

    /// Members currently attached remotely.
    pub(crate) async fn current(self, client: &Client, group_id: &str) -> Result<Vec<String>> {
        let group = crate::group::api::get(client, group_id).await?;
        Ok(match self {
            Membership::Users => group.users,
            Membership::Roles => group.roles,
        })
    }

    /// Detach what is no longer wanted, then attach what is missing.
    pub(crate) async fn reconcile(
        self,
        client: &Client,
        group_id: &str,
        current: &BTreeSet<String>,
        desired: &BTreeSet<String>,
    ) -> Result<Changes> {
        let changes = difference(current, desired);
        if !changes.remove.is_empty() {
            self.remove(client, group_id, &changes.remove).await?;
        }
        if !changes.add.is_empty() {
            self.add(client, group_id, &changes.add).await?;
        }
        Ok(changes)
    }

    /// Remote members as a state set, `None` when the group is gone or unreadable.
    pub(crate) async fn read_members<'a>(
        self,
        diags: &mut Diagnostics,
        client: &Client,
        group_id: &str,
    ) -> Option<StringSet<'a>> {
        match self.current(client, group_id).await {
            Ok(members) => Some(string_set(members)),
            Err(err) if err.is_not_found() => {
                report_removed(diags, "group", group_id);
                None
            }
            Err(err) => {
                report(diags, format!("Failed to read {}", self.entity()), &err);
                None
            }
        }
    }

    pub(crate) async fn apply_changes(
        self,
        diags: &mut Diagnostics,
        client: &Client,
        group_id: &str,
        prior: &StringSet<'_>,
        planned: &StringSet<'_>,
    ) -> Option<()> {
        match self
            .reconcile(client, group_id, &set_items(prior), &set_items(planned))
            .await
        {
            Ok(changes) => {
                info!(
                    group_id,
                    added = changes.add.len(),
                    removed = changes.remove.len(),
                    "{} reconciled",
                    self.entity()
                );
                Some(())
            }
            Err(err) => {
                report(diags, format!("Failed to update {}", self.entity()), &err);
                None
            }
        }
    }

    /// Detach every member of the state; a group already deleted is not an error.
    pub(crate) async fn detach(
        self,
        diags: &mut Diagnostics,
        client: &Client,
        group_id: &str,
        members: &StringSet<'_>,
    ) -> Option<()> {
        let ids: Vec<String> = set_items(members).into_iter().collect();
        if ids.is_empty() {
            return Some(());
        }
        match self.remove(client, group_id, &ids).await {
            Ok(()) => Some(()),
            Err(err) if err.is_not_found() => Some(()),
            Err(err) => {
                report(diags, format!("Failed to detach {}", self.entity()), &err);
                None
            }
        }
    }
}
