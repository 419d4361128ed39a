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
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::{Client, Result};
use crate::merge_patch::MergePatch;
use crate::reconcile::{difference, Changes};
use crate::utils::DisplayJoinable;

const ENTITY: &str = "metaport";
const PATH: &str = "v1/metaports";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Metaport {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub allow_support: bool,
    #[serde(default)]
    pub mapped_elements: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NewMetaport<'b> {
    pub name: &'b str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'b str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
pub struct MetaportPatch<'b> {
    #[serde(skip_serializing_if = "MergePatch::is_absent")]
    pub name: MergePatch<Cow<'b, str>>,
    #[serde(skip_serializing_if = "MergePatch::is_absent")]
    pub description: MergePatch<Cow<'b, str>>,
    #[serde(skip_serializing_if = "MergePatch::is_absent")]
    pub enabled: MergePatch<bool>,
}

impl MetaportPatch<'_> {
    fn is_empty(&self) -> bool {
        self.name.is_absent() && self.description.is_absent() && self.enabled.is_absent()
    }
}

fn metaport_path(id: &str) -> String {
    format!("{PATH}/{id}")
}

async fn mapped_elements_action(
    client: &Client,
    id: &str,
    action: &str,
    elements: &[String],
) -> Result<()> {
    debug!(
        metaport = id,
        action,
        elements = %elements.iter().join_with(", "),
        "updating mapped elements"
    );
    let body = BTreeMap::from([("mapped_elements", elements)]);
    client
        .post_action(
            "metaport mapped elements",
            &format!("{}/{action}_mapped_elements", metaport_path(id)),
            &body,
        )
        .await
}

pub async fn add_mapped_elements(client: &Client, id: &str, elements: &[String]) -> Result<()> {
    mapped_elements_action(client, id, "add", elements).await
}

pub async fn remove_mapped_elements(client: &Client, id: &str, elements: &[String]) -> Result<()> {
    mapped_elements_action(client, id, "remove", elements).await
}

pub async fn create(client: &Client, metaport: &NewMetaport<'_>) -> Result<Metaport> {
    client.post_json(ENTITY, PATH, metaport).await
}

/// Create a metaport and map `elements` to it.
///
/// The metaport is deleted again when the elements cannot be mapped, so a
/// failed creation leaves nothing behind. A failing cleanup is only logged:
/// the mapping error is the one returned.
pub async fn create_with_elements(
    client: &Client,
    metaport: &NewMetaport<'_>,
    elements: &[String],
) -> Result<Metaport> {
    let mut created = create(client, metaport).await?;
    if elements.is_empty() {
        return Ok(created);
    }

    if let Err(err) = add_mapped_elements(client, &created.id, elements).await {
        if let Err(cleanup) = delete(client, &created.id).await {
            warn!(
                metaport = %created.id,
                error = %cleanup,
                "could not delete the metaport after failing to map its elements"
            );
        }
        return Err(err);
    }

    created.mapped_elements = elements.to_vec();
    Ok(created)
}

pub async fn get(client: &Client, id: &str) -> Result<Metaport> {
    client.get_json(ENTITY, &metaport_path(id), None).await
}

/// Patch the changed fields, the current metaport being fetched when nothing changed.
pub async fn update(client: &Client, id: &str, patch: &MetaportPatch<'_>) -> Result<Metaport> {
    if patch.is_empty() {
        get(client, id).await
    } else {
        client.patch_json(ENTITY, &metaport_path(id), patch).await
    }
}

/// Unmap what is no longer wanted, then map what is missing.
pub async fn reconcile_mapped_elements(
    client: &Client,
    id: &str,
    current: &BTreeSet<String>,
    desired: &BTreeSet<String>,
) -> Result<Changes> {
    let changes = difference(current, desired);
    if !changes.remove.is_empty() {
        remove_mapped_elements(client, id, &changes.remove).await?;
    }
    if !changes.add.is_empty() {
        add_mapped_elements(client, id, &changes.add).await?;
    }
    Ok(changes)
}

pub async fn delete(client: &Client, id: &str) -> Result<()> {
    client.delete_object(&metaport_path(id)).await
}
