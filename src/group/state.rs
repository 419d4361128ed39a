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
use tf_provider::value::{Value, ValueString};
use tf_provider::{map, AttributeConstraint, AttributePath, AttributeType, Block, Description};
use tf_provider::{Diagnostics, Schema};

use crate::utils::{
    attribute, optional_string, require_non_empty, string_set, string_set_type, StringSet,
    WithSchema, WithValidate,
};

use super::api::Group;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub description: ValueString<'a>,
    pub expression: ValueString<'a>,
    pub provisioned_by: ValueString<'a>,
    pub roles: StringSet<'a>,
    pub users: StringSet<'a>,
}

impl<'a> GroupState<'a> {
    /// Overwrite every attribute with the remote group.
    pub fn apply(&mut self, group: Group) {
        self.id = Value::Value(Cow::Owned(group.id));
        self.name = Value::Value(Cow::Owned(group.name));
        self.description = optional_string(group.description);
        self.expression = optional_string(group.expression);
        self.provisioned_by = optional_string(group.provisioned_by);
        self.roles = string_set(group.roles);
        self.users = string_set(group.users);
    }

    pub fn data_source_schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Look up a group by id or by name"),
                attributes: map! {
                    "id" => attribute(AttributeType::String, "Group id", AttributeConstraint::OptionalComputed),
                    "name" => attribute(AttributeType::String, "Group name", AttributeConstraint::OptionalComputed),
                    "description" => attribute(AttributeType::String, "Description", AttributeConstraint::Computed),
                    "expression" => attribute(AttributeType::String, "Expression selecting the group members", AttributeConstraint::Computed),
                    "provisioned_by" => attribute(AttributeType::String, "Identity provider that provisioned the group", AttributeConstraint::Computed),
                    "roles" => attribute(string_set_type(), "Roles attached to the group", AttributeConstraint::Computed),
                    "users" => attribute(string_set_type(), "Users member of the group", AttributeConstraint::Computed),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> WithSchema for GroupState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Group of users"),
                attributes: map! {
                    "id" => attribute(AttributeType::String, "Group id", AttributeConstraint::Computed),
                    "name" => attribute(AttributeType::String, "Group name", AttributeConstraint::Required),
                    "description" => attribute(AttributeType::String, "Description", AttributeConstraint::Optional),
                    "expression" => attribute(
                        AttributeType::String,
                        "Expression selecting the group members dynamically",
                        AttributeConstraint::Optional,
                    ),
                    "provisioned_by" => attribute(
                        AttributeType::String,
                        "Identity provider that provisioned the group",
                        AttributeConstraint::Computed,
                    ),
                    "roles" => attribute(string_set_type(), "Roles attached to the group", AttributeConstraint::Computed),
                    "users" => attribute(string_set_type(), "Users member of the group", AttributeConstraint::Computed),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> WithValidate for GroupState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        require_non_empty(diags, &self.name, "name");
        if let Value::Value(expression) = &self.expression {
            if expression.trim().is_empty() {
                diags.error_short("`expression` must not be blank", attr_path.attribute("expression"));
            }
        }
    }
}
