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
    attribute, nullable_string_set, optional_string, require_non_empty, string_set_type,
    StringSet, WithSchema, WithValidate,
};

use super::api::Metaport;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaportState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub description: ValueString<'a>,
    pub enabled: Value<bool>,
    pub allow_support: Value<bool>,
    pub mapped_elements: StringSet<'a>,
}

impl<'a> MetaportState<'a> {
    pub fn apply(&mut self, metaport: Metaport) {
        self.id = Value::Value(Cow::Owned(metaport.id));
        self.name = Value::Value(Cow::Owned(metaport.name));
        self.description = optional_string(metaport.description);
        self.enabled = Value::Value(metaport.enabled);
        self.allow_support = Value::Value(metaport.allow_support);
        self.mapped_elements = nullable_string_set(&self.mapped_elements, metaport.mapped_elements);
    }

    pub fn data_source_schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Look up a metaport by id"),
                attributes: map! {
                    "id" => attribute(AttributeType::String, "Metaport id", AttributeConstraint::Required),
                    "name" => attribute(AttributeType::String, "Metaport name", AttributeConstraint::Computed),
                    "description" => attribute(AttributeType::String, "Description", AttributeConstraint::Computed),
                    "enabled" => attribute(AttributeType::Bool, "Whether the metaport is enabled", AttributeConstraint::Computed),
                    "allow_support" => attribute(AttributeType::Bool, "Whether support can access the metaport", AttributeConstraint::Computed),
                    "mapped_elements" => attribute(string_set_type(), "Network elements mapped to the metaport", AttributeConstraint::Computed),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> WithSchema for MetaportState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("Metaport connector"),
                attributes: map! {
                    "id" => attribute(AttributeType::String, "Metaport id", AttributeConstraint::Computed),
                    "name" => attribute(AttributeType::String, "Metaport name", AttributeConstraint::Required),
                    "description" => attribute(AttributeType::String, "Description", AttributeConstraint::Optional),
                    "enabled" => attribute(AttributeType::Bool, "Whether the metaport is enabled", AttributeConstraint::OptionalComputed),
                    "allow_support" => attribute(AttributeType::Bool, "Whether support can access the metaport", AttributeConstraint::Computed),
                    "mapped_elements" => attribute(
                        string_set_type(),
                        "Network elements mapped to the metaport",
                        AttributeConstraint::Optional,
                    ),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> WithValidate for MetaportState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        require_non_empty(diags, &self.name, "name");
        if let Value::Value(elements) = &self.mapped_elements {
            if elements.iter().any(|element| element.is_null()) {
                diags.error_short(
                    "`mapped_elements` must not contain null",
                    attr_path.attribute("mapped_elements"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_mapped_elements_stay_null() {
        let mut state = MetaportState::default();
        state.apply(Metaport {
            id: "mp-1".into(),
            name: "paris".into(),
            description: Some("edge site".into()),
            ..Default::default()
        });

        assert!(state.mapped_elements.is_null());
        assert_eq!(state.description.as_str(), "edge site");
        assert_eq!(state.enabled, Value::Value(false));
    }

    #[test]
    fn null_elements_are_rejected() {
        let state = MetaportState {
            name: Value::Value(Cow::Borrowed("paris")),
            mapped_elements: Value::Value([Value::Null].into_iter().collect()),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        state.validate(&mut diags, AttributePath::default());

        assert_eq!(diags.errors.len(), 1);
    }
}
