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
use tf_provider::value::{Value, ValueMap, ValueString};
use tf_provider::{
    map, AttributeConstraint, AttributePath, AttributeType, Block, Description, Diagnostics,
    Schema,
};

use crate::utils::{attribute, optional_string, require_non_empty, string_map, WithSchema, WithValidate};

use super::api::User;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserState<'a> {
    #[serde(borrow = "'a")]
    pub id: ValueString<'a>,
    pub given_name: ValueString<'a>,
    pub family_name: ValueString<'a>,
    pub email: ValueString<'a>,
    pub phone: ValueString<'a>,
    pub enabled: Value<bool>,
    pub tags: ValueMap<'a, ValueString<'a>>,
}

impl<'a> UserState<'a> {
    pub fn apply(&mut self, user: User) {
        self.id = Value::Value(Cow::Owned(user.id));
        self.given_name = Value::Value(Cow::Owned(user.given_name));
        self.family_name = Value::Value(Cow::Owned(user.family_name));
        self.email = Value::Value(Cow::Owned(user.email));
        self.phone = optional_string(user.phone);
        self.enabled = Value::Value(user.enabled);
        self.tags = if self.tags.is_null() && user.tags.is_empty() {
            Value::Null
        } else {
            string_map(user.tags)
        };
    }
}

impl<'a> WithSchema for UserState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain("User of the organization"),
                attributes: map! {
                    "id" => attribute(AttributeType::String, "User id", AttributeConstraint::Computed),
                    "given_name" => attribute(AttributeType::String, "Given name", AttributeConstraint::Required),
                    "family_name" => attribute(AttributeType::String, "Family name", AttributeConstraint::Required),
                    "email" => attribute(
                        AttributeType::String,
                        "Email address, changing it recreates the user",
                        AttributeConstraint::Required,
                    ),
                    "phone" => attribute(AttributeType::String, "Phone number", AttributeConstraint::Optional),
                    "enabled" => attribute(AttributeType::Bool, "Whether the user can log in", AttributeConstraint::OptionalComputed),
                    "tags" => attribute(
                        AttributeType::Map(AttributeType::String.into()),
                        "Free form tags",
                        AttributeConstraint::Optional,
                    ),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> WithValidate for UserState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        require_non_empty(diags, &self.given_name, "given_name");
        require_non_empty(diags, &self.family_name, "family_name");
        if let Value::Value(email) = &self.email {
            if !email.contains('@') {
                diags.error(
                    "Invalid email address",
                    format!("`{email}` is not an email address"),
                    attr_path.attribute("email"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn user() -> User {
        User {
            id: "usr-1".into(),
            given_name: "Ada".into(),
            family_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: Some(String::new()),
            enabled: true,
            tags: BTreeMap::new(),
        }
    }

    #[test]
    fn unset_tags_stay_null() {
        let mut state = UserState::default();
        state.tags = Value::Null;
        state.apply(user());

        assert!(state.tags.is_null());
        assert!(state.phone.is_null());
        assert_eq!(state.enabled, Value::Value(true));
    }

    #[test]
    fn remote_tags_are_stored() {
        let mut state = UserState::default();
        state.apply(User {
            tags: BTreeMap::from([("team".to_owned(), "edge".to_owned())]),
            ..user()
        });

        assert_eq!(
            crate::utils::map_items(&state.tags),
            BTreeMap::from([("team".to_owned(), "edge".to_owned())])
        );
    }

    #[test]
    fn email_must_look_like_one() {
        let state = UserState {
            given_name: Value::Value(Cow::Borrowed("Ada")),
            family_name: Value::Value(Cow::Borrowed("Lovelace")),
            email: Value::Value(Cow::Borrowed("ada")),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        state.validate(&mut diags, AttributePath::default());

        assert_eq!(diags.errors.len(), 1);
    }
}
