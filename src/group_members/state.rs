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

use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tf_provider::value::ValueString;
use tf_provider::{map, AttributeConstraint, AttributeType, Block, Description, Schema};

use crate::utils::{attribute, string_set_type, StringSet};

use super::Membership;

/// Members attached to a group.
///
/// The member attribute is named after the membership kind (`users` or
/// `roles`), which is also how the kind is recognized when decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMembersState<'a> {
    pub membership: Membership,
    pub id: ValueString<'a>,
    pub group_id: ValueString<'a>,
    pub members: StringSet<'a>,
}

impl<'a> GroupMembersState<'a> {
    pub fn new(membership: Membership) -> Self {
        Self {
            membership,
            id: Default::default(),
            group_id: Default::default(),
            members: Default::default(),
        }
    }

    pub fn schema(membership: Membership) -> Schema {
        let kind = membership.field();
        Schema {
            version: 1,
            block: Block {
                version: 1,
                description: Description::plain(format!("{} attached to a group", membership.title())),
                attributes: map! {
                    "id" => attribute(AttributeType::String, "Same as `group_id`", AttributeConstraint::Computed),
                    "group_id" => attribute(
                        AttributeType::String,
                        &format!("Group the {kind} are attached to"),
                        AttributeConstraint::Required,
                    ),
                    kind => attribute(
                        string_set_type(),
                        &format!("Ids of the attached {kind}"),
                        AttributeConstraint::Required,
                    ),
                },
                ..Default::default()
            },
        }
    }
}

impl Serialize for GroupMembersState<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GroupMembersState", 3)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("group_id", &self.group_id)?;
        state.serialize_field(self.membership.field(), &self.members)?;
        state.end()
    }
}

impl<'de, 'a> Deserialize<'de> for GroupMembersState<'a> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StateVisitor(Default::default()))
    }
}

struct StateVisitor<'a>(std::marker::PhantomData<GroupMembersState<'a>>);

impl<'de, 'a> Visitor<'de> for StateVisitor<'a> {
    type Value = GroupMembersState<'a>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a group members state")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut id = None;
        let mut group_id = None;
        let mut members = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "id" => id = Some(map.next_value()?),
                "group_id" => group_id = Some(map.next_value()?),
                field => match Membership::from_field(field) {
                    Some(membership) => members = Some((membership, map.next_value()?)),
                    None => {
                        map.next_value::<IgnoredAny>()?;
                    }
                },
            }
        }

        let (membership, members) =
            members.ok_or_else(|| de::Error::missing_field("users"))?;
        Ok(GroupMembersState {
            membership,
            id: id.unwrap_or_default(),
            group_id: group_id.unwrap_or_default(),
            members,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use serde_json::json;
    use tf_provider::Value;

    use super::*;
    use crate::utils::string_set;

    #[test]
    fn member_attribute_follows_the_kind() {
        let state = GroupMembersState {
            id: Value::Value(Cow::Borrowed("grp-1")),
            group_id: Value::Value(Cow::Borrowed("grp-1")),
            members: string_set(vec!["rol-1".to_owned()]),
            ..GroupMembersState::new(Membership::Roles)
        };

        let encoded = serde_json::to_value(&state).unwrap();
        assert_eq!(
            encoded,
            json!({"id": "grp-1", "group_id": "grp-1", "roles": ["rol-1"]})
        );

        let decoded: GroupMembersState = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn kind_is_recognized_when_decoding() {
        let decoded: GroupMembersState = serde_json::from_value(json!({
            "id": "grp-1",
            "group_id": "grp-1",
            "users": null,
        }))
        .unwrap();

        assert_eq!(decoded.membership, Membership::Users);
        assert!(decoded.members.is_null());
    }

    #[test]
    fn state_without_members_is_rejected() {
        let decoded = serde_json::from_value::<GroupMembersState>(json!({"id": "grp-1"}));
        assert!(decoded.is_err());
    }
}
