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
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use tf_provider::value::{Value, ValueMap, ValueString};
use tf_provider::{
    Attribute, AttributeConstraint, AttributePath, AttributeType, Description, Diagnostics, Schema,
};

use crate::client::ClientError;

/// Set of strings as stored in the terraform state.
pub type StringSet<'a> = Value<BTreeSet<ValueString<'a>>>;

pub(crate) trait WithSchema {
    fn schema() -> Schema;
}

pub(crate) trait WithValidate {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath);
}

pub(crate) fn attribute(
    attr_type: AttributeType,
    description: &str,
    constraint: AttributeConstraint,
) -> Attribute {
    Attribute {
        attr_type,
        description: Description::plain(description),
        constraint,
        ..Default::default()
    }
}

pub(crate) fn string_set_type() -> AttributeType {
    AttributeType::Set(AttributeType::String.into())
}

/// Optional remote string: missing and empty are both null.
pub(crate) fn optional_string<'a>(value: Option<String>) -> ValueString<'a> {
    match value {
        Some(value) if !value.is_empty() => Value::Value(Cow::Owned(value)),
        _ => Value::Null,
    }
}

pub(crate) fn string_set<'a, I>(items: I) -> StringSet<'a>
where
    I: IntoIterator<Item = String>,
{
    Value::Value(
        items
            .into_iter()
            .map(|item| Value::Value(Cow::Owned(item)))
            .collect(),
    )
}

/// Remote collection stored in place of a set that may have been left null.
///
/// A null set stays null as long as the remote side holds no element,
/// so an unset attribute does not show a perpetual diff.
pub(crate) fn nullable_string_set<'a>(prior: &StringSet<'a>, items: Vec<String>) -> StringSet<'a> {
    if prior.is_null() && items.is_empty() {
        Value::Null
    } else {
        string_set(items)
    }
}

/// Known elements of a set, null or unknown sets being empty.
pub(crate) fn set_items(set: &StringSet<'_>) -> BTreeSet<String> {
    set.iter()
        .flatten()
        .filter_map(|item| item.as_deref_option().map(str::to_owned))
        .collect()
}

/// Known entries of a map, null or unknown maps being empty.
pub(crate) fn map_items(map: &ValueMap<'_, ValueString<'_>>) -> BTreeMap<String, String> {
    map.iter()
        .flatten()
        .filter_map(|(key, value)| Some((key.to_string(), value.as_deref_option()?.to_owned())))
        .collect()
}

pub(crate) fn string_map<'a>(entries: BTreeMap<String, String>) -> ValueMap<'a, ValueString<'a>> {
    Value::Value(
        entries
            .into_iter()
            .map(|(key, value)| (Cow::Owned(key), Value::Value(Cow::Owned(value))))
            .collect(),
    )
}

pub(crate) fn require_non_empty(
    diags: &mut Diagnostics,
    value: &ValueString<'_>,
    name: &'static str,
) {
    if let Value::Value(value) = value {
        if value.trim().is_empty() {
            diags.error_short(
                format!("`{name}` must not be empty"),
                AttributePath::new(name),
            );
        }
    }
}

pub(crate) fn report(
    diags: &mut Diagnostics,
    summary: impl Into<Cow<'static, str>>,
    err: &ClientError,
) {
    diags.root_error(summary, err.to_string());
}

pub(crate) fn report_removed(diags: &mut Diagnostics, kind: &str, id: &str) {
    diags.root_warning(
        format!("{kind} not found"),
        format!("The {kind} `{id}` does not exist anymore and will be removed from the state."),
    );
}

pub struct DisplayJoiner<'a, T, I>
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    iter: RefCell<T>,
    sep: &'a str,
}

pub trait DisplayJoinable {
    type Joiner<'a>;
    fn join_with(self, sep: &str) -> Self::Joiner<'_>;
}

impl<T, I> DisplayJoinable for T
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    type Joiner<'a> = DisplayJoiner<'a, T, I>;

    fn join_with(self, sep: &str) -> Self::Joiner<'_> {
        DisplayJoiner {
            iter: RefCell::new(self),
            sep,
        }
    }
}

impl<'a, T, I> std::fmt::Display for DisplayJoiner<'a, T, I>
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut sep = "";
        let mut iter = self.iter.try_borrow_mut().or(Err(std::fmt::Error))?;
        for elt in iter.by_ref() {
            f.write_str(sep)?;
            f.write_fmt(format_args!("{elt}"))?;
            sep = self.sep;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_ids() {
        let ids = ["u1", "u2", "u3"];
        assert_eq!(ids.iter().join_with(", ").to_string(), "u1, u2, u3");
        assert_eq!(std::iter::empty::<&str>().join_with(", ").to_string(), "");
    }

    #[test]
    fn empty_remote_strings_are_null() {
        assert!(optional_string(None).is_null());
        assert!(optional_string(Some(String::new())).is_null());
        assert_eq!(
            optional_string(Some("x".into())),
            Value::Value(Cow::Borrowed("x"))
        );
    }

    #[test]
    fn null_sets_stay_null_when_remote_is_empty() {
        assert!(nullable_string_set(&Value::Null, vec![]).is_null());
        assert_eq!(
            set_items(&nullable_string_set(&Value::Null, vec!["a".into()])),
            BTreeSet::from(["a".to_owned()])
        );
        assert!(!nullable_string_set(&string_set(vec![]), vec![]).is_null());
    }

    #[test]
    fn empty_names_are_reported_on_their_attribute() {
        let mut diags = Diagnostics::default();
        require_non_empty(&mut diags, &Value::Value(Cow::Borrowed("  ")), "name");
        require_non_empty(&mut diags, &Value::Null, "description");
        assert_eq!(diags.errors.len(), 1);
    }

    #[test]
    fn client_errors_become_root_errors() {
        let mut diags = Diagnostics::default();
        let kind = "group";
        report(
            &mut diags,
            format!("Failed to read {kind}"),
            &ClientError::IncompleteCredentials,
        );
        report(&mut diags, "Failed to delete group", &ClientError::NoHomeDirectory);
        assert_eq!(diags.errors.len(), 2);
    }

    #[test]
    fn unknown_items_are_skipped() {
        let set: StringSet = Value::Value(BTreeSet::from([
            Value::Value(Cow::Borrowed("a")),
            Value::Unknown,
        ]));
        assert_eq!(set_items(&set), BTreeSet::from(["a".to_owned()]));
        assert!(set_items(&Value::Unknown).is_empty());
    }
}
