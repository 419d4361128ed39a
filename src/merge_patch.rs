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

//! Fields of a JSON merge patch (RFC 7396).
//!
//! An absent field leaves the remote value untouched, an explicit `null`
//! clears it. Fields must be annotated with
//! `#[serde(skip_serializing_if = "MergePatch::is_absent")]` for the absent
//! case to disappear from the document.

use serde::{Serialize, Serializer};
use tf_provider::value::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePatch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> MergePatch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, MergePatch::Absent)
    }

    /// Patch only if `after` differs from `before`.
    pub fn changed(before: &Value<T>, after: Value<T>) -> Self
    where
        T: PartialEq,
    {
        if before == &after {
            MergePatch::Absent
        } else {
            after.into()
        }
    }
}

impl<T> From<Value<T>> for MergePatch<T> {
    fn from(value: Value<T>) -> Self {
        match value {
            Value::Value(value) => MergePatch::Value(value),
            Value::Null => MergePatch::Null,
            Value::Unknown => MergePatch::Absent,
        }
    }
}

impl<T: Serialize> Serialize for MergePatch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MergePatch::Value(value) => value.serialize(serializer),
            MergePatch::Null | MergePatch::Absent => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Patch {
        #[serde(skip_serializing_if = "MergePatch::is_absent")]
        description: MergePatch<String>,
        #[serde(skip_serializing_if = "MergePatch::is_absent")]
        phone: MergePatch<String>,
        #[serde(skip_serializing_if = "MergePatch::is_absent")]
        enabled: MergePatch<bool>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let patch = Patch {
            description: MergePatch::Value("edge".into()),
            phone: MergePatch::Null,
            enabled: MergePatch::Absent,
        };

        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"description": "edge", "phone": null})
        );
    }

    #[test]
    fn terraform_values_map_onto_patch() {
        let value: Value<Cow<str>> = Value::Value("x".into());
        assert_eq!(MergePatch::from(value), MergePatch::Value(Cow::from("x")));
        assert_eq!(MergePatch::<bool>::from(Value::Null), MergePatch::Null);
        assert_eq!(MergePatch::<bool>::from(Value::Unknown), MergePatch::Absent);
    }

    #[test]
    fn unchanged_values_are_not_patched() {
        let before = Value::Value(true);
        assert!(MergePatch::changed(&before, Value::Value(true)).is_absent());
        assert_eq!(
            MergePatch::changed(&before, Value::Null),
            MergePatch::<bool>::Null
        );
    }
}
