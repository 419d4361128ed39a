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

use std::collections::BTreeSet;

/// Members to attach and detach to go from one set to another.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Changes {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

pub fn difference(current: &BTreeSet<String>, desired: &BTreeSet<String>) -> Changes {
    Changes {
        add: desired.difference(current).cloned().collect(),
        remove: current.difference(desired).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn overlapping_sets() {
        let changes = difference(&set(&["u1", "u2", "u3"]), &set(&["u3", "u4", "u2"]));
        assert_eq!(
            changes,
            Changes {
                add: vec!["u4".into()],
                remove: vec!["u1".into()],
            }
        );
    }

    #[test]
    fn from_and_to_nothing() {
        assert_eq!(difference(&set(&[]), &set(&["b", "a"])).add, ["a", "b"]);
        assert_eq!(difference(&set(&["b", "a"]), &set(&[])).remove, ["a", "b"]);
    }

    #[test]
    fn identical_sets_need_nothing() {
        assert!(difference(&set(&["a"]), &set(&["a"])).is_empty());
    }
}
