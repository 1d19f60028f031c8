// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ProjectSettings` custom resource — one singleton per project namespace,
//! named `projectsettings`.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum GroupRole {
    View,
    Edit,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupAccessEntry {
    pub group_name: String,
    pub role: GroupRole,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DefaultResourceProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

/// The name every `ProjectSettings` object must have within its namespace.
pub const PROJECT_SETTINGS_NAME: &str = "projectsettings";

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "vteam.ambient-code",
    version = "v1alpha1",
    kind = "ProjectSettings",
    namespaced,
    shortname = "projsettings"
)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettingsSpec {
    #[serde(default)]
    pub group_access: Vec<GroupAccessEntry>,
    pub runner_secrets_name: String,
    #[serde(default)]
    pub default_resource_profile: DefaultResourceProfile,
}

impl ProjectSettingsSpec {
    /// Highest role any of `groups` holds per `groupAccess`, if any. This is
    /// an *input* to the role gate — it never substitutes for the access
    /// review that always runs afterward.
    pub fn highest_role_for(&self, groups: &[String]) -> Option<GroupRole> {
        self.group_access
            .iter()
            .filter(|entry| groups.iter().any(|g| g == &entry.group_name))
            .map(|entry| entry.role)
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ProjectSettingsSpec {
        ProjectSettingsSpec {
            group_access: vec![
                GroupAccessEntry { group_name: "viewers".into(), role: GroupRole::View },
                GroupAccessEntry { group_name: "admins".into(), role: GroupRole::Admin },
            ],
            runner_secrets_name: "oj-runner-secrets".into(),
            default_resource_profile: DefaultResourceProfile::default(),
        }
    }

    #[test]
    fn highest_role_picks_the_max_among_matching_groups() {
        let s = settings();
        assert_eq!(s.highest_role_for(&["viewers".into(), "admins".into()]), Some(GroupRole::Admin));
    }

    #[test]
    fn no_matching_group_yields_none() {
        let s = settings();
        assert_eq!(s.highest_role_for(&["strangers".into()]), None);
    }
}
