// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Non-secret runner configuration, mirrored into a ConfigMap so the Pod's
//! env can reference it by name instead of duplicating literals per field.

use crate::params::JobFactoryParams;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use std::collections::BTreeMap;

pub fn config_map_name(session_name: &str) -> String {
    format!("{session_name}-config")
}

pub fn build_config_map(params: &JobFactoryParams<'_>, owner_ref: OwnerReference) -> ConfigMap {
    let mut data = BTreeMap::new();
    data.insert("STATE_DIR".to_string(), format!("{}/{}", params.state_base_dir, params.session_name));
    data.insert("CONTENT_SERVICE_BASE".to_string(), params.content_service_base.to_string());
    data.insert("PROJECT".to_string(), params.spec.project.clone());
    data.insert("MAIN_REPO_INDEX".to_string(), params.spec.main_repo_index.to_string());
    data.insert("TIMEOUT_SECS".to_string(), params.spec.timeout.to_string());
    data.insert("INTERACTIVE".to_string(), params.spec.interactive.to_string());
    data.insert("WORKSPACE_PATH".to_string(), params.spec.paths.workspace.clone());
    data.insert("MESSAGES_PATH".to_string(), params.spec.paths.messages.clone());
    data.insert("INBOX_PATH".to_string(), params.spec.paths.inbox.clone());

    ConfigMap {
        metadata: ObjectMeta {
            name: Some(config_map_name(params.session_name)),
            namespace: Some(params.namespace.to_string()),
            owner_references: Some(vec![owner_ref]),
            labels: Some(crate::job::session_labels(params.session_name)),
            ..Default::default()
        },
        data: Some(data),
        ..Default::default()
    }
}
