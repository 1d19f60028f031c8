// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session-scoped Secret carrying the minted runner identity token.
//! Per-repo credentials live in the project's own `runnerSecretsName`
//! Secret (looked up, not built, here) and are mounted alongside this one.

use crate::params::JobFactoryParams;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use std::collections::BTreeMap;

pub fn secret_name(session_name: &str) -> String {
    format!("{session_name}-runner")
}

pub fn build_runner_secret(params: &JobFactoryParams<'_>, owner_ref: OwnerReference) -> Secret {
    let mut string_data = BTreeMap::new();
    string_data.insert("runner-token".to_string(), params.runner_token.to_string());

    Secret {
        metadata: ObjectMeta {
            name: Some(secret_name(params.session_name)),
            namespace: Some(params.namespace.to_string()),
            owner_references: Some(vec![owner_ref]),
            labels: Some(crate::job::session_labels(params.session_name)),
            ..Default::default()
        },
        string_data: Some(string_data),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    }
}
