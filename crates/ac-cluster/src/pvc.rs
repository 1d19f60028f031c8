// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ambient workspace PVC: one per project namespace, shared by every
//! session via subpath mounting.

use k8s_openapi::api::core::v1::{PersistentVolumeClaim, PersistentVolumeClaimSpec};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Name every project namespace's shared workspace PVC carries — one per
/// namespace, not per session.
pub const WORKSPACE_PVC_NAME: &str = "ambient-workspace";

pub fn build_ambient_workspace_pvc(name: &str, storage_class: Option<&str>) -> PersistentVolumeClaim {
    let mut requests = BTreeMap::new();
    requests.insert("storage".to_string(), Quantity("20Gi".to_string()));

    PersistentVolumeClaim {
        metadata: ObjectMeta { name: Some(name.to_string()), ..Default::default() },
        spec: Some(PersistentVolumeClaimSpec {
            access_modes: Some(vec!["ReadWriteMany".to_string()]),
            storage_class_name: storage_class.map(str::to_string),
            resources: Some(k8s_openapi::api::core::v1::VolumeResourceRequirements {
                requests: Some(requests),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pvc_uses_read_write_many_for_cross_session_sharing() {
        let pvc = build_ambient_workspace_pvc("ambient-workspace", Some("fast-ssd"));
        let spec = pvc.spec.unwrap();
        assert_eq!(spec.access_modes, Some(vec!["ReadWriteMany".to_string()]));
        assert_eq!(spec.storage_class_name.as_deref(), Some("fast-ssd"));
    }

    #[test]
    fn pvc_omits_storage_class_when_not_overridden() {
        let pvc = build_ambient_workspace_pvc("ambient-workspace", None);
        assert!(pvc.spec.unwrap().storage_class_name.is_none());
    }
}
