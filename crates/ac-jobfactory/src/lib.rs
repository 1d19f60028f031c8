// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ac-jobfactory: builds the Pod template, Job, ConfigMap, and Secret for
//! a session's runner. Produces object values only — the cluster adapter
//! is responsible for creating and adopting them.

mod configmap;
mod job;
mod params;
mod pod;
mod secret;

pub use configmap::config_map_name;
pub use job::{build_session_resources, job_name, SessionResources};
pub use params::{JobFactoryParams, JobOwner, RunnerSecrets};
pub use secret::secret_name;
