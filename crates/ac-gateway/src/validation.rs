// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request-shape validation for `POST /agentic-sessions`: DNS-label-
//! compatible name, non-empty prompt, `mainRepoIndex` in bounds,
//! `timeout` > 0.

use crate::error::ApiError;
use ac_core::AgenticSessionSpec;

pub fn validate_session_name(name: &str) -> Result<(), ApiError> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
        && name.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(format!("{name} is not a DNS-label-compatible name")))
    }
}

pub fn validate_session_spec(spec: &AgenticSessionSpec) -> Result<(), ApiError> {
    if spec.prompt.trim().is_empty() {
        return Err(ApiError::InvalidInput("prompt must not be empty".to_string()));
    }
    if !spec.main_repo_index_valid() && !spec.repos.is_empty() {
        return Err(ApiError::InvalidInput("mainRepoIndex out of bounds".to_string()));
    }
    if spec.repos.is_empty() && spec.main_repo_index != 0 {
        return Err(ApiError::InvalidInput("mainRepoIndex out of bounds".to_string()));
    }
    if spec.timeout <= 0 {
        return Err(ApiError::InvalidInput("timeout must be positive".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_core::{PathsConfig, ResourceOverrides, UserContext};
    use std::collections::BTreeMap;

    fn spec(prompt: &str, main_repo_index: u32, repos: usize, timeout: i64) -> AgenticSessionSpec {
        AgenticSessionSpec {
            prompt: prompt.to_string(),
            interactive: false,
            display_name: None,
            timeout,
            project: "demo".into(),
            llm_settings: None,
            repos: (0..repos)
                .map(|i| ac_core::RepoDescriptor { input: ac_core::RepoInput { url: format!("https://example/{i}"), branch: "main".into() }, output: None })
                .collect(),
            main_repo_index,
            user_context: UserContext::default(),
            bot_account: None,
            resource_overrides: ResourceOverrides::default(),
            environment_variables: BTreeMap::new(),
            paths: PathsConfig::default(),
            active_workflow: None,
        }
    }

    #[test]
    fn rejects_uppercase_name() {
        assert!(validate_session_name("MySession").is_err());
    }

    #[test]
    fn accepts_dns_label_name() {
        assert!(validate_session_name("my-session-1").is_ok());
    }

    #[test]
    fn rejects_empty_prompt() {
        assert!(validate_session_spec(&spec("", 0, 1, 60)).is_err());
    }

    #[test]
    fn rejects_main_repo_index_equal_to_len() {
        assert!(validate_session_spec(&spec("hi", 2, 2, 60)).is_err());
    }

    #[test]
    fn rejects_non_positive_timeout() {
        assert!(validate_session_spec(&spec("hi", 0, 1, 0)).is_err());
    }

    #[test]
    fn accepts_well_formed_spec() {
        assert!(validate_session_spec(&spec("hi", 0, 1, 60)).is_ok());
    }
}
