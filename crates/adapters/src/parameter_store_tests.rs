// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn resolves_an_uppercased_prefixed_env_var() {
    std::env::set_var("DOC_PARAM_DB_PASSWORD", "hunter2");
    let store = EnvParameterStore::default();
    assert_eq!(store.get("db-password").await.unwrap(), "hunter2");
    std::env::remove_var("DOC_PARAM_DB_PASSWORD");
}

#[tokio::test]
#[serial]
async fn missing_env_var_is_reported_as_parameter_not_found() {
    let store = EnvParameterStore::default();
    let err = store.get("never-set-xyz").await.unwrap_err();
    assert!(matches!(err, AdapterError::ParameterNotFound(name) if name == "never-set-xyz"));
}

#[tokio::test]
#[serial]
async fn custom_prefix_is_honored() {
    std::env::set_var("CUSTOM_API_KEY", "abc123");
    let store = EnvParameterStore::new("CUSTOM_");
    assert_eq!(store.get("api.key").await.unwrap(), "abc123");
    std::env::remove_var("CUSTOM_API_KEY");
}
