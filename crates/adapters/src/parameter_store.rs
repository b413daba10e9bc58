// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The secure-parameter lookup contract consumed by the Document Parser
//! (§4.9) when resolving `secure-parameter` references. The identity and
//! credentials layer backing a production implementation is out of scope.

use async_trait::async_trait;

use crate::error::AdapterError;

#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Resolves a named secure parameter to its plaintext value.
    async fn get(&self, name: &str) -> Result<String, AdapterError>;
}

/// Resolves secure parameters from the process environment, upper-cased
/// and prefixed. A genuine, runnable default for `docctl`/`docd` before a
/// real identity/credentials-backed parameter store is wired in.
pub struct EnvParameterStore {
    prefix: String,
}

impl EnvParameterStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    fn env_key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name.to_uppercase().replace(['-', '.'], "_"))
    }
}

impl Default for EnvParameterStore {
    fn default() -> Self {
        Self::new("DOC_PARAM_")
    }
}

#[async_trait]
impl ParameterStore for EnvParameterStore {
    async fn get(&self, name: &str) -> Result<String, AdapterError> {
        std::env::var(self.env_key(name)).map_err(|_| AdapterError::ParameterNotFound(name.to_string()))
    }
}

#[cfg(test)]
#[path = "parameter_store_tests.rs"]
mod tests;
