// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State store references and destination declarations
//!
//! A destination names where rendered output is written. Its state-store
//! reference carries the backend kind as a free string on the wire; the
//! closed [`StateStoreKind`] enum is the only thing the engine dispatches on.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// API group of the platform's declarative objects
pub const API_GROUP: &str = "platform.keel.io";

/// API version of the platform's declarative objects
pub const API_VERSION: &str = "v1alpha1";

/// Wire kind of the bucket-backed store object
pub const BUCKET_STATE_STORE_KIND: &str = "BucketStateStore";

/// Wire kind of the version-control-backed store object
pub const GIT_STATE_STORE_KIND: &str = "GitStateStore";

/// A state-store reference kind the platform does not recognize
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported state store kind {0:?}")]
pub struct UnsupportedKind(pub String);

/// Closed set of supported state store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateStoreKind {
    Bucket,
    Git,
}

impl StateStoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateStoreKind::Bucket => BUCKET_STATE_STORE_KIND,
            StateStoreKind::Git => GIT_STATE_STORE_KIND,
        }
    }
}

impl FromStr for StateStoreKind {
    type Err = UnsupportedKind;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            BUCKET_STATE_STORE_KIND => Ok(StateStoreKind::Bucket),
            GIT_STATE_STORE_KIND => Ok(StateStoreKind::Git),
            other => Err(UnsupportedKind(other.to_string())),
        }
    }
}

/// Reference from a destination to its state store object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateStoreRef {
    /// Backend kind as declared; parsed via [`StateStoreKind`]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Reference to a credential secret
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    pub name: String,
    /// Defaults to the system namespace when unset
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Spec of a bucket-backed state store.
///
/// Credentials are optional: a store without a secret reference relies on
/// ambient or anonymous bucket access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketStateStoreSpec {
    pub endpoint: String,
    pub bucket_name: String,
    #[serde(default)]
    pub insecure: bool,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub secret_ref: Option<SecretRef>,
}

/// Spec of a version-control-backed state store. Credentials are mandatory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitStateStoreSpec {
    pub url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default)]
    pub path: Option<String>,
    pub secret_ref: SecretRef,
}

fn default_branch() -> String {
    "main".to_string()
}

/// A destination for rendered workflow output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub name: String,
    pub spec: DestinationSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationSpec {
    pub state_store_ref: StateStoreRef,
    /// Path prefix under the store; defaults to the destination name
    #[serde(default)]
    pub path: Option<String>,
}

impl Destination {
    /// Prefix under which this destination's documents live in the store
    pub fn path_prefix(&self) -> &str {
        match &self.spec.path {
            Some(path) if !path.is_empty() => path,
            _ => &self.name,
        }
    }
}

#[cfg(test)]
#[path = "statestore_tests.rs"]
mod tests;
