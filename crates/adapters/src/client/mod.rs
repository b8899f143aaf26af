// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object store client adapters
//!
//! The engine talks to the platform's object store through [`ObjectClient`],
//! which covers exactly the operations the reconciliation loop grants it:
//! get, list by label, update, and background-propagation delete.

mod kube;

pub use self::kube::KubeObjectClient;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{ClientCall, FakeObjectClient};

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use ::kube::core::{DynamicObject, GroupVersionKind};
use std::collections::BTreeMap;
use thiserror::Error;

/// Name plus optional namespace locating one object
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectKey {
    pub name: String,
    pub namespace: Option<String>,
}

impl ObjectKey {
    /// Key for a cluster-scoped object
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    /// Key for a namespaced object
    pub fn namespaced(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }

    /// Key locating an already-fetched object
    pub fn for_object(object: &DynamicObject) -> Self {
        Self {
            name: object.metadata.name.clone().unwrap_or_default(),
            namespace: object.metadata.namespace.clone(),
        }
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}/{}", namespace, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Errors from object store operations
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("{kind} {key} not found")]
    NotFound { kind: String, key: String },
    #[error("api error: {0}")]
    Api(String),
}

impl ClientError {
    pub fn not_found(kind: impl Into<String>, key: &ObjectKey) -> Self {
        ClientError::NotFound {
            kind: kind.into(),
            key: key.to_string(),
        }
    }

    /// Not-found is the one failure deletion treats as success
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}

/// Adapter for object store operations (get, list, update, delete)
#[async_trait]
pub trait ObjectClient: Clone + Send + Sync + 'static {
    /// Fetch one object of the given kind
    async fn get(
        &self,
        gvk: &GroupVersionKind,
        key: &ObjectKey,
    ) -> Result<DynamicObject, ClientError>;

    /// Fetch a credential secret
    async fn get_secret(&self, key: &ObjectKey) -> Result<Secret, ClientError>;

    /// List objects of a kind, optionally constrained to a namespace and label set
    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        labels: Option<&BTreeMap<String, String>>,
    ) -> Result<Vec<DynamicObject>, ClientError>;

    /// Persist an updated object
    async fn update(
        &self,
        gvk: &GroupVersionKind,
        object: &DynamicObject,
    ) -> Result<(), ClientError>;

    /// Delete one object with background propagation
    async fn delete_background(
        &self,
        gvk: &GroupVersionKind,
        key: &ObjectKey,
    ) -> Result<(), ClientError>;
}
