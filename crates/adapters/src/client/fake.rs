// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake object client for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ClientError, ObjectClient, ObjectKey};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::core::{DynamicObject, GroupVersionKind};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

/// Recorded client call
#[derive(Debug, Clone)]
pub enum ClientCall {
    Get { kind: String, key: String },
    GetSecret { key: String },
    List { kind: String, namespace: Option<String> },
    Update { kind: String, key: String },
    Delete { kind: String, key: String },
}

/// Fake object client for testing
#[derive(Clone, Default)]
pub struct FakeObjectClient {
    objects: Arc<Mutex<BTreeMap<String, DynamicObject>>>,
    secrets: Arc<Mutex<BTreeMap<String, Secret>>>,
    calls: Arc<Mutex<Vec<ClientCall>>>,
    /// Names whose deletion fails with an injected api error
    fail_delete: Arc<Mutex<HashSet<String>>>,
    /// Names that disappear between list and delete (delete sees not-found)
    vanish_on_delete: Arc<Mutex<HashSet<String>>>,
    fail_update: Arc<Mutex<bool>>,
}

fn gvk_key(gvk: &GroupVersionKind) -> String {
    format!("{}/{}/{}", gvk.group, gvk.version, gvk.kind)
}

fn object_key(gvk: &GroupVersionKind, key: &ObjectKey) -> String {
    format!("{}|{}", gvk_key(gvk), key)
}

impl FakeObjectClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object as if it already existed in the cluster
    pub fn insert(&self, gvk: &GroupVersionKind, object: DynamicObject) {
        let key = ObjectKey::for_object(&object);
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(object_key(gvk, &key), object);
    }

    /// Store a credential secret
    pub fn insert_secret(&self, secret: Secret) {
        let key = ObjectKey {
            name: secret.metadata.name.clone().unwrap_or_default(),
            namespace: secret.metadata.namespace.clone(),
        };
        self.secrets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), secret);
    }

    /// Fetch a stored object back out, if present
    pub fn object(&self, gvk: &GroupVersionKind, key: &ObjectKey) -> Option<DynamicObject> {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&object_key(gvk, key))
            .cloned()
    }

    /// Number of stored objects of the given kind
    pub fn count_of(&self, gvk: &GroupVersionKind) -> usize {
        let prefix = format!("{}|", gvk_key(gvk));
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .filter(|k| k.starts_with(&prefix))
            .count()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ClientCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of recorded update calls
    pub fn update_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ClientCall::Update { .. }))
            .count()
    }

    /// Make deletion of the named object fail with an api error
    pub fn fail_delete_of(&self, name: impl Into<String>) {
        self.fail_delete
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.into());
    }

    /// Make the named object vanish before its delete call lands
    pub fn vanish_on_delete(&self, name: impl Into<String>) {
        self.vanish_on_delete
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.into());
    }

    /// Make every update call fail with an api error
    pub fn fail_updates(&self, fail: bool) {
        *self.fail_update.lock().unwrap_or_else(|e| e.into_inner()) = fail;
    }

    fn record(&self, call: ClientCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

/// Check whether an object carries every label in the selector
fn matches_labels(object: &DynamicObject, labels: &BTreeMap<String, String>) -> bool {
    let object_labels = object.metadata.labels.clone().unwrap_or_default();
    labels
        .iter()
        .all(|(key, value)| object_labels.get(key) == Some(value))
}

#[async_trait]
impl ObjectClient for FakeObjectClient {
    async fn get(
        &self,
        gvk: &GroupVersionKind,
        key: &ObjectKey,
    ) -> Result<DynamicObject, ClientError> {
        self.record(ClientCall::Get {
            kind: gvk.kind.clone(),
            key: key.to_string(),
        });
        self.object(gvk, key)
            .ok_or_else(|| ClientError::not_found(&gvk.kind, key))
    }

    async fn get_secret(&self, key: &ObjectKey) -> Result<Secret, ClientError> {
        self.record(ClientCall::GetSecret {
            key: key.to_string(),
        });
        self.secrets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key.to_string())
            .cloned()
            .ok_or_else(|| ClientError::not_found("Secret", key))
    }

    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        labels: Option<&BTreeMap<String, String>>,
    ) -> Result<Vec<DynamicObject>, ClientError> {
        self.record(ClientCall::List {
            kind: gvk.kind.clone(),
            namespace: namespace.map(String::from),
        });
        let prefix = format!("{}|", gvk_key(gvk));
        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        Ok(objects
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(_, object)| object)
            .filter(|object| match namespace {
                Some(namespace) => object.metadata.namespace.as_deref() == Some(namespace),
                None => true,
            })
            .filter(|object| match labels {
                Some(labels) => matches_labels(object, labels),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        gvk: &GroupVersionKind,
        object: &DynamicObject,
    ) -> Result<(), ClientError> {
        let key = ObjectKey::for_object(object);
        self.record(ClientCall::Update {
            kind: gvk.kind.clone(),
            key: key.to_string(),
        });
        if *self.fail_update.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(ClientError::Api("injected update failure".to_string()));
        }
        let mut objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        let storage_key = object_key(gvk, &key);
        if !objects.contains_key(&storage_key) {
            return Err(ClientError::not_found(&gvk.kind, &key));
        }
        objects.insert(storage_key, object.clone());
        Ok(())
    }

    async fn delete_background(
        &self,
        gvk: &GroupVersionKind,
        key: &ObjectKey,
    ) -> Result<(), ClientError> {
        self.record(ClientCall::Delete {
            kind: gvk.kind.clone(),
            key: key.to_string(),
        });
        if self
            .fail_delete
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&key.name)
        {
            return Err(ClientError::Api("injected delete failure".to_string()));
        }
        let vanished = self
            .vanish_on_delete
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&key.name);
        let removed = self
            .objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&object_key(gvk, key))
            .is_some();
        if vanished || !removed {
            return Err(ClientError::not_found(&gvk.kind, key));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
