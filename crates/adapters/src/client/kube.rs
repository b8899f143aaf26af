// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kubernetes-backed object client

use super::{ClientError, ObjectClient, ObjectKey};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use ::kube::api::{Api, DeleteParams, ListParams, PostParams};
use ::kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use std::collections::BTreeMap;

/// Object client backed by the cluster API server
#[derive(Clone)]
pub struct KubeObjectClient {
    client: ::kube::Client,
}

impl KubeObjectClient {
    pub fn new(client: ::kube::Client) -> Self {
        Self { client }
    }

    fn dynamic_api(&self, gvk: &GroupVersionKind, namespace: Option<&str>) -> Api<DynamicObject> {
        let resource = ApiResource::from_gvk(gvk);
        match namespace {
            Some(namespace) => Api::namespaced_with(self.client.clone(), namespace, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        }
    }
}

/// Map an API failure, turning server 404s into [`ClientError::NotFound`]
fn map_error(kind: &str, key: &ObjectKey, error: ::kube::Error) -> ClientError {
    if let ::kube::Error::Api(response) = &error {
        if response.code == 404 {
            return ClientError::not_found(kind, key);
        }
    }
    ClientError::Api(error.to_string())
}

/// Render a label set as a selector string ("k=v,k=v")
fn selector_string(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl ObjectClient for KubeObjectClient {
    async fn get(
        &self,
        gvk: &GroupVersionKind,
        key: &ObjectKey,
    ) -> Result<DynamicObject, ClientError> {
        let api = self.dynamic_api(gvk, key.namespace.as_deref());
        api.get(&key.name)
            .await
            .map_err(|e| map_error(&gvk.kind, key, e))
    }

    async fn get_secret(&self, key: &ObjectKey) -> Result<Secret, ClientError> {
        let api: Api<Secret> = match key.namespace.as_deref() {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::default_namespaced(self.client.clone()),
        };
        api.get(&key.name)
            .await
            .map_err(|e| map_error("Secret", key, e))
    }

    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        labels: Option<&BTreeMap<String, String>>,
    ) -> Result<Vec<DynamicObject>, ClientError> {
        let api = self.dynamic_api(gvk, namespace);
        let mut params = ListParams::default();
        if let Some(labels) = labels {
            params = params.labels(&selector_string(labels));
        }
        let list = api
            .list(&params)
            .await
            .map_err(|e| ClientError::Api(e.to_string()))?;
        Ok(list.items)
    }

    async fn update(
        &self,
        gvk: &GroupVersionKind,
        object: &DynamicObject,
    ) -> Result<(), ClientError> {
        let key = ObjectKey::for_object(object);
        let api = self.dynamic_api(gvk, key.namespace.as_deref());
        api.replace(&key.name, &PostParams::default(), object)
            .await
            .map_err(|e| map_error(&gvk.kind, &key, e))?;
        Ok(())
    }

    async fn delete_background(
        &self,
        gvk: &GroupVersionKind,
        key: &ObjectKey,
    ) -> Result<(), ClientError> {
        let api = self.dynamic_api(gvk, key.namespace.as_deref());
        api.delete(&key.name, &DeleteParams::background())
            .await
            .map_err(|e| map_error(&gvk.kind, key, e))?;
        Ok(())
    }
}
