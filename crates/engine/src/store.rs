// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State store writer selection
//!
//! Resolves a destination's state-store reference to a concrete writer:
//! fetch the store object, fetch its credential secret where one is
//! referenced, and construct the matching writer. Failures are logged with
//! the reference that broke and propagated unchanged; retry belongs to the
//! reconciliation loop.

use keel_adapters::client::{ClientError, ObjectClient, ObjectKey};
use keel_adapters::store::{
    BucketWriter, CredentialData, GitWriter, StateStoreWriter, WriterError,
};
use keel_core::statestore::{
    BucketStateStoreSpec, Destination, GitStateStoreSpec, SecretRef, StateStoreKind,
    UnsupportedKind, API_GROUP, API_VERSION,
};
use keel_core::SYSTEM_NAMESPACE;
use kube::core::GroupVersionKind;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from writer resolution
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    UnsupportedKind(#[from] UnsupportedKind),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("decoding {kind} {name} spec: {source}")]
    InvalidStoreSpec {
        kind: &'static str,
        name: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Writer(#[from] WriterError),
}

/// Resolve a destination to the writer for its state store backend.
///
/// Bucket stores may carry no credential reference at all; the writer then
/// relies on anonymous access. Git stores always require credentials, so an
/// unreachable secret is a hard fetch error.
pub async fn writer_for_destination<C: ObjectClient>(
    client: &C,
    destination: &Destination,
) -> Result<Box<dyn StateStoreWriter>, StoreError> {
    let reference = &destination.spec.state_store_ref;
    let kind: StateStoreKind = reference.kind.parse()?;
    let key = ObjectKey {
        name: reference.name.clone(),
        namespace: reference.namespace.clone(),
    };

    let writer: Box<dyn StateStoreWriter> = match kind {
        StateStoreKind::Bucket => {
            let spec: BucketStateStoreSpec = fetch_store_spec(client, kind, &key).await?;
            let credentials = match &spec.secret_ref {
                Some(secret_ref) => Some(fetch_credentials(client, secret_ref).await?),
                None => None,
            };
            let writer = BucketWriter::new(&spec, destination, credentials.as_ref())
                .map_err(|e| construction_error(kind, &key, e))?;
            Box::new(writer)
        }
        StateStoreKind::Git => {
            let spec: GitStateStoreSpec = fetch_store_spec(client, kind, &key).await?;
            let credentials = fetch_credentials(client, &spec.secret_ref).await?;
            let writer = GitWriter::new(&spec, destination, &credentials)
                .map_err(|e| construction_error(kind, &key, e))?;
            Box::new(writer)
        }
    };

    Ok(writer)
}

/// Fetch a state store object and decode its spec
async fn fetch_store_spec<C: ObjectClient, T: DeserializeOwned>(
    client: &C,
    kind: StateStoreKind,
    key: &ObjectKey,
) -> Result<T, StoreError> {
    let gvk = GroupVersionKind::gvk(API_GROUP, API_VERSION, kind.as_str());
    let object = client.get(&gvk, key).await.map_err(|e| {
        tracing::error!(
            kind = kind.as_str(),
            reference = %key,
            error = %e,
            "unable to fetch state store"
        );
        StoreError::Client(e)
    })?;

    let spec = object
        .data
        .get("spec")
        .cloned()
        .unwrap_or(serde_json::Value::Null);
    serde_json::from_value(spec).map_err(|e| StoreError::InvalidStoreSpec {
        kind: kind.as_str(),
        name: key.name.clone(),
        source: e,
    })
}

/// Fetch a referenced credential secret and decode its data
async fn fetch_credentials<C: ObjectClient>(
    client: &C,
    secret_ref: &SecretRef,
) -> Result<CredentialData, StoreError> {
    let namespace = secret_ref.namespace.as_deref().unwrap_or(SYSTEM_NAMESPACE);
    let key = ObjectKey::namespaced(&secret_ref.name, namespace);
    let secret = client.get_secret(&key).await.map_err(|e| {
        tracing::error!(
            secret = %key,
            error = %e,
            "unable to fetch state store credentials"
        );
        StoreError::Client(e)
    })?;

    Ok(secret
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|(name, bytes)| (name, bytes.0))
        .collect())
}

fn construction_error(kind: StateStoreKind, key: &ObjectKey, error: WriterError) -> StoreError {
    tracing::error!(
        kind = kind.as_str(),
        reference = %key,
        error = %error,
        "unable to create state store writer"
    );
    StoreError::Writer(error)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
