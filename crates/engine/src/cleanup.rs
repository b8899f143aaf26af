// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource cleanup engine
//!
//! Deletion of a parent object is gated by two finalizers: one while its
//! delete workflow runs, one while the jobs every workflow created are swept
//! away. All operations here are idempotent against current observed state;
//! the reconciliation loop re-invokes them until the sweep reports clear.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use keel_adapters::client::{ClientError, ObjectClient, ObjectKey};
use keel_core::finalizer::{
    self, FinalizerError, DELETE_WORKFLOWS_FINALIZER, WORKFLOWS_CLEANUP_FINALIZER,
};
use kube::core::{DynamicObject, GroupVersionKind};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from cleanup operations
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error(transparent)]
    Finalizer(#[from] FinalizerError),
    #[error("invalid label selector: {0}")]
    InvalidSelector(String),
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Outcome of one delete sweep over a label selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    /// Nothing matched; the guarded finalizer may be removed
    Clear,
    /// Matches existed at list time; requeue and sweep again
    Remaining,
}

/// Lifecycle state of a parent object under cleanup, derived purely from its
/// metadata. The delete workflow runs before job cleanup, so its finalizer
/// takes precedence while both are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupPhase {
    /// Not being deleted
    Active,
    /// Deletion requested; the delete workflow has not finished
    DeleteWorkflowsInFlight,
    /// Delete workflow done; workflow-created jobs still being removed
    JobCleanupInFlight,
    /// No platform finalizers left; the object can go away
    Removed,
}

impl CleanupPhase {
    pub fn of(metadata: &ObjectMeta) -> Self {
        if metadata.deletion_timestamp.is_none() {
            return CleanupPhase::Active;
        }
        let finalizers = metadata.finalizers.as_deref().unwrap_or(&[]);
        if finalizer::contains(finalizers, DELETE_WORKFLOWS_FINALIZER) {
            CleanupPhase::DeleteWorkflowsInFlight
        } else if finalizer::contains(finalizers, WORKFLOWS_CLEANUP_FINALIZER) {
            CleanupPhase::JobCleanupInFlight
        } else {
            CleanupPhase::Removed
        }
    }
}

/// Delete every object of the kind matching the selector.
///
/// A `None` selector matches all objects of the kind. Per-item not-found is
/// success (the object is already gone); any other per-item failure aborts
/// the batch immediately. The caller retries the whole call, and the re-list
/// naturally skips what earlier attempts already deleted. Returns
/// [`Sweep::Remaining`] whenever the list was non-empty at call time.
pub async fn delete_matching<C: ObjectClient>(
    client: &C,
    gvk: &GroupVersionKind,
    namespace: Option<&str>,
    labels: Option<&BTreeMap<String, String>>,
) -> Result<Sweep, CleanupError> {
    if let Some(labels) = labels {
        validate_selector(labels)?;
    }

    let items = client.list(gvk, namespace, labels).await?;
    if items.is_empty() {
        return Ok(Sweep::Clear);
    }

    tracing::info!(
        kind = %gvk.kind,
        count = items.len(),
        selector = ?labels,
        "deleting matching resources"
    );
    for item in &items {
        let key = ObjectKey::for_object(item);
        match client.delete_background(gvk, &key).await {
            Ok(()) => {
                tracing::info!(kind = %gvk.kind, name = %key, "triggered deletion of resource");
            }
            // Already gone; deletion is idempotent
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                tracing::error!(
                    kind = %gvk.kind,
                    name = %key,
                    error = %e,
                    "error deleting resource, caller should retry"
                );
                return Err(e.into());
            }
        }
    }

    Ok(Sweep::Remaining)
}

/// Add any missing finalizers and persist the update.
///
/// Every required finalizer is validated before the object is touched, so an
/// over-long entry fails the whole call without partial mutation. No requeue
/// signal is returned: the update itself triggers the next reconciliation.
pub async fn ensure_finalizers<C: ObjectClient>(
    client: &C,
    gvk: &GroupVersionKind,
    object: &mut DynamicObject,
    required: &[&str],
) -> Result<(), CleanupError> {
    for name in required {
        finalizer::validate(name)?;
    }

    let mut changed = false;
    {
        let finalizers = object.metadata.finalizers.get_or_insert_with(Vec::new);
        for name in required {
            changed |= finalizer::add(finalizers, name)?;
        }
    }
    if changed {
        tracing::info!(
            name = object.metadata.name.as_deref().unwrap_or_default(),
            finalizers = ?object.metadata.finalizers,
            "adding missing finalizers"
        );
        client.update(gvk, object).await?;
    }
    Ok(())
}

/// Remove a finalizer if present and persist the update
pub async fn remove_finalizer<C: ObjectClient>(
    client: &C,
    gvk: &GroupVersionKind,
    object: &mut DynamicObject,
    name: &str,
) -> Result<(), CleanupError> {
    let changed = match object.metadata.finalizers.as_mut() {
        Some(finalizers) => finalizer::remove(finalizers, name),
        None => false,
    };
    if changed {
        tracing::info!(
            name = object.metadata.name.as_deref().unwrap_or_default(),
            finalizer = name,
            "removing finalizer"
        );
        client.update(gvk, object).await?;
    }
    Ok(())
}

/// List workflow jobs in a namespace matching the label set
pub async fn jobs_with_labels<C: ObjectClient>(
    client: &C,
    namespace: &str,
    labels: &BTreeMap<String, String>,
) -> Result<Vec<DynamicObject>, CleanupError> {
    validate_selector(labels)?;
    let gvk = GroupVersionKind::gvk("batch", "v1", "Job");
    Ok(client.list(&gvk, Some(namespace), Some(labels)).await?)
}

/// Reject label selectors with empty keys or values before they hit the store
fn validate_selector(labels: &BTreeMap<String, String>) -> Result<(), CleanupError> {
    for (key, value) in labels {
        if key.is_empty() || value.is_empty() {
            return Err(CleanupError::InvalidSelector(format!(
                "empty key or value in {key:?}={value:?}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod tests;
