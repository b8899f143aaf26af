// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline naming and labeling
//!
//! Every object generated for a workflow pipeline (the job, its service
//! account, its access-grant objects) derives its name and labels from the
//! same five identifiers. All derivations are pure functions: the same inputs
//! always produce the same names, and distinct (promise, resource request,
//! pipeline) tuples never collide.

use crate::workflow::WorkflowAction;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Namespace in which promise-scoped workflows run
pub const SYSTEM_NAMESPACE: &str = "keel-platform-system";

/// Label prefix owned by the platform
pub const LABEL_PREFIX: &str = "keel.io/";

/// Label carrying the promise identifier
pub const PROMISE_LABEL: &str = "keel.io/promise-name";

/// Label carrying the resource-request identifier (resource-scoped only)
pub const RESOURCE_LABEL: &str = "keel.io/resource-name";

/// Label carrying the pipeline name
pub const PIPELINE_LABEL: &str = "keel.io/pipeline-name";

/// Label carrying the workflow action of a generated job
pub const WORK_TYPE_LABEL: &str = "keel.io/work-type";

/// Label carrying the content fingerprint of the triggering object
pub const HASH_LABEL: &str = "keel.io/hash";

/// Kubernetes DNS label length limit for generated names
const MAX_NAME_LEN: usize = 63;

/// Naming and labeling arguments for one workflow pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineArgs {
    promise_id: String,
    resource_request_id: Option<String>,
    pipeline_name: String,
    object_name: String,
    object_namespace: String,
}

impl PipelineArgs {
    /// Arguments for a promise-scoped workflow (runs in the system namespace)
    pub fn for_promise(
        promise_id: impl Into<String>,
        pipeline_name: impl Into<String>,
        object_name: impl Into<String>,
    ) -> Self {
        Self {
            promise_id: promise_id.into(),
            resource_request_id: None,
            pipeline_name: pipeline_name.into(),
            object_name: object_name.into(),
            object_namespace: SYSTEM_NAMESPACE.to_string(),
        }
    }

    /// Arguments for a resource-scoped workflow (runs in the request's namespace)
    pub fn for_resource(
        promise_id: impl Into<String>,
        resource_request_id: impl Into<String>,
        pipeline_name: impl Into<String>,
        object_name: impl Into<String>,
        object_namespace: impl Into<String>,
    ) -> Self {
        Self {
            promise_id: promise_id.into(),
            resource_request_id: Some(resource_request_id.into()),
            pipeline_name: pipeline_name.into(),
            object_name: object_name.into(),
            object_namespace: object_namespace.into(),
        }
    }

    pub fn promise_id(&self) -> &str {
        &self.promise_id
    }

    pub fn resource_request_id(&self) -> Option<&str> {
        self.resource_request_id.as_deref()
    }

    pub fn pipeline_name(&self) -> &str {
        &self.pipeline_name
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn is_promise_scoped(&self) -> bool {
        self.resource_request_id.is_none()
    }

    /// Namespace all generated objects live in
    pub fn namespace(&self) -> &str {
        &self.object_namespace
    }

    /// Name of the generated job for the given workflow action
    pub fn job_name(&self, action: WorkflowAction) -> String {
        dns_label(&format!("keel-{}-{}", action.as_str(), self.identity()))
    }

    /// Name of the service identity shared by both workflow actions
    pub fn service_account_name(&self) -> String {
        dns_label(&format!("keel-{}", self.identity()))
    }

    /// Name of the access-grant role; same identity as the service account
    pub fn role_name(&self) -> String {
        self.service_account_name()
    }

    /// Base label set identifying this pipeline's objects
    pub fn labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(PROMISE_LABEL.to_string(), self.promise_id.clone());
        labels.insert(PIPELINE_LABEL.to_string(), self.pipeline_name.clone());
        if let Some(request) = &self.resource_request_id {
            labels.insert(RESOURCE_LABEL.to_string(), request.clone());
        }
        labels
    }

    /// Labels for a generated job and its pods, per workflow action
    pub fn pipeline_labels(&self, action: WorkflowAction) -> BTreeMap<String, String> {
        let mut labels = self.labels();
        labels.insert(WORK_TYPE_LABEL.to_string(), action.as_str().to_string());
        labels
    }

    /// Labels for the configure-workflow job
    pub fn configure_labels(&self) -> BTreeMap<String, String> {
        self.pipeline_labels(WorkflowAction::Configure)
    }

    /// Labels for the delete-workflow job
    pub fn delete_labels(&self) -> BTreeMap<String, String> {
        self.pipeline_labels(WorkflowAction::Delete)
    }

    /// Identity joining the promise, optional request, and pipeline names
    fn identity(&self) -> String {
        match &self.resource_request_id {
            Some(request) => format!("{}-{}-{}", self.promise_id, request, self.pipeline_name),
            None => format!("{}-{}", self.promise_id, self.pipeline_name),
        }
    }
}

/// Constrain a generated name to a valid DNS label.
///
/// Over-long names keep a deterministic sha256-derived suffix so truncation
/// cannot introduce collisions between distinct identities.
fn dns_label(name: &str) -> String {
    if name.len() <= MAX_NAME_LEN {
        return name.to_string();
    }
    let digest = Sha256::digest(name.as_bytes());
    let suffix: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
    let head: String = name.chars().take(MAX_NAME_LEN - suffix.len() - 1).collect();
    format!("{}-{}", head.trim_end_matches('-'), suffix)
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
