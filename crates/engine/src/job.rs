// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline job builder
//!
//! Wraps an assembled step sequence into a complete batch job plus the
//! service identity and access-grant objects it runs under. The last
//! assembled step occupies the job's primary container slot; every earlier
//! step becomes an ordered init container, which is what makes the pipeline
//! strictly sequential inside a single job.

use crate::steps::{assemble, StepImages};
use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{
    Container, LocalObjectReference, PodSpec, PodTemplateSpec, ServiceAccount,
};
use k8s_openapi::api::rbac::v1::{PolicyRule, Role, RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use keel_core::args::{PipelineArgs, HASH_LABEL};
use keel_core::pipeline::PipelineSpec;
use keel_core::workflow::{WorkflowAction, WorkflowType};
use kube::core::DynamicObject;
use std::collections::BTreeMap;

/// Builder for workflow jobs and their supporting objects
#[derive(Debug, Clone)]
pub struct PipelineFactory {
    images: StepImages,
    default_image_pull_secret: Option<String>,
}

/// A workflow job plus the access objects it runs under
#[derive(Debug, Clone)]
pub struct PipelineObjects {
    pub job: Job,
    pub service_account: ServiceAccount,
    pub role: Role,
    pub role_binding: RoleBinding,
}

impl PipelineFactory {
    pub fn new(images: StepImages) -> Self {
        Self {
            images,
            default_image_pull_secret: None,
        }
    }

    /// Pull secret prepended to every job's declared pull secrets
    pub fn with_default_image_pull_secret(mut self, name: impl Into<String>) -> Self {
        self.default_image_pull_secret = Some(name.into());
        self
    }

    /// Build the configure-workflow job.
    ///
    /// `content_hash` is the caller-supplied fingerprint of the triggering
    /// object; it is stamped as a label so the reconciliation loop can skip
    /// re-creating a job that already ran for this exact input. The builder
    /// itself never checks for duplicates.
    pub fn configure_job(
        &self,
        trigger: &DynamicObject,
        pipeline: &PipelineSpec,
        args: &PipelineArgs,
        object_plural: &str,
        content_hash: &str,
        workflow_type: WorkflowType,
    ) -> PipelineObjects {
        let mut labels = args.configure_labels();
        labels.insert(HASH_LABEL.to_string(), content_hash.to_string());
        self.build(
            trigger,
            pipeline,
            args,
            object_plural,
            workflow_type,
            WorkflowAction::Configure,
            labels,
        )
    }

    /// Build the delete-workflow job
    pub fn delete_job(
        &self,
        trigger: &DynamicObject,
        pipeline: &PipelineSpec,
        args: &PipelineArgs,
        object_plural: &str,
        workflow_type: WorkflowType,
    ) -> PipelineObjects {
        self.build(
            trigger,
            pipeline,
            args,
            object_plural,
            workflow_type,
            WorkflowAction::Delete,
            args.delete_labels(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        &self,
        trigger: &DynamicObject,
        pipeline: &PipelineSpec,
        args: &PipelineArgs,
        object_plural: &str,
        workflow_type: WorkflowType,
        action: WorkflowAction,
        labels: BTreeMap<String, String>,
    ) -> PipelineObjects {
        let (mut steps, volumes) = assemble(
            trigger,
            pipeline,
            args,
            workflow_type,
            action,
            &self.images,
        );
        // The sequence always holds at least the reader step
        let primary = steps.pop().unwrap_or_default();
        let init_containers = steps;

        let job = Job {
            metadata: ObjectMeta {
                name: Some(args.job_name(action)),
                namespace: Some(args.namespace().to_string()),
                labels: Some(labels.clone()),
                ..Default::default()
            },
            spec: Some(JobSpec {
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(labels),
                        ..Default::default()
                    }),
                    spec: Some(PodSpec {
                        restart_policy: Some("OnFailure".to_string()),
                        service_account_name: Some(args.service_account_name()),
                        containers: vec![primary],
                        init_containers: if init_containers.is_empty() {
                            None
                        } else {
                            Some(init_containers)
                        },
                        volumes: Some(volumes),
                        image_pull_secrets: self.image_pull_secrets(pipeline),
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            ..Default::default()
        };

        PipelineObjects {
            job,
            service_account: service_account(args),
            role: role(trigger, object_plural, args),
            role_binding: role_binding(args),
        }
    }

    /// Global default first, then pipeline-declared secrets; duplicates kept
    fn image_pull_secrets(&self, pipeline: &PipelineSpec) -> Option<Vec<LocalObjectReference>> {
        let mut names: Vec<String> = Vec::new();
        if let Some(default) = &self.default_image_pull_secret {
            names.push(default.clone());
        }
        names.extend(pipeline.image_pull_secrets.iter().cloned());
        if names.is_empty() {
            return None;
        }
        Some(
            names
                .into_iter()
                .map(|name| LocalObjectReference { name })
                .collect(),
        )
    }
}

/// Primary container of a built job (the last assembled step)
pub fn primary_container(job: &Job) -> Option<&Container> {
    job.spec
        .as_ref()
        .and_then(|spec| spec.template.spec.as_ref())
        .and_then(|pod| pod.containers.first())
}

fn service_account(args: &PipelineArgs) -> ServiceAccount {
    ServiceAccount {
        metadata: ObjectMeta {
            name: Some(args.service_account_name()),
            namespace: Some(args.namespace().to_string()),
            labels: Some(args.labels()),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn role(trigger: &DynamicObject, object_plural: &str, args: &PipelineArgs) -> Role {
    let (group, _) = crate::steps::trigger_group_kind(trigger);
    Role {
        metadata: ObjectMeta {
            name: Some(args.role_name()),
            namespace: Some(args.namespace().to_string()),
            labels: Some(args.labels()),
            ..Default::default()
        },
        rules: Some(vec![PolicyRule {
            api_groups: Some(vec![group]),
            resources: Some(vec![
                object_plural.to_string(),
                format!("{object_plural}/status"),
            ]),
            verbs: vec!["get".to_string(), "list".to_string(), "delete".to_string()],
            ..Default::default()
        }]),
    }
}

fn role_binding(args: &PipelineArgs) -> RoleBinding {
    RoleBinding {
        metadata: ObjectMeta {
            name: Some(args.role_name()),
            namespace: Some(args.namespace().to_string()),
            labels: Some(args.labels()),
            ..Default::default()
        },
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: "Role".to_string(),
            name: args.role_name(),
        },
        subjects: Some(vec![Subject {
            kind: "ServiceAccount".to_string(),
            name: args.service_account_name(),
            namespace: Some(args.namespace().to_string()),
            ..Default::default()
        }]),
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
