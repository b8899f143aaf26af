// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container-step assembly
//!
//! Turns a pipeline template plus its triggering object into the full ordered
//! step sequence: a synthetic reader first, the user steps in declaration
//! order, and (for configure workflows only) a synthetic publisher last.
//! Pure function; the job builder decides which step runs in the primary slot.

use k8s_openapi::api::core::v1::{
    Container, EmptyDirVolumeSource, EnvVar, Volume, VolumeMount,
};
use keel_core::args::PipelineArgs;
use keel_core::pipeline::{PipelineSpec, StepSpec};
use keel_core::workflow::{
    WorkflowAction, WorkflowType, WORKFLOW_ACTION_ENV, WORKFLOW_TYPE_ENV,
};
use kube::core::DynamicObject;

/// Volume the reader materializes the triggering object's spec onto
pub const SHARED_INPUT_VOLUME: &str = "shared-input";

/// Volume the publisher collects rendered documents from
pub const SHARED_OUTPUT_VOLUME: &str = "shared-output";

/// Mount path of the shared input volume
pub const SHARED_INPUT_DIR: &str = "/keel/input";

/// Mount path of the shared output volume
pub const SHARED_OUTPUT_DIR: &str = "/keel/output";

const OBJECT_GROUP_ENV: &str = "KEEL_OBJECT_GROUP";
const OBJECT_KIND_ENV: &str = "KEEL_OBJECT_KIND";
const OBJECT_NAME_ENV: &str = "KEEL_OBJECT_NAME";
const OBJECT_NAMESPACE_ENV: &str = "KEEL_OBJECT_NAMESPACE";

/// Container images for the synthetic reader and publisher steps.
///
/// Injected explicitly at construction so assembly stays pure and testable
/// without process-environment mutation.
#[derive(Debug, Clone)]
pub struct StepImages {
    pub reader: String,
    pub publisher: String,
}

/// Assemble the ordered step sequence and volume set for one workflow job
pub fn assemble(
    trigger: &DynamicObject,
    pipeline: &PipelineSpec,
    args: &PipelineArgs,
    workflow_type: WorkflowType,
    action: WorkflowAction,
    images: &StepImages,
) -> (Vec<Container>, Vec<Volume>) {
    let mut volumes = default_volumes();
    volumes.extend(pipeline.volumes.iter().cloned());

    let mut steps = vec![reader_step(trigger, workflow_type, action, &images.reader)];
    for step in &pipeline.steps {
        steps.push(user_step(step, workflow_type, action));
    }
    if action == WorkflowAction::Configure {
        steps.push(publisher_step(trigger, args, workflow_type, &images.publisher));
    }

    (steps, volumes)
}

fn default_volumes() -> Vec<Volume> {
    [SHARED_INPUT_VOLUME, SHARED_OUTPUT_VOLUME]
        .iter()
        .map(|name| Volume {
            name: name.to_string(),
            empty_dir: Some(EmptyDirVolumeSource::default()),
            ..Default::default()
        })
        .collect()
}

fn default_mounts() -> Vec<VolumeMount> {
    vec![
        VolumeMount {
            name: SHARED_INPUT_VOLUME.to_string(),
            mount_path: SHARED_INPUT_DIR.to_string(),
            ..Default::default()
        },
        VolumeMount {
            name: SHARED_OUTPUT_VOLUME.to_string(),
            mount_path: SHARED_OUTPUT_DIR.to_string(),
            ..Default::default()
        },
    ]
}

fn env_var(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.to_string()),
        ..Default::default()
    }
}

/// Mandatory variables every step receives, ahead of user-declared env
fn workflow_env(workflow_type: WorkflowType, action: WorkflowAction) -> Vec<EnvVar> {
    vec![
        env_var(WORKFLOW_ACTION_ENV, action.as_str()),
        env_var(WORKFLOW_TYPE_ENV, workflow_type.as_str()),
    ]
}

/// Group and kind of the triggering object
pub(crate) fn trigger_group_kind(trigger: &DynamicObject) -> (String, String) {
    match &trigger.types {
        Some(types) => {
            let group = match types.api_version.split_once('/') {
                Some((group, _)) => group.to_string(),
                None => String::new(),
            };
            (group, types.kind.clone())
        }
        None => (String::new(), String::new()),
    }
}

/// Synthetic first step: serializes the triggering object's spec onto the
/// shared input volume. Carries no user-declared fields.
fn reader_step(
    trigger: &DynamicObject,
    workflow_type: WorkflowType,
    action: WorkflowAction,
    image: &str,
) -> Container {
    let (group, kind) = trigger_group_kind(trigger);
    let mut env = workflow_env(workflow_type, action);
    env.push(env_var(OBJECT_GROUP_ENV, &group));
    env.push(env_var(OBJECT_KIND_ENV, &kind));
    env.push(env_var(
        OBJECT_NAME_ENV,
        trigger.metadata.name.as_deref().unwrap_or_default(),
    ));
    env.push(env_var(
        OBJECT_NAMESPACE_ENV,
        trigger.metadata.namespace.as_deref().unwrap_or_default(),
    ));

    Container {
        name: "reader".to_string(),
        image: Some(image.to_string()),
        env: Some(env),
        volume_mounts: Some(vec![VolumeMount {
            name: SHARED_INPUT_VOLUME.to_string(),
            mount_path: SHARED_INPUT_DIR.to_string(),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

/// One user-declared step with merged environment and mounts
fn user_step(step: &StepSpec, workflow_type: WorkflowType, action: WorkflowAction) -> Container {
    let mut env = workflow_env(workflow_type, action);
    env.extend(step.env.iter().cloned());

    let mut mounts = default_mounts();
    mounts.extend(step.volume_mounts.iter().cloned());

    Container {
        name: step.name.clone(),
        image: Some(step.image.clone()),
        command: non_empty(&step.command),
        args: non_empty(&step.args),
        env: Some(env),
        env_from: non_empty(&step.env_from),
        volume_mounts: Some(mounts),
        image_pull_policy: step.image_pull_policy.clone(),
        ..Default::default()
    }
}

/// Synthetic last step of configure workflows: publishes the rendered output
/// as work for the scheduler
fn publisher_step(
    trigger: &DynamicObject,
    args: &PipelineArgs,
    workflow_type: WorkflowType,
    image: &str,
) -> Container {
    let mut command = format!(
        "./work-publisher -input-directory {} -promise-name {} -pipeline-name {} -namespace {} -workflow-type {}",
        SHARED_OUTPUT_DIR,
        args.promise_id(),
        args.pipeline_name(),
        args.namespace(),
        workflow_type,
    );
    if workflow_type == WorkflowType::Resource {
        let resource_name = trigger.metadata.name.as_deref().unwrap_or_default();
        command.push_str(&format!(" -resource-name {resource_name}"));
    }

    Container {
        name: "publisher".to_string(),
        image: Some(image.to_string()),
        command: Some(vec!["sh".to_string(), "-c".to_string(), command]),
        volume_mounts: Some(vec![VolumeMount {
            name: SHARED_OUTPUT_VOLUME.to_string(),
            mount_path: SHARED_OUTPUT_DIR.to_string(),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

fn non_empty<T: Clone>(items: &[T]) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items.to_vec())
    }
}

#[cfg(test)]
#[path = "steps_tests.rs"]
mod tests;
