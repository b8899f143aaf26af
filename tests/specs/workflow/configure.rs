//! Configure workflow specs
//!
//! Verify a triggering object turns into a complete, correctly ordered job.

use crate::prelude::*;
use keel_core::workflow::WorkflowType;
use keel_core::HASH_LABEL;

#[test]
fn configure_workflow_produces_a_complete_job_bundle() {
    let trigger = database_request("acid", "team-a");
    let args = request_args("acid", "team-a");

    let objects = factory().configure_job(
        &trigger,
        &render_pipeline(),
        &args,
        "databases",
        "9bb58f26192e4ba00f01e2e7b136bbd8",
        WorkflowType::Resource,
    );

    // Job and every supporting object land in the request's namespace
    assert_eq!(objects.job.metadata.namespace.as_deref(), Some("team-a"));
    assert_eq!(
        objects.service_account.metadata.namespace.as_deref(),
        Some("team-a")
    );
    assert_eq!(objects.role.metadata.namespace.as_deref(), Some("team-a"));
    assert_eq!(
        objects.role_binding.metadata.namespace.as_deref(),
        Some("team-a")
    );

    let labels = objects.job.metadata.labels.as_ref().unwrap();
    assert_eq!(
        labels.get(HASH_LABEL).map(String::as_str),
        Some("9bb58f26192e4ba00f01e2e7b136bbd8")
    );

    let pod = objects
        .job
        .spec
        .as_ref()
        .unwrap()
        .template
        .spec
        .as_ref()
        .unwrap();
    let init: Vec<_> = pod
        .init_containers
        .as_ref()
        .unwrap()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(init, vec!["reader", "render"]);
    assert_eq!(pod.containers[0].name, "publisher");

    let command = pod.containers[0].command.as_ref().unwrap();
    assert!(command[2].contains("-promise-name postgres"));
    assert!(command[2].contains("-resource-name acid"));
}

#[test]
fn rebuilding_for_the_same_input_is_identical() {
    let trigger = database_request("acid", "team-a");
    let args = request_args("acid", "team-a");

    let first = factory().configure_job(
        &trigger,
        &render_pipeline(),
        &args,
        "databases",
        "hash",
        WorkflowType::Resource,
    );
    let second = factory().configure_job(
        &trigger,
        &render_pipeline(),
        &args,
        "databases",
        "hash",
        WorkflowType::Resource,
    );

    assert_eq!(first.job.metadata.name, second.job.metadata.name);
    assert_eq!(first.job.metadata.labels, second.job.metadata.labels);
    assert_eq!(
        serde_json::to_value(&first.job).unwrap(),
        serde_json::to_value(&second.job).unwrap()
    );
}
