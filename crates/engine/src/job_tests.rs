use super::*;
use keel_core::pipeline::StepSpec;
use kube::core::{ApiResource, GroupVersionKind};

fn factory() -> PipelineFactory {
    PipelineFactory::new(StepImages {
        reader: "registry.keel.io/reader:v1".to_string(),
        publisher: "registry.keel.io/publisher:v1".to_string(),
    })
}

fn trigger() -> DynamicObject {
    let gvk = GroupVersionKind::gvk("marketplace.example.com", "v1", "Database");
    let resource = ApiResource::from_gvk(&gvk);
    let mut trigger = DynamicObject::new("acid", &resource).within("team-a");
    trigger.data = serde_json::json!({"spec": {"size": "small"}});
    trigger
}

fn args() -> PipelineArgs {
    PipelineArgs::for_resource("postgres", "acid-request", "instance-configure", "acid", "team-a")
}

fn pipeline() -> PipelineSpec {
    PipelineSpec {
        name: "instance-configure".to_string(),
        steps: vec![
            StepSpec {
                name: "render".to_string(),
                image: "registry.example.com/render:latest".to_string(),
                ..Default::default()
            },
            StepSpec {
                name: "validate".to_string(),
                image: "registry.example.com/validate:latest".to_string(),
                ..Default::default()
            },
        ],
        ..Default::default()
    }
}

fn pod_spec(job: &Job) -> &PodSpec {
    job.spec
        .as_ref()
        .unwrap()
        .template
        .spec
        .as_ref()
        .unwrap()
}

#[test]
fn content_hash_is_stamped_verbatim() {
    const HASH: &str = "9bb58f26192e4ba00f01e2e7b136bbd8";
    let objects = factory().configure_job(
        &trigger(),
        &pipeline(),
        &args(),
        "databases",
        HASH,
        WorkflowType::Resource,
    );
    let labels = objects.job.metadata.labels.as_ref().unwrap();
    assert_eq!(labels.get(HASH_LABEL).map(String::as_str), Some(HASH));
}

#[test]
fn delete_job_carries_no_content_hash() {
    let objects = factory().delete_job(
        &trigger(),
        &pipeline(),
        &args(),
        "databases",
        WorkflowType::Resource,
    );
    let labels = objects.job.metadata.labels.as_ref().unwrap();
    assert!(labels.get(HASH_LABEL).is_none());
    assert_eq!(
        labels.get("keel.io/work-type").map(String::as_str),
        Some("delete")
    );
}

#[test]
fn configure_primary_slot_is_the_publisher() {
    let objects = factory().configure_job(
        &trigger(),
        &pipeline(),
        &args(),
        "databases",
        "hash",
        WorkflowType::Resource,
    );
    let pod = pod_spec(&objects.job);
    let init: Vec<_> = pod
        .init_containers
        .as_ref()
        .unwrap()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(init, vec!["reader", "render", "validate"]);
    assert_eq!(pod.containers.len(), 1);
    assert_eq!(pod.containers[0].name, "publisher");
}

#[test]
fn delete_primary_slot_is_the_last_user_step() {
    let objects = factory().delete_job(
        &trigger(),
        &pipeline(),
        &args(),
        "databases",
        WorkflowType::Resource,
    );
    let pod = pod_spec(&objects.job);
    let init: Vec<_> = pod
        .init_containers
        .as_ref()
        .unwrap()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(init, vec!["reader", "render"]);
    assert_eq!(pod.containers[0].name, "validate");
}

#[test]
fn delete_with_no_user_steps_promotes_the_reader() {
    let objects = factory().delete_job(
        &trigger(),
        &PipelineSpec::named("instance-configure"),
        &args(),
        "databases",
        WorkflowType::Resource,
    );
    let pod = pod_spec(&objects.job);
    assert!(pod.init_containers.is_none());
    assert_eq!(pod.containers[0].name, "reader");
}

#[test]
fn job_metadata_follows_the_naming_args() {
    let objects = factory().configure_job(
        &trigger(),
        &pipeline(),
        &args(),
        "databases",
        "hash",
        WorkflowType::Resource,
    );
    assert_eq!(
        objects.job.metadata.name.as_deref(),
        Some("keel-configure-postgres-acid-request-instance-configure")
    );
    assert_eq!(objects.job.metadata.namespace.as_deref(), Some("team-a"));

    let pod = pod_spec(&objects.job);
    assert_eq!(pod.restart_policy.as_deref(), Some("OnFailure"));
    assert_eq!(
        pod.service_account_name.as_deref(),
        Some(args().service_account_name().as_str())
    );
}

#[test]
fn pull_secrets_concatenate_global_then_declared() {
    let mut spec = pipeline();
    spec.image_pull_secrets = vec!["test-secret".to_string(), "another-secret".to_string()];

    let objects = factory()
        .with_default_image_pull_secret("registry-secret")
        .configure_job(
            &trigger(),
            &spec,
            &args(),
            "databases",
            "hash",
            WorkflowType::Resource,
        );
    let secrets = pod_spec(&objects.job).image_pull_secrets.as_ref().unwrap();
    let names: Vec<_> = secrets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["registry-secret", "test-secret", "another-secret"]);
}

#[test]
fn duplicate_pull_secrets_are_not_removed() {
    let mut spec = pipeline();
    spec.image_pull_secrets = vec!["registry-secret".to_string()];

    let objects = factory()
        .with_default_image_pull_secret("registry-secret")
        .configure_job(
            &trigger(),
            &spec,
            &args(),
            "databases",
            "hash",
            WorkflowType::Resource,
        );
    let secrets = pod_spec(&objects.job).image_pull_secrets.as_ref().unwrap();
    assert_eq!(secrets.len(), 2);
}

#[test]
fn no_pull_secrets_yields_none() {
    let objects = factory().configure_job(
        &trigger(),
        &pipeline(),
        &args(),
        "databases",
        "hash",
        WorkflowType::Resource,
    );
    assert!(pod_spec(&objects.job).image_pull_secrets.is_none());
}

#[test]
fn access_grants_cover_the_triggering_resource_kind() {
    let objects = factory().delete_job(
        &trigger(),
        &pipeline(),
        &args(),
        "databases",
        WorkflowType::Resource,
    );

    let rules = objects.role.rules.as_ref().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(
        rules[0].api_groups.as_deref(),
        Some(["marketplace.example.com".to_string()].as_slice())
    );
    assert_eq!(
        rules[0].resources.as_deref(),
        Some(["databases".to_string(), "databases/status".to_string()].as_slice())
    );
    assert_eq!(rules[0].verbs, vec!["get", "list", "delete"]);

    let subjects = objects.role_binding.subjects.as_ref().unwrap();
    assert_eq!(subjects[0].kind, "ServiceAccount");
    assert_eq!(subjects[0].name, args().service_account_name());
    assert_eq!(subjects[0].namespace.as_deref(), Some("team-a"));
    assert_eq!(objects.role_binding.role_ref.name, args().role_name());
    assert_eq!(
        objects.service_account.metadata.namespace.as_deref(),
        Some("team-a")
    );
}

#[test]
fn primary_container_helper_reads_the_built_job() {
    let objects = factory().configure_job(
        &trigger(),
        &pipeline(),
        &args(),
        "databases",
        "hash",
        WorkflowType::Resource,
    );
    assert_eq!(
        primary_container(&objects.job).map(|c| c.name.as_str()),
        Some("publisher")
    );
}
