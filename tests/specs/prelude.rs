//! Shared fixtures for engine specs

use k8s_openapi::api::batch::v1::Job;
use keel_core::args::PipelineArgs;
use keel_core::pipeline::{PipelineSpec, StepSpec};
use keel_engine::{PipelineFactory, StepImages};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};

pub fn factory() -> PipelineFactory {
    PipelineFactory::new(StepImages {
        reader: "registry.keel.io/reader:v1".to_string(),
        publisher: "registry.keel.io/publisher:v1".to_string(),
    })
}

pub fn database_gvk() -> GroupVersionKind {
    GroupVersionKind::gvk("marketplace.example.com", "v1", "Database")
}

pub fn database_request(name: &str, namespace: &str) -> DynamicObject {
    let resource = ApiResource::from_gvk(&database_gvk());
    let mut trigger = DynamicObject::new(name, &resource).within(namespace);
    trigger.data = serde_json::json!({"spec": {"size": "small"}});
    trigger
}

pub fn request_args(name: &str, namespace: &str) -> PipelineArgs {
    PipelineArgs::for_resource("postgres", name, "instance-configure", name, namespace)
}

pub fn job_gvk() -> GroupVersionKind {
    GroupVersionKind::gvk("batch", "v1", "Job")
}

/// A built job as the object store would hand it back
pub fn job_object(job: &Job) -> DynamicObject {
    let resource = ApiResource::from_gvk(&job_gvk());
    let mut object = DynamicObject::new(
        job.metadata.name.as_deref().unwrap_or_default(),
        &resource,
    );
    object.metadata.namespace = job.metadata.namespace.clone();
    object.metadata.labels = job.metadata.labels.clone();
    object
}

pub fn render_pipeline() -> PipelineSpec {
    PipelineSpec {
        name: "instance-configure".to_string(),
        steps: vec![StepSpec {
            name: "render".to_string(),
            image: "registry.example.com/render:latest".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    }
}
