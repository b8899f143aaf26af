//! Deletion lifecycle specs
//!
//! Walk a parent object from finalizer installation through job cleanup to
//! the point where every platform finalizer is released.

use crate::prelude::*;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use keel_adapters::client::{FakeObjectClient, ObjectKey};
use keel_core::workflow::WorkflowType;
use keel_core::{DELETE_WORKFLOWS_FINALIZER, WORKFLOWS_CLEANUP_FINALIZER};
use keel_engine::{
    delete_matching, ensure_finalizers, remove_finalizer, CleanupPhase, Sweep,
};

#[tokio::test]
async fn deletion_releases_finalizers_only_after_the_sweep_clears() {
    let client = FakeObjectClient::new();
    let gvk = database_gvk();
    let mut parent = database_request("acid", "team-a");
    client.insert(&gvk, parent.clone());

    // Reconcile an active object: both finalizers get installed
    ensure_finalizers(
        &client,
        &gvk,
        &mut parent,
        &[DELETE_WORKFLOWS_FINALIZER, WORKFLOWS_CLEANUP_FINALIZER],
    )
    .await
    .unwrap();
    assert_eq!(CleanupPhase::of(&parent.metadata), CleanupPhase::Active);

    // Deletion arrives; the delete workflow phase comes first
    parent.metadata.deletion_timestamp = Some(Time(chrono::Utc::now()));
    assert_eq!(
        CleanupPhase::of(&parent.metadata),
        CleanupPhase::DeleteWorkflowsInFlight
    );

    // The delete pipeline job is built and applied by the loop
    let args = request_args("acid", "team-a");
    let objects = factory().delete_job(
        &parent,
        &render_pipeline(),
        &args,
        "databases",
        WorkflowType::Resource,
    );
    client.insert(&job_gvk(), job_object(&objects.job));

    // Delete workflow finished; its finalizer is released
    remove_finalizer(&client, &gvk, &mut parent, DELETE_WORKFLOWS_FINALIZER)
        .await
        .unwrap();
    assert_eq!(
        CleanupPhase::of(&parent.metadata),
        CleanupPhase::JobCleanupInFlight
    );

    // First sweep finds the delete job and reports remaining
    let sweep = delete_matching(&client, &job_gvk(), Some("team-a"), Some(&args.labels()))
        .await
        .unwrap();
    assert_eq!(sweep, Sweep::Remaining);

    // The requeued sweep finds nothing; only now may the finalizer go
    let sweep = delete_matching(&client, &job_gvk(), Some("team-a"), Some(&args.labels()))
        .await
        .unwrap();
    assert_eq!(sweep, Sweep::Clear);

    remove_finalizer(&client, &gvk, &mut parent, WORKFLOWS_CLEANUP_FINALIZER)
        .await
        .unwrap();
    assert_eq!(CleanupPhase::of(&parent.metadata), CleanupPhase::Removed);

    let stored = client
        .object(&gvk, &ObjectKey::namespaced("acid", "team-a"))
        .unwrap();
    assert_eq!(stored.metadata.finalizers.as_deref(), Some([].as_slice()));
}

#[tokio::test]
async fn a_failed_sweep_leaves_the_finalizer_in_place() {
    let client = FakeObjectClient::new();
    let gvk = database_gvk();
    let mut parent = database_request("acid", "team-a");
    parent.metadata.finalizers = Some(vec![WORKFLOWS_CLEANUP_FINALIZER.to_string()]);
    parent.metadata.deletion_timestamp = Some(Time(chrono::Utc::now()));
    client.insert(&gvk, parent.clone());

    let args = request_args("acid", "team-a");
    let objects = factory().delete_job(
        &parent,
        &render_pipeline(),
        &args,
        "databases",
        WorkflowType::Resource,
    );
    let job_name = objects.job.metadata.name.clone().unwrap_or_default();
    client.insert(&job_gvk(), job_object(&objects.job));
    client.fail_delete_of(job_name);

    let result = delete_matching(&client, &job_gvk(), Some("team-a"), Some(&args.labels())).await;
    assert!(result.is_err());

    // The loop must not release the finalizer on error; phase is unchanged
    assert_eq!(
        CleanupPhase::of(&parent.metadata),
        CleanupPhase::JobCleanupInFlight
    );
}
