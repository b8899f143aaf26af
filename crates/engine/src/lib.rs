// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Keel execution-planning engine
//!
//! Turns declarative pipeline templates into runnable workflow jobs, resolves
//! destinations to state store writers, and drives idempotent cleanup of
//! everything the workflows created.

pub mod cleanup;
pub mod job;
pub mod steps;
pub mod store;

pub use cleanup::{
    delete_matching, ensure_finalizers, jobs_with_labels, remove_finalizer, CleanupError,
    CleanupPhase, Sweep,
};
pub use job::{PipelineFactory, PipelineObjects};
pub use steps::{assemble, StepImages};
pub use store::{writer_for_destination, StoreError};
