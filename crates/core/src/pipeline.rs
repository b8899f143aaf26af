// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-declared pipeline templates
//!
//! A pipeline is an ordered list of steps plus optional shared volumes and
//! image-pull credential names. The declaration is inert data; the engine
//! turns it into a runnable job.

use k8s_openapi::api::core::v1::{EnvFromSource, EnvVar, Volume, VolumeMount};
use serde::{Deserialize, Serialize};

/// A user-declared pipeline template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineSpec {
    /// Pipeline name, unique within its promise
    pub name: String,
    /// Ordered steps; executed strictly in declaration order
    pub steps: Vec<StepSpec>,
    /// Shared volumes appended after the platform's default volumes
    pub volumes: Vec<Volume>,
    /// Image-pull secret names appended after the global default, if any
    pub image_pull_secrets: Vec<String>,
}

impl PipelineSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// One user-declared step within a pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepSpec {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
    pub args: Vec<String>,
    /// Environment appended after the mandatory workflow variables
    pub env: Vec<EnvVar>,
    pub env_from: Vec<EnvFromSource>,
    /// Mounts appended after the default shared mounts
    pub volume_mounts: Vec<VolumeMount>,
    pub image_pull_policy: Option<String>,
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
