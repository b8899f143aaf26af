// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow classification
//!
//! Every pipeline executes for a workflow type (whose context: a promise or
//! one of its resource requests) and a workflow action (what the pipeline is
//! accomplishing: configure or delete). Both are injected into every user
//! step's environment.

use serde::{Deserialize, Serialize};

/// Environment variable carrying the workflow type into pipeline steps
pub const WORKFLOW_TYPE_ENV: &str = "KEEL_WORKFLOW_TYPE";

/// Environment variable carrying the workflow action into pipeline steps
pub const WORKFLOW_ACTION_ENV: &str = "KEEL_WORKFLOW_ACTION";

/// Whose context the pipeline executes for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowType {
    Promise,
    Resource,
}

impl WorkflowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowType::Promise => "promise",
            WorkflowType::Resource => "resource",
        }
    }
}

impl std::fmt::Display for WorkflowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the pipeline is accomplishing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowAction {
    Configure,
    Delete,
}

impl WorkflowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowAction::Configure => "configure",
            WorkflowAction::Delete => "delete",
        }
    }
}

impl std::fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
