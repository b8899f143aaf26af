// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Finalizer set helpers
//!
//! Finalizers are an ordered string set on object metadata; while present they
//! block physical deletion. Membership is checked before every add or remove
//! so repeated reconciliations are idempotent.

use thiserror::Error;

/// Guards execution of the delete workflow before the parent goes away
pub const DELETE_WORKFLOWS_FINALIZER: &str = "keel.io/delete-workflows";

/// Guards cleanup of every job the workflows created
pub const WORKFLOWS_CLEANUP_FINALIZER: &str = "keel.io/workflows-cleanup";

/// Longest accepted finalizer string
pub const MAX_FINALIZER_LEN: usize = 64;

/// Errors from finalizer manipulation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FinalizerError {
    #[error("finalizer {finalizer:?} is {len} characters, maximum is {MAX_FINALIZER_LEN}")]
    TooLong { finalizer: String, len: usize },
}

/// Reject finalizers longer than the platform allows; never truncate.
pub fn validate(finalizer: &str) -> Result<(), FinalizerError> {
    let len = finalizer.chars().count();
    if len > MAX_FINALIZER_LEN {
        return Err(FinalizerError::TooLong {
            finalizer: finalizer.to_string(),
            len,
        });
    }
    Ok(())
}

/// Add a finalizer if absent. Returns whether the set changed.
pub fn add(finalizers: &mut Vec<String>, finalizer: &str) -> Result<bool, FinalizerError> {
    validate(finalizer)?;
    if contains(finalizers, finalizer) {
        return Ok(false);
    }
    finalizers.push(finalizer.to_string());
    Ok(true)
}

/// Remove a finalizer if present. Returns whether the set changed.
pub fn remove(finalizers: &mut Vec<String>, finalizer: &str) -> bool {
    let before = finalizers.len();
    finalizers.retain(|f| f != finalizer);
    finalizers.len() != before
}

pub fn contains(finalizers: &[String], finalizer: &str) -> bool {
    finalizers.iter().any(|f| f == finalizer)
}

#[cfg(test)]
#[path = "finalizer_tests.rs"]
mod tests;
