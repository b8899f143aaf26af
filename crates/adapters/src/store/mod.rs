// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State store writer adapters
//!
//! A writer is the capability handed back to the reconciliation loop once a
//! destination's backend and credentials have been resolved. Construction
//! validates credentials; the transfer itself is deliberately thin.

mod bucket;
mod git;

pub use bucket::BucketWriter;
pub use git::GitWriter;

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Decoded key/value bytes of a credential secret
pub type CredentialData = BTreeMap<String, Vec<u8>>;

/// Errors from writer construction and writes
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("credential key {0:?} missing or not valid UTF-8")]
    MissingCredential(&'static str),
    #[error("command failed: {0}")]
    CommandFailed(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
}

/// Writer capability over a resolved state store destination
#[async_trait]
pub trait StateStoreWriter: Send + Sync {
    /// Write one document at the given path under the destination's prefix
    async fn write(&self, path: &str, content: &[u8]) -> Result<(), WriterError>;
}

/// Pull a UTF-8 credential value out of secret data
fn credential(data: &CredentialData, key: &'static str) -> Result<String, WriterError> {
    data.get(key)
        .and_then(|bytes| String::from_utf8(bytes.clone()).ok())
        .ok_or(WriterError::MissingCredential(key))
}

/// Join path segments with single slashes, skipping empty segments
fn join_path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
