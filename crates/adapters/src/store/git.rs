// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Version-control-backed state store writer

use super::{credential, join_path, CredentialData, StateStoreWriter, WriterError};
use async_trait::async_trait;
use keel_core::statestore::{Destination, GitStateStoreSpec};
use std::path::Path;
use tokio::process::Command;

const USERNAME_KEY: &str = "username";
const PASSWORD_KEY: &str = "password";

const COMMIT_AUTHOR: &str = "keel";
const COMMIT_EMAIL: &str = "keel@keel.io";

/// Writer publishing documents as commits on a branch
#[derive(Debug)]
pub struct GitWriter {
    url: String,
    branch: String,
    prefix: String,
    username: String,
    password: String,
}

impl GitWriter {
    /// Build a writer from a resolved store spec and destination.
    ///
    /// Unlike bucket stores, credentials are mandatory here; the secret must
    /// carry `username` and `password` keys.
    pub fn new(
        spec: &GitStateStoreSpec,
        destination: &Destination,
        credentials: &CredentialData,
    ) -> Result<Self, WriterError> {
        Ok(Self {
            url: spec.url.clone(),
            branch: spec.branch.clone(),
            prefix: join_path(&[
                spec.path.as_deref().unwrap_or(""),
                destination.path_prefix(),
            ]),
            username: credential(credentials, USERNAME_KEY)?,
            password: credential(credentials, PASSWORD_KEY)?,
        })
    }

    /// Remote URL with the credentials spliced into the authority
    fn authenticated_url(&self) -> String {
        match self.url.split_once("://") {
            Some((scheme, rest)) => {
                format!("{}://{}:{}@{}", scheme, self.username, self.password, rest)
            }
            None => self.url.clone(),
        }
    }

    async fn git(&self, workdir: &Path, args: &[&str]) -> Result<String, WriterError> {
        let output = Command::new("git")
            .current_dir(workdir)
            .args(args)
            .output()
            .await
            .map_err(|e| WriterError::CommandFailed(e.to_string()))?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WriterError::CommandFailed(format!(
                "git {}: {}",
                args.first().unwrap_or(&""),
                stderr.trim()
            )));
        }
        Ok(stdout)
    }
}

#[async_trait]
impl StateStoreWriter for GitWriter {
    async fn write(&self, path: &str, content: &[u8]) -> Result<(), WriterError> {
        let checkout = tempfile::tempdir().map_err(|e| WriterError::WriteFailed(e.to_string()))?;
        let workdir = checkout.path();

        self.git(
            workdir,
            &[
                "clone",
                "--depth",
                "1",
                "--branch",
                &self.branch,
                &self.authenticated_url(),
                ".",
            ],
        )
        .await?;

        let document = workdir.join(join_path(&[&self.prefix, path]));
        if let Some(parent) = document.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| WriterError::WriteFailed(e.to_string()))?;
        }
        tokio::fs::write(&document, content)
            .await
            .map_err(|e| WriterError::WriteFailed(e.to_string()))?;

        self.git(workdir, &["add", "-A"]).await?;

        let status = self.git(workdir, &["status", "--porcelain"]).await?;
        if status.trim().is_empty() {
            // Identical content already on the branch; idempotent success
            return Ok(());
        }

        let message = format!("update {}", join_path(&[&self.prefix, path]));
        self.git(
            workdir,
            &[
                "-c",
                &format!("user.name={COMMIT_AUTHOR}"),
                "-c",
                &format!("user.email={COMMIT_EMAIL}"),
                "commit",
                "-m",
                &message,
            ],
        )
        .await?;

        self.git(workdir, &["push", "origin", &self.branch]).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
