// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bucket-backed state store writer

use super::{credential, join_path, CredentialData, StateStoreWriter, WriterError};
use async_trait::async_trait;
use keel_core::statestore::{BucketStateStoreSpec, Destination};

const ACCESS_KEY_ID: &str = "accessKeyID";
const SECRET_ACCESS_KEY: &str = "secretAccessKey";

/// Access-key credentials for a bucket store
#[derive(Debug, Clone)]
pub struct BucketCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl BucketCredentials {
    fn from_data(data: &CredentialData) -> Result<Self, WriterError> {
        Ok(Self {
            access_key_id: credential(data, ACCESS_KEY_ID)?,
            secret_access_key: credential(data, SECRET_ACCESS_KEY)?,
        })
    }
}

/// Writer publishing documents as objects in a bucket
#[derive(Debug)]
pub struct BucketWriter {
    base_url: String,
    prefix: String,
    credentials: Option<BucketCredentials>,
    http: reqwest::Client,
}

impl BucketWriter {
    /// Build a writer from a resolved store spec and destination.
    ///
    /// `credentials` is `None` when the store declares no secret reference;
    /// the writer then relies on ambient or anonymous bucket access.
    pub fn new(
        spec: &BucketStateStoreSpec,
        destination: &Destination,
        credentials: Option<&CredentialData>,
    ) -> Result<Self, WriterError> {
        let credentials = credentials
            .map(BucketCredentials::from_data)
            .transpose()?;
        let endpoint = if spec.endpoint.contains("://") {
            spec.endpoint.trim_end_matches('/').to_string()
        } else {
            let scheme = if spec.insecure { "http" } else { "https" };
            format!("{}://{}", scheme, spec.endpoint.trim_end_matches('/'))
        };
        let prefix = join_path(&[
            spec.path.as_deref().unwrap_or(""),
            destination.path_prefix(),
        ]);
        Ok(Self {
            base_url: format!("{}/{}", endpoint, spec.bucket_name),
            prefix,
            credentials,
            http: reqwest::Client::new(),
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, join_path(&[&self.prefix, path]))
    }
}

#[async_trait]
impl StateStoreWriter for BucketWriter {
    async fn write(&self, path: &str, content: &[u8]) -> Result<(), WriterError> {
        let mut request = self.http.put(self.object_url(path)).body(content.to_vec());
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(
                &credentials.access_key_id,
                Some(&credentials.secret_access_key),
            );
        }
        let response = request
            .send()
            .await
            .map_err(|e| WriterError::WriteFailed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(WriterError::WriteFailed(format!(
                "{} returned {}",
                self.object_url(path),
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "bucket_tests.rs"]
mod tests;
