//! Object-store seam over the content bucket
//!
//! The sync engine needs exactly two operations: enumerate what is already
//! remote with its fingerprints, and upload one file. Hiding S3 behind a
//! trait keeps the diff logic testable with an in-memory store.

use std::collections::HashMap;
use std::path::Path;

use aws_sdk_s3::primitives::ByteStream;

use crate::aws::error_message;
use crate::error::{PublishError, PublishResult};

/// Index of remote object keys to their raw fingerprint strings.
pub type RemoteIndex = HashMap<String, String>;

/// Minimal surface the sync engine needs from the content bucket.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    /// Enumerate existing objects and their fingerprints.
    async fn list_fingerprints(&self) -> PublishResult<RemoteIndex>;

    /// Upload one local file under `key`, served as `content_type`.
    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> PublishResult<()>;
}

/// S3-backed store for one bucket.
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

impl ObjectStore for S3Store {
    async fn list_fingerprints(&self) -> PublishResult<RemoteIndex> {
        let mut index = RemoteIndex::new();

        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| PublishError::Remote {
                operation: "list objects",
                message: error_message(&err),
            })?;
            for object in page.contents() {
                if let (Some(key), Some(etag)) = (object.key(), object.e_tag()) {
                    index.insert(key.to_string(), etag.to_string());
                }
            }
        }

        Ok(index)
    }

    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> PublishResult<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|err| PublishError::FileRead {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, err),
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|err| PublishError::Remote {
                operation: "put object",
                message: error_message(&err),
            })?;

        Ok(())
    }
}
