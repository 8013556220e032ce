//! Content synchronization between a local tree and the content bucket
//!
//! Uploads are gated purely on content fingerprints: a file whose bytes
//! match what is already remote is never transferred, however often it was
//! rebuilt. Objects that exist remotely but not locally are left alone:
//! publishing is append-only and never destroys remote state the local
//! tree does not know about.

use std::fs;
use std::path::{Path, PathBuf};

use crate::content_type::content_type_for;
use crate::error::{PublishError, PublishResult};
use crate::fingerprint::{file_digest, normalize_fingerprint};
use crate::store::ObjectStore;

/// Aggregate counts for one sync run.
///
/// `uploaded + skipped` always equals the number of local files discovered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub uploaded: usize,
    pub skipped: usize,
}

/// One local file staged for comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LocalFile {
    path: PathBuf,
    key: String,
}

/// Diff the build directory against the store and upload what changed.
pub async fn sync_directory<S: ObjectStore>(store: &S, local_root: &Path) -> PublishResult<SyncSummary> {
    // A brand-new bucket has nothing in it and may not even answer the
    // listing yet; either way the index is empty.
    let existing = store.list_fingerprints().await.unwrap_or_default();

    let files = collect_files(local_root)?;
    if files.is_empty() {
        return Err(PublishError::NothingToPublish {
            path: local_root.to_path_buf(),
        });
    }

    eprintln!("Syncing {} files", files.len());

    let mut summary = SyncSummary::default();
    for file in &files {
        let digest = file_digest(&file.path)?;

        if let Some(remote) = existing.get(&file.key) {
            if normalize_fingerprint(remote) == digest {
                summary.skipped += 1;
                continue;
            }
        }

        store
            .put_file(&file.key, &file.path, content_type_for(&file.path))
            .await?;
        eprintln!("  Uploaded: {}", file.key);
        summary.uploaded += 1;
    }

    eprintln!(
        "Sync complete: {} uploaded, {} unchanged",
        summary.uploaded, summary.skipped
    );
    Ok(summary)
}

/// Collect every regular file under `root`, sorted by key for deterministic
/// upload order.
fn collect_files(root: &Path) -> PublishResult<Vec<LocalFile>> {
    if !root.is_dir() {
        return Err(PublishError::BuildDirNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    collect_recursive(root, "", &mut files)?;
    files.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(files)
}

fn collect_recursive(dir: &Path, prefix: &str, files: &mut Vec<LocalFile>) -> PublishResult<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        // Object keys use forward slashes whatever the host separator is.
        let key = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_recursive(&entry.path(), &key, files)?;
        } else if file_type.is_file() {
            files.push(LocalFile {
                path: entry.path(),
                key,
            });
        }
        // Symlinks and other special entries are not published.
    }
    Ok(())
}
