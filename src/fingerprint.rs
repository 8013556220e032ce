//! Content fingerprints for change detection
//!
//! S3 reports each object's ETag, which for a single-part upload is the MD5
//! of the body as lowercase hex wrapped in double quotes. Comparing that
//! against a locally computed digest is what lets a sync skip files whose
//! bytes have not changed, regardless of modification time.

use std::fs::File;
use std::io;
use std::path::Path;

use md5::{Digest, Md5};

use crate::error::{PublishError, PublishResult};

/// Compute the lowercase-hex MD5 digest of a file's contents.
///
/// The file is streamed through the hasher rather than read whole.
pub fn file_digest(path: &Path) -> PublishResult<String> {
    let mut file = File::open(path).map_err(|source| PublishError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = Md5::new();
    io::copy(&mut file, &mut hasher).map_err(|source| PublishError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(format!("{:x}", hasher.finalize()))
}

/// Strip the quotes S3 wraps around ETag values so they compare equal to
/// locally computed digests.
///
/// Multipart ETags carry a `-N` suffix and never equal a plain MD5; they
/// pass through unchanged and the object counts as changed.
pub fn normalize_fingerprint(remote: &str) -> &str {
    remote.trim_matches('"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    #[test]
    fn test_digest_known_vector() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        let digest = file_digest(file.path()).unwrap();
        assert_eq!(digest, "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn test_digest_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let digest = file_digest(file.path()).unwrap();
        assert_eq!(digest, "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_digest_missing_file_reports_path() {
        let err = file_digest(Path::new("/no/such/file")).unwrap_err();
        assert!(err.to_string().contains("/no/such/file"));
    }

    #[test]
    fn test_normalize_strips_quotes() {
        assert_eq!(normalize_fingerprint("\"abc123\""), "abc123");
        assert_eq!(normalize_fingerprint("abc123"), "abc123");
    }

    #[test]
    fn test_normalize_keeps_multipart_suffix() {
        assert_eq!(
            normalize_fingerprint("\"9bb58f26192e4ba00f01e2e7b136bbd8-4\""),
            "9bb58f26192e4ba00f01e2e7b136bbd8-4"
        );
    }

    proptest! {
        #[test]
        fn prop_quoted_and_bare_fingerprints_compare_equal(digest in "[0-9a-f]{32}") {
            let quoted = format!("\"{digest}\"");
            prop_assert_eq!(normalize_fingerprint(&quoted), digest.as_str());
            prop_assert_eq!(normalize_fingerprint(&digest), digest.as_str());
        }
    }
}
