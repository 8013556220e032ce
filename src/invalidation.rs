//! CloudFront cache invalidation
//!
//! After new content lands in the bucket the edge caches still hold the old
//! bytes. One invalidation over `/*` purges everything; the caller reference
//! makes a retried submission idempotent instead of rejected as a duplicate.

use std::time::Duration;

use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use aws_sdk_cloudfront::Client;
use chrono::Utc;
use tokio::time::Instant;

use crate::aws::error_message;
use crate::error::{PublishError, PublishResult};
use crate::poll::{poll_status, PollError, Verdict};

/// How often the invalidation status is re-read while waiting.
const INVALIDATION_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// The only terminal status CloudFront reports for an invalidation.
///
/// There is no failure terminal; a purge stuck in any other state polls
/// until the overall publish deadline cuts it off.
const COMPLETED: &str = "Completed";

/// Purge the whole distribution and block until the purge completes.
pub async fn invalidate_distribution(
    cloudfront: &Client,
    distribution_id: &str,
    deadline: Instant,
) -> PublishResult<()> {
    eprintln!("Creating CloudFront invalidation...");

    let caller_reference = format!(
        "updraft-{}",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    );
    let batch = InvalidationBatch::builder()
        .caller_reference(caller_reference)
        .paths(
            Paths::builder()
                .quantity(1)
                .items("/*")
                .build()
                .map_err(|err| PublishError::Remote {
                    operation: "create invalidation",
                    message: err.to_string(),
                })?,
        )
        .build()
        .map_err(|err| PublishError::Remote {
            operation: "create invalidation",
            message: err.to_string(),
        })?;

    let created = cloudfront
        .create_invalidation()
        .distribution_id(distribution_id)
        .invalidation_batch(batch)
        .send()
        .await
        .map_err(|err| PublishError::Remote {
            operation: "create invalidation",
            message: error_message(&err),
        })?;

    let invalidation_id = created
        .invalidation()
        .map(|invalidation| invalidation.id().to_string())
        .ok_or_else(|| PublishError::Remote {
            operation: "create invalidation",
            message: "no invalidation in response".to_string(),
        })?;

    eprintln!("Invalidation {invalidation_id} created, waiting for completion...");
    let started = Instant::now();

    let result = poll_status(
        INVALIDATION_POLL_INTERVAL,
        deadline,
        || fetch_status(cloudfront, distribution_id, &invalidation_id, started),
        |status| classify_invalidation_status(status),
    )
    .await;

    match result {
        Ok(_) => {
            eprintln!("Invalidation completed in {}s", started.elapsed().as_secs());
            Ok(())
        }
        Err(PollError::Fetch(err)) => Err(err),
        Err(PollError::Terminal(status)) => Err(PublishError::Remote {
            operation: "wait for invalidation",
            message: format!("unexpected terminal status {status}"),
        }),
        Err(PollError::DeadlineExceeded) => Err(PublishError::DeadlineExceeded {
            operation: "waiting for invalidation",
        }),
    }
}

async fn fetch_status(
    cloudfront: &Client,
    distribution_id: &str,
    invalidation_id: &str,
    started: Instant,
) -> PublishResult<String> {
    let output = cloudfront
        .get_invalidation()
        .distribution_id(distribution_id)
        .id(invalidation_id)
        .send()
        .await
        .map_err(|err| PublishError::Remote {
            operation: "get invalidation status",
            message: error_message(&err),
        })?;

    let status = output
        .invalidation()
        .map(|invalidation| invalidation.status().to_string())
        .unwrap_or_default();

    if status != COMPLETED {
        eprintln!("  {} [{}s]", status, started.elapsed().as_secs());
    }
    Ok(status)
}

/// `Completed` succeeds; everything else keeps polling.
pub fn classify_invalidation_status(status: &str) -> Verdict {
    if status == COMPLETED {
        Verdict::Success
    } else {
        Verdict::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_is_the_only_success() {
        assert_eq!(classify_invalidation_status("Completed"), Verdict::Success);
    }

    #[test]
    fn test_everything_else_keeps_polling() {
        assert_eq!(classify_invalidation_status("InProgress"), Verdict::Pending);
        assert_eq!(classify_invalidation_status(""), Verdict::Pending);
        assert_eq!(classify_invalidation_status("completed"), Verdict::Pending);
    }
}
