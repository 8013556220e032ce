//! Updraft - static site publisher for AWS
//!
//! Updraft publishes a local directory of static files to a CDN-backed
//! subdomain. One CloudFormation stack provisions the content bucket,
//! CloudFront distribution, TLS certificate and DNS record; a content-hash
//! sync then uploads only the files whose bytes changed, and the edge cache
//! is invalidated when anything did.

pub mod aws;
pub mod config;
pub mod content_type;
pub mod error;
pub mod fingerprint;
pub mod invalidation;
pub mod poll;
pub mod stack;
pub mod store;
pub mod subdomain;
pub mod sync;
pub mod template;
pub mod zones;

// Re-exports for convenience
pub use aws::AwsClients;
pub use config::{ProjectConfig, PublishConfig, CONFIG_FILE_NAME};
pub use error::{PublishError, PublishResult};
pub use poll::{poll_status, PollError, Verdict};
pub use stack::{StackOutputs, StackParams};
pub use store::{ObjectStore, RemoteIndex, S3Store};
pub use sync::{sync_directory, SyncSummary};
pub use zones::HostedZone;
