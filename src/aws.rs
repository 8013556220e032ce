//! AWS client construction
//!
//! Everything the stack provisions lives in us-east-1: the ACM certificate
//! attached to a CloudFront distribution must be issued there, Route53 and
//! CloudFront are global services that answer through it, and the content
//! bucket is created by the same stack. Credentials come from the standard
//! chain (environment, shared config, instance role); a named profile or
//! region override is threaded in explicitly at construction time.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation::error::ProvideErrorMetadata;

/// Region every provisioning client is pinned to.
const STACK_REGION: &str = "us-east-1";

/// Initialized AWS service clients for one publish run.
pub struct AwsClients {
    pub route53: aws_sdk_route53::Client,
    pub cloudformation: aws_sdk_cloudformation::Client,
    pub cloudfront: aws_sdk_cloudfront::Client,
    pub s3: aws_sdk_s3::Client,
}

impl AwsClients {
    /// Load shared credentials and build one client per service, each pinned
    /// to the stack region.
    pub async fn new(profile: Option<&str>, region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let base = loader.load().await;

        let pinned = Region::new(STACK_REGION);
        Self {
            route53: aws_sdk_route53::Client::from_conf(
                aws_sdk_route53::config::Builder::from(&base)
                    .region(pinned.clone())
                    .build(),
            ),
            cloudformation: aws_sdk_cloudformation::Client::from_conf(
                aws_sdk_cloudformation::config::Builder::from(&base)
                    .region(pinned.clone())
                    .build(),
            ),
            cloudfront: aws_sdk_cloudfront::Client::from_conf(
                aws_sdk_cloudfront::config::Builder::from(&base)
                    .region(pinned.clone())
                    .build(),
            ),
            s3: aws_sdk_s3::Client::from_conf(
                aws_sdk_s3::config::Builder::from(&base).region(pinned).build(),
            ),
        }
    }
}

/// Pull the service error message out of an SDK error.
///
/// The metadata message is where CloudFormation puts the detail the
/// "does not exist" and "No updates are to be performed" shims match on;
/// errors without one fall back to their debug form.
pub(crate) fn error_message<E>(err: &E) -> String
where
    E: ProvideErrorMetadata + std::fmt::Debug,
{
    match err.message() {
        Some(message) => message.to_string(),
        None => format!("{err:?}"),
    }
}
