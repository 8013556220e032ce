//! Embedded CloudFormation template
//!
//! The stack body ships inside the binary so a publish needs no extra
//! files. Submission code treats the body as an opaque payload; the
//! parameter and output names below are the only contract between the
//! template and the rest of the tool.

/// Raw template body submitted with every create or update.
pub const BODY: &str = include_str!("template.yaml");

pub const PARAM_SUBDOMAIN: &str = "Subdomain";
pub const PARAM_DOMAIN_NAME: &str = "DomainName";
pub const PARAM_HOSTED_ZONE_ID: &str = "HostedZoneId";

pub const OUTPUT_BUCKET_NAME: &str = "BucketName";
pub const OUTPUT_DISTRIBUTION_ID: &str = "DistributionId";
pub const OUTPUT_DISTRIBUTION_DOMAIN: &str = "DistributionDomain";
pub const OUTPUT_SITE_URL: &str = "SiteURL";

#[cfg(test)]
mod tests {
    use super::*;

    // The template is opaque to the code, but its parameter and output
    // names must not drift from the constants the stack module binds.
    #[test]
    fn test_template_declares_the_bound_parameters() {
        for param in [PARAM_SUBDOMAIN, PARAM_DOMAIN_NAME, PARAM_HOSTED_ZONE_ID] {
            assert!(BODY.contains(&format!("{param}:")), "missing parameter {param}");
        }
    }

    #[test]
    fn test_template_declares_the_recognized_outputs() {
        for output in [
            OUTPUT_BUCKET_NAME,
            OUTPUT_DISTRIBUTION_ID,
            OUTPUT_DISTRIBUTION_DOMAIN,
            OUTPUT_SITE_URL,
        ] {
            assert!(BODY.contains(&format!("{output}:")), "missing output {output}");
        }
    }
}
