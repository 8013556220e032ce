//! Route53 hosted-zone discovery and selection
//!
//! The site's DNS record lands in an existing public hosted zone. With one
//! zone in the account the choice is obvious; with several, the operator is
//! asked once and the answer is persisted in the project config.

use std::io::{self, BufRead, Write};

use is_terminal::IsTerminal;

use crate::aws::error_message;
use crate::error::{PublishError, PublishResult};

/// A public hosted zone after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    pub id: String,
    pub name: String,
}

impl HostedZone {
    /// Build from the raw API fields: the id arrives as `/hostedzone/Z...`
    /// and the name with a trailing dot.
    fn from_api(id: &str, name: &str) -> Self {
        Self {
            id: id.trim_start_matches("/hostedzone/").to_string(),
            name: name.trim_end_matches('.').to_string(),
        }
    }
}

/// List all public hosted zones in the account.
pub async fn list_hosted_zones(route53: &aws_sdk_route53::Client) -> PublishResult<Vec<HostedZone>> {
    let mut zones = Vec::new();

    let mut pages = route53.list_hosted_zones().into_paginator().send();
    while let Some(page) = pages.next().await {
        let page = page.map_err(|err| PublishError::Remote {
            operation: "list hosted zones",
            message: error_message(&err),
        })?;

        for zone in page.hosted_zones() {
            let private = zone
                .config()
                .map(|config| config.private_zone())
                .unwrap_or(false);
            if private {
                continue;
            }
            zones.push(HostedZone::from_api(zone.id(), zone.name()));
        }
    }

    Ok(zones)
}

/// Pick the zone to publish under.
///
/// Zero zones is fatal. One zone is used as-is. Several zones prompt on
/// stderr when stdin is a terminal; otherwise the operator is told to pin a
/// zone in the project config.
pub fn select_hosted_zone(mut zones: Vec<HostedZone>) -> PublishResult<HostedZone> {
    if zones.is_empty() {
        return Err(PublishError::NoHostedZones);
    }
    if zones.len() == 1 {
        return Ok(zones.remove(0));
    }
    if !io::stdin().is_terminal() {
        return Err(PublishError::ZoneSelectionRequired);
    }

    let index = prompt_for_zone(&zones)?;
    Ok(zones.swap_remove(index))
}

fn prompt_for_zone(zones: &[HostedZone]) -> PublishResult<usize> {
    eprintln!("Multiple hosted zones found. Select one:");
    for (i, zone) in zones.iter().enumerate() {
        eprintln!("  {}) {}", i + 1, zone.name);
    }
    eprint!("Enter number: ");
    let _ = io::stderr().flush();

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    parse_selection(&input, zones.len())
}

/// Validate a 1-based menu answer and return the 0-based index.
fn parse_selection(input: &str, count: usize) -> PublishResult<usize> {
    let input = input.trim();
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
        _ => Err(PublishError::InvalidZoneSelection {
            input: input.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_normalization() {
        let zone = HostedZone::from_api("/hostedzone/Z0123456789ABC", "example.com.");
        assert_eq!(zone.id, "Z0123456789ABC");
        assert_eq!(zone.name, "example.com");
    }

    #[test]
    fn test_no_zones_is_fatal() {
        let err = select_hosted_zone(Vec::new()).unwrap_err();
        assert!(matches!(err, PublishError::NoHostedZones));
    }

    #[test]
    fn test_single_zone_needs_no_prompt() {
        let zone = HostedZone {
            id: "Z1".to_string(),
            name: "example.com".to_string(),
        };
        let selected = select_hosted_zone(vec![zone.clone()]).unwrap();
        assert_eq!(selected, zone);
    }

    #[test]
    fn test_selection_parsing_bounds() {
        assert_eq!(parse_selection("1\n", 3).unwrap(), 0);
        assert_eq!(parse_selection("  3 ", 3).unwrap(), 2);
        assert!(parse_selection("0", 3).is_err());
        assert!(parse_selection("4", 3).is_err());
        assert!(parse_selection("two", 3).is_err());
        assert!(parse_selection("", 3).is_err());
    }
}
