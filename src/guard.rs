//! Per-resource region checks.

use itertools::Itertools;
use tracing::{debug, warn};

use crate::types::{AccessScope, ScopeCheck, ScopeDenial};

/// Decide whether `resource_region` lies within `scope`.
///
/// Full access always passes. Otherwise the region, trimmed, must be one of
/// the allowed regions. A resource with no region tag is denied because its
/// ownership cannot be verified.
pub fn check_resource_access(scope: &AccessScope, resource_region: &str) -> ScopeCheck {
    let region = resource_region.trim();

    let check = if scope.has_full_access {
        ScopeCheck::allowed()
    } else if region.is_empty() {
        warn!(
            event = "Resource",
            phase = "Checked",
            problem = "resource has no region tag",
            scope = scope.to_string()
        );
        ScopeCheck::denied(
            ScopeDenial::ResourceRegionMissing,
            format!(
                "Access denied: resource region '' not in allowed regions {}",
                format_regions(scope)
            ),
        )
    } else if scope.contains_region(region) {
        ScopeCheck::allowed()
    } else {
        ScopeCheck::denied(
            ScopeDenial::RegionMismatch,
            format!(
                "Access denied: resource region '{region}' not in allowed regions {}",
                format_regions(scope)
            ),
        )
    };

    debug!(
        event = "Resource",
        phase = "Checked",
        region = region,
        scope = scope.to_string(),
        allowed = check.can_access
    );
    check
}

/// Keep only the items whose region lies within `scope`.
pub fn filter_accessible<T, F>(scope: &AccessScope, items: Vec<T>, region_of: F) -> Vec<T>
where
    F: Fn(&T) -> Option<&str>,
{
    if scope.has_full_access {
        return items;
    }
    items
        .into_iter()
        .filter(|item| {
            check_resource_access(scope, region_of(item).unwrap_or_default()).can_access
        })
        .collect()
}

fn format_regions(scope: &AccessScope) -> String {
    format!(
        "[{}]",
        scope
            .allowed_regions
            .iter()
            .map(|r| format!("'{r}'"))
            .join(", ")
    )
}
