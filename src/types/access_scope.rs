//! Regional access scope derived from region roles.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::ALL_REGIONS;

/// Which regions a credential may act within.
///
/// Recomputed per request from the role set, never persisted. A full scope
/// always carries exactly `{"all"}` as its region set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct AccessScope {
    pub has_full_access: bool,
    pub allowed_regions: BTreeSet<String>,
}

impl AccessScope {
    /// Access to every region.
    pub fn full() -> Self {
        AccessScope {
            has_full_access: true,
            allowed_regions: BTreeSet::from([ALL_REGIONS.to_string()]),
        }
    }

    /// Access limited to the named regions.
    pub fn regions<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AccessScope {
            has_full_access: false,
            allowed_regions: regions.into_iter().map(Into::into).collect(),
        }
    }

    /// No regional grant at all.
    pub fn none() -> Self {
        AccessScope::default()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_full_access && self.allowed_regions.is_empty()
    }

    /// True when `region` is explicitly granted. Full scopes do not match
    /// arbitrary names here; use the resource guard for access decisions.
    pub fn contains_region(&self, region: &str) -> bool {
        self.allowed_regions.contains(region)
    }
}

impl Display for AccessScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.has_full_access {
            write!(f, "Full")
        } else {
            write!(f, "[{}]", self.allowed_regions.iter().join(", "))
        }
    }
}
