//! Resolution query and target value objects.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A free-text description of which entities a tool call targets.
///
/// At least one field must be non-empty; an all-empty query must be rejected
/// before resolution (it would otherwise match the whole home).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionQuery {
    /// Device name or alias fragment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Area name fragment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    /// Floor name fragment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    /// Restrict to these entity domains
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<HashSet<String>>,
}

impl ResolutionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn in_area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    pub fn on_floor(mut self, floor: impl Into<String>) -> Self {
        self.floor = Some(floor.into());
        self
    }

    pub fn in_domain(mut self, domain: impl Into<String>) -> Self {
        self.domains
            .get_or_insert_with(HashSet::new)
            .insert(domain.into());
        self
    }

    /// True when no field would constrain the candidate set.
    /// Blank strings count as empty.
    pub fn is_empty(&self) -> bool {
        let blank = |o: &Option<String>| o.as_deref().is_none_or(|s| s.trim().is_empty());
        blank(&self.name)
            && blank(&self.area)
            && blank(&self.floor)
            && self.domains.as_ref().is_none_or(HashSet::is_empty)
    }
}

/// One concrete, addressable action target. Derived per dispatch, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    pub entity_id: String,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_id: Option<String>,
}
