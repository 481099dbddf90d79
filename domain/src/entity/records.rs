//! Registry record types.
//!
//! These mirror what the external entity-registry collaborator exposes. The
//! resolver works on a [`RegistrySnapshot`] assembled per dispatch, so one
//! tool call always sees a consistent view of the home.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A controllable unit in the home (one light, one lock, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Stable id, conventionally `<domain>.<slug>` (e.g. "light.kitchen")
    pub entity_id: String,
    /// Display name shown to and spoken by users
    pub name: String,
    /// Device category ("light", "lock", ...)
    pub domain: String,
    /// Area the entity is assigned to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,
}

impl EntityRecord {
    pub fn new(
        entity_id: impl Into<String>,
        name: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            name: name.into(),
            domain: domain.into(),
            area_id: None,
        }
    }

    pub fn in_area(mut self, area_id: impl Into<String>) -> Self {
        self.area_id = Some(area_id.into());
        self
    }

    /// Derive the domain from an entity id's prefix ("light.kitchen" →
    /// "light"). Falls back to the whole id when there is no dot.
    pub fn domain_of(entity_id: &str) -> &str {
        entity_id.split_once('.').map_or(entity_id, |(d, _)| d)
    }
}

/// A physical grouping of entities (a room).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub area_id: String,
    pub name: String,
    /// Floor this area belongs to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_id: Option<String>,
}

impl Area {
    pub fn new(area_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            area_id: area_id.into(),
            name: name.into(),
            floor_id: None,
        }
    }

    pub fn on_floor(mut self, floor_id: impl Into<String>) -> Self {
        self.floor_id = Some(floor_id.into());
        self
    }
}

/// A level of the home grouping several areas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Floor {
    pub floor_id: String,
    pub name: String,
}

impl Floor {
    pub fn new(floor_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            floor_id: floor_id.into(),
            name: name.into(),
        }
    }
}

/// A consistent, read-only view of the registry for one resolution.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    pub entities: Vec<EntityRecord>,
    pub areas: Vec<Area>,
    pub floors: Vec<Floor>,
    /// Configured aliases per entity id
    pub aliases: HashMap<String, Vec<String>>,
}

impl RegistrySnapshot {
    pub fn new(entities: Vec<EntityRecord>, areas: Vec<Area>, floors: Vec<Floor>) -> Self {
        Self {
            entities,
            areas,
            floors,
            aliases: HashMap::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: HashMap<String, Vec<String>>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn area(&self, area_id: &str) -> Option<&Area> {
        self.areas.iter().find(|a| a.area_id == area_id)
    }

    pub fn aliases_of(&self, entity_id: &str) -> &[String] {
        self.aliases.get(entity_id).map_or(&[], Vec::as_slice)
    }

    /// Floor id an entity sits on, via its area assignment.
    pub fn floor_of(&self, entity: &EntityRecord) -> Option<&str> {
        let area_id = entity.area_id.as_deref()?;
        self.area(area_id)?.floor_id.as_deref()
    }
}
