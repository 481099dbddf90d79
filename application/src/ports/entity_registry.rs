//! Entity registry port
//!
//! Read-only view of the home's entities, areas and floors. The dispatcher
//! assembles a [`RegistrySnapshot`] from the four listing calls so one tool
//! call always resolves against a consistent view.

use async_trait::async_trait;
use hearth_domain::entity::records::{Area, EntityRecord, Floor, RegistrySnapshot};
use std::collections::HashMap;

/// Port onto the external entity/state store. Never written through.
#[async_trait]
pub trait EntityRegistry: Send + Sync {
    async fn list_entities(&self) -> Vec<EntityRecord>;

    async fn list_areas(&self) -> Vec<Area>;

    async fn list_floors(&self) -> Vec<Floor>;

    /// Configured aliases for one entity (empty when none).
    async fn aliases_for(&self, entity_id: &str) -> Vec<String>;

    /// Assemble a consistent snapshot for one resolution pass.
    async fn snapshot(&self) -> RegistrySnapshot {
        let entities = self.list_entities().await;
        let mut aliases = HashMap::new();
        for entity in &entities {
            let entity_aliases = self.aliases_for(&entity.entity_id).await;
            if !entity_aliases.is_empty() {
                aliases.insert(entity.entity_id.clone(), entity_aliases);
            }
        }
        RegistrySnapshot::new(entities, self.list_areas().await, self.list_floors().await)
            .with_aliases(aliases)
    }
}
