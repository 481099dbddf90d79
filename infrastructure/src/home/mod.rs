//! In-memory home adapter.
//!
//! One adapter implementing both the entity-registry and device-control
//! ports over a shared state table, loadable from a TOML file. It backs the
//! CLI demo mode and exercises the full dispatch pipeline without a home
//! platform attached; in a real deployment both ports point at the
//! platform's own store instead.

use async_trait::async_trait;
use hearth_application::ports::device_control::{DeviceControl, DeviceError};
use hearth_application::ports::entity_registry::EntityRegistry;
use hearth_domain::entity::records::{Area, EntityRecord, Floor};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use thiserror::Error;
use tracing::info;

/// TOML description of a home.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HomeFile {
    #[serde(default)]
    pub floors: Vec<FloorEntry>,
    #[serde(default)]
    pub areas: Vec<AreaEntry>,
    #[serde(default)]
    pub entities: Vec<EntityEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FloorEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AreaEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub floor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntityEntry {
    /// Entity id, `<domain>.<slug>`; the domain is derived from the prefix.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Error, Debug)]
pub enum HomeError {
    #[error("cannot read home file: {0}")]
    Io(#[from] std::io::Error),

    #[error("home file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

struct HomeState {
    entities: Vec<EntityRecord>,
    areas: Vec<Area>,
    floors: Vec<Floor>,
    aliases: HashMap<String, Vec<String>>,
    states: HashMap<String, String>,
    attributes: HashMap<String, HashMap<String, serde_json::Value>>,
}

/// Registry + device control over an in-memory state table.
pub struct InMemoryHome {
    inner: RwLock<HomeState>,
}

impl InMemoryHome {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HomeError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let file: HomeFile = toml::from_str(&raw)?;
        info!(
            path = %path.as_ref().display(),
            entities = file.entities.len(),
            "loaded home file"
        );
        Ok(Self::from(file))
    }

    /// Current state string of an entity ("on", "locked", ...).
    pub fn state_of(&self, entity_id: &str) -> Option<String> {
        self.inner.read().unwrap().states.get(entity_id).cloned()
    }

    /// Current attribute value of an entity (brightness, rgb_color, ...).
    pub fn attribute_of(&self, entity_id: &str, key: &str) -> Option<serde_json::Value> {
        self.inner
            .read()
            .unwrap()
            .attributes
            .get(entity_id)
            .and_then(|attrs| attrs.get(key))
            .cloned()
    }

    fn default_state(domain: &str) -> &'static str {
        match domain {
            "lock" => "locked",
            "cover" => "closed",
            "media_player" => "idle",
            _ => "off",
        }
    }
}

impl From<HomeFile> for InMemoryHome {
    fn from(file: HomeFile) -> Self {
        let mut aliases = HashMap::new();
        let mut states = HashMap::new();
        let mut entities = Vec::with_capacity(file.entities.len());

        for entry in file.entities {
            let domain = EntityRecord::domain_of(&entry.id).to_string();
            let state = entry
                .state
                .unwrap_or_else(|| Self::default_state(&domain).to_string());
            states.insert(entry.id.clone(), state);
            if !entry.aliases.is_empty() {
                aliases.insert(entry.id.clone(), entry.aliases);
            }

            let mut record = EntityRecord::new(entry.id, entry.name, domain);
            if let Some(area) = entry.area {
                record = record.in_area(area);
            }
            entities.push(record);
        }

        let areas = file
            .areas
            .into_iter()
            .map(|a| {
                let mut area = Area::new(a.id, a.name);
                if let Some(floor) = a.floor {
                    area = area.on_floor(floor);
                }
                area
            })
            .collect();
        let floors = file
            .floors
            .into_iter()
            .map(|f| Floor::new(f.id, f.name))
            .collect();

        Self {
            inner: RwLock::new(HomeState {
                entities,
                areas,
                floors,
                aliases,
                states,
                attributes: HashMap::new(),
            }),
        }
    }
}

#[async_trait]
impl EntityRegistry for InMemoryHome {
    async fn list_entities(&self) -> Vec<EntityRecord> {
        self.inner.read().unwrap().entities.clone()
    }

    async fn list_areas(&self) -> Vec<Area> {
        self.inner.read().unwrap().areas.clone()
    }

    async fn list_floors(&self) -> Vec<Floor> {
        self.inner.read().unwrap().floors.clone()
    }

    async fn aliases_for(&self, entity_id: &str) -> Vec<String> {
        self.inner
            .read()
            .unwrap()
            .aliases
            .get(entity_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DeviceControl for InMemoryHome {
    async fn invoke(
        &self,
        entity_id: &str,
        tool_name: &str,
        arguments: &HashMap<String, serde_json::Value>,
    ) -> Result<(), DeviceError> {
        let mut state = self.inner.write().unwrap();

        let Some(current) = state.states.get(entity_id).cloned() else {
            return Err(DeviceError::new(entity_id, "unknown entity"));
        };

        let next = match tool_name {
            "turn_on" => "on".to_string(),
            "turn_off" => "off".to_string(),
            "toggle" => {
                if current == "on" {
                    "off".to_string()
                } else {
                    "on".to_string()
                }
            }
            "light_set" => "on".to_string(),
            "climate_set_temperature" => current.clone(),
            "lock" => "locked".to_string(),
            "unlock" => "unlocked".to_string(),
            "cover_open" => "open".to_string(),
            "cover_close" => "closed".to_string(),
            "media_pause" => "paused".to_string(),
            other => {
                return Err(DeviceError::new(
                    entity_id,
                    format!("unsupported action '{}'", other),
                ));
            }
        };

        state.states.insert(entity_id.to_string(), next);
        if !arguments.is_empty() {
            state
                .attributes
                .entry(entity_id.to_string())
                .or_default()
                .extend(arguments.clone());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DEMO_HOME: &str = r#"
        [[floors]]
        id = "ground"
        name = "Ground Floor"

        [[areas]]
        id = "kitchen"
        name = "Kitchen"
        floor = "ground"

        [[entities]]
        id = "light.kitchen"
        name = "Kitchen Light"
        area = "kitchen"
        aliases = ["main light"]

        [[entities]]
        id = "lock.front"
        name = "Front Door"
    "#;

    fn demo_home() -> InMemoryHome {
        InMemoryHome::from(toml::from_str::<HomeFile>(DEMO_HOME).unwrap())
    }

    #[tokio::test]
    async fn test_registry_view_matches_the_file() {
        let home = demo_home();

        let entities = home.list_entities().await;
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].domain, "light");
        assert_eq!(entities[0].area_id.as_deref(), Some("kitchen"));

        assert_eq!(home.list_areas().await[0].floor_id.as_deref(), Some("ground"));
        assert_eq!(home.list_floors().await.len(), 1);
        assert_eq!(home.aliases_for("light.kitchen").await, vec!["main light"]);
        assert!(home.aliases_for("lock.front").await.is_empty());
    }

    #[tokio::test]
    async fn test_default_states_per_domain() {
        let home = demo_home();
        assert_eq!(home.state_of("light.kitchen").as_deref(), Some("off"));
        assert_eq!(home.state_of("lock.front").as_deref(), Some("locked"));
    }

    #[tokio::test]
    async fn test_invocations_apply_state_transitions() {
        let home = demo_home();

        home.invoke("light.kitchen", "turn_on", &HashMap::new())
            .await
            .unwrap();
        assert_eq!(home.state_of("light.kitchen").as_deref(), Some("on"));

        home.invoke("light.kitchen", "toggle", &HashMap::new())
            .await
            .unwrap();
        assert_eq!(home.state_of("light.kitchen").as_deref(), Some("off"));

        home.invoke("lock.front", "unlock", &HashMap::new())
            .await
            .unwrap();
        assert_eq!(home.state_of("lock.front").as_deref(), Some("unlocked"));
    }

    #[tokio::test]
    async fn test_light_set_records_attributes() {
        let home = demo_home();
        let args = HashMap::from([
            ("rgb_color".to_string(), serde_json::json!([255, 0, 0])),
            ("brightness".to_string(), serde_json::json!(80)),
        ]);

        home.invoke("light.kitchen", "light_set", &args).await.unwrap();

        assert_eq!(home.state_of("light.kitchen").as_deref(), Some("on"));
        assert_eq!(
            home.attribute_of("light.kitchen", "rgb_color"),
            Some(serde_json::json!([255, 0, 0]))
        );
    }

    #[tokio::test]
    async fn test_unknown_entity_and_action_are_errors() {
        let home = demo_home();

        let err = home
            .invoke("light.ghost", "turn_on", &HashMap::new())
            .await
            .unwrap_err();
        assert!(err.reason.contains("unknown entity"));

        let err = home
            .invoke("light.kitchen", "dance", &HashMap::new())
            .await
            .unwrap_err();
        assert!(err.reason.contains("unsupported action"));
    }

    #[test]
    fn test_from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("home.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", DEMO_HOME).unwrap();

        let home = InMemoryHome::from_file(&path).unwrap();
        assert_eq!(home.state_of("lock.front").as_deref(), Some("locked"));
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[[entities]\nid=").unwrap();
        assert!(matches!(
            InMemoryHome::from_file(&path),
            Err(HomeError::Parse(_))
        ));
    }
}
