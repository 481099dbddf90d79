//! Tool dispatch use case.
//!
//! Takes one untrusted [`ToolCallRequest`] from the model through the full
//! pipeline: catalog lookup → schema validation → entity resolution → color
//! interpretation → device invocation. Every failure mode is captured into a
//! [`ToolCallResult`] outcome; nothing escapes the dispatcher as an error,
//! so the conversation loop can always feed something back to the model.

use crate::ports::device_control::{DeviceControl, DeviceError};
use crate::ports::entity_registry::EntityRegistry;
use hearth_domain::color;
use hearth_domain::entity::query::{ResolutionQuery, ResolvedTarget};
use hearth_domain::entity::records::RegistrySnapshot;
use hearth_domain::entity::resolver::{self, ResolveError};
use hearth_domain::tool::entities::{ToolCallRequest, ToolCatalog, ToolDefinition};
use hearth_domain::tool::validation::validate_arguments;
use hearth_domain::tool::value_objects::ToolCallResult;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Parameters consumed by targeting; everything else is forwarded to the
/// device collaborator as service data.
const TARGETING_PARAMS: [&str; 4] = ["name", "area", "floor", "domain"];

/// Use case for validating and executing model-issued tool calls.
pub struct ToolDispatcher {
    catalog: ToolCatalog,
    registry: Arc<dyn EntityRegistry>,
    devices: Arc<dyn DeviceControl>,
}

impl ToolDispatcher {
    pub fn new(
        catalog: ToolCatalog,
        registry: Arc<dyn EntityRegistry>,
        devices: Arc<dyn DeviceControl>,
    ) -> Self {
        Self {
            catalog,
            registry,
            devices,
        }
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Dispatch one batch of calls from a model round.
    ///
    /// Calls run concurrently (they target independent entities) but the
    /// results come back in original call order — ordering matters for the
    /// model's next-round context, not for execution.
    pub async fn dispatch_batch(&self, requests: &[ToolCallRequest]) -> Vec<ToolCallResult> {
        futures::future::join_all(requests.iter().map(|r| self.dispatch(r))).await
    }

    /// Dispatch a single call. Never returns an error past this boundary.
    pub async fn dispatch(&self, request: &ToolCallRequest) -> ToolCallResult {
        debug!(tool = %request.tool_name, call_id = %request.call_id, "dispatching tool call");

        let Some(def) = self.catalog.get(&request.tool_name) else {
            warn!(tool = %request.tool_name, "model asked for an unknown tool");
            return ToolCallResult::validation_error(
                &request.call_id,
                format!("Unknown tool '{}'", request.tool_name),
            );
        };

        if let Err(message) = validate_arguments(request, def) {
            return ToolCallResult::validation_error(&request.call_id, message);
        }

        let query = match self.build_query(request, def) {
            Ok(query) => query,
            Err(result) => return *result,
        };

        let snapshot = self.registry.snapshot().await;
        let targets = match resolver::resolve(&snapshot, &query) {
            Ok(targets) => targets,
            Err(error) => return resolution_failure(&request.call_id, error),
        };

        if !def.targeting.accepts_multiple() && targets.len() > 1 {
            let names = display_names(&snapshot, &targets);
            return ToolCallResult::ambiguous(&request.call_id, &names);
        }

        let service_args = match self.build_service_args(request, def) {
            Ok(args) => args,
            Err(result) => return *result,
        };

        self.invoke_targets(request, def, &snapshot, &targets, &service_args)
            .await
    }

    /// Build the resolution query from the validated targeting arguments,
    /// intersecting any explicit domain with the tool's implied scope.
    fn build_query(
        &self,
        request: &ToolCallRequest,
        def: &ToolDefinition,
    ) -> Result<ResolutionQuery, Box<ToolCallResult>> {
        let mut query = ResolutionQuery::new();
        if let Some(name) = request.get_string("name") {
            query.name = Some(name.to_string());
        }
        if let Some(area) = request.get_string("area") {
            query.area = Some(area.to_string());
        }
        if let Some(floor) = request.get_string("floor") {
            query.floor = Some(floor.to_string());
        }

        // A tool declares either an explicit `domain` parameter or an
        // implied scope, never both; an undeclared `domain` argument has
        // already been rejected by schema validation.
        let explicit = request.get_string("domain");
        if let Some(domain) = explicit.or(def.domain_scope.as_deref()) {
            query.domains = Some(HashSet::from([domain.to_string()]));
        }

        if query.is_empty() {
            return Err(Box::new(ToolCallResult::validation_error(
                &request.call_id,
                format!(
                    "The '{}' tool needs a target: provide a name, area, or floor",
                    def.name
                ),
            )));
        }

        Ok(query)
    }

    /// Service data forwarded to the device collaborator: the validated
    /// arguments minus targeting parameters, with any color description
    /// replaced by its normalized representation.
    fn build_service_args(
        &self,
        request: &ToolCallRequest,
        def: &ToolDefinition,
    ) -> Result<HashMap<String, serde_json::Value>, Box<ToolCallResult>> {
        let mut args: HashMap<String, serde_json::Value> = request
            .arguments
            .iter()
            .filter(|(k, _)| !TARGETING_PARAMS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        if def.has_color_parameter()
            && let Some(description) = request.get_string("color")
        {
            let spec = color::interpret(description).map_err(|e| {
                Box::new(ToolCallResult::validation_error(
                    &request.call_id,
                    format!("Invalid 'color' argument: {}", e),
                ))
            })?;
            args.remove("color");
            match spec {
                color::ColorSpec::Rgb { r, g, b } => {
                    args.insert("rgb_color".to_string(), serde_json::json!([r, g, b]));
                }
                color::ColorSpec::Kelvin(k) => {
                    args.insert("color_temp_kelvin".to_string(), serde_json::json!(k));
                }
            }
        }

        Ok(args)
    }

    /// Invoke the device collaborator once per resolved target, reporting
    /// partial failure precisely — a half-done action is never rounded up
    /// to full success.
    async fn invoke_targets(
        &self,
        request: &ToolCallRequest,
        def: &ToolDefinition,
        snapshot: &RegistrySnapshot,
        targets: &[ResolvedTarget],
        service_args: &HashMap<String, serde_json::Value>,
    ) -> ToolCallResult {
        let mut succeeded: Vec<String> = Vec::new();
        let mut failed: Vec<DeviceError> = Vec::new();

        for target in targets {
            match self
                .devices
                .invoke(&target.entity_id, &def.name, service_args)
                .await
            {
                Ok(()) => succeeded.push(target.entity_id.clone()),
                Err(error) => {
                    warn!(entity = %target.entity_id, tool = %def.name, %error, "device invocation failed");
                    failed.push(error);
                }
            }
        }

        if failed.is_empty() {
            let names = display_names(snapshot, targets);
            return ToolCallResult::success(
                &request.call_id,
                format!("{} succeeded for: {}", def.name, names.join(", ")),
            )
            .with_payload(serde_json::json!({ "targets": succeeded }));
        }

        let failed_names: Vec<String> = failed
            .iter()
            .map(|e| name_of(snapshot, &e.entity_id))
            .collect();
        let message = if succeeded.is_empty() {
            format!("{} failed for: {}", def.name, failed_names.join(", "))
        } else {
            let ok_names: Vec<String> = succeeded.iter().map(|id| name_of(snapshot, id)).collect();
            format!(
                "{} succeeded for {} but failed for {}",
                def.name,
                ok_names.join(", "),
                failed_names.join(", ")
            )
        };

        ToolCallResult::execution_error(&request.call_id, message).with_payload(serde_json::json!({
            "succeeded": succeeded,
            "failed": failed
                .iter()
                .map(|e| serde_json::json!({ "entity_id": e.entity_id, "reason": e.reason }))
                .collect::<Vec<_>>(),
        }))
    }
}

fn resolution_failure(call_id: &str, error: ResolveError) -> ToolCallResult {
    match error {
        ResolveError::NoMatch => {
            ToolCallResult::entity_not_found(call_id, "No device matches that description")
        }
        ResolveError::Ambiguous(names) => ToolCallResult::ambiguous(call_id, &names),
        ResolveError::EmptyQuery => ToolCallResult::validation_error(
            call_id,
            "Provide a device name, area, or floor to target",
        ),
    }
}

fn display_names(snapshot: &RegistrySnapshot, targets: &[ResolvedTarget]) -> Vec<String> {
    targets.iter().map(|t| name_of(snapshot, &t.entity_id)).collect()
}

fn name_of(snapshot: &RegistrySnapshot, entity_id: &str) -> String {
    snapshot
        .entities
        .iter()
        .find(|e| e.entity_id == entity_id)
        .map(|e| e.name.clone())
        .unwrap_or_else(|| entity_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hearth_domain::entity::records::{Area, EntityRecord, Floor};
    use hearth_domain::tool::builtin::builtin_catalog;
    use hearth_domain::tool::value_objects::ToolOutcome;
    use std::sync::Mutex;

    /// Registry serving a fixed snapshot.
    struct FixedRegistry {
        snapshot: RegistrySnapshot,
    }

    #[async_trait]
    impl EntityRegistry for FixedRegistry {
        async fn list_entities(&self) -> Vec<EntityRecord> {
            self.snapshot.entities.clone()
        }

        async fn list_areas(&self) -> Vec<Area> {
            self.snapshot.areas.clone()
        }

        async fn list_floors(&self) -> Vec<Floor> {
            self.snapshot.floors.clone()
        }

        async fn aliases_for(&self, entity_id: &str) -> Vec<String> {
            self.snapshot.aliases_of(entity_id).to_vec()
        }
    }

    /// Device port that records invocations and fails for scripted ids.
    #[derive(Default)]
    struct RecordingDevices {
        invocations: Mutex<Vec<(String, String, HashMap<String, serde_json::Value>)>>,
        fail_for: Vec<String>,
    }

    impl RecordingDevices {
        fn failing(ids: &[&str]) -> Self {
            Self {
                invocations: Mutex::new(Vec::new()),
                fail_for: ids.iter().map(|s| s.to_string()).collect(),
            }
        }

        fn invoked_ids(&self) -> Vec<String> {
            self.invocations
                .lock()
                .unwrap()
                .iter()
                .map(|(id, _, _)| id.clone())
                .collect()
        }
    }

    #[async_trait]
    impl DeviceControl for RecordingDevices {
        async fn invoke(
            &self,
            entity_id: &str,
            tool_name: &str,
            arguments: &HashMap<String, serde_json::Value>,
        ) -> Result<(), DeviceError> {
            self.invocations.lock().unwrap().push((
                entity_id.to_string(),
                tool_name.to_string(),
                arguments.clone(),
            ));
            if self.fail_for.iter().any(|id| id == entity_id) {
                return Err(DeviceError::new(entity_id, "unreachable"));
            }
            Ok(())
        }
    }

    fn living_room_home() -> RegistrySnapshot {
        RegistrySnapshot::new(
            vec![
                EntityRecord::new("light.sofa", "Sofa Light", "light").in_area("living_room"),
                EntityRecord::new("light.ceiling", "Ceiling Light", "light").in_area("living_room"),
                EntityRecord::new("media_player.tv", "TV", "media_player").in_area("living_room"),
                EntityRecord::new("lock.front", "Front Door", "lock"),
            ],
            vec![Area::new("living_room", "Living Room").on_floor("ground")],
            vec![Floor::new("ground", "Ground Floor")],
        )
    }

    fn dispatcher_with(
        snapshot: RegistrySnapshot,
        devices: RecordingDevices,
    ) -> (ToolDispatcher, Arc<RecordingDevices>) {
        let devices = Arc::new(devices);
        let dispatcher = ToolDispatcher::new(
            builtin_catalog(),
            Arc::new(FixedRegistry { snapshot }),
            devices.clone(),
        );
        (dispatcher, devices)
    }

    #[tokio::test]
    async fn test_unknown_tool_is_validation_error() {
        let (dispatcher, devices) =
            dispatcher_with(living_room_home(), RecordingDevices::default());
        let request = ToolCallRequest::new("c1", "self_destruct");

        let result = dispatcher.dispatch(&request).await;
        assert_eq!(result.outcome, ToolOutcome::ValidationError);
        assert!(result.message.contains("self_destruct"));
        assert!(devices.invoked_ids().is_empty());
    }

    #[tokio::test]
    async fn test_missing_required_argument_never_reaches_resolution_or_devices() {
        let (dispatcher, devices) =
            dispatcher_with(living_room_home(), RecordingDevices::default());
        // climate_set_temperature requires 'temperature'
        let request = ToolCallRequest::new("c1", "climate_set_temperature").with_arg("name", "x");

        let result = dispatcher.dispatch(&request).await;
        assert_eq!(result.outcome, ToolOutcome::ValidationError);
        assert!(result.message.contains("temperature"));
        assert!(devices.invoked_ids().is_empty());
    }

    #[tokio::test]
    async fn test_area_wide_turn_off_invokes_every_light() {
        let (dispatcher, devices) =
            dispatcher_with(living_room_home(), RecordingDevices::default());
        let request = ToolCallRequest::new("c1", "turn_off")
            .with_arg("area", "living room")
            .with_arg("domain", "light");

        let result = dispatcher.dispatch(&request).await;
        assert_eq!(result.outcome, ToolOutcome::Success);
        assert_eq!(devices.invoked_ids(), ["light.sofa", "light.ceiling"]);
        // Intersection, not union: the TV stays untouched.
        assert!(!devices.invoked_ids().contains(&"media_player.tv".to_string()));
        let payload = result.payload.unwrap();
        assert_eq!(payload["targets"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_partial_device_failure_is_execution_error_with_detail() {
        let (dispatcher, _devices) = dispatcher_with(
            living_room_home(),
            RecordingDevices::failing(&["light.ceiling"]),
        );
        let request = ToolCallRequest::new("c1", "turn_off")
            .with_arg("area", "living room")
            .with_arg("domain", "light");

        let result = dispatcher.dispatch(&request).await;
        assert_eq!(result.outcome, ToolOutcome::ExecutionError);
        assert!(result.message.contains("Ceiling Light"));
        assert!(result.message.contains("Sofa Light"));

        let payload = result.payload.unwrap();
        assert_eq!(payload["succeeded"][0], "light.sofa");
        assert_eq!(payload["failed"][0]["entity_id"], "light.ceiling");
        assert_eq!(payload["failed"][0]["reason"], "unreachable");
    }

    #[tokio::test]
    async fn test_total_device_failure_is_execution_error() {
        let (dispatcher, _devices) = dispatcher_with(
            living_room_home(),
            RecordingDevices::failing(&["lock.front"]),
        );
        let request = ToolCallRequest::new("c1", "lock").with_arg("name", "front door");

        let result = dispatcher.dispatch(&request).await;
        assert_eq!(result.outcome, ToolOutcome::ExecutionError);
        assert_eq!(result.payload.unwrap()["succeeded"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_no_match_is_entity_not_found() {
        let (dispatcher, devices) =
            dispatcher_with(living_room_home(), RecordingDevices::default());
        let request = ToolCallRequest::new("c1", "turn_on").with_arg("name", "disco ball");

        let result = dispatcher.dispatch(&request).await;
        assert_eq!(result.outcome, ToolOutcome::EntityNotFound);
        assert!(devices.invoked_ids().is_empty());
    }

    #[tokio::test]
    async fn test_ambiguous_name_enumerates_candidates() {
        let (dispatcher, devices) =
            dispatcher_with(living_room_home(), RecordingDevices::default());
        let request = ToolCallRequest::new("c1", "turn_on").with_arg("name", "light");

        let result = dispatcher.dispatch(&request).await;
        assert_eq!(result.outcome, ToolOutcome::Ambiguous);
        assert!(result.message.contains("Ceiling Light"));
        assert!(result.message.contains("Sofa Light"));
        assert!(devices.invoked_ids().is_empty());
    }

    #[tokio::test]
    async fn test_single_target_tool_rejects_multi_entity_resolution() {
        let mut snapshot = living_room_home();
        snapshot
            .entities
            .push(EntityRecord::new("lock.back", "Back Door", "lock"));
        let (dispatcher, devices) = dispatcher_with(snapshot, RecordingDevices::default());
        // "door" partial-matches both locks.
        let request = ToolCallRequest::new("c1", "lock").with_arg("name", "door");

        let result = dispatcher.dispatch(&request).await;
        assert_eq!(result.outcome, ToolOutcome::Ambiguous);
        assert!(devices.invoked_ids().is_empty());
    }

    #[tokio::test]
    async fn test_untargeted_call_is_validation_error() {
        let (dispatcher, devices) =
            dispatcher_with(living_room_home(), RecordingDevices::default());
        let request = ToolCallRequest::new("c1", "turn_on");

        let result = dispatcher.dispatch(&request).await;
        assert_eq!(result.outcome, ToolOutcome::ValidationError);
        assert!(result.message.contains("name, area, or floor"));
        assert!(devices.invoked_ids().is_empty());
    }

    #[tokio::test]
    async fn test_undeclared_domain_argument_is_rejected() {
        // light_set has an implied light scope and no `domain` parameter;
        // passing one is a schema violation, not a resolution miss.
        let (dispatcher, devices) =
            dispatcher_with(living_room_home(), RecordingDevices::default());
        let request = ToolCallRequest::new("c1", "light_set")
            .with_arg("area", "living room")
            .with_arg("domain", "switch");

        let result = dispatcher.dispatch(&request).await;
        assert_eq!(result.outcome, ToolOutcome::ValidationError);
        assert!(result.message.contains("domain"));
        assert!(devices.invoked_ids().is_empty());
    }

    #[tokio::test]
    async fn test_color_argument_is_normalized_before_the_device_sees_it() {
        let (dispatcher, devices) =
            dispatcher_with(living_room_home(), RecordingDevices::default());
        let request = ToolCallRequest::new("c1", "light_set")
            .with_arg("name", "sofa light")
            .with_arg("color", "the color of the sky")
            .with_arg("brightness", 80);

        let result = dispatcher.dispatch(&request).await;
        assert_eq!(result.outcome, ToolOutcome::Success);

        let invocations = devices.invocations.lock().unwrap();
        let (id, tool, args) = &invocations[0];
        assert_eq!(id, "light.sofa");
        assert_eq!(tool, "light_set");
        assert_eq!(args["rgb_color"], serde_json::json!([135, 206, 235]));
        assert_eq!(args["brightness"], serde_json::json!(80));
        assert!(!args.contains_key("color"));
        assert!(!args.contains_key("name"));
    }

    #[tokio::test]
    async fn test_temperature_color_maps_to_kelvin() {
        let (dispatcher, devices) =
            dispatcher_with(living_room_home(), RecordingDevices::default());
        let request = ToolCallRequest::new("c1", "light_set")
            .with_arg("name", "sofa light")
            .with_arg("color", "warm white");

        let result = dispatcher.dispatch(&request).await;
        assert_eq!(result.outcome, ToolOutcome::Success);
        let invocations = devices.invocations.lock().unwrap();
        assert_eq!(invocations[0].2["color_temp_kelvin"], serde_json::json!(2700));
    }

    #[tokio::test]
    async fn test_unrecognized_color_is_validation_error() {
        let (dispatcher, devices) =
            dispatcher_with(living_room_home(), RecordingDevices::default());
        let request = ToolCallRequest::new("c1", "light_set")
            .with_arg("name", "sofa light")
            .with_arg("color", "the sound of rain");

        let result = dispatcher.dispatch(&request).await;
        assert_eq!(result.outcome, ToolOutcome::ValidationError);
        assert!(result.message.contains("color"));
        assert!(devices.invoked_ids().is_empty());
    }

    #[tokio::test]
    async fn test_batch_results_match_requests_in_count_and_order() {
        let (dispatcher, _devices) =
            dispatcher_with(living_room_home(), RecordingDevices::default());
        let requests = vec![
            ToolCallRequest::new("c1", "turn_on").with_arg("name", "sofa light"),
            ToolCallRequest::new("c2", "bogus_tool"),
            ToolCallRequest::new("c3", "turn_off").with_arg("name", "tv"),
        ];

        let results = dispatcher.dispatch_batch(&requests).await;
        assert_eq!(results.len(), requests.len());
        assert_eq!(results[0].call_id, "c1");
        assert_eq!(results[0].outcome, ToolOutcome::Success);
        assert_eq!(results[1].call_id, "c2");
        assert_eq!(results[1].outcome, ToolOutcome::ValidationError);
        assert_eq!(results[2].call_id, "c3");
        assert_eq!(results[2].outcome, ToolOutcome::Success);
    }
}
