//! The fixed built-in device-control catalog.
//!
//! These are the only tools ever advertised to the model. Order is stable so
//! the model sees an identical catalog every round of every turn.

use super::entities::{ParamKind, Targeting, ToolCatalog, ToolDefinition, ToolParameter};

/// Entity domains the catalog can act on.
pub const SUPPORTED_DOMAINS: [&str; 7] = [
    "light",
    "switch",
    "fan",
    "cover",
    "lock",
    "climate",
    "media_player",
];

fn name_param() -> ToolParameter {
    ToolParameter::new(
        "name",
        "The name of the device, exactly as the user says it (e.g. 'kitchen light', 'table lamp')",
        false,
    )
}

fn area_param() -> ToolParameter {
    ToolParameter::new(
        "area",
        "The area name, to target every matching device in that area (e.g. 'kitchen', 'living room')",
        false,
    )
}

fn floor_param() -> ToolParameter {
    ToolParameter::new(
        "floor",
        "The floor name, to target every matching device on that floor (e.g. 'upstairs', 'ground floor')",
        false,
    )
}

fn domain_param() -> ToolParameter {
    ToolParameter::new(
        "domain",
        "Restrict to one device category (e.g. 'light' when the user says 'all lights')",
        false,
    )
    .with_kind(ParamKind::one_of(SUPPORTED_DOMAINS))
}

fn with_target_params(def: ToolDefinition) -> ToolDefinition {
    def.with_parameter(name_param())
        .with_parameter(area_param())
        .with_parameter(floor_param())
}

/// Build the full built-in catalog.
pub fn builtin_catalog() -> ToolCatalog {
    ToolCatalog::new()
        .register(
            with_target_params(ToolDefinition::new(
                "turn_on",
                "Turn on a device, or every matching device in an area or on a floor",
                Targeting::Multi,
            ))
            .with_parameter(domain_param()),
        )
        .register(
            with_target_params(ToolDefinition::new(
                "turn_off",
                "Turn off a device, or every matching device in an area or on a floor",
                Targeting::Multi,
            ))
            .with_parameter(domain_param()),
        )
        .register(
            with_target_params(ToolDefinition::new(
                "toggle",
                "Toggle a device between on and off",
                Targeting::Multi,
            ))
            .with_parameter(domain_param()),
        )
        .register(
            with_target_params(
                ToolDefinition::new(
                    "light_set",
                    "Change the color and/or brightness of one or more lights",
                    Targeting::Multi,
                )
                .with_domain_scope("light"),
            )
            .with_parameter(ToolParameter::new(
                "color",
                "Color description, e.g. 'red', 'warm white', 'the color of the sky'",
                false,
            ))
            .with_parameter(
                ToolParameter::new("brightness", "Brightness percentage", false)
                    .with_kind(ParamKind::integer_range(0, 100)),
            ),
        )
        .register(
            ToolDefinition::new(
                "climate_set_temperature",
                "Set the target temperature of a thermostat",
                Targeting::Single,
            )
            .with_domain_scope("climate")
            .with_parameter(name_param())
            .with_parameter(area_param())
            .with_parameter(
                ToolParameter::new("temperature", "Target temperature in degrees Celsius", true)
                    .with_kind(ParamKind::integer_range(7, 35)),
            ),
        )
        .register(
            ToolDefinition::new("lock", "Lock a lock", Targeting::Single)
                .with_domain_scope("lock")
                .with_parameter(ToolParameter::new("name", "The name of the lock", true)),
        )
        .register(
            ToolDefinition::new("unlock", "Unlock a lock", Targeting::Single)
                .with_domain_scope("lock")
                .with_parameter(ToolParameter::new("name", "The name of the lock", true)),
        )
        .register(
            with_target_params(
                ToolDefinition::new(
                    "cover_open",
                    "Open one or more covers (blinds, garage doors, curtains)",
                    Targeting::Multi,
                )
                .with_domain_scope("cover"),
            ),
        )
        .register(
            with_target_params(
                ToolDefinition::new(
                    "cover_close",
                    "Close one or more covers (blinds, garage doors, curtains)",
                    Targeting::Multi,
                )
                .with_domain_scope("cover"),
            ),
        )
        .register(
            with_target_params(
                ToolDefinition::new(
                    "media_pause",
                    "Pause playback on one or more media players",
                    Targeting::Multi,
                )
                .with_domain_scope("media_player"),
            ),
        )
}
