//! Natural-language color interpretation.
//!
//! Two-tier, fully deterministic lookup: first the named color / temperature
//! table, then the descriptive-phrase table ("the color of the sky",
//! "sunset"). No network, no model call — the same description always yields
//! the same [`ColorSpec`], so color requests are reproducible and auditable.
//! Unknown input fails instead of guessing.

mod tables;

pub use tables::{METAPHOR_TABLE, NAMED_TABLE};

use crate::util::normalize;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A normalized color: either an RGB triple or a white color temperature,
/// never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpec {
    Rgb { r: u8, g: u8, b: u8 },
    Kelvin(u32),
}

impl ColorSpec {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        ColorSpec::Rgb { r, g, b }
    }

    pub const fn kelvin(k: u32) -> Self {
        ColorSpec::Kelvin(k)
    }
}

impl std::fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorSpec::Rgb { r, g, b } => write!(f, "rgb({}, {}, {})", r, g, b),
            ColorSpec::Kelvin(k) => write!(f, "{}K", k),
        }
    }
}

/// The description matched neither table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized color description: '{0}'")]
pub struct UnrecognizedColor(pub String);

/// Interpret a free-text color description.
///
/// Tier 1 is the named table (plain colors and temperature words), tier 2
/// the metaphor table. A leading "the color of " is stripped before the
/// tier-2 lookup so "the color of the sky" and "sky" agree.
pub fn interpret(description: &str) -> Result<ColorSpec, UnrecognizedColor> {
    let phrase = normalize(description);
    if phrase.is_empty() {
        return Err(UnrecognizedColor(description.to_string()));
    }

    if let Some(spec) = lookup(NAMED_TABLE, &phrase) {
        return Ok(spec);
    }

    if let Some(spec) = lookup(METAPHOR_TABLE, &phrase) {
        return Ok(spec);
    }

    let stripped = phrase
        .strip_prefix("the color of ")
        .or_else(|| phrase.strip_prefix("color of "))
        .map(|rest| rest.strip_prefix("the ").unwrap_or(rest));
    if let Some(rest) = stripped
        && let Some(spec) = lookup(NAMED_TABLE, rest).or_else(|| lookup(METAPHOR_TABLE, rest))
    {
        return Ok(spec);
    }

    Err(UnrecognizedColor(description.to_string()))
}

fn lookup(table: &[(&str, ColorSpec)], phrase: &str) -> Option<ColorSpec> {
    table
        .iter()
        .find(|(key, _)| *key == phrase)
        .map(|(_, spec)| *spec)
}
