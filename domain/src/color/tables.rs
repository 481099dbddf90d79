//! Fixed color lookup tables.
//!
//! Plain immutable data keyed by normalized phrase. Keys must be lowercase
//! with single spaces — they are compared against `util::normalize` output.

use super::ColorSpec;

/// Tier 1: plain color names and white-temperature words.
pub const NAMED_TABLE: &[(&str, ColorSpec)] = &[
    ("red", ColorSpec::rgb(255, 0, 0)),
    ("green", ColorSpec::rgb(0, 128, 0)),
    ("blue", ColorSpec::rgb(0, 0, 255)),
    ("yellow", ColorSpec::rgb(255, 255, 0)),
    ("orange", ColorSpec::rgb(255, 165, 0)),
    ("purple", ColorSpec::rgb(128, 0, 128)),
    ("violet", ColorSpec::rgb(238, 130, 238)),
    ("pink", ColorSpec::rgb(255, 192, 203)),
    ("cyan", ColorSpec::rgb(0, 255, 255)),
    ("magenta", ColorSpec::rgb(255, 0, 255)),
    ("white", ColorSpec::rgb(255, 255, 255)),
    ("sky blue", ColorSpec::rgb(135, 206, 235)),
    ("turquoise", ColorSpec::rgb(64, 224, 208)),
    ("teal", ColorSpec::rgb(0, 128, 128)),
    ("lavender", ColorSpec::rgb(230, 230, 250)),
    ("gold", ColorSpec::rgb(255, 215, 0)),
    ("amber", ColorSpec::rgb(255, 191, 0)),
    ("lime", ColorSpec::rgb(50, 205, 50)),
    ("salmon", ColorSpec::rgb(250, 128, 114)),
    ("coral", ColorSpec::rgb(255, 127, 80)),
    ("crimson", ColorSpec::rgb(220, 20, 60)),
    ("indigo", ColorSpec::rgb(75, 0, 130)),
    // White temperatures
    ("candlelight", ColorSpec::kelvin(2000)),
    ("warm white", ColorSpec::kelvin(2700)),
    ("soft white", ColorSpec::kelvin(3000)),
    ("neutral white", ColorSpec::kelvin(3500)),
    ("cool white", ColorSpec::kelvin(4000)),
    ("daylight", ColorSpec::kelvin(5500)),
    ("cold white", ColorSpec::kelvin(6500)),
];

/// Tier 2: descriptive and metaphorical phrases.
pub const METAPHOR_TABLE: &[(&str, ColorSpec)] = &[
    ("the color of the sky", ColorSpec::rgb(135, 206, 235)),
    ("sky", ColorSpec::rgb(135, 206, 235)),
    ("sunset", ColorSpec::rgb(253, 94, 83)),
    ("sunrise", ColorSpec::rgb(255, 153, 102)),
    ("ocean", ColorSpec::rgb(0, 105, 148)),
    ("sea", ColorSpec::rgb(0, 105, 148)),
    ("grass", ColorSpec::rgb(86, 160, 70)),
    ("forest", ColorSpec::rgb(34, 139, 34)),
    ("fire", ColorSpec::rgb(226, 88, 34)),
    ("snow", ColorSpec::rgb(255, 250, 250)),
    ("midnight", ColorSpec::rgb(25, 25, 112)),
    ("moonlight", ColorSpec::rgb(212, 222, 235)),
    ("rose", ColorSpec::rgb(255, 102, 153)),
    ("sand", ColorSpec::rgb(237, 201, 175)),
];
