//! Postprocessor configuration
//!
//! All fields have defaults, so a config file only needs the keys it changes:
//!
//! ```json
//! { "program_name": "BRACKET", "line_numbers": true }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Invalid {
        path: String,
        source: serde_json::Error,
    },
}

/// Program units written into the BEGIN PGM line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Units {
    #[serde(rename = "MM", alias = "mm", alias = "metric")]
    #[default]
    Mm,
    #[serde(rename = "INCH", alias = "inch", alias = "imperial")]
    Inch,
}

impl Units {
    pub fn keyword(self) -> &'static str {
        match self {
            Units::Mm => "MM",
            Units::Inch => "INCH",
        }
    }
}

/// Spelling of the fixed program templates
///
/// `Classic` reproduces the established output byte for byte, including
/// `TOOL CALL<n>` without a space, the doubled space in `CYCL DEF  200` and a
/// footer that never closes the program. `Normalized` writes `TOOL CALL <n>`,
/// `CYCL DEF 200` and ends with `END PGM <name> <units>`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStyle {
    #[default]
    Classic,
    Normalized,
}

impl TemplateStyle {
    pub fn tool_call(self, tool: u32, speed: u32) -> String {
        match self {
            TemplateStyle::Classic => format!("TOOL CALL{} Z S{}", tool, speed),
            TemplateStyle::Normalized => format!("TOOL CALL {} Z S{}", tool, speed),
        }
    }

    pub fn cycle_definition(self) -> &'static str {
        match self {
            TemplateStyle::Classic => "CYCL DEF  200",
            TemplateStyle::Normalized => "CYCL DEF 200",
        }
    }

    /// Whether the footer ends with an `END PGM` line
    pub fn closes_program(self) -> bool {
        self == TemplateStyle::Normalized
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PostConfig {
    pub program_name: String,
    pub units: Units,
    /// Spindle speed written on the tool call
    pub spindle_speed: u32,
    pub templates: TemplateStyle,
    pub line_numbers: bool,
    pub line_number_start: u32,
    pub line_number_step: u32,
    /// Drop mode words (motion, plane, coordinate mode) that repeat the
    /// active word of their category
    pub collapse_modal_words: bool,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            program_name: "program".to_string(),
            units: Units::Mm,
            spindle_speed: 12000,
            templates: TemplateStyle::Classic,
            line_numbers: false,
            line_number_start: 10,
            line_number_step: 10,
            collapse_modal_words: false,
        }
    }
}

impl PostConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Invalid {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn with_program_name(mut self, name: impl Into<String>) -> Self {
        self.program_name = name.into();
        self
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn with_spindle_speed(mut self, rpm: u32) -> Self {
        self.spindle_speed = rpm;
        self
    }

    pub fn with_templates(mut self, templates: TemplateStyle) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_line_numbers(mut self, enabled: bool) -> Self {
        self.line_numbers = enabled;
        self
    }

    pub fn with_collapse_modal_words(mut self, enabled: bool) -> Self {
        self.collapse_modal_words = enabled;
        self
    }
}
