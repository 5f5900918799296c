//! Parameter settings: ignored parameters, forced read-only ids and value
//! translations. Loaded once per session and passed around by reference.

use crate::error::BridgeResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Location wildcard matching every schedule and standard.
pub const ANY_LOCATION: &str = "*";

/// Location name of the project information standard.
pub const PROJECT_INFORMATION_LOCATION: &str = "Project Information";

/// Location name of a schedule.
pub fn schedule_location(schedule_name: &str) -> String {
    format!("ViewSchedule_{}", schedule_name)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParametersSettings {
    pub ignored_parameters: Vec<IgnoredParameters>,
    pub readonly_parameters: Vec<ReadonlyParameter>,
    pub parameter_translations: Vec<ParameterTranslation>,
}

/// Parameters left out of exports at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnoredParameters {
    pub location: String,
    #[serde(default)]
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadonlyParameter {
    pub id: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// Text/value substitutions for one parameter at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterTranslation {
    pub location: String,
    pub name: String,
    #[serde(default)]
    pub translations: Vec<Translation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub text: String,
    pub value: String,
}

impl ParametersSettings {
    /// Load settings from a YAML file.
    pub fn load(path: &Path) -> BridgeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> BridgeResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    fn is_ignored(&self, name: &str, location: &str) -> bool {
        self.ignored_parameters.iter().any(|ignored| {
            (ignored.location == ANY_LOCATION || ignored.location.eq_ignore_ascii_case(location))
                && ignored
                    .parameters
                    .iter()
                    .any(|p| p.to_lowercase() == name.to_lowercase())
        })
    }

    /// Whether a schedule field may be exported at `location`.
    pub fn can_export_field(&self, field_name: &str, location: &str) -> bool {
        !self.is_ignored(field_name, location)
    }

    /// Whether a standalone parameter may be exported at `location`. Parameters
    /// whose name mentions "none" are never exported.
    pub fn can_export_parameter(&self, parameter_name: &str, location: &str) -> bool {
        !self.is_ignored(parameter_name, location) && !parameter_name.to_lowercase().contains("none")
    }

    /// Translation entries applying at `location`.
    pub fn translations_at(&self, location: &str) -> impl Iterator<Item = &ParameterTranslation> {
        let location = location.to_string();
        self.parameter_translations
            .iter()
            .filter(move |t| t.location == ANY_LOCATION || t.location == location)
    }
}
