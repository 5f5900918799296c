use crate::error::{BridgeError, BridgeResult};
use crate::model::ModelSnapshot;
use jsonschema::JSONSchema;
use serde_yaml::Value;
use std::path::Path;

/// Parse a model snapshot file.
///
/// The document is validated against the embedded snapshot schema before it
/// is deserialized, so structural mistakes (a missing `unique_id`, an unknown
/// storage type) are reported together with their location.
///
/// # Example
/// ```no_run
/// use sheetbridge::parser::parse_snapshot;
/// use sheetbridge::model::HostModel;
/// use std::path::Path;
///
/// let model = parse_snapshot(Path::new("model.yaml"))?;
/// println!("Schedules: {}", model.schedules().len());
/// # Ok::<(), sheetbridge::error::BridgeError>(())
/// ```
pub fn parse_snapshot(path: &Path) -> BridgeResult<ModelSnapshot> {
    let content = std::fs::read_to_string(path)?;
    parse_snapshot_str(&content)
}

/// Parse a model snapshot from YAML text.
pub fn parse_snapshot_str(content: &str) -> BridgeResult<ModelSnapshot> {
    let yaml: Value = serde_yaml::from_str(content)?;
    if !matches!(yaml, Value::Mapping(_)) {
        return Err(BridgeError::Parse(
            "Model snapshot must be a mapping".to_string(),
        ));
    }

    validate_against_schema(&yaml)?;

    let mut snapshot: ModelSnapshot = serde_yaml::from_value(yaml)?;
    snapshot.reindex();
    check_unique_ids(&snapshot)?;
    Ok(snapshot)
}

/// Write a model snapshot back to YAML.
pub fn write_snapshot(path: &Path, snapshot: &ModelSnapshot) -> BridgeResult<()> {
    let content = snapshot.to_yaml_string()?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Validate YAML against the model snapshot JSON Schema
fn validate_against_schema(yaml: &Value) -> BridgeResult<()> {
    let schema_str = include_str!("../../schema/model-snapshot.schema.json");
    let schema_value: serde_json::Value = serde_json::from_str(schema_str)
        .map_err(|e| BridgeError::Validation(format!("Failed to parse schema: {}", e)))?;

    let compiled_schema = JSONSchema::compile(&schema_value)
        .map_err(|e| BridgeError::Validation(format!("Failed to compile schema: {}", e)))?;

    let json_value: serde_json::Value = serde_json::to_value(yaml)
        .map_err(|e| BridgeError::Validation(format!("Failed to convert YAML to JSON: {}", e)))?;

    if let Err(errors) = compiled_schema.validate(&json_value) {
        let error_messages: Vec<String> = errors.map(|e| format!("  - {}", e)).collect();
        return Err(BridgeError::Validation(format!(
            "Schema validation failed:\n{}",
            error_messages.join("\n")
        )));
    }

    Ok(())
}

/// Element ids and unique ids must not repeat; the sheet identity and the
/// row anchors rely on them.
fn check_unique_ids(snapshot: &ModelSnapshot) -> BridgeResult<()> {
    let mut ids = std::collections::HashSet::new();
    let mut unique_ids = std::collections::HashSet::new();
    for element in &snapshot.elements {
        if !ids.insert(element.id) {
            return Err(BridgeError::Validation(format!(
                "Duplicate element id {}",
                element.id
            )));
        }
        if !unique_ids.insert(element.unique_id.as_str()) {
            return Err(BridgeError::Validation(format!(
                "Duplicate unique id '{}'",
                element.unique_id
            )));
        }
    }
    Ok(())
}
