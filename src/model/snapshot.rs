//! YAML model snapshot implementing [`HostModel`].
//!
//! Transactions take a checkpoint of the mutable state on `begin` and restore
//! it on `rollback`; writes are only accepted while a transaction is open.

use super::{CategoryStyle, HostModel, ParamRef};
use crate::error::{BridgeError, BridgeResult};
use crate::types::{
    Category, CategoryId, Element, ElementId, Family, ParameterBinding, Phase, RawValue,
    ScheduleDefinition,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSnapshot {
    pub name: String,
    pub phases: Vec<Phase>,
    pub categories: Vec<Category>,
    pub families: Vec<Family>,
    pub elements: Vec<Element>,
    pub schedules: Vec<ScheduleDefinition>,
    pub parameter_bindings: Vec<ParameterBinding>,

    #[serde(skip)]
    by_id: HashMap<ElementId, usize>,
    #[serde(skip)]
    by_unique_id: HashMap<String, usize>,
    #[serde(skip)]
    checkpoint: Option<Checkpoint>,
    #[serde(skip)]
    writes: usize,
}

#[derive(Debug, Clone)]
struct Checkpoint {
    name: String,
    elements: Vec<Element>,
    categories: Vec<Category>,
    writes: usize,
}

impl ModelSnapshot {
    /// Build the lookup indexes. Must be called after deserializing or after
    /// adding elements directly.
    pub fn reindex(&mut self) {
        self.by_id = self
            .elements
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id, i))
            .collect();
        self.by_unique_id = self
            .elements
            .iter()
            .enumerate()
            .map(|(i, e)| (e.unique_id.clone(), i))
            .collect();
    }

    pub fn from_yaml_str(content: &str) -> BridgeResult<Self> {
        let mut snapshot: ModelSnapshot = serde_yaml::from_str(content)?;
        snapshot.reindex();
        Ok(snapshot)
    }

    pub fn to_yaml_string(&self) -> BridgeResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Number of parameter and style writes applied and not rolled back.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn in_transaction(&self) -> bool {
        self.checkpoint.is_some()
    }

    fn require_transaction(&self) -> BridgeResult<()> {
        if self.checkpoint.is_none() {
            return Err(BridgeError::Transaction(
                "Modification outside of a transaction".to_string(),
            ));
        }
        Ok(())
    }
}

impl HostModel for ModelSnapshot {
    fn elements(&self) -> &[Element] {
        &self.elements
    }

    fn element(&self, id: ElementId) -> Option<&Element> {
        self.by_id.get(&id).and_then(|&i| self.elements.get(i))
    }

    fn element_by_unique_id(&self, unique_id: &str) -> Option<&Element> {
        self.by_unique_id
            .get(unique_id)
            .and_then(|&i| self.elements.get(i))
    }

    fn phases(&self) -> &[Phase] {
        &self.phases
    }

    fn families(&self) -> &[Family] {
        &self.families
    }

    fn categories(&self) -> &[Category] {
        &self.categories
    }

    fn schedules(&self) -> &[ScheduleDefinition] {
        &self.schedules
    }

    fn parameter_bindings(&self) -> &[ParameterBinding] {
        &self.parameter_bindings
    }

    fn set_parameter(&mut self, target: ParamRef, value: RawValue) -> BridgeResult<()> {
        self.require_transaction()?;
        let index = *self
            .by_id
            .get(&target.owner)
            .ok_or_else(|| BridgeError::Host(format!("Element {} not found", target.owner)))?;
        let parameter = self.elements[index]
            .parameter_mut(target.id)
            .ok_or_else(|| {
                BridgeError::Host(format!(
                    "Parameter {} not found on element {}",
                    target.id, target.owner
                ))
            })?;
        if parameter.read_only || !parameter.accepts(&value) {
            return Err(BridgeError::write_rejected(parameter.name.clone(), &value));
        }
        // Doubles may arrive as whole numbers.
        parameter.value = Some(match (parameter.storage, value) {
            (crate::types::StorageType::Double, RawValue::Int(i)) => RawValue::Float(i as f64),
            (_, v) => v,
        });
        self.writes += 1;
        Ok(())
    }

    fn set_category_style(&mut self, id: CategoryId, style: &CategoryStyle) -> BridgeResult<()> {
        self.require_transaction()?;
        let category = self
            .categories
            .iter_mut()
            .find_map(|c| c.find_mut(id))
            .ok_or_else(|| BridgeError::Host(format!("Category {} not found", id)))?;
        if let Some(weight) = style.projection {
            category.line_weight_projection = Some(weight);
        }
        if let Some(weight) = style.cut {
            if !category.cuttable {
                return Err(BridgeError::write_rejected(
                    format!("{} cut line weight", category.name),
                    weight,
                ));
            }
            category.line_weight_cut = Some(weight);
        }
        if let Some(color) = style.color {
            category.line_color = Some(color);
        }
        self.writes += 1;
        Ok(())
    }

    fn begin_transaction(&mut self, name: &str) -> BridgeResult<()> {
        if let Some(open) = &self.checkpoint {
            return Err(BridgeError::Transaction(format!(
                "Cannot start '{}' while '{}' is open",
                name, open.name
            )));
        }
        self.checkpoint = Some(Checkpoint {
            name: name.to_string(),
            elements: self.elements.clone(),
            categories: self.categories.clone(),
            writes: self.writes,
        });
        Ok(())
    }

    fn commit_transaction(&mut self) -> BridgeResult<()> {
        self.checkpoint
            .take()
            .map(|_| ())
            .ok_or_else(|| BridgeError::Transaction("No transaction to commit".to_string()))
    }

    fn rollback_transaction(&mut self) -> BridgeResult<()> {
        let checkpoint = self
            .checkpoint
            .take()
            .ok_or_else(|| BridgeError::Transaction("No transaction to roll back".to_string()))?;
        self.elements = checkpoint.elements;
        self.categories = checkpoint.categories;
        self.writes = checkpoint.writes;
        Ok(())
    }
}
