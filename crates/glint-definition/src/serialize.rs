use serde::Serialize;
use serde_json::Value;

use crate::error::DefinitionError;

/// Shared rendering contract for every definition entity.
///
/// `to_value` is the structured view; the text views are derived from it, so
/// both always agree with the entity's current contents.
pub trait Serializable {
  /// Render the entity as a JSON mapping.
  fn to_value(&self) -> Result<Value, DefinitionError>;

  /// Render the entity as compact JSON text.
  fn to_json(&self) -> Result<String, DefinitionError> {
    Ok(serde_json::to_string(&self.to_value()?)?)
  }

  /// Render the entity as indented JSON text.
  fn to_json_pretty(&self) -> Result<String, DefinitionError> {
    Ok(serde_json::to_string_pretty(&self.to_value()?)?)
  }
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Value, DefinitionError> {
  Ok(serde_json::to_value(value)?)
}
