use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DefinitionError, json_type};
use crate::serialize::{Serializable, encode};

/// One branching rule of a [`Choice`] state.
///
/// The condition is an opaque comparison mapping (for example
/// `{"Variable": "$.status", "StringEquals": "ok"}` or an `And`/`Or`
/// combinator) emitted verbatim ahead of `Next`. `Variable` lives in the
/// condition like any other key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
  #[serde(flatten)]
  condition: Map<String, Value>,
  #[serde(rename = "Next", skip_serializing_if = "Option::is_none")]
  next: Option<String>,
}

impl ChoiceOption {
  /// Build an option from a condition mapping.
  ///
  /// Fails with [`DefinitionError::InvalidCondition`] unless `condition` is a
  /// non-empty JSON object.
  pub fn new(condition: Value) -> Result<Self, DefinitionError> {
    match condition {
      Value::Object(map) if !map.is_empty() => Ok(Self {
        condition: map,
        next: None,
      }),
      Value::Object(_) => Err(DefinitionError::InvalidCondition {
        found: "empty object".to_string(),
      }),
      other => Err(DefinitionError::InvalidCondition {
        found: json_type(&other).to_string(),
      }),
    }
  }

  pub fn with_next(mut self, next: impl Into<String>) -> Self {
    self.next = Some(next.into());
    self
  }

  /// Set `Variable`, replacing any value the condition already carries.
  pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
    self
      .condition
      .insert("Variable".to_string(), Value::String(variable.into()));
    self
  }

  pub fn condition(&self) -> &Map<String, Value> {
    &self.condition
  }

  pub fn next(&self) -> Option<&str> {
    self.next.as_deref()
  }

  pub fn variable(&self) -> Option<&str> {
    self.condition.get("Variable").and_then(Value::as_str)
  }
}

impl Serializable for ChoiceOption {
  fn to_value(&self) -> Result<Value, DefinitionError> {
    encode(self)
  }
}

/// Branches to the first option whose condition matches, else to `Default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Choice {
  #[serde(skip)]
  name: String,
  choices: Vec<ChoiceOption>,
  #[serde(skip_serializing_if = "Option::is_none")]
  default: Option<String>,
}

impl Choice {
  pub fn new(name: impl Into<String>, choices: Vec<ChoiceOption>) -> Self {
    Self {
      name: name.into(),
      choices,
      default: None,
    }
  }

  pub fn with_default(mut self, default: impl Into<String>) -> Self {
    self.default = Some(default.into());
    self
  }

  /// Append an option. The parameter type rules out anything but a
  /// [`ChoiceOption`], so this cannot fail.
  pub fn add_option(&mut self, option: ChoiceOption) {
    self.choices.push(option);
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub(crate) fn set_name(&mut self, name: String) {
    self.name = name;
  }

  pub fn choices(&self) -> &[ChoiceOption] {
    &self.choices
  }

  pub fn default(&self) -> Option<&str> {
    self.default.as_deref()
  }

  pub(crate) fn transitions(&self) -> Vec<&str> {
    self
      .choices
      .iter()
      .filter_map(ChoiceOption::next)
      .chain(self.default.as_deref())
      .collect()
  }

  /// Options read from a document bypass [`ChoiceOption::new`].
  pub(crate) fn check(&self) -> Result<(), DefinitionError> {
    if self.choices.iter().any(|option| option.condition.is_empty()) {
      return Err(DefinitionError::InvalidCondition {
        found: "empty object".to_string(),
      });
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::state::State;
  use serde_json::json;

  #[test]
  fn test_option_rejects_non_mapping() {
    let err = ChoiceOption::new(json!("not-a-mapping")).unwrap_err();
    assert!(matches!(err, DefinitionError::InvalidCondition { ref found } if found == "string"));
    assert_eq!(err.kind(), crate::ErrorKind::Validation);

    assert!(ChoiceOption::new(json!(["StringEquals", "x"])).is_err());
    assert!(ChoiceOption::new(json!({})).is_err());
  }

  #[test]
  fn test_option_passes_condition_through() {
    let option = ChoiceOption::new(json!({"StringEquals": "x"}))
      .unwrap()
      .with_next("T")
      .with_variable("$.status");

    assert_eq!(
      option.to_json().unwrap(),
      r#"{"StringEquals":"x","Variable":"$.status","Next":"T"}"#
    );
    assert_eq!(option.variable(), Some("$.status"));
  }

  #[test]
  fn test_with_variable_replaces_condition_variable() {
    let option = ChoiceOption::new(json!({"Variable": "$.a", "StringEquals": "x"}))
      .unwrap()
      .with_variable("$.b")
      .with_next("T");

    assert_eq!(option.variable(), Some("$.b"));
    assert_eq!(
      option.to_json().unwrap(),
      r#"{"Variable":"$.b","StringEquals":"x","Next":"T"}"#
    );
  }

  #[test]
  fn test_add_option_appends_serialized_entry() {
    let mut choice = Choice::new("C", Vec::new());
    choice.add_option(
      ChoiceOption::new(json!({"StringEquals": "x"}))
        .unwrap()
        .with_next("T"),
    );

    let value = State::from(choice).to_value().unwrap();
    assert_eq!(
      value["C"]["Choices"],
      json!([{"StringEquals": "x", "Next": "T"}])
    );
  }

  #[test]
  fn test_default_and_transitions() {
    let choice = Choice::new(
      "Route",
      vec![
        ChoiceOption::new(json!({"Variable": "$.n", "NumericGreaterThan": 10}))
          .unwrap()
          .with_next("Big"),
      ],
    )
    .with_default("Small");

    assert_eq!(choice.transitions(), vec!["Big", "Small"]);
    assert_eq!(
      State::from(choice).to_value().unwrap()["Route"]["Default"],
      "Small"
    );
  }
}
