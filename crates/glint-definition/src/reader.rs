//! Reading existing definition documents back into the typed model.
//!
//! The document is walked once for shape (objects where objects belong,
//! arrays for `Branches` and `Choices`, a known `Type` on every state) so
//! that type errors carry a path, then decoded with serde and validated state
//! by state.

use serde_json::{Map, Value};

use crate::error::{DefinitionError, json_type};
use crate::machine::StateMachine;

const STATE_TYPES: [&str; 7] = [
  "Task", "Parallel", "Choice", "Wait", "Pass", "Succeed", "Fail",
];

impl StateMachine {
  /// Parse a JSON definition document.
  pub fn from_json(text: &str) -> Result<Self, DefinitionError> {
    let value: Value = serde_json::from_str(text).map_err(DefinitionError::Malformed)?;
    Self::from_value(value)
  }

  /// Build a machine from a parsed definition document.
  ///
  /// Every state is validated as [`StateMachine::add_state`] would; links
  /// between states are not checked, call [`StateMachine::validate`] for that.
  pub fn from_value(value: Value) -> Result<Self, DefinitionError> {
    check_scope(&value, "")?;

    let machine: StateMachine =
      serde_json::from_value(value).map_err(DefinitionError::Malformed)?;

    for state in machine.states() {
      state.validate()?;
    }

    Ok(machine)
  }
}

fn check_scope(value: &Value, path: &str) -> Result<(), DefinitionError> {
  let scope = expect_object(value, path)?;

  if let Some(states) = scope.get("States") {
    let states_path = format!("{path}/States");
    for (name, state) in expect_object(states, &states_path)? {
      check_state(state, &format!("{states_path}/{name}"))?;
    }
  }

  Ok(())
}

fn check_state(value: &Value, path: &str) -> Result<(), DefinitionError> {
  let state = expect_object(value, path)?;
  let type_path = format!("{path}/Type");

  let kind = match state.get("Type") {
    Some(Value::String(kind)) => kind.as_str(),
    Some(other) => return Err(mismatch(&type_path, "string", json_type(other))),
    None => return Err(mismatch(&type_path, "string", "nothing")),
  };

  match kind {
    "Parallel" => {
      if let Some(branches) = state.get("Branches") {
        let branches_path = format!("{path}/Branches");
        for (index, branch) in expect_array(branches, &branches_path)?.iter().enumerate() {
          check_scope(branch, &format!("{branches_path}/{index}"))?;
        }
      }
    }
    "Choice" => {
      if let Some(choices) = state.get("Choices") {
        for option in expect_array(choices, &format!("{path}/Choices"))? {
          if !option.is_object() {
            return Err(DefinitionError::InvalidCondition {
              found: json_type(option).to_string(),
            });
          }
        }
      }
    }
    "Wait" => {
      // The engine only accepts whole seconds.
      if let Some(seconds) = state.get("Seconds")
        && seconds.as_u64().is_none()
      {
        let found = match seconds {
          Value::Number(n) => n.to_string(),
          other => json_type(other).to_string(),
        };
        return Err(mismatch(
          &format!("{path}/Seconds"),
          "non-negative whole number",
          &found,
        ));
      }
    }
    known if STATE_TYPES.contains(&known) => {}
    unknown => {
      return Err(mismatch(
        &type_path,
        "a state type",
        &format!("\"{unknown}\""),
      ));
    }
  }

  Ok(())
}

fn expect_object<'a>(
  value: &'a Value,
  path: &str,
) -> Result<&'a Map<String, Value>, DefinitionError> {
  value
    .as_object()
    .ok_or_else(|| mismatch(path, "object", json_type(value)))
}

fn expect_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, DefinitionError> {
  value
    .as_array()
    .ok_or_else(|| mismatch(path, "array", json_type(value)))
}

fn mismatch(path: &str, expected: &'static str, found: &str) -> DefinitionError {
  DefinitionError::TypeMismatch {
    path: if path.is_empty() { "/".to_string() } else { path.to_string() },
    expected,
    found: found.to_string(),
  }
}
