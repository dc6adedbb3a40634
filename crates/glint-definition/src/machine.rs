use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DefinitionError;
use crate::serialize::{Serializable, encode};
use crate::state::State;
use crate::states::StateMap;

/// Root of a workflow definition document.
///
/// A machine is created with the name of its entry state and grows only by
/// [`StateMachine::add_state`]. The first state added must be the entry state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StateMachine {
  start_at: String,
  states: StateMap,
  #[serde(skip_serializing_if = "Option::is_none")]
  comment: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  timeout_seconds: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  version: Option<String>,
}

impl StateMachine {
  pub fn new(start_at: impl Into<String>) -> Self {
    Self {
      start_at: start_at.into(),
      states: StateMap::new(),
      comment: None,
      timeout_seconds: None,
      version: None,
    }
  }

  /// An empty comment leaves the field unset.
  pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
    self.comment = Some(comment.into()).filter(|c| !c.is_empty());
    self
  }

  /// A zero timeout leaves the field unset.
  pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
    self.timeout_seconds = (seconds > 0).then_some(seconds);
    self
  }

  /// An empty version leaves the field unset.
  pub fn with_version(mut self, version: impl Into<String>) -> Self {
    self.version = Some(version.into()).filter(|v| !v.is_empty());
    self
  }

  /// Add a state, replacing any state of the same name.
  ///
  /// The first state added must be named after the entry state. On error the
  /// machine is left unchanged.
  pub fn add_state(&mut self, state: impl Into<State>) -> Result<(), DefinitionError> {
    let state = state.into();
    state.validate()?;

    if self.states.is_empty() && state.name() != self.start_at {
      return Err(DefinitionError::EntryStateMismatch {
        start_at: self.start_at.clone(),
        found: state.name().to_string(),
      });
    }

    self.states.insert(state);
    Ok(())
  }

  /// Check that the entry state exists and that every transition target
  /// names a state in its own scope.
  pub fn validate(&self) -> Result<(), DefinitionError> {
    self.states.check_links(&self.start_at)
  }

  pub fn start_at(&self) -> &str {
    &self.start_at
  }

  pub fn states(&self) -> &StateMap {
    &self.states
  }

  pub fn state(&self, name: &str) -> Option<&State> {
    self.states.get(name)
  }

  pub fn comment(&self) -> Option<&str> {
    self.comment.as_deref()
  }

  pub fn timeout_seconds(&self) -> Option<u64> {
    self.timeout_seconds
  }

  pub fn version(&self) -> Option<&str> {
    self.version.as_deref()
  }
}

impl Serializable for StateMachine {
  fn to_value(&self) -> Result<Value, DefinitionError> {
    encode(self)
  }
}
