use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DefinitionError;
use crate::serialize::{Serializable, encode};
use crate::state::State;
use crate::states::StateMap;

/// An independently scoped sub-graph run as one arm of a Parallel state.
///
/// State names inside a branch do not collide with names in the enclosing
/// machine or in sibling branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Branch {
  start_at: String,
  states: StateMap,
}

impl Branch {
  /// Create a branch whose entry state is `state`.
  ///
  /// The state's name must equal `start_at`.
  pub fn new(
    start_at: impl Into<String>,
    state: impl Into<State>,
  ) -> Result<Self, DefinitionError> {
    let start_at = start_at.into();
    let state = state.into();
    state.validate()?;

    if state.name() != start_at {
      return Err(DefinitionError::EntryStateMismatch {
        start_at,
        found: state.name().to_string(),
      });
    }

    let mut states = StateMap::new();
    states.insert(state);
    Ok(Self { start_at, states })
  }

  /// Add a state, replacing any state of the same name.
  pub fn add_state(&mut self, state: impl Into<State>) -> Result<(), DefinitionError> {
    let state = state.into();
    state.validate()?;
    self.states.insert(state);
    Ok(())
  }

  pub fn start_at(&self) -> &str {
    &self.start_at
  }

  pub fn states(&self) -> &StateMap {
    &self.states
  }
}

impl Serializable for Branch {
  fn to_value(&self) -> Result<Value, DefinitionError> {
    encode(self)
  }
}
