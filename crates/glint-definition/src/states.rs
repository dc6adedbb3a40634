use std::fmt;

use indexmap::IndexMap;
use indexmap::map::Values;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DefinitionError;
use crate::state::State;

/// Insertion-ordered mapping of state name to state definition.
///
/// Serializes as a JSON object keyed by state name. Inserting a state whose
/// name is already present replaces the earlier definition in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateMap {
  states: IndexMap<String, State>,
}

impl StateMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert a state, returning the definition it replaced, if any.
  pub fn insert(&mut self, state: State) -> Option<State> {
    self.states.insert(state.name().to_string(), state)
  }

  pub fn get(&self, name: &str) -> Option<&State> {
    self.states.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.states.contains_key(name)
  }

  pub fn len(&self) -> usize {
    self.states.len()
  }

  pub fn is_empty(&self) -> bool {
    self.states.is_empty()
  }

  pub fn iter(&self) -> Values<'_, String, State> {
    self.states.values()
  }

  /// State names in insertion order.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.states.keys().map(String::as_str)
  }

  /// Check that `start_at` and every transition target in this scope name a
  /// state of this scope. Parallel branches are checked as their own scopes.
  pub(crate) fn check_links(&self, start_at: &str) -> Result<(), DefinitionError> {
    if self.is_empty() {
      return Err(DefinitionError::EmptyStates);
    }

    if !self.contains(start_at) {
      return Err(DefinitionError::UnknownStartState(start_at.to_string()));
    }

    for state in self.states.values() {
      for target in state.transitions() {
        if !self.contains(target) {
          return Err(DefinitionError::UnknownTarget {
            from: state.name().to_string(),
            to: target.to_string(),
          });
        }
      }

      if let State::Parallel(parallel) = state {
        for branch in parallel.branches() {
          branch.states().check_links(branch.start_at())?;
        }
      }
    }

    Ok(())
  }
}

impl<'a> IntoIterator for &'a StateMap {
  type Item = &'a State;
  type IntoIter = Values<'a, String, State>;

  fn into_iter(self) -> Self::IntoIter {
    self.states.values()
  }
}

impl Serialize for StateMap {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.states.len()))?;
    for (name, state) in &self.states {
      map.serialize_entry(name, state)?;
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for StateMap {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_map(StateMapVisitor)
  }
}

struct StateMapVisitor;

impl<'de> Visitor<'de> for StateMapVisitor {
  type Value = StateMap;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a mapping of state name to state definition")
  }

  fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<StateMap, A::Error> {
    let mut states = StateMap::new();
    while let Some((name, mut state)) = access.next_entry::<String, State>()? {
      state.set_name(name);
      states.insert(state);
    }
    Ok(states)
  }
}
