use thiserror::Error;

/// Broad classification of a [`DefinitionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The content of an otherwise well-typed value breaks an invariant.
  Validation,
  /// A value in a document has the wrong JSON type.
  TypeMismatch,
  /// Text encoding failed.
  Encoding,
}

#[derive(Debug, Error)]
pub enum DefinitionError {
  #[error("first state '{found}' does not match StartAt '{start_at}'")]
  EntryStateMismatch { start_at: String, found: String },

  #[error("choice condition must be a non-empty mapping, got {found}")]
  InvalidCondition { found: String },

  #[error("state name must not be empty")]
  EmptyName,

  #[error("task '{state}' has no resource")]
  MissingResource { state: String },

  #[error("state '{state}' must set exactly one of Next or End")]
  InvalidTransition { state: String },

  #[error("retry or catch policy on '{state}' has an empty ErrorEquals list")]
  EmptyErrorEquals { state: String },

  #[error("no states defined")]
  EmptyStates,

  #[error("StartAt references unknown state: {0}")]
  UnknownStartState(String),

  #[error("state '{from}' transitions to unknown state '{to}'")]
  UnknownTarget { from: String, to: String },

  #[error("malformed definition: {0}")]
  Malformed(#[source] serde_json::Error),

  #[error("type mismatch at {path}: expected {expected}, got {found}")]
  TypeMismatch {
    path: String,
    expected: &'static str,
    found: String,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl DefinitionError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      DefinitionError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
      DefinitionError::Json(_) => ErrorKind::Encoding,
      _ => ErrorKind::Validation,
    }
  }
}

/// Name of the JSON type of `value`, for error messages.
pub(crate) fn json_type(value: &serde_json::Value) -> &'static str {
  match value {
    serde_json::Value::Null => "null",
    serde_json::Value::Bool(_) => "boolean",
    serde_json::Value::Number(_) => "number",
    serde_json::Value::String(_) => "string",
    serde_json::Value::Array(_) => "array",
    serde_json::Value::Object(_) => "object",
  }
}
