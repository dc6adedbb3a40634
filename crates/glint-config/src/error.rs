use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid settings file: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("missing required setting: {0}")]
  MissingField(String),

  #[error("state machine listed more than once: {0}")]
  DuplicateName(String),
}
