use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DefinitionError;
use crate::serialize::{Serializable, encode};

/// Error name that matches every error raised by a state.
pub const ALL_ERRORS: &str = "States.ALL";

/// Retry policy attached to a Task or Parallel state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Retrier {
  error_equals: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  interval_seconds: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_attempts: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  backoff_rate: Option<f64>,
}

impl Retrier {
  pub fn new<I, S>(error_equals: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      error_equals: error_equals.into_iter().map(Into::into).collect(),
      interval_seconds: None,
      max_attempts: None,
      backoff_rate: None,
    }
  }

  pub fn with_interval_seconds(mut self, seconds: u64) -> Self {
    self.interval_seconds = Some(seconds);
    self
  }

  pub fn with_max_attempts(mut self, attempts: u32) -> Self {
    self.max_attempts = Some(attempts);
    self
  }

  pub fn with_backoff_rate(mut self, rate: f64) -> Self {
    self.backoff_rate = Some(rate);
    self
  }

  pub fn error_equals(&self) -> &[String] {
    &self.error_equals
  }

  pub fn max_attempts(&self) -> Option<u32> {
    self.max_attempts
  }
}

/// Fallback transition taken when a Task or Parallel state fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Catcher {
  error_equals: Vec<String>,
  next: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  result_path: Option<String>,
}

impl Catcher {
  pub fn new<I, S>(error_equals: I, next: impl Into<String>) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      error_equals: error_equals.into_iter().map(Into::into).collect(),
      next: next.into(),
      result_path: None,
    }
  }

  pub fn with_result_path(mut self, path: impl Into<String>) -> Self {
    self.result_path = Some(path.into()).filter(|p| !p.is_empty());
    self
  }

  pub fn error_equals(&self) -> &[String] {
    &self.error_equals
  }

  pub fn next(&self) -> &str {
    &self.next
  }
}

/// Policies shared by Task and Parallel states.
pub(crate) fn check_policies(
  state: &str,
  retry: &[Retrier],
  catch: &[Catcher],
) -> Result<(), DefinitionError> {
  let retry_lists = retry.iter().map(Retrier::error_equals);
  let catch_lists = catch.iter().map(Catcher::error_equals);

  if retry_lists.chain(catch_lists).any(|errors| errors.is_empty()) {
    return Err(DefinitionError::EmptyErrorEquals {
      state: state.to_string(),
    });
  }

  Ok(())
}

impl Serializable for Retrier {
  fn to_value(&self) -> Result<Value, DefinitionError> {
    encode(self)
  }
}

impl Serializable for Catcher {
  fn to_value(&self) -> Result<Value, DefinitionError> {
    encode(self)
  }
}
