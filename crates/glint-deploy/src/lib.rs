//! Glint Deploy
//!
//! This crate provides the deployment collaborator for Glint workflow
//! definitions. The [`Deployer`] trait is the seam to the execution engine:
//! it takes a name, a serialized definition document and an execution role
//! reference, and returns an opaque identifier for the registered workflow.
//!
//! [`FsDeployer`] is a local registry that stores definitions on disk and
//! hands out ARN-shaped identifiers; [`deploy`] validates a
//! [`StateMachine`] before handing it to any deployer.

mod fs;

pub use fs::FsDeployer;

use async_trait::async_trait;
use glint_definition::{DefinitionError, Serializable, StateMachine};
use tracing::{info, instrument};

/// Error type for deployment operations.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
  /// The definition document is not well-formed.
  #[error("invalid definition: {0}")]
  Definition(#[from] DefinitionError),

  /// The state machine name is empty, too long or has invalid characters.
  #[error("invalid state machine name: {0:?}")]
  InvalidName(String),

  /// No execution role was supplied.
  #[error("missing execution role for state machine: {0}")]
  MissingRole(String),

  /// A state machine with this name is already registered.
  #[error("state machine already exists: {0}")]
  AlreadyExists(String),

  /// No state machine with this name is registered.
  #[error("state machine not found: {0}")]
  NotFound(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

/// Registers workflow definitions with an execution engine.
#[async_trait]
pub trait Deployer: Send + Sync {
  /// Register `definition` under `name`, to run as `role_arn`.
  ///
  /// Returns the identifier the engine assigned to the workflow.
  async fn create_state_machine(
    &self,
    name: &str,
    definition: &str,
    role_arn: &str,
  ) -> Result<String, DeployError>;
}

/// Validate `machine`, serialize it and register it with `deployer`.
#[instrument(name = "deploy", skip_all, fields(name = %name))]
pub async fn deploy(
  deployer: &dyn Deployer,
  name: &str,
  machine: &StateMachine,
  role_arn: &str,
) -> Result<String, DeployError> {
  machine.validate()?;
  let definition = machine.to_json()?;

  let arn = deployer
    .create_state_machine(name, &definition, role_arn)
    .await?;

  info!(arn = %arn, states = machine.states().len(), "state machine registered");
  Ok(arn)
}
