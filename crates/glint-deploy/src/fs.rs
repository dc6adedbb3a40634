use std::path::{Path, PathBuf};

use async_trait::async_trait;
use glint_definition::{Serializable, StateMachine};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::{DeployError, Deployer};

const MAX_NAME_LEN: usize = 80;

/// Filesystem-based state machine registry.
///
/// Each registration is stored as `{root}/{name}.json`. Registering a name
/// twice fails with [`DeployError::AlreadyExists`]. A record is written to a
/// staging file first and only linked into place once complete, so a failed
/// write never leaves a partial record behind.
pub struct FsDeployer {
  root: PathBuf,
  region: String,
  account_id: String,
}

/// On-disk record of one registration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Registration {
  name: String,
  state_machine_arn: String,
  role_arn: String,
  definition: serde_json::Value,
}

impl FsDeployer {
  /// Create a registry rooted at `root`, issuing identifiers for the given
  /// region and account.
  pub fn new(
    root: impl Into<PathBuf>,
    region: impl Into<String>,
    account_id: impl Into<String>,
  ) -> Self {
    Self {
      root: root.into(),
      region: region.into(),
      account_id: account_id.into(),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Identifier issued for `name`.
  pub fn arn(&self, name: &str) -> String {
    format!(
      "arn:aws:states:{}:{}:stateMachine:{}",
      self.region, self.account_id, name
    )
  }

  /// Read back the definition registered under `name`.
  pub async fn get_definition(&self, name: &str) -> Result<StateMachine, DeployError> {
    check_name(name)?;
    let path = self.record_path(name);

    let content = fs::read_to_string(&path).await.map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        DeployError::NotFound(name.to_string())
      } else {
        DeployError::Io(e)
      }
    })?;

    let registration: Registration = serde_json::from_str(&content)?;
    Ok(StateMachine::from_value(registration.definition)?)
  }

  fn record_path(&self, name: &str) -> PathBuf {
    self.root.join(format!("{name}.json"))
  }

  fn staging_path(&self, name: &str) -> PathBuf {
    self.root.join(format!(".{name}.json.tmp"))
  }
}

/// Write `contents` to `staging`, then link it to `path`. Linking fails with
/// `AlreadyExists` if `path` is taken.
async fn commit(staging: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
  let mut file = fs::File::create(staging).await?;
  file.write_all(contents).await?;
  file.sync_all().await?;
  drop(file);

  fs::hard_link(staging, path).await
}

/// Names are 1 to 80 characters of ASCII letters, digits, `-` and `_`.
fn check_name(name: &str) -> Result<(), DeployError> {
  let valid_chars = name
    .chars()
    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

  if name.is_empty() || name.len() > MAX_NAME_LEN || !valid_chars {
    return Err(DeployError::InvalidName(name.to_string()));
  }

  Ok(())
}

#[async_trait]
impl Deployer for FsDeployer {
  async fn create_state_machine(
    &self,
    name: &str,
    definition: &str,
    role_arn: &str,
  ) -> Result<String, DeployError> {
    check_name(name)?;
    if role_arn.is_empty() {
      return Err(DeployError::MissingRole(name.to_string()));
    }

    // Reject documents the engine would refuse.
    let machine = StateMachine::from_json(definition)?;
    machine.validate()?;

    let arn = self.arn(name);
    let registration = Registration {
      name: name.to_string(),
      state_machine_arn: arn.clone(),
      role_arn: role_arn.to_string(),
      definition: machine.to_value()?,
    };

    fs::create_dir_all(&self.root).await?;

    let path = self.record_path(name);
    let staging = self.staging_path(name);
    let contents = serde_json::to_string_pretty(&registration)?;

    let committed = commit(&staging, &path, contents.as_bytes()).await;
    if let Err(e) = fs::remove_file(&staging).await
      && e.kind() != std::io::ErrorKind::NotFound
    {
      warn!(path = %staging.display(), error = %e, "failed to remove staging file");
    }

    committed.map_err(|e| {
      if e.kind() == std::io::ErrorKind::AlreadyExists {
        DeployError::AlreadyExists(name.to_string())
      } else {
        DeployError::Io(e)
      }
    })?;

    debug!(path = %path.display(), "registration written");
    Ok(arn)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_check_name() {
    assert!(check_name("order-pipeline_v2").is_ok());
    assert!(check_name("").is_err());
    assert!(check_name("has space").is_err());
    assert!(check_name("../escape").is_err());
    assert!(check_name(&"a".repeat(MAX_NAME_LEN + 1)).is_err());
  }

  #[tokio::test]
  async fn test_failed_write_leaves_no_record() {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let deployer = FsDeployer::new(temp_dir.path(), "ap-northeast-1", "123456789012");
    let definition = r#"{"StartAt":"Done","States":{"Done":{"Type":"Succeed"}}}"#;
    let role = "arn:aws:iam::123456789012:role/states-exec";

    // A directory where the staging file belongs makes the write fail.
    let staging = deployer.staging_path("orders");
    std::fs::create_dir_all(&staging).unwrap();

    let err = deployer
      .create_state_machine("orders", definition, role)
      .await
      .unwrap_err();
    assert!(matches!(err, DeployError::Io(_)));
    assert!(!deployer.record_path("orders").exists());

    std::fs::remove_dir(&staging).unwrap();
    deployer
      .create_state_machine("orders", definition, role)
      .await
      .unwrap();
    assert!(deployer.record_path("orders").exists());
    assert!(!staging.exists());
    assert!(deployer.get_definition("orders").await.is_ok());
  }

  #[test]
  fn test_arn_format() {
    let deployer = FsDeployer::new("/tmp/unused", "ap-northeast-1", "123456789012");
    assert_eq!(
      deployer.arn("orders"),
      "arn:aws:states:ap-northeast-1:123456789012:stateMachine:orders"
    );
  }
}
