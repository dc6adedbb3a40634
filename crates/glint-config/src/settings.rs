use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
  pub region: String,
  #[serde(rename = "awsClientID")]
  pub aws_client_id: String,
  #[serde(default)]
  pub state_machines: Vec<StateMachineSettings>,
}

/// One workflow definition to register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMachineSettings {
  pub name: String,
  /// Execution role the engine assumes when running the workflow.
  pub role_arn: String,
  /// Path to the JSON definition document.
  pub definition: PathBuf,
  #[serde(default)]
  pub skip: bool,
}

impl Settings {
  /// Parse and check a settings document.
  pub fn from_json(text: &str) -> Result<Self, ConfigError> {
    let settings: Settings = serde_json::from_str(text)?;
    settings.check()?;
    Ok(settings)
  }

  /// Resolve relative definition paths against `base`.
  pub fn resolve_paths(&mut self, base: &Path) {
    for machine in &mut self.state_machines {
      if machine.definition.is_relative() {
        machine.definition = base.join(&machine.definition);
      }
    }
  }

  /// State machines not marked `skip`.
  pub fn active(&self) -> impl Iterator<Item = &StateMachineSettings> {
    self.state_machines.iter().filter(|m| !m.skip)
  }

  fn check(&self) -> Result<(), ConfigError> {
    if self.region.is_empty() {
      return Err(ConfigError::MissingField("region".to_string()));
    }
    if self.aws_client_id.is_empty() {
      return Err(ConfigError::MissingField("awsClientID".to_string()));
    }

    let mut seen = HashSet::new();
    for (index, machine) in self.state_machines.iter().enumerate() {
      if machine.name.is_empty() {
        return Err(ConfigError::MissingField(format!("stateMachines[{index}].name")));
      }
      if machine.role_arn.is_empty() {
        return Err(ConfigError::MissingField(format!("stateMachines[{index}].roleArn")));
      }
      if !seen.insert(machine.name.as_str()) {
        return Err(ConfigError::DuplicateName(machine.name.clone()));
      }
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const SETTINGS: &str = r#"{
    "region": "ap-northeast-1",
    "awsClientID": "123456789012",
    "stateMachines": [
      {"name": "orders", "roleArn": "arn:aws:iam::123456789012:role/exec", "definition": "defs/orders.json"},
      {"name": "legacy", "roleArn": "arn:aws:iam::123456789012:role/exec", "definition": "/abs/legacy.json", "skip": true}
    ]
  }"#;

  #[test]
  fn test_parse_settings() {
    let settings = Settings::from_json(SETTINGS).unwrap();

    assert_eq!(settings.region, "ap-northeast-1");
    assert_eq!(settings.aws_client_id, "123456789012");
    assert_eq!(settings.state_machines.len(), 2);
    assert!(!settings.state_machines[0].skip);
    assert!(settings.state_machines[1].skip);
  }

  #[test]
  fn test_active_skips_marked_entries() {
    let settings = Settings::from_json(SETTINGS).unwrap();
    let names: Vec<_> = settings.active().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["orders"]);
  }

  #[test]
  fn test_resolve_relative_paths_only() {
    let mut settings = Settings::from_json(SETTINGS).unwrap();
    settings.resolve_paths(Path::new("/etc/glint"));

    assert_eq!(
      settings.state_machines[0].definition,
      PathBuf::from("/etc/glint/defs/orders.json")
    );
    assert_eq!(
      settings.state_machines[1].definition,
      PathBuf::from("/abs/legacy.json")
    );
  }

  #[test]
  fn test_missing_state_machines_defaults_to_empty() {
    let settings =
      Settings::from_json(r#"{"region": "us-east-1", "awsClientID": "123456789012"}"#).unwrap();
    assert!(settings.state_machines.is_empty());
  }

  #[test]
  fn test_rejects_empty_region() {
    let err = Settings::from_json(r#"{"region": "", "awsClientID": "1"}"#).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField(field) if field == "region"));
  }

  #[test]
  fn test_rejects_duplicate_names() {
    let err = Settings::from_json(
      r#"{
        "region": "us-east-1",
        "awsClientID": "1",
        "stateMachines": [
          {"name": "a", "roleArn": "r", "definition": "a.json"},
          {"name": "a", "roleArn": "r", "definition": "b.json"}
        ]
      }"#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateName(name) if name == "a"));
  }

  #[test]
  fn test_rejects_malformed_json() {
    assert!(matches!(
      Settings::from_json("{"),
      Err(ConfigError::Parse(_))
    ));
  }
}
