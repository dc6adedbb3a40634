use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::branch::Branch;
use crate::choice::Choice;
use crate::error::DefinitionError;
use crate::policy::{Catcher, Retrier, check_policies};
use crate::serialize::{Serializable, encode};

/// One node of a workflow graph.
///
/// The `Type` tag is fixed by the variant. A state's name is not part of its
/// body; it is the key under which the state is stored in its scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum State {
  Task(Task),
  Parallel(Parallel),
  Choice(Choice),
  Wait(Wait),
  Pass(Pass),
  Succeed(Succeed),
  Fail(Fail),
}

impl State {
  pub fn name(&self) -> &str {
    match self {
      State::Task(s) => &s.name,
      State::Parallel(s) => &s.name,
      State::Choice(s) => s.name(),
      State::Wait(s) => &s.name,
      State::Pass(s) => &s.name,
      State::Succeed(s) => &s.name,
      State::Fail(s) => &s.name,
    }
  }

  pub(crate) fn set_name(&mut self, name: String) {
    match self {
      State::Task(s) => s.name = name,
      State::Parallel(s) => s.name = name,
      State::Choice(s) => s.set_name(name),
      State::Wait(s) => s.name = name,
      State::Pass(s) => s.name = name,
      State::Succeed(s) => s.name = name,
      State::Fail(s) => s.name = name,
    }
  }

  /// The `Type` tag this state serializes with.
  pub fn type_name(&self) -> &'static str {
    match self {
      State::Task(_) => "Task",
      State::Parallel(_) => "Parallel",
      State::Choice(_) => "Choice",
      State::Wait(_) => "Wait",
      State::Pass(_) => "Pass",
      State::Succeed(_) => "Succeed",
      State::Fail(_) => "Fail",
    }
  }

  /// Whether this state ends its scope instead of transitioning.
  pub fn is_terminal(&self) -> bool {
    match self {
      State::Task(s) => s.transition.is_end(),
      State::Parallel(s) => s.transition.is_end(),
      State::Pass(s) => s.transition.is_end(),
      State::Succeed(_) | State::Fail(_) => true,
      State::Choice(_) | State::Wait(_) => false,
    }
  }

  /// Names of the states this state can transition to, within its own scope.
  pub fn transitions(&self) -> Vec<&str> {
    match self {
      State::Task(s) => with_catchers(s.transition.next(), &s.catch),
      State::Parallel(s) => with_catchers(s.transition.next(), &s.catch),
      State::Choice(s) => s.transitions(),
      State::Wait(s) => vec![s.next.as_str()],
      State::Pass(s) => s.transition.next().into_iter().collect(),
      State::Succeed(_) | State::Fail(_) => Vec::new(),
    }
  }

  /// Check the content-level invariants of this state.
  pub fn validate(&self) -> Result<(), DefinitionError> {
    let name = self.name();
    if name.is_empty() {
      return Err(DefinitionError::EmptyName);
    }

    match self {
      State::Task(task) => {
        if task.resource.is_empty() {
          return Err(DefinitionError::MissingResource {
            state: name.to_string(),
          });
        }
        task.transition.check(name)?;
        check_policies(name, &task.retry, &task.catch)
      }
      State::Parallel(parallel) => {
        parallel.transition.check(name)?;
        check_policies(name, &parallel.retry, &parallel.catch)?;
        for branch in &parallel.branches {
          for state in branch.states() {
            state.validate()?;
          }
        }
        Ok(())
      }
      State::Choice(choice) => choice.check(),
      State::Wait(wait) => {
        if wait.next.is_empty() {
          return Err(DefinitionError::InvalidTransition {
            state: name.to_string(),
          });
        }
        Ok(())
      }
      State::Pass(pass) => pass.transition.check(name),
      State::Succeed(_) | State::Fail(_) => Ok(()),
    }
  }
}

fn with_catchers<'a>(next: Option<&'a str>, catch: &'a [Catcher]) -> Vec<&'a str> {
  next
    .into_iter()
    .chain(catch.iter().map(Catcher::next))
    .collect()
}

impl Serializable for State {
  /// Renders `{ <name>: <definition> }`.
  fn to_value(&self) -> Result<Value, DefinitionError> {
    let mut keyed = Map::new();
    keyed.insert(self.name().to_string(), encode(self)?);
    Ok(Value::Object(keyed))
  }
}

/// `Next` / `End` pair. Exactly one of the two is set on a well-formed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Transition {
  #[serde(skip_serializing_if = "Option::is_none")]
  next: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  end: Option<bool>,
}

impl Transition {
  pub(crate) fn end() -> Self {
    Self {
      next: None,
      end: Some(true),
    }
  }

  pub(crate) fn to(next: impl Into<String>) -> Self {
    Self {
      next: Some(next.into()),
      end: None,
    }
  }

  pub(crate) fn next(&self) -> Option<&str> {
    self.next.as_deref()
  }

  pub(crate) fn is_end(&self) -> bool {
    self.end == Some(true)
  }

  fn check(&self, state: &str) -> Result<(), DefinitionError> {
    match (&self.next, self.end) {
      (Some(next), None) if !next.is_empty() => Ok(()),
      (None, Some(true)) => Ok(()),
      _ => Err(DefinitionError::InvalidTransition {
        state: state.to_string(),
      }),
    }
  }
}

/// Invokes external work identified by a resource reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
  #[serde(skip)]
  name: String,
  resource: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  comment: Option<String>,
  #[serde(flatten)]
  transition: Transition,
  #[serde(skip_serializing_if = "Option::is_none")]
  timeout_seconds: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  heartbeat_seconds: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  result_path: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  retry: Vec<Retrier>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  catch: Vec<Catcher>,
}

impl Task {
  /// A terminal task; call [`Task::with_next`] to continue to another state.
  pub fn new(name: impl Into<String>, resource: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      resource: resource.into(),
      comment: None,
      transition: Transition::end(),
      timeout_seconds: None,
      heartbeat_seconds: None,
      result_path: None,
      retry: Vec::new(),
      catch: Vec::new(),
    }
  }

  pub fn with_next(mut self, next: impl Into<String>) -> Self {
    self.transition = Transition::to(next);
    self
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

  /// A zero heartbeat leaves the field unset.
  pub fn with_heartbeat_seconds(mut self, seconds: u64) -> Self {
    self.heartbeat_seconds = (seconds > 0).then_some(seconds);
    self
  }

  pub fn with_result_path(mut self, path: impl Into<String>) -> Self {
    self.result_path = Some(path.into()).filter(|p| !p.is_empty());
    self
  }

  pub fn with_retry(mut self, retrier: Retrier) -> Self {
    self.retry.push(retrier);
    self
  }

  pub fn with_catch(mut self, catcher: Catcher) -> Self {
    self.catch.push(catcher);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn resource(&self) -> &str {
    &self.resource
  }

  pub fn next(&self) -> Option<&str> {
    self.transition.next()
  }

  pub fn retry(&self) -> &[Retrier] {
    &self.retry
  }

  pub fn catch(&self) -> &[Catcher] {
    &self.catch
  }
}

/// Runs independent branches concurrently and joins their results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parallel {
  #[serde(skip)]
  name: String,
  branches: Vec<Branch>,
  #[serde(flatten)]
  transition: Transition,
  #[serde(skip_serializing_if = "Option::is_none")]
  result_path: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  retry: Vec<Retrier>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  catch: Vec<Catcher>,
}

impl Parallel {
  pub fn new(name: impl Into<String>, branches: Vec<Branch>) -> Self {
    Self {
      name: name.into(),
      branches,
      transition: Transition::end(),
      result_path: None,
      retry: Vec::new(),
      catch: Vec::new(),
    }
  }

  pub fn with_next(mut self, next: impl Into<String>) -> Self {
    self.transition = Transition::to(next);
    self
  }

  pub fn with_result_path(mut self, path: impl Into<String>) -> Self {
    self.result_path = Some(path.into()).filter(|p| !p.is_empty());
    self
  }

  pub fn with_retry(mut self, retrier: Retrier) -> Self {
    self.retry.push(retrier);
    self
  }

  pub fn with_catch(mut self, catcher: Catcher) -> Self {
    self.catch.push(catcher);
    self
  }

  pub fn add_branch(&mut self, branch: Branch) {
    self.branches.push(branch);
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn branches(&self) -> &[Branch] {
    &self.branches
  }

  pub fn next(&self) -> Option<&str> {
    self.transition.next()
  }
}

/// How long a [`Wait`] state delays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WaitFor {
  /// Whole seconds. Documents with a fractional or negative `Seconds` are
  /// rejected when read.
  Seconds(u64),
  /// RFC 3339 timestamp.
  Timestamp(String),
  /// Reference path to a number of seconds in the state input.
  SecondsPath(String),
  /// Reference path to a timestamp in the state input.
  TimestampPath(String),
}

/// Delays for a fixed duration or until a timestamp, then continues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Wait {
  #[serde(skip)]
  name: String,
  #[serde(flatten)]
  wait: WaitFor,
  next: String,
}

impl Wait {
  pub fn new(name: impl Into<String>, wait: WaitFor, next: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      wait,
      next: next.into(),
    }
  }

  pub fn seconds(name: impl Into<String>, seconds: u64, next: impl Into<String>) -> Self {
    Self::new(name, WaitFor::Seconds(seconds), next)
  }

  pub fn timestamp(
    name: impl Into<String>,
    timestamp: impl Into<String>,
    next: impl Into<String>,
  ) -> Self {
    Self::new(name, WaitFor::Timestamp(timestamp.into()), next)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn wait(&self) -> &WaitFor {
    &self.wait
  }

  pub fn next(&self) -> &str {
    &self.next
  }
}

/// Passes its input through, optionally injecting a fixed result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pass {
  #[serde(skip)]
  name: String,
  #[serde(flatten)]
  transition: Transition,
  #[serde(skip_serializing_if = "Option::is_none")]
  result: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  result_path: Option<String>,
}

impl Pass {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      transition: Transition::end(),
      result: None,
      result_path: None,
    }
  }

  pub fn with_next(mut self, next: impl Into<String>) -> Self {
    self.transition = Transition::to(next);
    self
  }

  /// A `null` result leaves the field unset.
  pub fn with_result(mut self, result: Value) -> Self {
    self.result = Some(result).filter(|r| !r.is_null());
    self
  }

  pub fn with_result_path(mut self, path: impl Into<String>) -> Self {
    self.result_path = Some(path.into()).filter(|p| !p.is_empty());
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn next(&self) -> Option<&str> {
    self.transition.next()
  }

  pub fn result(&self) -> Option<&Value> {
    self.result.as_ref()
  }
}

/// Ends the workflow successfully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Succeed {
  #[serde(skip)]
  name: String,
}

impl Succeed {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into() }
  }

  pub fn name(&self) -> &str {
    &self.name
  }
}

/// Ends the workflow with a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Fail {
  #[serde(skip)]
  name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  cause: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  error: Option<String>,
}

impl Fail {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      cause: None,
      error: None,
    }
  }

  pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
    self.cause = Some(cause.into()).filter(|c| !c.is_empty());
    self
  }

  pub fn with_error(mut self, error: impl Into<String>) -> Self {
    self.error = Some(error.into()).filter(|e| !e.is_empty());
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn cause(&self) -> Option<&str> {
    self.cause.as_deref()
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }
}

macro_rules! impl_into_state {
  ($($variant:ident),*) => {
    $(
      impl From<$variant> for State {
        fn from(state: $variant) -> Self {
          State::$variant(state)
        }
      }
    )*
  };
}

impl_into_state!(Task, Parallel, Choice, Wait, Pass, Succeed, Fail);

#[cfg(test)]
mod tests {
  use super::*;
  use crate::policy::ALL_ERRORS;
  use serde_json::json;

  fn body(state: impl Into<State>) -> Value {
    let state = state.into();
    let name = state.name().to_string();
    state.to_value().unwrap()[name.as_str()].clone()
  }

  #[test]
  fn test_task_without_next_is_terminal() {
    assert_eq!(
      body(Task::new("Start", "R1")),
      json!({"Type": "Task", "Resource": "R1", "End": true})
    );
  }

  #[test]
  fn test_task_with_next_drops_end() {
    let value = body(Task::new("Start", "R1").with_next("Done"));
    assert_eq!(value["Next"], "Done");
    assert!(value.get("End").is_none());
  }

  #[test]
  fn test_task_optional_fields_nest_under_state() {
    let task = Task::new("Work", "arn:aws:lambda:us-east-1:123456789012:function:work")
      .with_comment("does the work")
      .with_timeout_seconds(30)
      .with_heartbeat_seconds(10)
      .with_result_path("$.work")
      .with_retry(Retrier::new([ALL_ERRORS]).with_max_attempts(2))
      .with_catch(Catcher::new([ALL_ERRORS], "Failed"));

    assert_eq!(
      body(task),
      json!({
        "Type": "Task",
        "Resource": "arn:aws:lambda:us-east-1:123456789012:function:work",
        "Comment": "does the work",
        "End": true,
        "TimeoutSeconds": 30,
        "HeartbeatSeconds": 10,
        "ResultPath": "$.work",
        "Retry": [{"ErrorEquals": ["States.ALL"], "MaxAttempts": 2}],
        "Catch": [{"ErrorEquals": ["States.ALL"], "Next": "Failed"}]
      })
    );
  }

  #[test]
  fn test_zero_timeout_is_omitted() {
    let value = body(Task::new("Work", "R1").with_timeout_seconds(0));
    assert!(value.get("TimeoutSeconds").is_none());
  }

  #[test]
  fn test_separate_tasks_do_not_share_policies() {
    let with_retry = Task::new("A", "R1").with_retry(Retrier::new([ALL_ERRORS]));
    let plain = Task::new("B", "R1");

    assert_eq!(with_retry.retry().len(), 1);
    assert!(plain.retry().is_empty());
  }

  #[test]
  fn test_wait_always_has_next() {
    assert_eq!(
      body(Wait::seconds("Pause", 10, "Resume")),
      json!({"Type": "Wait", "Seconds": 10, "Next": "Resume"})
    );
    assert_eq!(
      body(Wait::timestamp("Until", "2026-01-01T00:00:00Z", "Resume")),
      json!({"Type": "Wait", "Timestamp": "2026-01-01T00:00:00Z", "Next": "Resume"})
    );
    assert!(!State::from(Wait::seconds("Pause", 10, "Resume")).is_terminal());
  }

  #[test]
  fn test_pass_fields() {
    assert_eq!(body(Pass::new("Noop")), json!({"Type": "Pass", "End": true}));
    assert_eq!(
      body(
        Pass::new("Inject")
          .with_next("Work")
          .with_result(json!({"x": 1}))
          .with_result_path("$.injected")
      ),
      json!({"Type": "Pass", "Next": "Work", "Result": {"x": 1}, "ResultPath": "$.injected"})
    );
  }

  #[test]
  fn test_empty_strings_are_omitted() {
    assert_eq!(
      body(Task::new("Work", "R1").with_comment("").with_result_path("")),
      json!({"Type": "Task", "Resource": "R1", "End": true})
    );
    assert_eq!(
      body(Fail::new("Broken").with_cause("").with_error("")),
      json!({"Type": "Fail"})
    );
    assert_eq!(
      body(Pass::new("Noop").with_result_path("")),
      json!({"Type": "Pass", "End": true})
    );
    assert_eq!(
      body(Parallel::new("Fan", vec![]).with_result_path("")),
      json!({"Type": "Parallel", "Branches": [], "End": true})
    );
  }

  #[test]
  fn test_null_pass_result_is_omitted() {
    let pass = Pass::new("Noop").with_result(Value::Null);
    assert!(pass.result().is_none());
    assert_eq!(body(pass), json!({"Type": "Pass", "End": true}));

    let pass = Pass::new("Zero").with_result(json!(0));
    assert_eq!(pass.result(), Some(&json!(0)));
  }

  #[test]
  fn test_terminal_states() {
    assert_eq!(body(Succeed::new("Done")), json!({"Type": "Succeed"}));
    assert_eq!(
      body(Fail::new("Broken").with_cause("bad input").with_error("InputError")),
      json!({"Type": "Fail", "Cause": "bad input", "Error": "InputError"})
    );
    assert_eq!(body(Fail::new("Broken")), json!({"Type": "Fail"}));
  }

  #[test]
  fn test_transitions_include_catchers() {
    let state: State = Task::new("Work", "R1")
      .with_next("Done")
      .with_catch(Catcher::new([ALL_ERRORS], "Recover"))
      .into();

    assert_eq!(state.transitions(), vec!["Done", "Recover"]);
    assert!(State::from(Succeed::new("Done")).transitions().is_empty());
  }

  #[test]
  fn test_validate_rejects_empty_name_and_resource() {
    assert!(matches!(
      State::from(Succeed::new("")).validate(),
      Err(DefinitionError::EmptyName)
    ));
    assert!(matches!(
      State::from(Task::new("Work", "")).validate(),
      Err(DefinitionError::MissingResource { state }) if state == "Work"
    ));
  }

  #[test]
  fn test_validate_rejects_both_next_and_end() {
    let mut task = Task::new("Work", "R1");
    task.transition = Transition {
      next: Some("Done".to_string()),
      end: Some(true),
    };

    assert!(matches!(
      State::from(task).validate(),
      Err(DefinitionError::InvalidTransition { state }) if state == "Work"
    ));
  }

  #[test]
  fn test_type_name_matches_tag() {
    let state = State::from(Pass::new("Noop"));
    assert_eq!(body(state.clone())["Type"], state.type_name());
  }
}
