//! Glint Definition
//!
//! This crate contains the typed object model for Amazon States Language
//! workflow definitions. States are assembled into a [`StateMachine`] and
//! rendered as the JSON document an external execution engine runs.
//!
//! The model only guarantees that documents are structurally well-formed:
//! - the first state added to a machine is its entry state
//! - Task, Parallel and Pass states carry exactly one of `Next` or `End`
//! - Wait states always carry `Next`
//! - choice conditions are non-empty mappings
//!
//! [`StateMachine::validate`] additionally checks that every transition
//! target exists in its scope. Existing documents can be read back with
//! [`StateMachine::from_json`].
//!
//! ```
//! use glint_definition::{Serializable, StateMachine, Succeed, Task};
//!
//! let mut machine = StateMachine::new("Start");
//! machine.add_state(Task::new("Start", "arn:aws:lambda:us-east-1:123456789012:function:work").with_next("Done"))?;
//! machine.add_state(Succeed::new("Done"))?;
//! machine.validate()?;
//!
//! let document = machine.to_json()?;
//! # Ok::<(), glint_definition::DefinitionError>(())
//! ```

mod branch;
mod choice;
mod error;
mod machine;
mod policy;
mod reader;
mod serialize;
mod state;
mod states;

pub use branch::Branch;
pub use choice::{Choice, ChoiceOption};
pub use error::{DefinitionError, ErrorKind};
pub use machine::StateMachine;
pub use policy::{ALL_ERRORS, Catcher, Retrier};
pub use serialize::Serializable;
pub use state::{Fail, Parallel, Pass, State, Succeed, Task, Wait, WaitFor};
pub use states::StateMap;
