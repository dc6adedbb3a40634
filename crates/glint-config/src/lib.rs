//! Glint Config
//!
//! This crate contains the settings file types for Glint. A settings file
//! names the target region and account and lists the workflow definitions
//! to register:
//!
//! ```json
//! {
//!   "region": "ap-northeast-1",
//!   "awsClientID": "123456789012",
//!   "stateMachines": [
//!     {
//!       "name": "order-pipeline",
//!       "roleArn": "arn:aws:iam::123456789012:role/states-exec",
//!       "definition": "definitions/order.json"
//!     }
//!   ]
//! }
//! ```
//!
//! Relative definition paths are resolved against the settings file's
//! directory with [`Settings::resolve_paths`].

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::{Settings, StateMachineSettings};
