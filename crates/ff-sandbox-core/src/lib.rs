//! Core library for the ff-sandbox snippet server.
//!
//! For each supported FireFly operation (token pool creation, mint, burn, transfer,
//! broadcast and private messages) the sandbox publishes a code template showing how to
//! call the FireFly SDK. This crate owns that corpus and the engine that binds a template to
//! concrete parameters:
//!
//! - [`operation`]: the operation keys and the API areas they are served under
//! - [`templates`]: registry, compiler, binder, renderer and formatter
//! - [`error`]: the error taxonomy shared by all of the above
//!
//! The HTTP delivery boundary lives in the `ff-sandbox` binary crate.

pub mod error;
pub mod operation;
pub mod templates;

pub use error::{Result, SandboxError};
pub use operation::{ApiArea, OperationKey};
pub use templates::{ParameterBag, TemplateRegistry};
