//! Snippet template engine.
//!
//! Templates are embedded into the binary at compile-time via [`include_str!`] in the
//! [`embedded`] module, registered with their parameter contracts in [`registry`], and
//! compiled once. Rendering a snippet is a three-step pipeline:
//!
//! 1. [`binder::bind`]: validate and coerce the caller's parameters
//! 2. [`renderer::render`]: substitute values and evaluate conditional blocks
//! 3. [`formatter::format_snippet`]: canonicalize whitespace
//!
//! ## Template syntax
//!
//! - `{{field}}`: replaced by the field's bound value
//! - `{{#if field}} ... {{/if}}`: kept only when `field` has a genuine value
//!
//! **Warning**: template files in `templates/` and the contracts in [`registry`] must stay
//! in sync. A template referencing an undeclared field fails to load.

pub mod binder;
pub mod compiler;
pub mod contract;
pub mod embedded;
pub mod formatter;
pub mod registry;
pub mod renderer;

pub use binder::{bind, BoundValue, Binding, ParameterBag};
pub use compiler::{compile, CompiledTemplate, Segment};
pub use contract::{Coercion, FieldSpec, ParameterContract};
pub use formatter::format_snippet;
pub use registry::{example_parameters, TemplateDefinition, TemplateRegistry};
pub use renderer::render;
