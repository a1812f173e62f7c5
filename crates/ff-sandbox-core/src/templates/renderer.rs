//! Renders a [`CompiledTemplate`] against a [`Binding`].
//!
//! Rendering is **strict**: an interpolation whose field has no value in the binding is an
//! error rather than an empty string. Templates produce source code shown to developers; a
//! silently missing value would produce a snippet that looks plausible but is wrong.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::templates::{binder, compiler, formatter, renderer};
//!
//! let compiled = compiler::compile(embedded::MINT, &contract)?;
//! let binding = binder::bind(&bag, &contract)?;
//! let snippet = formatter::format_snippet(&renderer::render(&compiled, &binding)?);
//! ```

use crate::error::{Result, SandboxError};
use crate::templates::binder::Binding;
use crate::templates::compiler::{CompiledTemplate, Segment};

/// Render `compiled` with the values in `binding`.
///
/// Conditional blocks are emitted only when their field is [`Present`]; otherwise the whole
/// block is skipped. The output is raw text and still needs
/// [`format_snippet`](crate::templates::formatter::format_snippet).
///
/// [`Present`]: crate::templates::binder::BoundValue::Present
pub fn render(compiled: &CompiledTemplate, binding: &Binding) -> Result<String> {
    let mut out = String::new();
    render_into(&mut out, compiled.segments(), binding)?;
    Ok(out)
}

fn render_into(out: &mut String, segments: &[Segment], binding: &Binding) -> Result<()> {
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Interpolation(name) => {
                let text = binding
                    .get(name)
                    .and_then(|value| value.text())
                    .ok_or_else(|| SandboxError::UnboundInterpolation(name.clone()))?;
                out.push_str(text);
            }
            Segment::Conditional { field, body } => {
                if binding.is_present(field) {
                    render_into(out, body, binding)?;
                }
            }
        }
    }
    Ok(())
}
