use anyhow::Result;

use ff_sandbox_core::{OperationKey, TemplateRegistry};

use crate::output;

/// Print the unbound template for `operation`, exactly as `serve` publishes it.
pub fn run(operation: OperationKey) -> Result<()> {
    let registry = TemplateRegistry::bundled()?;
    output::print_snippet(registry.served_text(operation)?);
    Ok(())
}
