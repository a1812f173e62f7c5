use anyhow::{Context, Result};

use ff_sandbox_core::templates::example_parameters;
use ff_sandbox_core::TemplateRegistry;

use crate::output;

/// Compile the bundled corpus and render every operation with its example parameters.
pub fn run() -> Result<()> {
    output::print_header("ff-sandbox check");

    output::print_step(1, 2, "Compiling template corpus...");
    let registry = TemplateRegistry::bundled().context("bundled template corpus is invalid")?;

    output::print_step(2, 2, "Rendering example snippets...");
    let mut count = 0;
    for operation in registry.operations() {
        registry
            .render(operation, &example_parameters(operation))
            .with_context(|| format!("{operation}: example parameters do not render"))?;

        output::print_contract(operation, registry.get(operation)?.contract.fields());
        output::print_route(operation);
        output::print_etag(registry.fingerprint(operation)?);
        count += 1;
    }

    output::print_success(&format!("{count} templates OK"));
    Ok(())
}
