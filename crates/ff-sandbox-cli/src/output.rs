//! Terminal output for the ff-sandbox CLI.
//!
//! Status lines are styled with [`console`]. Snippets and templates go to stdout unstyled
//! so they can be piped or pasted as-is; warnings go to stderr for the same reason.

use console::style;

use ff_sandbox_core::templates::FieldSpec;
use ff_sandbox_core::OperationKey;

/// Print a bold cyan header with an underline separator.
pub fn print_header(text: &str) {
    println!("\n{}", style(text).bold().cyan());
    println!("{}", style("=".repeat(text.len())).dim());
}

pub fn print_success(text: &str) {
    println!("{} {}", style("[OK]").green().bold(), text);
}

pub fn print_warning(text: &str) {
    eprintln!("{} {}", style("[WARN]").yellow().bold(), text);
}

/// Print a progress step indicator like `[1/2] Compiling template corpus...`.
pub fn print_step(step: u32, total: u32, text: &str) {
    println!("{} {}", style(format!("[{step}/{total}]")).dim(), text);
}

/// `  GET /api/tokens/template/mint`
pub fn print_route(operation: OperationKey) {
    println!("  {} {}", style("GET").dim(), operation.template_path());
}

/// One line per operation: its name, then the contract with optional fields marked `?`.
pub fn print_contract(operation: OperationKey, fields: &[FieldSpec]) {
    println!("  {:<10} {}", style(operation.as_str()).bold(), field_list(fields));
}

fn field_list(fields: &[FieldSpec]) -> String {
    fields
        .iter()
        .map(|f| if f.required { f.name.to_string() } else { format!("{}?", f.name) })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print a fingerprint the way the server sends it in `ETag`.
pub fn print_etag(fingerprint: &str) {
    println!("  {:<10} {}", style("etag").dim(), style(format!("\"{fingerprint}\"")).dim());
}

/// Write snippet or template text verbatim, with a single trailing newline.
pub fn print_snippet(text: &str) {
    println!("{text}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_sandbox_core::TemplateRegistry;

    #[test]
    fn test_field_list_marks_optional_fields() {
        let registry = TemplateRegistry::bundled().unwrap();
        let contract = &registry.get(OperationKey::Transfer).unwrap().contract;
        assert_eq!(
            field_list(contract.fields()),
            "pool, to, tokenIndex?, amount, messagingMethod?, value?"
        );

        let contract = &registry.get(OperationKey::Pools).unwrap().contract;
        assert_eq!(field_list(contract.fields()), "name, symbol, type, address?");
    }
}
