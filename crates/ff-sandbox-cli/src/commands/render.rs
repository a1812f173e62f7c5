use std::path::Path;

use anyhow::{Context, Result};

use ff_sandbox_core::templates::example_parameters;
use ff_sandbox_core::{OperationKey, ParameterBag, TemplateRegistry};

use crate::output;

/// Bind `operation`'s template and print the finished snippet to stdout.
///
/// Parameters come from an optional JSON object file, then `key=value` pairs on top.
/// With neither, the sandbox's example parameters are used.
pub fn run(operation: OperationKey, params: &[(String, String)], params_file: Option<&Path>) -> Result<()> {
    let registry = TemplateRegistry::bundled()?;

    let mut bag = match params_file {
        Some(path) => load_params(path)?,
        None => ParameterBag::new(),
    };
    bag.extend(params.iter().cloned());

    if bag.is_empty() {
        output::print_warning(&format!("no parameters given, using the {operation} examples"));
        bag = example_parameters(operation);
    }

    let snippet = registry
        .render(operation, &bag)
        .with_context(|| format!("failed to render {operation}"))?;
    output::print_snippet(&snippet);
    Ok(())
}

fn load_params(path: &Path) -> Result<ParameterBag> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let bag = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON object of parameters", path.display()))?;
    Ok(bag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_params_from_file() {
        let path = std::env::temp_dir().join(format!("ff-sandbox-params-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "pool": "pool1", "amount": 10, "messagingMethod": null }"#).unwrap();

        let bag = load_params(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(bag.get("pool"), Some(&serde_json::json!("pool1")));
        assert_eq!(bag.get("amount"), Some(&serde_json::json!(10)));
        assert_eq!(bag.get("messagingMethod"), Some(&serde_json::Value::Null));
    }

    #[test]
    fn test_load_params_rejects_non_object() {
        let path = std::env::temp_dir().join(format!("ff-sandbox-bad-{}.json", std::process::id()));
        std::fs::write(&path, "[1, 2]").unwrap();

        let result = load_params(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_load_params_missing_file() {
        let err = load_params(Path::new("/nonexistent/params.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
