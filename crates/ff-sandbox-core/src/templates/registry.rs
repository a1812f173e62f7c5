//! Template registry: the bundled corpus, compiled once, keyed by operation.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::error::{Result, SandboxError};
use crate::operation::OperationKey;
use crate::templates::binder::{bind, ParameterBag};
use crate::templates::compiler::{compile, CompiledTemplate};
use crate::templates::contract::{Coercion, FieldSpec, ParameterContract};
use crate::templates::embedded;
use crate::templates::formatter::format_snippet;
use crate::templates::renderer::render;

const POOL_TYPES: &[&str] = &["fungible", "nonfungible"];
const MESSAGING_METHODS: &[&str] = &["transfer_broadcast", "transfer_private"];

/// Raw template text plus the parameters it may reference. Immutable once registered.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDefinition {
    pub operation: OperationKey,
    pub raw_text: &'static str,
    pub contract: ParameterContract,
}

#[derive(Debug)]
struct Entry {
    definition: TemplateDefinition,
    compiled: CompiledTemplate,
    served: String,
    fingerprint: String,
}

/// Read-only table of compiled templates.
///
/// Constructed once at startup and shared by reference; nothing mutates it afterwards.
#[derive(Debug)]
pub struct TemplateRegistry {
    entries: BTreeMap<OperationKey, Entry>,
}

impl TemplateRegistry {
    /// Load and compile the corpus embedded in the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_definitions(bundled_definitions())
    }

    /// Compile every definition eagerly. The first malformed template aborts the load.
    pub fn from_definitions(definitions: impl IntoIterator<Item = TemplateDefinition>) -> Result<Self> {
        let mut entries = BTreeMap::new();

        for definition in definitions {
            let operation = definition.operation;
            let compiled = compile(definition.raw_text, &definition.contract).map_err(|e| match e {
                SandboxError::TemplateSyntax { line, message } => SandboxError::TemplateSyntax {
                    line,
                    message: format!("{operation}: {message}"),
                },
                other => other,
            })?;
            let served = format_snippet(definition.raw_text);
            let fingerprint = hex::encode(Sha256::digest(served.as_bytes()));

            tracing::debug!(%operation, %fingerprint, "registered template");
            let replaced = entries.insert(
                operation,
                Entry {
                    definition,
                    compiled,
                    served,
                    fingerprint,
                },
            );
            if replaced.is_some() {
                tracing::warn!(%operation, "template registered twice, keeping the last one");
            }
        }

        tracing::info!(templates = entries.len(), "template registry loaded");
        Ok(Self { entries })
    }

    fn entry(&self, operation: OperationKey) -> Result<&Entry> {
        self.entries
            .get(&operation)
            .ok_or_else(|| SandboxError::UnknownOperation(operation.to_string()))
    }

    /// Look up a definition by its wire name (e.g. `"mint"`).
    pub fn lookup(&self, name: &str) -> Result<&TemplateDefinition> {
        self.get(name.parse()?)
    }

    pub fn get(&self, operation: OperationKey) -> Result<&TemplateDefinition> {
        self.entry(operation).map(|e| &e.definition)
    }

    pub fn compiled(&self, operation: OperationKey) -> Result<&CompiledTemplate> {
        self.entry(operation).map(|e| &e.compiled)
    }

    /// Unbound template text as published to callers.
    pub fn served_text(&self, operation: OperationKey) -> Result<&str> {
        self.entry(operation).map(|e| e.served.as_str())
    }

    /// SHA-256 (hex) of [`TemplateRegistry::served_text`].
    pub fn fingerprint(&self, operation: OperationKey) -> Result<&str> {
        self.entry(operation).map(|e| e.fingerprint.as_str())
    }

    pub fn operations(&self) -> impl Iterator<Item = OperationKey> + '_ {
        self.entries.keys().copied()
    }

    /// Bind `bag`, render and format: the final snippet for `operation`.
    pub fn render(&self, operation: OperationKey, bag: &ParameterBag) -> Result<String> {
        let entry = self.entry(operation)?;
        let binding = bind(bag, &entry.definition.contract)?;
        let raw = render(&entry.compiled, &binding)?;
        Ok(format_snippet(&raw))
    }
}

/// Parameters the sandbox UI pre-fills to show an initial snippet for each operation.
pub fn example_parameters(operation: OperationKey) -> ParameterBag {
    match operation {
        OperationKey::Pools => ParameterBag::new()
            .with("name", "pool1")
            .with("symbol", "P1")
            .with("type", "fungible"),
        OperationKey::Mint => ParameterBag::new().with("pool", "pool1").with("amount", 10),
        OperationKey::Burn => ParameterBag::new()
            .with("pool", "pool1")
            .with("tokenIndex", "1")
            .with("amount", 1),
        OperationKey::Transfer => ParameterBag::new()
            .with("pool", "pool1")
            .with("to", "0x111")
            .with("tokenIndex", "1")
            .with("amount", 1),
        OperationKey::Broadcast | OperationKey::Private => ParameterBag::new()
            .with("tag", "test-tag")
            .with("topic", "test-topic")
            .with("value", "Hello"),
    }
}

/// The corpus shipped with the sandbox.
pub fn bundled_definitions() -> Vec<TemplateDefinition> {
    vec![
        pools_definition(),
        token_transfer_definition(OperationKey::Mint, embedded::MINT),
        token_transfer_definition(OperationKey::Burn, embedded::BURN),
        token_transfer_definition(OperationKey::Transfer, embedded::TRANSFER),
        message_definition(OperationKey::Broadcast, embedded::BROADCAST),
        message_definition(OperationKey::Private, embedded::PRIVATE),
    ]
}

// =========================================================================
// Token templates
// =========================================================================

fn pools_definition() -> TemplateDefinition {
    TemplateDefinition {
        operation: OperationKey::Pools,
        raw_text: embedded::POOLS,
        contract: ParameterContract::new(vec![
            FieldSpec::required("name", Coercion::Text),
            FieldSpec::required("symbol", Coercion::Text),
            FieldSpec::required("type", Coercion::Text).one_of(POOL_TYPES),
            FieldSpec::optional("address", Coercion::UndefinedWhenAbsent),
        ]),
    }
}

/// Mint, burn and transfer share one contract shape. Only transfers have a `to`, and mints
/// take no `tokenIndex` because the token connector assigns it.
fn token_transfer_definition(operation: OperationKey, raw_text: &'static str) -> TemplateDefinition {
    let mut fields = vec![FieldSpec::required("pool", Coercion::Text)];
    if operation == OperationKey::Transfer {
        fields.push(FieldSpec::required("to", Coercion::Text));
    }
    if operation != OperationKey::Mint {
        fields.push(FieldSpec::optional("tokenIndex", Coercion::Decimal));
    }
    fields.extend([
        FieldSpec::required("amount", Coercion::Decimal),
        FieldSpec::optional("messagingMethod", Coercion::Text).one_of(MESSAGING_METHODS),
        FieldSpec::optional("value", Coercion::UndefinedWhenAbsent),
    ]);

    TemplateDefinition {
        operation,
        raw_text,
        contract: ParameterContract::new(fields),
    }
}

// =========================================================================
// Messaging templates
// =========================================================================

fn message_definition(operation: OperationKey, raw_text: &'static str) -> TemplateDefinition {
    let mut fields = vec![
        FieldSpec::required("tag", Coercion::Text),
        FieldSpec::required("topic", Coercion::Text),
        FieldSpec::required("value", Coercion::Text),
    ];
    if operation == OperationKey::Private {
        fields.push(FieldSpec::optional("recipients", Coercion::UndefinedWhenAbsent));
    }

    TemplateDefinition {
        operation,
        raw_text,
        contract: ParameterContract::new(fields),
    }
}
