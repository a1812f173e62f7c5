//! Parameter contracts: which fields a template may reference and how each is coerced.

use serde_json::Value;

/// How a supplied value is turned into snippet text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Strings become quoted literals; other JSON values are emitted as structural literals.
    Text,
    /// Numbers (or digit strings) become a quoted canonical decimal string, e.g. `'10'`.
    Decimal,
    /// Like [`Coercion::Text`], but an omitted value is rendered as `undefined` so the
    /// key stays visible in the snippet.
    UndefinedWhenAbsent,
}

/// One parameter a template may reference.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
    pub coercion: Coercion,
    pub default: Option<Value>,
    /// Closed set of accepted textual values, if the field is an enumeration.
    pub allowed: Option<&'static [&'static str]>,
}

impl FieldSpec {
    pub fn required(name: &'static str, coercion: Coercion) -> Self {
        Self {
            name,
            required: true,
            coercion,
            default: None,
            allowed: None,
        }
    }

    pub fn optional(name: &'static str, coercion: Coercion) -> Self {
        Self {
            name,
            required: false,
            coercion,
            default: None,
            allowed: None,
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }
}

/// Ordered list of the fields a template is allowed to reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterContract {
    fields: Vec<FieldSpec>,
}

impl ParameterContract {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }
}

impl FromIterator<FieldSpec> for ParameterContract {
    fn from_iter<I: IntoIterator<Item = FieldSpec>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
