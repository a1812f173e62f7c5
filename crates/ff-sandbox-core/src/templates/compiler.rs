//! Single-pass compiler from template source to a segment list.
//!
//! Recognised directives:
//!
//! ```text
//! {{field}}            interpolation (whitespace inside the braces is ignored)
//! {{#if field}} ... {{/if}}   conditional block, emitted only when `field` is present
//! ```
//!
//! Conditional blocks do not nest. A block tag that is the only thing on its line is
//! "standalone": the whole line, including indentation and line break, belongs to the
//! tag, so a dropped block leaves no blank line behind.

use crate::error::{Result, SandboxError};
use crate::templates::contract::ParameterContract;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// One piece of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Emitted verbatim.
    Literal(String),
    /// Replaced by the bound value's rendered text.
    Interpolation(String),
    /// Body emitted only if `field` is genuinely present in the binding.
    /// The body never contains another `Conditional`.
    Conditional { field: String, body: Vec<Segment> },
}

/// A template parsed once and rendered many times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledTemplate {
    segments: Vec<Segment>,
}

impl CompiledTemplate {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Every field name the template references, in order of first appearance.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(_) => {}
                Segment::Interpolation(name) => note_field(&mut fields, name),
                Segment::Conditional { field, body } => {
                    note_field(&mut fields, field);
                    for inner in body {
                        if let Segment::Interpolation(name) = inner {
                            note_field(&mut fields, name);
                        }
                    }
                }
            }
        }
        fields
    }
}

fn note_field<'a>(fields: &mut Vec<&'a str>, name: &'a str) {
    if !fields.contains(&name) {
        fields.push(name);
    }
}

enum Directive<'a> {
    Interpolation(&'a str),
    Open(&'a str),
    Close,
}

impl<'a> Directive<'a> {
    fn parse(inner: &'a str) -> Option<Self> {
        let inner = inner.trim();
        if inner == "/if" {
            return Some(Self::Close);
        }
        if let Some(rest) = inner.strip_prefix("#if") {
            // `{{#iffoo}}` is not a block open
            if !rest.starts_with(char::is_whitespace) {
                return None;
            }
            let name = rest.trim();
            return is_field_name(name).then_some(Self::Open(name));
        }
        is_field_name(inner).then_some(Self::Interpolation(inner))
    }
}

struct OpenBlock {
    field: String,
    body: Vec<Segment>,
    line: usize,
}

/// Compile `source` against `contract`.
///
/// Fails with [`SandboxError::TemplateSyntax`] on an unterminated or malformed directive,
/// a field missing from the contract, a nested block, a stray `{{/if}}`, or an unclosed block.
pub fn compile(source: &str, contract: &ParameterContract) -> Result<CompiledTemplate> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut block: Option<OpenBlock> = None;
    let mut literal = String::new();
    let mut pos = 0;

    while let Some(found) = source[pos..].find(OPEN) {
        let start = pos + found;
        literal.push_str(&source[pos..start]);

        let inner_start = start + OPEN.len();
        let inner_len = source[inner_start..]
            .find(CLOSE)
            .ok_or_else(|| syntax_error(source, start, "unterminated directive, missing `}}`"))?;
        let inner = &source[inner_start..inner_start + inner_len];
        let end = inner_start + inner_len + CLOSE.len();

        let directive = Directive::parse(inner).ok_or_else(|| {
            syntax_error(source, start, format!("malformed directive `{{{{{inner}}}}}`"))
        })?;
        pos = end;

        match directive {
            Directive::Interpolation(name) => {
                require_field(source, start, name, contract)?;
                let target = match block.as_mut() {
                    Some(open) => &mut open.body,
                    None => &mut segments,
                };
                flush_literal(&mut literal, target);
                target.push(Segment::Interpolation(name.to_string()));
            }
            Directive::Open(name) => {
                require_field(source, start, name, contract)?;
                if let Some(open) = &block {
                    return Err(syntax_error(
                        source,
                        start,
                        format!(
                            "nested conditional blocks are not supported (block for '{}' opened at line {})",
                            open.field, open.line
                        ),
                    ));
                }
                if let Some((resume, indent)) = standalone(source, start, end) {
                    literal.truncate(literal.len() - indent);
                    pos = resume;
                }
                flush_literal(&mut literal, &mut segments);
                block = Some(OpenBlock {
                    field: name.to_string(),
                    body: Vec::new(),
                    line: line_of(source, start),
                });
            }
            Directive::Close => {
                let Some(mut open) = block.take() else {
                    return Err(syntax_error(source, start, "`{{/if}}` without a matching `{{#if}}`"));
                };
                if let Some((resume, indent)) = standalone(source, start, end) {
                    literal.truncate(literal.len() - indent);
                    pos = resume;
                }
                flush_literal(&mut literal, &mut open.body);
                segments.push(Segment::Conditional {
                    field: open.field,
                    body: open.body,
                });
            }
        }
    }

    if let Some(open) = block {
        return Err(SandboxError::TemplateSyntax {
            line: open.line,
            message: format!("conditional block for '{}' is never closed", open.field),
        });
    }

    literal.push_str(&source[pos..]);
    flush_literal(&mut literal, &mut segments);

    tracing::debug!(segments = segments.len(), "compiled template");
    Ok(CompiledTemplate { segments })
}

fn flush_literal(literal: &mut String, out: &mut Vec<Segment>) {
    if !literal.is_empty() {
        out.push(Segment::Literal(std::mem::take(literal)));
    }
}

fn require_field(source: &str, offset: usize, name: &str, contract: &ParameterContract) -> Result<()> {
    if contract.contains(name) {
        Ok(())
    } else {
        Err(syntax_error(
            source,
            offset,
            format!("field '{name}' is not declared in the parameter contract"),
        ))
    }
}

/// If the tag spanning `start..end` is alone on its line, returns the offset just past the
/// line break and the width of the indentation preceding the tag.
fn standalone(source: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    let indent = &source[line_start..start];
    if !indent.chars().all(is_blank) {
        return None;
    }

    let rest = &source[end..];
    let line_len = rest.find('\n').map_or(rest.len(), |i| i + 1);
    let tail = rest[..line_len].trim_end_matches('\n').trim_end_matches('\r');
    if !tail.chars().all(is_blank) {
        return None;
    }

    Some((end + line_len, indent.len()))
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

fn syntax_error(source: &str, offset: usize, message: impl Into<String>) -> SandboxError {
    SandboxError::TemplateSyntax {
        line: line_of(source, offset),
        message: message.into(),
    }
}
