//! Template rendering: merge a [`SectionContext`] into a template document.
//!
//! Supported syntax, all inside ordinary paragraphs:
//! - `{{ name }}` anywhere in text: replaced by the scalar's display text.
//!   Unknown names and list names are left as written, which keeps the
//!   template-variable spelling of table markers available to the injector.
//! - A top-level paragraph consisting only of `{% if name %}`,
//!   `{% if not name %}`, `{% else %}` or `{% endif %}` is a block directive:
//!   the directive paragraph is removed and the blocks it encloses are kept
//!   or dropped by the truthiness of `name`.

use tracing::debug;

use crate::context::SectionContext;
use crate::document::model::{Block, Document, Paragraph, Run};
use crate::error::{ReportError, ReportResult};

pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &Document, context: &SectionContext) -> ReportResult<Document>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

impl PlaceholderRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for PlaceholderRenderer {
    fn render(&self, template: &Document, context: &SectionContext) -> ReportResult<Document> {
        let mut document = Document {
            title: substitute(&template.title, context),
            blocks: apply_conditionals(&template.blocks, context)?,
        };

        let mut replaced = 0usize;
        for paragraph in document.paragraphs_mut() {
            if substitute_paragraph(paragraph, context) {
                replaced += 1;
            }
        }
        debug!("Rendered template '{}' ({} paragraphs substituted)", template.title, replaced);

        Ok(document)
    }
}

#[derive(Debug, PartialEq)]
enum Directive<'a> {
    If { name: &'a str, negated: bool },
    Else,
    EndIf,
}

fn parse_directive(text: &str) -> Option<Directive<'_>> {
    let inner = text
        .trim()
        .strip_prefix("{%")?
        .strip_suffix("%}")?
        .trim();

    match inner {
        "else" => Some(Directive::Else),
        "endif" => Some(Directive::EndIf),
        _ => {
            let condition = inner.strip_prefix("if ")?.trim();
            match condition.strip_prefix("not ") {
                Some(name) => Some(Directive::If { name: name.trim(), negated: true }),
                None => Some(Directive::If { name: condition, negated: false }),
            }
        }
    }
}

struct Frame {
    parent_active: bool,
    condition: bool,
    in_else: bool,
}

impl Frame {
    fn active(&self) -> bool {
        self.parent_active && (self.condition != self.in_else)
    }
}

fn apply_conditionals(blocks: &[Block], context: &SectionContext) -> ReportResult<Vec<Block>> {
    let mut out = Vec::with_capacity(blocks.len());
    let mut stack: Vec<Frame> = Vec::new();

    for block in blocks {
        let active = stack.last().map_or(true, Frame::active);

        let text = match block {
            Block::Paragraph(p) => Some(p.text()),
            Block::Table(_) => None,
        };
        let directive = text.as_deref().and_then(parse_directive);

        match directive {
            Some(Directive::If { name, negated }) => {
                stack.push(Frame {
                    parent_active: active,
                    condition: context.is_truthy(name) != negated,
                    in_else: false,
                });
            }
            Some(Directive::Else) => {
                let frame = stack
                    .last_mut()
                    .ok_or_else(|| ReportError::TemplateSyntax("{% else %} without {% if %}".into()))?;
                if frame.in_else {
                    return Err(ReportError::TemplateSyntax("duplicate {% else %}".into()));
                }
                frame.in_else = true;
            }
            Some(Directive::EndIf) => {
                stack
                    .pop()
                    .ok_or_else(|| ReportError::TemplateSyntax("{% endif %} without {% if %}".into()))?;
            }
            None => {
                if active {
                    out.push(block.clone());
                }
            }
        }
    }

    if !stack.is_empty() {
        return Err(ReportError::TemplateSyntax(format!(
            "{} unclosed {{% if %}} block(s)",
            stack.len()
        )));
    }
    Ok(out)
}

/// Replace every resolvable `{{ name }}` in `text`.
fn substitute(text: &str, context: &SectionContext) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        let end = start + 2 + len + 2;
        let name = rest[start + 2..start + 2 + len].trim();

        out.push_str(&rest[..start]);
        match context.display(name) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..end]),
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

/// Substitute run by run so formatting survives; a placeholder split across
/// runs collapses the paragraph into its first run's style.
fn substitute_paragraph(paragraph: &mut Paragraph, context: &SectionContext) -> bool {
    let mut changed = false;
    for run in &mut paragraph.runs {
        if run.text.contains("{{") {
            let rendered = substitute(&run.text, context);
            if rendered != run.text {
                run.text = rendered;
                changed = true;
            }
        }
    }

    let combined = paragraph.text();
    if combined.contains("{{") {
        let rendered = substitute(&combined, context);
        if rendered != combined {
            let style = paragraph
                .runs
                .first()
                .map(|r| r.style.clone())
                .unwrap_or_default();
            paragraph.runs = vec![Run { text: rendered, style }];
            changed = true;
        }
    }
    changed
}
