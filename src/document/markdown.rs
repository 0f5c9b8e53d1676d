//! Markdown rendering of a finished document, for quick review of output.

use crate::document::model::{Block, Cell, Document, Paragraph, Table};

/// Markdown formatter for report documents
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn format(document: &Document) -> String {
        let mut md = String::with_capacity(2048);

        if !document.title.is_empty() {
            md.push_str(&format!("# {}\n\n", document.title));
        }

        for block in &document.blocks {
            match block {
                Block::Paragraph(p) => {
                    let text = Self::format_paragraph(p);
                    if !text.trim().is_empty() {
                        md.push_str(&text);
                        md.push_str("\n\n");
                    }
                }
                Block::Table(t) => {
                    Self::format_table(&mut md, t);
                    md.push('\n');
                }
            }
        }

        md.trim_end().to_string() + "\n"
    }

    fn format_paragraph(paragraph: &Paragraph) -> String {
        paragraph
            .runs
            .iter()
            .map(|run| {
                if run.style.bold && !run.text.trim().is_empty() {
                    format!("**{}**", run.text.trim())
                } else {
                    run.text.clone()
                }
            })
            .collect()
    }

    fn format_cell(cell: &Cell) -> String {
        cell.paragraphs
            .iter()
            .map(Self::format_paragraph)
            .collect::<Vec<_>>()
            .join("<br>")
            .replace('|', "\\|")
    }

    fn format_table(md: &mut String, table: &Table) {
        let Some(header) = table.rows.first() else {
            return;
        };
        let width = table
            .rows
            .iter()
            .map(|r| r.cells.len())
            .max()
            .unwrap_or(0)
            .max(1);

        let line = |cells: &[Cell]| -> String {
            let mut parts: Vec<String> = cells.iter().map(Self::format_cell).collect();
            parts.resize(width, String::new());
            format!("| {} |\n", parts.join(" | "))
        };

        md.push_str(&line(&header.cells));
        md.push_str(&format!("|{}\n", "---|".repeat(width)));
        for row in &table.rows[1..] {
            md.push_str(&line(&row.cells));
        }
    }
}
