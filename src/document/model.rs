//! In-memory document tree: blocks → tables → rows → cells → paragraphs → runs.
//!
//! Serialisable with serde so templates and finished reports can be stored
//! as JSON.

use serde::{Deserialize, Serialize};

use crate::document::access::{CellFormat, DocumentModel, TableModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunStyle {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_pt: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default)]
    pub style: RunStyle,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            alignment: Alignment::Left,
            runs: vec![Run::plain(text)],
        }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

impl Cell {
    pub fn empty() -> Self {
        Self {
            paragraphs: vec![Paragraph::default()],
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            paragraphs: vec![Paragraph::plain(text)],
        }
    }

    /// Paragraph texts joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn write(&mut self, text: &str, format: CellFormat) {
        self.paragraphs = vec![Paragraph {
            alignment: format.alignment,
            runs: vec![Run {
                text: text.to_string(),
                style: RunStyle {
                    bold: format.bold,
                    size_pt: Some(format.size_pt),
                },
            }],
        }];
    }

    /// Collapse to one empty paragraph, keeping the first paragraph's
    /// alignment and first run's style.
    fn clear(&mut self) {
        self.paragraphs.truncate(1);
        match self.paragraphs.first_mut() {
            Some(paragraph) => {
                paragraph.runs.truncate(1);
                if let Some(run) = paragraph.runs.first_mut() {
                    run.text.clear();
                }
            }
            None => self.paragraphs.push(Paragraph::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn plain<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: texts.into_iter().map(Cell::plain).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Grid column widths in twips. May be shorter than the widest row
    /// when a template omits it.
    #[serde(default)]
    pub columns: Vec<u32>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Table {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            columns: Vec::new(),
            rows,
        }
    }

    fn cell_mut(&mut self, row: usize, column: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row)?.cells.get_mut(column)
    }
}

impl TableModel for Table {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        let widest_row = self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
        widest_row.max(self.columns.len())
    }

    fn cell_text(&self, row: usize, column: usize) -> Option<String> {
        self.rows.get(row)?.cells.get(column).map(Cell::text)
    }

    fn set_cell_text(&mut self, row: usize, column: usize, text: &str, format: CellFormat) -> bool {
        match self.cell_mut(row, column) {
            Some(cell) => {
                cell.write(text, format);
                true
            }
            None => false,
        }
    }

    fn clear_cell(&mut self, row: usize, column: usize) -> bool {
        match self.cell_mut(row, column) {
            Some(cell) => {
                cell.clear();
                true
            }
            None => false,
        }
    }

    fn retain_header(&mut self) {
        let width = self.column_count();
        self.rows.truncate(1);
        if let Some(header) = self.rows.first_mut() {
            while header.cells.len() < width {
                header.cells.push(Cell::empty());
            }
        }
    }

    fn push_row(&mut self) -> usize {
        let width = self.column_count();
        self.rows.push(Row {
            cells: (0..width).map(|_| Cell::empty()).collect(),
        });
        self.rows.len() - 1
    }

    fn add_column(&mut self, width: u32) {
        let target = self.column_count() + 1;
        for row in &mut self.rows {
            while row.cells.len() < target {
                row.cells.push(Cell::empty());
            }
        }
        while self.columns.len() < target {
            self.columns.push(width);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    /// Every paragraph, top-level and inside table cells, in document order.
    pub fn paragraphs_mut(&mut self) -> Vec<&mut Paragraph> {
        let mut out = Vec::new();
        for block in &mut self.blocks {
            match block {
                Block::Paragraph(p) => out.push(p),
                Block::Table(t) => {
                    for row in &mut t.rows {
                        for cell in &mut row.cells {
                            out.extend(cell.paragraphs.iter_mut());
                        }
                    }
                }
            }
        }
        out
    }
}

impl DocumentModel for Document {
    type Table = Table;

    fn table_count(&self) -> usize {
        self.tables().count()
    }

    fn table(&self, index: usize) -> Option<&Table> {
        self.tables().nth(index)
    }

    fn table_mut(&mut self, index: usize) -> Option<&mut Table> {
        self.tables_mut().nth(index)
    }
}
