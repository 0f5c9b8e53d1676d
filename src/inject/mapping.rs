//! Column mappings: which record field lands in which table column.

use serde::{Deserialize, Serialize};

use crate::document::{Alignment, CellFormat};

/// Default width for columns appended to a short template table (1 inch).
pub const DEFAULT_COLUMN_WIDTH: u32 = 1440;

/// Drives cell alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Identifier,
    Numeric,
    Text,
}

impl ColumnKind {
    pub fn alignment(&self) -> Alignment {
        match self {
            ColumnKind::Identifier | ColumnKind::Numeric => Alignment::Center,
            ColumnKind::Text => Alignment::Left,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub column: usize,
    pub field: String,
    /// Expected header text; `None` leaves the template header alone.
    pub header: Option<String>,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    columns: Vec<ColumnSpec>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column at the next position.
    pub fn column(mut self, field: &str, header: &str, kind: ColumnKind) -> Self {
        let column = self.columns.len();
        self.columns.push(ColumnSpec {
            column,
            field: field.to_string(),
            header: Some(header.to_string()),
            kind,
        });
        self
    }

    pub fn identifier(self, field: &str, header: &str) -> Self {
        self.column(field, header, ColumnKind::Identifier)
    }

    pub fn numeric(self, field: &str, header: &str) -> Self {
        self.column(field, header, ColumnKind::Numeric)
    }

    pub fn text(self, field: &str, header: &str) -> Self {
        self.column(field, header, ColumnKind::Text)
    }

    /// Place a field at an explicit column index.
    pub fn at(mut self, column: usize, field: &str, header: Option<&str>, kind: ColumnKind) -> Self {
        self.columns.push(ColumnSpec {
            column,
            field: field.to_string(),
            header: header.map(str::to_string),
            kind,
        });
        self
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn header_labels(&self) -> Vec<Option<&str>> {
        self.columns.iter().map(|c| c.header.as_deref()).collect()
    }

    pub fn first_field(&self) -> Option<&str> {
        self.columns.first().map(|c| c.field.as_str())
    }
}

/// Marks the aggregate line of a table: a record whose label field equals
/// `label` (case-insensitive) is written in bold.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalRow {
    pub label: String,
    /// Defaults to the mapping's first field.
    pub field: Option<String>,
}

impl TotalRow {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            field: None,
        }
    }

    pub fn on_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }
}

/// Font sizes and widths used when writing injected tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableStyle {
    pub header_font_pt: f32,
    pub body_font_pt: f32,
    pub default_column_width: u32,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_font_pt: 9.0,
            body_font_pt: 8.0,
            default_column_width: DEFAULT_COLUMN_WIDTH,
        }
    }
}

impl TableStyle {
    pub fn header_format(&self) -> CellFormat {
        CellFormat {
            bold: true,
            size_pt: self.header_font_pt,
            alignment: Alignment::Center,
        }
    }

    pub fn body_format(&self, kind: ColumnKind, bold: bool) -> CellFormat {
        CellFormat {
            bold,
            size_pt: self.body_font_pt,
            alignment: kind.alignment(),
        }
    }
}
