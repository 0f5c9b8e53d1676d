//! The narrow document capability set the table injector works against.
//!
//! Any backend exposing tables → rows → cells with full-text read access and
//! this mutation surface can be filled by the injector.

use crate::document::model::Alignment;

/// Run-level attributes applied when writing a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellFormat {
    pub bold: bool,
    pub size_pt: f32,
    pub alignment: Alignment,
}

pub trait TableModel {
    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    /// Concatenated paragraph text of a cell, `None` when the cell does
    /// not exist.
    fn cell_text(&self, row: usize, column: usize) -> Option<String>;

    /// Replace a cell's content with a single run. Returns `false` when the
    /// cell does not exist.
    fn set_cell_text(&mut self, row: usize, column: usize, text: &str, format: CellFormat) -> bool;

    /// Empty a cell to a single blank paragraph, keeping its first run's
    /// formatting.
    fn clear_cell(&mut self, row: usize, column: usize) -> bool;

    /// Keep row 0, drop everything else. Row 0 is padded with empty cells
    /// to the table's full width so every column has a header cell.
    fn retain_header(&mut self);

    /// Append an empty row spanning every column; returns its index.
    fn push_row(&mut self) -> usize;

    /// Append an empty column of the given width to every row.
    fn add_column(&mut self, width: u32);
}

pub trait DocumentModel {
    type Table: TableModel;

    /// Number of tables, in document order.
    fn table_count(&self) -> usize;

    fn table(&self, index: usize) -> Option<&Self::Table>;

    fn table_mut(&mut self, index: usize) -> Option<&mut Self::Table>;
}
