//! Marker-based table injection.
//!
//! A pass locates the table carrying a marker, keeps its header row,
//! discards the body and writes one fresh row per record. Everything that
//! can go wrong for one table is logged and reported as an
//! [`InjectionOutcome`]; it never aborts the rest of the document.

use tracing::{debug, error, info, warn};

use crate::document::{DocumentModel, TableModel};
use crate::error::{ReportError, ReportResult};
use crate::inject::mapping::{ColumnMapping, TableStyle, TotalRow};
use crate::inject::marker::{Marker, SurfaceForm};
use crate::record::{field_text, Record};

/// Where a marker was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLocation {
    pub table_index: usize,
    pub row: usize,
    pub column: usize,
    pub form: SurfaceForm,
}

impl TableLocation {
    /// Header cell holding the placeholder text, when the marker sits in
    /// row 0. Body-row placeholders disappear with the body.
    pub fn header_placeholder(&self) -> Option<usize> {
        (self.row == 0).then_some(self.column)
    }
}

/// First cell carrying the marker, scanning tables, rows and cells in
/// document order. Duplicate markers resolve to the first table.
pub fn locate<D: DocumentModel>(document: &D, marker: &Marker) -> ReportResult<TableLocation> {
    for table_index in 0..document.table_count() {
        let Some(table) = document.table(table_index) else {
            continue;
        };
        for row in 0..table.row_count() {
            for column in 0..table.column_count() {
                let Some(text) = table.cell_text(row, column) else {
                    continue;
                };
                if let Some(form) = marker.matched_form(&text) {
                    debug!(
                        "Marker {} found as {:?} at table {}, row {}, column {}",
                        marker, form, table_index, row, column
                    );
                    return Ok(TableLocation {
                        table_index,
                        row,
                        column,
                        form,
                    });
                }
            }
        }
    }
    Err(ReportError::MarkerNotFound(marker.name().to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectSummary {
    pub rows_written: usize,
    pub columns_added: usize,
    pub headers_rewritten: usize,
    /// Mapped column indices the table could not reach; left blank.
    pub unreachable_columns: Vec<usize>,
}

/// Rebuild `table` from `records`.
///
/// Postcondition: `table.row_count() == 1 + records.len()`.
pub fn inject<T: TableModel>(
    table: &mut T,
    records: &[Record],
    mapping: &ColumnMapping,
    total_row: Option<&TotalRow>,
    style: &TableStyle,
) -> ReportResult<InjectSummary> {
    if table.row_count() == 0 {
        return Err(ReportError::MissingHeader);
    }

    let mut summary = InjectSummary::default();

    while table.column_count() < mapping.len() {
        table.add_column(style.default_column_width);
        summary.columns_added += 1;
    }
    let width = table.column_count();
    summary.unreachable_columns = mapping
        .columns()
        .iter()
        .map(|c| c.column)
        .filter(|&c| c >= width)
        .collect();

    table.retain_header();

    for spec in mapping.columns() {
        let Some(label) = spec.header.as_deref() else {
            continue;
        };
        let Some(current) = table.cell_text(0, spec.column) else {
            continue;
        };
        if current.trim().to_uppercase() != label.trim().to_uppercase()
            && table.set_cell_text(0, spec.column, label, style.header_format())
        {
            summary.headers_rewritten += 1;
        }
    }

    let total_field = total_row.and_then(|t| t.field.as_deref().or_else(|| mapping.first_field()));
    for record in records {
        let bold = match (total_row, total_field) {
            (Some(total), Some(field)) => {
                field_text(record, field).trim().to_lowercase() == total.label.trim().to_lowercase()
            }
            _ => false,
        };

        let row = table.push_row();
        for spec in mapping.columns() {
            if spec.column >= width {
                continue;
            }
            let text = field_text(record, &spec.field);
            table.set_cell_text(row, spec.column, &text, style.body_format(spec.kind, bold));
        }
        summary.rows_written += 1;
    }

    let expected = 1 + records.len();
    if table.row_count() != expected {
        return Err(ReportError::RowCountMismatch {
            expected,
            actual: table.row_count(),
        });
    }
    Ok(summary)
}

/// One table to fill: marker, data and how fields map to columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePass {
    pub marker: Marker,
    pub records: Vec<Record>,
    pub mapping: ColumnMapping,
    pub total_row: Option<TotalRow>,
}

impl TablePass {
    pub fn new(marker: &str, records: Vec<Record>, mapping: ColumnMapping) -> Self {
        Self {
            marker: Marker::new(marker),
            records,
            mapping,
            total_row: None,
        }
    }

    pub fn with_total_row(mut self, total_row: TotalRow) -> Self {
        self.total_row = Some(total_row);
        self
    }

    /// Locate, clear the header placeholder and inject. Never fails; the
    /// outcome says what happened.
    pub fn apply<D: DocumentModel>(&self, document: &mut D, style: &TableStyle) -> InjectionOutcome {
        let marker = self.marker.name().to_string();

        let location = match locate(document, &self.marker) {
            Ok(location) => location,
            Err(e) => {
                warn!("{}; keeping the template's static content", e);
                return InjectionOutcome::MarkerNotFound { marker };
            }
        };

        let Some(table) = document.table_mut(location.table_index) else {
            let reason = format!("table {} disappeared after lookup", location.table_index);
            error!("Injection into '{}' failed: {}", marker, reason);
            return InjectionOutcome::Failed { marker, reason };
        };

        if let Some(column) = location.header_placeholder() {
            table.clear_cell(0, column);
        }

        match inject(table, &self.records, &self.mapping, self.total_row.as_ref(), style) {
            Ok(summary) => {
                if let Some(&required) = summary.unreachable_columns.iter().max() {
                    let mismatch = ReportError::ColumnMismatch {
                        marker: marker.clone(),
                        available: table.column_count(),
                        required,
                    };
                    warn!("{}; those cells are left blank", mismatch);
                }
                if summary.columns_added > 0 {
                    info!("Added {} column(s) to table '{}'", summary.columns_added, marker);
                }
                info!("Injected {} row(s) into '{}'", summary.rows_written, marker);
                InjectionOutcome::Injected { marker, summary }
            }
            Err(e) => {
                let failure = ReportError::InjectionFailure {
                    marker: marker.clone(),
                    reason: e.to_string(),
                };
                error!("{:?}: {}", location, failure);
                InjectionOutcome::Failed {
                    marker,
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InjectionOutcome {
    Injected { marker: String, summary: InjectSummary },
    MarkerNotFound { marker: String },
    Failed { marker: String, reason: String },
}

impl InjectionOutcome {
    pub fn marker(&self) -> &str {
        match self {
            InjectionOutcome::Injected { marker, .. }
            | InjectionOutcome::MarkerNotFound { marker }
            | InjectionOutcome::Failed { marker, .. } => marker,
        }
    }

    pub fn is_injected(&self) -> bool {
        matches!(self, InjectionOutcome::Injected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Alignment, Block, CellFormat, Document, Paragraph, Row, Table};
    use crate::inject::mapping::ColumnKind;
    use crate::record::record_from;
    use serde_json::json;

    fn doc_with(tables: Vec<Table>) -> Document {
        let mut blocks = vec![Block::Paragraph(Paragraph::plain("Informe"))];
        blocks.extend(tables.into_iter().map(Block::Table));
        Document { title: String::new(), blocks }
    }

    fn id_fecha_mapping() -> ColumnMapping {
        ColumnMapping::new().identifier("id", "ID").identifier("fecha", "FECHA")
    }

    fn records(n: usize) -> Vec<Record> {
        (1..=n)
            .map(|i| record_from([("id", json!(format!("MT-{:03}", i))), ("fecha", json!("2026-10-01"))]))
            .collect()
    }

    fn header_texts(table: &Table) -> Vec<String> {
        table.rows[0].cells.iter().map(|c| c.text()).collect()
    }

    #[test]
    fn test_stale_rows_replaced() {
        let mut table = Table::from_rows(vec![
            Row::plain(["ID", "FECHA"]),
            Row::plain(["old-1", "x"]),
            Row::plain(["old-2", "y"]),
            Row::plain(["old-3", "z"]),
        ]);
        let style = TableStyle::default();
        let summary = inject(&mut table, &records(2), &id_fecha_mapping(), None, &style).unwrap();

        assert_eq!(table.row_count(), 3);
        assert_eq!(summary.rows_written, 2);
        assert_eq!(summary.headers_rewritten, 0);
        assert_eq!(header_texts(&table), ["ID", "FECHA"]);
        assert_eq!(table.cell_text(1, 0).as_deref(), Some("MT-001"));
        assert_eq!(table.cell_text(2, 0).as_deref(), Some("MT-002"));
    }

    #[test]
    fn test_row_count_invariant() {
        let style = TableStyle::default();
        for before in 1..5 {
            for n in 0..4 {
                let mut rows = vec![Row::plain(["ID", "FECHA"])];
                rows.extend((1..before).map(|_| Row::plain(["a", "b"])));
                let mut table = Table::from_rows(rows);
                inject(&mut table, &records(n), &id_fecha_mapping(), None, &style).unwrap();
                assert_eq!(table.row_count(), 1 + n);
            }
        }
    }

    #[test]
    fn test_header_correction_is_idempotent() {
        let mut table = Table::from_rows(vec![Row::plain(["Identificador", "fecha "])]);
        let style = TableStyle::default();
        let mapping = id_fecha_mapping();

        let first = inject(&mut table, &records(1), &mapping, None, &style).unwrap();
        assert_eq!(first.headers_rewritten, 1);
        assert_eq!(header_texts(&table), ["ID", "fecha "]);
        let header_run = &table.rows[0].cells[0].paragraphs[0];
        assert_eq!(header_run.alignment, Alignment::Center);
        assert!(header_run.runs[0].style.bold);
        assert_eq!(header_run.runs[0].style.size_pt, Some(9.0));

        let second = inject(&mut table, &records(1), &mapping, None, &style).unwrap();
        assert_eq!(second.headers_rewritten, 0);
        assert_eq!(header_texts(&table), ["ID", "fecha "]);
    }

    #[test]
    fn test_adds_missing_columns() {
        let mut table = Table::from_rows(vec![Row::plain(["ID"]), Row::plain(["old"])]);
        let style = TableStyle::default();
        let mapping = ColumnMapping::new()
            .identifier("id", "ID")
            .identifier("fecha", "FECHA")
            .text("descripcion", "DESCRIPCIÓN");
        let summary = inject(&mut table, &records(1), &mapping, None, &style).unwrap();

        assert_eq!(summary.columns_added, 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.columns, vec![1440, 1440, 1440]);
        assert_eq!(header_texts(&table), ["ID", "FECHA", "DESCRIPCIÓN"]);
        // missing field renders empty
        assert_eq!(table.cell_text(1, 2).as_deref(), Some(""));
    }

    #[test]
    fn test_unreachable_column_left_blank() {
        let mut table = Table::from_rows(vec![Row::plain(["ID", "FECHA"])]);
        let mapping = id_fecha_mapping().at(7, "extra", Some("EXTRA"), ColumnKind::Text);
        let summary = inject(&mut table, &records(2), &mapping, None, &TableStyle::default()).unwrap();

        assert_eq!(summary.unreachable_columns, [7]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 3);
    }

    #[test]
    fn test_alignment_and_font_policy() {
        let mut table = Table::from_rows(vec![Row::plain(["ID", "DESCRIPCIÓN"])]);
        let mapping = ColumnMapping::new().identifier("id", "ID").text("descripcion", "DESCRIPCIÓN");
        let data = vec![record_from([("id", "R-1"), ("descripcion", "Falla de bomba")])];
        inject(&mut table, &data, &mapping, None, &TableStyle::default()).unwrap();

        let id_cell = &table.rows[1].cells[0].paragraphs[0];
        let text_cell = &table.rows[1].cells[1].paragraphs[0];
        assert_eq!(id_cell.alignment, Alignment::Center);
        assert_eq!(text_cell.alignment, Alignment::Left);
        assert_eq!(text_cell.runs[0].style.size_pt, Some(8.0));
        assert!(!text_cell.runs[0].style.bold);
    }

    #[test]
    fn test_total_row_is_bold() {
        let mut table = Table::from_rows(vec![Row::plain(["RUBRO", "VALOR"])]);
        let mapping = ColumnMapping::new().text("rubro", "RUBRO").numeric("valor", "VALOR");
        let data = vec![
            record_from([("rubro", "Personal"), ("valor", "10")]),
            record_from([("rubro", "total"), ("valor", "10")]),
        ];
        inject(&mut table, &data, &mapping, Some(&TotalRow::new("TOTAL")), &TableStyle::default()).unwrap();

        assert!(!table.rows[1].cells[0].paragraphs[0].runs[0].style.bold);
        assert!(table.rows[2].cells[0].paragraphs[0].runs[0].style.bold);
        assert!(table.rows[2].cells[1].paragraphs[0].runs[0].style.bold);
    }

    #[test]
    fn test_empty_table_rejected() {
        let mut table = Table::default();
        let err = inject(&mut table, &records(1), &id_fecha_mapping(), None, &TableStyle::default());
        assert!(matches!(err, Err(ReportError::MissingHeader)));
    }

    #[test]
    fn test_locate_every_surface_form() {
        for placeholder in ["[[TABLA_X]]", "{{ tabla_x }}", "{{TABLA_X}}", "Tabla: TABLA_X"] {
            let doc = doc_with(vec![
                Table::from_rows(vec![Row::plain(["otra", "tabla"])]),
                Table::from_rows(vec![Row::plain(["ID", "FECHA"]), Row::plain([placeholder, ""])]),
            ]);
            let location = locate(&doc, &Marker::new("TABLA_X")).unwrap();
            assert_eq!(location.table_index, 1, "form {}", placeholder);
            assert_eq!(location.row, 1);
            assert_eq!(location.header_placeholder(), None);
        }
    }

    #[test]
    fn test_locate_first_match_wins() {
        let doc = doc_with(vec![
            Table::from_rows(vec![Row::plain(["x", "[[DUP]]"])]),
            Table::from_rows(vec![Row::plain(["[[DUP]]"])]),
        ]);
        let location = locate(&doc, &Marker::new("DUP")).unwrap();
        assert_eq!((location.table_index, location.row, location.column), (0, 0, 1));
        assert_eq!(location.header_placeholder(), Some(1));
    }

    #[test]
    fn test_locate_not_found() {
        let doc = doc_with(vec![Table::from_rows(vec![Row::plain(["ID"])])]);
        assert!(matches!(
            locate(&doc, &Marker::new("NADA")),
            Err(ReportError::MarkerNotFound(name)) if name == "NADA"
        ));
    }

    #[test]
    fn test_pass_clears_header_placeholder() {
        let mut doc = doc_with(vec![Table::from_rows(vec![
            Row::plain(["[[REPORTE_LABORATORIO]]", "", ""]),
            Row::plain(["plantilla", "", ""]),
        ])]);
        let mapping = ColumnMapping::new()
            .identifier("id", "ID")
            .at(1, "muestra", None, ColumnKind::Text);
        let pass = TablePass::new("reporte_laboratorio", records(2), mapping);

        let outcome = pass.apply(&mut doc, &TableStyle::default());
        assert!(outcome.is_injected());
        let table = doc.table(0).unwrap();
        assert_eq!(table.cell_text(0, 0).as_deref(), Some("ID"));
        assert_eq!(table.cell_text(0, 1).as_deref(), Some(""));
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_pass_header_placeholder_without_label_is_emptied() {
        let mut doc = doc_with(vec![Table::from_rows(vec![Row::plain(["ID", "{{ TABLA_Y }}"])])]);
        let mapping = ColumnMapping::new().identifier("id", "ID");
        let outcome = TablePass::new("TABLA_Y", records(1), mapping).apply(&mut doc, &TableStyle::default());
        assert!(outcome.is_injected());
        assert_eq!(doc.table(0).unwrap().cell_text(0, 1).as_deref(), Some(""));
    }

    #[test]
    fn test_pass_missing_marker_leaves_document() {
        let mut doc = doc_with(vec![Table::from_rows(vec![Row::plain(["ID"]), Row::plain(["fijo"])])]);
        let before = doc.clone();
        let outcome = TablePass::new("AUSENTE", records(3), id_fecha_mapping())
            .apply(&mut doc, &TableStyle::default());
        assert_eq!(outcome, InjectionOutcome::MarkerNotFound { marker: "AUSENTE".into() });
        assert_eq!(doc, before);
    }

    #[test]
    fn test_ragged_header_gets_label() {
        let mut table = Table::from_rows(vec![
            Row::plain(["ID", "FECHA"]),
            Row::plain(["old-1", "x", "y"]),
        ]);
        let mapping = id_fecha_mapping().text("equipo", "EQUIPO");
        let summary = inject(&mut table, &records(1), &mapping, None, &TableStyle::default()).unwrap();

        assert_eq!(summary.columns_added, 0);
        assert_eq!(summary.headers_rewritten, 1);
        assert!(summary.unreachable_columns.is_empty());
        assert_eq!(header_texts(&table), ["ID", "FECHA", "EQUIPO"]);
        assert_eq!(table.row_count(), 2);
    }

    /// Bundled table whose `push_row` can be told to lose rows.
    struct LossyTable {
        inner: Table,
        drops_rows: bool,
    }

    impl TableModel for LossyTable {
        fn row_count(&self) -> usize {
            self.inner.row_count()
        }

        fn column_count(&self) -> usize {
            self.inner.column_count()
        }

        fn cell_text(&self, row: usize, column: usize) -> Option<String> {
            self.inner.cell_text(row, column)
        }

        fn set_cell_text(&mut self, row: usize, column: usize, text: &str, format: CellFormat) -> bool {
            self.inner.set_cell_text(row, column, text, format)
        }

        fn clear_cell(&mut self, row: usize, column: usize) -> bool {
            self.inner.clear_cell(row, column)
        }

        fn retain_header(&mut self) {
            self.inner.retain_header()
        }

        fn push_row(&mut self) -> usize {
            if self.drops_rows {
                return self.inner.row_count();
            }
            self.inner.push_row()
        }

        fn add_column(&mut self, width: u32) {
            self.inner.add_column(width)
        }
    }

    struct LossyDocument {
        tables: Vec<LossyTable>,
    }

    impl DocumentModel for LossyDocument {
        type Table = LossyTable;

        fn table_count(&self) -> usize {
            self.tables.len()
        }

        fn table(&self, index: usize) -> Option<&LossyTable> {
            self.tables.get(index)
        }

        fn table_mut(&mut self, index: usize) -> Option<&mut LossyTable> {
            self.tables.get_mut(index)
        }
    }

    #[test]
    fn test_failed_pass_does_not_stop_next_table() {
        let mut doc = LossyDocument {
            tables: vec![
                LossyTable {
                    inner: Table::from_rows(vec![Row::plain(["ID", "FECHA"]), Row::plain(["[[TABLA_A]]", ""])]),
                    drops_rows: true,
                },
                LossyTable {
                    inner: Table::from_rows(vec![Row::plain(["ID", "FECHA"]), Row::plain(["[[TABLA_B]]", ""])]),
                    drops_rows: false,
                },
            ],
        };
        let style = TableStyle::default();

        let first = TablePass::new("TABLA_A", records(2), id_fecha_mapping()).apply(&mut doc, &style);
        let second = TablePass::new("TABLA_B", records(2), id_fecha_mapping()).apply(&mut doc, &style);

        match &first {
            InjectionOutcome::Failed { marker, reason } => {
                assert_eq!(marker, "TABLA_A");
                assert!(reason.contains("expected 3"), "{}", reason);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(second.is_injected());
        assert_eq!(doc.tables[1].inner.row_count(), 3);
        assert_eq!(doc.tables[1].inner.cell_text(2, 0).as_deref(), Some("MT-002"));
    }
}
