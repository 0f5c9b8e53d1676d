//! Report Integration Tests
//!
//! Runs the full pipeline (data → processing → template → injection → file)
//! against the templates shipped in `templates/`.

use std::fs;
use std::path::{Path, PathBuf};

use status_report_rust::document::TableModel;
use status_report_rust::{
    Document, EmptySource, FileDataSource, OutputFormat, Period, ReportConfig, ReportRun,
    SectionOutcome,
};

fn template_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}

fn config(root: &Path) -> ReportConfig {
    ReportConfig::new(
        root.join("data"),
        template_dir(),
        root.join("out"),
        Period::new(2026, 10).unwrap(),
    )
}

fn read_document(path: &Path) -> Document {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn generated(outcome: &SectionOutcome) -> &status_report_rust::SectionReport {
    match outcome {
        SectionOutcome::Generated(report) => report,
        SectionOutcome::Failed { section_key, error } => {
            panic!("section {} failed: {}", section_key, error)
        }
    }
}

#[test]
fn test_all_sections_from_substitute_data() {
    let root = tempfile::tempdir().unwrap();
    let run = ReportRun::new(config(root.path()), Box::new(EmptySource));
    let outcomes = run.run_keys(&[]).unwrap();
    assert_eq!(outcomes.len(), 5);

    for outcome in &outcomes {
        let report = generated(outcome);
        assert!(report.substituted, "{} should use substitute data", report.section_key);
        assert_eq!(
            report.injected_tables(),
            report.outcomes.len(),
            "{}: every marker should be found",
            report.section_key
        );
        assert!(report.path.starts_with(root.path().join("out").join("2026-10")));
        assert!(report.path.is_file());
    }

    let total_tables: usize = outcomes.iter().map(|o| generated(o).outcomes.len()).sum();
    assert_eq!(total_tables, 6);
}

#[test]
fn test_rendered_text_has_no_leftover_variables() {
    let root = tempfile::tempdir().unwrap();
    let run = ReportRun::new(config(root.path()), Box::new(EmptySource));
    let outcomes = run.run_keys(&["laboratorio".to_string()]).unwrap();
    let document = read_document(&generated(&outcomes[0]).path);

    assert_eq!(document.title, "Reporte de laboratorio - octubre 2026");
    let json = serde_json::to_string(&document).unwrap();
    assert!(!json.contains("{{"), "unrendered placeholder in {}", json);
    assert!(!json.contains("{%"), "unrendered directive in {}", json);
}

#[test]
fn test_risks_from_csv_file() {
    let root = tempfile::tempdir().unwrap();
    let period_dir = root.path().join("data").join("2026-10");
    fs::create_dir_all(&period_dir).unwrap();
    fs::write(
        period_dir.join("riesgos.csv"),
        "id,descripcion,probabilidad,impacto,responsable\n\
         R-1,Retraso de repuestos,3,5,Coordinador\n\
         R-2,Rotación de personal,1,1,Contratista\n\
         R-3,Falla eléctrica,4,3,Interventoría\n",
    )
    .unwrap();

    let config = config(root.path());
    let source = FileDataSource::new(config.data_dir());
    let run = ReportRun::new(config, Box::new(source));
    let outcomes = run.run_keys(&["riesgos".to_string()]).unwrap();
    let report = generated(&outcomes[0]);
    assert!(!report.substituted);

    let document = read_document(&report.path);
    let tables: Vec<_> = document.tables().collect();
    assert_eq!(tables.len(), 2);

    let matrix = tables[0];
    assert_eq!(matrix.row_count(), 4);
    let ids: Vec<String> = (1..4).filter_map(|r| matrix.cell_text(r, 0)).collect();
    assert_eq!(ids, ["R-1", "R-3", "R-2"]);
    assert_eq!(matrix.cell_text(1, 5).as_deref(), Some("Crítico"));
    // the placeholder column header is reconciled to the mapping label
    assert_eq!(matrix.cell_text(0, 6).as_deref(), Some("RESPONSABLE"));

    let summary = tables[1];
    let labels: Vec<String> = (1..summary.row_count())
        .filter_map(|r| summary.cell_text(r, 0))
        .collect();
    assert_eq!(labels, ["Crítico", "Alto", "Bajo", "TOTAL"]);
    assert_eq!(summary.cell_text(1, 2).as_deref(), Some("33,33 %"));
    let total_run = &summary.rows[4].cells[0].paragraphs[0].runs[0];
    assert!(total_run.style.bold);
}

#[test]
fn test_invalid_risk_data_fails_only_that_section() {
    let root = tempfile::tempdir().unwrap();
    let data_dir = root.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(
        data_dir.join("riesgos.json"),
        r#"[{"id": "R-1", "probabilidad": 7, "impacto": 2}]"#,
    )
    .unwrap();

    let config = config(root.path());
    let source = FileDataSource::new(config.data_dir());
    let run = ReportRun::new(config, Box::new(source));
    let outcomes = run
        .run_keys(&["riesgos".to_string(), "presupuesto".to_string()])
        .unwrap();

    assert!(matches!(
        &outcomes[0],
        SectionOutcome::Failed { section_key, .. } if section_key == "riesgos"
    ));
    assert!(outcomes[1].is_generated());
}

#[test]
fn test_budget_markdown_output() {
    let root = tempfile::tempdir().unwrap();
    let config = config(root.path()).with_output_format(OutputFormat::Markdown);
    let run = ReportRun::new(config, Box::new(EmptySource));
    let outcomes = run.run_keys(&["presupuesto".to_string()]).unwrap();
    let report = generated(&outcomes[0]);

    assert!(report.path.ends_with("2026-10/presupuesto.md"));
    let markdown = fs::read_to_string(&report.path).unwrap();
    assert!(markdown.starts_with("# Ejecución presupuestal - octubre 2026"));
    assert!(markdown.contains("| **RUBRO** |"));
    assert!(markdown.contains("| **TOTAL** |"));
    assert!(!markdown.contains("EJECUCION_PRESUPUESTAL"));
}

#[test]
fn test_substitute_output_is_deterministic() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    let read_incidents = |root: &Path| {
        let run = ReportRun::new(config(root), Box::new(EmptySource));
        let outcomes = run.run_keys(&["incidentes".to_string()]).unwrap();
        let document = read_document(&generated(&outcomes[0]).path);
        serde_json::to_string(&document).unwrap()
    };

    assert_eq!(read_incidents(first.path()), read_incidents(second.path()));
}
