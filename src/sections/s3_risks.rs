//! S3: Risk Matrix
//!
//! Scores, classifies and ranks the contract risks, then summarizes them by
//! classification.
//!
//! Data fields: `id`, `descripcion`, `probabilidad` (or `probability`),
//! `impacto` (or `impact`), `responsable`, `tratamiento`.
//!
//! Tables:
//! - `MATRIZ_RIESGOS`: ranked risks, highest score first
//! - `RESUMEN_RIESGOS`: one line per classification plus a bold TOTAL line
//!
//! A risk with probability or impact outside 1-5 fails the whole section.

use rand::rngs::StdRng;
use rand::Rng;
use serde_json::Value;

use crate::context::SectionContext;
use crate::data::substitute::{pick, record_id};
use crate::error::ReportResult;
use crate::format::format_percentage;
use crate::inject::{ColumnMapping, TablePass, TotalRow};
use crate::period::Period;
use crate::record::{record_from, Record};
use crate::risk::{heat_matrix, rank, summarize, Classification, RiskRecord};
use crate::sections::{ProcessedSection, Section};

pub const MATRIX_MARKER: &str = "MATRIZ_RIESGOS";
pub const SUMMARY_MARKER: &str = "RESUMEN_RIESGOS";

pub const TOTAL_LABEL: &str = "TOTAL";

const RISKS: &[&str] = &[
    "Retraso en entrega de repuestos importados",
    "Falla prolongada del suministro eléctrico",
    "Accidente de trabajo en altura",
    "Rotación del personal técnico",
    "Sobrecosto por variación de la tasa de cambio",
    "Incumplimiento de parámetros de vertimiento",
    "Pérdida de información del sistema de control",
    "Obsolescencia de equipos críticos",
];

const TREATMENTS: &[&str] = &[
    "Mantener inventario mínimo",
    "Plan de contingencia documentado",
    "Capacitación y permisos de trabajo",
    "Seguimiento mensual",
    "Póliza de cumplimiento",
];

pub struct RisksSection;

impl RisksSection {
    fn matrix_mapping() -> ColumnMapping {
        ColumnMapping::new()
            .identifier("id", "ID")
            .text("descripcion", "RIESGO")
            .numeric("probabilidad", "PROBABILIDAD")
            .numeric("impacto", "IMPACTO")
            .numeric("puntaje", "PUNTAJE")
            .text("clasificacion", "CLASIFICACIÓN")
            .text("responsable", "RESPONSABLE")
    }

    fn summary_mapping() -> ColumnMapping {
        ColumnMapping::new()
            .text("clasificacion", "CLASIFICACIÓN")
            .numeric("cantidad", "CANTIDAD")
            .numeric("porcentaje", "PORCENTAJE")
    }
}

/// Context list holding the risks of one classification.
fn bucket_key(classification: Classification) -> &'static str {
    match classification {
        Classification::Critical => "riesgos_criticos",
        Classification::High => "riesgos_altos",
        Classification::Medium => "riesgos_medios",
        Classification::Low => "riesgos_bajos",
    }
}

impl Section for RisksSection {
    fn key(&self) -> &'static str {
        "riesgos"
    }

    fn title(&self) -> &'static str {
        "Matriz de riesgos"
    }

    fn substitute(&self, period: &Period, rng: &mut StdRng) -> Vec<Record> {
        let count = rng.gen_range(5..=10);
        (1..=count)
            .map(|n| {
                record_from([
                    ("id", Value::from(record_id("RG", period, n))),
                    ("descripcion", Value::from(pick(rng, RISKS))),
                    ("probabilidad", Value::from(rng.gen_range(1..=5))),
                    ("impacto", Value::from(rng.gen_range(1..=5))),
                    ("responsable", Value::from(pick(rng, &["Coordinador", "Interventoría", "Contratista"]))),
                    ("tratamiento", Value::from(pick(rng, TREATMENTS))),
                ])
            })
            .collect()
    }

    fn process(&self, records: Vec<Record>, _period: &Period) -> ReportResult<ProcessedSection> {
        let risks = records
            .into_iter()
            .map(RiskRecord::from_record)
            .collect::<ReportResult<Vec<_>>>()?;

        let summary = summarize(&risks);
        let matrix = heat_matrix(&risks);
        let ranked = rank(risks);
        let total = ranked.len();

        let mut context = SectionContext::new();
        for classification in Classification::SEVERITY_ORDER {
            let bucket: Vec<Record> = ranked
                .iter()
                .filter(|r| r.classification() == classification)
                .map(RiskRecord::to_record)
                .collect();
            context.insert_list(bucket_key(classification), bucket);
        }
        if let Some(top) = ranked.first() {
            context.insert("puntaje_maximo", top.severity_score());
        }

        let ranked_rows: Vec<Record> = ranked.iter().map(RiskRecord::to_record).collect();
        let mut summary_rows: Vec<Record> = summary.iter().map(|e| e.to_record()).collect();
        context.insert_list("resumen_riesgos", summary_rows.clone());
        context.insert_list("matriz_calor", matrix);
        context.insert_list("riesgos", ranked_rows.clone());

        if total > 0 {
            summary_rows.push(record_from([
                ("clasificacion", Value::from(TOTAL_LABEL)),
                ("cantidad", Value::from(total)),
                ("porcentaje", Value::from(format_percentage(100.0))),
            ]));
        }

        Ok(ProcessedSection {
            context,
            tables: vec![
                TablePass::new(MATRIX_MARKER, ranked_rows, Self::matrix_mapping()),
                TablePass::new(SUMMARY_MARKER, summary_rows, Self::summary_mapping())
                    .with_total_row(TotalRow::new(TOTAL_LABEL)),
            ],
        })
    }
}
