//! S4: Budget Execution
//!
//! Planned vs. executed amounts per budget line, closed by a TOTAL line.
//!
//! Data fields: `rubro`, `presupuestado`, `ejecutado` (numbers or numeric
//! strings). Lines without a usable amount count as zero. A source line
//! already labelled TOTAL is dropped; the total is always recomputed.

use rand::rngs::StdRng;
use rand::Rng;
use serde_json::Value;

use crate::context::SectionContext;
use crate::data::substitute::amount;
use crate::error::ReportResult;
use crate::format::{format_currency, format_percentage};
use crate::inject::{ColumnMapping, TablePass, TotalRow};
use crate::period::Period;
use crate::record::{field_text, get_f64, record_from, Record};
use crate::sections::{ProcessedSection, Section};

pub const MARKER: &str = "EJECUCION_PRESUPUESTAL";

pub const TOTAL_LABEL: &str = "TOTAL";

const BUDGET_LINES: &[&str] = &[
    "Personal operativo",
    "Repuestos y materiales",
    "Servicios públicos",
    "Contratos de soporte",
    "Seguridad industrial",
    "Análisis de laboratorio",
];

pub struct BudgetSection;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Amounts {
    planned: f64,
    executed: f64,
}

impl Amounts {
    /// Executed share of planned, in percent. Zero when nothing was planned.
    fn execution(&self) -> f64 {
        if self.planned > 0.0 {
            self.executed / self.planned * 100.0
        } else {
            0.0
        }
    }

    fn balance(&self) -> f64 {
        self.planned - self.executed
    }

    fn to_record(self, label: &str) -> Record {
        record_from([
            ("rubro", Value::from(label)),
            ("presupuestado", Value::from(format_currency(self.planned))),
            ("ejecutado", Value::from(format_currency(self.executed))),
            ("porcentaje_ejecucion", Value::from(format_percentage(self.execution()))),
            ("saldo", Value::from(format_currency(self.balance()))),
        ])
    }
}

impl BudgetSection {
    fn is_total_line(record: &Record) -> bool {
        field_text(record, "rubro").trim().eq_ignore_ascii_case(TOTAL_LABEL)
    }

    fn mapping() -> ColumnMapping {
        ColumnMapping::new()
            .text("rubro", "RUBRO")
            .numeric("presupuestado", "PRESUPUESTADO")
            .numeric("ejecutado", "EJECUTADO")
            .numeric("porcentaje_ejecucion", "% EJECUCIÓN")
            .numeric("saldo", "SALDO")
    }
}

impl Section for BudgetSection {
    fn key(&self) -> &'static str {
        "presupuesto"
    }

    fn title(&self) -> &'static str {
        "Ejecución presupuestal"
    }

    fn substitute(&self, _period: &Period, rng: &mut StdRng) -> Vec<Record> {
        BUDGET_LINES
            .iter()
            .map(|line| {
                let planned = amount(rng, 5_000_000.0, 80_000_000.0);
                let executed = (planned * rng.gen_range(0.55..1.1)).round();
                record_from([
                    ("rubro", Value::from(*line)),
                    ("presupuestado", Value::from(planned)),
                    ("ejecutado", Value::from(executed)),
                ])
            })
            .collect()
    }

    fn process(&self, records: Vec<Record>, _period: &Period) -> ReportResult<ProcessedSection> {
        let mut total = Amounts::default();
        let mut rows = Vec::with_capacity(records.len() + 1);
        let mut overrun = Vec::new();

        for record in records.iter().filter(|r| !Self::is_total_line(r)) {
            let line = Amounts {
                planned: get_f64(record, "presupuestado").unwrap_or(0.0),
                executed: get_f64(record, "ejecutado").unwrap_or(0.0),
            };
            total.planned += line.planned;
            total.executed += line.executed;

            let row = line.to_record(&field_text(record, "rubro"));
            if line.executed > line.planned {
                overrun.push(row.clone());
            }
            rows.push(row);
        }

        let mut context = SectionContext::new();
        context.insert("valor_presupuestado", format_currency(total.planned));
        context.insert("valor_ejecutado", format_currency(total.executed));
        context.insert("saldo_total", format_currency(total.balance()));
        context.insert("porcentaje_ejecucion_global", format_percentage(total.execution()));
        context.insert_list("lineas_sobreejecutadas", overrun);
        context.insert_list("lineas_presupuesto", rows.clone());

        if !rows.is_empty() {
            rows.push(total.to_record(TOTAL_LABEL));
        }

        Ok(ProcessedSection {
            context,
            tables: vec![TablePass::new(MARKER, rows, Self::mapping())
                .with_total_row(TotalRow::new(TOTAL_LABEL).on_field("rubro"))],
        })
    }
}
