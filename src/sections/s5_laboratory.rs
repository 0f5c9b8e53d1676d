//! S5: Laboratory Report
//!
//! Sample results checked against their permitted limits.
//!
//! Data fields: `id`, `fecha`, `muestra`, `parametro`, `resultado`, `limite`,
//! `unidad`. A result conforms when it does not exceed the limit; a missing
//! limit means there is nothing to check against and the result conforms.

use rand::rngs::StdRng;
use rand::Rng;
use serde_json::Value;

use crate::context::SectionContext;
use crate::data::substitute::{date_in_period, pick, record_id};
use crate::error::ReportResult;
use crate::format::{format_date, format_number, format_percentage};
use crate::inject::{ColumnMapping, TablePass};
use crate::period::Period;
use crate::record::{field_text, get_f64, get_str, record_from, Record};
use crate::sections::{ProcessedSection, Section};

pub const MARKER: &str = "REPORTE_LABORATORIO";

pub const CONFORMING: &str = "Cumple";
pub const NON_CONFORMING: &str = "No cumple";

/// (parameter, unit, limit)
const PARAMETERS: &[(&str, &str, f64)] = &[
    ("pH", "unidades", 9.0),
    ("DBO5", "mg/L", 90.0),
    ("Sólidos suspendidos", "mg/L", 100.0),
    ("Grasas y aceites", "mg/L", 15.0),
    ("Coliformes totales", "NMP/100 mL", 1000.0),
];

const SAMPLE_POINTS: &[&str] = &["Entrada PTAR", "Salida PTAR", "Tanque de almacenamiento"];

pub struct LaboratorySection;

fn conforms(record: &Record) -> bool {
    match (get_f64(record, "resultado"), get_f64(record, "limite")) {
        (Some(result), Some(limit)) => result <= limit,
        _ => true,
    }
}

impl LaboratorySection {
    fn mapping() -> ColumnMapping {
        ColumnMapping::new()
            .identifier("id", "ID")
            .identifier("fecha", "FECHA")
            .text("muestra", "MUESTRA")
            .text("parametro", "PARÁMETRO")
            .numeric("resultado", "RESULTADO")
            .numeric("limite", "LÍMITE")
            .text("unidad", "UNIDAD")
            .text("cumple", "CUMPLE")
    }
}

impl Section for LaboratorySection {
    fn key(&self) -> &'static str {
        "laboratorio"
    }

    fn title(&self) -> &'static str {
        "Reporte de laboratorio"
    }

    fn substitute(&self, period: &Period, rng: &mut StdRng) -> Vec<Record> {
        let date = date_in_period(rng, period);
        let sample = pick(rng, SAMPLE_POINTS);
        PARAMETERS
            .iter()
            .enumerate()
            .map(|(idx, &(parameter, unit, limit))| {
                // mostly within limit, occasionally slightly above
                let result = limit * rng.gen_range(0.3..1.1);
                record_from([
                    ("id", Value::from(record_id("LB", period, idx + 1))),
                    ("fecha", Value::from(date.clone())),
                    ("muestra", Value::from(sample)),
                    ("parametro", Value::from(parameter)),
                    ("resultado", Value::from((result * 100.0).round() / 100.0)),
                    ("limite", Value::from(limit)),
                    ("unidad", Value::from(unit)),
                ])
            })
            .collect()
    }

    fn process(&self, records: Vec<Record>, _period: &Period) -> ReportResult<ProcessedSection> {
        let rows: Vec<Record> = records
            .iter()
            .map(|r| {
                let mut row = r.clone();
                row.insert("fecha".to_string(), Value::from(format_date(&field_text(r, "fecha"))));
                if let Some(result) = get_f64(r, "resultado") {
                    row.insert("resultado".to_string(), Value::from(format_number(result, 2)));
                }
                if let Some(limit) = get_f64(r, "limite") {
                    row.insert("limite".to_string(), Value::from(format_number(limit, 2)));
                }
                let flag = if conforms(r) { CONFORMING } else { NON_CONFORMING };
                row.insert("cumple".to_string(), Value::from(flag));
                row
            })
            .collect();

        let non_conforming: Vec<Record> = rows
            .iter()
            .filter(|r| get_str(r, "cumple") == Some(NON_CONFORMING))
            .cloned()
            .collect();
        let compliance = if rows.is_empty() {
            100.0
        } else {
            (rows.len() - non_conforming.len()) as f64 / rows.len() as f64 * 100.0
        };

        let mut context = SectionContext::new();
        context.insert("porcentaje_cumplimiento", format_percentage(compliance));
        context.insert_list("no_conformidades", non_conforming);
        context.insert_list("resultados_laboratorio", rows.clone());

        Ok(ProcessedSection {
            context,
            tables: vec![TablePass::new(MARKER, rows, Self::mapping())],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextValue;
    use serde_json::json;

    fn result(id: &str, resultado: Value, limite: Value) -> Record {
        record_from([
            ("id", json!(id)),
            ("fecha", json!("2026-10-14")),
            ("parametro", json!("DBO5")),
            ("resultado", resultado),
            ("limite", limite),
        ])
    }

    #[test]
    fn test_conformity_flags() {
        let period = Period::new(2026, 10).unwrap();
        let processed = LaboratorySection
            .process(
                vec![
                    result("LB-1", json!(45.5), json!(90)),
                    result("LB-2", json!(120), json!(90)),
                    result("LB-3", json!(90), json!("90")),
                    result("LB-4", json!("n.d."), Value::Null),
                ],
                &period,
            )
            .unwrap();

        let flags: Vec<String> = processed.tables[0]
            .records
            .iter()
            .map(|r| field_text(r, "cumple"))
            .collect();
        assert_eq!(flags, ["Cumple", "No cumple", "Cumple", "Cumple"]);

        let first = &processed.tables[0].records[0];
        assert_eq!(field_text(first, "resultado"), "45,50");
        assert_eq!(field_text(first, "fecha"), "14/10/2026");
        assert_eq!(field_text(&processed.tables[0].records[3], "resultado"), "n.d.");

        let ctx = &processed.context;
        assert_eq!(ctx.get("total_no_conformidades"), Some(&ContextValue::Integer(1)));
        assert_eq!(ctx.get("hay_no_conformidades"), Some(&ContextValue::Bool(true)));
        assert_eq!(ctx.display("porcentaje_cumplimiento").as_deref(), Some("75,00 %"));
    }

    #[test]
    fn test_substitute_one_row_per_parameter() {
        let period = Period::new(2026, 10).unwrap();
        let mut rng = crate::data::seeded_rng("laboratorio", &period);
        let records = LaboratorySection.substitute(&period, &mut rng);
        assert_eq!(records.len(), PARAMETERS.len());
        assert!(records.iter().all(|r| field_text(r, "fecha") == field_text(&records[0], "fecha")));
    }
}
