//! S1: Maintenance Events
//!
//! Work orders executed or scheduled in the period.
//!
//! Data fields: `id`, `fecha` (ISO date), `equipo`, `tipo`
//! (Preventivo/Correctivo), `descripcion`, `responsable`, `estado`, `horas`.

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
use crate::sections::{filter_eq, ProcessedSection, Section};

pub const MARKER: &str = "TABLA_MANTENIMIENTOS";

const EQUIPMENT: &[&str] = &[
    "Bomba centrífuga B-01",
    "Tablero eléctrico TG-2",
    "Planta de emergencia",
    "Compresor de aire C-3",
    "Sistema de aire acondicionado",
    "Ascensor principal",
];

const PREVENTIVE_TASKS: &[&str] = &[
    "Inspección y lubricación general",
    "Cambio de filtros",
    "Revisión de conexiones y ajuste de borneras",
    "Prueba de funcionamiento bajo carga",
];

const CORRECTIVE_TASKS: &[&str] = &[
    "Reemplazo de rodamiento",
    "Cambio de contactor averiado",
    "Reparación de fuga",
    "Sustitución de sensor de temperatura",
];

pub struct MaintenanceSection;

impl MaintenanceSection {
    fn mapping() -> ColumnMapping {
        ColumnMapping::new()
            .identifier("id", "ID")
            .identifier("fecha", "FECHA")
            .text("equipo", "EQUIPO")
            .text("tipo", "TIPO")
            .text("descripcion", "DESCRIPCIÓN")
            .text("responsable", "RESPONSABLE")
            .numeric("horas", "HORAS")
            .text("estado", "ESTADO")
    }
}

impl Section for MaintenanceSection {
    fn key(&self) -> &'static str {
        "mantenimientos"
    }

    fn title(&self) -> &'static str {
        "Mantenimientos ejecutados"
    }

    fn substitute(&self, period: &Period, rng: &mut StdRng) -> Vec<Record> {
        let count = rng.gen_range(6..=12);
        (1..=count)
            .map(|n| {
                let preventive = rng.gen_bool(0.7);
                let task = if preventive {
                    pick(rng, PREVENTIVE_TASKS)
                } else {
                    pick(rng, CORRECTIVE_TASKS)
                };
                record_from([
                    ("id", Value::from(record_id("MT", period, n))),
                    ("fecha", Value::from(date_in_period(rng, period))),
                    ("equipo", Value::from(pick(rng, EQUIPMENT))),
                    ("tipo", Value::from(if preventive { "Preventivo" } else { "Correctivo" })),
                    ("descripcion", Value::from(task)),
                    ("responsable", Value::from(pick(rng, &["Técnico A", "Técnico B", "Contratista"]))),
                    ("horas", Value::from(rng.gen_range(1..=8))),
                    ("estado", Value::from(pick(rng, &["Ejecutado", "Ejecutado", "Ejecutado", "Pendiente"]))),
                ])
            })
            .collect()
    }

    fn process(&self, mut records: Vec<Record>, _period: &Period) -> ReportResult<ProcessedSection> {
        records.sort_by(|a, b| {
            get_str(a, "fecha")
                .unwrap_or_default()
                .cmp(get_str(b, "fecha").unwrap_or_default())
        });

        let rows: Vec<Record> = records
            .iter()
            .map(|r| {
                let mut row = r.clone();
                row.insert("fecha".to_string(), Value::from(format_date(&field_text(r, "fecha"))));
                row
            })
            .collect();

        let preventive = filter_eq(&rows, "tipo", "Preventivo");
        let corrective = filter_eq(&rows, "tipo", "Correctivo");
        let pending = filter_eq(&rows, "estado", "Pendiente");
        let hours: f64 = records.iter().filter_map(|r| get_f64(r, "horas")).sum();
        let preventive_share = if rows.is_empty() {
            0.0
        } else {
            preventive.len() as f64 / rows.len() as f64 * 100.0
        };

        let mut context = SectionContext::new();
        context.insert("horas_totales", format_number(hours, 1));
        context.insert("porcentaje_preventivo", format_percentage(preventive_share));
        context.insert_list("mantenimientos_preventivos", preventive);
        context.insert_list("mantenimientos_correctivos", corrective);
        context.insert_list("mantenimientos_pendientes", pending);
        context.insert_list("mantenimientos", rows.clone());

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

    fn event(id: &str, fecha: &str, tipo: &str, estado: &str, horas: i64) -> Record {
        record_from([
            ("id", Value::from(id)),
            ("fecha", Value::from(fecha)),
            ("tipo", Value::from(tipo)),
            ("estado", Value::from(estado)),
            ("horas", Value::from(horas)),
        ])
    }

    #[test]
    fn test_process_sorts_and_counts() {
        let period = Period::new(2026, 10).unwrap();
        let records = vec![
            event("MT-3", "2026-10-20", "Correctivo", "Pendiente", 3),
            event("MT-1", "2026-10-02", "Preventivo", "Ejecutado", 2),
            event("MT-2", "2026-10-11", "Preventivo", "Ejecutado", 4),
        ];
        let processed = MaintenanceSection.process(records, &period).unwrap();
        let ctx = &processed.context;

        assert_eq!(ctx.get("total_mantenimientos"), Some(&ContextValue::Integer(3)));
        assert_eq!(ctx.get("total_mantenimientos_preventivos"), Some(&ContextValue::Integer(2)));
        assert_eq!(ctx.get("total_mantenimientos_pendientes"), Some(&ContextValue::Integer(1)));
        assert_eq!(ctx.display("horas_totales").as_deref(), Some("9,0"));
        assert_eq!(ctx.display("porcentaje_preventivo").as_deref(), Some("66,67 %"));

        let table = &processed.tables[0];
        assert_eq!(table.marker.name(), MARKER);
        let ids: Vec<String> = table.records.iter().map(|r| field_text(r, "id")).collect();
        assert_eq!(ids, ["MT-1", "MT-2", "MT-3"]);
        assert_eq!(field_text(&table.records[0], "fecha"), "02/10/2026");
    }

    #[test]
    fn test_substitute_is_well_formed() {
        let period = Period::new(2026, 10).unwrap();
        let mut rng = crate::data::seeded_rng("mantenimientos", &period);
        let records = MaintenanceSection.substitute(&period, &mut rng);
        assert!((6..=12).contains(&records.len()));
        for r in &records {
            assert!(field_text(r, "fecha").starts_with("2026-10-"));
            assert!(["Preventivo", "Correctivo"].contains(&field_text(r, "tipo").as_str()));
        }
    }
}
