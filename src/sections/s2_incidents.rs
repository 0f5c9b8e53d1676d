//! S2: Incidents
//!
//! Service incidents reported in the period, with severity and resolution.
//!
//! Data fields: `id`, `fecha`, `severidad` (Alta/Media/Baja), `descripcion`,
//! `estado` (Abierto/Cerrado), `tiempo_resolucion_h`.

use rand::rngs::StdRng;
use rand::Rng;
use serde_json::Value;

use crate::context::SectionContext;
use crate::data::substitute::{date_in_period, pick, record_id};
use crate::error::ReportResult;
use crate::format::{format_date, format_number};
use crate::inject::{ColumnMapping, TablePass};
use crate::period::Period;
use crate::record::{field_text, get_f64, get_str, record_from, Record};
use crate::sections::{count_by, filter_eq, ProcessedSection, Section};

pub const MARKER: &str = "TABLA_INCIDENTES";

const SEVERITIES: [&str; 3] = ["Alta", "Media", "Baja"];

const DESCRIPTIONS: &[&str] = &[
    "Corte de energía en subestación",
    "Falla de comunicación con SCADA",
    "Fuga en red de agua helada",
    "Alarma de incendio falsa",
    "Daño en puerta de acceso",
    "Caída del servidor de control",
];

pub struct IncidentsSection;

fn severity_rank(record: &Record) -> usize {
    let severity = get_str(record, "severidad").unwrap_or_default().trim().to_lowercase();
    SEVERITIES
        .iter()
        .position(|s| s.to_lowercase() == severity)
        .unwrap_or(SEVERITIES.len())
}

impl Section for IncidentsSection {
    fn key(&self) -> &'static str {
        "incidentes"
    }

    fn title(&self) -> &'static str {
        "Incidentes del servicio"
    }

    fn substitute(&self, period: &Period, rng: &mut StdRng) -> Vec<Record> {
        let count = rng.gen_range(3..=8);
        (1..=count)
            .map(|n| {
                let closed = rng.gen_bool(0.75);
                let hours = if closed {
                    Value::from(rng.gen_range(1..=72))
                } else {
                    Value::Null
                };
                record_from([
                    ("id", Value::from(record_id("IN", period, n))),
                    ("fecha", Value::from(date_in_period(rng, period))),
                    ("severidad", Value::from(pick(rng, &SEVERITIES))),
                    ("descripcion", Value::from(pick(rng, DESCRIPTIONS))),
                    ("estado", Value::from(if closed { "Cerrado" } else { "Abierto" })),
                    ("tiempo_resolucion_h", hours),
                ])
            })
            .collect()
    }

    fn process(&self, mut records: Vec<Record>, _period: &Period) -> ReportResult<ProcessedSection> {
        // most severe first, then by date
        records.sort_by(|a, b| {
            severity_rank(a).cmp(&severity_rank(b)).then_with(|| {
                get_str(a, "fecha")
                    .unwrap_or_default()
                    .cmp(get_str(b, "fecha").unwrap_or_default())
            })
        });

        let resolution: Vec<f64> = records
            .iter()
            .filter_map(|r| get_f64(r, "tiempo_resolucion_h"))
            .collect();
        let mean_resolution = if resolution.is_empty() {
            0.0
        } else {
            resolution.iter().sum::<f64>() / resolution.len() as f64
        };

        let rows: Vec<Record> = records
            .iter()
            .map(|r| {
                let mut row = r.clone();
                row.insert("fecha".to_string(), Value::from(format_date(&field_text(r, "fecha"))));
                row
            })
            .collect();

        let by_severity = count_by(&rows, "severidad");
        let mut context = SectionContext::new();
        for severity in SEVERITIES {
            let count = by_severity.get(&severity.to_lowercase()).copied().unwrap_or(0);
            context.insert(format!("incidentes_severidad_{}", severity.to_lowercase()), count);
        }
        context.insert("tiempo_promedio_resolucion", format_number(mean_resolution, 1));
        context.insert_list("incidentes_abiertos", filter_eq(&rows, "estado", "Abierto"));
        context.insert_list("incidentes_cerrados", filter_eq(&rows, "estado", "Cerrado"));
        context.insert_list("incidentes", rows.clone());

        let mapping = ColumnMapping::new()
            .identifier("id", "ID")
            .identifier("fecha", "FECHA")
            .text("severidad", "SEVERIDAD")
            .text("descripcion", "DESCRIPCIÓN")
            .text("estado", "ESTADO")
            .numeric("tiempo_resolucion_h", "HORAS");

        Ok(ProcessedSection {
            context,
            tables: vec![TablePass::new(MARKER, rows, mapping)],
        })
    }
}
