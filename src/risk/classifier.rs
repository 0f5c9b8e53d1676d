//! Severity scoring and classification of risk records.
//!
//! Score = probability × impact, both on a 1-5 scale. Buckets are fixed:
//!
//! | Score  | Classification |
//! |--------|----------------|
//! | 1-4    | Low            |
//! | 5-8    | Medium         |
//! | 9-12   | High           |
//! | 13-25  | Critical       |

use serde::Serialize;
use serde_json::Value;

use crate::error::{ReportError, ReportResult};
use crate::record::{first_present, get_i64, Record};

pub const MIN_LEVEL: i64 = 1;
pub const MAX_LEVEL: i64 = 5;

/// Accepted spellings of the probability/impact fields in source data.
pub const PROBABILITY_FIELDS: &[&str] = &["probability", "probabilidad"];
pub const IMPACT_FIELDS: &[&str] = &["impact", "impacto"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Classification {
    Low,
    Medium,
    High,
    Critical,
}

impl Classification {
    /// Summary order: most severe first.
    pub const SEVERITY_ORDER: [Classification; 4] = [
        Classification::Critical,
        Classification::High,
        Classification::Medium,
        Classification::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Low => "Low",
            Classification::Medium => "Medium",
            Classification::High => "High",
            Classification::Critical => "Critical",
        }
    }

    /// Label printed in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Low => "Bajo",
            Classification::Medium => "Medio",
            Classification::High => "Alto",
            Classification::Critical => "Crítico",
        }
    }
}

/// Severity score. Inputs are not clamped; callers validate the 1-5 scale
/// (see [`RiskRecord::new`]).
pub fn score(probability: i64, impact: i64) -> i64 {
    probability * impact
}

pub fn classify(score: i64) -> Classification {
    match score {
        s if s <= 4 => Classification::Low,
        5..=8 => Classification::Medium,
        9..=12 => Classification::High,
        _ => Classification::Critical,
    }
}

fn check_level(field: &'static str, value: i64) -> ReportResult<i64> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&value) {
        Ok(value)
    } else {
        Err(ReportError::ScoreOutOfRange { field, value })
    }
}

/// A risk with its derived score and classification.
///
/// The derived values are private and recomputed on every change of
/// probability or impact.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskRecord {
    fields: Record,
    probability: i64,
    impact: i64,
    severity_score: i64,
    classification: Classification,
}

impl RiskRecord {
    /// Fails with `ScoreOutOfRange` when either level is outside 1-5.
    pub fn new(fields: Record, probability: i64, impact: i64) -> ReportResult<Self> {
        let probability = check_level("probability", probability)?;
        let impact = check_level("impact", impact)?;
        let severity_score = score(probability, impact);
        Ok(Self {
            fields,
            probability,
            impact,
            severity_score,
            classification: classify(severity_score),
        })
    }

    /// Read probability and impact out of a loaded record.
    pub fn from_record(record: Record) -> ReportResult<Self> {
        let probability = read_level(&record, PROBABILITY_FIELDS)?;
        let impact = read_level(&record, IMPACT_FIELDS)?;
        Self::new(record, probability, impact)
    }

    pub fn set_probability(&mut self, probability: i64) -> ReportResult<()> {
        self.probability = check_level("probability", probability)?;
        self.recompute();
        Ok(())
    }

    pub fn set_impact(&mut self, impact: i64) -> ReportResult<()> {
        self.impact = check_level("impact", impact)?;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        self.severity_score = score(self.probability, self.impact);
        self.classification = classify(self.severity_score);
    }

    pub fn fields(&self) -> &Record {
        &self.fields
    }

    pub fn probability(&self) -> i64 {
        self.probability
    }

    pub fn impact(&self) -> i64 {
        self.impact
    }

    pub fn severity_score(&self) -> i64 {
        self.severity_score
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Descriptive fields plus the normalised levels and derived values,
    /// ready for a template list or a table pass.
    pub fn to_record(&self) -> Record {
        let mut out = Record::with_capacity(self.fields.len() + 4);
        for (key, value) in &self.fields {
            if PROBABILITY_FIELDS.contains(&key.as_str()) || IMPACT_FIELDS.contains(&key.as_str()) {
                continue;
            }
            out.insert(key.clone(), value.clone());
        }
        out.insert("probabilidad".to_string(), Value::from(self.probability));
        out.insert("impacto".to_string(), Value::from(self.impact));
        out.insert("puntaje".to_string(), Value::from(self.severity_score));
        out.insert(
            "clasificacion".to_string(),
            Value::from(self.classification.label()),
        );
        out
    }
}

fn read_level(record: &Record, aliases: &[&'static str]) -> ReportResult<i64> {
    let field = first_present(record, aliases).unwrap_or(aliases[0]);
    get_i64(record, field).ok_or_else(|| ReportError::InvalidField {
        field: field.to_string(),
        value: record
            .get(field)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "<missing>".to_string()),
    })
}

/// Sort by severity score, highest first. `sort_by` is stable, so equal
/// scores keep their input order.
pub fn rank(mut records: Vec<RiskRecord>) -> Vec<RiskRecord> {
    records.sort_by(|a, b| b.severity_score.cmp(&a.severity_score));
    records
}
