//! Aggregated risk summary by classification.

use serde::Serialize;
use serde_json::Value;

use crate::format::format_percentage;
use crate::record::Record;
use crate::risk::classifier::{Classification, RiskRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationSummaryEntry {
    pub classification: Classification,
    pub count: usize,
    /// Share of all risks, rounded to two decimals.
    pub percentage: f64,
}

impl ClassificationSummaryEntry {
    pub fn to_record(&self) -> Record {
        let mut record = Record::with_capacity(3);
        record.insert(
            "clasificacion".to_string(),
            Value::from(self.classification.label()),
        );
        record.insert("cantidad".to_string(), Value::from(self.count));
        record.insert(
            "porcentaje".to_string(),
            Value::from(format_percentage(self.percentage)),
        );
        record
    }
}

fn round2(value: f64) -> f64 {
    libm::round(value * 100.0) / 100.0
}

/// Counts and percentages per bucket, Critical first, empty buckets
/// omitted. Every record lands in exactly one entry.
pub fn summarize(records: &[RiskRecord]) -> Vec<ClassificationSummaryEntry> {
    let total = records.len();
    if total == 0 {
        return Vec::new();
    }

    Classification::SEVERITY_ORDER
        .iter()
        .filter_map(|&classification| {
            let count = records
                .iter()
                .filter(|r| r.classification() == classification)
                .count();
            (count > 0).then(|| ClassificationSummaryEntry {
                classification,
                count,
                percentage: round2(count as f64 / total as f64 * 100.0),
            })
        })
        .collect()
}

/// 5×5 count grid for the heat matrix: one record per impact level (5 down
/// to 1) with columns `p1`..`p5` holding the number of risks at that
/// probability.
pub fn heat_matrix(records: &[RiskRecord]) -> Vec<Record> {
    let mut grid = [[0usize; 5]; 5];
    for r in records {
        let row = (r.impact() - 1) as usize;
        let col = (r.probability() - 1) as usize;
        grid[row][col] += 1;
    }

    (1..=5usize)
        .rev()
        .map(|impact| {
            let mut record = Record::with_capacity(6);
            record.insert("impacto".to_string(), Value::from(impact));
            for (idx, count) in grid[impact - 1].iter().enumerate() {
                record.insert(format!("p{}", idx + 1), Value::from(*count));
            }
            record
        })
        .collect()
}
