//! Report Section Definitions
//!
//! Each section module knows its data key, template, how to process raw
//! records into a context and which tables to fill.
//!
//! ## Sections
//! 1. Maintenance events - preventive/corrective work log
//! 2. Incidents - open/closed incidents by severity
//! 3. Risk matrix - scored, classified and ranked risks
//! 4. Budget execution - executed vs. planned per budget line, with total
//! 5. Laboratory report - test results against limits

pub mod s1_maintenance;
pub mod s2_incidents;
pub mod s3_risks;
pub mod s4_budget;
pub mod s5_laboratory;

use rand::rngs::StdRng;
use rustc_hash::FxHashMap;

use crate::context::SectionContext;
use crate::error::ReportResult;
use crate::inject::TablePass;
use crate::period::Period;
use crate::record::{get_str, Record};

pub use s1_maintenance::MaintenanceSection;
pub use s2_incidents::IncidentsSection;
pub use s3_risks::RisksSection;
pub use s4_budget::BudgetSection;
pub use s5_laboratory::LaboratorySection;

/// Context plus the tables to fill once the template is rendered.
#[derive(Debug, Clone, Default)]
pub struct ProcessedSection {
    pub context: SectionContext,
    pub tables: Vec<TablePass>,
}

pub trait Section: Send + Sync {
    /// Data key, also the output file stem.
    fn key(&self) -> &'static str;

    fn title(&self) -> &'static str;

    fn template_name(&self) -> &'static str {
        self.key()
    }

    /// Stand-in records when no real data exists. Must not be empty.
    fn substitute(&self, period: &Period, rng: &mut StdRng) -> Vec<Record>;

    fn process(&self, records: Vec<Record>, period: &Period) -> ReportResult<ProcessedSection>;
}

/// All sections, in report order.
pub fn catalogue() -> Vec<Box<dyn Section>> {
    vec![
        Box::new(MaintenanceSection),
        Box::new(IncidentsSection),
        Box::new(RisksSection),
        Box::new(BudgetSection),
        Box::new(LaboratorySection),
    ]
}

pub fn find(key: &str) -> Option<Box<dyn Section>> {
    catalogue().into_iter().find(|s| s.key() == key)
}

/// Count records per value of `field` (missing values count as "").
pub(crate) fn count_by(records: &[Record], field: &str) -> FxHashMap<String, usize> {
    let mut counts = FxHashMap::default();
    for record in records {
        let value = get_str(record, field).unwrap_or_default().trim().to_lowercase();
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

/// Records whose `field` equals `value`, case-insensitive.
pub(crate) fn filter_eq(records: &[Record], field: &str, value: &str) -> Vec<Record> {
    let wanted = value.trim().to_lowercase();
    records
        .iter()
        .filter(|r| {
            get_str(r, field)
                .map(|v| v.trim().to_lowercase() == wanted)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}
