//! Data sources for report sections.
//!
//! A [`DataSource`] may fail with `DataUnavailable`; sections never see that
//! failure. [`load_or_substitute`] turns every load into a [`SourceData`],
//! either the real records or a deterministic substitute dataset.

pub mod csv_source;
pub mod json_source;
pub mod substitute;

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::error::{ReportError, ReportResult};
use crate::period::Period;
use crate::record::Record;

pub use csv_source::read_csv_records;
pub use json_source::read_json_records;
pub use substitute::seeded_rng;

pub trait DataSource: Send + Sync {
    fn load(&self, section_key: &str, period: &Period) -> ReportResult<Vec<Record>>;
}

/// Records for one section, tagged with where they came from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceData {
    Loaded(Vec<Record>),
    Substituted { records: Vec<Record>, reason: String },
}

impl SourceData {
    pub fn records(&self) -> &[Record] {
        match self {
            SourceData::Loaded(records) | SourceData::Substituted { records, .. } => records,
        }
    }

    pub fn into_records(self) -> Vec<Record> {
        match self {
            SourceData::Loaded(records) | SourceData::Substituted { records, .. } => records,
        }
    }

    pub fn is_substituted(&self) -> bool {
        matches!(self, SourceData::Substituted { .. })
    }
}

/// Load real data, falling back to `substitute` when the source fails or
/// returns nothing. The substitute generator receives an RNG seeded from the
/// section key and period, so fallback data is identical between runs.
pub fn load_or_substitute<F>(
    source: &dyn DataSource,
    section_key: &str,
    period: &Period,
    substitute: F,
) -> SourceData
where
    F: FnOnce(&mut StdRng) -> Vec<Record>,
{
    let reason = match source.load(section_key, period) {
        Ok(records) if !records.is_empty() => {
            info!("Loaded {} record(s) for section '{}'", records.len(), section_key);
            return SourceData::Loaded(records);
        }
        Ok(_) => format!("source returned no records for {}", period),
        Err(e) => e.to_string(),
    };

    let mut rng = seeded_rng(section_key, period);
    let records = substitute(&mut rng);
    warn!(
        "Using substitute data for section '{}' ({} records): {}",
        section_key,
        records.len(),
        reason
    );
    SourceData::Substituted { records, reason }
}

/// Files under a data directory. For section `riesgos` and period
/// `2026-10` the candidates are, in order: `2026-10/riesgos.csv`,
/// `2026-10/riesgos.json`, `riesgos.csv`, `riesgos.json`.
#[derive(Debug, Clone)]
pub struct FileDataSource {
    dir: PathBuf,
}

impl FileDataSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn candidates(&self, section_key: &str, period: &Period) -> Vec<PathBuf> {
        let period_dir = self.dir.join(period.to_string());
        [period_dir.as_path(), self.dir.as_path()]
            .iter()
            .flat_map(|dir| {
                ["csv", "json"]
                    .iter()
                    .map(move |ext| dir.join(format!("{}.{}", section_key, ext)))
            })
            .collect()
    }

    fn read(path: &Path) -> ReportResult<Vec<Record>> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => read_csv_records(path),
            _ => read_json_records(path),
        }
    }
}

impl DataSource for FileDataSource {
    fn load(&self, section_key: &str, period: &Period) -> ReportResult<Vec<Record>> {
        let candidates = self.candidates(section_key, period);
        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => Self::read(path),
            None => Err(ReportError::DataUnavailable {
                section: section_key.to_string(),
                reason: format!("no data file under {}", self.dir.display()),
            }),
        }
    }
}

/// A source with no data at all; every section runs on substitute data.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySource;

impl DataSource for EmptySource {
    fn load(&self, section_key: &str, _period: &Period) -> ReportResult<Vec<Record>> {
        Err(ReportError::DataUnavailable {
            section: section_key.to_string(),
            reason: "no data source configured".to_string(),
        })
    }
}
