//! Monthly Status Report Builder
//!
//! Pours structured records (maintenance events, incidents, risks, budget
//! lines, laboratory results) into fixed-layout document templates.
//!
//! - `data/`: CSV/JSON sources and deterministic substitute datasets
//! - `risk/`: severity scoring, classification, ranking and summary
//! - `context`: template variables with `total_`/`hay_` companions
//! - `document/`: document model, placeholder rendering, persistence
//! - `inject/`: marker-based table injection
//! - `sections/`: the five report sections (S1-S5)
//! - `generator`: per-section pipeline as a typestate machine
//! - `report`: parallel generation of many sections

pub mod config;
pub mod context;
pub mod data;
pub mod document;
pub mod error;
pub mod format;
pub mod generator;
pub mod inject;
pub mod period;
pub mod record;
pub mod report;
pub mod risk;
pub mod sections;

// Re-export commonly used types
pub use config::ReportConfig;
pub use context::{ContextValue, SectionContext};
pub use data::{load_or_substitute, DataSource, EmptySource, FileDataSource, SourceData};
pub use document::{Document, DocumentStore, OutputFormat, PlaceholderRenderer, TemplateRenderer, TemplateStore};
pub use error::{ReportError, ReportResult};
pub use generator::{generate_section, SectionGenerator, SectionReport};
pub use inject::{inject, locate, ColumnMapping, InjectionOutcome, Marker, TablePass, TableStyle, TotalRow};
pub use period::Period;
pub use record::Record;
pub use report::{ReportRun, SectionOutcome};
pub use risk::{classify, rank, score, summarize, Classification, ClassificationSummaryEntry, RiskRecord};
pub use sections::{catalogue, Section};
