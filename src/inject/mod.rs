//! Marker-based table injection.
//!
//! - `marker`: marker names and their textual surface forms
//! - `mapping`: column mappings, total-row rule, table fonts
//! - `injector`: locate + rebuild, and the fault-tolerant `TablePass`

pub mod injector;
pub mod mapping;
pub mod marker;

pub use injector::{inject, locate, InjectSummary, InjectionOutcome, TableLocation, TablePass};
pub use mapping::{ColumnKind, ColumnMapping, ColumnSpec, TableStyle, TotalRow, DEFAULT_COLUMN_WIDTH};
pub use marker::{Marker, SurfaceForm};
