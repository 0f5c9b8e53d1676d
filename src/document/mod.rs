//! Document model, template rendering and persistence.

pub mod access;
pub mod markdown;
pub mod model;
pub mod render;
pub mod store;

pub use access::{CellFormat, DocumentModel, TableModel};
pub use markdown::MarkdownFormatter;
pub use model::{Alignment, Block, Cell, Document, Paragraph, Row, Run, RunStyle, Table};
pub use render::{PlaceholderRenderer, TemplateRenderer};
pub use store::{DocumentStore, OutputFormat, TemplateStore};
