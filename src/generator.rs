//! Section generation pipeline.
//!
//! A [`SectionGenerator`] walks one section through
//! `Created → DataLoaded → Processed → Rendered → Injected → Saved`.
//! Each transition consumes the generator and returns it in the next state,
//! so a stage cannot be skipped, repeated or run backwards.
//!
//! ```ignore
//! let report = SectionGenerator::new(&RisksSection, &config)
//!     .load_data(&source)
//!     .process()?
//!     .render(&renderer, &templates)?
//!     .inject()
//!     .save(&store)?
//!     .into_report();
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ReportConfig;
use crate::context::SectionContext;
use crate::data::{load_or_substitute, DataSource, SourceData};
use crate::document::{Document, DocumentStore, TemplateRenderer, TemplateStore};
use crate::error::ReportResult;
use crate::inject::{InjectionOutcome, TablePass};
use crate::sections::Section;

/// Nothing loaded yet.
#[derive(Debug, Clone, Copy)]
pub struct Created;

/// Records obtained, real or substitute.
#[derive(Debug, Clone)]
pub struct DataLoaded {
    data: SourceData,
}

/// Context built and table passes prepared.
#[derive(Debug, Clone)]
pub struct Processed {
    substituted: bool,
    context: SectionContext,
    tables: Vec<TablePass>,
}

/// Template merged with the context.
#[derive(Debug, Clone)]
pub struct Rendered {
    substituted: bool,
    context: SectionContext,
    tables: Vec<TablePass>,
    document: Document,
}

/// Every table pass applied.
#[derive(Debug, Clone)]
pub struct Injected {
    substituted: bool,
    document: Document,
    outcomes: Vec<InjectionOutcome>,
}

/// Document persisted.
#[derive(Debug, Clone)]
pub struct Saved {
    substituted: bool,
    document: Document,
    outcomes: Vec<InjectionOutcome>,
    path: PathBuf,
}

/// Single-use generator for one section, typed by its current stage.
pub struct SectionGenerator<'a, S> {
    section: &'a dyn Section,
    config: &'a ReportConfig,
    started: Instant,
    state: S,
}

impl<'a, S> SectionGenerator<'a, S> {
    pub fn section_key(&self) -> &'static str {
        self.section.key()
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    fn advance<T>(self, state: T) -> SectionGenerator<'a, T> {
        SectionGenerator {
            section: self.section,
            config: self.config,
            started: self.started,
            state,
        }
    }
}

impl<'a> SectionGenerator<'a, Created> {
    pub fn new(section: &'a dyn Section, config: &'a ReportConfig) -> Self {
        debug!("Created generator for section '{}'", section.key());
        Self {
            section,
            config,
            started: Instant::now(),
            state: Created,
        }
    }

    /// Consult the source; fall back to the section's substitute dataset
    /// when real data is missing. Never fails.
    pub fn load_data(self, source: &dyn DataSource) -> SectionGenerator<'a, DataLoaded> {
        let section = self.section;
        let period = *self.config.period();
        let data = load_or_substitute(source, section.key(), &period, |rng| {
            section.substitute(&period, rng)
        });
        self.advance(DataLoaded { data })
    }
}

impl<'a> SectionGenerator<'a, DataLoaded> {
    pub fn data(&self) -> &SourceData {
        &self.state.data
    }

    /// Section-specific processing plus the variables every template may use:
    /// `titulo`, `periodo`, `periodo_etiqueta` and `datos_sustitutos`.
    pub fn process(self) -> ReportResult<SectionGenerator<'a, Processed>> {
        let SectionGenerator {
            section,
            config,
            started,
            state,
        } = self;
        let period = *config.period();
        let substituted = state.data.is_substituted();

        let mut processed = section.process(state.data.into_records(), &period)?;
        let context = &mut processed.context;
        context.insert("titulo", section.title());
        context.insert("periodo", period.to_string());
        context.insert("periodo_etiqueta", period.label());
        context.insert("datos_sustitutos", substituted);

        info!(
            "Processed section '{}': {} context values, {} table(s)",
            section.key(),
            processed.context.len(),
            processed.tables.len()
        );

        Ok(SectionGenerator {
            section,
            config,
            started,
            state: Processed {
                substituted,
                context: processed.context,
                tables: processed.tables,
            },
        })
    }
}

impl<'a> SectionGenerator<'a, Processed> {
    pub fn context(&self) -> &SectionContext {
        &self.state.context
    }

    pub fn tables(&self) -> &[TablePass] {
        &self.state.tables
    }

    /// Load the section template and merge the context into it. A missing
    /// template fails this section.
    pub fn render(
        self,
        renderer: &dyn TemplateRenderer,
        templates: &TemplateStore,
    ) -> ReportResult<SectionGenerator<'a, Rendered>> {
        let template = templates.load(self.section.template_name())?;
        let document = renderer.render(&template, &self.state.context)?;
        debug!("Rendered section '{}'", self.section.key());

        let Processed {
            substituted,
            context,
            tables,
        } = self.state;
        Ok(SectionGenerator {
            section: self.section,
            config: self.config,
            started: self.started,
            state: Rendered {
                substituted,
                context,
                tables,
                document,
            },
        })
    }
}

impl<'a> SectionGenerator<'a, Rendered> {
    pub fn document(&self) -> &Document {
        &self.state.document
    }

    pub fn context(&self) -> &SectionContext {
        &self.state.context
    }

    /// Run every table pass. Failures are recorded per table, never raised.
    pub fn inject(self) -> SectionGenerator<'a, Injected> {
        let style = *self.config.table_style();
        let Rendered {
            substituted,
            tables,
            mut document,
            ..
        } = self.state;

        let outcomes: Vec<InjectionOutcome> = tables
            .iter()
            .map(|pass| pass.apply(&mut document, &style))
            .collect();

        let injected = outcomes.iter().filter(|o| o.is_injected()).count();
        if injected < outcomes.len() {
            warn!(
                "Section '{}': {} of {} table(s) injected",
                self.section.key(),
                injected,
                outcomes.len()
            );
        }

        SectionGenerator {
            section: self.section,
            config: self.config,
            started: self.started,
            state: Injected {
                substituted,
                document,
                outcomes,
            },
        }
    }
}

impl<'a> SectionGenerator<'a, Injected> {
    pub fn document(&self) -> &Document {
        &self.state.document
    }

    pub fn outcomes(&self) -> &[InjectionOutcome] {
        &self.state.outcomes
    }

    pub fn save(self, store: &DocumentStore) -> ReportResult<SectionGenerator<'a, Saved>> {
        let path = store.save(&self.state.document, self.config.period(), self.section.key())?;
        let Injected {
            substituted,
            document,
            outcomes,
        } = self.state;
        Ok(SectionGenerator {
            section: self.section,
            config: self.config,
            started: self.started,
            state: Saved {
                substituted,
                document,
                outcomes,
                path,
            },
        })
    }
}

impl<'a> SectionGenerator<'a, Saved> {
    pub fn path(&self) -> &Path {
        &self.state.path
    }

    pub fn document(&self) -> &Document {
        &self.state.document
    }

    pub fn into_report(self) -> SectionReport {
        let elapsed_ms = self.started.elapsed().as_millis();
        info!(
            "Section '{}' generated in {} ms -> {}",
            self.section.key(),
            elapsed_ms,
            self.state.path.display()
        );
        SectionReport {
            section_key: self.section.key(),
            path: self.state.path,
            substituted: self.state.substituted,
            outcomes: self.state.outcomes,
            elapsed_ms,
        }
    }
}

/// What a finished generation produced.
#[derive(Debug, Clone)]
pub struct SectionReport {
    pub section_key: &'static str,
    pub path: PathBuf,
    /// Generated from substitute data.
    pub substituted: bool,
    pub outcomes: Vec<InjectionOutcome>,
    pub elapsed_ms: u128,
}

impl SectionReport {
    pub fn injected_tables(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_injected()).count()
    }

    pub fn to_json(&self) -> Value {
        let tables: Vec<Value> = self
            .outcomes
            .iter()
            .map(|o| {
                let status = match o {
                    InjectionOutcome::Injected { .. } => "injected",
                    InjectionOutcome::MarkerNotFound { .. } => "marker_not_found",
                    InjectionOutcome::Failed { .. } => "failed",
                };
                serde_json::json!({ "marker": o.marker(), "status": status })
            })
            .collect();
        serde_json::json!({
            "section": self.section_key,
            "path": self.path.display().to_string(),
            "substituted": self.substituted,
            "tables": tables,
            "elapsed_ms": self.elapsed_ms as u64,
        })
    }
}

/// Run every stage for one section.
pub fn generate_section(
    section: &dyn Section,
    config: &ReportConfig,
    source: &dyn DataSource,
    renderer: &dyn TemplateRenderer,
    templates: &TemplateStore,
    store: &DocumentStore,
) -> ReportResult<SectionReport> {
    Ok(SectionGenerator::new(section, config)
        .load_data(source)
        .process()?
        .render(renderer, templates)?
        .inject()
        .save(store)?
        .into_report())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EmptySource;
    use crate::document::{Block, OutputFormat, Paragraph, PlaceholderRenderer, Row, Table, TableModel};
    use crate::error::ReportError;
    use crate::period::Period;
    use crate::record::record_from;
    use crate::sections::{LaboratorySection, MaintenanceSection, RisksSection};
    use serde_json::json;
    use std::fs;

    struct FixedSource(Vec<crate::record::Record>);

    impl DataSource for FixedSource {
        fn load(&self, _key: &str, _period: &Period) -> ReportResult<Vec<crate::record::Record>> {
            Ok(self.0.clone())
        }
    }

    fn write_template(dir: &Path, name: &str, document: &Document) {
        fs::write(
            dir.join(format!("{}.json", name)),
            serde_json::to_string(document).unwrap(),
        )
        .unwrap();
    }

    fn risk_template() -> Document {
        Document {
            title: "{{ titulo }} - {{ periodo_etiqueta }}".to_string(),
            blocks: vec![
                Block::Paragraph(Paragraph::plain("Riesgos registrados: {{ total_riesgos }}")),
                Block::Table(Table::from_rows(vec![
                    Row::plain(["ID", "RIESGO", "{{ MATRIZ_RIESGOS }}"]),
                    Row::plain(["x", "y", "z"]),
                ])),
                Block::Table(Table::from_rows(vec![Row::plain([
                    "[[RESUMEN_RIESGOS]]",
                    "CANTIDAD",
                    "PORCENTAJE",
                ])])),
            ],
        }
    }

    fn config(root: &Path) -> ReportConfig {
        ReportConfig::new(
            root.join("data"),
            root.join("templates"),
            root.join("out"),
            Period::new(2026, 10).unwrap(),
        )
    }

    #[test]
    fn test_full_pipeline_with_real_data() {
        let root = tempfile::tempdir().unwrap();
        let config = config(root.path());
        fs::create_dir_all(config.template_dir()).unwrap();
        write_template(config.template_dir(), "riesgos", &risk_template());

        let source = FixedSource(vec![
            record_from([("id", json!("R1")), ("probabilidad", json!(3)), ("impacto", json!(5))]),
            record_from([("id", json!("R2")), ("probabilidad", json!(1)), ("impacto", json!(1))]),
        ]);
        let templates = TemplateStore::new(config.template_dir());
        let store = DocumentStore::new(config.output_dir(), OutputFormat::Json);

        let loaded = SectionGenerator::new(&RisksSection, &config).load_data(&source);
        assert!(!loaded.data().is_substituted());

        let processed = loaded.process().unwrap();
        assert_eq!(processed.context().display("periodo").as_deref(), Some("2026-10"));
        assert_eq!(processed.tables().len(), 2);

        let rendered = processed.render(&PlaceholderRenderer, &templates).unwrap();
        assert_eq!(rendered.document().title, "Matriz de riesgos - octubre 2026");

        let injected = rendered.inject();
        assert!(injected.outcomes().iter().all(|o| o.is_injected()));
        let tables: Vec<&Table> = injected.document().tables().collect();
        assert_eq!(tables[0].row_count(), 3);
        // two buckets plus TOTAL
        assert_eq!(tables[1].row_count(), 4);

        let saved = injected.save(&store).unwrap();
        assert!(saved.path().ends_with("2026-10/riesgos.json"));
        let report = saved.into_report();
        assert!(!report.substituted);
        assert_eq!(report.injected_tables(), 2);

        let written: Document =
            serde_json::from_str(&fs::read_to_string(&report.path).unwrap()).unwrap();
        let paragraph = match &written.blocks[0] {
            Block::Paragraph(p) => p.text(),
            other => panic!("unexpected block {:?}", other),
        };
        assert_eq!(paragraph, "Riesgos registrados: 2");
    }

    #[test]
    fn test_substitute_data_flags_context() {
        let root = tempfile::tempdir().unwrap();
        let config = config(root.path());
        let processed = SectionGenerator::new(&MaintenanceSection, &config)
            .load_data(&EmptySource)
            .process()
            .unwrap();
        assert_eq!(
            processed.context().get("datos_sustitutos"),
            Some(&crate::context::ContextValue::Bool(true))
        );
        assert!(processed.context().is_truthy("hay_mantenimientos"));
    }

    #[test]
    fn test_missing_template_is_fatal_for_section() {
        let root = tempfile::tempdir().unwrap();
        let config = config(root.path());
        let templates = TemplateStore::new(config.template_dir());
        let store = DocumentStore::new(config.output_dir(), OutputFormat::Json);

        let err = generate_section(
            &LaboratorySection,
            &config,
            &EmptySource,
            &PlaceholderRenderer,
            &templates,
            &store,
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::TemplateMissing { .. }));
        assert!(!store.path_for(config.period(), "laboratorio").exists());
    }

    #[test]
    fn test_missing_marker_keeps_static_table() {
        let root = tempfile::tempdir().unwrap();
        let config = config(root.path());
        fs::create_dir_all(config.template_dir()).unwrap();
        let template = Document {
            title: "Laboratorio".to_string(),
            blocks: vec![Block::Table(Table::from_rows(vec![
                Row::plain(["PARÁMETRO", "RESULTADO"]),
                Row::plain(["pH", "7,0"]),
            ]))],
        };
        write_template(config.template_dir(), "laboratorio", &template);

        let report = generate_section(
            &LaboratorySection,
            &config,
            &EmptySource,
            &PlaceholderRenderer,
            &TemplateStore::new(config.template_dir()),
            &DocumentStore::new(config.output_dir(), OutputFormat::Json),
        )
        .unwrap();
        assert!(report.substituted);
        assert!(matches!(
            report.outcomes.as_slice(),
            [InjectionOutcome::MarkerNotFound { .. }]
        ));

        let written: Document =
            serde_json::from_str(&fs::read_to_string(&report.path).unwrap()).unwrap();
        let table = written.tables().next().unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell_text(1, 0).as_deref(), Some("pH"));
    }
}
