//! Report run: generate many sections in parallel.
//!
//! Sections share no mutable state, so each one runs its own
//! [`SectionGenerator`](crate::generator::SectionGenerator) on a Rayon
//! worker. A failing section becomes a [`SectionOutcome::Failed`]; it never
//! stops the others.

use std::time::Instant;

use rayon::prelude::*;
use tracing::{error, info};

use crate::config::ReportConfig;
use crate::data::DataSource;
use crate::document::{DocumentStore, PlaceholderRenderer, TemplateRenderer, TemplateStore};
use crate::error::{ReportError, ReportResult};
use crate::generator::{generate_section, SectionReport};
use crate::sections::{self, Section};

#[derive(Debug)]
pub enum SectionOutcome {
    Generated(SectionReport),
    Failed { section_key: String, error: ReportError },
}

impl SectionOutcome {
    pub fn section_key(&self) -> &str {
        match self {
            SectionOutcome::Generated(report) => report.section_key,
            SectionOutcome::Failed { section_key, .. } => section_key,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, SectionOutcome::Generated(_))
    }
}

pub struct ReportRun {
    config: ReportConfig,
    source: Box<dyn DataSource>,
    renderer: Box<dyn TemplateRenderer>,
    templates: TemplateStore,
    store: DocumentStore,
}

impl ReportRun {
    /// Templates and output locations come from `config`; templates are
    /// rendered with [`PlaceholderRenderer`].
    pub fn new(config: ReportConfig, source: Box<dyn DataSource>) -> Self {
        let templates = TemplateStore::new(config.template_dir());
        let store = DocumentStore::new(config.output_dir(), config.output_format());
        Self {
            config,
            source,
            renderer: Box::new(PlaceholderRenderer::new()),
            templates,
            store,
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn generate(&self, section: &dyn Section) -> ReportResult<SectionReport> {
        generate_section(
            section,
            &self.config,
            self.source.as_ref(),
            self.renderer.as_ref(),
            &self.templates,
            &self.store,
        )
    }

    /// Generate the given sections. Outcomes keep the input order.
    pub fn run(&self, sections: &[Box<dyn Section>]) -> Vec<SectionOutcome> {
        let start = Instant::now();
        info!(
            "Generating {} section(s) for {}",
            sections.len(),
            self.config.period()
        );

        let outcomes: Vec<SectionOutcome> = sections
            .par_iter()
            .map(|section| match self.generate(section.as_ref()) {
                Ok(report) => SectionOutcome::Generated(report),
                Err(e) => {
                    error!("Section '{}' failed: {}", section.key(), e);
                    SectionOutcome::Failed {
                        section_key: section.key().to_string(),
                        error: e,
                    }
                }
            })
            .collect();

        let generated = outcomes.iter().filter(|o| o.is_generated()).count();
        info!(
            "Report run finished: {}/{} section(s) in {:.2?}",
            generated,
            outcomes.len(),
            start.elapsed()
        );
        outcomes
    }

    /// Generate the named sections, or every section when `keys` is empty.
    /// Unknown keys fail with `InvalidConfig` before anything is generated.
    pub fn run_keys(&self, keys: &[String]) -> ReportResult<Vec<SectionOutcome>> {
        let selected: Vec<Box<dyn Section>> = if keys.is_empty() {
            sections::catalogue()
        } else {
            keys.iter()
                .map(|key| {
                    sections::find(key).ok_or_else(|| {
                        ReportError::InvalidConfig(format!("unknown section '{}'", key))
                    })
                })
                .collect::<ReportResult<_>>()?
        };
        Ok(self.run(&selected))
    }
}
