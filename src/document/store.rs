//! Loading templates and persisting finished documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::markdown::MarkdownFormatter;
use crate::document::model::Document;
use crate::error::{ReportError, ReportResult};
use crate::period::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            other => Err(ReportError::InvalidConfig(format!(
                "unknown output format '{}' (expected json or markdown)",
                other
            ))),
        }
    }
}

/// Template documents stored as `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// A missing template is `TemplateMissing`, fatal for the section that
    /// needs it.
    pub fn load(&self, name: &str) -> ReportResult<Document> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(ReportError::TemplateMissing { path });
        }
        let raw = fs::read_to_string(&path).map_err(|e| ReportError::io(&path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Writes documents to `<output_dir>/<period>/<section_key>.<ext>`.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    output_dir: PathBuf,
    format: OutputFormat,
}

impl DocumentStore {
    pub fn new(output_dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn path_for(&self, period: &Period, section_key: &str) -> PathBuf {
        self.output_dir
            .join(period.to_string())
            .join(format!("{}.{}", section_key, self.format.extension()))
    }

    pub fn save(&self, document: &Document, period: &Period, section_key: &str) -> ReportResult<PathBuf> {
        let path = self.path_for(period, section_key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
        }

        let content = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(document)?,
            OutputFormat::Markdown => MarkdownFormatter::format(document),
        };
        fs::write(&path, content).map_err(|e| ReportError::io(&path, e))?;

        info!("Saved section '{}' to {}", section_key, path.display());
        Ok(path)
    }
}
