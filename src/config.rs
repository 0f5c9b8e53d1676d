//! Runtime configuration.
//!
//! Resolved once at startup (usually from environment variables) and passed
//! into generators; nothing reads the environment during generation.

use std::env;
use std::path::{Path, PathBuf};

use crate::document::OutputFormat;
use crate::error::{ReportError, ReportResult};
use crate::inject::TableStyle;
use crate::period::Period;

pub const ENV_DATA_DIR: &str = "REPORT_DATA_DIR";
pub const ENV_TEMPLATE_DIR: &str = "REPORT_TEMPLATE_DIR";
pub const ENV_OUTPUT_DIR: &str = "REPORT_OUTPUT_DIR";
pub const ENV_PERIOD: &str = "REPORT_PERIOD";
pub const ENV_FORMAT: &str = "REPORT_FORMAT";

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_TEMPLATE_DIR: &str = "templates";
pub const DEFAULT_OUTPUT_DIR: &str = "reports";

#[derive(Debug, Clone)]
pub struct ReportConfig {
    data_dir: PathBuf,
    template_dir: PathBuf,
    output_dir: PathBuf,
    period: Period,
    output_format: OutputFormat,
    table_style: TableStyle,
}

impl ReportConfig {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        template_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        period: Period,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            template_dir: template_dir.into(),
            output_dir: output_dir.into(),
            period,
            output_format: OutputFormat::default(),
            table_style: TableStyle::default(),
        }
    }

    /// Read `REPORT_*` variables, falling back to `data/`, `templates/`,
    /// `reports/`, the previous month and JSON output.
    pub fn from_env() -> ReportResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> ReportResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dir = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        let period = match lookup(ENV_PERIOD) {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => Period::previous_to_today(),
        };

        let output_format = match lookup(ENV_FORMAT) {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => OutputFormat::default(),
        };

        let config = Self::new(
            dir(ENV_DATA_DIR, DEFAULT_DATA_DIR),
            dir(ENV_TEMPLATE_DIR, DEFAULT_TEMPLATE_DIR),
            dir(ENV_OUTPUT_DIR, DEFAULT_OUTPUT_DIR),
            period,
        )
        .with_output_format(output_format);
        config.validate()?;
        Ok(config)
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn with_table_style(mut self, style: TableStyle) -> Self {
        self.table_style = style;
        self
    }

    pub fn validate(&self) -> ReportResult<()> {
        let style = &self.table_style;
        if style.header_font_pt <= 0.0 || style.body_font_pt <= 0.0 {
            return Err(ReportError::InvalidConfig("font sizes must be positive".into()));
        }
        if style.default_column_width == 0 {
            return Err(ReportError::InvalidConfig("default column width cannot be zero".into()));
        }
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn period(&self) -> &Period {
        &self.period
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn table_style(&self) -> &TableStyle {
        &self.table_style
    }
}
