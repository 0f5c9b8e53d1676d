//! Table markers and the textual forms they take in a rendered document.

use std::fmt;

use smallvec::SmallVec;

/// Ways a marker can appear in cell text, in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceForm {
    /// `[[NAME]]`
    Bracketed,
    /// `{{ NAME }}`, left unrendered by the template engine
    TemplateVariable,
    /// `{{NAME}}`
    CompactTemplateVariable,
    /// `NAME` anywhere in the text
    Bare,
}

impl SurfaceForm {
    pub const PRIORITY: [SurfaceForm; 4] = [
        SurfaceForm::Bracketed,
        SurfaceForm::TemplateVariable,
        SurfaceForm::CompactTemplateVariable,
        SurfaceForm::Bare,
    ];

    pub fn render(&self, name: &str) -> String {
        match self {
            SurfaceForm::Bracketed => format!("[[{}]]", name),
            SurfaceForm::TemplateVariable => format!("{{{{ {} }}}}", name),
            SurfaceForm::CompactTemplateVariable => format!("{{{{{}}}}}", name),
            SurfaceForm::Bare => name.to_string(),
        }
    }
}

/// Logical name of a destination table. Stored upper-cased; matching is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marker {
    name: String,
}

impl Marker {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().trim().to_uppercase(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Upper-cased surface forms in priority order.
    pub fn surface_forms(&self) -> SmallVec<[(SurfaceForm, String); 4]> {
        SurfaceForm::PRIORITY
            .iter()
            .map(|form| (*form, form.render(&self.name)))
            .collect()
    }

    /// The highest-priority form contained in `text`, if any.
    pub fn matched_form(&self, text: &str) -> Option<SurfaceForm> {
        if self.name.is_empty() {
            return None;
        }
        let haystack = text.to_uppercase();
        self.surface_forms()
            .into_iter()
            .find(|(_, pattern)| haystack.contains(pattern.as_str()))
            .map(|(form, _)| form)
    }

    pub fn is_carried_by(&self, text: &str) -> bool {
        self.matched_form(text).is_some()
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
