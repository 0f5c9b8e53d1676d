//! Section context: the variable mapping a template is rendered with.
//!
//! Lists can only be inserted through [`SectionContext::insert_list`], which
//! also writes `total_<name>` (count) and `hay_<name>` (presence flag), so
//! templates can branch on presence without recounting.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::Record;

pub const TOTAL_PREFIX: &str = "total_";
pub const PRESENCE_PREFIX: &str = "hay_";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContextValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    List(Vec<Record>),
}

impl ContextValue {
    pub fn is_truthy(&self) -> bool {
        match self {
            ContextValue::Bool(b) => *b,
            ContextValue::Integer(i) => *i != 0,
            ContextValue::Number(n) => *n != 0.0,
            ContextValue::Text(s) => !s.is_empty(),
            ContextValue::List(l) => !l.is_empty(),
        }
    }

    /// Text form for placeholder substitution; lists have none.
    pub fn as_display(&self) -> Option<String> {
        match self {
            ContextValue::Bool(b) => Some(if *b { "Sí".to_string() } else { "No".to_string() }),
            ContextValue::Integer(i) => Some(i.to_string()),
            ContextValue::Number(n) => Some(n.to_string()),
            ContextValue::Text(s) => Some(s.clone()),
            ContextValue::List(_) => None,
        }
    }
}

impl From<bool> for ContextValue {
    fn from(v: bool) -> Self {
        ContextValue::Bool(v)
    }
}

impl From<i64> for ContextValue {
    fn from(v: i64) -> Self {
        ContextValue::Integer(v)
    }
}

impl From<usize> for ContextValue {
    fn from(v: usize) -> Self {
        ContextValue::Integer(v as i64)
    }
}

impl From<f64> for ContextValue {
    fn from(v: f64) -> Self {
        ContextValue::Number(v)
    }
}

impl From<&str> for ContextValue {
    fn from(v: &str) -> Self {
        ContextValue::Text(v.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(v: String) -> Self {
        ContextValue::Text(v)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SectionContext {
    values: BTreeMap<String, ContextValue>,
}

impl SectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a scalar. A list passed here is routed through
    /// [`insert_list`](Self::insert_list) so its companions stay in sync.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ContextValue>) {
        let name = name.into();
        match value.into() {
            ContextValue::List(items) => self.insert_list(name, items),
            scalar => {
                self.values.insert(name, scalar);
            }
        }
    }

    pub fn insert_list(&mut self, name: impl Into<String>, items: Vec<Record>) {
        let name = name.into();
        let count = items.len();
        self.values.insert(
            format!("{}{}", TOTAL_PREFIX, name),
            ContextValue::Integer(count as i64),
        );
        self.values.insert(
            format!("{}{}", PRESENCE_PREFIX, name),
            ContextValue::Bool(count > 0),
        );
        self.values.insert(name, ContextValue::List(items));
    }

    pub fn get(&self, name: &str) -> Option<&ContextValue> {
        self.values.get(name)
    }

    pub fn list(&self, name: &str) -> Option<&[Record]> {
        match self.values.get(name)? {
            ContextValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Missing names are falsy.
    pub fn is_truthy(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(ContextValue::is_truthy)
    }

    pub fn display(&self, name: &str) -> Option<String> {
        self.values.get(name).and_then(ContextValue::as_display)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Names of lists whose `total_`/`hay_` companions are missing or
    /// disagree with the list. Empty for any context built through this API.
    pub fn presence_violations(&self) -> Vec<String> {
        self.values
            .iter()
            .filter_map(|(name, value)| {
                let ContextValue::List(items) = value else {
                    return None;
                };
                let total = self.values.get(&format!("{}{}", TOTAL_PREFIX, name));
                let flag = self.values.get(&format!("{}{}", PRESENCE_PREFIX, name));
                let ok = total == Some(&ContextValue::Integer(items.len() as i64))
                    && flag == Some(&ContextValue::Bool(!items.is_empty()));
                (!ok).then(|| name.clone())
            })
            .collect()
    }
}
