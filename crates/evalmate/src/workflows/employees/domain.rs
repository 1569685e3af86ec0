use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for employee records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single cell of an employee record as it arrives from uploads or manual entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value. Anything that fails coercion reads as absent.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) if value.is_finite() => Some(*value),
            FieldValue::Number(_) => None,
            FieldValue::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            FieldValue::Text(text) => parse_number(text),
            FieldValue::Null | FieldValue::Date(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Presence test used by indicator fields: non-zero numbers, `true`,
    /// dates, and non-empty text that does not coerce to zero.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(flag) => *flag,
            FieldValue::Number(value) => value.is_finite() && *value != 0.0,
            FieldValue::Date(_) => true,
            FieldValue::Text(text) => {
                if text.trim().is_empty() {
                    return false;
                }
                parse_number(text).map(|value| value != 0.0).unwrap_or(true)
            }
        }
    }

    /// Interpret a raw CSV or form cell. Empty cells are absent, not empty strings.
    pub fn from_cell(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(value) = trimmed.parse::<f64>() {
            if value.is_finite() {
                return Some(FieldValue::Number(value));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Some(FieldValue::Date(date));
        }
        Some(FieldValue::Text(trimmed.to_string()))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(flag) => write!(f, "{flag}"),
            FieldValue::Number(value) => write!(f, "{value}"),
            FieldValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        return value.is_finite().then_some(value);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "yes" | "true" => Some(1.0),
        "no" | "false" => Some(0.0),
        _ => None,
    }
}

/// Sparse field map shared by raw and derived values.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Lifecycle of a record: raw fields only, or enriched by a derivation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    Incomplete,
    Evaluated,
}

impl RecordState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Incomplete => "Incomplete",
            Self::Evaluated => "Evaluated",
        }
    }
}

/// Employee record: raw metrics plus whatever the derivation graph wrote back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: EmployeeId,
    #[serde(default = "incomplete")]
    pub state: RecordState,
    #[serde(default)]
    pub fields: FieldMap,
    /// Fields the derivation graph wrote on its last run. Anything else in
    /// `fields` was supplied by a caller.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub derived: BTreeSet<String>,
}

fn incomplete() -> RecordState {
    RecordState::Incomplete
}

impl EmployeeRecord {
    pub fn new(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: EmployeeId(employee_id.into()),
            state: RecordState::Incomplete,
            fields: FieldMap::new(),
            derived: BTreeSet::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: FieldValue) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn with_number(self, name: &str, value: f64) -> Self {
        self.with_field(name, FieldValue::Number(value))
    }

    pub fn with_text(self, name: &str, value: &str) -> Self {
        self.with_field(name, FieldValue::Text(value.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(FieldValue::as_number)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(FieldValue::as_text)
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    pub fn is_engine_written(&self, name: &str) -> bool {
        self.derived.contains(name)
    }

    pub fn designation(&self) -> Option<&str> {
        self.text("designation")
    }

    pub fn department(&self) -> Option<&str> {
        self.text("department")
    }
}
