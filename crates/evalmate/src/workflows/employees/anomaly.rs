use serde::Serialize;

use super::domain::{EmployeeId, FieldMap};
use super::models::{
    AnomalyFlag, AnomalyModel, FeatureVector, ModelError, ModelInferenceError, ModelKind,
};

pub const NO_ANOMALY: &str = "No anomaly";
pub const UNUSUAL_PATTERN: &str = "Unusual KPI pattern";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    LessThan,
    GreaterThan,
    AtLeast,
    Equals,
}

impl Comparator {
    fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparator::LessThan => value < threshold,
            Comparator::GreaterThan => value > threshold,
            Comparator::AtLeast => value >= threshold,
            Comparator::Equals => (value - threshold).abs() < f64::EPSILON,
        }
    }
}

/// `field <comparator> threshold` plus the phrase reported when it holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyReasonRule {
    pub field: &'static str,
    pub comparator: Comparator,
    pub threshold: f64,
    pub phrase: &'static str,
}

impl AnomalyReasonRule {
    pub const fn new(
        field: &'static str,
        comparator: Comparator,
        threshold: f64,
        phrase: &'static str,
    ) -> Self {
        Self {
            field,
            comparator,
            threshold,
            phrase,
        }
    }

    /// Absent or non-numeric fields never match.
    pub fn matches(&self, fields: &FieldMap) -> bool {
        fields
            .get(self.field)
            .and_then(|value| value.as_number())
            .map(|value| self.comparator.holds(value, self.threshold))
            .unwrap_or(false)
    }
}

pub const ANOMALY_RULES: &[AnomalyReasonRule] = &[
    AnomalyReasonRule::new(
        "effort_engagement_score",
        Comparator::LessThan,
        1.5,
        "Very low engagement",
    ),
    AnomalyReasonRule::new("burnout_risk", Comparator::GreaterThan, 4.0, "High burnout risk"),
    AnomalyReasonRule::new("peer_complaints", Comparator::AtLeast, 3.0, "High peer complaints"),
    AnomalyReasonRule::new(
        "score_delta",
        Comparator::LessThan,
        -2.0,
        "Sharp drop in performance",
    ),
    AnomalyReasonRule::new("hr_warnings", Comparator::Equals, 1.0, "Recent HR warning"),
];

/// Detector output for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyVerdict {
    pub flag: AnomalyFlag,
    pub score: f64,
    pub reason: String,
}

/// Turns an outlier flag into a readable reason using a fixed rule list.
#[derive(Debug, Clone)]
pub struct AnomalyExplainer {
    rules: Vec<AnomalyReasonRule>,
}

impl AnomalyExplainer {
    pub fn standard() -> Self {
        Self::new(ANOMALY_RULES.to_vec())
    }

    pub fn new(rules: Vec<AnomalyReasonRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[AnomalyReasonRule] {
        &self.rules
    }

    /// Matching phrases in rule order, or the generic fallback.
    pub fn explain_reason(&self, fields: &FieldMap) -> String {
        let phrases: Vec<&str> = self
            .rules
            .iter()
            .filter(|rule| rule.matches(fields))
            .map(|rule| rule.phrase)
            .collect();
        if phrases.is_empty() {
            UNUSUAL_PATTERN.to_string()
        } else {
            phrases.join(", ")
        }
    }

    /// Rules are only consulted for outliers.
    pub fn reason_for(&self, flag: AnomalyFlag, fields: &FieldMap) -> String {
        match flag {
            AnomalyFlag::Outlier => self.explain_reason(fields),
            AnomalyFlag::Normal => NO_ANOMALY.to_string(),
        }
    }

    pub fn evaluate(
        &self,
        model: &dyn AnomalyModel,
        employee_id: &EmployeeId,
        fields: &FieldMap,
    ) -> Result<AnomalyVerdict, ModelInferenceError> {
        let input = FeatureVector::build(fields, model.features());
        let fail =
            |source: ModelError| ModelInferenceError::new(ModelKind::Anomaly, employee_id, source);
        let flag = model.predict(&input).map_err(fail)?;
        let score = model.decision_function(&input).map_err(fail)?;
        Ok(AnomalyVerdict {
            flag,
            score,
            reason: self.reason_for(flag, fields),
        })
    }
}

impl Default for AnomalyExplainer {
    fn default() -> Self {
        Self::standard()
    }
}
