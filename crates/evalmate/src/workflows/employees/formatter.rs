//! Maps model outputs to display tiers and assembles the evaluation report.

use std::collections::BTreeMap;

use serde::Serialize;

use super::anomaly::{AnomalyVerdict, NO_ANOMALY, UNUSUAL_PATTERN};
use super::domain::EmployeeRecord;

/// Named bucket with fixed display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreTier {
    pub label: &'static str,
    pub recommendation: &'static str,
    pub icon: &'static str,
}

impl ScoreTier {
    const fn new(label: &'static str, recommendation: &'static str, icon: &'static str) -> Self {
        Self {
            label,
            recommendation,
            icon,
        }
    }
}

/// Lower-closed thresholds, highest first.
pub const PROMOTION_TIERS: &[(f64, ScoreTier)] = &[
    (
        80.0,
        ScoreTier::new(
            "Highly Ready",
            "Strong candidate for immediate promotion consideration",
            "🌟",
        ),
    ),
    (
        65.0,
        ScoreTier::new(
            "Ready",
            "Good candidate for promotion with minor development",
            "✅",
        ),
    ),
    (
        50.0,
        ScoreTier::new(
            "Partially Ready",
            "Needs focused development before promotion",
            "⚡",
        ),
    ),
];

pub const NOT_READY: ScoreTier = ScoreTier::new(
    "Not Ready",
    "Requires significant development and improvement",
    "📈",
);

pub const ATTRITION_TIERS: &[(&str, ScoreTier)] = &[
    (
        "High",
        ScoreTier::new("High Risk", "Immediate retention measures recommended", "🚨"),
    ),
    (
        "Medium",
        ScoreTier::new("Moderate Risk", "Monitor closely and engage proactively", "⚠️"),
    ),
    (
        "Low",
        ScoreTier::new("Very Low Risk", "Stable and engaged employee", "🟢"),
    ),
];

pub const UNKNOWN_ATTRITION: ScoreTier =
    ScoreTier::new("Unknown", "No classification available", "❓");

pub const ANOMALY_DETECTED: &str = "Anomaly Detected";
pub const ANOMALY_NORMAL: &str = "Normal";

/// Readiness score clamped to 0-100 and rounded to one decimal.
pub fn readiness_score(raw: f64) -> f64 {
    if !raw.is_finite() {
        return 0.0;
    }
    (raw.clamp(0.0, 100.0) * 10.0).round() / 10.0
}

pub fn promotion_tier(score: f64) -> ScoreTier {
    PROMOTION_TIERS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, tier)| *tier)
        .unwrap_or(NOT_READY)
}

/// Exact label lookup; anything unmapped is the Unknown tier.
pub fn attrition_tier(label: &str) -> ScoreTier {
    ATTRITION_TIERS
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, tier)| *tier)
        .unwrap_or(UNKNOWN_ATTRITION)
}

/// Category scores surfaced next to the readiness tier, with their labels.
pub const KPI_SCORE_LABELS: &[(&str, &str)] = &[
    ("leadership_score", "Leadership"),
    ("integrity_feedback_score", "Integrity Feedback"),
    ("collaboration_communication_score", "Collaboration & Communication"),
    ("adaptability_growth_score", "Adaptability & Growth"),
    ("skill_development_score", "Skill Development"),
    ("effort_engagement_score", "Effort & Engagement"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionView {
    pub employee_name: Option<String>,
    pub score: f64,
    pub level: &'static str,
    pub recommendation: &'static str,
    pub icon: &'static str,
    pub employee_id: String,
    pub department: Option<String>,
    pub role: Option<String>,
    pub kpi_scores: BTreeMap<&'static str, f64>,
}

impl PromotionView {
    pub fn new(record: &EmployeeRecord, raw_score: f64) -> Self {
        let score = readiness_score(raw_score);
        let tier = promotion_tier(score);
        let kpi_scores = KPI_SCORE_LABELS
            .iter()
            .filter_map(|(field, label)| record.number(field).map(|value| (*label, value)))
            .collect();

        Self {
            employee_name: record.name().map(str::to_owned),
            score,
            level: tier.label,
            recommendation: tier.recommendation,
            icon: tier.icon,
            employee_id: record.employee_id.0.clone(),
            department: record.department().map(str::to_owned),
            role: record.designation().map(str::to_owned),
            kpi_scores,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttritionView {
    pub employee_name: Option<String>,
    pub risk_level: &'static str,
    pub recommendation: &'static str,
    pub icon: &'static str,
}

impl AttritionView {
    pub fn new(record: &EmployeeRecord, label: &str) -> Self {
        let tier = attrition_tier(label);
        Self {
            employee_name: record.name().map(str::to_owned),
            risk_level: tier.label,
            recommendation: tier.recommendation,
            icon: tier.icon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyView {
    pub anomaly_status: &'static str,
    pub anomaly_score: f64,
    pub description: String,
    pub icon: &'static str,
}

/// Reasons that carry no rule-specific explanation.
const GENERIC_REASONS: [&str; 3] = [NO_ANOMALY, UNUSUAL_PATTERN, "No unusual patterns found."];

fn is_specific_reason(reason: &str) -> bool {
    let reason = reason.trim();
    !reason.is_empty()
        && !GENERIC_REASONS
            .iter()
            .any(|generic| generic.eq_ignore_ascii_case(reason))
}

impl AnomalyView {
    /// Only a named rule reason is reported as an anomaly. A bare detector
    /// outlier with the generic fallback reason renders as normal.
    pub fn new(verdict: &AnomalyVerdict) -> Self {
        let anomaly_score = if verdict.score.is_finite() {
            (verdict.score * 1000.0).round() / 1000.0
        } else {
            0.0
        };
        if is_specific_reason(&verdict.reason) {
            Self {
                anomaly_status: ANOMALY_DETECTED,
                anomaly_score,
                description: verdict.reason.trim().to_string(),
                icon: "❗",
            }
        } else {
            Self {
                anomaly_status: ANOMALY_NORMAL,
                anomaly_score,
                description: String::new(),
                icon: "✅",
            }
        }
    }
}

/// Output record handed to callers for a single evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub promotion: PromotionView,
    pub attrition: AttritionView,
    pub anomaly: AnomalyView,
    pub feedback_summary: String,
}
