//! Role KPI derivations. Each is only computed for the designations that own
//! the KPI in the role registry.

use super::aggregate::{WeightedAggregate, NEUTRAL_SCORE};
use super::metrics::MetricContext;

pub const CODE_COMMITS: WeightedAggregate = WeightedAggregate::new(&[
    ("sprint_velocity", 0.4),
    ("feature_delivery_timeliness", 0.3),
    ("deployment_frequency", 0.3),
]);

pub const BUG_FIX_COUNT: WeightedAggregate = WeightedAggregate::new(&[
    ("bugs_reported", 0.4),
    ("code_commits", 0.3),
    ("sprint_velocity", 0.3),
]);

pub const FEATURE_ENGINEERING: WeightedAggregate = WeightedAggregate::new(&[
    ("innovation_submissions", 0.4),
    ("model_accuracy", 0.3),
    ("projects_handled", 0.3),
]);

pub const MODEL_DEPLOYMENT_COUNT: WeightedAggregate = WeightedAggregate::new(&[
    ("model_accuracy", 0.4),
    ("experiment_reproducibility", 0.3),
    ("successful_deployments", 0.3),
]);

pub const AUDIT_READINESS: WeightedAggregate = WeightedAggregate::new(&[
    ("policy_compliance_x", 0.35),
    ("policy_compliance_y", 0.35),
    ("report_submission_punctuality", 0.3),
]);

pub const REGRESSION_PASS_RATE: WeightedAggregate =
    WeightedAggregate::new(&[("test_cases_executed", 0.6), ("bugs_reported", 0.4)]);

pub const SEO_IMPROVEMENT: WeightedAggregate = WeightedAggregate::new(&[
    ("content_delivery_timeliness", 0.4),
    ("social_engagement_rate", 0.3),
    ("leads_generated", 0.3),
]);

pub const VISUAL_CONSISTENCY: WeightedAggregate = WeightedAggregate::new(&[
    ("usability_test_score", 0.4),
    ("design_delivery_timeliness", 0.3),
    ("accessibility_score", 0.3),
]);

pub const DEFECT_LEAKAGE_SOURCES: &[&str] =
    &["bugs_reported", "test_cases_executed", "regression_pass_rate"];

/// Fewer escaped defects relative to testing effort scores higher.
pub fn defect_leakage_rate(ctx: &MetricContext<'_>) -> f64 {
    let bugs = ctx.number_or("bugs_reported", 1.0);
    let tested = ctx.number_or("test_cases_executed", 1.0);
    let passed = ctx.number_or("regression_pass_rate", 3.0);

    let denominator = bugs + 1.0;
    if denominator == 0.0 || !denominator.is_finite() {
        return NEUTRAL_SCORE;
    }
    let ratio = (tested + passed) / denominator;
    if !ratio.is_finite() {
        return NEUTRAL_SCORE;
    }
    5.0 - ratio.round_ties_even()
}
