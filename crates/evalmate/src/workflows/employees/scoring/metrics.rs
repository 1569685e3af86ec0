//! Pure per-employee metric functions. Each reads raw fields and any metric
//! evaluated earlier in the pipeline, and never fails: unusable inputs fall
//! back to the documented defaults.

use super::super::domain::FieldMap;
use super::super::roles::RoleKpiRegistry;
use super::aggregate::{weighted_mean, WeightedAggregate, NEUTRAL_SCORE};
use super::sentiment::{sentiment_bucket, SentimentScorer};

/// Read-only view a metric function evaluates against.
pub struct MetricContext<'a> {
    fields: &'a FieldMap,
    sentiment: &'a dyn SentimentScorer,
    roles: &'a RoleKpiRegistry,
}

impl<'a> MetricContext<'a> {
    pub fn new(
        fields: &'a FieldMap,
        sentiment: &'a dyn SentimentScorer,
        roles: &'a RoleKpiRegistry,
    ) -> Self {
        Self {
            fields,
            sentiment,
            roles,
        }
    }

    pub fn fields(&self) -> &FieldMap {
        self.fields
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(|value| value.as_number())
    }

    pub fn number_or(&self, field: &str, default: f64) -> f64 {
        self.number(field).unwrap_or(default)
    }

    pub fn truthy(&self, field: &str) -> bool {
        self.fields
            .get(field)
            .map(|value| value.is_truthy())
            .unwrap_or(false)
    }

    /// Trimmed text, or an empty string when the field is absent or not text.
    pub fn text(&self, field: &str) -> &str {
        self.fields
            .get(field)
            .and_then(|value| value.as_text())
            .map(str::trim)
            .unwrap_or("")
    }

    pub fn polarity(&self, field: &str) -> f64 {
        self.sentiment.score(self.text(field))
    }

    pub fn weighted(&self, aggregate: &WeightedAggregate) -> f64 {
        aggregate.score(self.fields)
    }

    pub fn roles(&self) -> &RoleKpiRegistry {
        self.roles
    }
}

pub const COMMUNICATION_EFFECTIVENESS: WeightedAggregate = WeightedAggregate::new(&[
    ("peer_review_rating", 0.4),
    ("manager_feedback", 0.3),
    ("conflict_resolution", 0.3),
]);

pub const RESPONSIVENESS: WeightedAggregate = WeightedAggregate::new(&[
    ("communication_effectiveness", 0.5),
    ("report_submission_punctuality", 0.25),
    ("meeting_participation_rate", 0.25),
]);

pub const MEETING_PARTICIPATION: WeightedAggregate = WeightedAggregate::new(&[
    ("meeting_participation_rate", 0.6),
    ("communication_effectiveness", 0.4),
]);

pub const EFFORT_ENGAGEMENT: WeightedAggregate = WeightedAggregate::new(&[
    ("active_workdays", 0.25),
    ("task_completion_ratio", 0.35),
    ("meeting_participation", 0.2),
    ("responsiveness", 0.2),
]);

pub const ADAPTABILITY_GROWTH: WeightedAggregate = WeightedAggregate::new(&[
    ("adaptability_to_change", 0.4),
    ("response_to_change", 0.3),
    ("initiative_in_projects", 0.3),
]);

pub const COLLABORATION_COMMUNICATION: WeightedAggregate = WeightedAggregate::new(&[
    ("communication_effectiveness", 0.3),
    ("peer_review_rating", 0.3),
    ("conflict_resolution", 0.2),
    ("cross_team_coordination", 0.2),
]);

pub const LEADERSHIP: WeightedAggregate = WeightedAggregate::new(&[
    ("initiative_in_projects", 0.4),
    ("task_ownership", 0.3),
    ("communication_effectiveness", 0.3),
]);

/// The six category scores; weights sum to 1.0.
pub const OVERALL_WEIGHTED: WeightedAggregate = WeightedAggregate::new(&[
    ("effort_engagement_score", 0.2),
    ("collaboration_communication_score", 0.2),
    ("adaptability_growth_score", 0.15),
    ("integrity_feedback_score", 0.15),
    ("historical_progress_score", 0.15),
    ("leadership_score", 0.15),
]);

pub const PROMOTION_BLEND: WeightedAggregate = WeightedAggregate::new(&[
    ("effort_engagement_score", 0.3),
    ("overall_weighted_score", 0.5),
    ("task_ownership", 0.2),
]);

pub const SKILL_DEVELOPMENT: WeightedAggregate = WeightedAggregate::new(&[
    ("certifications_completed", 0.4),
    ("online_courses_attended", 0.3),
    ("training_hours_logged", 0.3),
]);

pub const WORK_QUALITY_CONSISTENCY: WeightedAggregate =
    WeightedAggregate::new(&[("code_quality", 0.5), ("peer_review_rating", 0.5)]);

pub const ADHERENCE_TO_DEADLINES: WeightedAggregate =
    WeightedAggregate::new(&[("roadmap_adherence", 0.6), ("report_timeliness", 0.4)]);

pub const INTEGRITY_SOURCES: &[&str] = &[
    "policy_compliance_x",
    "policy_compliance_y",
    "policy_compliance",
    "ethics_confidentiality",
];

/// Policy compliance arrives under three names depending on the upload; the
/// first usable one wins.
pub fn integrity_feedback_score(ctx: &MetricContext<'_>) -> f64 {
    let policy = ["policy_compliance_x", "policy_compliance_y", "policy_compliance"]
        .iter()
        .find_map(|field| ctx.number(field));
    weighted_mean([
        (policy, 0.7),
        (ctx.number("ethics_confidentiality"), 0.3),
    ])
    .unwrap_or(NEUTRAL_SCORE)
}

pub const HISTORICAL_SOURCES: &[&str] = &["score_delta", "past_roles_held", "promotions_achieved"];

pub fn historical_progress_score(ctx: &MetricContext<'_>) -> f64 {
    weighted_mean([
        (ctx.number("score_delta"), 0.4),
        (past_roles_count(ctx), 0.3),
        (ctx.number("promotions_achieved"), 0.3),
    ])
    .unwrap_or(NEUTRAL_SCORE)
}

/// `past_roles_held` is either a count or a comma-separated list of titles.
fn past_roles_count(ctx: &MetricContext<'_>) -> Option<f64> {
    if let Some(count) = ctx.number("past_roles_held") {
        return Some(count);
    }
    let listed = ctx
        .text("past_roles_held")
        .split(',')
        .filter(|role| !role.trim().is_empty())
        .count();
    (listed > 0).then_some(listed as f64)
}

pub const TASK_OWNERSHIP_SOURCES: &[&str] = &["initiative_in_projects", "score_delta"];

pub fn task_ownership(ctx: &MetricContext<'_>) -> f64 {
    let initiative = ctx.number_or("initiative_in_projects", 3.0);
    let delta = ctx.number_or("score_delta", 0.0);

    if initiative >= 4.0 && delta >= 0.5 {
        5.0
    } else if initiative >= 3.5 {
        4.0
    } else if initiative >= 2.5 {
        3.0
    } else if initiative >= 1.5 {
        2.0
    } else {
        1.0
    }
}

pub const BURNOUT_SOURCES: &[&str] = &[
    "avg_hours_logged_vs_team",
    "effort_engagement_score",
    "peer_reviews",
];

/// Long hours, low engagement, and negative peer sentiment all push toward 5.
pub fn burnout_risk(ctx: &MetricContext<'_>) -> f64 {
    let hours = ctx.number_or("avg_hours_logged_vs_team", 3.0);
    let effort = ctx.number_or("effort_engagement_score", 3.0);
    let sentiment = sentiment_bucket(ctx.polarity("peer_reviews"));

    0.4 * hours + 0.3 * (6.0 - effort) + 0.3 * sentiment
}

pub const VOLUNTARY_SOURCES: &[&str] = &[
    "hackathon_participation",
    "innovation_submissions",
    "knowledge_contributions",
];

pub fn voluntary_contributions(ctx: &MetricContext<'_>) -> f64 {
    let indicators = VOLUNTARY_SOURCES
        .iter()
        .filter(|field| ctx.truthy(field))
        .count();
    ((indicators + 1) as f64).min(5.0)
}

pub const STRESS_SOURCES: &[&str] = &["burnout_risk"];

pub fn stress_load_tolerance(ctx: &MetricContext<'_>) -> f64 {
    6.0 - ctx.number_or("burnout_risk", 3.0)
}

pub const PROMOTION_SOURCES: &[&str] = &[
    "effort_engagement_score",
    "overall_weighted_score",
    "task_ownership",
    "score_delta",
    "promotions_achieved",
];

/// Employees with a prior promotion clear a lower bar than first-time candidates.
pub fn promotion_recommendation(ctx: &MetricContext<'_>) -> f64 {
    let score = ctx.weighted(&PROMOTION_BLEND);
    let delta = ctx.number_or("score_delta", 0.0);
    let promotions = ctx.number_or("promotions_achieved", 0.0).trunc();

    let recommended = if promotions >= 1.0 {
        score >= 3.0 && delta >= 0.0
    } else {
        score >= 4.0 && delta >= 0.3
    };
    if recommended {
        1.0
    } else {
        0.0
    }
}

pub const RETENTION_SOURCES: &[&str] = &["burnout_risk", "tenure_in_current_role", "peer_reviews"];

pub fn retention_suggestion(ctx: &MetricContext<'_>) -> f64 {
    let burnout = ctx.number_or("burnout_risk", 0.0);
    let tenure = ctx.number_or("tenure_in_current_role", 10.0);
    let at_risk = burnout >= 4.0 && tenure < 2.0 && ctx.polarity("peer_reviews") < 0.0;
    if at_risk {
        1.0
    } else {
        0.0
    }
}

pub const ROLE_KPI_SCORE_SOURCES: &[&str] = &["designation"];

/// Plain mean of whichever of the designation's KPIs carry a value.
pub fn role_specific_kpi_score(ctx: &MetricContext<'_>) -> f64 {
    let designation = Some(ctx.text("designation")).filter(|text| !text.is_empty());
    let values: Vec<f64> = ctx
        .roles()
        .kpis_for(designation)
        .iter()
        .filter_map(|kpi| ctx.number(kpi.id))
        .collect();

    if values.is_empty() {
        return NEUTRAL_SCORE;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::employees::domain::FieldValue;
    use crate::workflows::employees::scoring::sentiment::FixedSentiment;

    fn fields(entries: &[(&str, f64)]) -> FieldMap {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), FieldValue::Number(*value)))
            .collect()
    }

    fn eval(metric: fn(&MetricContext<'_>) -> f64, record: &FieldMap, polarity: f64) -> f64 {
        let sentiment = FixedSentiment(polarity);
        let roles = RoleKpiRegistry::standard();
        metric(&MetricContext::new(record, &sentiment, &roles))
    }

    #[test]
    fn task_ownership_cascade() {
        let top = fields(&[("initiative_in_projects", 4.0), ("score_delta", 0.5)]);
        assert_eq!(eval(task_ownership, &top, 0.0), 5.0);

        let flat = fields(&[("initiative_in_projects", 4.0), ("score_delta", 0.4)]);
        assert_eq!(eval(task_ownership, &flat, 0.0), 4.0);

        let low = fields(&[("initiative_in_projects", 1.0), ("score_delta", 0.0)]);
        assert_eq!(eval(task_ownership, &low, 0.0), 1.0);

        assert_eq!(eval(task_ownership, &FieldMap::new(), 0.0), 3.0);
    }

    #[test]
    fn first_promotion_needs_the_higher_bar() {
        let at_bar = fields(&[
            ("effort_engagement_score", 4.0),
            ("overall_weighted_score", 4.0),
            ("task_ownership", 4.0),
            ("score_delta", 0.3),
            ("promotions_achieved", 0.0),
        ]);
        assert_eq!(eval(promotion_recommendation, &at_bar, 0.0), 1.0);

        let below = fields(&[
            ("effort_engagement_score", 3.9),
            ("overall_weighted_score", 3.9),
            ("task_ownership", 3.9),
            ("score_delta", 0.3),
            ("promotions_achieved", 0.0),
        ]);
        assert_eq!(eval(promotion_recommendation, &below, 0.0), 0.0);
    }

    #[test]
    fn prior_promotion_lowers_the_bar() {
        let record = fields(&[
            ("effort_engagement_score", 3.0),
            ("overall_weighted_score", 3.0),
            ("task_ownership", 3.0),
            ("score_delta", 0.0),
            ("promotions_achieved", 1.0),
        ]);
        assert_eq!(eval(promotion_recommendation, &record, 0.0), 1.0);
    }

    #[test]
    fn burnout_blends_hours_engagement_and_sentiment() {
        let record = fields(&[
            ("avg_hours_logged_vs_team", 5.0),
            ("effort_engagement_score", 1.0),
        ]);
        // 0.4 * 5 + 0.3 * 5 + 0.3 * 5
        assert!((eval(burnout_risk, &record, -0.9) - 5.0).abs() < 1e-9);
        // 0.4 * 5 + 0.3 * 5 + 0.3 * 1
        assert!((eval(burnout_risk, &record, 0.9) - 3.8).abs() < 1e-9);
    }

    #[test]
    fn retention_requires_all_three_signals() {
        let record = fields(&[("burnout_risk", 4.0), ("tenure_in_current_role", 1.0)]);
        assert_eq!(eval(retention_suggestion, &record, -0.2), 1.0);
        assert_eq!(eval(retention_suggestion, &record, 0.0), 0.0);

        let seasoned = fields(&[("burnout_risk", 5.0), ("tenure_in_current_role", 2.0)]);
        assert_eq!(eval(retention_suggestion, &seasoned, -0.8), 0.0);
    }

    #[test]
    fn voluntary_contributions_counts_indicators() {
        let mut record = fields(&[("hackathon_participation", 2.0)]);
        record.insert(
            "innovation_submissions".to_string(),
            FieldValue::Text("Patent draft".to_string()),
        );
        record.insert(
            "knowledge_contributions".to_string(),
            FieldValue::Text("".to_string()),
        );
        assert_eq!(eval(voluntary_contributions, &record, 0.0), 3.0);
        assert_eq!(eval(voluntary_contributions, &FieldMap::new(), 0.0), 1.0);
    }

    #[test]
    fn historical_progress_counts_listed_roles() {
        let mut record = fields(&[("score_delta", 1.0), ("promotions_achieved", 2.0)]);
        record.insert(
            "past_roles_held".to_string(),
            FieldValue::Text("Intern, Analyst, Senior Analyst".to_string()),
        );
        // (1 * 0.4 + 3 * 0.3 + 2 * 0.3) / 1.0
        assert!((eval(historical_progress_score, &record, 0.0) - 1.9).abs() < 1e-9);
        assert_eq!(eval(historical_progress_score, &FieldMap::new(), 0.0), NEUTRAL_SCORE);
    }

    #[test]
    fn integrity_prefers_first_policy_field() {
        let record = fields(&[
            ("policy_compliance_y", 1.0),
            ("policy_compliance", 5.0),
            ("ethics_confidentiality", 4.0),
        ]);
        // (1 * 0.7 + 4 * 0.3)
        assert!((eval(integrity_feedback_score, &record, 0.0) - 1.9).abs() < 1e-9);
    }

    #[test]
    fn role_kpi_score_averages_present_kpis() {
        let mut record = fields(&[("mttr", 2.0), ("uptime_percentage", 5.0)]);
        record.insert(
            "designation".to_string(),
            FieldValue::Text("DevOps Engineer".to_string()),
        );
        assert_eq!(eval(role_specific_kpi_score, &record, 0.0), 3.5);

        let generic = fields(&[("deadlines_met", 4.0)]);
        assert_eq!(eval(role_specific_kpi_score, &generic, 0.0), 4.0);
    }
}
