use std::collections::BTreeSet;

/// Field whose absence makes a record unfit for scoring.
pub const DEFAULT_READINESS_FIELD: &str = "tenure_in_current_role";

pub const IDENTITY_FIELDS: &[&str] = &["employee_id", "name"];

pub const CATEGORICAL_FIELDS: &[&str] = &[
    "department",
    "designation",
    "work_location",
    "reporting_manager",
    "employment_type",
];

pub const DATE_FIELDS: &[&str] = &["date_of_joining"];

/// Free-text feedback fields with the label used when composing summaries.
pub const FEEDBACK_FIELDS: &[(&str, &str)] = &[
    ("manager_comments", "Manager Comments"),
    ("hr_notes", "HR Notes"),
    ("peer_reviews", "Peer Reviews"),
    ("client_feedback", "Client Feedback"),
];

/// Raw numeric (or boolean-like) metrics supplied by uploads and manual entry.
/// Derived identifiers never appear here.
pub const NUMERIC_FIELDS: &[&str] = &[
    // tenure and history
    "tenure_in_current_role",
    "past_roles_held",
    "total_experience",
    "total_experience_score",
    "internal_transfers",
    "promotions_achieved",
    "projects_handled",
    "score_delta",
    // effort
    "avg_hours_logged_vs_team",
    "task_completion_ratio",
    "active_workdays",
    "meeting_participation_rate",
    "report_submission_punctuality",
    // collaboration and communication
    "peer_review_rating",
    "manager_feedback",
    "conflict_resolution",
    "cross_team_coordination",
    "mentorship_participation",
    "client_communication",
    // adaptability
    "adaptability_to_change",
    "response_to_change",
    "initiative_in_projects",
    // integrity
    "policy_compliance",
    "policy_compliance_x",
    "policy_compliance_y",
    "ethics_confidentiality",
    "special_recognitions",
    "recognition_received",
    "hr_warnings",
    "peer_complaints",
    // skill development and contributions
    "certifications_completed",
    "online_courses_attended",
    "training_hours_logged",
    "knowledge_contributions",
    "hackathon_participation",
    "innovation_submissions",
    // engineering
    "sprint_velocity",
    "deployment_frequency",
    "code_quality",
    "test_cases_executed",
    "bugs_reported",
    "automation_coverage",
    "model_accuracy",
    "experiment_reproducibility",
    "tech_debt_reduction",
    "uptime_percentage",
    "mttr",
    "successful_deployments",
    "cicd_pipeline_efficiency",
    "incident_response_time",
    "reports_delivered",
    "insight_accuracy",
    "query_efficiency",
    "dashboard_usage_rate",
    "data_quality_score",
    // people operations
    "positions_filled",
    "onboarding_satisfaction",
    "training_sessions_delivered",
    "employee_engagement_score",
    // sales
    "conversion_rate",
    "revenue_generated",
    "upsell_opportunities_closed",
    "client_retention_rate",
    "crm_followup_consistency",
    // marketing
    "campaign_reach",
    "leads_generated",
    "social_engagement_rate",
    "content_delivery_timeliness",
    // product and design
    "feature_delivery_timeliness",
    "roadmap_adherence",
    "sprint_success_rate",
    "stakeholder_ratings",
    "design_delivery_timeliness",
    "usability_test_score",
    "rework_count",
    "accessibility_score",
    // finance
    "budget_forecasting_accuracy",
    "variance_analysis_score",
    "report_timeliness",
    "cost_saving_suggestions",
    "financial_modeling_score",
    "ledger_accuracy",
    "compliance_adherence",
    "invoice_processing_efficiency",
    // generic role KPIs
    "goal_achievement_ratio",
    "quality_of_deliverables",
    "impact_on_org_team_goals",
    "deadlines_met",
    "stakeholder_satisfaction",
];

/// Closed set of raw field names the derivation graph may read.
#[derive(Debug, Clone)]
pub struct RawSchema {
    fields: BTreeSet<&'static str>,
}

impl RawSchema {
    pub fn standard() -> Self {
        let fields = IDENTITY_FIELDS
            .iter()
            .chain(CATEGORICAL_FIELDS)
            .chain(DATE_FIELDS)
            .chain(NUMERIC_FIELDS)
            .copied()
            .chain(FEEDBACK_FIELDS.iter().map(|(field, _)| *field))
            .collect();
        Self { fields }
    }

    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().copied()
    }
}

impl Default for RawSchema {
    fn default() -> Self {
        Self::standard()
    }
}
