use serde::Serialize;

/// A KPI identifier and the label shown next to its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KpiDefinition {
    pub id: &'static str,
    pub label: &'static str,
}

const fn kpi(id: &'static str, label: &'static str) -> KpiDefinition {
    KpiDefinition { id, label }
}

/// The five KPIs that apply to one job designation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleKpis {
    pub designation: &'static str,
    pub kpis: [KpiDefinition; 5],
}

pub const ROLE_KPIS: &[RoleKpis] = &[
    RoleKpis {
        designation: "Software Developer",
        kpis: [
            kpi("code_commits", "Code Commits"),
            kpi("bug_fix_count", "Bug Fix Count"),
            kpi("sprint_velocity", "Sprint Velocity"),
            kpi("deployment_frequency", "Deployment Frequency"),
            kpi("code_quality", "Code Quality"),
        ],
    },
    RoleKpis {
        designation: "QA Tester",
        kpis: [
            kpi("test_cases_executed", "Test Cases Executed"),
            kpi("bugs_reported", "Bugs Reported"),
            kpi("automation_coverage", "Automation Coverage"),
            kpi("regression_pass_rate", "Regression Pass %"),
            kpi("defect_leakage_rate", "Defect Leakage Rate"),
        ],
    },
    RoleKpis {
        designation: "HR Executive",
        kpis: [
            kpi("positions_filled", "Positions Filled"),
            kpi("onboarding_satisfaction", "Onboarding Satisfaction"),
            kpi("training_sessions_delivered", "Training Sessions Delivered"),
            kpi("employee_engagement_score", "Employee Engagement Score"),
            kpi("policy_compliance", "Policy Compliance"),
        ],
    },
    RoleKpis {
        designation: "Sales Executive",
        kpis: [
            kpi("conversion_rate", "Conversion Rate"),
            kpi("revenue_generated", "Revenue Generated"),
            kpi("upsell_opportunities_closed", "Upsell Opportunities Closed"),
            kpi("client_retention_rate", "Client Retention Rate"),
            kpi("crm_followup_consistency", "CRM Follow-Up Consistency"),
        ],
    },
    RoleKpis {
        designation: "Marketing Specialist",
        kpis: [
            kpi("campaign_reach", "Campaign Reach"),
            kpi("leads_generated", "Leads Generated"),
            kpi("social_engagement_rate", "Social Engagement Rate"),
            kpi("seo_improvement", "SEO Improvement"),
            kpi("content_delivery_timeliness", "Content Delivery Timeliness"),
        ],
    },
    RoleKpis {
        designation: "Product Manager",
        kpis: [
            kpi("feature_delivery_timeliness", "Feature Delivery Timeliness"),
            kpi("roadmap_adherence", "Roadmap Adherence"),
            kpi("cross_team_coordination", "Cross-Team Coordination"),
            kpi("sprint_success_rate", "Sprint Success Rate"),
            kpi("stakeholder_ratings", "Stakeholder Ratings"),
        ],
    },
    RoleKpis {
        designation: "UI/UX Designer",
        kpis: [
            kpi("design_delivery_timeliness", "Design Delivery Timeliness"),
            kpi("usability_test_score", "Usability Test Score"),
            kpi("rework_count", "Rework Count"),
            kpi("visual_consistency", "Visual Consistency"),
            kpi("accessibility_score", "Accessibility Score"),
        ],
    },
    RoleKpis {
        designation: "DevOps Engineer",
        kpis: [
            kpi("uptime_percentage", "Uptime %"),
            kpi("mttr", "MTTR"),
            kpi("successful_deployments", "Successful Deployments"),
            kpi("cicd_pipeline_efficiency", "CI/CD Pipeline Efficiency"),
            kpi("incident_response_time", "Incident Response Time"),
        ],
    },
    RoleKpis {
        designation: "Data Analyst",
        kpis: [
            kpi("reports_delivered", "Reports Delivered"),
            kpi("insight_accuracy", "Insight Accuracy"),
            kpi("query_efficiency", "Query Efficiency"),
            kpi("dashboard_usage_rate", "Dashboard Usage Rate"),
            kpi("data_quality_score", "Data Quality Score"),
        ],
    },
    RoleKpis {
        designation: "AI/ML Engineer",
        kpis: [
            kpi("model_accuracy", "Model Accuracy"),
            kpi("feature_engineering", "Feature Engineering"),
            kpi("experiment_reproducibility", "Experiment Reproducibility"),
            kpi("model_deployment_count", "Model Deployment Count"),
            kpi("tech_debt_reduction", "Tech Debt Reduction"),
        ],
    },
    RoleKpis {
        designation: "Financial Analyst",
        kpis: [
            kpi("budget_forecasting_accuracy", "Budget Forecasting Accuracy"),
            kpi("variance_analysis_score", "Variance Analysis Score"),
            kpi("report_timeliness", "Report Timeliness"),
            kpi("cost_saving_suggestions", "Cost Saving Suggestions"),
            kpi("financial_modeling_score", "Financial Modeling Score"),
        ],
    },
    RoleKpis {
        designation: "Accountant",
        kpis: [
            kpi("ledger_accuracy", "Ledger Accuracy"),
            kpi("compliance_adherence", "Compliance Adherence"),
            kpi("invoice_processing_efficiency", "Invoice Processing Efficiency"),
            kpi("audit_readiness_score", "Audit Readiness Score"),
            kpi("report_submission_punctuality", "Report Submission Punctuality"),
        ],
    },
];

/// Applied to any designation the registry does not know.
pub static GENERIC_KPIS: [KpiDefinition; 5] = [
    kpi("goal_achievement_ratio", "Goal Achievement Ratio"),
    kpi("quality_of_deliverables", "Quality of Deliverables"),
    kpi("impact_on_org_team_goals", "Impact on Org/Team Goals"),
    kpi("deadlines_met", "Deadlines Met"),
    kpi("stakeholder_satisfaction", "Stakeholder Satisfaction"),
];

/// Canonical designation → KPI table.
#[derive(Debug, Clone)]
pub struct RoleKpiRegistry {
    roles: Vec<RoleKpis>,
}

impl RoleKpiRegistry {
    pub fn standard() -> Self {
        Self::new(ROLE_KPIS.to_vec())
    }

    pub fn new(roles: Vec<RoleKpis>) -> Self {
        Self { roles }
    }

    pub fn roles(&self) -> impl Iterator<Item = &RoleKpis> {
        self.roles.iter()
    }

    pub fn lookup(&self, designation: &str) -> Option<&RoleKpis> {
        let designation = designation.trim();
        self.roles
            .iter()
            .find(|role| role.designation.eq_ignore_ascii_case(designation))
    }

    /// KPIs for the designation, or the generic set when it is unknown or missing.
    pub fn kpis_for(&self, designation: Option<&str>) -> &[KpiDefinition] {
        designation
            .and_then(|designation| self.lookup(designation))
            .map(|role| role.kpis.as_slice())
            .unwrap_or(GENERIC_KPIS.as_slice())
    }

    pub fn kpi_ids_for(&self, designation: Option<&str>) -> Vec<&'static str> {
        self.kpis_for(designation).iter().map(|kpi| kpi.id).collect()
    }

    pub fn owning_roles(&self, kpi_id: &str) -> Vec<&'static str> {
        self.roles
            .iter()
            .filter(|role| role.kpis.iter().any(|kpi| kpi.id == kpi_id))
            .map(|role| role.designation)
            .collect()
    }

    /// Whether a KPI should be computed for this designation. KPIs no role
    /// owns apply to everyone.
    pub fn applies(&self, kpi_id: &str, designation: Option<&str>) -> bool {
        let owners = self.owning_roles(kpi_id);
        if owners.is_empty() {
            return true;
        }
        match designation.map(str::trim) {
            Some(designation) => owners
                .iter()
                .any(|owner| owner.eq_ignore_ascii_case(designation)),
            None => false,
        }
    }

    pub fn label(&self, kpi_id: &str) -> Option<&'static str> {
        self.roles
            .iter()
            .flat_map(|role| role.kpis.iter())
            .chain(GENERIC_KPIS.iter())
            .find(|kpi| kpi.id == kpi_id)
            .map(|kpi| kpi.label)
    }

    /// Whether any role, or the generic set, lists this KPI.
    pub fn is_kpi(&self, kpi_id: &str) -> bool {
        self.all_kpi_ids().any(|(_, id)| id == kpi_id)
    }

    /// Every KPI identifier referenced by the table, generic set included.
    pub fn all_kpi_ids(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.roles
            .iter()
            .flat_map(|role| role.kpis.iter().map(move |kpi| (role.designation, kpi.id)))
            .chain(GENERIC_KPIS.iter().map(|kpi| ("(generic)", kpi.id)))
    }
}

impl Default for RoleKpiRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
