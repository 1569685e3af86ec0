use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use super::super::domain::{EmployeeRecord, FieldMap, FieldValue, RecordState};
use super::super::roles::RoleKpiRegistry;
use super::super::schema::RawSchema;
use super::aggregate::MetricScale::{self, Continuous, Flag, Ordinal};
use super::aggregate::WeightedAggregate;
use super::kpis;
use super::metrics::{self, MetricContext};
use super::sentiment::SentimentScorer;

pub type MetricFn = fn(&MetricContext<'_>) -> f64;

/// How a derived metric turns its sources into a raw value.
#[derive(Clone, Copy)]
pub enum Formula {
    Weighted(WeightedAggregate),
    Rule {
        sources: &'static [&'static str],
        compute: MetricFn,
    },
}

impl Formula {
    pub fn sources(&self) -> Vec<&'static str> {
        match self {
            Formula::Weighted(aggregate) => aggregate
                .components()
                .iter()
                .map(|(field, _)| *field)
                .collect(),
            Formula::Rule { sources, .. } => sources.to_vec(),
        }
    }

    fn evaluate(&self, ctx: &MetricContext<'_>) -> f64 {
        match self {
            Formula::Weighted(aggregate) => ctx.weighted(aggregate),
            Formula::Rule { compute, .. } => compute(ctx),
        }
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Weighted(aggregate) => f.debug_tuple("Weighted").field(aggregate).finish(),
            Formula::Rule { sources, .. } => {
                f.debug_struct("Rule").field("sources", sources).finish()
            }
        }
    }
}

/// One named step of the derivation pipeline.
#[derive(Debug, Clone, Copy)]
pub struct DerivedMetricSpec {
    pub id: &'static str,
    pub formula: Formula,
    pub scale: MetricScale,
}

impl DerivedMetricSpec {
    pub const fn weighted(id: &'static str, aggregate: WeightedAggregate, scale: MetricScale) -> Self {
        Self {
            id,
            formula: Formula::Weighted(aggregate),
            scale,
        }
    }

    pub const fn rule(
        id: &'static str,
        sources: &'static [&'static str],
        compute: MetricFn,
        scale: MetricScale,
    ) -> Self {
        Self {
            id,
            formula: Formula::Rule { sources, compute },
            scale,
        }
    }
}

/// Declared evaluation order. Every step reads only raw fields and steps
/// listed above it; role KPIs follow the core catalogue and the role score
/// closes the pipeline.
pub const STANDARD_PIPELINE: &[DerivedMetricSpec] = &[
    DerivedMetricSpec::weighted(
        "communication_effectiveness",
        metrics::COMMUNICATION_EFFECTIVENESS,
        Ordinal,
    ),
    DerivedMetricSpec::weighted("responsiveness", metrics::RESPONSIVENESS, Ordinal),
    DerivedMetricSpec::weighted("meeting_participation", metrics::MEETING_PARTICIPATION, Ordinal),
    DerivedMetricSpec::weighted("effort_engagement_score", metrics::EFFORT_ENGAGEMENT, Ordinal),
    DerivedMetricSpec::weighted(
        "adaptability_growth_score",
        metrics::ADAPTABILITY_GROWTH,
        Ordinal,
    ),
    DerivedMetricSpec::rule(
        "integrity_feedback_score",
        metrics::INTEGRITY_SOURCES,
        metrics::integrity_feedback_score,
        Ordinal,
    ),
    DerivedMetricSpec::rule(
        "historical_progress_score",
        metrics::HISTORICAL_SOURCES,
        metrics::historical_progress_score,
        Ordinal,
    ),
    DerivedMetricSpec::weighted(
        "collaboration_communication_score",
        metrics::COLLABORATION_COMMUNICATION,
        Ordinal,
    ),
    DerivedMetricSpec::rule(
        "task_ownership",
        metrics::TASK_OWNERSHIP_SOURCES,
        metrics::task_ownership,
        Ordinal,
    ),
    DerivedMetricSpec::weighted("leadership_score", metrics::LEADERSHIP, Ordinal),
    DerivedMetricSpec::weighted("overall_weighted_score", metrics::OVERALL_WEIGHTED, Continuous),
    DerivedMetricSpec::rule(
        "burnout_risk",
        metrics::BURNOUT_SOURCES,
        metrics::burnout_risk,
        Ordinal,
    ),
    DerivedMetricSpec::rule(
        "stress_load_tolerance",
        metrics::STRESS_SOURCES,
        metrics::stress_load_tolerance,
        Ordinal,
    ),
    DerivedMetricSpec::rule(
        "voluntary_contributions",
        metrics::VOLUNTARY_SOURCES,
        metrics::voluntary_contributions,
        Ordinal,
    ),
    DerivedMetricSpec::rule(
        "promotion_recommendation",
        metrics::PROMOTION_SOURCES,
        metrics::promotion_recommendation,
        Flag,
    ),
    DerivedMetricSpec::rule(
        "retention_suggestion",
        metrics::RETENTION_SOURCES,
        metrics::retention_suggestion,
        Flag,
    ),
    DerivedMetricSpec::weighted("skill_development_score", metrics::SKILL_DEVELOPMENT, Ordinal),
    DerivedMetricSpec::weighted(
        "work_quality_consistency",
        metrics::WORK_QUALITY_CONSISTENCY,
        Ordinal,
    ),
    DerivedMetricSpec::weighted(
        "adherence_to_deadlines",
        metrics::ADHERENCE_TO_DEADLINES,
        Ordinal,
    ),
    DerivedMetricSpec::weighted("code_commits", kpis::CODE_COMMITS, Ordinal),
    DerivedMetricSpec::weighted("bug_fix_count", kpis::BUG_FIX_COUNT, Ordinal),
    DerivedMetricSpec::weighted("feature_engineering", kpis::FEATURE_ENGINEERING, Ordinal),
    DerivedMetricSpec::weighted("model_deployment_count", kpis::MODEL_DEPLOYMENT_COUNT, Ordinal),
    DerivedMetricSpec::weighted("audit_readiness_score", kpis::AUDIT_READINESS, Ordinal),
    DerivedMetricSpec::weighted("regression_pass_rate", kpis::REGRESSION_PASS_RATE, Ordinal),
    DerivedMetricSpec::rule(
        "defect_leakage_rate",
        kpis::DEFECT_LEAKAGE_SOURCES,
        kpis::defect_leakage_rate,
        Ordinal,
    ),
    DerivedMetricSpec::weighted("seo_improvement", kpis::SEO_IMPROVEMENT, Ordinal),
    DerivedMetricSpec::weighted("visual_consistency", kpis::VISUAL_CONSISTENCY, Ordinal),
    DerivedMetricSpec::rule(
        "role_specific_kpi_score",
        metrics::ROLE_KPI_SCORE_SOURCES,
        metrics::role_specific_kpi_score,
        Continuous,
    ),
];

/// Pipeline definition problems, detected when the graph is built.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigurationError {
    #[error("derived metric `{0}` is declared more than once")]
    DuplicateMetric(String),
    #[error("derived metric `{0}` shadows a raw schema field")]
    ShadowsRawField(String),
    #[error("derived metric `{metric}` depends on itself")]
    Cycle { metric: String },
    #[error("derived metric `{metric}` reads `{source_field}` before it is computed")]
    ForwardReference {
        metric: String,
        source_field: String,
    },
    #[error("derived metric `{metric}` reads unknown field `{source_field}`")]
    UnknownSource {
        metric: String,
        source_field: String,
    },
    #[error("derived metric `{metric}` has invalid weight {weight} for `{source_field}`")]
    InvalidWeight {
        metric: String,
        source_field: String,
        weight: f64,
    },
    #[error("derived metric `{0}` declares no sources")]
    NoSources(String),
    #[error("role `{designation}` lists KPI `{kpi}` that is neither raw nor derived")]
    UnknownKpi { designation: String, kpi: String },
}

/// Validated, ordered derivation pipeline shared by single and bulk evaluation.
#[derive(Clone)]
pub struct DerivationGraph {
    steps: Vec<DerivedMetricSpec>,
    roles: RoleKpiRegistry,
    sentiment: Arc<dyn SentimentScorer>,
}

impl fmt::Debug for DerivationGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivationGraph")
            .field("steps", &self.order())
            .finish_non_exhaustive()
    }
}

impl DerivationGraph {
    pub fn standard(sentiment: Arc<dyn SentimentScorer>) -> Result<Self, ConfigurationError> {
        Self::new(
            STANDARD_PIPELINE.to_vec(),
            RoleKpiRegistry::standard(),
            &RawSchema::standard(),
            sentiment,
        )
    }

    pub fn new(
        steps: Vec<DerivedMetricSpec>,
        roles: RoleKpiRegistry,
        schema: &RawSchema,
        sentiment: Arc<dyn SentimentScorer>,
    ) -> Result<Self, ConfigurationError> {
        validate(&steps, &roles, schema)?;
        Ok(Self {
            steps,
            roles,
            sentiment,
        })
    }

    /// Step identifiers in evaluation order.
    pub fn order(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.id).collect()
    }

    pub fn is_derived(&self, field: &str) -> bool {
        self.steps.iter().any(|step| step.id == field)
    }

    pub fn roles(&self) -> &RoleKpiRegistry {
        &self.roles
    }

    pub fn sentiment(&self) -> &dyn SentimentScorer {
        self.sentiment.as_ref()
    }

    /// Whether only the engine may write this field. Role KPIs are the
    /// exception: a supplied value is kept and only filled in when absent.
    pub fn is_engine_owned(&self, field: &str) -> bool {
        self.is_derived(field) && !self.roles.is_kpi(field)
    }

    /// Enriched copy of the record's fields. Values the engine wrote on an
    /// earlier run are discarded first, so the result depends on supplied
    /// fields alone.
    pub fn derive(&self, record: &EmployeeRecord) -> FieldMap {
        self.derive_tracked(record).0
    }

    fn derive_tracked(&self, record: &EmployeeRecord) -> (FieldMap, BTreeSet<String>) {
        let mut working = record.fields.clone();
        for step in &self.steps {
            if record.is_engine_written(step.id) || self.is_engine_owned(step.id) {
                working.remove(step.id);
            }
        }
        let designation = record.designation().map(str::to_owned);

        let mut written = BTreeSet::new();
        let mut supplied = 0usize;
        for step in &self.steps {
            if working
                .get(step.id)
                .is_some_and(|value| !matches!(value, FieldValue::Null))
            {
                supplied += 1;
                continue;
            }
            if !self.roles.applies(step.id, designation.as_deref()) {
                continue;
            }
            let raw = {
                let ctx = MetricContext::new(&working, self.sentiment.as_ref(), &self.roles);
                step.formula.evaluate(&ctx)
            };
            working.insert(
                step.id.to_string(),
                FieldValue::Number(step.scale.settle(raw)),
            );
            written.insert(step.id.to_string());
        }

        debug!(
            employee_id = %record.employee_id,
            designation = designation.as_deref().unwrap_or("(none)"),
            computed = written.len(),
            supplied,
            "derived metrics computed"
        );
        (working, written)
    }

    /// Replaces the record's fields with the enriched set in one write.
    pub fn compute_all(&self, record: &mut EmployeeRecord) {
        let (fields, written) = self.derive_tracked(record);
        record.fields = fields;
        record.derived = written;
        record.state = RecordState::Evaluated;
    }

    /// Derives every record independently across the rayon pool.
    pub fn compute_batch(&self, records: &mut [EmployeeRecord]) {
        records
            .par_iter_mut()
            .for_each(|record| self.compute_all(record));
    }
}

fn validate(
    steps: &[DerivedMetricSpec],
    roles: &RoleKpiRegistry,
    schema: &RawSchema,
) -> Result<(), ConfigurationError> {
    let declared: HashSet<&str> = steps.iter().map(|step| step.id).collect();
    let mut seen: HashSet<&str> = HashSet::new();

    for step in steps {
        if schema.contains(step.id) {
            return Err(ConfigurationError::ShadowsRawField(step.id.to_string()));
        }

        let sources = step.formula.sources();
        if sources.is_empty() {
            return Err(ConfigurationError::NoSources(step.id.to_string()));
        }
        for source in sources {
            if source == step.id {
                return Err(ConfigurationError::Cycle {
                    metric: step.id.to_string(),
                });
            }
            if schema.contains(source) || seen.contains(source) {
                continue;
            }
            let metric = step.id.to_string();
            let source_field = source.to_string();
            return Err(if declared.contains(source) {
                ConfigurationError::ForwardReference {
                    metric,
                    source_field,
                }
            } else {
                ConfigurationError::UnknownSource {
                    metric,
                    source_field,
                }
            });
        }

        if let Formula::Weighted(aggregate) = step.formula {
            for (field, weight) in aggregate.components() {
                if !weight.is_finite() || *weight <= 0.0 {
                    return Err(ConfigurationError::InvalidWeight {
                        metric: step.id.to_string(),
                        source_field: field.to_string(),
                        weight: *weight,
                    });
                }
            }
        }

        if !seen.insert(step.id) {
            return Err(ConfigurationError::DuplicateMetric(step.id.to_string()));
        }
    }

    for (designation, kpi) in roles.all_kpi_ids() {
        if !schema.contains(kpi) && !declared.contains(kpi) {
            return Err(ConfigurationError::UnknownKpi {
                designation: designation.to_string(),
                kpi: kpi.to_string(),
            });
        }
    }
    Ok(())
}
