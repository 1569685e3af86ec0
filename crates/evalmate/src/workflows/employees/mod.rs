//! Employee evaluation workflow.
//!
//! Raw records are ingested as incomplete, enriched by the ordered
//! derivation graph, scored by the promotion, attrition, and anomaly models,
//! and formatted into a stable report shape.

pub mod anomaly;
pub mod batch;
pub mod domain;
pub mod feedback;
pub mod formatter;
pub mod models;
pub mod repository;
pub mod roles;
pub mod router;
pub mod schema;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use anomaly::{
    AnomalyExplainer, AnomalyReasonRule, AnomalyVerdict, Comparator, ANOMALY_RULES, NO_ANOMALY,
    UNUSUAL_PATTERN,
};
pub use batch::{derive_dataset, derive_file, BatchError, BatchSummary, DatasetTable};
pub use domain::{EmployeeId, EmployeeRecord, FieldMap, FieldValue, RecordState};
pub use feedback::{
    compose_feedback, summarize_feedback, ExtractiveSummarizer, FeedbackSummarizer, SummaryError,
    NO_FEEDBACK,
};
pub use formatter::{
    attrition_tier, promotion_tier, AnomalyView, AttritionView, EvaluationReport, PromotionView,
    ScoreTier,
};
pub use models::{
    builtin_models, load_models, AnomalyFlag, AnomalyModel, ArtifactError, AttritionModel,
    FeatureVector, ModelError, ModelHandle, ModelInferenceError, ModelKind, PromotionModel,
};
pub use repository::{EmployeeRepository, EmployeeStatusView, RepositoryError};
pub use roles::{KpiDefinition, RoleKpiRegistry, RoleKpis, GENERIC_KPIS};
pub use router::employee_router;
pub use schema::{RawSchema, DEFAULT_READINESS_FIELD};
pub use scoring::{
    ConfigurationError, DerivationGraph, DerivedMetricSpec, FixedSentiment, LexiconSentiment,
    MetricScale, SentimentScorer,
};
pub use service::{EmployeeEvaluationService, EvaluationError};
