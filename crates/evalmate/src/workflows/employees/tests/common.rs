use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::employees::domain::{EmployeeId, EmployeeRecord, FieldValue};
use crate::workflows::employees::feedback::{FeedbackSummarizer, SummaryError};
use crate::workflows::employees::models::{
    builtin_models, FeatureVector, LinearClassifier, ModelError, ModelHandle, PromotionModel,
    ZScoreDetector,
};
use crate::workflows::employees::repository::{EmployeeRepository, RepositoryError};
use crate::workflows::employees::scoring::{DerivationGraph, FixedSentiment};
use crate::workflows::employees::service::EmployeeEvaluationService;

pub(super) fn graph_with(polarity: f64) -> DerivationGraph {
    DerivationGraph::standard(Arc::new(FixedSentiment(polarity))).expect("standard graph")
}

pub(super) fn graph() -> DerivationGraph {
    graph_with(0.5)
}

/// Software developer scoring 4 on most raw inputs.
pub(super) fn steady_developer() -> EmployeeRecord {
    let mut record = EmployeeRecord::new("EMP0001")
        .with_text("employee_id", "EMP0001")
        .with_text("name", "Asha Rao")
        .with_text("department", "Engineering")
        .with_text("designation", "Software Developer")
        .with_number("tenure_in_current_role", 3.0)
        .with_number("score_delta", 1.0)
        .with_number("past_roles_held", 2.0)
        .with_number("promotions_achieved", 1.0)
        .with_number("avg_hours_logged_vs_team", 3.0)
        .with_number("peer_complaints", 0.0)
        .with_number("hr_warnings", 0.0)
        .with_number("hackathon_participation", 1.0)
        .with_text("peer_reviews", "Great collaborator and reliable.")
        .with_text("manager_comments", "Consistently delivers.");
    for field in [
        "peer_review_rating",
        "manager_feedback",
        "conflict_resolution",
        "report_submission_punctuality",
        "meeting_participation_rate",
        "active_workdays",
        "task_completion_ratio",
        "adaptability_to_change",
        "response_to_change",
        "initiative_in_projects",
        "cross_team_coordination",
        "policy_compliance",
        "ethics_confidentiality",
        "certifications_completed",
        "online_courses_attended",
        "training_hours_logged",
        "code_quality",
        "sprint_velocity",
        "deployment_frequency",
        "feature_delivery_timeliness",
        "bugs_reported",
    ] {
        record = record.with_number(field, 4.0);
    }
    record
}

/// Disengaged, overworked employee with repeated peer complaints.
pub(super) fn struggling_analyst() -> EmployeeRecord {
    let mut record = EmployeeRecord::new("EMP0002")
        .with_text("name", "Ben Ortiz")
        .with_text("department", "Analytics")
        .with_text("designation", "Data Analyst")
        .with_number("tenure_in_current_role", 1.0)
        .with_number("score_delta", -0.5)
        .with_number("avg_hours_logged_vs_team", 5.0)
        .with_number("peer_complaints", 4.0)
        .with_text("hr_warnings", "No")
        .with_text("peer_reviews", "Often rude and unreliable.");
    for field in [
        "peer_review_rating",
        "manager_feedback",
        "conflict_resolution",
        "report_submission_punctuality",
        "meeting_participation_rate",
        "active_workdays",
        "task_completion_ratio",
    ] {
        record = record.with_number(field, 1.0);
    }
    record
}

pub(super) fn build_service_with(
    polarity: f64,
    models: ModelHandle,
) -> (
    EmployeeEvaluationService<MemoryRepository, EchoSummarizer>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = EmployeeEvaluationService::new(
        repository.clone(),
        Arc::new(EchoSummarizer),
        Arc::new(graph_with(polarity)),
        models,
    );
    (service, repository)
}

pub(super) fn build_service() -> (
    EmployeeEvaluationService<MemoryRepository, EchoSummarizer>,
    Arc<MemoryRepository>,
) {
    build_service_with(0.5, builtin_models())
}

pub(super) fn number(record: &EmployeeRecord, field: &str) -> Option<f64> {
    record.get(field).and_then(FieldValue::as_number)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<EmployeeId, EmployeeRecord>>>,
}

impl MemoryRepository {
    pub(super) fn stored(&self, id: &str) -> Option<EmployeeRecord> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(&EmployeeId(id.to_string()))
            .cloned()
    }
}

impl EmployeeRepository for MemoryRepository {
    fn insert(&self, record: EmployeeRecord) -> Result<EmployeeRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.employee_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.employee_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: EmployeeRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.employee_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &EmployeeId) -> Result<Option<EmployeeRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self, limit: usize) -> Result<Vec<EmployeeRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().take(limit).cloned().collect())
    }

    fn delete(&self, id: &EmployeeId) -> Result<bool, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.remove(id).is_some())
    }
}

pub(super) struct UnavailableRepository;

impl EmployeeRepository for UnavailableRepository {
    fn insert(&self, _record: EmployeeRecord) -> Result<EmployeeRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: EmployeeRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &EmployeeId) -> Result<Option<EmployeeRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _limit: usize) -> Result<Vec<EmployeeRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &EmployeeId) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Returns the composed feedback text unchanged.
pub(super) struct EchoSummarizer;

impl FeedbackSummarizer for EchoSummarizer {
    fn summarize(&self, text: &str) -> Result<String, SummaryError> {
        Ok(text.to_string())
    }
}

pub(super) struct BrokenPromotion;

impl PromotionModel for BrokenPromotion {
    fn features(&self) -> &[String] {
        &[]
    }

    fn predict(&self, _input: &FeatureVector) -> Result<f64, ModelError> {
        Err(ModelError::NonFinite)
    }
}

pub(super) fn models_with_broken_promotion() -> ModelHandle {
    let attrition = LinearClassifier {
        features: vec!["burnout_risk".to_string()],
        classes: vec!["Low".to_string()],
        weights: vec![vec![0.0]],
        intercepts: vec![0.0],
    };
    let anomaly = ZScoreDetector {
        features: vec!["burnout_risk".to_string()],
        means: vec![3.0],
        std_devs: vec![1.0],
        threshold: 3.0,
    };
    ModelHandle::new(
        Arc::new(BrokenPromotion),
        Arc::new(attrition),
        Arc::new(anomaly),
    )
}

pub(super) async fn json_body(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let payload = serde_json::from_slice(&body).expect("json payload");
    (status, payload)
}
