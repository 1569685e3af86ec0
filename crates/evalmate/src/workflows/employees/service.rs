use std::sync::Arc;

use tracing::info;

use super::anomaly::AnomalyExplainer;
use super::domain::{EmployeeId, EmployeeRecord, FieldMap, FieldValue, RecordState};
use super::feedback::{summarize_feedback, FeedbackSummarizer};
use super::formatter::{AnomalyView, AttritionView, EvaluationReport, PromotionView};
use super::models::{FeatureVector, ModelHandle, ModelInferenceError, ModelKind};
use super::repository::{EmployeeRepository, EmployeeStatusView, RepositoryError};
use super::schema::DEFAULT_READINESS_FIELD;
use super::scoring::DerivationGraph;

/// Service composing the derivation graph, trained models, and storage.
pub struct EmployeeEvaluationService<R, S> {
    repository: Arc<R>,
    summarizer: Arc<S>,
    graph: Arc<DerivationGraph>,
    models: ModelHandle,
    explainer: Arc<AnomalyExplainer>,
    readiness_field: String,
}

impl<R, S> EmployeeEvaluationService<R, S>
where
    R: EmployeeRepository + 'static,
    S: FeedbackSummarizer + 'static,
{
    pub fn new(
        repository: Arc<R>,
        summarizer: Arc<S>,
        graph: Arc<DerivationGraph>,
        models: ModelHandle,
    ) -> Self {
        Self {
            repository,
            summarizer,
            graph,
            models,
            explainer: Arc::new(AnomalyExplainer::standard()),
            readiness_field: DEFAULT_READINESS_FIELD.to_string(),
        }
    }

    pub fn with_readiness_field(mut self, field: impl Into<String>) -> Self {
        self.readiness_field = field.into();
        self
    }

    pub fn with_explainer(mut self, explainer: AnomalyExplainer) -> Self {
        self.explainer = Arc::new(explainer);
        self
    }

    pub fn graph(&self) -> &DerivationGraph {
        &self.graph
    }

    /// Store a raw record. It stays incomplete until evaluated, and any
    /// engine-owned metrics it carries are dropped.
    pub fn ingest(&self, mut record: EmployeeRecord) -> Result<EmployeeRecord, EvaluationError> {
        if record.employee_id.0.trim().is_empty() {
            return Err(EvaluationError::IncompleteRecord {
                employee_id: record.employee_id,
                field: "employee_id".to_string(),
            });
        }
        self.discard_derived(&mut record);
        let stored = self.repository.insert(record)?;
        info!(employee_id = %stored.employee_id, fields = stored.fields.len(), "employee record ingested");
        Ok(stored)
    }

    /// Merge raw inputs into a stored record. Null or blank values clear the
    /// field and `employee_id` is never changed. The record is incomplete
    /// again until the next evaluation.
    pub fn amend(
        &self,
        employee_id: &EmployeeId,
        changes: FieldMap,
    ) -> Result<EmployeeRecord, EvaluationError> {
        let mut record = self.get(employee_id)?;
        self.discard_derived(&mut record);

        let mut applied = 0usize;
        for (name, value) in changes {
            if name == "employee_id" || self.graph.is_engine_owned(&name) {
                continue;
            }
            let blank = match &value {
                FieldValue::Null => true,
                FieldValue::Text(text) => text.trim().is_empty(),
                _ => false,
            };
            if blank {
                record.fields.remove(&name);
            } else {
                record.fields.insert(name, value);
            }
            applied += 1;
        }

        self.repository.update(record.clone())?;
        info!(employee_id = %employee_id, applied, "employee record amended");
        Ok(record)
    }

    pub fn remove(&self, employee_id: &EmployeeId) -> Result<(), EvaluationError> {
        if !self.repository.delete(employee_id)? {
            return Err(EvaluationError::NotFound(employee_id.clone()));
        }
        info!(employee_id = %employee_id, "employee record removed");
        Ok(())
    }

    pub fn get(&self, employee_id: &EmployeeId) -> Result<EmployeeRecord, EvaluationError> {
        self.repository
            .fetch(employee_id)?
            .ok_or_else(|| EvaluationError::NotFound(employee_id.clone()))
    }

    /// Up to `limit` stored records, as sanitized status views.
    pub fn roster(&self, limit: usize) -> Result<Vec<EmployeeStatusView>, EvaluationError> {
        let records = self.repository.list(limit)?;
        Ok(records.iter().map(EmployeeRecord::status_view).collect())
    }

    /// Derive, score, and persist one stored record.
    pub fn evaluate(&self, employee_id: &EmployeeId) -> Result<EvaluationReport, EvaluationError> {
        let record = self.get(employee_id)?;
        let (enriched, report) = self.score_record(&record)?;
        self.repository.update(enriched)?;

        info!(
            employee_id = %employee_id,
            readiness = report.promotion.score,
            level = report.promotion.level,
            attrition = report.attrition.risk_level,
            anomaly = report.anomaly.anomaly_status,
            "employee evaluated"
        );
        Ok(report)
    }

    /// Scores a record without touching storage. The input is left as is;
    /// the enriched copy is returned alongside the report.
    pub fn score_record(
        &self,
        record: &EmployeeRecord,
    ) -> Result<(EmployeeRecord, EvaluationReport), EvaluationError> {
        self.ensure_ready(record)?;

        let mut enriched = record.clone();
        self.graph.compute_all(&mut enriched);
        let employee_id = &enriched.employee_id;

        let promotion = self.models.promotion();
        let promotion_input = FeatureVector::build(&enriched.fields, promotion.features());
        let readiness = promotion
            .predict(&promotion_input)
            .map_err(|source| ModelInferenceError::new(ModelKind::Promotion, employee_id, source))?;

        let attrition = self.models.attrition();
        let attrition_input = FeatureVector::build(&enriched.fields, attrition.features());
        let attrition_label = attrition
            .predict(&attrition_input)
            .and_then(|class| attrition.decode(class))
            .map_err(|source| ModelInferenceError::new(ModelKind::Attrition, employee_id, source))?;

        let verdict = self
            .explainer
            .evaluate(self.models.anomaly(), employee_id, &enriched.fields)?;

        let feedback_summary =
            summarize_feedback(self.summarizer.as_ref(), employee_id, &enriched.fields);

        let report = EvaluationReport {
            promotion: PromotionView::new(&enriched, readiness),
            attrition: AttritionView::new(&enriched, &attrition_label),
            anomaly: AnomalyView::new(&verdict),
            feedback_summary,
        };
        Ok((enriched, report))
    }

    /// Drops engine-written and engine-owned values so only supplied inputs remain.
    fn discard_derived(&self, record: &mut EmployeeRecord) {
        let graph = &self.graph;
        let derived = std::mem::take(&mut record.derived);
        record
            .fields
            .retain(|name, _| !derived.contains(name) && !graph.is_engine_owned(name));
        record.state = RecordState::Incomplete;
    }

    fn ensure_ready(&self, record: &EmployeeRecord) -> Result<(), EvaluationError> {
        if record.number(&self.readiness_field).is_some() {
            return Ok(());
        }
        Err(EvaluationError::IncompleteRecord {
            employee_id: record.employee_id.clone(),
            field: self.readiness_field.clone(),
        })
    }
}

/// Error raised by the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("Employee '{0}' not found")]
    NotFound(EmployeeId),
    #[error("Details not filled. The employee record is incomplete (missing {field}).")]
    IncompleteRecord {
        employee_id: EmployeeId,
        field: String,
    },
    #[error(transparent)]
    ModelInference(#[from] ModelInferenceError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
