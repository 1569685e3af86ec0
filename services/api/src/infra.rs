use evalmate::config::ScoringConfig;
use evalmate::error::AppError;
use evalmate::workflows::employees::{
    builtin_models, load_models, DerivationGraph, EmployeeEvaluationService, EmployeeId,
    EmployeeRecord, EmployeeRepository, ExtractiveSummarizer, LexiconSentiment, ModelHandle,
    RepositoryError, SentimentScorer,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryEmployeeRepository {
    records: Arc<Mutex<HashMap<EmployeeId, EmployeeRecord>>>,
}

impl EmployeeRepository for InMemoryEmployeeRepository {
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
        if guard.contains_key(&record.employee_id) {
            guard.insert(record.employee_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &EmployeeId) -> Result<Option<EmployeeRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self, limit: usize) -> Result<Vec<EmployeeRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<EmployeeRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        records.truncate(limit);
        Ok(records)
    }

    fn delete(&self, id: &EmployeeId) -> Result<bool, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.remove(id).is_some())
    }
}

/// Shared, immutable scoring pieces built once at startup.
#[derive(Clone)]
pub(crate) struct Engine {
    pub(crate) graph: Arc<DerivationGraph>,
    pub(crate) models: ModelHandle,
    pub(crate) sentiment: Arc<dyn SentimentScorer>,
}

pub(crate) fn build_engine(scoring: &ScoringConfig) -> Result<Engine, AppError> {
    let sentiment: Arc<dyn SentimentScorer> = Arc::new(LexiconSentiment);
    let graph = Arc::new(DerivationGraph::standard(sentiment.clone())?);

    let models = match &scoring.model_dir {
        Some(dir) => load_models(dir)?,
        None => {
            info!("no model directory configured, using built-in models");
            builtin_models()
        }
    };

    Ok(Engine {
        graph,
        models,
        sentiment,
    })
}

pub(crate) type EvaluationService =
    EmployeeEvaluationService<InMemoryEmployeeRepository, ExtractiveSummarizer>;

pub(crate) fn build_service(
    engine: &Engine,
    repository: Arc<InMemoryEmployeeRepository>,
    scoring: &ScoringConfig,
) -> EvaluationService {
    EmployeeEvaluationService::new(
        repository,
        Arc::new(ExtractiveSummarizer::new(engine.sentiment.clone())),
        engine.graph.clone(),
        engine.models.clone(),
    )
    .with_readiness_field(scoring.readiness_field.clone())
}
