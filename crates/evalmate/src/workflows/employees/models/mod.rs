//! Boundary to the trained promotion, attrition, and anomaly models.
//!
//! The engine treats models as opaque: it builds a feature vector in the
//! column order each model declares and reads back a score, a class code,
//! or an outlier flag. Models are loaded once into a [`ModelHandle`] and
//! shared immutably afterwards.

pub mod linear;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::domain::{EmployeeId, FieldMap};

pub use linear::{
    builtin_models, load_models, ArtifactError, LinearClassifier, LinearRegressor, ZScoreDetector,
    ANOMALY_ARTIFACT, ATTRITION_ARTIFACT, PROMOTION_ARTIFACT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Promotion,
    Attrition,
    Anomaly,
}

impl ModelKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Promotion => "promotion",
            Self::Attrition => "attrition",
            Self::Anomaly => "anomaly",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure raised by a model while scoring one input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("expected {expected} features, received {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("model produced a non-finite output")]
    NonFinite,
    #[error("class code {0} has no label")]
    UnknownClass(usize),
}

/// A model failure with the context needed to trace it back to one employee.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{model} model failed for employee {employee_id}: {source}")]
pub struct ModelInferenceError {
    pub model: ModelKind,
    pub employee_id: EmployeeId,
    #[source]
    pub source: ModelError,
}

impl ModelInferenceError {
    pub fn new(model: ModelKind, employee_id: &EmployeeId, source: ModelError) -> Self {
        Self {
            model,
            employee_id: employee_id.clone(),
            source,
        }
    }
}

/// Model input in the exact column order the model declared.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Missing or non-numeric columns are filled with 0.
    pub fn build(fields: &FieldMap, columns: &[String]) -> Self {
        let values = columns
            .iter()
            .map(|column| {
                fields
                    .get(column)
                    .and_then(|value| value.as_number())
                    .unwrap_or(0.0)
            })
            .collect();
        Self {
            columns: columns.to_vec(),
            values,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|index| self.values[index])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyFlag {
    Normal,
    Outlier,
}

/// Continuous promotion-readiness regressor, scored on 0-100.
pub trait PromotionModel: Send + Sync {
    fn features(&self) -> &[String];
    fn predict(&self, input: &FeatureVector) -> Result<f64, ModelError>;
}

/// Attrition classifier plus the decoder from class code to label.
pub trait AttritionModel: Send + Sync {
    fn features(&self) -> &[String];
    fn predict(&self, input: &FeatureVector) -> Result<usize, ModelError>;
    fn decode(&self, class: usize) -> Result<String, ModelError>;
}

pub trait AnomalyModel: Send + Sync {
    fn features(&self) -> &[String];
    fn predict(&self, input: &FeatureVector) -> Result<AnomalyFlag, ModelError>;
    /// Lower is more anomalous; negative values are outliers.
    fn decision_function(&self, input: &FeatureVector) -> Result<f64, ModelError>;
}

/// Immutable set of the three models, cheap to clone into request handlers.
#[derive(Clone)]
pub struct ModelHandle {
    promotion: Arc<dyn PromotionModel>,
    attrition: Arc<dyn AttritionModel>,
    anomaly: Arc<dyn AnomalyModel>,
}

impl ModelHandle {
    pub fn new(
        promotion: Arc<dyn PromotionModel>,
        attrition: Arc<dyn AttritionModel>,
        anomaly: Arc<dyn AnomalyModel>,
    ) -> Self {
        Self {
            promotion,
            attrition,
            anomaly,
        }
    }

    pub fn promotion(&self) -> &dyn PromotionModel {
        self.promotion.as_ref()
    }

    pub fn attrition(&self) -> &dyn AttritionModel {
        self.attrition.as_ref()
    }

    pub fn anomaly(&self) -> &dyn AnomalyModel {
        self.anomaly.as_ref()
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("promotion_features", &self.promotion.features().len())
            .field("attrition_features", &self.attrition.features().len())
            .field("anomaly_features", &self.anomaly.features().len())
            .finish()
    }
}
