use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    AnomalyFlag, AnomalyModel, AttritionModel, FeatureVector, ModelError, ModelHandle,
    PromotionModel,
};

pub const PROMOTION_ARTIFACT: &str = "promotion.json";
pub const ATTRITION_ARTIFACT: &str = "attrition.json";
pub const ANOMALY_ARTIFACT: &str = "anomaly.json";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("unable to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("model artifact {path} is malformed: {reason}")]
    Shape { path: PathBuf, reason: String },
}

fn check_width(input: &FeatureVector, expected: usize) -> Result<(), ModelError> {
    if input.len() != expected {
        return Err(ModelError::ShapeMismatch {
            expected,
            found: input.len(),
        });
    }
    Ok(())
}

fn dot(weights: &[f64], values: &[f64]) -> f64 {
    weights.iter().zip(values).map(|(weight, value)| weight * value).sum()
}

/// `score = intercept + coefficients · features`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearRegressor {
    fn validate(&self) -> Result<(), String> {
        if self.features.is_empty() {
            return Err("no features declared".to_string());
        }
        if self.coefficients.len() != self.features.len() {
            return Err(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.features.len()
            ));
        }
        Ok(())
    }
}

impl PromotionModel for LinearRegressor {
    fn features(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, input: &FeatureVector) -> Result<f64, ModelError> {
        check_width(input, self.coefficients.len())?;
        let score = self.intercept + dot(&self.coefficients, input.values());
        if !score.is_finite() {
            return Err(ModelError::NonFinite);
        }
        Ok(score)
    }
}

/// One linear score per class; the highest score wins. `classes` doubles as
/// the label decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub features: Vec<String>,
    pub classes: Vec<String>,
    pub weights: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl LinearClassifier {
    fn validate(&self) -> Result<(), String> {
        if self.features.is_empty() || self.classes.is_empty() {
            return Err("classifier needs features and classes".to_string());
        }
        if self.weights.len() != self.classes.len() || self.intercepts.len() != self.classes.len()
        {
            return Err(format!(
                "{} weight rows and {} intercepts for {} classes",
                self.weights.len(),
                self.intercepts.len(),
                self.classes.len()
            ));
        }
        if let Some(row) = self
            .weights
            .iter()
            .position(|row| row.len() != self.features.len())
        {
            return Err(format!("weight row {row} does not match feature count"));
        }
        Ok(())
    }
}

impl AttritionModel for LinearClassifier {
    fn features(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, input: &FeatureVector) -> Result<usize, ModelError> {
        check_width(input, self.features.len())?;
        let mut best: Option<(usize, f64)> = None;
        for (class, (row, intercept)) in self.weights.iter().zip(&self.intercepts).enumerate() {
            let score = intercept + dot(row, input.values());
            if !score.is_finite() {
                return Err(ModelError::NonFinite);
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((class, score));
            }
        }
        best.map(|(class, _)| class).ok_or(ModelError::ShapeMismatch {
            expected: self.features.len(),
            found: 0,
        })
    }

    fn decode(&self, class: usize) -> Result<String, ModelError> {
        self.classes
            .get(class)
            .cloned()
            .ok_or(ModelError::UnknownClass(class))
    }
}

/// Flags a record whose largest absolute z-score exceeds `threshold`.
/// The decision value is `threshold - max|z|`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreDetector {
    pub features: Vec<String>,
    pub means: Vec<f64>,
    pub std_devs: Vec<f64>,
    pub threshold: f64,
}

impl ZScoreDetector {
    fn validate(&self) -> Result<(), String> {
        if self.features.is_empty() {
            return Err("no features declared".to_string());
        }
        if self.means.len() != self.features.len() || self.std_devs.len() != self.features.len() {
            return Err("means and std_devs must match the feature count".to_string());
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(format!("threshold {} must be positive", self.threshold));
        }
        Ok(())
    }
}

impl AnomalyModel for ZScoreDetector {
    fn features(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, input: &FeatureVector) -> Result<AnomalyFlag, ModelError> {
        let decision = self.decision_function(input)?;
        Ok(if decision < 0.0 {
            AnomalyFlag::Outlier
        } else {
            AnomalyFlag::Normal
        })
    }

    fn decision_function(&self, input: &FeatureVector) -> Result<f64, ModelError> {
        check_width(input, self.features.len())?;
        let widest = input
            .values()
            .iter()
            .zip(self.means.iter().zip(&self.std_devs))
            .filter(|(_, (_, std_dev))| **std_dev > 0.0)
            .map(|(value, (mean, std_dev))| ((value - mean) / std_dev).abs())
            .fold(0.0_f64, f64::max);
        let decision = self.threshold - widest;
        if !decision.is_finite() {
            return Err(ModelError::NonFinite);
        }
        Ok(decision)
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn shape_error(path: &Path) -> impl FnOnce(String) -> ArtifactError + '_ {
    move |reason| ArtifactError::Shape {
        path: path.to_path_buf(),
        reason,
    }
}

/// Loads the three artifacts from `dir` and validates their shapes.
pub fn load_models(dir: &Path) -> Result<ModelHandle, ArtifactError> {
    let promotion_path = dir.join(PROMOTION_ARTIFACT);
    let promotion: LinearRegressor = read_artifact(&promotion_path)?;
    promotion.validate().map_err(shape_error(&promotion_path))?;

    let attrition_path = dir.join(ATTRITION_ARTIFACT);
    let attrition: LinearClassifier = read_artifact(&attrition_path)?;
    attrition.validate().map_err(shape_error(&attrition_path))?;

    let anomaly_path = dir.join(ANOMALY_ARTIFACT);
    let anomaly: ZScoreDetector = read_artifact(&anomaly_path)?;
    anomaly.validate().map_err(shape_error(&anomaly_path))?;

    info!(
        model_dir = %dir.display(),
        promotion_features = promotion.features.len(),
        attrition_classes = attrition.classes.len(),
        anomaly_features = anomaly.features.len(),
        "model artifacts loaded"
    );

    Ok(ModelHandle::new(
        Arc::new(promotion),
        Arc::new(attrition),
        Arc::new(anomaly),
    ))
}

fn names(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|column| column.to_string()).collect()
}

/// Hand-tuned models used when no artifact directory is configured.
pub fn builtin_models() -> ModelHandle {
    let promotion = LinearRegressor {
        features: names(&[
            "overall_weighted_score",
            "effort_engagement_score",
            "leadership_score",
            "task_ownership",
            "score_delta",
            "promotions_achieved",
            "role_specific_kpi_score",
        ]),
        coefficients: vec![9.0, 3.0, 3.0, 2.0, 4.0, 2.0, 1.0],
        intercept: -2.0,
    };

    let attrition = LinearClassifier {
        features: names(&[
            "burnout_risk",
            "stress_load_tolerance",
            "tenure_in_current_role",
            "retention_suggestion",
            "effort_engagement_score",
        ]),
        classes: names(&["High", "Low", "Medium"]),
        weights: vec![
            vec![1.0, -0.5, -0.3, 2.0, -0.5],
            vec![-0.8, 0.6, 0.2, -1.0, 0.6],
            vec![0.0, 0.0, 0.0, 0.0, 0.0],
        ],
        intercepts: vec![-0.5, -0.5, 1.0],
    };

    let anomaly = ZScoreDetector {
        features: names(&[
            "effort_engagement_score",
            "burnout_risk",
            "peer_complaints",
            "score_delta",
            "hr_warnings",
        ]),
        means: vec![3.0, 3.0, 0.5, 0.0, 0.1],
        std_devs: vec![1.0, 1.0, 1.0, 1.0, 0.5],
        threshold: 2.5,
    };

    ModelHandle::new(Arc::new(promotion), Arc::new(attrition), Arc::new(anomaly))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::employees::domain::{FieldMap, FieldValue};

    fn vector(model_features: &[String], entries: &[(&str, f64)]) -> FeatureVector {
        let fields: FieldMap = entries
            .iter()
            .map(|(name, value)| (name.to_string(), FieldValue::Number(*value)))
            .collect();
        FeatureVector::build(&fields, model_features)
    }

    #[test]
    fn builtin_attrition_separates_stressed_from_settled() {
        let models = builtin_models();
        let attrition = models.attrition();

        let settled = vector(
            attrition.features(),
            &[
                ("burnout_risk", 3.0),
                ("stress_load_tolerance", 3.0),
                ("tenure_in_current_role", 3.0),
                ("effort_engagement_score", 3.0),
            ],
        );
        let class = attrition.predict(&settled).expect("prediction");
        assert_eq!(attrition.decode(class).expect("label"), "Low");

        let stressed = vector(
            attrition.features(),
            &[
                ("burnout_risk", 5.0),
                ("stress_load_tolerance", 1.0),
                ("tenure_in_current_role", 1.0),
                ("retention_suggestion", 1.0),
                ("effort_engagement_score", 1.0),
            ],
        );
        let class = attrition.predict(&stressed).expect("prediction");
        assert_eq!(attrition.decode(class).expect("label"), "High");
    }

    #[test]
    fn zscore_detector_flags_beyond_threshold() {
        let models = builtin_models();
        let anomaly = models.anomaly();

        let typical = vector(
            anomaly.features(),
            &[("effort_engagement_score", 3.0), ("burnout_risk", 3.0)],
        );
        assert_eq!(anomaly.predict(&typical).expect("flag"), AnomalyFlag::Normal);
        assert!((anomaly.decision_function(&typical).expect("score") - 2.0).abs() < 1e-9);

        let unusual = vector(
            anomaly.features(),
            &[
                ("effort_engagement_score", 3.0),
                ("burnout_risk", 3.0),
                ("peer_complaints", 4.0),
            ],
        );
        assert_eq!(anomaly.predict(&unusual).expect("flag"), AnomalyFlag::Outlier);
    }

    #[test]
    fn mismatched_width_is_a_model_error() {
        let models = builtin_models();
        let short = FeatureVector::build(&FieldMap::new(), &["only".to_string()]);
        assert_eq!(
            models.promotion().predict(&short),
            Err(ModelError::ShapeMismatch {
                expected: 7,
                found: 1
            })
        );
    }

    #[test]
    fn unknown_class_code_does_not_decode() {
        let models = builtin_models();
        assert_eq!(
            models.attrition().decode(9),
            Err(ModelError::UnknownClass(9))
        );
    }

    #[test]
    fn artifacts_round_trip_through_a_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let promotion = LinearRegressor {
            features: vec!["overall_weighted_score".to_string()],
            coefficients: vec![20.0],
            intercept: 0.0,
        };
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
            threshold: 2.0,
        };
        for (name, json) in [
            (PROMOTION_ARTIFACT, serde_json::to_string(&promotion)),
            (ATTRITION_ARTIFACT, serde_json::to_string(&attrition)),
            (ANOMALY_ARTIFACT, serde_json::to_string(&anomaly)),
        ] {
            fs::write(dir.path().join(name), json.expect("serialize")).expect("write artifact");
        }

        let handle = load_models(dir.path()).expect("artifacts load");
        let input = vector(handle.promotion().features(), &[("overall_weighted_score", 4.0)]);
        assert_eq!(handle.promotion().predict(&input), Ok(80.0));
    }

    #[test]
    fn malformed_artifact_reports_its_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(PROMOTION_ARTIFACT),
            r#"{"features":["a","b"],"coefficients":[1.0],"intercept":0.0}"#,
        )
        .expect("write artifact");

        let error = load_models(dir.path()).expect_err("shape mismatch");
        assert!(matches!(error, ArtifactError::Shape { .. }));
        assert!(error.to_string().contains(PROMOTION_ARTIFACT));
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = load_models(&dir.path().join("absent")).expect_err("no artifacts");
        assert!(matches!(error, ArtifactError::Io { .. }));
    }
}
