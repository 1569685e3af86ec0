use serde::{Deserialize, Serialize};

use super::super::domain::FieldMap;

/// Midpoint of the 1-5 ordinal scale, used when no component carries a signal.
pub const NEUTRAL_SCORE: f64 = 3.0;
pub const ORDINAL_MIN: f64 = 1.0;
pub const ORDINAL_MAX: f64 = 5.0;

/// Weighted mean over whichever components are usable. Unusable values and
/// non-positive weights drop out of both numerator and denominator.
pub fn weighted_mean<I>(components: I) -> Option<f64>
where
    I: IntoIterator<Item = (Option<f64>, f64)>,
{
    let (total, weight_sum) = components
        .into_iter()
        .filter_map(|(value, weight)| {
            let value = value.filter(|value| value.is_finite())?;
            (weight.is_finite() && weight > 0.0).then_some((value, weight))
        })
        .fold((0.0, 0.0), |(total, weight_sum), (value, weight)| {
            (total + value * weight, weight_sum + weight)
        });

    (weight_sum > 0.0).then(|| total / weight_sum)
}

/// Named set of `(field, weight)` pairs read from a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedAggregate {
    components: &'static [(&'static str, f64)],
}

impl WeightedAggregate {
    pub const fn new(components: &'static [(&'static str, f64)]) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &'static [(&'static str, f64)] {
        self.components
    }

    pub fn mean(&self, fields: &FieldMap) -> Option<f64> {
        weighted_mean(self.components.iter().map(|(field, weight)| {
            let value = fields.get(*field).and_then(|value| value.as_number());
            (value, *weight)
        }))
    }

    /// Weighted mean, or the neutral score when nothing is usable.
    pub fn score(&self, fields: &FieldMap) -> f64 {
        self.mean(fields).unwrap_or(NEUTRAL_SCORE)
    }
}

/// Output range a derived metric is settled into before it is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricScale {
    /// Integer on the 1-5 scale.
    Ordinal,
    /// Two-decimal value on the 1-5 scale.
    Continuous,
    /// 0 or 1.
    Flag,
}

impl MetricScale {
    pub fn settle(self, raw: f64) -> f64 {
        match self {
            MetricScale::Ordinal => {
                if !raw.is_finite() {
                    return NEUTRAL_SCORE;
                }
                raw.round_ties_even().clamp(ORDINAL_MIN, ORDINAL_MAX)
            }
            MetricScale::Continuous => {
                if !raw.is_finite() {
                    return NEUTRAL_SCORE;
                }
                (raw.clamp(ORDINAL_MIN, ORDINAL_MAX) * 100.0).round() / 100.0
            }
            MetricScale::Flag => {
                if raw.is_finite() && raw >= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}
