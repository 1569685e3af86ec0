pub mod aggregate;
pub mod graph;
pub mod kpis;
pub mod metrics;
pub mod sentiment;

pub use aggregate::{weighted_mean, MetricScale, WeightedAggregate, NEUTRAL_SCORE};
pub use graph::{
    ConfigurationError, DerivationGraph, DerivedMetricSpec, Formula, MetricFn, STANDARD_PIPELINE,
};
pub use metrics::MetricContext;
pub use sentiment::{sentiment_bucket, FixedSentiment, LexiconSentiment, SentimentScorer};
