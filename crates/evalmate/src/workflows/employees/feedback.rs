use std::sync::Arc;

use tracing::warn;

use super::domain::{EmployeeId, FieldMap};
use super::schema::FEEDBACK_FIELDS;
use super::scoring::SentimentScorer;

pub const NO_FEEDBACK: &str = "No feedback provided for this employee.";

/// External text summarization capability.
pub trait FeedbackSummarizer: Send + Sync {
    fn summarize(&self, text: &str) -> Result<String, SummaryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("summarizer rate limited")]
    RateLimited,
    #[error("summarizer unavailable: {0}")]
    Unavailable(String),
}

/// `Label: text` lines for every populated feedback field, in a fixed order.
pub fn compose_feedback(fields: &FieldMap) -> Option<String> {
    let lines: Vec<String> = FEEDBACK_FIELDS
        .iter()
        .filter_map(|(field, label)| {
            let value = fields.get(*field)?.to_string();
            let value = value.trim();
            (!value.is_empty()).then(|| format!("{label}: {value}"))
        })
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Summary of the record's feedback. A failing summarizer degrades to a
/// fixed message rather than failing the evaluation.
pub fn summarize_feedback<S>(summarizer: &S, employee_id: &EmployeeId, fields: &FieldMap) -> String
where
    S: FeedbackSummarizer + ?Sized,
{
    let Some(text) = compose_feedback(fields) else {
        return NO_FEEDBACK.to_string();
    };
    match summarizer.summarize(&text) {
        Ok(summary) => summary,
        Err(error) => {
            warn!(employee_id = %employee_id, error = %error, "feedback summary unavailable");
            format!("Feedback summary unavailable: {error}")
        }
    }
}

/// Offline summarizer: reports the overall tone and the first sentence of
/// each feedback source.
#[derive(Clone)]
pub struct ExtractiveSummarizer {
    sentiment: Arc<dyn SentimentScorer>,
}

impl ExtractiveSummarizer {
    pub fn new(sentiment: Arc<dyn SentimentScorer>) -> Self {
        Self { sentiment }
    }

    fn tone(polarity: f64) -> &'static str {
        if polarity > 0.1 {
            "positive"
        } else if polarity < -0.1 {
            "negative"
        } else {
            "mixed"
        }
    }
}

impl FeedbackSummarizer for ExtractiveSummarizer {
    fn summarize(&self, text: &str) -> Result<String, SummaryError> {
        let mut highlights = Vec::new();
        let mut polarity = 0.0;
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            let (label, body) = line.split_once(':').unwrap_or(("Feedback", line));
            let body = body.trim();
            polarity += self.sentiment.score(body);
            let first = body
                .split_inclusive(['.', '!', '?'])
                .next()
                .unwrap_or(body)
                .trim();
            highlights.push(format!("{}: {}", label.trim(), first));
        }

        if highlights.is_empty() {
            return Ok(NO_FEEDBACK.to_string());
        }
        let mean = polarity / highlights.len() as f64;
        Ok(format!(
            "Overall {} feedback from {} source(s). {}",
            Self::tone(mean),
            highlights.len(),
            highlights.join(" ")
        ))
    }
}
