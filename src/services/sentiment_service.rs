use crate::models::{HeadlineRecord, Sentiment};
use tracing::info;
use vader_sentiment::SentimentIntensityAnalyzer;

/// VADER's conventional neutral band.
pub const NEUTRAL_THRESHOLD: f64 = 0.05;

/// A pretrained, stateless text → polarity mapping.
pub trait PolarityModel {
    /// Polarity in [-1.0, 1.0]; negative means negative sentiment.
    fn polarity(&self, text: &str) -> f64;
}

/// Lexicon and rule based scorer backed by VADER's compound score.
pub struct VaderModel {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderModel {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityModel for VaderModel {
    fn polarity(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        let scores = self.analyzer.polarity_scores(text);
        scores
            .get("compound")
            .copied()
            .unwrap_or(0.0)
            .clamp(-1.0, 1.0)
    }
}

pub fn analyze_sentiment(model: &dyn PolarityModel, text: &str) -> f64 {
    model.polarity(text)
}

/// Score every headline in place. Returns how many were scored.
pub fn score_headlines(model: &dyn PolarityModel, records: &mut [HeadlineRecord]) -> usize {
    for record in records.iter_mut() {
        record.sentiment = Some(analyze_sentiment(model, &record.headline));
    }
    info!("🧠 Scored sentiment for {} headlines", records.len());
    records.len()
}

pub fn classify_sentiment(score: f64) -> Sentiment {
    if score >= NEUTRAL_THRESHOLD {
        Sentiment::Positive
    } else if score <= -NEUTRAL_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}
