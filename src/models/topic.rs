use serde::{Deserialize, Serialize};

/// Topic representation with its heaviest words
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub index: usize,
    pub top_words: Vec<(String, f64)>,
    /// Share of all word assignments that landed in this topic
    pub prevalence: f64,
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let words: Vec<String> = self
            .top_words
            .iter()
            .map(|(word, weight)| format!("{:.3}*\"{}\"", weight, word))
            .collect();
        write!(f, "Topic #{}: {}", self.index + 1, words.join(" + "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseMatch {
    pub headline_index: usize,
    pub headline: String,
    pub phrases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicReport {
    pub documents: usize,
    pub vocabulary_size: usize,
    pub topics: Vec<Topic>,
    pub phrase_matches: Vec<PhraseMatch>,
}
