//! Topic modeling over headlines.
//!
//! Headlines are tokenized into bags of words and fed to a Latent Dirichlet
//! Allocation model fitted with collapsed Gibbs sampling. A fixed seed makes
//! every fit reproducible.

use crate::config::TopicSettings;
use crate::errors::AppError;
use crate::models::{PhraseMatch, Topic, TopicReport};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};
use unicode_segmentation::UnicodeSegmentation;

/// Phrases that usually mark a market-moving event.
pub const DEFAULT_EVENT_PHRASES: [&str; 6] = [
    "FDA approval",
    "price target",
    "clinical trial",
    "merger",
    "earnings",
    "guidance",
];

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "i", "me", "my", "we", "our", "you", "your", "he", "him", "his", "she",
    "her", "it", "its", "they", "them", "their", "what", "which", "who", "whom", "this", "that",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "do", "does", "did", "would", "should", "could", "will", "can", "may", "at", "by",
    "for", "from", "in", "into", "of", "on", "to", "with", "about", "against", "between",
    "during", "before", "after", "above", "below", "up", "down", "out", "off", "over", "under",
    "again", "then", "once", "and", "but", "or", "nor", "so", "not", "only", "than", "when",
    "where", "while", "if", "because", "as", "until", "here", "there", "all", "each", "few",
    "more", "most", "other", "some", "such", "no", "any", "own", "same", "too", "very", "just",
    "also", "now", "how", "why", "vs", "per",
];

#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: HashSet<String>,
    min_length: usize,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            min_length: 2,
        }
    }

    pub fn add_stop_words(&mut self, words: &[&str]) {
        for word in words {
            self.stop_words.insert(word.to_lowercase());
        }
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = len;
        self
    }

    /// Lowercased, alphabetic, non-stop-word tokens with plurals folded.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        lowered
            .unicode_words()
            .filter(|word| word.chars().all(char::is_alphabetic))
            .filter(|word| !self.stop_words.contains(*word))
            .map(lemmatize)
            .filter(|word| word.chars().count() >= self.min_length)
            .collect()
    }

    pub fn tokenize_documents(&self, documents: &[String]) -> Vec<Vec<String>> {
        documents.iter().map(|doc| self.tokenize(doc)).collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Folds common English plural endings onto the singular form.
fn lemmatize(word: &str) -> String {
    let len = word.len();
    if len > 4 && word.ends_with("ies") {
        format!("{}y", &word[..len - 3])
    } else if len > 4 && word.ends_with("sses") {
        word[..len - 2].to_string()
    } else if len > 3
        && word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        word[..len - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Term ↔ id mapping. Ids are assigned in sorted term order.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn build(docs: &[Vec<String>]) -> Self {
        let unique: HashSet<&String> = docs.iter().flatten().collect();
        let mut terms: Vec<String> = unique.into_iter().cloned().collect();
        terms.sort();

        let index = terms
            .iter()
            .enumerate()
            .map(|(id, term)| (term.clone(), id))
            .collect();
        Self { terms, index }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn id(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn term(&self, id: usize) -> Option<&str> {
        self.terms.get(id).map(String::as_str)
    }

    /// `(term id, count)` pairs sorted by id; unknown terms are skipped.
    pub fn doc2bow(&self, tokens: &[String]) -> Vec<(usize, usize)> {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for id in tokens.iter().filter_map(|t| self.id(t)) {
            *counts.entry(id).or_insert(0) += 1;
        }
        let mut bow: Vec<(usize, usize)> = counts.into_iter().collect();
        bow.sort_unstable();
        bow
    }
}

#[derive(Debug, Clone)]
pub struct LdaConfig {
    pub n_topics: usize,
    /// Document-topic prior
    pub alpha: f64,
    /// Topic-word prior
    pub beta: f64,
    pub iterations: usize,
    pub seed: u64,
}

impl Default for LdaConfig {
    fn default() -> Self {
        Self {
            n_topics: 5,
            alpha: 0.1,
            beta: 0.01,
            iterations: 200,
            seed: 42,
        }
    }
}

impl LdaConfig {
    pub fn new(n_topics: usize) -> Self {
        Self {
            n_topics,
            ..Default::default()
        }
    }

    pub fn iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl From<&TopicSettings> for LdaConfig {
    fn from(settings: &TopicSettings) -> Self {
        LdaConfig::new(settings.n_topics)
            .iterations(settings.iterations)
            .seed(settings.seed)
    }
}

/// Fitted LDA model.
#[derive(Debug, Clone)]
pub struct LdaModel {
    config: LdaConfig,
    /// n_topics x vocabulary_size
    topic_word_counts: Array2<f64>,
    /// n_docs x n_topics
    doc_topic_counts: Array2<f64>,
    topic_counts: Array1<f64>,
    vocabulary_size: usize,
}

impl LdaModel {
    pub fn fit(
        docs: &[Vec<(usize, usize)>],
        vocabulary_size: usize,
        config: LdaConfig,
    ) -> Result<Self, AppError> {
        if config.n_topics == 0 {
            return Err(AppError::Validation("Number of topics must be positive".to_string()));
        }
        if config.alpha <= 0.0 || config.beta <= 0.0 {
            return Err(AppError::Validation("alpha and beta must be positive".to_string()));
        }
        let n_tokens: usize = docs.iter().flatten().map(|&(_, c)| c).sum();
        if vocabulary_size == 0 || n_tokens == 0 {
            return Err(AppError::EmptyResult("Corpus has no tokens to model".to_string()));
        }
        if let Some(&(id, _)) = docs.iter().flatten().find(|&&(id, _)| id >= vocabulary_size) {
            return Err(AppError::Validation(format!(
                "Term id {} outside vocabulary of {}",
                id, vocabulary_size
            )));
        }

        let n_topics = config.n_topics;
        let n_docs = docs.len();
        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut topic_word_counts = Array2::<f64>::zeros((n_topics, vocabulary_size));
        let mut doc_topic_counts = Array2::<f64>::zeros((n_docs, n_topics));
        let mut topic_counts = Array1::<f64>::zeros(n_topics);

        // One (word, topic) slot per token occurrence
        let mut assignments: Vec<Vec<(usize, usize)>> = Vec::with_capacity(n_docs);
        for (doc_idx, bow) in docs.iter().enumerate() {
            let mut slots = Vec::new();
            for &(word, count) in bow {
                for _ in 0..count {
                    let topic = rng.random_range(0..n_topics);
                    topic_word_counts[[topic, word]] += 1.0;
                    doc_topic_counts[[doc_idx, topic]] += 1.0;
                    topic_counts[topic] += 1.0;
                    slots.push((word, topic));
                }
            }
            assignments.push(slots);
        }

        let beta_sum = config.beta * vocabulary_size as f64;
        let mut weights = vec![0.0; n_topics];

        for iteration in 0..config.iterations {
            for (doc_idx, slots) in assignments.iter_mut().enumerate() {
                for slot in slots.iter_mut() {
                    let (word, old_topic) = *slot;
                    topic_word_counts[[old_topic, word]] -= 1.0;
                    doc_topic_counts[[doc_idx, old_topic]] -= 1.0;
                    topic_counts[old_topic] -= 1.0;

                    // The document-length denominator is the same for every topic
                    let mut total = 0.0;
                    for (topic, weight) in weights.iter_mut().enumerate() {
                        *weight = (doc_topic_counts[[doc_idx, topic]] + config.alpha)
                            * (topic_word_counts[[topic, word]] + config.beta)
                            / (topic_counts[topic] + beta_sum);
                        total += *weight;
                    }

                    let threshold = rng.random::<f64>() * total;
                    let mut cumsum = 0.0;
                    let mut new_topic = n_topics - 1;
                    for (topic, &weight) in weights.iter().enumerate() {
                        cumsum += weight;
                        if cumsum >= threshold {
                            new_topic = topic;
                            break;
                        }
                    }

                    topic_word_counts[[new_topic, word]] += 1.0;
                    doc_topic_counts[[doc_idx, new_topic]] += 1.0;
                    topic_counts[new_topic] += 1.0;
                    slot.1 = new_topic;
                }
            }

            if (iteration + 1) % 50 == 0 {
                debug!("LDA iteration {}/{}", iteration + 1, config.iterations);
            }
        }

        Ok(Self {
            config,
            topic_word_counts,
            doc_topic_counts,
            topic_counts,
            vocabulary_size,
        })
    }

    pub fn n_topics(&self) -> usize {
        self.config.n_topics
    }

    /// P(word | topic), smoothed by beta.
    pub fn word_probability(&self, topic: usize, word: usize) -> f64 {
        (self.topic_word_counts[[topic, word]] + self.config.beta)
            / (self.topic_counts[topic] + self.config.beta * self.vocabulary_size as f64)
    }

    /// Every topic with its `n_words` most probable terms.
    pub fn topics(&self, vocabulary: &Vocabulary, n_words: usize) -> Vec<Topic> {
        let total: f64 = self.topic_counts.sum();

        (0..self.config.n_topics)
            .map(|topic| {
                let mut ranked: Vec<(usize, f64)> = (0..self.vocabulary_size)
                    .map(|word| (word, self.word_probability(topic, word)))
                    .collect();
                ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

                let top_words = ranked
                    .into_iter()
                    .take(n_words)
                    .filter_map(|(word, p)| vocabulary.term(word).map(|t| (t.to_string(), p)))
                    .collect();

                Topic {
                    index: topic,
                    top_words,
                    prevalence: if total > 0.0 {
                        self.topic_counts[topic] / total
                    } else {
                        0.0
                    },
                }
            })
            .collect()
    }

    /// Topic mixture of a training document, as sampled during the fit.
    pub fn training_document_topics(&self, doc_idx: usize) -> Option<Vec<f64>> {
        if doc_idx >= self.doc_topic_counts.nrows() {
            return None;
        }
        let row = self.doc_topic_counts.row(doc_idx);
        let denom = row.sum() + self.config.n_topics as f64 * self.config.alpha;
        Some(row.iter().map(|&c| (c + self.config.alpha) / denom).collect())
    }

    /// Topic mixture of any bag of words. Each token contributes its topic
    /// responsibilities under the fitted word distributions; an empty
    /// document gets the uniform mixture.
    pub fn document_topics(&self, bow: &[(usize, usize)]) -> Vec<f64> {
        let n_topics = self.config.n_topics;
        let mut mass = vec![0.0; n_topics];
        let mut n_tokens = 0.0;

        for &(word, count) in bow.iter().filter(|&&(w, _)| w < self.vocabulary_size) {
            let probs: Vec<f64> = (0..n_topics)
                .map(|topic| self.word_probability(topic, word))
                .collect();
            let norm: f64 = probs.iter().sum();
            if norm <= 0.0 {
                continue;
            }
            for (m, p) in mass.iter_mut().zip(&probs) {
                *m += count as f64 * p / norm;
            }
            n_tokens += count as f64;
        }

        let denom = n_tokens + n_topics as f64 * self.config.alpha;
        mass.iter().map(|m| (m + self.config.alpha) / denom).collect()
    }

    /// Most likely topic, or `None` when no token is in the vocabulary.
    pub fn dominant_topic(&self, bow: &[(usize, usize)]) -> Option<usize> {
        if !bow.iter().any(|&(w, c)| w < self.vocabulary_size && c > 0) {
            return None;
        }
        self.document_topics(bow)
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(topic, _)| topic)
    }
}

/// Headlines that mention at least one of `phrases`, case-insensitively.
pub fn extract_event_phrases(headlines: &[String], phrases: &[&str]) -> Vec<PhraseMatch> {
    let needles: Vec<(String, &str)> = phrases.iter().map(|p| (p.to_lowercase(), *p)).collect();

    headlines
        .iter()
        .enumerate()
        .filter_map(|(idx, headline)| {
            let lowered = headline.to_lowercase();
            let found: Vec<String> = needles
                .iter()
                .filter(|(needle, _)| lowered.contains(needle.as_str()))
                .map(|(_, phrase)| phrase.to_string())
                .collect();
            (!found.is_empty()).then(|| PhraseMatch {
                headline_index: idx,
                headline: headline.clone(),
                phrases: found,
            })
        })
        .collect()
}

/// Tokenize, fit and summarise topics plus event phrases for a set of headlines.
pub fn model_topics(headlines: &[String], settings: &TopicSettings) -> Result<TopicReport, AppError> {
    let tokenizer = Tokenizer::new();
    let tokenized = tokenizer.tokenize_documents(headlines);
    let vocabulary = Vocabulary::build(&tokenized);
    let corpus: Vec<Vec<(usize, usize)>> = tokenized.iter().map(|t| vocabulary.doc2bow(t)).collect();

    info!(
        "🧩 Fitting LDA: {} documents, {} terms, {} topics",
        corpus.len(),
        vocabulary.len(),
        settings.n_topics
    );
    let model = LdaModel::fit(&corpus, vocabulary.len(), LdaConfig::from(settings))?;
    let topics = model.topics(&vocabulary, settings.words_per_topic);
    for topic in &topics {
        info!("🧩 {}", topic);
    }

    Ok(TopicReport {
        documents: corpus.len(),
        vocabulary_size: vocabulary.len(),
        topics,
        phrase_matches: extract_event_phrases(headlines, &DEFAULT_EVENT_PHRASES),
    })
}
