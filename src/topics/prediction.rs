// Label decoding for a frozen model.
//
// Once sampling is done, every document gets its most probable cluster via
// choose_best_label. The probability vectors themselves double as document
// embeddings for downstream classifiers.

use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::model::MixtureSampler;

/// The decoded label for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Position in the input corpus
    pub index: usize,
    pub id: String,
    pub label: usize,
    pub probability: f64,
}

/// Most probable cluster for every document in `corpus`.
pub fn predict_corpus(sampler: &MixtureSampler, corpus: &Corpus) -> Vec<Prediction> {
    corpus
        .documents
        .iter()
        .zip(&corpus.ids)
        .enumerate()
        .map(|(index, (doc, id))| {
            let (label, probability) = sampler.choose_best_label(doc);
            Prediction {
                index,
                id: id.clone(),
                label,
                probability,
            }
        })
        .collect()
}

/// Pair the labels returned by `fit` with their final-state probability.
///
/// The probability is read from the frozen model with each document still
/// counted in its own cluster. It is therefore higher than the post-removal
/// conditional the sampler drew the label from, and the label may differ
/// from what `predict_corpus` picks for the same document.
pub fn fitted_assignments(
    sampler: &MixtureSampler,
    corpus: &Corpus,
    labels: &[usize],
) -> Vec<Prediction> {
    corpus
        .documents
        .iter()
        .zip(&corpus.ids)
        .zip(labels)
        .enumerate()
        .map(|(index, ((doc, id), &label))| Prediction {
            index,
            id: id.clone(),
            label,
            probability: sampler.score(doc)[label],
        })
        .collect()
}

/// Full cluster-probability vector per document, one row per document.
pub fn document_vectors(sampler: &MixtureSampler, corpus: &Corpus) -> Vec<Vec<f64>> {
    corpus
        .documents
        .iter()
        .map(|doc| sampler.score(doc))
        .collect()
}
