// ModelState — the persisted form of a fitted sampler.
//
// Holds the hyperparameters and every sufficient statistic, so a model can be
// reloaded for scoring without re-running the random initialization. Stored
// as pretty-printed JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ModelError;
use super::sampler::{MixtureSampler, SamplerConfig};
use super::word_counts::WordCounts;

/// Snapshot of a sampler's configuration and counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelState {
    pub config: SamplerConfig,
    /// D: number of documents the counts were built from
    pub num_docs: usize,
    /// V: vocabulary size used in the scoring normalizer
    pub vocab_size: usize,
    pub cluster_doc_count: Vec<usize>,
    pub cluster_word_count: Vec<usize>,
    pub cluster_word_distribution: Vec<WordCounts>,
    /// When the snapshot was taken
    pub fitted_at: DateTime<Utc>,
}

impl MixtureSampler {
    /// Capture the current counts as a persistable snapshot.
    pub fn snapshot(&self) -> ModelState {
        ModelState {
            config: self.config().clone(),
            num_docs: self.num_docs(),
            vocab_size: self.vocab_size(),
            cluster_doc_count: self.cluster_doc_count().to_vec(),
            cluster_word_count: self.cluster_word_count().to_vec(),
            cluster_word_distribution: self.cluster_word_distribution().to_vec(),
            fitted_at: Utc::now(),
        }
    }

    /// Rebuild a sampler from a snapshot, validating its counts.
    pub fn from_snapshot(state: ModelState) -> Result<Self, ModelError> {
        MixtureSampler::from_state(
            state.config,
            state.num_docs,
            state.vocab_size,
            state.cluster_doc_count,
            state.cluster_word_count,
            state.cluster_word_distribution,
        )
    }
}

impl ModelState {
    /// Check the snapshot would reconstruct into a consistent sampler.
    pub fn validate(&self) -> Result<(), ModelError> {
        MixtureSampler::from_snapshot(self.clone()).map(|_| ())
    }

    /// Number of clusters holding at least one document.
    pub fn populated_clusters(&self) -> usize {
        self.cluster_doc_count.iter().filter(|&&m| m > 0).count()
    }

    /// Write the snapshot as JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write model to {}", path.display()))?;

        info!(
            path = %path.display(),
            clusters = self.config.k,
            populated = self.populated_clusters(),
            "Saved model snapshot"
        );
        Ok(())
    }

    /// Read a snapshot written by `save`.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read model from {}", path.display()))?;
        let state: ModelState = serde_json::from_str(&json)
            .with_context(|| format!("{} is not a valid model file", path.display()))?;
        Ok(state)
    }
}
