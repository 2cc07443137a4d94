// Collapsed Gibbs sampler for the Dirichlet Multinomial Mixture.
//
// Every document carries exactly one cluster label. A sampling pass visits
// documents in order, pulls each one out of its cluster, scores every cluster
// against the remaining counts, draws a new label and puts the document back.
// Clusters that lose all their documents stay empty unless alpha lets them
// attract new ones, so the number of populated clusters shrinks toward the
// number of topics actually present.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::categorical;
use super::error::ModelError;
use super::word_counts::WordCounts;

/// Hyperparameters for a sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Upper bound on the number of clusters.
    pub k: usize,
    /// Pseudo-count for cluster popularity. 0 means an empty cluster can never
    /// receive a document.
    pub alpha: f64,
    /// Pseudo-count for word affinity. Small values make clusters stricter
    /// about sharing vocabulary.
    pub beta: f64,
    /// Maximum number of sampling passes.
    pub n_iters: usize,
    /// Early exit is only allowed once the zero-based pass index exceeds this.
    #[serde(default = "default_warmup_passes")]
    pub warmup_passes: usize,
    /// RNG seed. `None` seeds from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_warmup_passes() -> usize {
    25
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            k: 8,
            alpha: 0.1,
            beta: 0.1,
            n_iters: 30,
            warmup_passes: default_warmup_passes(),
            seed: None,
        }
    }
}

impl SamplerConfig {
    /// Reject hyperparameters that cannot define a model.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.k == 0 {
            return Err(ModelError::InvalidConfig(
                "k must be at least 1".to_string(),
            ));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(ModelError::InvalidConfig(format!(
                "alpha must be a finite, non-negative number (got {})",
                self.alpha
            )));
        }
        // beta = 0 leaves ln(0) terms for every empty cluster
        if !self.beta.is_finite() || self.beta <= 0.0 {
            return Err(ModelError::InvalidConfig(format!(
                "beta must be a finite, positive number (got {})",
                self.beta
            )));
        }
        Ok(())
    }
}

/// What happened during one complete pass over the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    /// Zero-based pass index.
    pub pass: usize,
    /// Documents whose label changed during the pass.
    pub transfers: usize,
    /// Clusters holding at least one document after the pass.
    pub populated_clusters: usize,
    /// True when this pass triggered the early exit.
    pub converged: bool,
}

/// The mixture model: hyperparameters plus all sufficient statistics.
///
/// Counts are only mutated through `fit`; `score` and `choose_best_label`
/// read the current state.
pub struct MixtureSampler {
    config: SamplerConfig,
    rng: StdRng,
    num_docs: usize,
    vocab_size: usize,
    /// m_z: documents per cluster
    cluster_doc_count: Vec<usize>,
    /// n_z: token occurrences per cluster
    cluster_word_count: Vec<usize>,
    /// n_z_w: token -> count per cluster
    cluster_word_distribution: Vec<WordCounts>,
}

impl MixtureSampler {
    /// Create an unfitted sampler with K empty clusters.
    pub fn new(config: SamplerConfig) -> Result<Self, ModelError> {
        config.validate()?;
        let k = config.k;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            config,
            rng,
            num_docs: 0,
            vocab_size: 0,
            cluster_doc_count: vec![0; k],
            cluster_word_count: vec![0; k],
            cluster_word_distribution: vec![WordCounts::new(); k],
        })
    }

    /// Rebuild a fitted sampler from previously computed counts.
    ///
    /// Skips random initialization. The counts are checked for shape and
    /// internal consistency: every distribution must sum to its cluster's
    /// word count and the document counts must sum to `num_docs`.
    pub fn from_state(
        config: SamplerConfig,
        num_docs: usize,
        vocab_size: usize,
        cluster_doc_count: Vec<usize>,
        cluster_word_count: Vec<usize>,
        cluster_word_distribution: Vec<WordCounts>,
    ) -> Result<Self, ModelError> {
        let mut sampler = Self::new(config)?;
        let k = sampler.config.k;

        check_shape("cluster_doc_count", k, cluster_doc_count.len())?;
        check_shape("cluster_word_count", k, cluster_word_count.len())?;
        check_shape(
            "cluster_word_distribution",
            k,
            cluster_word_distribution.len(),
        )?;

        for (cluster, (dist, &word_count)) in cluster_word_distribution
            .iter()
            .zip(&cluster_word_count)
            .enumerate()
        {
            let distribution_total = dist.total();
            if distribution_total != word_count {
                return Err(ModelError::StateInconsistent {
                    cluster,
                    word_count,
                    distribution_total,
                });
            }
        }

        let assigned: usize = cluster_doc_count.iter().sum();
        if assigned != num_docs {
            return Err(ModelError::DocumentCountMismatch { num_docs, assigned });
        }

        sampler.num_docs = num_docs;
        sampler.vocab_size = vocab_size;
        sampler.cluster_doc_count = cluster_doc_count;
        sampler.cluster_word_count = cluster_word_count;
        sampler.cluster_word_distribution = cluster_word_distribution;
        Ok(sampler)
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn cluster_doc_count(&self) -> &[usize] {
        &self.cluster_doc_count
    }

    pub fn cluster_word_count(&self) -> &[usize] {
        &self.cluster_word_count
    }

    pub fn cluster_word_distribution(&self) -> &[WordCounts] {
        &self.cluster_word_distribution
    }

    /// Number of clusters currently holding at least one document.
    pub fn populated_clusters(&self) -> usize {
        self.cluster_doc_count.iter().filter(|&&m| m > 0).count()
    }

    /// Cluster the documents and return one label per document.
    ///
    /// Any previous state is discarded. Afterwards the sampler's counts
    /// describe the returned assignment.
    pub fn fit<S: AsRef<str>>(&mut self, docs: &[Vec<S>], vocab_size: usize) -> Vec<usize> {
        self.fit_with(docs, vocab_size, |_| {})
    }

    /// Like `fit`, calling `on_pass` after every completed sampling pass.
    pub fn fit_with<S, F>(
        &mut self,
        docs: &[Vec<S>],
        vocab_size: usize,
        mut on_pass: F,
    ) -> Vec<usize>
    where
        S: AsRef<str>,
        F: FnMut(&PassReport),
    {
        let k = self.config.k;
        self.reset();
        self.num_docs = docs.len();
        self.vocab_size = vocab_size;

        // Random initialization: uniform label per document
        let mut labels = Vec::with_capacity(docs.len());
        for doc in docs {
            let z = self.rng.random_range(0..k);
            self.add_document(z, doc);
            labels.push(z);
        }

        debug!(
            docs = self.num_docs,
            vocab_size,
            clusters = k,
            populated = self.populated_clusters(),
            "Initialized cluster assignments"
        );

        let mut previous_populated = k;
        for pass in 0..self.config.n_iters {
            let mut transfers = 0;

            for (doc, label) in docs.iter().zip(labels.iter_mut()) {
                let old = *label;
                // Score against the counts without this document
                self.remove_document(old, doc);
                let probs = self.score(doc);
                let new = categorical::sample(&mut self.rng, &probs);
                self.add_document(new, doc);

                if new != old {
                    transfers += 1;
                }
                *label = new;
            }

            let populated = self.populated_clusters();
            let converged = transfers == 0
                && populated == previous_populated
                && pass > self.config.warmup_passes;

            info!(pass, transfers, populated, "Completed sampling pass");
            on_pass(&PassReport {
                pass,
                transfers,
                populated_clusters: populated,
                converged,
            });

            if converged {
                info!(pass, populated, "Assignments stable, stopping early");
                break;
            }
            previous_populated = populated;
        }

        labels
    }

    /// Probability of `doc` joining each cluster under the current counts.
    ///
    /// Returns a length-K vector that sums to 1. If every raw score underflows
    /// to zero the vector is returned as all zeros instead of being divided by
    /// zero.
    pub fn score<S: AsRef<str>>(&self, doc: &[S]) -> Vec<f64> {
        let k = self.config.k;
        let alpha = self.config.alpha;
        let beta = self.config.beta;
        let v_beta = self.vocab_size as f64 * beta;

        // Shared by every cluster, so it only affects the raw magnitude.
        // Skipped when non-positive (a single document with alpha = 0).
        let popularity_norm = self.num_docs as f64 - 1.0 + k as f64 * alpha;
        let log_popularity_norm = if popularity_norm > 0.0 {
            popularity_norm.ln()
        } else {
            0.0
        };

        let mut scores: Vec<f64> = (0..k)
            .map(|z| {
                let popularity =
                    (self.cluster_doc_count[z] as f64 + alpha).ln() - log_popularity_norm;

                let dist = &self.cluster_word_distribution[z];
                let affinity: f64 = doc
                    .iter()
                    .map(|w| (dist.get(w.as_ref()) as f64 + beta).ln())
                    .sum();

                // An empty cluster with V = 0 starts at base 0; the ln(0)
                // factor is skipped like the popularity normalizer above.
                let base = self.cluster_word_count[z] as f64 + v_beta;
                let length_norm: f64 = (1..=doc.len())
                    .map(|i| base + i as f64 - 1.0)
                    .filter(|&x| x > 0.0)
                    .map(f64::ln)
                    .sum();

                (popularity + affinity - length_norm).exp()
            })
            .collect();

        let total: f64 = scores.iter().sum();
        let total = if total > 0.0 { total } else { 1.0 };
        for s in &mut scores {
            *s /= total;
        }
        scores
    }

    /// Most probable cluster for `doc` and its probability. Does not mutate.
    pub fn choose_best_label<S: AsRef<str>>(&self, doc: &[S]) -> (usize, f64) {
        let probs = self.score(doc);
        probs
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (z, p)| {
                if p > best.1 {
                    (z, p)
                } else {
                    best
                }
            })
    }

    fn reset(&mut self) {
        let k = self.config.k;
        self.num_docs = 0;
        self.vocab_size = 0;
        self.cluster_doc_count = vec![0; k];
        self.cluster_word_count = vec![0; k];
        self.cluster_word_distribution = vec![WordCounts::new(); k];
    }

    fn add_document<S: AsRef<str>>(&mut self, z: usize, doc: &[S]) {
        self.cluster_doc_count[z] += 1;
        self.cluster_word_count[z] += doc.len();
        let dist = &mut self.cluster_word_distribution[z];
        for w in doc {
            dist.add(w.as_ref());
        }
    }

    fn remove_document<S: AsRef<str>>(&mut self, z: usize, doc: &[S]) {
        self.cluster_doc_count[z] -= 1;
        self.cluster_word_count[z] -= doc.len();
        let dist = &mut self.cluster_word_distribution[z];
        for w in doc {
            let removed = dist.remove(w.as_ref());
            debug_assert!(removed, "token {:?} missing from cluster {z}", w.as_ref());
        }
    }
}

fn check_shape(field: &'static str, expected: usize, actual: usize) -> Result<(), ModelError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ModelError::ShapeMismatch {
            field,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn seeded(k: usize, alpha: f64, beta: f64, seed: u64) -> MixtureSampler {
        MixtureSampler::new(SamplerConfig {
            k,
            alpha,
            beta,
            n_iters: 30,
            warmup_passes: 25,
            seed: Some(seed),
        })
        .unwrap()
    }

    #[test]
    fn test_new_rejects_zero_clusters() {
        let config = SamplerConfig {
            k: 0,
            ..SamplerConfig::default()
        };
        assert!(matches!(
            MixtureSampler::new(config),
            Err(ModelError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_new_rejects_negative_beta() {
        let config = SamplerConfig {
            beta: -0.5,
            ..SamplerConfig::default()
        };
        assert!(MixtureSampler::new(config).is_err());
    }

    #[test]
    fn test_new_rejects_zero_beta() {
        let config = SamplerConfig {
            beta: 0.0,
            ..SamplerConfig::default()
        };
        assert!(matches!(
            MixtureSampler::new(config),
            Err(ModelError::InvalidConfig(msg)) if msg.contains("beta")
        ));
    }

    #[test]
    fn test_unfitted_sampler_scores_uniformly() {
        // V = 0 and every cluster empty
        let sampler = seeded(4, 0.1, 0.1, 0);
        let probs = sampler.score(&doc(&["a", "b", "a"]));
        for p in probs {
            assert!((p - 0.25).abs() < 1e-12, "Expected 0.25, got {p}");
        }
    }

    #[test]
    #[should_panic(expected = "missing from cluster")]
    #[cfg(debug_assertions)]
    fn test_removing_foreign_document_is_caught() {
        let mut sampler = seeded(2, 0.1, 0.1, 1);
        sampler.add_document(0, &doc(&["a"]));
        sampler.remove_document(0, &doc(&["b"]));
    }

    #[test]
    fn test_new_starts_empty() {
        let sampler = seeded(5, 0.1, 0.1, 0);
        assert_eq!(sampler.cluster_doc_count(), &[0; 5]);
        assert_eq!(sampler.cluster_word_count(), &[0; 5]);
        assert!(sampler.cluster_word_distribution().iter().all(|d| d.is_empty()));
        assert_eq!(sampler.populated_clusters(), 0);
    }

    #[test]
    fn test_remove_then_add_same_cluster_round_trips() {
        let mut sampler = seeded(3, 0.1, 0.1, 9);
        let docs = vec![doc(&["a", "b", "a"]), doc(&["c"]), doc(&["a", "d"])];
        let labels = sampler.fit(&docs, 4);

        let before_m = sampler.cluster_doc_count().to_vec();
        let before_n = sampler.cluster_word_count().to_vec();
        let before_w = sampler.cluster_word_distribution().to_vec();

        sampler.remove_document(labels[0], &docs[0]);
        sampler.add_document(labels[0], &docs[0]);

        assert_eq!(sampler.cluster_doc_count(), before_m.as_slice());
        assert_eq!(sampler.cluster_word_count(), before_n.as_slice());
        assert_eq!(sampler.cluster_word_distribution(), before_w.as_slice());
    }

    #[test]
    fn test_removal_prunes_singleton_tokens() {
        let mut sampler = seeded(2, 0.1, 0.1, 1);
        let d = doc(&["only", "here"]);
        sampler.add_document(1, &d);
        sampler.remove_document(1, &d);
        assert!(sampler.cluster_word_distribution()[1].is_empty());
        assert_eq!(sampler.cluster_word_count()[1], 0);
    }

    #[test]
    fn test_score_is_distribution() {
        let mut sampler = seeded(4, 0.1, 0.1, 3);
        let docs = vec![doc(&["a", "b"]), doc(&["b", "c"]), doc(&["d"])];
        sampler.fit(&docs, 4);

        let probs = sampler.score(&doc(&["a", "c"]));
        assert_eq!(probs.len(), 4);
        assert!(probs.iter().all(|&p| p >= 0.0));
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "Expected sum 1.0, got {sum}");
    }

    #[test]
    fn test_empty_document_scores_by_popularity() {
        let config = SamplerConfig {
            k: 2,
            alpha: 1.0,
            beta: 0.1,
            ..SamplerConfig::default()
        };
        let dist: WordCounts = vec![("x".to_string(), 3)].into_iter().collect();
        let sampler = MixtureSampler::from_state(
            config,
            3,
            1,
            vec![3, 0],
            vec![3, 0],
            vec![dist, WordCounts::new()],
        )
        .unwrap();

        // (3 + 1) : (0 + 1)
        let probs = sampler.score::<String>(&[]);
        assert!((probs[0] - 0.8).abs() < 1e-12);
        assert!((probs[1] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_zero_alpha_never_scores_empty_cluster() {
        let config = SamplerConfig {
            k: 3,
            alpha: 0.0,
            beta: 0.1,
            ..SamplerConfig::default()
        };
        let dist: WordCounts = vec![("a".to_string(), 2)].into_iter().collect();
        let sampler = MixtureSampler::from_state(
            config,
            2,
            5,
            vec![2, 0, 0],
            vec![2, 0, 0],
            vec![dist, WordCounts::new(), WordCounts::new()],
        )
        .unwrap();

        // Even a document sharing nothing with cluster 0 cannot go to an empty one
        let probs = sampler.score(&doc(&["zzz"]));
        assert_eq!(probs[1], 0.0);
        assert_eq!(probs[2], 0.0);
        assert!((probs[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_score_underflow_returns_zeros() {
        let config = SamplerConfig {
            k: 2,
            alpha: 0.1,
            beta: 1e-300,
            ..SamplerConfig::default()
        };
        let sampler = MixtureSampler::from_state(
            config,
            2,
            10,
            vec![1, 1],
            vec![1, 1],
            vec![
                vec![("a".to_string(), 1)].into_iter().collect(),
                vec![("b".to_string(), 1)].into_iter().collect(),
            ],
        )
        .unwrap();

        // Tokens unseen in both clusters: each contributes ln(1e-300)
        let probs = sampler.score(&doc(&["q", "r", "s"]));
        assert_eq!(probs, vec![0.0, 0.0]);
    }

    #[test]
    fn test_fit_resets_previous_state() {
        let mut sampler = seeded(3, 0.1, 0.1, 11);
        let docs = vec![doc(&["a"]), doc(&["b"])];
        sampler.fit(&docs, 2);
        sampler.fit(&docs, 2);
        assert_eq!(sampler.cluster_doc_count().iter().sum::<usize>(), 2);
        assert_eq!(sampler.cluster_word_count().iter().sum::<usize>(), 2);
    }

    #[test]
    fn test_converges_early_after_warmup() {
        // A single cluster never transfers anything
        let mut sampler = MixtureSampler::new(SamplerConfig {
            k: 1,
            alpha: 0.1,
            beta: 0.01,
            n_iters: 100,
            warmup_passes: 3,
            seed: Some(5),
        })
        .unwrap();
        let docs = vec![doc(&["a"]); 6];

        let mut passes = Vec::new();
        sampler.fit_with(&docs, 1, |r| passes.push(*r));

        let last = passes.last().unwrap();
        assert!(last.converged);
        assert_eq!(last.pass, 4, "first pass index past the warm-up");
        assert_eq!(passes.len(), 5);
    }

    #[test]
    fn test_no_early_exit_before_warmup() {
        let mut sampler = MixtureSampler::new(SamplerConfig {
            k: 1,
            alpha: 0.1,
            beta: 0.1,
            n_iters: 10,
            warmup_passes: 25,
            seed: Some(2),
        })
        .unwrap();
        let docs = vec![doc(&["a"]), doc(&["b"])];

        let mut count = 0;
        sampler.fit_with(&docs, 2, |_| count += 1);
        assert_eq!(count, 10);
    }
}
