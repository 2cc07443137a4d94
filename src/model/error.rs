// Error types for the mixture sampler.
//
// The core library returns typed errors so callers can tell a bad
// configuration apart from an inconsistent saved state. The CLI wraps these
// in anyhow like everything else.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    /// Hyperparameters that cannot define a model (K = 0, negative alpha, ...).
    #[error("invalid sampler configuration: {0}")]
    InvalidConfig(String),

    /// A per-cluster vector does not have one entry per cluster.
    #[error("{field} has {actual} entries, expected one per cluster ({expected})")]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A cluster's word distribution does not sum to its word count.
    #[error(
        "cluster {cluster} is inconsistent: word distribution sums to {distribution_total}, \
         word count says {word_count}"
    )]
    StateInconsistent {
        cluster: usize,
        word_count: usize,
        distribution_total: usize,
    },

    /// Cluster document counts do not add up to the number of documents.
    #[error("cluster document counts sum to {assigned}, but the model holds {num_docs} documents")]
    DocumentCountMismatch { num_docs: usize, assigned: usize },
}
