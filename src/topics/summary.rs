// ClusterSummary — the human-readable view of a fitted model.
//
// Each populated cluster is described by its size, its share of the corpus
// and its most frequent words. The word-count tables come straight from the
// sampler's sufficient statistics, so summaries can be rebuilt from a saved
// model without the original documents.

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::model::MixtureSampler;

/// Description of one populated cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSummary {
    /// Cluster label in [0, K)
    pub label: usize,
    /// Documents currently assigned
    pub documents: usize,
    /// Token occurrences across those documents
    pub words: usize,
    /// Fraction of all documents in this cluster (0.0 to 1.0)
    pub share: f64,
    /// Most frequent tokens with their counts, highest first
    pub top_words: Vec<(String, usize)>,
}

/// Summarize every populated cluster, largest first.
///
/// Ties on size are broken by label so the order is stable.
pub fn summarize(sampler: &MixtureSampler, top_n: usize) -> Vec<ClusterSummary> {
    let total_docs: usize = sampler.cluster_doc_count().iter().sum();

    let mut summaries: Vec<ClusterSummary> = sampler
        .cluster_doc_count()
        .iter()
        .enumerate()
        .filter(|&(_, &m)| m > 0)
        .map(|(z, &m)| ClusterSummary {
            label: z,
            documents: m,
            words: sampler.cluster_word_count()[z],
            share: if total_docs > 0 {
                m as f64 / total_docs as f64
            } else {
                0.0
            },
            top_words: sampler.cluster_word_distribution()[z].top_words(top_n),
        })
        .collect();

    summaries.sort_by(|a, b| b.documents.cmp(&a.documents).then(a.label.cmp(&b.label)));
    summaries
}

/// Display cluster summaries as a bar chart in the terminal.
pub fn display(summaries: &[ClusterSummary], total_clusters: usize) {
    println!(
        "\n{}",
        format!(
            "=== {} populated clusters (of {} available) ===",
            summaries.len(),
            total_clusters
        )
        .bold()
    );
    println!();

    let bar_width: usize = 20;

    for summary in summaries {
        let filled = (summary.share * bar_width as f64).round() as usize;
        let empty = bar_width.saturating_sub(filled);
        let bar = format!("[{}{}]", "=".repeat(filled), " ".repeat(empty));

        let colored_bar = if summary.share >= 0.25 {
            bar.bright_green()
        } else if summary.share >= 0.10 {
            bar.bright_yellow()
        } else {
            bar.bright_blue()
        };

        println!(
            "  Cluster {:>3}  {} {:>5} docs  {:.2}",
            summary.label.to_string().bold(),
            colored_bar,
            summary.documents,
            summary.share
        );

        let words: Vec<String> = summary
            .top_words
            .iter()
            .map(|(w, c)| format!("{w} ({c})"))
            .collect();
        println!("      Top words: {}", words.join(", ").dimmed());
        println!();
    }
}
