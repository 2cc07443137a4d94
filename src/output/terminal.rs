// Colored terminal output for sampling progress and document labels.
//
// The cluster bar chart lives with the summaries in topics::summary; this
// module covers the per-document views and the pass progress bar.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::corpus::Corpus;
use crate::model::PassReport;
use crate::topics::prediction::Prediction;

/// Progress bar over sampling passes. Advance it with `record_pass`.
pub fn pass_progress_bar(n_iters: usize) -> ProgressBar {
    let pb = ProgressBar::new(n_iters as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Sampling [{bar:30}] {pos}/{len} passes {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

/// Update the progress bar after one pass.
pub fn record_pass(pb: &ProgressBar, report: &PassReport) {
    pb.set_message(format!(
        "({} moved, {} clusters)",
        report.transfers, report.populated_clusters
    ));
    pb.inc(1);
}

/// Print the outcome of a fit run.
pub fn display_fit_outcome(last: Option<&PassReport>, n_iters: usize) {
    match last {
        Some(report) if report.converged => println!(
            "  Converged after {} passes ({} populated clusters)",
            report.pass + 1,
            report.populated_clusters
        ),
        Some(report) => println!(
            "  Ran all {} passes without settling ({} moved in the last pass, {} populated clusters)",
            n_iters, report.transfers, report.populated_clusters
        ),
        None => println!("  {}", "No sampling passes were run".yellow()),
    }
}

/// Display the label of each document with a preview of its text.
///
/// Shows at most `limit` rows; the rest are summarized in one line.
pub fn display_predictions(predictions: &[Prediction], corpus: &Corpus, limit: usize) {
    if predictions.is_empty() {
        println!("No documents to label.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Labels ({} documents) ===", predictions.len()).bold()
    );
    println!();
    println!(
        "  {:<12} {:>7}  {:>6}  {}",
        "Id".dimmed(),
        "Cluster".dimmed(),
        "Prob".dimmed(),
        "Text".dimmed()
    );
    println!("  {}", "-".repeat(78).dimmed());

    for prediction in predictions.iter().take(limit) {
        let text = corpus
            .texts
            .get(prediction.index)
            .map(String::as_str)
            .unwrap_or("");
        let preview = super::truncate_chars(text, 50);
        println!(
            "  {:<12} {:>7}  {}  {}",
            super::truncate_chars(&prediction.id, 12),
            prediction.label,
            colorize_probability(prediction.probability),
            preview.dimmed()
        );
    }

    if predictions.len() > limit {
        println!("  ... and {} more", predictions.len() - limit);
    }
    println!();
}

/// Color a label probability by confidence.
fn colorize_probability(p: f64) -> colored::ColoredString {
    let text = format!("{p:>6.3}");
    if p >= 0.9 {
        text.green()
    } else if p >= 0.5 {
        text.yellow()
    } else {
        text.red()
    }
}
