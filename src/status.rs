// Model status display — file size, fit time, corpus shape, populated clusters.

use std::path::Path;

use anyhow::Result;

use crate::model::ModelState;

/// Display the status of a saved model to the terminal.
pub fn show(model_path: &Path) -> Result<()> {
    if !model_path.exists() {
        println!("Model: not fitted yet");
        println!("\nRun `gsdmm fit --input <file>` to build one.");
        return Ok(());
    }

    let file_size = std::fs::metadata(model_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Model: {} ({})", model_path.display(), file_size);

    let state = ModelState::load(model_path)?;
    println!("Fitted: {}", state.fitted_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!(
        "Corpus: {} documents, vocabulary of {}",
        state.num_docs, state.vocab_size
    );
    println!(
        "Clusters: {} populated of {} (alpha {}, beta {})",
        state.populated_clusters(),
        state.config.k,
        state.config.alpha,
        state.config.beta
    );

    match state.validate() {
        Ok(()) => println!("Counts: consistent"),
        Err(e) => println!("Counts: INCONSISTENT ({e})"),
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
