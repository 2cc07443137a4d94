use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use gsdmm::config::Config;
use gsdmm::corpus::{Corpus, Tokenizer};
use gsdmm::model::{MixtureSampler, ModelState, PassReport};
use gsdmm::output::{self, terminal};
use gsdmm::topics::{prediction, summary};

/// gsdmm: cluster short texts into topics without choosing the topic count.
///
/// Fits a Dirichlet Multinomial Mixture with collapsed Gibbs sampling. K is
/// only an upper bound; the model empties the clusters it does not need.
#[derive(Parser)]
#[command(name = "gsdmm", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a model to a corpus and save it
    Fit {
        /// Corpus file: one document per line, or .jsonl with "text"/"tokens"
        #[arg(long)]
        input: PathBuf,

        /// Upper bound on the number of clusters (env: GSDMM_K)
        #[arg(long)]
        k: Option<usize>,

        /// Cluster popularity pseudo-count (env: GSDMM_ALPHA)
        #[arg(long)]
        alpha: Option<f64>,

        /// Word affinity pseudo-count (env: GSDMM_BETA)
        #[arg(long)]
        beta: Option<f64>,

        /// Maximum sampling passes (env: GSDMM_ITERS)
        #[arg(long)]
        iters: Option<usize>,

        /// Passes before early exit is allowed (env: GSDMM_WARMUP)
        #[arg(long)]
        warmup: Option<usize>,

        /// RNG seed for reproducible runs (env: GSDMM_SEED)
        #[arg(long)]
        seed: Option<u64>,

        /// Where to save the model (env: GSDMM_MODEL_PATH)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Also write per-document labels as JSON
        #[arg(long)]
        assignments: Option<PathBuf>,

        /// Words to show per cluster (default: 8)
        #[arg(long, default_value = "8")]
        top_words: usize,
    },

    /// Label new documents with a saved model
    Predict {
        /// Corpus file to label
        #[arg(long)]
        input: PathBuf,

        /// Saved model (env: GSDMM_MODEL_PATH)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Write predictions as JSON instead of only printing them
        #[arg(long)]
        output: Option<PathBuf>,

        /// Rows to print (default: 20)
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show the clusters of a saved model
    Inspect {
        /// Saved model (env: GSDMM_MODEL_PATH)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Words to show per cluster (default: 8)
        #[arg(long, default_value = "8")]
        top_words: usize,
    },

    /// Show saved model status (size, fit time, populated clusters)
    Status {
        /// Saved model (env: GSDMM_MODEL_PATH)
        #[arg(long)]
        model: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gsdmm=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Fit {
            input,
            k,
            alpha,
            beta,
            iters,
            warmup,
            seed,
            model,
            assignments,
            top_words,
        } => {
            let mut sampler_config = config.sampler.clone();
            if let Some(k) = k {
                sampler_config.k = k;
            }
            if let Some(alpha) = alpha {
                sampler_config.alpha = alpha;
            }
            if let Some(beta) = beta {
                sampler_config.beta = beta;
            }
            if let Some(iters) = iters {
                sampler_config.n_iters = iters;
            }
            if let Some(warmup) = warmup {
                sampler_config.warmup_passes = warmup;
            }
            if seed.is_some() {
                sampler_config.seed = seed;
            }
            let model_path = model.unwrap_or_else(|| config.model_path.clone());

            let tokenizer = Tokenizer::new(config.remove_stop_words);
            let corpus = Corpus::load(&input, &tokenizer)?;
            let vocab_size = corpus.vocabulary_size();

            println!(
                "Fitting {} documents (vocabulary {}) into at most {} clusters...",
                corpus.len(),
                vocab_size,
                sampler_config.k
            );

            let n_iters = sampler_config.n_iters;
            let mut sampler = MixtureSampler::new(sampler_config)?;

            let pb = terminal::pass_progress_bar(n_iters);
            let mut last: Option<PassReport> = None;
            let labels = sampler.fit_with(&corpus.documents, vocab_size, |report| {
                terminal::record_pass(&pb, report);
                last = Some(*report);
            });
            pb.finish_and_clear();
            terminal::display_fit_outcome(last.as_ref(), n_iters);

            let summaries = summary::summarize(&sampler, top_words);
            summary::display(&summaries, sampler.config().k);

            sampler.snapshot().save(&model_path)?;
            println!("Model saved to {}", model_path.display());

            if let Some(path) = assignments {
                // Probabilities are final-state, not the sampler's last draw
                let rows = prediction::fitted_assignments(&sampler, &corpus, &labels);
                output::write_json(&path, &rows)?;
                println!("Assignments written to {}", path.display());
            }
        }

        Commands::Predict {
            input,
            model,
            output: output_path,
            limit,
        } => {
            let model_path = model.unwrap_or_else(|| config.model_path.clone());
            let sampler = load_sampler(&model_path)?;

            let tokenizer = Tokenizer::new(config.remove_stop_words);
            let corpus = Corpus::load(&input, &tokenizer)?;

            let predictions = prediction::predict_corpus(&sampler, &corpus);
            info!(documents = predictions.len(), "Labeled documents");
            terminal::display_predictions(&predictions, &corpus, limit);

            if let Some(path) = output_path {
                output::write_json(&path, &predictions)?;
                println!("Predictions written to {}", path.display());
            }
        }

        Commands::Inspect { model, top_words } => {
            let model_path = model.unwrap_or_else(|| config.model_path.clone());
            let sampler = load_sampler(&model_path)?;

            let summaries = summary::summarize(&sampler, top_words);
            summary::display(&summaries, sampler.config().k);
            println!(
                "{}",
                format!(
                    "Built from {} documents, vocabulary of {}",
                    sampler.num_docs(),
                    sampler.vocab_size()
                )
                .dimmed()
            );
        }

        Commands::Status { model } => {
            let model_path = model.unwrap_or_else(|| config.model_path.clone());
            gsdmm::status::show(&model_path)?;
        }
    }

    Ok(())
}

/// Load and validate a saved model.
fn load_sampler(path: &std::path::Path) -> Result<MixtureSampler> {
    if !path.exists() {
        anyhow::bail!(
            "No model at {}\n\
             Run `gsdmm fit --input <file>` first, or pass --model.",
            path.display()
        );
    }
    let state = ModelState::load(path)?;
    let sampler = MixtureSampler::from_snapshot(state)?;
    Ok(sampler)
}
