use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::model::SamplerConfig;

/// Default location of the saved model snapshot.
pub const DEFAULT_MODEL_PATH: &str = "./gsdmm-model.json";

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded at startup via dotenvy. Command-line flags
/// override anything set here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Sampler hyperparameters (GSDMM_K, GSDMM_ALPHA, GSDMM_BETA,
    /// GSDMM_ITERS, GSDMM_WARMUP, GSDMM_SEED)
    pub sampler: SamplerConfig,
    /// Where `fit` writes and `predict`/`inspect` read the model (GSDMM_MODEL_PATH)
    pub model_path: PathBuf,
    /// Drop English stop words when tokenizing raw text (GSDMM_STOP_WORDS)
    pub remove_stop_words: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional. A variable that is set but cannot be
    /// parsed is an error rather than a silent fallback to the default.
    pub fn load() -> Result<Self> {
        let defaults = SamplerConfig::default();

        let sampler = SamplerConfig {
            k: parse_var("GSDMM_K")?.unwrap_or(defaults.k),
            alpha: parse_var("GSDMM_ALPHA")?.unwrap_or(defaults.alpha),
            beta: parse_var("GSDMM_BETA")?.unwrap_or(defaults.beta),
            n_iters: parse_var("GSDMM_ITERS")?.unwrap_or(defaults.n_iters),
            warmup_passes: parse_var("GSDMM_WARMUP")?.unwrap_or(defaults.warmup_passes),
            seed: parse_var("GSDMM_SEED")?,
        };

        let remove_stop_words = match env::var("GSDMM_STOP_WORDS").as_deref() {
            Ok("false") | Ok("0") | Ok("no") => false,
            // "true" or unset both keep stop-word removal on
            _ => true,
        };

        Ok(Self {
            sampler,
            model_path: env::var("GSDMM_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_PATH)),
            remove_stop_words,
        })
    }
}

/// Read and parse an optional environment variable.
fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        _ => Ok(None),
    }
}
