// Dirichlet Multinomial Mixture — the Gibbs sampler and its state.

pub mod categorical;
pub mod error;
pub mod sampler;
pub mod state;
pub mod word_counts;

pub use error::ModelError;
pub use sampler::{MixtureSampler, PassReport, SamplerConfig};
pub use state::ModelState;
pub use word_counts::WordCounts;
