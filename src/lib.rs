// gsdmm: short-text topic clustering with a Dirichlet Multinomial Mixture.
//
// This is the library root. `model` is the Gibbs sampler itself; the other
// modules load corpora, describe fitted models and print results.

pub mod config;
pub mod corpus;
pub mod model;
pub mod output;
pub mod status;
pub mod topics;
