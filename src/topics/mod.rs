// Topic views over a fitted model — cluster summaries and label decoding.

pub mod prediction;
pub mod summary;
