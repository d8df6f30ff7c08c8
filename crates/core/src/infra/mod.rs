pub mod lexicon;
pub mod metrics;
pub mod post_processor;
pub mod strategy;
