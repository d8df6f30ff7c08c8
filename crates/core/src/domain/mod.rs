pub mod error;
pub mod quality;
pub mod settings;
pub mod strategy;
pub mod types;
pub mod validation;
