pub mod advice;
pub mod portfolio;
pub mod position;
pub mod quote;
pub mod settings;
pub mod summary;
pub mod thresholds;
