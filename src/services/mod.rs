pub mod analytics;
pub mod pixabay;
