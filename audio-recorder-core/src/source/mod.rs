pub mod priority;
pub mod streaming;
