pub mod processor;

pub use processor::IncidentProcessor;
