pub mod aggregator;
pub mod extractor;
pub mod normalizer;
pub mod orchestrator;
pub mod selector;

pub use aggregator::aggregate;
pub use normalizer::{normalize, RecordShape};
pub use orchestrator::{AnalysisStage, Analyzer};
pub use selector::select;
