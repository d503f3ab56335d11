// Request lifecycle: data model, failure classification and the controller
pub mod classifier;
pub mod controller;
pub mod types;


pub use classifier::{classify, ErrorKind, RawFailure};
pub use controller::{AnalysisController, ANALYSIS_TIMEOUT};
pub use types::{AnalysisRequest, AnalysisResult, AttemptId, RequestStatus};
