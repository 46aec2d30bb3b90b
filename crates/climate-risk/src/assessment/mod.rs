//! Per-subject assessment runs: taxonomy enumeration, concurrent generation
//! requests, response sanitization, and composite scoring.

pub mod domain;
pub mod generation;
pub mod openai;
pub mod orchestrator;
pub mod retry;
pub mod router;
pub mod sanitizer;
pub mod statistics;
pub mod taxonomy;

#[cfg(test)]
mod tests;

pub use domain::{
    AssessmentError, AssessmentPair, AssessmentRun, CompositeBasis, FrameworkKind, Metric,
    Orientation, PairFailure, PairOutcome, PeerComparison, RiskAssessmentRecord,
    SanitizedResponse, SourceCitation, SubScores, Subject,
};
pub use generation::{GenerationClient, GenerationError, GenerationRequest};
pub use openai::OpenAiGenerationClient;
pub use orchestrator::AssessmentOrchestrator;
pub use retry::{Attempted, RetryPolicy};
pub use router::{assessment_router, AssessmentRequest, WeightQuery};
pub use sanitizer::ResponseSanitizer;
pub use statistics::{
    InMemorySectorStatistics, ScenarioImpact, SectorContext, SectorProfile,
    SectorStatisticsProvider, StatisticsError,
};
pub use taxonomy::{Placeholders, Taxonomy};
