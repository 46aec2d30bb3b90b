use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::domain::{AssessmentPair, FrameworkKind, Orientation, Subject};
use super::statistics::{ScenarioImpact, SectorProfile};
use super::taxonomy::Taxonomy;

/// Everything the generation collaborator is told about one pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub subject: Subject,
    pub taxonomy: Taxonomy,
    pub framework: FrameworkKind,
    pub category: String,
    pub subcategory: String,
    pub orientation: Orientation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector_profile: Option<SectorProfile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scenario_impacts: Vec<ScenarioImpact>,
}

impl GenerationRequest {
    pub fn new(
        subject: &Subject,
        taxonomy: Taxonomy,
        framework: FrameworkKind,
        pair: &AssessmentPair,
    ) -> Self {
        Self {
            subject: subject.clone(),
            taxonomy,
            framework,
            category: pair.category.clone(),
            subcategory: pair.subcategory.clone(),
            orientation: pair.orientation,
            sector_profile: None,
            scenario_impacts: Vec::new(),
        }
    }

    pub fn with_sector_statistics(
        mut self,
        profile: Option<SectorProfile>,
        scenario_impacts: Vec<ScenarioImpact>,
    ) -> Self {
        self.sector_profile = profile;
        self.scenario_impacts = scenario_impacts;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("generation service rejected the credentials")]
    Authentication,
    #[error("generation quota exhausted")]
    QuotaExhausted,
    #[error("generation service is rate limiting requests")]
    RateLimited,
    #[error("generation request timed out")]
    Timeout,
    #[error("generation transport failed: {0}")]
    Transport(String),
    #[error("generation service returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("generation request was rejected: {0}")]
    InvalidRequest(String),
    #[error("generation response was unusable: {0}")]
    InvalidResponse(String),
    #[error("no generation credentials configured")]
    NotConfigured,
}

impl GenerationError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            GenerationError::Authentication
                | GenerationError::QuotaExhausted
                | GenerationError::InvalidRequest(_)
                | GenerationError::NotConfigured
        )
    }
}

/// External text-generation collaborator. Responses are untrusted JSON.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Raw scores, narrative, peers and sources for one pair.
    async fn assess(&self, request: &GenerationRequest) -> Result<Value, GenerationError>;

    /// `{category: [subcategory, ...]}` tailored to the subject, for the opportunity taxonomy.
    async fn opportunity_subcategories(&self, subject: &Subject) -> Result<Value, GenerationError>;
}
