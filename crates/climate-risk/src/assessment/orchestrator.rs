use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, warn};

use super::domain::{
    AssessmentPair, AssessmentRun, CompositeBasis, FrameworkKind, Orientation, PairFailure,
    PairOutcome, RiskAssessmentRecord, SanitizedResponse, SubScores, Subject,
};
use super::generation::{GenerationClient, GenerationRequest};
use super::retry::RetryPolicy;
use super::sanitizer::ResponseSanitizer;
use super::statistics::{SectorContext, SectorStatisticsProvider};
use super::taxonomy::{opportunity_fallback_pairs, parse_opportunity_subcategories, Taxonomy};
use crate::scoring::{residual_risk, CategoryGroup, SectorCode, WeightResolver};

/// Fans one subject out into per-pair generation requests and assembles the results.
pub struct AssessmentOrchestrator<G, S> {
    generator: Arc<G>,
    statistics: Arc<S>,
    resolver: Arc<WeightResolver>,
    retry: RetryPolicy,
}

impl<G, S> AssessmentOrchestrator<G, S>
where
    G: GenerationClient,
    S: SectorStatisticsProvider,
{
    pub fn new(generator: Arc<G>, statistics: Arc<S>, resolver: Arc<WeightResolver>) -> Self {
        Self {
            generator,
            statistics,
            resolver,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn resolver(&self) -> &WeightResolver {
        &self.resolver
    }

    /// Assess every pair of `taxonomy` for `subject`.
    ///
    /// Branches run concurrently and never abort each other: a pair whose
    /// generation request still fails after retries becomes a
    /// [`PairOutcome::Failed`] in its enumeration slot.
    pub async fn run(
        &self,
        subject: &Subject,
        taxonomy: Taxonomy,
        framework: FrameworkKind,
    ) -> AssessmentRun {
        let sector = subject.sector();
        let pairs = self.enumerate_pairs(subject, taxonomy).await;
        let context = self.sector_context(sector).await;
        let sector_context_available = context.as_ref().is_some_and(|ctx| !ctx.is_empty());

        info!(
            subject = %subject.name,
            sector = sector.code(),
            taxonomy = taxonomy.code(),
            ?framework,
            pairs = pairs.len(),
            "starting assessment run"
        );

        let sanitizer = ResponseSanitizer::for_taxonomy(taxonomy);
        let branches = pairs.into_iter().map(|pair| {
            let request = GenerationRequest::new(subject, taxonomy, framework, &pair);
            let request = match &context {
                Some(ctx) => {
                    request.with_sector_statistics(ctx.profile.clone(), ctx.headline_impacts())
                }
                None => request,
            };
            self.assess_pair(sector, pair, request, framework, sanitizer)
        });
        let outcomes = join_all(branches).await;

        let failed = outcomes
            .iter()
            .filter(|outcome| outcome.failure().is_some())
            .count();
        if failed > 0 {
            warn!(
                subject = %subject.name,
                failed,
                total = outcomes.len(),
                "assessment run finished with failed pairs"
            );
        } else {
            info!(subject = %subject.name, total = outcomes.len(), "assessment run complete");
        }

        AssessmentRun {
            subject: subject.name.clone(),
            sector,
            taxonomy,
            framework,
            weight_table_version: self.resolver.table().version().to_string(),
            sector_context_available,
            generated_at: Utc::now(),
            outcomes,
        }
    }

    /// Pairs to assess, in the order results are returned.
    pub async fn enumerate_pairs(
        &self,
        subject: &Subject,
        taxonomy: Taxonomy,
    ) -> Vec<AssessmentPair> {
        if let Some(pairs) = taxonomy.fixed_pairs() {
            return pairs;
        }

        let label = format!("{}/opportunity-subcategories", subject.name);
        let attempted = self
            .retry
            .run(&label, || self.generator.opportunity_subcategories(subject))
            .await;
        let generated = match attempted.result {
            Ok(raw) => parse_opportunity_subcategories(&raw),
            Err(error) => {
                warn!(
                    subject = %subject.name,
                    attempts = attempted.attempts,
                    %error,
                    "opportunity subcategory generation failed, using fallback set"
                );
                Vec::new()
            }
        };

        if generated.is_empty() {
            opportunity_fallback_pairs()
        } else {
            generated
        }
    }

    /// Combine a sanitized response with sector weights into the final record.
    pub fn score(
        &self,
        sector: SectorCode,
        pair: AssessmentPair,
        framework: FrameworkKind,
        sanitized: SanitizedResponse,
    ) -> RiskAssessmentRecord {
        let (composite_score, composite_basis) = match (framework, sanitized.sub_scores) {
            (
                FrameworkKind::Standard,
                SubScores::Standard {
                    likelihood,
                    impact,
                    vulnerability,
                },
            ) => {
                // Opportunity pairs always weight as the Opportunity group.
                let category_label = match pair.orientation {
                    Orientation::Opportunity => CategoryGroup::Opportunity.label(),
                    Orientation::Risk => pair.category.as_str(),
                };
                let resolution =
                    self.resolver
                        .explain_sector(sector, category_label, &pair.subcategory);
                let score = residual_risk(likelihood, impact, vulnerability, &resolution.weights);
                (score, CompositeBasis::Weighted(resolution))
            }
            _ => (sanitized.reported_composite, CompositeBasis::Reported),
        };

        RiskAssessmentRecord {
            category: pair.category,
            subcategory: pair.subcategory,
            orientation: pair.orientation,
            sub_scores: sanitized.sub_scores,
            composite_score,
            composite_basis,
            narrative: sanitized.narrative,
            reasoning: sanitized.reasoning,
            peer_comparison: sanitized.peer_comparison,
            sources: sanitized.sources,
        }
    }

    /// Both lookups run together; whichever half succeeds is kept.
    async fn sector_context(&self, sector: SectorCode) -> Option<SectorContext> {
        let (profile, scenario_impacts) = tokio::join!(
            self.statistics.profile(sector),
            self.statistics.scenario_impacts(sector)
        );
        let profile = profile.unwrap_or_else(|error| {
            warn!(sector = sector.code(), %error, "sector profile unavailable");
            None
        });
        let scenario_impacts = scenario_impacts.unwrap_or_else(|error| {
            warn!(sector = sector.code(), %error, "sector scenario impacts unavailable");
            Vec::new()
        });

        let context = SectorContext {
            profile,
            scenario_impacts,
        };
        if context.is_empty() {
            debug!(sector = sector.code(), "no sector statistics available");
            None
        } else {
            Some(context)
        }
    }

    async fn assess_pair(
        &self,
        sector: SectorCode,
        pair: AssessmentPair,
        request: GenerationRequest,
        framework: FrameworkKind,
        sanitizer: ResponseSanitizer,
    ) -> PairOutcome {
        let label = format!("{}/{}", pair.category, pair.subcategory);
        let attempted = self
            .retry
            .run(&label, || self.generator.assess(&request))
            .await;

        match attempted.result {
            Ok(raw) => {
                let sanitized = sanitizer.sanitize(&raw, framework, pair.orientation);
                let record = self.score(sector, pair, framework, sanitized);
                debug!(
                    pair = %label,
                    composite = record.composite_score,
                    attempts = attempted.attempts,
                    "pair assessed"
                );
                PairOutcome::Assessed { record }
            }
            Err(error) => {
                warn!(
                    pair = %label,
                    attempts = attempted.attempts,
                    %error,
                    "pair assessment failed"
                );
                PairOutcome::Failed {
                    failure: PairFailure {
                        pair,
                        retryable: error.is_retryable(),
                        error: error.to_string(),
                        attempts: attempted.attempts,
                    },
                }
            }
        }
    }
}
