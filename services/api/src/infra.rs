use async_trait::async_trait;
use climate_risk::assessment::{
    FrameworkKind, GenerationClient, GenerationError, GenerationRequest,
    InMemorySectorStatistics, StatisticsError, Subject, Taxonomy,
};
use climate_risk::scoring::{WeightResolver, WeightTable, WeightTableError};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) weight_table_version: String,
}

/// Offline stand-in for the generation service.
///
/// Scores are derived from the subcategory text and the subject's carbon
/// intensity, so repeated runs are stable. Sources and opportunity
/// subcategories are left out and fall back to the built-in sets.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OfflineGenerator;

impl OfflineGenerator {
    fn intensity_bias(subject: &Subject) -> usize {
        let intensity = subject.carbon_intensity.trim().to_ascii_lowercase();
        usize::from(matches!(intensity.as_str(), "high" | "very_high"))
    }

    fn score(seed: usize, salt: usize, bias: usize) -> usize {
        ((seed / salt) % 4 + 1 + bias).min(5)
    }
}

#[async_trait]
impl GenerationClient for OfflineGenerator {
    async fn assess(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        let seed = request
            .subcategory
            .bytes()
            .fold(17usize, |acc, byte| acc.wrapping_mul(31).wrapping_add(usize::from(byte)));
        let bias = Self::intensity_bias(&request.subject);

        let mut response = json!({
            "likelihoodScore": Self::score(seed, 1, bias),
            "impactScore": Self::score(seed, 5, bias),
            "vulnerabilityScore": Self::score(seed, 7, 0),
            "exposureScore": Self::score(seed, 11, bias),
            "strategicMisalignmentScore": Self::score(seed, 13, 0),
            "mitigationReadinessScore": Self::score(seed, 17, 0),
            "marketReadinessScore": Self::score(seed, 19, 0),
            "valueCreationScore": Self::score(seed, 23, 0),
            "feasibilityScore": Self::score(seed, 29, 0),
            "narrative": format!(
                "Offline estimate for {} under {}.",
                request.subject.name, request.subcategory
            ),
        });
        if request.framework == FrameworkKind::Advanced {
            response["overallRisk"] = json!(Self::score(seed, 3, bias) as f64);
        }
        Ok(response)
    }

    async fn opportunity_subcategories(
        &self,
        _subject: &Subject,
    ) -> Result<Value, GenerationError> {
        Ok(json!({}))
    }
}

pub(crate) fn weight_resolver() -> Result<Arc<WeightResolver>, WeightTableError> {
    let table = WeightTable::standard()?;
    info!(version = table.version(), entries = table.len(), "weight table loaded");
    Ok(Arc::new(WeightResolver::new(Arc::new(table))))
}

pub(crate) fn load_statistics(
    profiles_csv: Option<&Path>,
    scenarios_csv: Option<&Path>,
) -> Result<InMemorySectorStatistics, StatisticsError> {
    let mut statistics = InMemorySectorStatistics::new();
    if let Some(path) = profiles_csv {
        let loaded = statistics.load_profiles_path(path)?;
        info!(path = %path.display(), loaded, "sector profiles loaded");
    }
    if let Some(path) = scenarios_csv {
        let loaded = statistics.load_scenarios_path(path)?;
        info!(path = %path.display(), loaded, "scenario impacts loaded");
    }
    Ok(statistics)
}

pub(crate) fn parse_taxonomy(raw: &str) -> Result<Taxonomy, String> {
    Taxonomy::from_code(raw).ok_or_else(|| {
        let known: Vec<_> = Taxonomy::ALL.iter().map(|taxonomy| taxonomy.code()).collect();
        format!("expected one of {}", known.join(", "))
    })
}

pub(crate) fn parse_framework(raw: &str) -> Result<FrameworkKind, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "standard" => Ok(FrameworkKind::Standard),
        "advanced" => Ok(FrameworkKind::Advanced),
        _ => Err("expected `standard` or `advanced`".to_string()),
    }
}
