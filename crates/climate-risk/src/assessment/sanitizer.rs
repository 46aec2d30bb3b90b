use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::domain::{
    FrameworkKind, Metric, Orientation, PeerComparison, SanitizedResponse, SourceCitation,
    SubScores,
};
use super::taxonomy::{Placeholders, Taxonomy};

pub const DEFAULT_SCORE: u8 = 3;
pub const SCORE_RANGE: (u8, u8) = (1, 5);
pub const RANKING_RANGE: (u8, u8) = (1, 6);
pub const REPORTED_COMPOSITE_RANGE: (f64, f64) = (0.0, 5.0);
pub const MAX_SOURCES: usize = 4;
pub const MAX_PEERS: usize = 5;
const MISSING_URL: &str = "#";

/// Turns an untrusted generator response into a fully typed, bounded record.
///
/// Never fails: every absent or malformed field falls back to a default or
/// to the taxonomy's placeholder text.
#[derive(Debug, Clone, Copy)]
pub struct ResponseSanitizer {
    placeholders: &'static Placeholders,
}

impl Default for ResponseSanitizer {
    fn default() -> Self {
        Self::for_taxonomy(Taxonomy::Transition)
    }
}

impl ResponseSanitizer {
    pub fn for_taxonomy(taxonomy: Taxonomy) -> Self {
        Self {
            placeholders: taxonomy.placeholders(),
        }
    }

    pub fn sanitize(
        &self,
        raw: &Value,
        framework: FrameworkKind,
        orientation: Orientation,
    ) -> SanitizedResponse {
        let empty = Map::new();
        let root = raw.as_object().unwrap_or(&empty);
        let peer_block = root
            .get("peerComparison")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let rankings_block = peer_block
            .get("rankings")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let metrics = framework.metrics(orientation);
        let sub_scores = SubScores::collect(framework, orientation, |metric| {
            bounded_score(root.get(metric.score_field()), SCORE_RANGE)
        });
        let rankings: BTreeMap<Metric, u8> = metrics
            .iter()
            .map(|metric| {
                let rank = bounded_score(rankings_block.get(metric.ranking_field()), RANKING_RANGE);
                (*metric, rank)
            })
            .collect();

        SanitizedResponse {
            sub_scores,
            reported_composite: reported_composite(root.get("overallRisk")),
            narrative: text_or(root.get("narrative"), self.placeholders.narrative),
            reasoning: text_or(root.get("reasoning"), self.placeholders.reasoning),
            peer_comparison: PeerComparison {
                peers: peers(peer_block.get("peers")),
                rankings,
                rationale: text_or(peer_block.get("rationale"), self.placeholders.peer_rationale),
            },
            sources: self.sources(root.get("sources")),
        }
    }

    fn sources(&self, value: Option<&Value>) -> Vec<SourceCitation> {
        let Some(entries) = value.and_then(Value::as_array) else {
            return self
                .placeholders
                .fallback_sources
                .iter()
                .map(|source| source.to_citation())
                .collect();
        };

        entries
            .iter()
            .filter_map(|entry| self.source(entry))
            .take(MAX_SOURCES)
            .collect()
    }

    fn source(&self, entry: &Value) -> Option<SourceCitation> {
        let placeholders = self.placeholders;
        match entry {
            Value::String(url) => Some(SourceCitation {
                title: placeholders.source_title.to_string(),
                url: url.trim().to_string(),
                organization: placeholders.source_organization.to_string(),
                relevance: placeholders.source_relevance.to_string(),
            }),
            Value::Object(fields) => Some(SourceCitation {
                title: text_or(fields.get("title"), placeholders.source_title),
                url: text_or(fields.get("url"), MISSING_URL),
                organization: text_or(fields.get("organization"), placeholders.source_organization),
                relevance: text_or(fields.get("relevance"), placeholders.default_relevance),
            }),
            _ => None,
        }
    }
}

/// Numeric value from a JSON number or numeric string.
fn numeric(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn bounded_score(value: Option<&Value>, (min, max): (u8, u8)) -> u8 {
    match numeric(value) {
        Some(raw) => raw.round().clamp(f64::from(min), f64::from(max)) as u8,
        None => DEFAULT_SCORE,
    }
}

fn reported_composite(value: Option<&Value>) -> f64 {
    let (min, max) = REPORTED_COMPOSITE_RANGE;
    numeric(value).map_or(f64::from(DEFAULT_SCORE), |raw| raw.clamp(min, max))
}

fn text_or(value: Option<&Value>, placeholder: &str) -> String {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(placeholder)
        .to_string()
}

fn peers(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .take(MAX_PEERS)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_strings_are_accepted() {
        assert_eq!(bounded_score(Some(&json!("4")), SCORE_RANGE), 4);
        assert_eq!(bounded_score(Some(&json!(" 2.6 ")), SCORE_RANGE), 3);
        assert_eq!(bounded_score(Some(&json!("four")), SCORE_RANGE), DEFAULT_SCORE);
    }

    #[test]
    fn rankings_use_the_wider_range() {
        assert_eq!(bounded_score(Some(&json!(6)), RANKING_RANGE), 6);
        assert_eq!(bounded_score(Some(&json!(6)), SCORE_RANGE), 5);
        assert_eq!(bounded_score(Some(&json!(-3)), RANKING_RANGE), 1);
    }

    #[test]
    fn reported_composite_keeps_zero() {
        assert_eq!(reported_composite(Some(&json!(0))), 0.0);
        assert_eq!(reported_composite(Some(&json!(7.5))), 5.0);
        assert_eq!(reported_composite(Some(&json!(2.35))), 2.35);
        assert_eq!(reported_composite(None), 3.0);
    }

    #[test]
    fn blank_text_uses_placeholder() {
        assert_eq!(text_or(Some(&json!("   ")), "pending"), "pending");
        assert_eq!(text_or(Some(&json!(12)), "pending"), "pending");
        assert_eq!(text_or(Some(&json!(" ok ")), "pending"), "ok");
    }
}
