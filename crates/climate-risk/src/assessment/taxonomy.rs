use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::Orientation::{Opportunity as Opp, Risk};
use super::domain::{AssessmentPair, Orientation, SourceCitation};

/// Which fixed (or generated) pair set a run enumerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Taxonomy {
    #[default]
    Transition,
    Opportunity,
    Tcfd,
    Tnfd,
    Ecological,
}

type CategoryRow = (&'static str, Orientation, &'static [&'static str]);

const TRANSITION: &[CategoryRow] = &[
    (
        "Policy / Legal",
        Risk,
        &[
            "Carbon pricing and reporting obligations",
            "Mandates on and regulation of existing products and services",
            "Exposure to litigation",
        ],
    ),
    (
        "Technology",
        Risk,
        &[
            "Substitution of existing products and services",
            "Unsuccessful investment in new technologies",
        ],
    ),
    (
        "Market",
        Risk,
        &[
            "Changing customer behavior",
            "Increased cost of raw materials",
            "Uncertainty in market signals",
        ],
    ),
    (
        "Reputation",
        Risk,
        &[
            "Shift in consumer preferences",
            "Stigmatization of sector",
            "Increased shareholder concern/negative feedback",
        ],
    ),
];

const TCFD: &[CategoryRow] = &[
    (
        "Transition Risk - Policy & Legal",
        Risk,
        &[
            "Carbon pricing and emissions trading schemes",
            "Mandated emissions reduction targets and reporting",
            "Litigation risk from climate-related claims",
        ],
    ),
    (
        "Transition Risk - Technology",
        Risk,
        &[
            "Substitution of products/services with lower-emission alternatives",
            "Cost of transitioning to clean technology",
            "Early retirement of existing assets and stranded assets",
        ],
    ),
    (
        "Transition Risk - Market",
        Risk,
        &[
            "Shifting consumer preferences toward sustainable products",
            "Increased cost of raw materials and energy",
            "Uncertainty in market signals and repricing of assets",
        ],
    ),
    (
        "Transition Risk - Reputation",
        Risk,
        &[
            "Stakeholder concerns about climate commitments",
            "Greenwashing litigation and credibility risk",
            "Sector stigmatization and social license to operate",
        ],
    ),
    (
        "Physical Risk - Acute",
        Risk,
        &[
            "Increased severity of extreme weather events",
            "Wildfire exposure and asset damage",
            "Flooding and storm surge impacts on operations",
        ],
    ),
    (
        "Physical Risk - Chronic",
        Risk,
        &[
            "Rising mean temperatures and heat stress",
            "Sea level rise and coastal asset exposure",
            "Changes in precipitation patterns and water availability",
        ],
    ),
    (
        "Opportunity - Resource Efficiency",
        Opp,
        &[
            "Energy efficiency improvements and cost savings",
            "Water and waste reduction opportunities",
            "Material circularity and recycling revenue",
        ],
    ),
    (
        "Opportunity - Energy Source",
        Opp,
        &[
            "Shift to renewable energy and decentralized generation",
            "Green hydrogen and alternative fuel adoption",
            "Power purchase agreements and energy independence",
        ],
    ),
    (
        "Opportunity - Products & Services",
        Opp,
        &[
            "Low-carbon product development and innovation",
            "Climate adaptation solutions and services",
            "Green finance and sustainability-linked products",
        ],
    ),
    (
        "Opportunity - Markets & Resilience",
        Opp,
        &[
            "Access to new markets via sustainability leadership",
            "Supply chain resilience and diversification",
            "Climate adaptation and business continuity improvements",
        ],
    ),
];

const TNFD: &[CategoryRow] = &[
    (
        "Dependencies - Land & Freshwater",
        Risk,
        &[
            "Agricultural land use and soil health dependency",
            "Freshwater withdrawal and aquifer depletion",
            "Pollination and biological pest control reliance",
        ],
    ),
    (
        "Dependencies - Ocean & Coastal",
        Risk,
        &[
            "Marine resource extraction and fisheries dependency",
            "Coastal infrastructure and storm protection services",
            "Ocean-based supply chain and shipping route exposure",
        ],
    ),
    (
        "Impacts - Pollution & Waste",
        Risk,
        &[
            "Chemical and nutrient pollution to water bodies",
            "Plastic and solid waste generation across value chain",
            "Air emissions affecting local biodiversity",
        ],
    ),
    (
        "Impacts - Land Use Change",
        Risk,
        &[
            "Deforestation and habitat conversion in supply chains",
            "Urban expansion and greenfield development",
            "Agricultural intensification and monoculture expansion",
        ],
    ),
    (
        "Risks - Ecosystem Service Loss",
        Risk,
        &[
            "Loss of pollination and crop productivity decline",
            "Water purification and regulation service degradation",
            "Carbon sequestration capacity reduction",
        ],
    ),
    (
        "Risks - Regulatory & Legal",
        Risk,
        &[
            "Biodiversity regulations and protected area expansion",
            "Nature-related litigation and liability exposure",
            "Mandatory TNFD-aligned disclosure requirements",
        ],
    ),
    (
        "Risks - Market & Reputation",
        Risk,
        &[
            "Consumer and investor scrutiny on nature impacts",
            "Supply chain disruption from ecosystem degradation",
            "Loss of social license from biodiversity harm",
        ],
    ),
    (
        "Opportunities - Nature-Based Solutions",
        Opp,
        &[
            "Ecosystem restoration and natural capital investment",
            "Carbon and biodiversity credit generation",
            "Nature-based infrastructure and green corridors",
        ],
    ),
    (
        "Opportunities - Sustainable Products",
        Opp,
        &[
            "Certified sustainable and deforestation-free products",
            "Circular economy and bio-based material innovation",
            "Regenerative agriculture and sustainable sourcing",
        ],
    ),
    (
        "Opportunities - Nature-Positive Finance",
        Opp,
        &[
            "Biodiversity-linked bonds and green financing instruments",
            "Natural capital accounting and valuation leadership",
            "Blended finance for landscape-level conservation",
        ],
    ),
];

const ECOLOGICAL: &[CategoryRow] = &[
    (
        "Natural Capital Depletion",
        Risk,
        &[
            "Non-renewable resource dependency and depletion rates",
            "Soil degradation and land productivity loss",
            "Groundwater and freshwater depletion",
        ],
    ),
    (
        "Ecosystem Services Disruption",
        Risk,
        &[
            "Pollination and biological pest control loss",
            "Water purification and flood regulation degradation",
            "Carbon sequestration and climate regulation decline",
        ],
    ),
    (
        "Planetary Boundary Transgression",
        Risk,
        &[
            "Climate change boundary exceedance exposure",
            "Biodiversity loss and biosphere integrity risk",
            "Biogeochemical flow disruption (nitrogen/phosphorus)",
        ],
    ),
    (
        "Throughput & Material Limits",
        Risk,
        &[
            "Linear production model vulnerability",
            "Critical material scarcity and supply constraints",
            "Energy throughput and thermodynamic efficiency limits",
        ],
    ),
    (
        "Biodiversity & Habitat Loss",
        Risk,
        &[
            "Supply chain dependency on biodiversity-rich regions",
            "Regulatory risk from habitat protection laws",
            "Ecosystem collapse cascading effects",
        ],
    ),
    (
        "Circular Economy Transition",
        Risk,
        &[
            "Extended producer responsibility and waste regulation",
            "Product-as-service business model disruption",
            "Material recovery and recyclability requirements",
        ],
    ),
];

/// Canonical opportunity categories, in the order they are assessed.
pub const OPPORTUNITY_CATEGORIES: [&str; 5] = [
    "Resource Efficiency",
    "Energy Source",
    "Products and Services",
    "Markets",
    "Resilience",
];

const OPPORTUNITY_FALLBACK: &[CategoryRow] = &[
    (
        "Resource Efficiency",
        Opp,
        &[
            "Operational efficiency gains",
            "Resource optimization",
            "Waste reduction",
        ],
    ),
    (
        "Energy Source",
        Opp,
        &[
            "Renewable energy adoption",
            "Energy diversification",
            "Energy independence",
        ],
    ),
    (
        "Products and Services",
        Opp,
        &[
            "New product development",
            "Service innovation",
            "Market differentiation",
        ],
    ),
    (
        "Markets",
        Opp,
        &[
            "New market access",
            "Customer base expansion",
            "Revenue diversification",
        ],
    ),
    (
        "Resilience",
        Opp,
        &[
            "Business continuity",
            "Risk management",
            "Adaptive capabilities",
        ],
    ),
];

/// Upper bound on generated subcategories kept per opportunity category.
pub const MAX_GENERATED_PER_CATEGORY: usize = 3;

fn expand(rows: &[CategoryRow]) -> Vec<AssessmentPair> {
    rows.iter()
        .flat_map(|(category, orientation, subcategories)| {
            subcategories
                .iter()
                .map(move |subcategory| AssessmentPair::new(*category, *subcategory, *orientation))
        })
        .collect()
}

/// Citation baked into the binary for use when a response carries none.
#[derive(Debug, Clone, Copy)]
pub struct StaticSource {
    pub title: &'static str,
    pub url: &'static str,
    pub organization: &'static str,
    pub relevance: &'static str,
}

impl StaticSource {
    pub fn to_citation(self) -> SourceCitation {
        SourceCitation {
            title: self.title.to_string(),
            url: self.url.to_string(),
            organization: self.organization.to_string(),
            relevance: self.relevance.to_string(),
        }
    }
}

/// Per-taxonomy texts the sanitizer substitutes for missing fields.
#[derive(Debug, Clone, Copy)]
pub struct Placeholders {
    pub narrative: &'static str,
    pub reasoning: &'static str,
    pub peer_rationale: &'static str,
    /// Metadata for a source given as a bare string.
    pub source_title: &'static str,
    pub source_organization: &'static str,
    pub source_relevance: &'static str,
    /// Relevance for a structured source that omits one.
    pub default_relevance: &'static str,
    pub fallback_sources: [StaticSource; 2],
}

static CLIMATE_PLACEHOLDERS: Placeholders = Placeholders {
    narrative: "Analysis pending",
    reasoning: "Detailed reasoning will be provided once analysis is complete",
    peer_rationale: "Peer comparison analysis will be provided once complete",
    source_title: "Climate Risk Resource",
    source_organization: "Climate Authority",
    source_relevance: "General climate risk guidance",
    default_relevance: "Supports risk analysis",
    fallback_sources: [
        StaticSource {
            title: "TCFD Transition Risk Framework",
            url: "https://www.tcfdhub.org/resource/transition-risk-framework/",
            organization: "TCFD",
            relevance: "Framework for assessing climate transition risks",
        },
        StaticSource {
            title: "Climate Risks and Opportunities Assessment Guide",
            url: "https://www.carbontrust.com/our-work-and-impact/guides-reports-and-tools/transition-planning-how-to-assess-your-climate-risks-and-opportunities",
            organization: "Carbon Trust",
            relevance: "Methodology for identifying climate opportunities",
        },
    ],
};

static TCFD_PLACEHOLDERS: Placeholders = Placeholders {
    narrative: "TCFD risk analysis pending",
    reasoning: "Detailed TCFD-aligned reasoning will be provided once analysis is complete",
    peer_rationale: "Peer comparison analysis pending",
    source_title: "TCFD Resource",
    source_organization: "TCFD Authority",
    source_relevance: "TCFD framework guidance",
    default_relevance: "Supports TCFD risk analysis",
    fallback_sources: [
        StaticSource {
            title: "TCFD Recommendations",
            url: "https://www.fsb-tcfd.org/recommendations/",
            organization: "FSB TCFD",
            relevance: "Core TCFD framework recommendations",
        },
        StaticSource {
            title: "NGFS Scenarios",
            url: "https://www.ngfs.net/ngfs-scenarios-portal/",
            organization: "NGFS",
            relevance: "Climate scenario analysis for financial risk",
        },
    ],
};

static TNFD_PLACEHOLDERS: Placeholders = Placeholders {
    narrative: "TNFD nature-related risk analysis pending",
    reasoning: "Detailed TNFD LEAP-aligned reasoning will be provided once analysis is complete",
    peer_rationale: "Peer comparison analysis pending",
    source_title: "TNFD Resource",
    source_organization: "TNFD Authority",
    source_relevance: "TNFD framework guidance",
    default_relevance: "Supports TNFD nature-related risk analysis",
    fallback_sources: [
        StaticSource {
            title: "TNFD Recommendations v1.0",
            url: "https://tnfd.global/recommendations-of-the-tnfd/",
            organization: "TNFD",
            relevance: "Core TNFD framework recommendations",
        },
        StaticSource {
            title: "ENCORE Tool",
            url: "https://encore.naturalcapital.finance/",
            organization: "UNEP-WCMC",
            relevance: "Natural capital dependency and impact analysis",
        },
    ],
};

static ECOLOGICAL_PLACEHOLDERS: Placeholders = Placeholders {
    narrative: "Ecological risk analysis pending",
    reasoning: "Detailed ecological reasoning will be provided once analysis is complete",
    peer_rationale: "Peer comparison analysis pending",
    source_title: "Ecological Risk Resource",
    source_organization: "Ecological Authority",
    source_relevance: "Ecological risk guidance",
    default_relevance: "Supports ecological risk analysis",
    fallback_sources: [
        StaticSource {
            title: "TNFD Framework",
            url: "https://tnfd.global/",
            organization: "TNFD",
            relevance: "Nature-related financial disclosure framework",
        },
        StaticSource {
            title: "Planetary Boundaries",
            url: "https://www.stockholmresilience.org/research/planetary-boundaries.html",
            organization: "Stockholm Resilience Centre",
            relevance: "Safe operating space for humanity",
        },
    ],
};

impl Taxonomy {
    pub const ALL: [Taxonomy; 5] = [
        Taxonomy::Transition,
        Taxonomy::Opportunity,
        Taxonomy::Tcfd,
        Taxonomy::Tnfd,
        Taxonomy::Ecological,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Taxonomy::Transition => "transition",
            Taxonomy::Opportunity => "opportunity",
            Taxonomy::Tcfd => "tcfd",
            Taxonomy::Tnfd => "tnfd",
            Taxonomy::Ecological => "ecological",
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|taxonomy| taxonomy.code().eq_ignore_ascii_case(raw))
    }

    /// Static pair set; `None` for the opportunity taxonomy, which is generated per subject.
    pub fn fixed_pairs(self) -> Option<Vec<AssessmentPair>> {
        match self {
            Taxonomy::Transition => Some(expand(TRANSITION)),
            Taxonomy::Tcfd => Some(expand(TCFD)),
            Taxonomy::Tnfd => Some(expand(TNFD)),
            Taxonomy::Ecological => Some(expand(ECOLOGICAL)),
            Taxonomy::Opportunity => None,
        }
    }

    pub fn placeholders(self) -> &'static Placeholders {
        match self {
            Taxonomy::Transition | Taxonomy::Opportunity => &CLIMATE_PLACEHOLDERS,
            Taxonomy::Tcfd => &TCFD_PLACEHOLDERS,
            Taxonomy::Tnfd => &TNFD_PLACEHOLDERS,
            Taxonomy::Ecological => &ECOLOGICAL_PLACEHOLDERS,
        }
    }
}

pub fn opportunity_fallback_pairs() -> Vec<AssessmentPair> {
    expand(OPPORTUNITY_FALLBACK)
}

/// Turn a generated `{category: [subcategory, ...]}` object into opportunity pairs.
///
/// Canonical categories come first in their fixed order, then any extra
/// categories the generator invented. Non-string and blank entries are
/// dropped and each category keeps at most [`MAX_GENERATED_PER_CATEGORY`]
/// subcategories. Returns an empty list when nothing usable remains.
pub fn parse_opportunity_subcategories(raw: &Value) -> Vec<AssessmentPair> {
    let Some(object) = raw.as_object() else {
        return Vec::new();
    };

    let extras = object
        .keys()
        .filter(|key| !OPPORTUNITY_CATEGORIES.contains(&key.as_str()))
        .map(String::as_str);
    let ordered = OPPORTUNITY_CATEGORIES
        .into_iter()
        .filter(|category| object.contains_key(*category))
        .chain(extras);

    let mut pairs = Vec::new();
    for category in ordered {
        let Some(entries) = object.get(category).and_then(Value::as_array) else {
            continue;
        };
        let subcategories = entries
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .take(MAX_GENERATED_PER_CATEGORY);
        for subcategory in subcategories {
            pairs.push(AssessmentPair::new(category, subcategory, Orientation::Opportunity));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fixed_taxonomies_have_expected_sizes() {
        let sizes: Vec<_> = [
            Taxonomy::Transition,
            Taxonomy::Tcfd,
            Taxonomy::Tnfd,
            Taxonomy::Ecological,
        ]
        .into_iter()
        .map(|taxonomy| taxonomy.fixed_pairs().map(|pairs| pairs.len()))
        .collect();

        assert_eq!(sizes, vec![Some(11), Some(30), Some(30), Some(18)]);
        assert!(Taxonomy::Opportunity.fixed_pairs().is_none());
        assert_eq!(opportunity_fallback_pairs().len(), 15);
    }

    #[test]
    fn tcfd_opportunity_categories_are_oriented_as_opportunities() {
        let pairs = Taxonomy::Tcfd.fixed_pairs().expect("tcfd pairs");
        let opportunities = pairs
            .iter()
            .filter(|pair| pair.orientation == Orientation::Opportunity)
            .count();
        assert_eq!(opportunities, 12);
        assert!(pairs
            .iter()
            .filter(|pair| pair.category.starts_with("Physical"))
            .all(|pair| pair.orientation == Orientation::Risk));
    }

    #[test]
    fn transition_pairs_keep_declaration_order() {
        let pairs = Taxonomy::Transition.fixed_pairs().expect("transition pairs");
        assert_eq!(pairs[0].subcategory, "Carbon pricing and reporting obligations");
        assert_eq!(pairs[3].category, "Technology");
        assert_eq!(
            pairs[10].subcategory,
            "Increased shareholder concern/negative feedback"
        );
    }

    #[test]
    fn generated_subcategories_are_ordered_and_bounded() {
        let raw = json!({
            "Zero Waste": ["Packaging take-back"],
            "Markets": ["Green procurement", "  ", 7, "Export growth", "Public tenders", "Fourth"],
            "Resource Efficiency": ["LED retrofit"]
        });

        let pairs = parse_opportunity_subcategories(&raw);
        let labels: Vec<_> = pairs
            .iter()
            .map(|pair| (pair.category.as_str(), pair.subcategory.as_str()))
            .collect();

        assert_eq!(
            labels,
            vec![
                ("Resource Efficiency", "LED retrofit"),
                ("Markets", "Green procurement"),
                ("Markets", "Export growth"),
                ("Markets", "Public tenders"),
                ("Zero Waste", "Packaging take-back"),
            ]
        );
    }

    #[test]
    fn extra_categories_keep_response_order() {
        let raw = json!({
            "Zeta Ventures": ["Tidal leasing"],
            "Alpha Ventures": ["Biochar credits"],
            "Markets": ["Green procurement"]
        });

        let categories: Vec<_> = parse_opportunity_subcategories(&raw)
            .into_iter()
            .map(|pair| pair.category)
            .collect();

        assert_eq!(categories, vec!["Markets", "Zeta Ventures", "Alpha Ventures"]);
    }

    #[test]
    fn unusable_generated_subcategories_yield_nothing() {
        assert!(parse_opportunity_subcategories(&json!([])).is_empty());
        assert!(parse_opportunity_subcategories(&json!({"Markets": "one"})).is_empty());
    }

    #[test]
    fn taxonomy_codes_parse_case_insensitively() {
        assert_eq!(Taxonomy::from_code(" TNFD "), Some(Taxonomy::Tnfd));
        assert_eq!(Taxonomy::from_code("physical"), None);
    }
}
