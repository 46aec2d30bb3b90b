use serde::{Deserialize, Serialize};
use std::fmt;

/// Industry grouping used to select a weighting profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorCode {
    Energy,
    Manufacturing,
    Agriculture,
    Technology,
    FoodBeverage,
}

/// Keyword families checked in declaration order; first containment match wins.
const INDUSTRY_KEYWORDS: [(SectorCode, &[&str]); 5] = [
    (
        SectorCode::Energy,
        &[
            "energy",
            "oil",
            "gas",
            "petroleum",
            "utilities",
            "power",
            "electricity",
            "coal",
            "mining",
        ],
    ),
    (
        SectorCode::Manufacturing,
        &[
            "manufacturing",
            "industrial",
            "automotive",
            "chemicals",
            "materials",
            "steel",
            "cement",
            "construction",
        ],
    ),
    (
        SectorCode::Agriculture,
        &[
            "agriculture",
            "farming",
            "forestry",
            "fishing",
            "livestock",
            "crops",
        ],
    ),
    (
        SectorCode::Technology,
        &[
            "technology",
            "tech",
            "software",
            "hardware",
            "it",
            "digital",
            "cloud",
            "data",
            "telecommunications",
        ],
    ),
    (
        SectorCode::FoodBeverage,
        &[
            "food",
            "beverage",
            "restaurant",
            "grocery",
            "consumer goods",
            "retail food",
            "packaged goods",
        ],
    ),
];

impl SectorCode {
    pub const ALL: [SectorCode; 5] = [
        SectorCode::Energy,
        SectorCode::Manufacturing,
        SectorCode::Agriculture,
        SectorCode::Technology,
        SectorCode::FoodBeverage,
    ];

    /// Sector assumed when an industry description matches no keyword.
    pub const FALLBACK: SectorCode = SectorCode::Manufacturing;

    pub const fn code(self) -> &'static str {
        match self {
            SectorCode::Energy => "energy",
            SectorCode::Manufacturing => "manufacturing",
            SectorCode::Agriculture => "agriculture",
            SectorCode::Technology => "technology",
            SectorCode::FoodBeverage => "food_beverage",
        }
    }

    /// Parse a sector identifier after normalisation (`"Food & Beverage"` -> `food_beverage`).
    pub fn from_code(raw: &str) -> Option<Self> {
        let normalized = normalize_sector_code(raw);
        Self::ALL
            .into_iter()
            .find(|sector| sector.code() == normalized)
    }

    /// Map a free-form industry description onto the closest sector.
    pub fn from_industry(industry: &str) -> Self {
        let lowered = industry.to_lowercase();
        INDUSTRY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| lowered.contains(keyword)))
            .map(|(sector, _)| *sector)
            .unwrap_or(Self::FALLBACK)
    }
}

impl fmt::Display for SectorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Lower-case, collapse runs of whitespace and ampersands into one underscore.
pub fn normalize_sector_code(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '&')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
