use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::scoring::SectorCode;

/// Scenario year whose impacts are forwarded to the generation collaborator.
pub const HEADLINE_YEAR: i32 = 2030;
pub const HEADLINE_SCENARIOS: [&str; 2] = ["Net Zero 2050", "Current Policies"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorProfile {
    pub sector: SectorCode,
    pub sector_name: String,
    pub annual_emissions_mt_co2: Option<f64>,
    pub emissions_intensity: Option<f64>,
    pub emissions_trend: Option<String>,
    pub gdp_contribution_percent: Option<f64>,
    pub transition_risk_level: Option<String>,
    pub key_risks: Vec<String>,
    pub key_opportunities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioImpact {
    pub sector: SectorCode,
    pub scenario_name: String,
    pub year: i32,
    pub gdp_impact_percent: Option<f64>,
    pub carbon_price_usd: Option<f64>,
    pub investment_required_billions: Option<f64>,
    pub stranded_asset_risk_percent: Option<f64>,
}

impl ScenarioImpact {
    pub fn is_headline(&self) -> bool {
        self.year == HEADLINE_YEAR && HEADLINE_SCENARIOS.contains(&self.scenario_name.as_str())
    }
}

/// Optional supplementary statistics for one sector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorContext {
    pub profile: Option<SectorProfile>,
    pub scenario_impacts: Vec<ScenarioImpact>,
}

impl SectorContext {
    pub fn is_empty(&self) -> bool {
        self.profile.is_none() && self.scenario_impacts.is_empty()
    }

    /// 2030 rows for the headline scenarios, in [`HEADLINE_SCENARIOS`] order.
    pub fn headline_impacts(&self) -> Vec<ScenarioImpact> {
        HEADLINE_SCENARIOS
            .iter()
            .filter_map(|scenario| {
                self.scenario_impacts
                    .iter()
                    .find(|impact| impact.is_headline() && impact.scenario_name == *scenario)
                    .cloned()
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatisticsError {
    #[error("failed to read sector statistics: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid sector statistics CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row} names unknown sector `{code}`")]
    UnknownSector { row: usize, code: String },
    #[error("sector statistics unavailable: {0}")]
    Unavailable(String),
}

/// Source of sector profiles and scenario impacts. Missing data is `Ok`.
#[async_trait]
pub trait SectorStatisticsProvider: Send + Sync {
    async fn profile(&self, sector: SectorCode) -> Result<Option<SectorProfile>, StatisticsError>;

    async fn scenario_impacts(
        &self,
        sector: SectorCode,
    ) -> Result<Vec<ScenarioImpact>, StatisticsError>;
}

/// Process-local statistics, typically loaded from CSV exports at startup.
#[derive(Debug, Clone, Default)]
pub struct InMemorySectorStatistics {
    profiles: HashMap<SectorCode, SectorProfile>,
    impacts: HashMap<SectorCode, Vec<ScenarioImpact>>,
}

impl InMemorySectorStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: SectorProfile) -> Self {
        self.profiles.insert(profile.sector, profile);
        self
    }

    pub fn with_scenario_impact(mut self, impact: ScenarioImpact) -> Self {
        self.impacts.entry(impact.sector).or_default().push(impact);
        self
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    pub fn scenario_count(&self) -> usize {
        self.impacts.values().map(Vec::len).sum()
    }

    pub fn load_profiles_csv<R: Read>(&mut self, reader: R) -> Result<usize, StatisticsError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut loaded = 0;

        for (index, record) in csv_reader.deserialize::<ProfileRow>().enumerate() {
            let row = record?;
            let sector = parse_sector(&row.sector_code, index)?;
            self.profiles.insert(
                sector,
                SectorProfile {
                    sector,
                    sector_name: row.sector_name,
                    annual_emissions_mt_co2: row.annual_emissions_mt_co2,
                    emissions_intensity: row.emissions_intensity,
                    emissions_trend: row.emissions_trend,
                    gdp_contribution_percent: row.gdp_contribution_percent,
                    transition_risk_level: row.transition_risk_level,
                    key_risks: split_list(row.key_risks.as_deref()),
                    key_opportunities: split_list(row.key_opportunities.as_deref()),
                },
            );
            loaded += 1;
        }

        Ok(loaded)
    }

    pub fn load_scenarios_csv<R: Read>(&mut self, reader: R) -> Result<usize, StatisticsError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut loaded = 0;

        for (index, record) in csv_reader.deserialize::<ScenarioRow>().enumerate() {
            let row = record?;
            let sector = parse_sector(&row.sector_code, index)?;
            self.impacts.entry(sector).or_default().push(ScenarioImpact {
                sector,
                scenario_name: row.scenario_name,
                year: row.year,
                gdp_impact_percent: row.gdp_impact_percent,
                carbon_price_usd: row.carbon_price_usd,
                investment_required_billions: row.investment_required_billions,
                stranded_asset_risk_percent: row.stranded_asset_risk_percent,
            });
            loaded += 1;
        }

        Ok(loaded)
    }

    pub fn load_profiles_path<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<usize, StatisticsError> {
        let file = File::open(path)?;
        self.load_profiles_csv(file)
    }

    pub fn load_scenarios_path<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<usize, StatisticsError> {
        let file = File::open(path)?;
        self.load_scenarios_csv(file)
    }
}

#[async_trait]
impl SectorStatisticsProvider for InMemorySectorStatistics {
    async fn profile(&self, sector: SectorCode) -> Result<Option<SectorProfile>, StatisticsError> {
        Ok(self.profiles.get(&sector).cloned())
    }

    async fn scenario_impacts(
        &self,
        sector: SectorCode,
    ) -> Result<Vec<ScenarioImpact>, StatisticsError> {
        Ok(self.impacts.get(&sector).cloned().unwrap_or_default())
    }
}

// Data rows are 1-based after the header line.
fn parse_sector(code: &str, index: usize) -> Result<SectorCode, StatisticsError> {
    SectorCode::from_code(code).ok_or_else(|| StatisticsError::UnknownSector {
        row: index + 1,
        code: code.to_string(),
    })
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    sector_code: String,
    sector_name: String,
    annual_emissions_mt_co2: Option<f64>,
    emissions_intensity: Option<f64>,
    emissions_trend: Option<String>,
    gdp_contribution_percent: Option<f64>,
    transition_risk_level: Option<String>,
    key_risks: Option<String>,
    key_opportunities: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScenarioRow {
    sector_code: String,
    scenario_name: String,
    year: i32,
    gdp_impact_percent: Option<f64>,
    carbon_price_usd: Option<f64>,
    investment_required_billions: Option<f64>,
    stranded_asset_risk_percent: Option<f64>,
}
