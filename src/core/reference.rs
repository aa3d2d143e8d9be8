//! Reference records and the snapshot the calculator works from

use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Display;
use std::str::FromStr;

/// The four named collections that make up the reference data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Collection {
    ProductTypes,
    ConversionRatios,
    YieldData,
    RiskFlags,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::ProductTypes,
        Collection::ConversionRatios,
        Collection::YieldData,
        Collection::RiskFlags,
    ];

    /// Storage name of the collection.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::ProductTypes => "product_types",
            Collection::ConversionRatios => "conversion_ratios",
            Collection::YieldData => "yield_data",
            Collection::RiskFlags => "risk_flags",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RiskLevel::Low => "Low",
                RiskLevel::Medium => "Medium",
                RiskLevel::High => "High",
            }
        )
    }
}

impl FromStr for RiskLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(anyhow!("Invalid risk level: {} (expected Low, Medium or High)", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductType {
    #[serde(default)]
    pub id: String,
    pub commodity: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRatio {
    #[serde(default)]
    pub id: String,
    pub commodity: String,
    pub processed_product: String,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldRecord {
    #[serde(default)]
    pub id: String,
    pub country: String,
    pub commodity: String,
    /// Kilograms per hectare per year.
    #[serde(rename = "yield")]
    pub yield_kg_per_ha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFlag {
    #[serde(default)]
    pub id: String,
    pub country: String,
    pub risk_level: RiskLevel,
    pub description: String,
}

/// A record that lives in one of the reference collections.
pub trait ReferenceRecord: Clone + Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);

    /// Checks that every field is present and usable. Says nothing about
    /// whether the values are correct.
    fn validate(&self) -> Result<()>;

    /// Key that must be unique within the collection.
    fn unique_key(&self) -> String;
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("Field '{}' must not be empty", field);
    }
    Ok(())
}

fn require_finite(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        bail!("Field '{}' must be a number, got {}", field, value);
    }
    Ok(())
}

impl ReferenceRecord for ProductType {
    const COLLECTION: Collection = Collection::ProductTypes;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> Result<()> {
        require("commodity", &self.commodity)?;
        require("name", &self.name)
    }

    fn unique_key(&self) -> String {
        format!("{} / {}", self.commodity, self.name)
    }
}

impl ReferenceRecord for ConversionRatio {
    const COLLECTION: Collection = Collection::ConversionRatios;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> Result<()> {
        require("commodity", &self.commodity)?;
        require("processedProduct", &self.processed_product)?;
        require_finite("ratio", self.ratio)
    }

    fn unique_key(&self) -> String {
        format!("{} / {}", self.commodity, self.processed_product)
    }
}

impl ReferenceRecord for YieldRecord {
    const COLLECTION: Collection = Collection::YieldData;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> Result<()> {
        require("country", &self.country)?;
        require("commodity", &self.commodity)?;
        require_finite("yield", self.yield_kg_per_ha)
    }

    fn unique_key(&self) -> String {
        format!("{} / {}", self.country, self.commodity)
    }
}

impl ReferenceRecord for RiskFlag {
    const COLLECTION: Collection = Collection::RiskFlags;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn validate(&self) -> Result<()> {
        require("country", &self.country)?;
        require("description", &self.description)
    }

    fn unique_key(&self) -> String {
        self.country.clone()
    }
}

/// An immutable, already-fetched copy of all four reference collections.
///
/// Record order is meaningful: lookups that find several candidates use the
/// first one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceData {
    #[serde(default)]
    pub product_types: Vec<ProductType>,
    #[serde(default)]
    pub conversion_ratios: Vec<ConversionRatio>,
    #[serde(default, rename = "yieldData")]
    pub yield_records: Vec<YieldRecord>,
    #[serde(default)]
    pub risk_flags: Vec<RiskFlag>,
}

impl ReferenceData {
    pub fn is_empty(&self) -> bool {
        self.product_types.is_empty()
            && self.conversion_ratios.is_empty()
            && self.yield_records.is_empty()
            && self.risk_flags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.product_types.len()
            + self.conversion_ratios.len()
            + self.yield_records.len()
            + self.risk_flags.len()
    }

    /// The dataset shipped with the tool, used to seed an empty store.
    pub fn defaults() -> Result<Self> {
        let yaml = include_str!("../../docs/default_reference.yaml");
        let data: Self = serde_yaml::from_str(yaml)
            .map_err(|e| anyhow!("Failed to parse default reference data: {e}"))?;
        Ok(data)
    }
}
