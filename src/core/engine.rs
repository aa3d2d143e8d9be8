//! Turns a processed-product quantity into a raw-commodity equivalent, a
//! planted-area estimate and a country risk rating.
//!
//! [`evaluate`] is a pure function of the request and the reference index.
//! It stops at the first missing piece of reference data and never returns
//! a partially filled result.
use crate::core::index::ReferenceIndex;
use crate::core::reference::RiskLevel;
use rust_decimal::{Decimal, RoundingStrategy, prelude::*};
use std::fmt::Display;
use thiserror::Error;
use tracing::debug;

pub const UNKNOWN_RISK_LABEL: &str = "Low/Unknown";
pub const UNKNOWN_RISK_DESCRIPTION: &str = "No specific risk flags found for this country.";

const RAW_EQUIVALENT_DECIMALS: u32 = 2;
const PLANTED_AREA_DECIMALS: u32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRequest {
    pub commodity: String,
    pub product_id: String,
    pub quantity_kg: f64,
    pub origin_country: String,
}

impl CalculationRequest {
    pub fn new(
        commodity: impl Into<String>,
        product_id: impl Into<String>,
        quantity_kg: f64,
        origin_country: impl Into<String>,
    ) -> Self {
        Self {
            commodity: commodity.into(),
            product_id: product_id.into(),
            quantity_kg,
            origin_country: origin_country.into(),
        }
    }

    /// True when every field is filled in and the quantity is a finite,
    /// positive number.
    pub fn is_complete(&self) -> bool {
        !self.commodity.is_empty()
            && !self.product_id.is_empty()
            && !self.origin_country.is_empty()
            && self.quantity_kg.is_finite()
            && self.quantity_kg > 0.0
    }
}

/// Risk rating attached to a result. Countries without a flag are rated
/// [`RiskRating::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskRating {
    Flagged(RiskLevel),
    Unknown,
}

impl Display for RiskRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskRating::Flagged(level) => write!(f, "{level}"),
            RiskRating::Unknown => write!(f, "{UNKNOWN_RISK_LABEL}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculationResult {
    pub raw_equivalent_kg: f64,
    pub planted_area_hectares: f64,
    pub risk_level: RiskRating,
    pub risk_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationFailure {
    #[error("Calculation request is incomplete")]
    IncompleteRequest,

    #[error("Processed product '{product_id}' not found for raw commodity {commodity}.")]
    ProductNotFound {
        commodity: String,
        product_id: String,
    },

    #[error("Conversion ratio for {product} ({commodity}) not found.")]
    ConversionRatioMissing { commodity: String, product: String },

    #[error("Yield data for {commodity} in {country} not found or is zero.")]
    YieldDataMissing { commodity: String, country: String },
}

impl CalculationFailure {
    /// Quiet failures mean "nothing to show yet" and should not be reported
    /// to the user as errors.
    pub fn is_quiet(&self) -> bool {
        matches!(self, CalculationFailure::IncompleteRequest)
    }
}

/// Rounds to `dp` decimal places, half away from zero.
///
/// Rounding works on the exact binary value of `value`, so 1.005 (stored as
/// 1.00499999...) rounds down to 1.00.
pub fn round_dp(value: f64, dp: u32) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or_else(|| {
            let factor = 10f64.powi(dp as i32);
            (value * factor).round() / factor
        })
}

pub fn evaluate(
    request: &CalculationRequest,
    index: &ReferenceIndex,
) -> Result<CalculationResult, CalculationFailure> {
    if !request.is_complete() {
        debug!(?request, "Incomplete calculation request");
        return Err(CalculationFailure::IncompleteRequest);
    }

    let product = index
        .find_product_type(&request.product_id, &request.commodity)
        .ok_or_else(|| CalculationFailure::ProductNotFound {
            commodity: request.commodity.clone(),
            product_id: request.product_id.clone(),
        })?;
    let commodity = product.commodity.as_str();

    let conversion = index
        .find_conversion_ratio(commodity, &product.name)
        .ok_or_else(|| CalculationFailure::ConversionRatioMissing {
            commodity: commodity.to_string(),
            product: product.name.clone(),
        })?;
    let raw_equivalent_kg = round_dp(
        request.quantity_kg * conversion.ratio,
        RAW_EQUIVALENT_DECIMALS,
    );

    let yield_record = index
        .find_yield(&request.origin_country, commodity)
        .ok_or_else(|| CalculationFailure::YieldDataMissing {
            commodity: commodity.to_string(),
            country: request.origin_country.clone(),
        })?;
    // Area follows from the already rounded equivalent
    let planted_area_hectares = round_dp(
        raw_equivalent_kg / yield_record.yield_kg_per_ha,
        PLANTED_AREA_DECIMALS,
    );

    let (risk_level, risk_description) = match index.find_risk_flag(&request.origin_country) {
        Some(flag) => (RiskRating::Flagged(flag.risk_level), flag.description.clone()),
        None => (RiskRating::Unknown, UNKNOWN_RISK_DESCRIPTION.to_string()),
    };

    debug!(
        product = %product.name,
        ratio = conversion.ratio,
        yield_kg_per_ha = yield_record.yield_kg_per_ha,
        raw_equivalent_kg,
        planted_area_hectares,
        "Calculation complete"
    );

    Ok(CalculationResult {
        raw_equivalent_kg,
        planted_area_hectares,
        risk_level,
        risk_description,
    })
}
