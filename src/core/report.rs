//! Plain-text due diligence report.
use crate::core::engine::{CalculationRequest, CalculationResult};

/// Renders the report body for a successful calculation.
///
/// `quantity` is the quantity as the user entered it, so "1000.50" is not
/// reported as "1000.5". The output depends only on the arguments. Where the
/// report ends up, and under which name, is up to the caller (see
/// [`report_file_name`]).
pub fn format_report(
    request: &CalculationRequest,
    quantity: &str,
    result: &CalculationResult,
    product_name: &str,
) -> String {
    format!(
        "EUDR Due Diligence Report

Product details:
  Raw Commodity: {commodity}
  Processed Product: {product_name}
  Quantity: {quantity} kg
  Origin Country: {country}

Conversion details:
  Raw Commodity Equivalent: {raw:.2} kg

Planted area estimation:
  Estimated Planted Area: {area:.4} hectares

Traceability and risk assessment:
  Risk Level: {level}
  Risk Description: {description}

Generated by EUDR Calculator.
",
        commodity = request.commodity,
        country = request.origin_country,
        raw = result.raw_equivalent_kg,
        area = result.planted_area_hectares,
        level = result.risk_level,
        description = result.risk_description,
    )
}

/// File name for a report generated at `timestamp_millis` (Unix epoch).
pub fn report_file_name(timestamp_millis: i64) -> String {
    format!("EUDR_Report_{timestamp_millis}.txt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::RiskRating;
    use crate::core::reference::RiskLevel;

    #[test]
    fn test_format_report_layout() {
        let request = CalculationRequest::new("Cocoa", "p1", 1000.0, "Brazil");
        let result = CalculationResult {
            raw_equivalent_kg: 1200.0,
            planted_area_hectares: 1.5,
            risk_level: RiskRating::Flagged(RiskLevel::High),
            risk_description: "Significant deforestation risk in Amazon and Cerrado biomes."
                .to_string(),
        };

        let expected = "EUDR Due Diligence Report

Product details:
  Raw Commodity: Cocoa
  Processed Product: Cocoa butter
  Quantity: 1000 kg
  Origin Country: Brazil

Conversion details:
  Raw Commodity Equivalent: 1200.00 kg

Planted area estimation:
  Estimated Planted Area: 1.5000 hectares

Traceability and risk assessment:
  Risk Level: High
  Risk Description: Significant deforestation risk in Amazon and Cerrado biomes.

Generated by EUDR Calculator.
";
        let report = format_report(&request, "1000", &result, "Cocoa butter");
        assert_eq!(report, expected);
        assert_eq!(format_report(&request, "1000", &result, "Cocoa butter"), report);
    }

    #[test]
    fn test_format_report_unknown_risk_and_entered_quantity() {
        let request = CalculationRequest::new("Coffee", "c1", 12.5, "Honduras");
        let result = CalculationResult {
            raw_equivalent_kg: 32.5,
            planted_area_hectares: 0.0542,
            risk_level: RiskRating::Unknown,
            risk_description: "No specific risk flags found for this country.".to_string(),
        };

        let report = format_report(&request, "12.50", &result, "Instant coffee");
        assert!(report.contains("  Quantity: 12.50 kg\n"));
        assert!(report.contains("  Raw Commodity Equivalent: 32.50 kg\n"));
        assert!(report.contains("  Estimated Planted Area: 0.0542 hectares\n"));
        assert!(report.contains("  Risk Level: Low/Unknown\n"));
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name(1_700_000_000_000),
            "EUDR_Report_1700000000000.txt"
        );
    }
}
