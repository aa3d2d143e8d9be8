use super::ui;
use crate::core::config::AppConfig;
use crate::core::engine::{
    CalculationFailure, CalculationRequest, CalculationResult, evaluate,
};
use crate::core::index::ReferenceIndex;
use crate::core::report::{format_report, report_file_name};
use crate::store::{ReferenceStore, load_snapshot};
use anyhow::{Context, Result, bail};
use chrono::Utc;
use comfy_table::Cell;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Calculator input as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct CalculateArgs {
    pub commodity: String,
    /// Product id, or a product name within the commodity.
    pub product: String,
    pub quantity: String,
    pub country: String,
    pub report: bool,
}

pub struct Calculation {
    pub request: CalculationRequest,
    pub product_name: Option<String>,
    pub outcome: Result<CalculationResult, CalculationFailure>,
}

/// Maps a product name to its id when the user did not pass an id.
fn resolve_product_id(index: &ReferenceIndex, commodity: &str, product: &str) -> String {
    if index.find_product_type(product, commodity).is_some() {
        return product.to_string();
    }
    index
        .list_products_for(commodity)
        .into_iter()
        .find(|p| p.name == product)
        .map_or_else(|| product.to_string(), |p| p.id.clone())
}

pub fn calculate(args: &CalculateArgs, index: &ReferenceIndex) -> Calculation {
    let commodity = args.commodity.trim();
    let product_id = resolve_product_id(index, commodity, args.product.trim());
    // Unparsable quantities count as not entered
    let quantity_kg = args.quantity.trim().parse::<f64>().unwrap_or(f64::NAN);

    let request = CalculationRequest::new(commodity, product_id, quantity_kg, args.country.trim());
    let product_name = index
        .find_product_type(&request.product_id, &request.commodity)
        .map(|p| p.name.clone());
    let outcome = evaluate(&request, index);

    Calculation {
        request,
        product_name,
        outcome,
    }
}

fn display_results(calculation: &Calculation) -> String {
    let result = calculation.outcome.as_ref().ok();

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Result"), ui::header_cell("Value")]);
    table.add_row(vec![
        Cell::new("Raw Commodity Equivalent"),
        ui::format_optional_cell(result.map(|r| r.raw_equivalent_kg), |v| format!("{v:.2} kg")),
    ]);
    table.add_row(vec![
        Cell::new("Estimated Planted Area"),
        ui::format_optional_cell(result.map(|r| r.planted_area_hectares), |v| {
            format!("{v:.4} hectares")
        }),
    ]);
    table.add_row(vec![
        Cell::new("Risk Level"),
        ui::risk_cell(result.map(|r| r.risk_level)),
    ]);
    if let Some(result) = result {
        table.add_row(vec![
            Cell::new("Risk Description"),
            Cell::new(&result.risk_description),
        ]);
    }

    let title = match &calculation.product_name {
        Some(name) => format!("{} ({})", name, calculation.request.commodity),
        None => "EUDR Calculator".to_string(),
    };
    format!("{}\n\n{table}", ui::style_text(&title, ui::StyleType::Title))
}

/// Writes a report body into `dir` and returns the file path.
pub fn write_report(dir: &Path, body: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    let path = dir.join(report_file_name(Utc::now().timestamp_millis()));
    std::fs::write(&path, body)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(path)
}

pub async fn run(
    args: &CalculateArgs,
    store: &dyn ReferenceStore,
    config: &AppConfig,
) -> Result<()> {
    info!("Running calculation...");
    let data = load_snapshot(store).await?;
    if data.is_empty() {
        warn!("Reference store is empty. Run `eudr seed` to load the default data.");
    }
    let index = ReferenceIndex::new(data);
    let calculation = calculate(args, &index);

    println!("{}", display_results(&calculation));

    let result = match &calculation.outcome {
        Ok(result) => result,
        Err(failure) if failure.is_quiet() => {
            debug!("Nothing to calculate yet");
            if args.report {
                bail!("Please complete the calculation before generating a report.");
            }
            return Ok(());
        }
        Err(failure) => return Err(failure.clone().into()),
    };

    if args.report {
        let product_name = calculation.product_name.as_deref().unwrap_or("N/A");
        let body = format_report(
            &calculation.request,
            args.quantity.trim(),
            result,
            product_name,
        );
        let path = write_report(&config.report_dir(), &body)?;
        println!(
            "\n{} {}",
            ui::style_text("Report downloaded successfully:", ui::StyleType::Success),
            path.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reference::ReferenceData;
    use crate::store::{MemoryStore, put_record};
    use tempfile::TempDir;

    fn defaults_index() -> ReferenceIndex {
        let mut data = ReferenceData::defaults().unwrap();
        for (i, product) in data.product_types.iter_mut().enumerate() {
            product.id = format!("p{i}");
        }
        ReferenceIndex::new(data)
    }

    fn args(commodity: &str, product: &str, quantity: &str, country: &str) -> CalculateArgs {
        CalculateArgs {
            commodity: commodity.to_string(),
            product: product.to_string(),
            quantity: quantity.to_string(),
            country: country.to_string(),
            report: false,
        }
    }

    #[test]
    fn test_calculate_by_product_name() {
        let index = defaults_index();
        let calculation = calculate(&args("Cocoa", "Cocoa butter", "1000", "Brazil"), &index);

        assert_eq!(calculation.request.product_id, "p0");
        assert_eq!(calculation.product_name.as_deref(), Some("Cocoa butter"));
        let result = calculation.outcome.expect("calculation should succeed");
        assert_eq!(result.raw_equivalent_kg, 1200.0);
        assert_eq!(result.planted_area_hectares, 1.5);
        assert_eq!(result.risk_level.to_string(), "High");
    }

    #[test]
    fn test_calculate_by_product_id() {
        let index = defaults_index();
        // p4 is Instant coffee (ratio 2.6); Vietnam coffee yield is 2500
        let calculation = calculate(&args("Coffee", "p4", " 500 ", "Vietnam"), &index);
        let result = calculation.outcome.expect("calculation should succeed");
        assert_eq!(result.raw_equivalent_kg, 1300.0);
        assert_eq!(result.planted_area_hectares, 0.52);
        assert_eq!(result.risk_level.to_string(), "Medium");
    }

    #[test]
    fn test_unparsable_quantity_is_incomplete() {
        let index = defaults_index();
        let calculation = calculate(&args("Cocoa", "Cocoa butter", "lots", "Brazil"), &index);
        assert!(display_results(&calculation).contains("N/A"));
        assert_eq!(
            calculation.outcome.as_ref().unwrap_err(),
            &CalculationFailure::IncompleteRequest
        );
    }

    #[test]
    fn test_product_name_from_other_commodity_is_not_found() {
        let index = defaults_index();
        let calculation = calculate(&args("Coffee", "Cocoa butter", "10", "Brazil"), &index);
        assert!(matches!(
            calculation.outcome,
            Err(CalculationFailure::ProductNotFound { .. })
        ));
        assert!(calculation.product_name.is_none());
    }

    #[tokio::test]
    async fn test_run_writes_report() -> Result<()> {
        let report_dir = TempDir::new()?;
        let config = AppConfig {
            report_dir: Some(report_dir.path().to_string_lossy().to_string()),
            ..AppConfig::default()
        };
        let store = MemoryStore::new();
        let data = ReferenceData::defaults()?;
        for product in &data.product_types {
            put_record(&store, product).await?;
        }
        for ratio in &data.conversion_ratios {
            put_record(&store, ratio).await?;
        }
        for record in &data.yield_records {
            put_record(&store, record).await?;
        }

        let mut request = args("Cocoa", "Cocoa butter", "1000.50", "Ivory Coast");
        request.report = true;
        run(&request, &store, &config).await?;

        let reports: Vec<PathBuf> = std::fs::read_dir(report_dir.path())?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        assert_eq!(reports.len(), 1);
        let name = reports[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("EUDR_Report_") && name.ends_with(".txt"));

        let body = std::fs::read_to_string(&reports[0])?;
        // Quantity is reported as entered
        assert!(body.contains("  Quantity: 1000.50 kg"));
        assert!(body.contains("  Raw Commodity Equivalent: 1200.60 kg"));
        assert!(body.contains("  Estimated Planted Area: 2.0010 hectares"));
        // No risk flags were stored
        assert!(body.contains("  Risk Level: Low/Unknown"));
        Ok(())
    }

    #[tokio::test]
    async fn test_run_failures() {
        let store = MemoryStore::new();
        let config = AppConfig::default();

        // Empty store: the product cannot be found
        let err = run(&args("Cocoa", "p1", "10", "Ghana"), &store, &config)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));

        // Incomplete input is not an error on its own
        assert!(run(&args("", "", "", ""), &store, &config).await.is_ok());

        let mut request = args("Cocoa", "p1", "", "Ghana");
        request.report = true;
        let err = run(&request, &store, &config).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please complete the calculation before generating a report."
        );
    }
}
