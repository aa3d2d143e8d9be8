use eudr::AppCommand;
use eudr::cli::admin::{AdminAction, RecordPatch};
use eudr::cli::calculate::CalculateArgs;
use eudr::cli::list::ListTarget;
use eudr::core::reference::{Collection, RiskLevel};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

mod test_utils {
    use super::*;

    /// Writes a config whose store and reports live under `root`.
    pub fn write_config(root: &Path) -> PathBuf {
        let config_path = root.join("config.yaml");
        let config_content = format!(
            r#"
data_path: "{}"
report_dir: "{}"
admin_password: "EFI"
"#,
            root.join("data").display(),
            root.join("reports").display()
        );
        fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }

    pub fn calculate(product: &str, quantity: &str, country: &str, report: bool) -> AppCommand {
        AppCommand::Calculate(CalculateArgs {
            commodity: "Cocoa".to_string(),
            product: product.to_string(),
            quantity: quantity.to_string(),
            country: country.to_string(),
            report,
        })
    }

    pub fn reports(root: &Path) -> Vec<PathBuf> {
        match fs::read_dir(root.join("reports")) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub async fn seed(config_path: &str) {
        eudr::run_command(
            AppCommand::Seed {
                password: Some("EFI".to_string()),
                force: false,
            },
            Some(config_path),
        )
        .await
        .expect("Seeding should succeed");
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_report() {
    let root = TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(root.path());
    let config_path = config_path.to_str().unwrap();

    test_utils::seed(config_path).await;

    let result = eudr::run_command(
        test_utils::calculate("Cocoa butter", "1000", "Ivory Coast", true),
        Some(config_path),
    )
    .await;
    assert!(
        result.is_ok(),
        "Calculation failed with: {:?}",
        result.err()
    );

    let reports = test_utils::reports(root.path());
    assert_eq!(reports.len(), 1);
    let body = fs::read_to_string(&reports[0]).unwrap();
    info!(%body, "Generated report");
    assert!(body.starts_with("EUDR Due Diligence Report\n"));
    assert!(body.contains("  Processed Product: Cocoa butter\n"));
    assert!(body.contains("  Quantity: 1000 kg\n"));
    assert!(body.contains("  Raw Commodity Equivalent: 1200.00 kg\n"));
    assert!(body.contains("  Estimated Planted Area: 2.0000 hectares\n"));
    assert!(body.contains("  Risk Level: Medium\n"));
    assert!(body.ends_with("Generated by EUDR Calculator.\n"));
}

#[test_log::test(tokio::test)]
async fn test_calculation_failures() {
    let root = TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(root.path());
    let config_path = config_path.to_str().unwrap();

    test_utils::seed(config_path).await;

    // No cocoa yield for Vietnam in the default data
    let err = eudr::run_command(
        test_utils::calculate("Cocoa butter", "1000", "Vietnam", true),
        Some(config_path),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Yield data for Cocoa in Vietnam not found or is zero."
    );

    let err = eudr::run_command(
        test_utils::calculate("Roasted coffee", "1000", "Ghana", false),
        Some(config_path),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("not found for raw commodity Cocoa"));

    // Nothing is written for a failed calculation
    assert!(test_utils::reports(root.path()).is_empty());
}

#[test_log::test(tokio::test)]
async fn test_admin_edits_feed_the_calculator() {
    let root = TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(root.path());
    let config_path = config_path.to_str().unwrap();

    let admin = |action: AdminAction| AppCommand::Admin {
        password: Some("EFI".to_string()),
        action,
    };

    for patch in [
        RecordPatch::Product {
            commodity: Some("Cocoa".to_string()),
            name: Some("Cocoa nibs".to_string()),
        },
        RecordPatch::Ratio {
            commodity: Some("Cocoa".to_string()),
            processed_product: Some("Cocoa nibs".to_string()),
            ratio: Some(1.25),
        },
        RecordPatch::Yield {
            country: Some("Peru".to_string()),
            commodity: Some("Cocoa".to_string()),
            yield_kg_per_ha: Some(625.0),
        },
        RecordPatch::Risk {
            country: Some("Peru".to_string()),
            risk_level: Some(RiskLevel::High),
            description: Some("Forest loss in the Amazon region.".to_string()),
        },
    ] {
        eudr::run_command(admin(AdminAction::Add(patch)), Some(config_path))
            .await
            .expect("Admin add should succeed");
    }

    eudr::run_command(
        admin(AdminAction::List(Collection::ConversionRatios)),
        Some(config_path),
    )
    .await
    .expect("Admin list should succeed");

    eudr::run_command(
        AppCommand::List(ListTarget::Countries {
            commodity: "Cocoa".to_string(),
        }),
        Some(config_path),
    )
    .await
    .expect("Listing should succeed");

    eudr::run_command(
        test_utils::calculate("Cocoa nibs", "500", "Peru", true),
        Some(config_path),
    )
    .await
    .expect("Calculation should succeed");

    let reports = test_utils::reports(root.path());
    assert_eq!(reports.len(), 1);
    let body = fs::read_to_string(&reports[0]).unwrap();
    assert!(body.contains("  Raw Commodity Equivalent: 625.00 kg\n"));
    assert!(body.contains("  Estimated Planted Area: 1.0000 hectares\n"));
    assert!(body.contains("  Risk Level: High\n"));
    assert!(body.contains("  Risk Description: Forest loss in the Amazon region.\n"));
}

#[test_log::test(tokio::test)]
async fn test_admin_requires_password() {
    let root = TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(root.path());

    let err = eudr::run_command(
        AppCommand::Seed {
            password: Some("wrong".to_string()),
            force: false,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Incorrect password.");
}
