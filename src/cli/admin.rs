//! Maintenance of the reference tables.
//!
//! Every write goes through an [`AdminCapability`], which can only be
//! obtained from [`authorize`].
use super::ui;
use crate::core::config::AppConfig;
use crate::core::reference::{
    Collection, ConversionRatio, ProductType, ReferenceRecord, RiskFlag, RiskLevel, YieldRecord,
};
use crate::store::{ReferenceStore, get_record, list_records, put_record};
use anyhow::{Result, anyhow, bail};
use comfy_table::{Cell, CellAlignment};
use tracing::{debug, info};

/// Proof that the caller passed the admin check.
#[derive(Debug)]
pub struct AdminCapability {
    _private: (),
}

pub fn authorize(config: &AppConfig, supplied: Option<&str>) -> Result<AdminCapability> {
    let Some(expected) = config.admin_password.as_deref() else {
        bail!("Admin access is disabled: no admin_password is configured");
    };
    match supplied {
        Some(password) if password == expected => {
            debug!("Admin access granted");
            Ok(AdminCapability { _private: () })
        }
        Some(_) => bail!("Incorrect password."),
        None => bail!("Admin password required (use --password or EUDR_ADMIN_PASSWORD)"),
    }
}

/// Field values for one table. On add every field is required; on update
/// only the given fields change.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordPatch {
    Product {
        commodity: Option<String>,
        name: Option<String>,
    },
    Ratio {
        commodity: Option<String>,
        processed_product: Option<String>,
        ratio: Option<f64>,
    },
    Yield {
        country: Option<String>,
        commodity: Option<String>,
        yield_kg_per_ha: Option<f64>,
    },
    Risk {
        country: Option<String>,
        risk_level: Option<RiskLevel>,
        description: Option<String>,
    },
}

impl RecordPatch {
    pub fn collection(&self) -> Collection {
        match self {
            RecordPatch::Product { .. } => Collection::ProductTypes,
            RecordPatch::Ratio { .. } => Collection::ConversionRatios,
            RecordPatch::Yield { .. } => Collection::YieldData,
            RecordPatch::Risk { .. } => Collection::RiskFlags,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminAction {
    List(Collection),
    Add(RecordPatch),
    Update { id: String, patch: RecordPatch },
    Remove { collection: Collection, id: String },
}

fn table_label(collection: Collection) -> &'static str {
    match collection {
        Collection::ProductTypes => "product type",
        Collection::ConversionRatios => "conversion ratio",
        Collection::YieldData => "yield data",
        Collection::RiskFlags => "risk flag",
    }
}

fn fill_all<T>(value: Option<T>, collection: Collection) -> Result<T> {
    value.ok_or_else(|| anyhow!("Please fill all fields for {}.", table_label(collection)))
}

fn apply<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// Validates `record` and rejects it when another record already holds its
/// unique key.
async fn save_checked<R: ReferenceRecord>(
    store: &dyn ReferenceStore,
    _cap: &AdminCapability,
    record: R,
) -> Result<String> {
    record.validate()?;
    let key = record.unique_key();
    let existing: Vec<R> = list_records(store).await?;
    if let Some(clash) = existing
        .iter()
        .find(|other| other.id() != record.id() && other.unique_key() == key)
    {
        bail!(
            "A {} for {} already exists ({})",
            table_label(R::COLLECTION),
            key,
            clash.id()
        );
    }
    put_record(store, &record).await
}

async fn fetch<R: ReferenceRecord>(store: &dyn ReferenceStore, id: &str) -> Result<R> {
    get_record(store, id)
        .await?
        .ok_or_else(|| anyhow!("No {} with id {}", table_label(R::COLLECTION), id))
}

pub async fn add(
    store: &dyn ReferenceStore,
    cap: &AdminCapability,
    patch: RecordPatch,
) -> Result<String> {
    let collection = patch.collection();
    let id = match patch {
        RecordPatch::Product { commodity, name } => {
            let record = ProductType {
                id: String::new(),
                commodity: fill_all(commodity, collection)?,
                name: fill_all(name, collection)?,
            };
            save_checked(store, cap, record).await?
        }
        RecordPatch::Ratio {
            commodity,
            processed_product,
            ratio,
        } => {
            let record = ConversionRatio {
                id: String::new(),
                commodity: fill_all(commodity, collection)?,
                processed_product: fill_all(processed_product, collection)?,
                ratio: fill_all(ratio, collection)?,
            };
            save_checked(store, cap, record).await?
        }
        RecordPatch::Yield {
            country,
            commodity,
            yield_kg_per_ha,
        } => {
            let record = YieldRecord {
                id: String::new(),
                country: fill_all(country, collection)?,
                commodity: fill_all(commodity, collection)?,
                yield_kg_per_ha: fill_all(yield_kg_per_ha, collection)?,
            };
            save_checked(store, cap, record).await?
        }
        RecordPatch::Risk {
            country,
            risk_level,
            description,
        } => {
            let record = RiskFlag {
                id: String::new(),
                country: fill_all(country, collection)?,
                risk_level: fill_all(risk_level, collection)?,
                description: fill_all(description, collection)?,
            };
            save_checked(store, cap, record).await?
        }
    };
    info!("Successfully added to {}: {}", collection, id);
    Ok(id)
}

pub async fn update(
    store: &dyn ReferenceStore,
    cap: &AdminCapability,
    id: &str,
    patch: RecordPatch,
) -> Result<()> {
    let collection = patch.collection();
    match patch {
        RecordPatch::Product { commodity, name } => {
            let mut record: ProductType = fetch(store, id).await?;
            apply(&mut record.commodity, commodity);
            apply(&mut record.name, name);
            save_checked(store, cap, record).await?;
        }
        RecordPatch::Ratio {
            commodity,
            processed_product,
            ratio,
        } => {
            let mut record: ConversionRatio = fetch(store, id).await?;
            apply(&mut record.commodity, commodity);
            apply(&mut record.processed_product, processed_product);
            apply(&mut record.ratio, ratio);
            save_checked(store, cap, record).await?;
        }
        RecordPatch::Yield {
            country,
            commodity,
            yield_kg_per_ha,
        } => {
            let mut record: YieldRecord = fetch(store, id).await?;
            apply(&mut record.country, country);
            apply(&mut record.commodity, commodity);
            apply(&mut record.yield_kg_per_ha, yield_kg_per_ha);
            save_checked(store, cap, record).await?;
        }
        RecordPatch::Risk {
            country,
            risk_level,
            description,
        } => {
            let mut record: RiskFlag = fetch(store, id).await?;
            apply(&mut record.country, country);
            apply(&mut record.risk_level, risk_level);
            apply(&mut record.description, description);
            save_checked(store, cap, record).await?;
        }
    }
    info!("Successfully updated in {}: {}", collection, id);
    Ok(())
}

pub async fn remove(
    store: &dyn ReferenceStore,
    _cap: &AdminCapability,
    collection: Collection,
    id: &str,
) -> Result<()> {
    if !store.delete(collection, id).await? {
        bail!("No {} with id {}", table_label(collection), id);
    }
    info!("Successfully deleted from {}: {}", collection, id);
    Ok(())
}

fn number_cell(value: f64) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

pub async fn render_table(store: &dyn ReferenceStore, collection: Collection) -> Result<String> {
    let mut table = ui::new_styled_table();
    let rows = match collection {
        Collection::ProductTypes => {
            table.set_header(vec![
                ui::header_cell("Id"),
                ui::header_cell("Commodity"),
                ui::header_cell("Name"),
            ]);
            let records: Vec<ProductType> = list_records(store).await?;
            for r in &records {
                table.add_row(vec![Cell::new(&r.id), Cell::new(&r.commodity), Cell::new(&r.name)]);
            }
            records.len()
        }
        Collection::ConversionRatios => {
            table.set_header(vec![
                ui::header_cell("Id"),
                ui::header_cell("Commodity"),
                ui::header_cell("Processed Product"),
                ui::header_cell("Ratio"),
            ]);
            let records: Vec<ConversionRatio> = list_records(store).await?;
            for r in &records {
                table.add_row(vec![
                    Cell::new(&r.id),
                    Cell::new(&r.commodity),
                    Cell::new(&r.processed_product),
                    number_cell(r.ratio),
                ]);
            }
            records.len()
        }
        Collection::YieldData => {
            table.set_header(vec![
                ui::header_cell("Id"),
                ui::header_cell("Country"),
                ui::header_cell("Commodity"),
                ui::header_cell("Yield (kg/ha/yr)"),
            ]);
            let records: Vec<YieldRecord> = list_records(store).await?;
            for r in &records {
                table.add_row(vec![
                    Cell::new(&r.id),
                    Cell::new(&r.country),
                    Cell::new(&r.commodity),
                    number_cell(r.yield_kg_per_ha),
                ]);
            }
            records.len()
        }
        Collection::RiskFlags => {
            table.set_header(vec![
                ui::header_cell("Id"),
                ui::header_cell("Country"),
                ui::header_cell("Risk Level"),
                ui::header_cell("Description"),
            ]);
            let records: Vec<RiskFlag> = list_records(store).await?;
            for r in &records {
                table.add_row(vec![
                    Cell::new(&r.id),
                    Cell::new(&r.country),
                    Cell::new(r.risk_level),
                    Cell::new(&r.description),
                ]);
            }
            records.len()
        }
    };

    let title = ui::style_text(
        &format!("{} ({rows})", collection.name()),
        ui::StyleType::Title,
    );
    Ok(format!("{title}\n\n{table}"))
}

pub async fn run(
    action: AdminAction,
    store: &dyn ReferenceStore,
    cap: &AdminCapability,
) -> Result<()> {
    match action {
        AdminAction::List(collection) => {
            println!("{}", render_table(store, collection).await?);
        }
        AdminAction::Add(patch) => {
            let collection = patch.collection();
            let id = add(store, cap, patch).await?;
            println!(
                "{} {}",
                ui::style_text(&format!("Successfully added to {collection}:"), ui::StyleType::Success),
                id
            );
        }
        AdminAction::Update { id, patch } => {
            let collection = patch.collection();
            update(store, cap, &id, patch).await?;
            println!(
                "{} {}",
                ui::style_text(&format!("Successfully updated in {collection}:"), ui::StyleType::Success),
                id
            );
        }
        AdminAction::Remove { collection, id } => {
            remove(store, cap, collection, &id).await?;
            println!(
                "{} {}",
                ui::style_text(&format!("Successfully deleted from {collection}:"), ui::StyleType::Success),
                id
            );
        }
    }
    Ok(())
}
