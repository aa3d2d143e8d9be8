use super::admin::AdminCapability;
use super::ui;
use crate::core::reference::{Collection, ReferenceData, ReferenceRecord};
use crate::store::{ReferenceStore, is_empty, put_record};
use anyhow::{Result, bail};
use indicatif::ProgressBar;
use tracing::info;

async fn put_all<R: ReferenceRecord>(
    store: &dyn ReferenceStore,
    records: &[R],
    pb: &ProgressBar,
) -> Result<()> {
    for record in records {
        put_record(store, record).await?;
        pb.inc(1);
    }
    Ok(())
}

async fn clear(store: &dyn ReferenceStore) -> Result<()> {
    for collection in Collection::ALL {
        for (id, _) in store.entries(collection).await? {
            store.delete(collection, &id).await?;
        }
    }
    Ok(())
}

/// Loads `data` into the store. A non-empty store is refused unless `force`
/// is set, in which case its contents are replaced.
pub async fn seed(
    store: &dyn ReferenceStore,
    _cap: &AdminCapability,
    data: &ReferenceData,
    force: bool,
) -> Result<usize> {
    if !is_empty(store).await? {
        if !force {
            bail!("Reference store already contains data; use --force to replace it");
        }
        info!("Clearing existing reference data");
        clear(store).await?;
    }

    let pb = ui::new_progress_bar(data.len() as u64, true);
    pb.set_message("Seeding reference data...");
    put_all(store, &data.product_types, &pb).await?;
    put_all(store, &data.conversion_ratios, &pb).await?;
    put_all(store, &data.yield_records, &pb).await?;
    put_all(store, &data.risk_flags, &pb).await?;
    pb.finish_and_clear();

    info!(records = data.len(), "Seeding complete");
    Ok(data.len())
}

pub async fn run(store: &dyn ReferenceStore, cap: &AdminCapability, force: bool) -> Result<()> {
    let data = ReferenceData::defaults()?;
    let count = seed(store, cap, &data, force).await?;
    println!(
        "{} {count} records loaded",
        ui::style_text("Seeding complete!", ui::StyleType::Success)
    );
    Ok(())
}
