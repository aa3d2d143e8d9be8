use super::ui;
use crate::core::index::ReferenceIndex;
use crate::store::{ReferenceStore, load_snapshot};
use anyhow::Result;
use comfy_table::Cell;

/// What to enumerate for the calculator's choice lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListTarget {
    Commodities,
    Products { commodity: String },
    Countries { commodity: String },
}

pub fn render(target: &ListTarget, index: &ReferenceIndex) -> String {
    let mut table = ui::new_styled_table();
    let (title, empty_hint) = match target {
        ListTarget::Commodities => {
            table.set_header(vec![ui::header_cell("Raw Commodity")]);
            for commodity in index.list_commodities() {
                table.add_row(vec![Cell::new(commodity)]);
            }
            (
                "Raw commodities".to_string(),
                "No product types found. Run `eudr seed` to load the default data.".to_string(),
            )
        }
        ListTarget::Products { commodity } => {
            table.set_header(vec![ui::header_cell("Processed Product"), ui::header_cell("Id")]);
            for product in index.list_products_for(commodity) {
                table.add_row(vec![
                    Cell::new(&product.name),
                    Cell::new(ui::style_text(&product.id, ui::StyleType::Subtle)),
                ]);
            }
            (
                format!("Processed products of {commodity}"),
                format!("No processed products found for {commodity}."),
            )
        }
        ListTarget::Countries { commodity } => {
            table.set_header(vec![ui::header_cell("Origin Country")]);
            for country in index.list_countries_for(commodity) {
                table.add_row(vec![Cell::new(country)]);
            }
            (
                format!("Origin countries with yield data for {commodity}"),
                format!("No yield data found for {commodity}."),
            )
        }
    };

    let title = ui::style_text(&title, ui::StyleType::Title);
    if table.row_iter().next().is_none() {
        return format!("{title}\n\n{}", ui::style_text(&empty_hint, ui::StyleType::Subtle));
    }
    format!("{title}\n\n{table}")
}

pub async fn run(target: &ListTarget, store: &dyn ReferenceStore) -> Result<()> {
    let index = ReferenceIndex::new(load_snapshot(store).await?);
    println!("{}", render(target, &index));
    Ok(())
}
