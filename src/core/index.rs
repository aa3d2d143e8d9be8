//! Lookup structures over a reference snapshot.
use crate::core::reference::{
    ConversionRatio, ProductType, ReferenceData, RiskFlag, YieldRecord,
};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

type PairIndex = HashMap<String, HashMap<String, usize>>;

/// Read-only index over a [`ReferenceData`] snapshot.
///
/// Every lookup is an exact, case-sensitive match. When the snapshot holds
/// several records for the same key the first one in snapshot order wins.
#[derive(Debug, Clone)]
pub struct ReferenceIndex {
    data: ReferenceData,
    products_by_id: HashMap<String, usize>,
    // commodity -> processed product name -> position
    ratios: PairIndex,
    // country -> commodity -> position
    yields: PairIndex,
    risks_by_country: HashMap<String, usize>,
}

fn insert_first(index: &mut PairIndex, outer: &str, inner: &str, pos: usize) {
    index
        .entry(outer.to_string())
        .or_default()
        .entry(inner.to_string())
        .or_insert(pos);
}

fn lookup_pair(index: &PairIndex, outer: &str, inner: &str) -> Option<usize> {
    index.get(outer).and_then(|m| m.get(inner)).copied()
}

impl ReferenceIndex {
    pub fn new(data: ReferenceData) -> Self {
        let mut products_by_id = HashMap::new();
        for (pos, product) in data.product_types.iter().enumerate() {
            products_by_id.entry(product.id.clone()).or_insert(pos);
        }

        let mut ratios = PairIndex::new();
        for (pos, ratio) in data.conversion_ratios.iter().enumerate() {
            insert_first(&mut ratios, &ratio.commodity, &ratio.processed_product, pos);
        }

        let mut yields = PairIndex::new();
        for (pos, record) in data.yield_records.iter().enumerate() {
            insert_first(&mut yields, &record.country, &record.commodity, pos);
        }

        let mut risks_by_country = HashMap::new();
        for (pos, flag) in data.risk_flags.iter().enumerate() {
            risks_by_country.entry(flag.country.clone()).or_insert(pos);
        }

        debug!(
            products = data.product_types.len(),
            ratios = data.conversion_ratios.len(),
            yields = data.yield_records.len(),
            risks = data.risk_flags.len(),
            "Built reference index"
        );

        Self {
            data,
            products_by_id,
            ratios,
            yields,
            risks_by_country,
        }
    }

    /// Finds a product by id, but only under the given commodity.
    pub fn find_product_type(&self, product_id: &str, commodity: &str) -> Option<&ProductType> {
        self.products_by_id
            .get(product_id)
            .map(|&pos| &self.data.product_types[pos])
            .filter(|p| p.commodity == commodity)
    }

    pub fn find_conversion_ratio(
        &self,
        commodity: &str,
        processed_product: &str,
    ) -> Option<&ConversionRatio> {
        lookup_pair(&self.ratios, commodity, processed_product)
            .map(|pos| &self.data.conversion_ratios[pos])
    }

    /// Finds the yield for a country and commodity. A non-positive yield
    /// counts as missing.
    pub fn find_yield(&self, country: &str, commodity: &str) -> Option<&YieldRecord> {
        lookup_pair(&self.yields, country, commodity)
            .map(|pos| &self.data.yield_records[pos])
            .filter(|y| y.yield_kg_per_ha > 0.0)
    }

    pub fn find_risk_flag(&self, country: &str) -> Option<&RiskFlag> {
        self.risks_by_country
            .get(country)
            .map(|&pos| &self.data.risk_flags[pos])
    }

    /// Distinct commodities across product types, sorted.
    pub fn list_commodities(&self) -> Vec<String> {
        self.data
            .product_types
            .iter()
            .map(|p| p.commodity.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Product types of a commodity, sorted by name.
    pub fn list_products_for(&self, commodity: &str) -> Vec<&ProductType> {
        let mut products: Vec<&ProductType> = self
            .data
            .product_types
            .iter()
            .filter(|p| p.commodity == commodity)
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }

    /// Distinct countries that have a yield record for the commodity, sorted.
    pub fn list_countries_for(&self, commodity: &str) -> Vec<String> {
        self.data
            .yield_records
            .iter()
            .filter(|y| y.commodity == commodity)
            .map(|y| y.country.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
