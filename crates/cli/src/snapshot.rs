//! JSON snapshots written by the data loader.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use milkprice_pricing::{
    AreaOffice, CollectionPoint, PriceRecord, PriceTable, PriceTableKind, Purchase, ReferenceData,
    ReportedPrice, Supplier,
};

/// Everything one pricing run needs, as loaded from storage.
///
/// Missing sections are treated as empty tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub collection_points: Vec<CollectionPoint>,
    #[serde(default)]
    pub mcc_points: Vec<CollectionPoint>,
    #[serde(default)]
    pub area_offices: Vec<AreaOffice>,
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
    #[serde(default)]
    pub prices: Vec<PriceRecord>,
    #[serde(default)]
    pub archived_prices: Vec<PriceRecord>,
    #[serde(default)]
    pub purchases: Vec<Purchase>,
}

/// Snapshot with its tables indexed, ready for a resolver.
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub current: PriceTable,
    pub archived: PriceTable,
    pub reference: ReferenceData,
    pub purchases: Vec<Purchase>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("snapshot is not valid JSON")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        let snapshot = Self::from_json(&raw)
            .with_context(|| format!("failed to parse snapshot {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            purchases = snapshot.purchases.len(),
            prices = snapshot.prices.len(),
            archived_prices = snapshot.archived_prices.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    pub fn index(self) -> LoadedSnapshot {
        LoadedSnapshot {
            current: PriceTable::new(PriceTableKind::Current, self.prices),
            archived: PriceTable::new(PriceTableKind::Archived, self.archived_prices),
            reference: ReferenceData::new(
                self.collection_points,
                self.mcc_points,
                self.area_offices,
                self.suppliers,
            ),
            purchases: self.purchases,
        }
    }
}

/// Load `[{purchase_id, base_price}]` from `path`.
pub fn load_reported(path: &Path) -> anyhow::Result<Vec<ReportedPrice>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read reported prices {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse reported prices {}", path.display()))
}
