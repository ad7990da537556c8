//! Indexed price tables.
//!
//! A batch run resolves thousands of purchases against the same snapshot, so
//! the rows are grouped once up front instead of re-filtering per purchase.
//! Every index lists rows newest `wef` first; rows sharing a `wef` keep the
//! order the loader supplied them in.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use milkprice_core::{AreaOfficeId, CollectionPointId, SupplierId, SupplierTypeId};

use crate::model::{PriceRecord, PriceStatus};

/// Which snapshot a table was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTableKind {
    Current,
    Archived,
}

impl core::fmt::Display for PriceTableKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PriceTableKind::Current => f.write_str("current"),
            PriceTableKind::Archived => f.write_str("archived"),
        }
    }
}

/// Read-only, indexed view over the active rows of one price table.
#[derive(Debug, Clone)]
pub struct PriceTable {
    kind: PriceTableKind,
    records: Vec<PriceRecord>,
    by_area_office: HashMap<AreaOfficeId, Vec<usize>>,
    by_area_source: HashMap<AreaOfficeId, HashMap<SupplierTypeId, Vec<usize>>>,
    by_source: HashMap<SupplierTypeId, Vec<usize>>,
}

impl PriceTable {
    /// Index `records`, dropping inactive rows.
    pub fn new(kind: PriceTableKind, records: impl IntoIterator<Item = PriceRecord>) -> Self {
        let mut inactive = 0usize;
        let records: Vec<PriceRecord> = records
            .into_iter()
            .filter(|r| {
                let active = r.status == PriceStatus::Active;
                if !active {
                    inactive += 1;
                }
                active
            })
            .collect();

        // Stable sort: equal `wef` keeps loader order.
        let mut order: Vec<usize> = (0..records.len()).collect();
        order.sort_by(|a, b| records[*b].wef.cmp(&records[*a].wef));

        let mut by_area_office: HashMap<AreaOfficeId, Vec<usize>> = HashMap::new();
        let mut by_area_source: HashMap<AreaOfficeId, HashMap<SupplierTypeId, Vec<usize>>> =
            HashMap::new();
        let mut by_source: HashMap<SupplierTypeId, Vec<usize>> = HashMap::new();

        for idx in order {
            let record = &records[idx];
            if let Some(area_office) = &record.area_office {
                by_area_office
                    .entry(area_office.clone())
                    .or_default()
                    .push(idx);
                by_area_source
                    .entry(area_office.clone())
                    .or_default()
                    .entry(record.source_type.clone())
                    .or_default()
                    .push(idx);
            }
            by_source
                .entry(record.source_type.clone())
                .or_default()
                .push(idx);
        }

        tracing::debug!(
            table = %kind,
            active = records.len(),
            inactive,
            area_offices = by_area_office.len(),
            "price table indexed"
        );

        Self {
            kind,
            records,
            by_area_office,
            by_area_source,
            by_source,
        }
    }

    pub fn empty(kind: PriceTableKind) -> Self {
        Self::new(kind, Vec::new())
    }

    pub fn kind(&self) -> PriceTableKind {
        self.kind
    }

    /// Active rows in loader order.
    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent `wef` not after `at` among the area office's rows, any source type.
    pub fn latest_wef(&self, area_office: &AreaOfficeId, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.by_area_office
            .get(area_office)?
            .iter()
            .map(|idx| self.records[*idx].wef)
            .find(|wef| *wef <= at)
    }

    /// First row effective exactly at `wef` whose supplier and collection point
    /// equal the given ones. `None` matches only wildcard rows.
    pub fn find_effective(
        &self,
        area_office: &AreaOfficeId,
        source_type: &SupplierTypeId,
        wef: DateTime<Utc>,
        supplier: Option<&SupplierId>,
        collection_point: Option<&CollectionPointId>,
    ) -> Option<&PriceRecord> {
        self.by_area_source
            .get(area_office)?
            .get(source_type)?
            .iter()
            .map(|idx| &self.records[*idx])
            .skip_while(|r| r.wef > wef)
            .take_while(|r| r.wef == wef)
            .find(|r| r.supplier.as_ref() == supplier && r.collection_point.as_ref() == collection_point)
    }

    /// Most recent row of `source_type` for `supplier` (or wildcard rows when
    /// `None`) effective at `at`, regardless of area office or collection point.
    pub fn latest_for_source(
        &self,
        source_type: &SupplierTypeId,
        supplier: Option<&SupplierId>,
        at: DateTime<Utc>,
    ) -> Option<&PriceRecord> {
        self.by_source
            .get(source_type)?
            .iter()
            .map(|idx| &self.records[*idx])
            .find(|r| r.wef <= at && r.supplier.as_ref() == supplier)
    }
}
