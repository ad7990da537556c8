//! Reference data and purchase routing.

use std::collections::HashMap;

use milkprice_core::{AreaOfficeId, CollectionPointId, Entity, SupplierId};

use crate::model::{AreaOffice, CollectionPoint, Purchase, Supplier};

/// Lookup tables for the records a purchase points at.
///
/// Collection points and milk chilling centers are separate pools even though
/// they share a shape; a purchase's `cp_id` is only looked up among CPs and
/// its `mcc_id` only among MCCs.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    collection_points: HashMap<CollectionPointId, CollectionPoint>,
    mcc_points: HashMap<CollectionPointId, CollectionPoint>,
    area_offices: HashMap<AreaOfficeId, AreaOffice>,
    suppliers: HashMap<SupplierId, Supplier>,
}

fn index_by_id<E>(items: impl IntoIterator<Item = E>) -> HashMap<E::Id, E>
where
    E: Entity,
{
    let mut map = HashMap::new();
    for item in items {
        // First record wins on duplicate ids.
        map.entry(item.id().clone()).or_insert(item);
    }
    map
}

impl ReferenceData {
    pub fn new(
        collection_points: impl IntoIterator<Item = CollectionPoint>,
        mcc_points: impl IntoIterator<Item = CollectionPoint>,
        area_offices: impl IntoIterator<Item = AreaOffice>,
        suppliers: impl IntoIterator<Item = Supplier>,
    ) -> Self {
        Self {
            collection_points: index_by_id(collection_points),
            mcc_points: index_by_id(mcc_points),
            area_offices: index_by_id(area_offices),
            suppliers: index_by_id(suppliers),
        }
    }

    /// Only suppliers; enough for plant-route pricing.
    pub fn with_suppliers(suppliers: impl IntoIterator<Item = Supplier>) -> Self {
        Self {
            suppliers: index_by_id(suppliers),
            ..Self::default()
        }
    }

    pub fn collection_point(&self, id: &CollectionPointId) -> Option<&CollectionPoint> {
        self.collection_points.get(id)
    }

    pub fn mcc_point(&self, id: &CollectionPointId) -> Option<&CollectionPoint> {
        self.mcc_points.get(id)
    }

    pub fn area_office(&self, id: &AreaOfficeId) -> Option<&AreaOffice> {
        self.area_offices.get(id)
    }

    pub fn supplier(&self, id: &SupplierId) -> Option<&Supplier> {
        self.suppliers.get(id)
    }
}

/// Where a purchase's price comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing<'a> {
    /// Price by plant rules (supplier and source type only).
    Plant,
    /// Price by area office rules.
    AreaOffice {
        area_office: Option<&'a AreaOfficeId>,
        collection_point: Option<&'a CollectionPoint>,
    },
}

/// Decide how `purchase` is priced.
///
/// A CP with a plant sends the purchase down the plant route, as does a plant
/// on the purchase itself. Otherwise the purchase's own area office wins over
/// the one reached through its collection point. A collection point's area
/// office only counts if it exists in the area office table.
pub fn resolve_routing<'a>(purchase: &'a Purchase, reference: &'a ReferenceData) -> Routing<'a> {
    let collection_point = if let Some(cp_id) = &purchase.cp_id {
        reference.collection_point(cp_id)
    } else if let Some(mcc_id) = &purchase.mcc_id {
        reference.mcc_point(mcc_id)
    } else {
        None
    };

    let via_plant = collection_point.is_some_and(|cp| cp.plant_id.is_some());
    if via_plant || purchase.plant_id.is_some() {
        return Routing::Plant;
    }

    let area_office = purchase.area_office_id.as_ref().or_else(|| {
        collection_point
            .and_then(|cp| cp.area_office_id.as_ref())
            .and_then(|id| reference.area_office(id))
            .map(|ao| &ao.id)
    });

    Routing::AreaOffice {
        area_office,
        collection_point,
    }
}
