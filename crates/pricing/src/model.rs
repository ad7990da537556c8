//! Records the resolver reads.
//!
//! These mirror what the data loader materializes from storage. Optional
//! source fields stay `Option`; nothing here is mutated during resolution.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use milkprice_core::{
    AreaOfficeId, CollectionPointId, DomainError, DomainResult, Entity, PlantId, PurchaseId,
    SupplierId, SupplierTypeId, ValueObject,
};

/// Base price per unit. Never negative.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Sentinel for "no price found".
    pub const ZERO: Price = Price(Decimal::ZERO);

    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount < Decimal::ZERO {
            return Err(DomainError::invalid_input(format!(
                "price must not be negative (got {amount})"
            )));
        }
        Ok(Self(amount))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl ValueObject for Price {}

impl TryFrom<Decimal> for Price {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Price::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A purchase awaiting a base price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    /// Explicit price captured at booking time; overrides any lookup.
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub cp_id: Option<CollectionPointId>,
    #[serde(default)]
    pub mcc_id: Option<CollectionPointId>,
    #[serde(default)]
    pub area_office_id: Option<AreaOfficeId>,
    #[serde(default)]
    pub plant_id: Option<PlantId>,
    #[serde(default)]
    pub supplier_type_id: Option<SupplierTypeId>,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
    #[serde(default)]
    pub booked_at: Option<DateTime<Utc>>,
    /// Time the purchase was recorded. Stands in for a missing `booked_at`.
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
}

impl Purchase {
    /// Minimal purchase with only an id; fill the rest with struct update syntax.
    pub fn new(id: PurchaseId) -> Self {
        Self {
            id,
            price: None,
            cp_id: None,
            mcc_id: None,
            area_office_id: None,
            plant_id: None,
            supplier_type_id: None,
            supplier_id: None,
            booked_at: None,
            time: None,
        }
    }

    /// Instant the price must be effective at.
    pub fn booking_instant(&self) -> Option<DateTime<Utc>> {
        self.booked_at.or(self.time)
    }

    /// Explicit override, if one applies.
    pub fn override_price(&self, zero_is_unset: bool) -> Option<Price> {
        self.price.filter(|p| !(zero_is_unset && p.is_zero()))
    }

    pub(crate) fn require_booking_instant(&self) -> DomainResult<DateTime<Utc>> {
        self.booking_instant().ok_or_else(|| {
            DomainError::invalid_input(format!("purchase {} has no booked_at or time", self.id))
        })
    }

    pub(crate) fn require_supplier_id(&self) -> DomainResult<&SupplierId> {
        self.supplier_id.as_ref().ok_or_else(|| {
            DomainError::invalid_input(format!("purchase {} has no supplier_id", self.id))
        })
    }

    pub(crate) fn require_supplier_type_id(&self) -> DomainResult<&SupplierTypeId> {
        self.supplier_type_id.as_ref().ok_or_else(|| {
            DomainError::invalid_input(format!("purchase {} has no supplier_type_id", self.id))
        })
    }
}

/// Collection point (farmer CP) or milk chilling center (MCC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionPoint {
    pub id: CollectionPointId,
    #[serde(default)]
    pub area_office_id: Option<AreaOfficeId>,
    #[serde(default)]
    pub plant_id: Option<PlantId>,
}

impl Entity for CollectionPoint {
    type Id = CollectionPointId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Area office: the regional unit owning pricing rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaOffice {
    pub id: AreaOfficeId,
}

impl Entity for AreaOffice {
    type Id = AreaOfficeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub supplier_type_id: SupplierTypeId,
    #[serde(default)]
    pub area_office_id: Option<AreaOfficeId>,
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Price row status. Only active rows are ever consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceStatus {
    #[default]
    Active,
    Inactive,
}

/// A price rule, current or archived.
///
/// `supplier` and `collection_point` set to `None` are wildcards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Absent on plant rows, which are matched by source type alone.
    #[serde(default)]
    pub area_office: Option<AreaOfficeId>,
    pub source_type: SupplierTypeId,
    #[serde(default)]
    pub supplier: Option<SupplierId>,
    #[serde(default)]
    pub collection_point: Option<CollectionPointId>,
    /// With effect from.
    pub wef: DateTime<Utc>,
    pub price: Price,
    #[serde(default)]
    pub status: PriceStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn negative_price_is_rejected() {
        let err = Price::new(Decimal::new(-150, 2)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(msg) if msg.contains("-1.50")));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn booking_instant_falls_back_to_time() {
        let time = Utc.with_ymd_and_hms(2024, 3, 1, 6, 30, 0).unwrap();
        let mut purchase = Purchase {
            time: Some(time),
            ..Purchase::new(PurchaseId::new("p-1"))
        };
        assert_eq!(purchase.booking_instant(), Some(time));

        let booked = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        purchase.booked_at = Some(booked);
        assert_eq!(purchase.booking_instant(), Some(booked));
    }

    #[test]
    fn zero_override_can_be_treated_as_unset() {
        let purchase = Purchase {
            price: Some(Price::ZERO),
            ..Purchase::new(PurchaseId::new("p-2"))
        };
        assert_eq!(purchase.override_price(false), Some(Price::ZERO));
        assert_eq!(purchase.override_price(true), None);
    }

    #[test]
    fn price_record_deserializes_with_wildcards() {
        let json = r#"{
            "area_office": "ao-1",
            "source_type": "farmer",
            "supplier": null,
            "wef": "2024-01-01T00:00:00Z",
            "price": 112.5
        }"#;
        let record: PriceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.supplier, None);
        assert_eq!(record.collection_point, None);
        assert_eq!(record.status, PriceStatus::Active);
        assert_eq!(record.price.amount(), Decimal::new(1125, 1));
    }

    #[test]
    fn negative_price_fails_to_deserialize() {
        let json = r#"{"id": "p-3", "price": -4}"#;
        assert!(serde_json::from_str::<Purchase>(json).is_err());
    }
}
