//! Base price resolution.
//!
//! Two routes exist:
//!
//! - **Area office route**: find the newest `wef` the purchase's area office
//!   has on or before the booking instant, then search rows effective at that
//!   `wef` from most to least specific.
//! - **Plant route**: purchases tied to a processing plant are priced by
//!   supplier and source type alone, newest row first.
//!
//! Either route falls back from the current price table to the archived one.
//! Misses never raise errors; they end in [`Resolution::Unpriced`] and a price
//! of zero. Only missing identifying fields are errors.

use chrono::{DateTime, Utc};
use serde::Serialize;

use milkprice_core::{AreaOfficeId, CollectionPointId, DomainError, DomainResult, SupplierId};

use crate::config::{MissingSupplierPolicy, PricingConfig};
use crate::model::{CollectionPoint, Price, Purchase};
use crate::reference::{ReferenceData, Routing, resolve_routing};
use crate::table::{PriceTable, PriceTableKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    AreaOffice,
    Plant,
}

/// How specific the matched row was, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    CollectionPointAndSupplier,
    SupplierOnly,
    CollectionPointOnly,
    Wildcard,
}

impl MatchTier {
    fn requires_collection_point(self) -> bool {
        matches!(
            self,
            MatchTier::CollectionPointAndSupplier | MatchTier::CollectionPointOnly
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnpricedReason {
    /// Neither the purchase nor its collection point yields an area office.
    UnknownAreaOffice,
    /// No row for the area office is effective at the booking instant.
    NoEffectiveDate,
    /// An effective date exists but no row matches at any tier.
    NoMatchingTier,
    /// Plant route found nothing in either table.
    NoPlantPrice,
    /// Plant route could not find the purchase's supplier.
    UnknownSupplier,
}

/// Outcome of resolving one purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// The purchase carried its own price.
    Override { price: Price },
    Matched {
        price: Price,
        route: Route,
        table: PriceTableKind,
        tier: MatchTier,
        wef: DateTime<Utc>,
    },
    Unpriced { reason: UnpricedReason },
}

impl Resolution {
    /// Resolved price; zero when unpriced.
    pub fn price(&self) -> Price {
        match self {
            Resolution::Override { price } | Resolution::Matched { price, .. } => *price,
            Resolution::Unpriced { .. } => Price::ZERO,
        }
    }

    pub fn is_priced(&self) -> bool {
        !matches!(self, Resolution::Unpriced { .. })
    }
}

/// Resolver over one immutable snapshot of price and reference tables.
#[derive(Debug, Clone)]
pub struct PriceResolver<'a> {
    current: &'a PriceTable,
    archived: &'a PriceTable,
    reference: &'a ReferenceData,
    config: PricingConfig,
}

impl<'a> PriceResolver<'a> {
    pub fn new(
        current: &'a PriceTable,
        archived: &'a PriceTable,
        reference: &'a ReferenceData,
    ) -> Self {
        Self {
            current,
            archived,
            reference,
            config: PricingConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PricingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Base price for `purchase`, zero when nothing matches.
    pub fn base_price(&self, purchase: &Purchase) -> DomainResult<Price> {
        self.resolve(purchase).map(|r| r.price())
    }

    /// Plant-route price for `purchase`, zero when nothing matches.
    pub fn plant_base_price(&self, purchase: &Purchase) -> DomainResult<Price> {
        self.resolve_plant(purchase).map(|r| r.price())
    }

    pub fn resolve(&self, purchase: &Purchase) -> DomainResult<Resolution> {
        if let Some(price) = purchase.override_price(self.config.zero_override_is_unset) {
            tracing::debug!(purchase_id = %purchase.id, %price, "explicit price kept");
            return Ok(Resolution::Override { price });
        }

        match resolve_routing(purchase, self.reference) {
            Routing::Plant => self.resolve_plant(purchase),
            Routing::AreaOffice {
                area_office,
                collection_point,
            } => self.resolve_area_office(purchase, area_office, collection_point),
        }
    }

    pub fn resolve_plant(&self, purchase: &Purchase) -> DomainResult<Resolution> {
        if let Some(price) = purchase.override_price(self.config.zero_override_is_unset) {
            return Ok(Resolution::Override { price });
        }

        let at = purchase.require_booking_instant()?;
        let supplier_id = purchase.require_supplier_id()?;

        let Some(supplier) = self.reference.supplier(supplier_id) else {
            return match self.config.missing_supplier {
                MissingSupplierPolicy::Zero => {
                    tracing::warn!(
                        purchase_id = %purchase.id,
                        supplier_id = %supplier_id,
                        "unknown supplier on plant route"
                    );
                    Ok(Resolution::Unpriced {
                        reason: UnpricedReason::UnknownSupplier,
                    })
                }
                MissingSupplierPolicy::Fail => Err(DomainError::not_found(format!(
                    "supplier {supplier_id} referenced by purchase {}",
                    purchase.id
                ))),
            };
        };

        let source_type = &supplier.supplier_type_id;
        let attempts = [
            (MatchTier::SupplierOnly, Some(supplier_id)),
            (MatchTier::Wildcard, None),
        ];

        for table in [self.current, self.archived] {
            for (tier, supplier_filter) in attempts {
                if let Some(record) = table.latest_for_source(source_type, supplier_filter, at) {
                    tracing::debug!(
                        purchase_id = %purchase.id,
                        table = %table.kind(),
                        ?tier,
                        wef = %record.wef,
                        price = %record.price,
                        "plant price matched"
                    );
                    return Ok(Resolution::Matched {
                        price: record.price,
                        route: Route::Plant,
                        table: table.kind(),
                        tier,
                        wef: record.wef,
                    });
                }
            }
        }

        tracing::debug!(purchase_id = %purchase.id, %source_type, "no plant price");
        Ok(Resolution::Unpriced {
            reason: UnpricedReason::NoPlantPrice,
        })
    }

    fn resolve_area_office(
        &self,
        purchase: &Purchase,
        area_office: Option<&AreaOfficeId>,
        collection_point: Option<&CollectionPoint>,
    ) -> DomainResult<Resolution> {
        let at = purchase.require_booking_instant()?;
        let supplier_id = purchase.require_supplier_id()?;
        let source_type = purchase.require_supplier_type_id()?;

        let Some(area_office) = area_office else {
            tracing::debug!(purchase_id = %purchase.id, "no area office");
            return Ok(Resolution::Unpriced {
                reason: UnpricedReason::UnknownAreaOffice,
            });
        };

        // The table that yields the date is the table that yields the price.
        let (table, wef) = match self.effective_date(area_office, at) {
            Some(found) => found,
            None => {
                tracing::debug!(
                    purchase_id = %purchase.id,
                    area_office = %area_office,
                    booked_at = %at,
                    "no effective price date"
                );
                return Ok(Resolution::Unpriced {
                    reason: UnpricedReason::NoEffectiveDate,
                });
            }
        };

        let cp_id = collection_point.map(|cp| &cp.id);
        let tiers: [(MatchTier, Option<&SupplierId>, Option<&CollectionPointId>); 4] = [
            (MatchTier::CollectionPointAndSupplier, Some(supplier_id), cp_id),
            (MatchTier::SupplierOnly, Some(supplier_id), None),
            (MatchTier::CollectionPointOnly, None, cp_id),
            (MatchTier::Wildcard, None, None),
        ];

        for (tier, supplier, cp) in tiers {
            if tier.requires_collection_point() && cp_id.is_none() {
                continue;
            }
            if let Some(record) = table.find_effective(area_office, source_type, wef, supplier, cp) {
                tracing::debug!(
                    purchase_id = %purchase.id,
                    area_office = %area_office,
                    table = %table.kind(),
                    ?tier,
                    wef = %wef,
                    price = %record.price,
                    "area office price matched"
                );
                return Ok(Resolution::Matched {
                    price: record.price,
                    route: Route::AreaOffice,
                    table: table.kind(),
                    tier,
                    wef,
                });
            }
        }

        tracing::debug!(
            purchase_id = %purchase.id,
            area_office = %area_office,
            table = %table.kind(),
            wef = %wef,
            "no tier matched"
        );
        Ok(Resolution::Unpriced {
            reason: UnpricedReason::NoMatchingTier,
        })
    }

    fn effective_date(
        &self,
        area_office: &AreaOfficeId,
        at: DateTime<Utc>,
    ) -> Option<(&'a PriceTable, DateTime<Utc>)> {
        [self.current, self.archived]
            .into_iter()
            .find_map(|table| table.latest_wef(area_office, at).map(|wef| (table, wef)))
    }
}

/// Base price for one purchase with the default configuration.
pub fn resolve_base_price(
    purchase: &Purchase,
    current: &PriceTable,
    archived: &PriceTable,
    reference: &ReferenceData,
) -> DomainResult<Price> {
    PriceResolver::new(current, archived, reference).base_price(purchase)
}

/// Plant-route price for one purchase with the default configuration.
///
/// Only the supplier table of `reference` is consulted.
pub fn resolve_plant_base_price(
    purchase: &Purchase,
    current: &PriceTable,
    archived: &PriceTable,
    reference: &ReferenceData,
) -> DomainResult<Price> {
    PriceResolver::new(current, archived, reference).plant_base_price(purchase)
}
