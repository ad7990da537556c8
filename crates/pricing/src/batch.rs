//! Batch price attachment.
//!
//! Resolves every purchase of a load once against the same resolver. A
//! purchase that cannot be priced because of bad input is reported and
//! skipped; it never aborts the run.

use std::time::Instant;

use serde::Serialize;

use milkprice_core::{DomainError, PurchaseId};

use crate::model::{Price, Purchase};
use crate::resolver::{PriceResolver, Resolution};
use crate::table::PriceTableKind;

/// A purchase with its attached base price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedPurchase {
    pub purchase_id: PurchaseId,
    /// The explicit price the purchase arrived with, if any.
    pub price_before_attach: Option<Price>,
    pub price: Price,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingFailure {
    pub purchase_id: PurchaseId,
    #[serde(serialize_with = "serialize_error")]
    pub error: DomainError,
}

fn serialize_error<S: serde::Serializer>(error: &DomainError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PricingSummary {
    pub total: usize,
    pub overridden: usize,
    pub matched_current: usize,
    pub matched_archived: usize,
    pub unpriced: usize,
    pub failed: usize,
}

impl PricingSummary {
    fn record(&mut self, resolution: &Resolution) {
        match resolution {
            Resolution::Override { .. } => self.overridden += 1,
            Resolution::Matched {
                table: PriceTableKind::Current,
                ..
            } => self.matched_current += 1,
            Resolution::Matched {
                table: PriceTableKind::Archived,
                ..
            } => self.matched_archived += 1,
            Resolution::Unpriced { .. } => self.unpriced += 1,
        }
    }
}

/// Result of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PricingRun {
    pub priced: Vec<PricedPurchase>,
    pub failures: Vec<PricingFailure>,
    pub summary: PricingSummary,
}

/// Attach a base price to every purchase in `purchases`.
pub fn attach_prices<'p>(
    resolver: &PriceResolver<'_>,
    purchases: impl IntoIterator<Item = &'p Purchase>,
) -> PricingRun {
    let started = Instant::now();
    let mut run = PricingRun::default();

    for purchase in purchases {
        run.summary.total += 1;
        match resolver.resolve(purchase) {
            Ok(resolution) => {
                run.summary.record(&resolution);
                run.priced.push(PricedPurchase {
                    purchase_id: purchase.id.clone(),
                    price_before_attach: purchase.price,
                    price: resolution.price(),
                    resolution,
                });
            }
            Err(error) => {
                tracing::warn!(purchase_id = %purchase.id, %error, "purchase could not be priced");
                run.summary.failed += 1;
                run.failures.push(PricingFailure {
                    purchase_id: purchase.id.clone(),
                    error,
                });
            }
        }
    }

    let s = run.summary;
    tracing::info!(
        total = s.total,
        overridden = s.overridden,
        matched_current = s.matched_current,
        matched_archived = s.matched_archived,
        unpriced = s.unpriced,
        failed = s.failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "pricing complete"
    );

    run
}
