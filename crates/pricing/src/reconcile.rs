//! Comparison of attached prices against externally reported base prices.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use milkprice_core::PurchaseId;

use crate::batch::PricedPurchase;
use crate::model::Price;

/// A base price some other system reported for a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedPrice {
    pub purchase_id: PurchaseId,
    pub base_price: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceMismatch {
    pub purchase_id: PurchaseId,
    pub computed: Price,
    pub reported: Price,
    /// `reported - computed`.
    pub difference: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    /// Purchases present on both sides.
    pub compared: usize,
    pub mismatches: Vec<PriceMismatch>,
    /// Reported purchases with no attached price.
    pub missing: Vec<PurchaseId>,
}

impl ReconciliationReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty() && self.missing.is_empty()
    }
}

/// Pair `reported` with `priced` by purchase id and collect differences
/// larger than `tolerance`. Mismatches keep the order of `reported`.
pub fn reconcile(
    priced: &[PricedPurchase],
    reported: &[ReportedPrice],
    tolerance: Decimal,
) -> ReconciliationReport {
    let computed: HashMap<&PurchaseId, Price> =
        priced.iter().map(|p| (&p.purchase_id, p.price)).collect();

    let mut report = ReconciliationReport::default();
    for entry in reported {
        let Some(price) = computed.get(&entry.purchase_id) else {
            report.missing.push(entry.purchase_id.clone());
            continue;
        };
        report.compared += 1;

        let difference = entry.base_price.amount() - price.amount();
        if difference.abs() > tolerance {
            report.mismatches.push(PriceMismatch {
                purchase_id: entry.purchase_id.clone(),
                computed: *price,
                reported: entry.base_price,
                difference,
            });
        }
    }

    tracing::info!(
        compared = report.compared,
        mismatches = report.mismatches.len(),
        missing = report.missing.len(),
        "reconciliation complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Resolution;

    fn price(units: i64, scale: u32) -> Price {
        Price::new(Decimal::new(units, scale)).unwrap()
    }

    fn priced(id: &str, p: Price) -> PricedPurchase {
        PricedPurchase {
            purchase_id: PurchaseId::new(id),
            price_before_attach: Some(p),
            price: p,
            resolution: Resolution::Override { price: p },
        }
    }

    fn reported(id: &str, p: Price) -> ReportedPrice {
        ReportedPrice {
            purchase_id: PurchaseId::new(id),
            base_price: p,
        }
    }

    #[test]
    fn differences_within_tolerance_are_not_mismatches() {
        let report = reconcile(
            &[priced("p-1", price(11_250, 2)), priced("p-2", price(9_000, 2))],
            &[
                reported("p-1", price(11_250_005, 5)),
                reported("p-2", price(9_500, 2)),
                reported("p-3", price(100, 0)),
            ],
            Decimal::new(1, 4),
        );

        assert_eq!(report.compared, 2);
        assert_eq!(report.missing, vec![PurchaseId::new("p-3")]);
        assert_eq!(report.mismatches.len(), 1);
        let mismatch = &report.mismatches[0];
        assert_eq!(mismatch.purchase_id, PurchaseId::new("p-2"));
        assert_eq!(mismatch.difference, Decimal::new(500, 2));
        assert!(!report.is_clean());
    }

    #[test]
    fn empty_inputs_are_clean() {
        let report = reconcile(&[], &[], Decimal::new(1, 4));
        assert!(report.is_clean());
        assert_eq!(report.compared, 0);
    }
}
