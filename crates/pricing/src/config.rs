//! Pricing configuration.
//!
//! Read from `MILKPRICE_*` environment variables; every knob has a default.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use milkprice_core::{DomainError, DomainResult};

pub const ENV_MISSING_SUPPLIER: &str = "MILKPRICE_MISSING_SUPPLIER";
pub const ENV_ZERO_OVERRIDE_IS_UNSET: &str = "MILKPRICE_ZERO_OVERRIDE_IS_UNSET";
pub const ENV_RECONCILE_TOLERANCE: &str = "MILKPRICE_RECONCILE_TOLERANCE";

/// What the plant route does when a purchase names an unknown supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingSupplierPolicy {
    /// Leave the purchase unpriced (price 0).
    #[default]
    Zero,
    /// Fail with `DomainError::NotFound`.
    Fail,
}

impl FromStr for MissingSupplierPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" => Ok(Self::Zero),
            "fail" => Ok(Self::Fail),
            other => Err(DomainError::configuration(format!(
                "{ENV_MISSING_SUPPLIER}: expected `zero` or `fail`, got `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub missing_supplier: MissingSupplierPolicy,
    /// Treat an explicit price of zero as "no explicit price".
    pub zero_override_is_unset: bool,
    /// Largest absolute difference reconciliation accepts as equal.
    pub reconcile_tolerance: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            missing_supplier: MissingSupplierPolicy::default(),
            zero_override_is_unset: false,
            reconcile_tolerance: Decimal::new(1, 4),
        }
    }
}

impl PricingConfig {
    /// Load from the process environment.
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through `lookup`; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DomainResult<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_MISSING_SUPPLIER) {
            config.missing_supplier = raw.parse()?;
        }

        if let Some(raw) = lookup(ENV_ZERO_OVERRIDE_IS_UNSET) {
            config.zero_override_is_unset = parse_flag(ENV_ZERO_OVERRIDE_IS_UNSET, &raw)?;
        }

        if let Some(raw) = lookup(ENV_RECONCILE_TOLERANCE) {
            let tolerance = Decimal::from_str(raw.trim()).map_err(|e| {
                DomainError::configuration(format!("{ENV_RECONCILE_TOLERANCE}: {e}"))
            })?;
            if tolerance < Decimal::ZERO {
                return Err(DomainError::configuration(format!(
                    "{ENV_RECONCILE_TOLERANCE}: must not be negative"
                )));
            }
            config.reconcile_tolerance = tolerance;
        }

        Ok(config)
    }
}

fn parse_flag(key: &str, raw: &str) -> DomainResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(DomainError::configuration(format!(
            "{key}: expected a boolean, got `{other}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = PricingConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PricingConfig::default());
        assert_eq!(config.reconcile_tolerance, Decimal::new(1, 4));
    }

    #[test]
    fn reads_every_knob() {
        let config = PricingConfig::from_lookup(lookup(&[
            (ENV_MISSING_SUPPLIER, "Fail"),
            (ENV_ZERO_OVERRIDE_IS_UNSET, "1"),
            (ENV_RECONCILE_TOLERANCE, "0.01"),
        ]))
        .unwrap();

        assert_eq!(config.missing_supplier, MissingSupplierPolicy::Fail);
        assert!(config.zero_override_is_unset);
        assert_eq!(config.reconcile_tolerance, Decimal::new(1, 2));
    }

    #[test]
    fn malformed_values_are_configuration_errors() {
        let err = PricingConfig::from_lookup(lookup(&[(ENV_MISSING_SUPPLIER, "skip")])).unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));

        let err =
            PricingConfig::from_lookup(lookup(&[(ENV_ZERO_OVERRIDE_IS_UNSET, "maybe")])).unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));

        let err =
            PricingConfig::from_lookup(lookup(&[(ENV_RECONCILE_TOLERANCE, "-1")])).unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
    }
}
