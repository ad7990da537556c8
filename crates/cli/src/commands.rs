use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use milkprice_pricing::{PriceResolver, PricingConfig, ReportedPrice, attach_prices, reconcile};

use crate::snapshot::{Snapshot, load_reported};

#[derive(Parser)]
#[command(name = "milkprice", about = "Attach base prices to milk purchases")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Price every purchase in a snapshot and print the run as JSON
    Price {
        /// Snapshot file (collection points, suppliers, prices, purchases)
        snapshot: PathBuf,
    },
    /// Price a snapshot and compare against reported base prices
    Reconcile {
        snapshot: PathBuf,
        /// JSON array of {purchase_id, base_price}
        reported: PathBuf,
    },
}

/// Execute `command` and return the JSON document to print.
pub fn run(command: Command, config: PricingConfig) -> anyhow::Result<Value> {
    match command {
        Command::Price { snapshot } => price(Snapshot::load(&snapshot)?, config),
        Command::Reconcile { snapshot, reported } => {
            let reported = load_reported(&reported)?;
            reconcile_snapshot(Snapshot::load(&snapshot)?, &reported, config)
        }
    }
}

fn price(snapshot: Snapshot, config: PricingConfig) -> anyhow::Result<Value> {
    let loaded = snapshot.index();
    let resolver =
        PriceResolver::new(&loaded.current, &loaded.archived, &loaded.reference).with_config(config);
    let run = attach_prices(&resolver, &loaded.purchases);
    Ok(serde_json::to_value(&run)?)
}

fn reconcile_snapshot(
    snapshot: Snapshot,
    reported: &[ReportedPrice],
    config: PricingConfig,
) -> anyhow::Result<Value> {
    let tolerance = config.reconcile_tolerance;
    let loaded = snapshot.index();
    let resolver =
        PriceResolver::new(&loaded.current, &loaded.archived, &loaded.reference).with_config(config);
    let run = attach_prices(&resolver, &loaded.purchases);
    let report = reconcile(&run.priced, reported, tolerance);
    Ok(serde_json::to_value(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "collection_points": [
            { "id": "cp-1", "area_office_id": "ao-1" }
        ],
        "area_offices": [{ "id": "ao-1" }],
        "suppliers": [{ "id": "s-1", "supplier_type_id": "farmer" }],
        "prices": [
            { "area_office": "ao-1", "source_type": "farmer", "wef": "2024-01-01T00:00:00Z", "price": 100 },
            { "area_office": "ao-1", "source_type": "farmer", "collection_point": "cp-1",
              "wef": "2024-01-01T00:00:00Z", "price": 104.5 },
            { "area_office": "ao-1", "source_type": "farmer", "wef": "2024-06-01T00:00:00Z",
              "price": 999, "status": "inactive" }
        ],
        "purchases": [
            { "id": "p-1", "cp_id": "cp-1", "supplier_id": "s-1", "supplier_type_id": "farmer",
              "booked_at": "2024-07-01T05:00:00Z" },
            { "id": "p-2", "cp_id": "cp-1", "supplier_id": "s-1", "supplier_type_id": "farmer",
              "time": "2024-07-01T05:00:00Z", "price": 120 },
            { "id": "p-3", "cp_id": "cp-1", "supplier_id": "s-1" }
        ]
    }"#;

    #[test]
    fn price_command_output() {
        let snapshot = Snapshot::from_json(SNAPSHOT).unwrap();
        let out = price(snapshot, PricingConfig::default()).unwrap();

        assert_eq!(out["summary"]["total"], 3);
        assert_eq!(out["summary"]["matched_current"], 1);
        assert_eq!(out["summary"]["overridden"], 1);
        assert_eq!(out["summary"]["failed"], 1);
        assert_eq!(out["priced"][0]["price"], 104.5);
        assert_eq!(out["priced"][0]["resolution"]["tier"], "collection_point_only");
        assert_eq!(out["priced"][1]["price_before_attach"], 120.0);
        assert_eq!(out["failures"][0]["purchase_id"], "p-3");
    }

    #[test]
    fn reconcile_reports_mismatch() {
        let snapshot = Snapshot::from_json(SNAPSHOT).unwrap();
        let reported: Vec<ReportedPrice> = serde_json::from_str(
            r#"[
                { "purchase_id": "p-1", "base_price": 104.5 },
                { "purchase_id": "p-2", "base_price": 118 },
                { "purchase_id": "p-3", "base_price": 100 }
            ]"#,
        )
        .unwrap();

        let out = reconcile_snapshot(snapshot, &reported, PricingConfig::default()).unwrap();
        assert_eq!(out["compared"], 2);
        assert_eq!(out["mismatches"][0]["purchase_id"], "p-2");
        assert_eq!(out["missing"][0], "p-3");
    }

    #[test]
    fn invalid_snapshot_is_an_error() {
        let err = Snapshot::from_json("{ \"purchases\": 3 }").unwrap_err();
        assert!(err.to_string().contains("snapshot is not valid JSON"));
    }
}
