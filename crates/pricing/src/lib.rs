//! `milkprice-pricing` — base price resolution for milk purchases.
//!
//! Given a purchase and pre-loaded snapshots of the price tables and
//! reference data, the resolver picks the applicable base price:
//!
//! - an explicit price on the purchase always wins;
//! - plant purchases are priced by supplier and source type;
//! - everything else is priced by its area office, from the most specific
//!   row (collection point and supplier) down to the office-wide wildcard;
//! - current prices are preferred, archived prices fill the gaps.
//!
//! Loading the snapshots is the caller's job; this crate does no IO.

pub mod batch;
pub mod config;
pub mod model;
pub mod reconcile;
pub mod reference;
pub mod resolver;
pub mod table;

pub use batch::{PricedPurchase, PricingFailure, PricingRun, PricingSummary, attach_prices};
pub use config::{MissingSupplierPolicy, PricingConfig};
pub use model::{AreaOffice, CollectionPoint, Price, PriceRecord, PriceStatus, Purchase, Supplier};
pub use reconcile::{PriceMismatch, ReconciliationReport, ReportedPrice, reconcile};
pub use reference::{ReferenceData, Routing, resolve_routing};
pub use resolver::{
    MatchTier, PriceResolver, Resolution, Route, UnpricedReason, resolve_base_price,
    resolve_plant_base_price,
};
pub use table::{PriceTable, PriceTableKind};
