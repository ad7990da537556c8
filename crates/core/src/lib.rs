//! `milkprice-core` — shared domain building blocks.
//!
//! Identifiers, the entity/value-object traits and the domain error model.
//! Nothing in here knows about prices; see `milkprice-pricing` for that.

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    AreaOfficeId, CollectionPointId, PlantId, PurchaseId, SupplierId, SupplierTypeId,
};
pub use value_object::ValueObject;
