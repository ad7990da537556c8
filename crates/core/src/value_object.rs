//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity; two instances holding the same values are
/// the same value. A price of `45.50` is a value object, a supplier is not.
///
/// The trait requires:
/// - **Clone**: value objects are copied freely
/// - **PartialEq**: compared by their attribute values
/// - **Debug**: shows up in logs and test failures
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
