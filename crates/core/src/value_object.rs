//! Value object trait: equality by value, not identity.
//!
//! Value objects have no identity. They are defined entirely by their
//! attribute values, and are validated once at construction so the rest of
//! the domain can rely on them (e.g. an `Allocation` is always within 0..=100).

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
