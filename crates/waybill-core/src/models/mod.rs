//! Data models for the package workflow.
//!
//! This module contains the canonical domain types every other component
//! works with: the [`Package`] record itself, its status/priority/role
//! enumerations, the changed-fields [`PackageDelta`] patch, nested
//! substructures, query filters, and request types.
//!
//! Two shapes are deliberately *not* here:
//!
//! - The raw wire record with its dual naming conventions lives in
//!   [`crate::wire`]; models only ever see the canonical shape it produces.
//! - Display formatting lives in [`crate::display`]; models stay
//!   presentation-free.

pub mod actor;
pub mod delta;
pub mod filters;
pub mod item;
pub mod package;
pub mod requests;
pub mod status;

#[cfg(test)]
mod tests;

// Re-export all public types at the models level
pub use actor::Actor;
pub use delta::PackageDelta;
pub use filters::{PackageFilter, SortBy};
pub use item::{ManagerSummary, PackageDimension, PackageItem};
pub use package::Package;
pub use requests::SubmitPackage;
pub use status::{EffectiveStatus, PackageStatus, Priority, ReturnStatus, UserRole};
