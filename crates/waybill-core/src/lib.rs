//! Core library for the Waybill package dispatch workflow.
//!
//! Waybill tracks physical packages through a multi-party
//! approval-and-dispatch workflow: an employee submits a package, the
//! assigned manager approves or rejects it, security dispatches it, and a
//! returnable package eventually comes back through the gate. This crate is
//! the client-resident half of that system: the canonical in-memory
//! projection of server state and the rules that keep it correct under
//! concurrent mutation and asynchronous push updates.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────────┐   ┌──────────────┐
//! │ WorkflowC. │──▶│ TransitionEngine │   │  Transport   │
//! │  (client)  │   │   (transition)   │   │ (trait seam) │
//! └─────┬──────┘   └──────────────────┘   └──────┬───────┘
//!       │          ┌──────────────────┐          │
//!       ├─────────▶│  PackageStore    │◀─────────┤
//!       │          │    (store)       │   wire::normalize
//!       │          └──────────────────┘          │
//!       └─────────▶ command (optimistic) ────────┘
//!                   sync (push reconciliation)
//! ```
//!
//! Every mutation runs the same optimistic protocol: validate locally
//! against the explicit transition graph, apply the projected delta so
//! observers see it immediately, then confirm with the substrate's
//! authoritative answer or roll back to the pre-command snapshot. The wire
//! layer normalizes the substrate's two parallel naming conventions into
//! one canonical record on the way in and emits both on the way out.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use waybill_core::models::{Actor, EffectiveStatus, UserRole};
//! use waybill_core::transport::memory::MemoryTransport;
//! use waybill_core::WorkflowClientBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(MemoryTransport::new());
//! let client = WorkflowClientBuilder::new()
//!     .with_transport(transport)
//!     .with_actor(Actor::new("M1", UserRole::Manager))
//!     .build()?;
//!
//! client.refresh().await?;
//! for package in client.list_by_status(EffectiveStatus::Submitted) {
//!     println!("{} awaits review", package.id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod command;
pub mod display;
pub mod error;
pub mod gatepass;
pub mod models;
pub mod store;
pub mod sync;
pub mod transition;
pub mod transport;
pub mod wire;

// Re-export commonly used types
pub use client::{WorkflowClient, WorkflowClientBuilder};
pub use display::{
    LocalDateTime, ManagerList, MaybeDateTime, OperationStatus, PackageDetails, PackageList,
};
pub use error::{Result, TransportResultExt, WorkflowError};
pub use models::{
    Actor, EffectiveStatus, ManagerSummary, Package, PackageDelta, PackageFilter, PackageStatus,
    Priority, ReturnStatus, SortBy, SubmitPackage, UserRole,
};
pub use store::{PackageStore, StoreSnapshot};
pub use sync::{PushEvent, SyncReconciler};
pub use transition::{allowed_actions, next_state, Action};
pub use transport::{Transport, TransportError};
pub use wire::{denormalize, normalize, FieldConflict, Normalized, WireRecord};
