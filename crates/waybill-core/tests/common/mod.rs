//! Shared fixtures for integration tests.

use std::sync::Arc;

use serde_json::json;
use waybill_core::models::{Actor, UserRole};
use waybill_core::transport::memory::MemoryTransport;
use waybill_core::{WorkflowClient, WorkflowClientBuilder};

/// A substrate seeded with one package per interesting state.
pub fn seeded_transport() -> Arc<MemoryTransport> {
    let transport = MemoryTransport::with_records(vec![
        json!({
            "id": 1,
            "status": "submitted",
            "tracking_number": "TRK00000001",
            "recipient": "Acme Labs",
            "assigned_to_manager": "M1",
            "submitted_by": "E1",
            "submitted_at": "2025-01-08T09:00:00Z",
            "priority": "high",
        }),
        json!({
            "id": 2,
            "status": "approved",
            "tracking_number": "TRK00000002",
            "recipient": "Globex",
            "assigned_to_manager": "M1",
            "submitted_by": "E1",
            "submitted_at": "2025-01-07T09:00:00Z",
            "approved_by": "M1",
            "approved_at": "2025-01-07T15:00:00Z",
        }),
        json!({
            "id": 3,
            "status": "dispatched",
            "tracking_number": "TRK00000003",
            "recipient": "Initech",
            "assigned_to_manager": "M2",
            "submitted_by": "E2",
            "submitted_at": "2025-01-06T09:00:00Z",
            "dispatched_at": "2025-01-06T17:00:00Z",
            "is_returnable": true,
            "return_date": "2025-02-01",
        }),
        json!({
            "id": 4,
            "status": "rejected",
            "tracking_number": "TRK00000004",
            "recipient": "Umbrella",
            "assigned_to_manager": "M1",
            "submitted_by": "E1",
            "submitted_at": "2025-01-05T09:00:00Z",
            "rejected_by": "M1",
            "rejected_at": "2025-01-05T12:00:00Z",
            "rejection_reason": "missing PO number",
        }),
    ]);
    transport.seed_managers(vec![
        json!({"id": "M1", "full_name": "Priya Sharma", "email": "priya@example.com"}),
        json!({"id": "M2", "full_name": "Ravi Kumar", "email": "ravi@example.com"}),
    ]);
    Arc::new(transport)
}

/// A refreshed client over the shared substrate, acting as the given user.
pub async fn client_as(
    transport: &Arc<MemoryTransport>,
    id: &str,
    role: UserRole,
) -> WorkflowClient {
    transport.set_current_user(id);
    let client = WorkflowClientBuilder::new()
        .with_transport(Arc::clone(transport) as Arc<dyn waybill_core::Transport>)
        .with_actor(Actor::new(id, role))
        .build()
        .expect("client must build");
    client.refresh().await.expect("initial refresh must succeed");
    client
}
