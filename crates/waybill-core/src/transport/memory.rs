//! In-process substrate for tests and local simulation.
//!
//! [`MemoryTransport`] is a miniature of the real backend: snake_case
//! records, server-side stamping of transition timestamps, id assignment,
//! tracking-number fallback, and gate pass serial issuance. It deliberately
//! performs no transition validation; like the real substrate, it trusts
//! the client's transition discipline and answers 404 only for unknown ids
//! and paths.

use std::sync::Mutex;

use async_trait::async_trait;
use jiff::tz::TimeZone;
use jiff::Timestamp;
use serde_json::{json, Map, Value};

use super::{Transport, TransportError};
use crate::gatepass;

/// Routable server state behind a mutex; every request runs to completion
/// while holding it.
struct ServerState {
    packages: Vec<Value>,
    managers: Vec<Value>,
    next_id: u64,
    next_serial: u32,
    current_user: String,
    fail_next: Option<TransportError>,
}

/// An in-memory [`Transport`] implementation.
pub struct MemoryTransport {
    state: Mutex<ServerState>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ServerState {
                packages: Vec::new(),
                managers: Vec::new(),
                next_id: 1,
                next_serial: 1,
                current_user: "system".to_string(),
                fail_next: None,
            }),
        }
    }

    /// Seeds the package table with raw wire records.
    pub fn with_records(records: Vec<Value>) -> Self {
        let next_id = records
            .iter()
            .filter_map(|r| id_of(r)?.parse::<u64>().ok())
            .max()
            .map_or(1, |max| max + 1);
        let transport = Self::new();
        {
            let mut state = transport.lock_state();
            state.packages = records;
            state.next_id = next_id;
        }
        transport
    }

    /// Seeds the manager directory.
    pub fn seed_managers(&self, managers: Vec<Value>) {
        self.lock_state().managers = managers;
    }

    /// Sets the user the substrate will stamp on mutations (the bearer
    /// credential, in miniature).
    pub fn set_current_user(&self, user: impl Into<String>) {
        self.lock_state().current_user = user.into();
    }

    /// Makes the next request fail with the given error. Test hook for
    /// exercising rollback.
    pub fn fail_next(&self, error: TransportError) {
        self.lock_state().fail_next = Some(error);
    }

    /// Copies out the current package table, newest first.
    pub fn dump_records(&self) -> Vec<Value> {
        self.lock_state().packages.clone()
    }

    /// Copies out the manager directory.
    pub fn dump_managers(&self) -> Vec<Value> {
        self.lock_state().managers.clone()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ServerState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn take_scripted_failure(&self) -> Option<TransportError> {
        self.lock_state().fail_next.take()
    }

    fn create_package(&self, body: Value) -> Result<Value, TransportError> {
        let mut state = self.lock_state();
        let id = state.next_id;
        state.next_id += 1;

        let mut record = match body {
            Value::Object(map) => map,
            _ => return Err(TransportError::with_status(422, "package body must be an object")),
        };

        let now = Timestamp::now();
        record.insert("id".to_string(), json!(id));
        record
            .entry("status".to_string())
            .or_insert_with(|| json!("submitted"));
        record.insert("submitted_at".to_string(), json!(now.to_string()));
        record.insert("created_at".to_string(), json!(now.to_string()));
        record.insert("updated_at".to_string(), json!(now.to_string()));

        if !record
            .get("tracking_number")
            .is_some_and(|t| t.as_str().is_some_and(|s| !s.is_empty()))
        {
            record.insert("tracking_number".to_string(), json!(format!("TRK{id:08}")));
        }

        let returnable = record
            .get("is_returnable")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let serial = gatepass::format_serial(
            returnable,
            now.to_zoned(TimeZone::UTC).date(),
            state.next_serial,
        );
        state.next_serial += 1;
        record.insert("gate_pass_serial_number".to_string(), json!(serial));

        attach_manager_summary(&mut record, &state.managers);

        let value = Value::Object(record);
        state.packages.insert(0, value.clone());
        Ok(value)
    }

    fn update_status(&self, id: &str, body: &Value) -> Result<Value, TransportError> {
        let mut state = self.lock_state();
        let user = state.current_user.clone();
        let record = find_mut(&mut state.packages, id)
            .ok_or_else(|| TransportError::not_found(&format!("/packages/{id}")))?;
        let object = as_object_mut(&mut *record)?;

        let status = body
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| TransportError::with_status(422, "status is required"))?;
        let notes = body.get("notes").and_then(Value::as_str);
        let now = Timestamp::now().to_string();

        object.insert("status".to_string(), json!(status));
        match status {
            "approved" => {
                object.insert("approved_at".to_string(), json!(now));
                object.insert("approved_by".to_string(), json!(user));
            }
            "rejected" => {
                object.insert("rejected_at".to_string(), json!(now));
                object.insert("rejected_by".to_string(), json!(user));
                if let Some(notes) = notes {
                    object.insert("rejection_reason".to_string(), json!(notes));
                }
            }
            "dispatched" => {
                object.insert("dispatched_at".to_string(), json!(now));
            }
            "submitted" => {
                object.insert("resubmitted".to_string(), json!(true));
                object.remove("rejected_at");
                object.remove("rejected_by");
                object.remove("rejection_reason");
            }
            _ => {}
        }
        if let Some(notes) = notes {
            if status != "rejected" {
                object.insert("notes".to_string(), json!(notes));
            }
        }
        object.insert("updated_at".to_string(), json!(now));

        Ok(json!({
            "message": format!("Package status updated to {status}"),
            "package": record.clone(),
        }))
    }

    fn update_return(&self, id: &str, body: &Value) -> Result<Value, TransportError> {
        let mut state = self.lock_state();
        let record = find_mut(&mut state.packages, id)
            .ok_or_else(|| TransportError::not_found(&format!("/packages/{id}")))?;
        let object = as_object_mut(&mut *record)?;

        // The return endpoint historically accepts the camelCase convention.
        let return_status = pick_str(body, "returnStatus", "return_status")
            .ok_or_else(|| TransportError::with_status(400, "returnStatus is required"))?
            .to_string();
        let now = Timestamp::now().to_string();

        object.insert("return_status".to_string(), json!(return_status));
        if let Some(returned_by) = pick_str(body, "returnedBy", "returned_by") {
            object.insert("returned_by".to_string(), json!(returned_by));
        }
        if let Some(notes) = pick_str(body, "returnNotes", "return_notes") {
            object.insert("return_notes".to_string(), json!(notes));
        }
        if return_status == "returned" {
            let returned_at = pick_str(body, "returnedAt", "returned_at")
                .map_or_else(|| now.clone(), ToString::to_string);
            object.insert("returned_at".to_string(), json!(returned_at));
        }
        object.insert("updated_at".to_string(), json!(now));

        Ok(json!({
            "message": format!("Return status updated to {return_status}"),
            "package": record.clone(),
        }))
    }

    fn assign_manager(&self, id: &str, body: &Value) -> Result<Value, TransportError> {
        let mut state = self.lock_state();
        let managers = state.managers.clone();
        let record = find_mut(&mut state.packages, id)
            .ok_or_else(|| TransportError::not_found(&format!("/packages/{id}")))?;
        let object = as_object_mut(&mut *record)?;

        let manager_id = pick_str(body, "manager_id", "managerId")
            .ok_or_else(|| TransportError::with_status(422, "manager_id is required"))?
            .to_string();
        object.insert("assigned_to_manager".to_string(), json!(manager_id));
        object.insert(
            "updated_at".to_string(),
            json!(Timestamp::now().to_string()),
        );
        attach_manager_summary(object, &managers);

        Ok(json!({
            "message": "Package assigned",
            "package": record.clone(),
        }))
    }

    fn list_packages(&self, query: Option<&str>) -> Value {
        let state = self.lock_state();
        let mut records: Vec<&Value> = state.packages.iter().collect();

        if let Some(query) = query {
            for pair in query.split('&') {
                let Some((key, value)) = pair.split_once('=') else {
                    continue;
                };
                match key {
                    "manager_id" => records.retain(|r| {
                        r.get("assigned_to_manager")
                            .map(scalar_to_string)
                            .as_deref()
                            == Some(value)
                    }),
                    "status" => records.retain(|r| {
                        r.get("status").and_then(Value::as_str) == Some(value)
                    }),
                    _ => {}
                }
            }
        }

        Value::Array(records.into_iter().cloned().collect())
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn get(&self, path: &str) -> Result<Value, TransportError> {
        if let Some(error) = self.take_scripted_failure() {
            return Err(error);
        }

        let (path, query) = split_query(path);
        match path {
            "/packages" => Ok(self.list_packages(query)),
            "/users/managers" => Ok(Value::Array(self.lock_state().managers.clone())),
            _ => {
                if let Some(id) = path.strip_prefix("/packages/") {
                    let state = self.lock_state();
                    state
                        .packages
                        .iter()
                        .find(|r| id_of(r).as_deref() == Some(id))
                        .cloned()
                        .ok_or_else(|| TransportError::not_found(path))
                } else {
                    Err(TransportError::not_found(path))
                }
            }
        }
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        if let Some(error) = self.take_scripted_failure() {
            return Err(error);
        }

        match path {
            "/packages" => self.create_package(body),
            _ => Err(TransportError::not_found(path)),
        }
    }

    async fn patch(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        if let Some(error) = self.take_scripted_failure() {
            return Err(error);
        }

        match parse_package_subpath(path) {
            Some((id, "status")) => self.update_status(id, &body),
            _ => Err(TransportError::not_found(path)),
        }
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        if let Some(error) = self.take_scripted_failure() {
            return Err(error);
        }

        match parse_package_subpath(path) {
            Some((id, "return")) => self.update_return(id, &body),
            Some((id, "assign")) => self.assign_manager(id, &body),
            _ => Err(TransportError::not_found(path)),
        }
    }
}

fn split_query(path: &str) -> (&str, Option<&str>) {
    match path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path, None),
    }
}

/// Splits `/packages/{id}/{tail}` into its id and tail.
fn parse_package_subpath(path: &str) -> Option<(&str, &str)> {
    path.strip_prefix("/packages/")?.split_once('/')
}

/// Stable string form of a package id field (numbers and strings both occur).
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn id_of(record: &Value) -> Option<String> {
    record.get("id").map(scalar_to_string)
}

fn find_mut<'a>(packages: &'a mut [Value], id: &str) -> Option<&'a mut Value> {
    packages.iter_mut().find(|r| id_of(r).as_deref() == Some(id))
}

fn as_object_mut(record: &mut Value) -> Result<&mut Map<String, Value>, TransportError> {
    record
        .as_object_mut()
        .ok_or_else(|| TransportError::with_status(500, "corrupt package record"))
}

fn pick_str<'a>(body: &'a Value, camel: &str, snake: &str) -> Option<&'a str> {
    body.get(camel)
        .or_else(|| body.get(snake))
        .and_then(Value::as_str)
}

/// Fills the nested `assigned_manager` summary from the manager directory
/// when the assignment id matches a known manager.
fn attach_manager_summary(record: &mut Map<String, Value>, managers: &[Value]) {
    let Some(assigned) = record.get("assigned_to_manager").map(scalar_to_string) else {
        return;
    };
    let summary = managers
        .iter()
        .find(|m| m.get("id").map(scalar_to_string).as_deref() == Some(assigned.as_str()));
    if let Some(summary) = summary {
        record.insert("assigned_manager".to_string(), summary.clone());
    }
}
