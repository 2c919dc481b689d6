//! The authoritative in-memory package collection.
//!
//! [`PackageStore`] owns the canonical copy of every package the client
//! knows about, plus the manager-scoped subset when the current actor is a
//! manager. Every read hands out clones; nothing outside this module holds
//! a mutable alias. All operations run synchronously to completion, so an
//! observer can never see a half-applied mutation.

use crate::models::{EffectiveStatus, Package, PackageDelta, PackageFilter};

/// A full copy of the store's state, used by optimistic commands for
/// rollback.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    all: Vec<Package>,
    assigned: Vec<Package>,
}

/// The in-memory projection of server state.
///
/// Invariant: a package present in the manager-scoped collection is always
/// identity-equal to its counterpart in `all` once an operation completes;
/// membership follows the package's `assigned_to_manager` field and the
/// configured scope.
#[derive(Debug, Default)]
pub struct PackageStore {
    all: Vec<Package>,
    assigned: Vec<Package>,
    manager_scope: Option<String>,
}

impl PackageStore {
    /// A store with no manager scope; the assigned collection stays empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose assigned collection tracks one manager's packages.
    pub fn for_manager(manager_id: impl Into<String>) -> Self {
        Self {
            all: Vec::new(),
            assigned: Vec::new(),
            manager_scope: Some(manager_id.into()),
        }
    }

    /// The manager id the assigned collection is scoped to, if any.
    pub fn manager_scope(&self) -> Option<&str> {
        self.manager_scope.as_deref()
    }

    /// Replaces both collections wholesale; used for a full refresh.
    ///
    /// The incoming order is preserved for `all` (the substrate lists
    /// newest first); the assigned collection is re-derived from it.
    pub fn load(&mut self, packages: Vec<Package>) {
        self.all = packages;
        self.rebuild_assigned();
    }

    /// Inserts a record (prepended, newest first) or replaces the one with
    /// the same id. Both collections stay consistent.
    pub fn upsert(&mut self, package: Package) {
        match self.all.iter_mut().find(|p| p.id == package.id) {
            Some(existing) => *existing = package.clone(),
            None => self.all.insert(0, package.clone()),
        }
        self.sync_assigned(package);
    }

    /// Merges a delta into the record with the given id, in both
    /// collections. An unknown id is a silent no-op: push events may
    /// legitimately reference packages that are not loaded yet.
    pub fn apply_delta(&mut self, id: &str, delta: &PackageDelta) {
        let Some(package) = self.all.iter_mut().find(|p| p.id == id) else {
            return;
        };
        delta.apply_to(package);
        let updated = package.clone();
        self.sync_assigned(updated);
    }

    /// Copies out the full state for later [`PackageStore::restore`].
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            all: self.all.clone(),
            assigned: self.assigned.clone(),
        }
    }

    /// Puts back a previously taken snapshot, discarding everything since.
    pub fn restore(&mut self, snapshot: StoreSnapshot) {
        self.all = snapshot.all;
        self.assigned = snapshot.assigned;
    }

    /// Looks up a package by id.
    pub fn get(&self, id: &str) -> Option<&Package> {
        self.all.iter().find(|p| p.id == id)
    }

    /// Looks up a package by id, cloning it out.
    pub fn get_cloned(&self, id: &str) -> Option<Package> {
        self.get(id).cloned()
    }

    /// All packages currently held, newest first.
    pub fn packages(&self) -> &[Package] {
        &self.all
    }

    /// The manager-scoped subset.
    pub fn assigned_packages(&self) -> &[Package] {
        &self.assigned
    }

    /// Packages whose logical status matches.
    pub fn list_by_status(&self, status: EffectiveStatus) -> Vec<Package> {
        self.all
            .iter()
            .filter(|p| p.effective_status() == status)
            .cloned()
            .collect()
    }

    /// Packages assigned to the given manager.
    pub fn list_by_manager(&self, manager_id: &str) -> Vec<Package> {
        self.all
            .iter()
            .filter(|p| p.assigned_to_manager.as_deref() == Some(manager_id))
            .cloned()
            .collect()
    }

    /// Packages passing a filter, sorted by its sort key.
    pub fn filtered(&self, filter: &PackageFilter) -> Vec<Package> {
        let mut packages: Vec<Package> = self
            .all
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        filter.sort(&mut packages);
        packages
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Re-derives the assigned collection from `all`, preserving order.
    fn rebuild_assigned(&mut self) {
        let Some(scope) = self.manager_scope.as_deref() else {
            self.assigned.clear();
            return;
        };
        self.assigned = self
            .all
            .iter()
            .filter(|p| p.assigned_to_manager.as_deref() == Some(scope))
            .cloned()
            .collect();
    }

    /// Brings the assigned collection in line with one updated package:
    /// replace or prepend when it belongs to the scope, drop it when it was
    /// reassigned away. Idempotent by id.
    fn sync_assigned(&mut self, package: Package) {
        let Some(scope) = self.manager_scope.as_deref() else {
            return;
        };
        let in_scope = package.assigned_to_manager.as_deref() == Some(scope);
        let position = self.assigned.iter().position(|p| p.id == package.id);

        match (in_scope, position) {
            (true, Some(index)) => self.assigned[index] = package,
            (true, None) => self.assigned.insert(0, package),
            (false, Some(index)) => {
                self.assigned.remove(index);
            }
            (false, None) => {}
        }
    }
}
