//! Filter types for querying the package store.

use jiff::Timestamp;

use super::{EffectiveStatus, Package, Priority};

/// Filter options for querying packages.
///
/// Mirrors the query surface of the package listing endpoint: status,
/// manager, priority, a free-text search over the descriptive fields, a
/// submission date range, and a sort key.
#[derive(Debug, Clone, Default)]
pub struct PackageFilter {
    /// Filter by logical status (a recorded return matches `Returned`,
    /// not `Dispatched`)
    pub status: Option<EffectiveStatus>,

    /// Filter by assigned manager id
    pub manager_id: Option<String>,

    /// Filter by handling priority
    pub priority: Option<Priority>,

    /// Case-insensitive search over tracking number, recipient, address,
    /// notes, and remarks
    pub search: Option<String>,

    /// Filter by submission date range
    pub submitted_after: Option<Timestamp>,
    pub submitted_before: Option<Timestamp>,

    /// Sort key applied after filtering
    pub sort_by: Option<SortBy>,
}

/// Sort keys for filtered listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Newest submission first
    Date,

    /// Highest priority first
    Priority,

    /// Recipient name, ascending
    Recipient,
}

impl PackageFilter {
    /// Filter for everything assigned to one manager.
    pub fn for_manager(manager_id: impl Into<String>) -> Self {
        Self {
            manager_id: Some(manager_id.into()),
            ..Default::default()
        }
    }

    /// Filter for one logical status.
    pub fn for_status(status: EffectiveStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Whether a package passes every populated criterion.
    pub fn matches(&self, package: &Package) -> bool {
        if let Some(status) = self.status {
            if package.effective_status() != status {
                return false;
            }
        }

        if let Some(manager_id) = &self.manager_id {
            if package.assigned_to_manager.as_deref() != Some(manager_id.as_str()) {
                return false;
            }
        }

        if let Some(priority) = self.priority {
            if package.priority != priority {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let haystacks = [
                package.tracking_number.as_deref(),
                Some(package.recipient.as_str()),
                package.to_address.as_deref(),
                package.notes.as_deref(),
                package.remarks.as_deref(),
            ];
            if !haystacks
                .iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
            {
                return false;
            }
        }

        if let Some(after) = self.submitted_after {
            match package.submitted_at {
                Some(at) if at >= after => {}
                _ => return false,
            }
        }

        if let Some(before) = self.submitted_before {
            match package.submitted_at {
                Some(at) if at <= before => {}
                _ => return false,
            }
        }

        true
    }

    /// Sorts a filtered listing according to the configured key.
    ///
    /// With no key, the store's newest-first ordering is left as is.
    pub fn sort(&self, packages: &mut [Package]) {
        match self.sort_by {
            Some(SortBy::Date) => {
                packages.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
            }
            Some(SortBy::Priority) => {
                packages.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank()));
            }
            Some(SortBy::Recipient) => {
                packages.sort_by(|a, b| a.recipient.cmp(&b.recipient));
            }
            None => {}
        }
    }
}
