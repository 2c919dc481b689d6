//! Display wrapper types for formatting packages as markdown.
//!
//! Domain models stay presentation-free; these wrappers format the same
//! data differently depending on context (lists vs. detail views vs.
//! operation results). The CLI renders the markdown to the terminal; any
//! other front end can consume it as plain text.

use std::fmt;

use jiff::tz::TimeZone;
use jiff::Timestamp;

use crate::models::{ManagerSummary, Package};
use crate::transition;

/// A wrapper around [`Timestamp`] that formats in the system timezone.
///
/// The display format follows the pattern `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

/// An optional timestamp; absent stamps read as `N/A`.
pub struct MaybeDateTime<'a>(pub Option<&'a Timestamp>);

impl fmt::Display for MaybeDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(timestamp) => LocalDateTime(timestamp).fmt(f),
            None => f.write_str("N/A"),
        }
    }
}

/// Formats a collection of packages as a compact markdown list.
pub struct PackageList<'a> {
    packages: &'a [Package],
    title: Option<&'a str>,
}

impl<'a> PackageList<'a> {
    pub fn new(packages: &'a [Package]) -> Self {
        Self {
            packages,
            title: None,
        }
    }

    pub fn with_title(packages: &'a [Package], title: &'a str) -> Self {
        Self {
            packages,
            title: Some(title),
        }
    }
}

impl fmt::Display for PackageList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(title) = self.title {
            writeln!(f, "# {title}")?;
            writeln!(f)?;
        }
        if self.packages.is_empty() {
            return writeln!(f, "No packages.");
        }

        for package in self.packages {
            let tracking = package.tracking_number.as_deref().unwrap_or("(no tracking)");
            writeln!(
                f,
                "- **{}** {} `{}` → {} [{}]",
                package.id,
                package.effective_status().with_icon(),
                tracking,
                package.recipient,
                package.priority,
            )?;
        }
        Ok(())
    }
}

/// Formats one package with every stamped detail.
pub struct PackageDetails<'a>(pub &'a Package);

impl fmt::Display for PackageDetails<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let package = self.0;

        writeln!(f, "# Package {}", package.id)?;
        writeln!(f)?;
        writeln!(f, "**Status:** {}", package.effective_status().with_icon())?;
        if let Some(tracking) = &package.tracking_number {
            writeln!(f, "**Tracking:** `{tracking}`")?;
        }
        if let Some(serial) = &package.gate_pass_serial_number {
            writeln!(f, "**Gate pass:** `{serial}`")?;
        }
        writeln!(f, "**Recipient:** {}", package.recipient)?;
        if let Some(address) = &package.to_address {
            writeln!(f, "**Address:** {address}")?;
        }
        if !package.description.is_empty() {
            writeln!(f, "**Description:** {}", package.description)?;
        }
        writeln!(f, "**Priority:** {}", package.priority)?;
        if package.resubmitted {
            writeln!(f, "**Resubmitted:** yes")?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "Submitted: {} by {}",
            MaybeDateTime(package.submitted_at.as_ref()),
            package.submitted_by.as_deref().unwrap_or("N/A"),
        )?;
        match &package.assigned_manager {
            Some(manager) => writeln!(f, "Assigned to: {} ({})", manager.full_name, manager.id)?,
            None => {
                if let Some(manager_id) = &package.assigned_to_manager {
                    writeln!(f, "Assigned to: {manager_id}")?;
                }
            }
        }
        if package.approved_at.is_some() || package.approved_by.is_some() {
            writeln!(
                f,
                "Approved: {} by {}",
                MaybeDateTime(package.approved_at.as_ref()),
                package.approved_by.as_deref().unwrap_or("N/A"),
            )?;
        }
        if package.rejected_at.is_some() || package.rejection_reason.is_some() {
            writeln!(
                f,
                "Rejected: {} by {} — {}",
                MaybeDateTime(package.rejected_at.as_ref()),
                package.rejected_by.as_deref().unwrap_or("N/A"),
                package.rejection_reason.as_deref().unwrap_or("no reason"),
            )?;
        }
        if package.dispatched_at.is_some() {
            writeln!(f, "Dispatched: {}", MaybeDateTime(package.dispatched_at.as_ref()))?;
        }

        if package.is_returnable {
            writeln!(f)?;
            writeln!(f, "## Return")?;
            if let Some(status) = package.return_status {
                writeln!(f, "Return status: {status}")?;
            }
            if let Some(date) = package.return_date {
                writeln!(f, "Expected by: {date}")?;
            }
            if let Some(returned_by) = &package.returned_by {
                writeln!(
                    f,
                    "Returned: {} by {}",
                    MaybeDateTime(package.returned_at.as_ref()),
                    returned_by,
                )?;
            }
            if let Some(notes) = &package.return_notes {
                writeln!(f, "Return notes: {notes}")?;
            }
        }

        if !package.items.is_empty() {
            writeln!(f)?;
            writeln!(f, "## Items")?;
            for (index, item) in package.items.iter().enumerate() {
                let quantity = item.quantity.unwrap_or(1);
                writeln!(f, "{}. {} ×{quantity}", index + 1, item.description)?;
            }
        }

        if let Some(notes) = &package.notes {
            writeln!(f)?;
            writeln!(f, "## Notes")?;
            writeln!(f, "{notes}")?;
        }

        let actions = transition::allowed_actions(package);
        if !actions.is_empty() {
            writeln!(f)?;
            writeln!(f, "Next: {}", actions.join(", "))?;
        }
        Ok(())
    }
}

/// Formats the manager directory.
pub struct ManagerList<'a>(pub &'a [ManagerSummary]);

impl fmt::Display for ManagerList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No managers.");
        }
        for manager in self.0 {
            match &manager.email {
                Some(email) => writeln!(f, "- **{}** {} <{email}>", manager.id, manager.full_name)?,
                None => writeln!(f, "- **{}** {}", manager.id, manager.full_name)?,
            }
        }
        Ok(())
    }
}

/// Success or failure message for an operation.
pub struct OperationStatus {
    success: bool,
    message: String,
}

impl OperationStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = if self.success { "✓" } else { "✗" };
        writeln!(f, "{icon} {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PackageStatus, ReturnStatus};

    fn sample() -> Package {
        Package {
            id: "7".to_string(),
            status: PackageStatus::Dispatched,
            tracking_number: Some("TRK00000007".to_string()),
            recipient: "Acme Labs".to_string(),
            is_returnable: true,
            return_status: Some(ReturnStatus::Returned),
            returned_by: Some("Jane Doe".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_list_shows_effective_status() {
        let packages = vec![sample()];
        let output = PackageList::new(&packages).to_string();
        assert!(output.contains("↩ Returned"));
        assert!(output.contains("TRK00000007"));
    }

    #[test]
    fn test_list_with_title_and_empty() {
        let output = PackageList::with_title(&[], "Assigned to you").to_string();
        assert!(output.contains("# Assigned to you"));
        assert!(output.contains("No packages."));
    }

    #[test]
    fn test_details_include_return_section() {
        let output = PackageDetails(&sample()).to_string();
        assert!(output.contains("# Package 7"));
        assert!(output.contains("## Return"));
        assert!(output.contains("Jane Doe"));
    }

    #[test]
    fn test_details_suggest_next_actions() {
        let mut package = sample();
        package.status = PackageStatus::Submitted;
        package.return_status = None;
        let output = PackageDetails(&package).to_string();
        assert!(output.contains("Next: approve, reject"));
    }

    #[test]
    fn test_absent_dates_read_na() {
        assert_eq!(MaybeDateTime(None).to_string(), "N/A");
    }

    #[test]
    fn test_operation_status_icons() {
        assert!(OperationStatus::success("done").to_string().starts_with('✓'));
        assert!(OperationStatus::failure("nope").to_string().starts_with('✗'));
    }
}
