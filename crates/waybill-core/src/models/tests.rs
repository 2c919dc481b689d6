//! Tests for the domain models.

use std::str::FromStr;

use jiff::Timestamp;

use super::*;

fn dispatched_returnable() -> Package {
    Package {
        id: "P1".to_string(),
        status: PackageStatus::Dispatched,
        is_returnable: true,
        recipient: "Acme Labs".to_string(),
        ..Default::default()
    }
}

#[test]
fn test_package_status_round_trips_through_str() {
    for status in [
        PackageStatus::Submitted,
        PackageStatus::Approved,
        PackageStatus::Rejected,
        PackageStatus::Dispatched,
    ] {
        assert_eq!(PackageStatus::from_str(status.as_str()), Ok(status));
    }
    assert!(PackageStatus::from_str("returned").is_err());
    assert!(PackageStatus::from_str("bogus").is_err());
}

#[test]
fn test_effective_status_accepts_returned() {
    assert_eq!(
        EffectiveStatus::from_str("returned"),
        Ok(EffectiveStatus::Returned)
    );
    assert_eq!(
        EffectiveStatus::from_str("Dispatched"),
        Ok(EffectiveStatus::Dispatched)
    );
}

#[test]
fn test_effective_status_of_recorded_return() {
    let mut package = dispatched_returnable();
    assert_eq!(package.effective_status(), EffectiveStatus::Dispatched);
    assert!(!package.is_terminal());

    package.return_status = Some(ReturnStatus::Returned);
    assert_eq!(package.effective_status(), EffectiveStatus::Returned);
    assert!(package.is_terminal());
}

#[test]
fn test_return_status_ignored_when_not_returnable() {
    let mut package = dispatched_returnable();
    package.is_returnable = false;
    package.return_status = Some(ReturnStatus::Returned);
    assert_eq!(package.effective_status(), EffectiveStatus::Dispatched);
}

#[test]
fn test_priority_rank_ordering() {
    assert!(Priority::High.rank() > Priority::Medium.rank());
    assert!(Priority::Medium.rank() > Priority::Low.rank());
    assert_eq!(Priority::default(), Priority::Medium);
}

#[test]
fn test_delta_apply_sets_and_clears() {
    let mut package = Package {
        id: "P1".to_string(),
        status: PackageStatus::Rejected,
        rejected_by: Some("M1".to_string()),
        rejected_at: Some(Timestamp::UNIX_EPOCH),
        rejection_reason: Some("missing PO".to_string()),
        ..Default::default()
    };

    let delta = PackageDelta {
        status: Some(PackageStatus::Submitted),
        resubmitted: Some(true),
        clear_rejection: true,
        ..Default::default()
    };
    delta.apply_to(&mut package);

    assert_eq!(package.status, PackageStatus::Submitted);
    assert!(package.resubmitted);
    assert_eq!(package.rejected_by, None);
    assert_eq!(package.rejected_at, None);
    assert_eq!(package.rejection_reason, None);
}

#[test]
fn test_empty_delta_is_noop() {
    let mut package = dispatched_returnable();
    let before = package.clone();
    let delta = PackageDelta::default();
    assert!(delta.is_empty());
    delta.apply_to(&mut package);
    assert_eq!(package, before);
}

#[test]
fn test_filter_matches_effective_status() {
    let mut package = dispatched_returnable();
    package.return_status = Some(ReturnStatus::Returned);

    let returned = PackageFilter::for_status(EffectiveStatus::Returned);
    let dispatched = PackageFilter::for_status(EffectiveStatus::Dispatched);
    assert!(returned.matches(&package));
    assert!(!dispatched.matches(&package));
}

#[test]
fn test_filter_search_is_case_insensitive() {
    let mut package = dispatched_returnable();
    package.tracking_number = Some("TRK12AB34CD".to_string());

    let by_tracking = PackageFilter {
        search: Some("trk12".to_string()),
        ..Default::default()
    };
    let by_recipient = PackageFilter {
        search: Some("acme".to_string()),
        ..Default::default()
    };
    let miss = PackageFilter {
        search: Some("globex".to_string()),
        ..Default::default()
    };
    assert!(by_tracking.matches(&package));
    assert!(by_recipient.matches(&package));
    assert!(!miss.matches(&package));
}

#[test]
fn test_filter_date_range() {
    let mut package = dispatched_returnable();
    package.submitted_at = Some("2025-03-15T12:00:00Z".parse().unwrap());

    let inside = PackageFilter {
        submitted_after: Some("2025-03-01T00:00:00Z".parse().unwrap()),
        submitted_before: Some("2025-04-01T00:00:00Z".parse().unwrap()),
        ..Default::default()
    };
    let outside = PackageFilter {
        submitted_after: Some("2025-04-01T00:00:00Z".parse().unwrap()),
        ..Default::default()
    };
    assert!(inside.matches(&package));
    assert!(!outside.matches(&package));
}

#[test]
fn test_filter_sort_by_priority() {
    let mut low = dispatched_returnable();
    low.id = "low".to_string();
    low.priority = Priority::Low;
    let mut high = dispatched_returnable();
    high.id = "high".to_string();
    high.priority = Priority::High;

    let mut packages = vec![low, high];
    let filter = PackageFilter {
        sort_by: Some(SortBy::Priority),
        ..Default::default()
    };
    filter.sort(&mut packages);
    assert_eq!(packages[0].id, "high");
}

#[test]
fn test_submit_package_validation() {
    let valid = SubmitPackage {
        recipient: "Acme Labs".to_string(),
        description: Some("Spare parts".to_string()),
        ..Default::default()
    };
    assert!(valid.validate().is_ok());

    let no_recipient = SubmitPackage {
        description: Some("Spare parts".to_string()),
        ..Default::default()
    };
    assert!(no_recipient.validate().is_err());

    let no_description = SubmitPackage {
        recipient: "Acme Labs".to_string(),
        ..Default::default()
    };
    assert!(no_description.validate().is_err());

    let returnable_without_date = SubmitPackage {
        recipient: "Acme Labs".to_string(),
        description: Some("Loaner scope".to_string()),
        is_returnable: true,
        ..Default::default()
    };
    assert!(returnable_without_date.validate().is_err());
}

#[test]
fn test_submit_package_item_description_counts() {
    let request = SubmitPackage {
        recipient: "Acme Labs".to_string(),
        items: vec![PackageItem {
            description: "Oscilloscope".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    };
    assert!(request.validate().is_ok());
}

#[test]
fn test_submit_package_body_stamps_actor() {
    let request = SubmitPackage {
        recipient: "Acme Labs".to_string(),
        description: Some("Spare parts".to_string()),
        is_returnable: true,
        return_date: Some("2025-06-01".parse().unwrap()),
        ..Default::default()
    };
    let actor = Actor::new("E1", UserRole::Employee);
    let body = request.to_body(&actor);

    assert_eq!(body["submitted_by"], "E1");
    assert_eq!(body["is_returnable"], true);
    assert_eq!(body["return_date"], "2025-06-01");
    assert_eq!(body["priority"], "medium");
}
