//! Order packing status and its derivation from item selection.

use super::order::{AdditionalItem, Package};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Aggregate packing status of an order.
///
/// Ordered `Pending < Opened < Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PackStatus {
    /// Nothing (or not enough) has been packed yet.
    Pending,
    /// Packing has started.
    Opened,
    /// Every item is packed and the completion was committed.
    Completed,
}

impl PackStatus {
    /// The status a partial save may report. Only the completion commit is
    /// allowed to persist `Completed`.
    pub fn capped(self) -> Self {
        self.min(PackStatus::Opened)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PackStatus::Pending => "Pending",
            PackStatus::Opened => "Opened",
            PackStatus::Completed => "Completed",
        }
    }
}

impl Display for PackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status label is not recognised.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown pack status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for PackStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(PackStatus::Pending),
            "open" | "opened" => Ok(PackStatus::Opened),
            "complete" | "completed" => Ok(PackStatus::Completed),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Derive the aggregate status from package and additional item selection.
///
/// Rules, first match wins:
/// 1. no packages and no additional items: `Pending`
/// 2. both groups present: `Completed` if every package and every additional
///    item is packed; `Pending` if some package is untouched or no additional
///    item is packed; otherwise `Opened`
/// 3. packages only: `Completed` if all are fully packed, `Pending` if some
///    package is untouched, otherwise `Opened`
/// 4. additional items only: `Completed` if all, `Opened` if some, `Pending` if none
///
/// An untouched package forces `Pending` even when the other group is
/// complete, so this is not a plain minimum over the groups.
pub fn derive_status(packages: &[Package], additional: &[AdditionalItem]) -> PackStatus {
    let packages_full = packages.iter().all(Package::all_selected);
    let package_untouched = packages.iter().any(Package::none_selected);
    let additional_full = additional.iter().all(|item| item.packed);
    let additional_none = !additional.iter().any(|item| item.packed);

    match (packages.is_empty(), additional.is_empty()) {
        (true, true) => PackStatus::Pending,
        (false, false) => {
            if packages_full && additional_full {
                PackStatus::Completed
            } else if package_untouched || additional_none {
                PackStatus::Pending
            } else {
                PackStatus::Opened
            }
        }
        (false, true) => {
            if packages_full {
                PackStatus::Completed
            } else if package_untouched {
                PackStatus::Pending
            } else {
                PackStatus::Opened
            }
        }
        (true, false) => {
            if additional_full {
                PackStatus::Completed
            } else if additional_none {
                PackStatus::Pending
            } else {
                PackStatus::Opened
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdditionalItem, Package, PackageItem};

    fn package(id: u64, packed: &[bool]) -> Package {
        let items = packed
            .iter()
            .enumerate()
            .map(|(i, &p)| PackageItem::new(id * 100 + i as u64, format!("item {}", i), 1.0, 10.0).packed(p))
            .collect();
        Package::new(id, format!("package {}", id), 1, items)
    }

    fn additional(packed: &[bool]) -> Vec<AdditionalItem> {
        packed
            .iter()
            .enumerate()
            .map(|(i, &p)| AdditionalItem::new(900 + i as u64, format!("extra {}", i), 1.0, 5.0).packed(p))
            .collect()
    }

    #[test]
    fn test_empty_order_is_pending() {
        assert_eq!(derive_status(&[], &[]), PackStatus::Pending);
    }

    #[test]
    fn test_everything_packed_is_completed() {
        assert_eq!(derive_status(&[package(1, &[true, true])], &[]), PackStatus::Completed);
        assert_eq!(derive_status(&[], &additional(&[true])), PackStatus::Completed);
        assert_eq!(
            derive_status(&[package(1, &[true]), package(2, &[true, true])], &additional(&[true, true])),
            PackStatus::Completed
        );
    }

    #[test]
    fn test_untouched_package_forces_pending() {
        // Additional items complete, but the package has nothing packed
        assert_eq!(
            derive_status(&[package(1, &[false, false])], &additional(&[true, true])),
            PackStatus::Pending
        );
        // One package done, another untouched
        assert_eq!(
            derive_status(&[package(1, &[true, true]), package(2, &[false])], &[]),
            PackStatus::Pending
        );
    }

    #[test]
    fn test_no_additional_packed_forces_pending_in_mixed_order() {
        assert_eq!(
            derive_status(&[package(1, &[true, true])], &additional(&[false, false])),
            PackStatus::Pending
        );
    }

    #[test]
    fn test_mixed_groups_partially_packed_is_opened() {
        assert_eq!(
            derive_status(&[package(1, &[true, true])], &additional(&[true, false])),
            PackStatus::Opened
        );
        assert_eq!(
            derive_status(&[package(1, &[true, false])], &additional(&[true, true])),
            PackStatus::Opened
        );
    }

    #[test]
    fn test_single_package_walkthrough() {
        let mut packages = vec![package(1, &[false, false])];
        assert_eq!(derive_status(&packages, &[]), PackStatus::Pending);

        packages[0].items[0].packed = true;
        assert_eq!(derive_status(&packages, &[]), PackStatus::Opened);

        packages[0].items[1].packed = true;
        assert_eq!(derive_status(&packages, &[]), PackStatus::Completed);
    }

    #[test]
    fn test_additional_only_levels() {
        assert_eq!(derive_status(&[], &additional(&[false, false])), PackStatus::Pending);
        assert_eq!(derive_status(&[], &additional(&[false, true])), PackStatus::Opened);
        assert_eq!(derive_status(&[], &additional(&[true, true])), PackStatus::Completed);
    }

    #[test]
    fn test_empty_package_counts_as_packed() {
        assert_eq!(derive_status(&[package(1, &[])], &[]), PackStatus::Completed);
        assert_eq!(
            derive_status(&[package(1, &[]), package(2, &[true, false])], &[]),
            PackStatus::Opened
        );
    }

    #[test]
    fn test_capped_and_parse() {
        assert_eq!(PackStatus::Completed.capped(), PackStatus::Opened);
        assert_eq!(PackStatus::Opened.capped(), PackStatus::Opened);
        assert_eq!(PackStatus::Pending.capped(), PackStatus::Pending);

        assert_eq!("completed".parse::<PackStatus>(), Ok(PackStatus::Completed));
        assert_eq!(" Open ".parse::<PackStatus>(), Ok(PackStatus::Opened));
        assert!("In Progress".parse::<PackStatus>().is_err());
    }
}
