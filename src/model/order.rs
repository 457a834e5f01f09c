//! Orders being packed, their packages and items.
//!
//! # Actor Framework
//! [`PackOrder`] implements the [`ActorEntity`](crate::framework::ActorEntity) trait,
//! allowing it to be managed by a [`ResourceActor`](crate::framework::ResourceActor).
//! See [`crate::pack_actor`] for the actions it accepts.

use super::status::{derive_status, PackStatus};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Type-safe identifier for Orders, as issued by the order service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(OrderId)
    }
}

/// An item inside a package.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageItem {
    pub id: u64,
    pub product_name: String,
    pub qty: f64,
    pub price: f64,
    pub product_type: Option<String>,
    pub product_type_name: Option<String>,
    pub packed: bool,
}

impl PackageItem {
    pub fn new(id: u64, product_name: impl Into<String>, qty: f64, price: f64) -> Self {
        Self {
            id,
            product_name: product_name.into(),
            qty,
            price,
            product_type: None,
            product_type_name: None,
            packed: false,
        }
    }

    pub fn packed(mut self, packed: bool) -> Self {
        self.packed = packed;
        self
    }
}

/// A named bundle of items, repeated `package_qty` times on the order.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub id: u64,
    pub package_name: String,
    pub package_qty: u32,
    pub items: Vec<PackageItem>,
}

impl Package {
    pub fn new(id: u64, package_name: impl Into<String>, package_qty: u32, items: Vec<PackageItem>) -> Self {
        Self {
            id,
            package_name: package_name.into(),
            package_qty,
            items,
        }
    }

    /// Every item packed. True for a package without items.
    pub fn all_selected(&self) -> bool {
        self.items.iter().all(|item| item.packed)
    }

    /// At least one item packed.
    pub fn some_selected(&self) -> bool {
        self.items.iter().any(|item| item.packed)
    }

    /// Has items and none of them is packed.
    pub fn none_selected(&self) -> bool {
        !self.items.is_empty() && !self.some_selected()
    }
}

/// An item on the order that belongs to no package.
#[derive(Debug, Clone, PartialEq)]
pub struct AdditionalItem {
    pub id: u64,
    pub product_name: String,
    pub qty: f64,
    pub price: f64,
    pub packed: bool,
}

impl AdditionalItem {
    pub fn new(id: u64, product_name: impl Into<String>, qty: f64, price: f64) -> Self {
        Self {
            id,
            product_name: product_name.into(),
            qty,
            price,
            packed: false,
        }
    }

    pub fn packed(mut self, packed: bool) -> Self {
        self.packed = packed;
        self
    }
}

/// Addresses one item of an order.
///
/// Package items and additional items are numbered independently by the
/// backend, so the group is part of the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRef {
    Package { package_id: u64, item_id: u64 },
    Additional(u64),
}

impl Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemRef::Package { package_id, item_id } => write!(f, "package {}/item {}", package_id, item_id),
            ItemRef::Additional(item_id) => write!(f, "additional item {}", item_id),
        }
    }
}

/// Identifies one completion countdown.
///
/// Numbers are never reused while the actor runs, so a timer or handle left
/// over from an earlier countdown cannot act on a later one, even after the
/// order was closed and opened again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountdownId(pub u64);

impl Display for CountdownId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct PackOrder {
    pub id: OrderId,
    pub packages: Vec<Package>,
    pub additional_items: Vec<AdditionalItem>,
    /// Status last shown to the user. Only a committed completion stores `Completed`.
    pub status: PackStatus,
    /// Toggles not yet flushed to the order service.
    pub dirty: bool,
    /// The completion countdown holding the items frozen, if any.
    pub countdown: Option<CountdownId>,
}

impl PackOrder {
    /// Builds an order from freshly fetched items. The stored status is the
    /// derived one, capped at `Opened`.
    pub fn new(id: OrderId, packages: Vec<Package>, additional_items: Vec<AdditionalItem>) -> Self {
        let status = derive_status(&packages, &additional_items).capped();
        Self {
            id,
            packages,
            additional_items,
            status,
            dirty: false,
            countdown: None,
        }
    }

    pub fn derive_status(&self) -> PackStatus {
        derive_status(&self.packages, &self.additional_items)
    }

    pub fn is_completed(&self) -> bool {
        self.status == PackStatus::Completed
    }

    /// Items are read-only once completed or while a countdown runs.
    pub fn is_frozen(&self) -> bool {
        self.is_completed() || self.countdown_running()
    }

    pub fn countdown_running(&self) -> bool {
        self.countdown.is_some()
    }

    /// Mutable access to the packed flag of an item.
    pub fn packed_flag_mut(&mut self, item: &ItemRef) -> Option<&mut bool> {
        match *item {
            ItemRef::Package { package_id, item_id } => self
                .packages
                .iter_mut()
                .find(|p| p.id == package_id)?
                .items
                .iter_mut()
                .find(|i| i.id == item_id)
                .map(|i| &mut i.packed),
            ItemRef::Additional(item_id) => self
                .additional_items
                .iter_mut()
                .find(|i| i.id == item_id)
                .map(|i| &mut i.packed),
        }
    }

    /// Resolve a bare item id, looking at package items first.
    pub fn find_item(&self, item_id: u64) -> Option<ItemRef> {
        self.packages
            .iter()
            .find_map(|p| {
                p.items.iter().find(|i| i.id == item_id).map(|_| ItemRef::Package {
                    package_id: p.id,
                    item_id,
                })
            })
            .or_else(|| {
                self.additional_items
                    .iter()
                    .find(|i| i.id == item_id)
                    .map(|_| ItemRef::Additional(item_id))
            })
    }

    pub fn summary(&self) -> OrderSummary {
        let package_items: Vec<&PackageItem> = self.packages.iter().flat_map(|p| p.items.iter()).collect();
        let package_value: f64 = self
            .packages
            .iter()
            .map(|p| {
                let unit: f64 = p.items.iter().map(|i| i.qty * i.price).sum();
                unit * f64::from(p.package_qty)
            })
            .sum();
        let additional_value: f64 = self.additional_items.iter().map(|i| i.qty * i.price).sum();

        OrderSummary {
            package_items_packed: package_items.iter().filter(|i| i.packed).count(),
            package_items_total: package_items.len(),
            additional_packed: self.additional_items.iter().filter(|i| i.packed).count(),
            additional_total: self.additional_items.len(),
            total_value: package_value + additional_value,
        }
    }
}

/// Packed counts and order value, for status displays.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub package_items_packed: usize,
    pub package_items_total: usize,
    pub additional_packed: usize,
    pub additional_total: usize,
    pub total_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PackOrder {
        let rice = Package::new(
            1,
            "Rice bundle",
            2,
            vec![
                PackageItem::new(10, "Rice 5kg", 1.0, 12.5).packed(true),
                PackageItem::new(11, "Sack", 2.0, 0.5),
            ],
        );
        let extras = vec![AdditionalItem::new(10, "Seed drill", 1.0, 40.0)];
        PackOrder::new(OrderId(3), vec![rice], extras)
    }

    #[test]
    fn test_new_caps_status() {
        let order = PackOrder::new(
            OrderId(1),
            vec![],
            vec![AdditionalItem::new(1, "Hoe", 1.0, 3.0).packed(true)],
        );
        assert_eq!(order.derive_status(), PackStatus::Completed);
        assert_eq!(order.status, PackStatus::Opened);
        assert!(!order.is_frozen());
    }

    #[test]
    fn test_item_lookup_prefers_package_items() {
        let mut order = sample();
        assert_eq!(
            order.find_item(10),
            Some(ItemRef::Package { package_id: 1, item_id: 10 })
        );
        assert_eq!(order.find_item(99), None);

        let flag = order.packed_flag_mut(&ItemRef::Additional(10)).unwrap();
        *flag = true;
        assert!(order.additional_items[0].packed);
        assert!(order
            .packed_flag_mut(&ItemRef::Package { package_id: 2, item_id: 10 })
            .is_none());
    }

    #[test]
    fn test_summary() {
        let summary = sample().summary();
        assert_eq!(summary.package_items_packed, 1);
        assert_eq!(summary.package_items_total, 2);
        assert_eq!(summary.additional_packed, 0);
        assert_eq!(summary.additional_total, 1);
        // (12.5 + 2 * 0.5) * 2 + 40
        assert!((summary.total_value - 67.0).abs() < f64::EPSILON);
    }
}
