//! JSON shapes exchanged with the order service.
//!
//! The service is loose about scalar types: packed flags arrive as booleans or
//! `0`/`1`, quantities and prices sometimes as strings. Decoding accepts all of
//! those; encoding always writes flags as `0`/`1`.

use super::order::{AdditionalItem, OrderId, PackOrder, Package, PackageItem};
use super::status::PackStatus;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `GET /order-data/{orderId}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    #[serde(default)]
    pub package_data: Vec<PackageDto>,
    #[serde(default)]
    pub additional_items: Vec<AdditionalItemDto>,
    /// Status the server has on record, when it sends one.
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDto {
    pub id: u64,
    #[serde(default)]
    pub package_name: String,
    #[serde(default = "one")]
    pub package_qty: u32,
    #[serde(default)]
    pub items: Vec<PackageItemDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageItemDto {
    pub id: u64,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub qty: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: f64,
    #[serde(default)]
    pub product_type: Option<Value>,
    #[serde(default)]
    pub product_type_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_packed: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalItemDto {
    pub id: u64,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub qty: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_packed: bool,
}

fn one() -> u32 {
    1
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => Ok(matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")),
        other => Err(serde::de::Error::custom(format!("invalid flag: {}", other))),
    }
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0.0),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("number out of range")),
        Value::String(s) if s.trim().is_empty() => Ok(0.0),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid number: {}", s))),
        other => Err(serde::de::Error::custom(format!("invalid number: {}", other))),
    }
}

impl PackOrder {
    /// Build the working copy of an order from the service payload.
    ///
    /// A server-side `Completed` status opens the order frozen; any other status
    /// is re-derived from the packed flags.
    pub fn from_wire(id: OrderId, data: OrderData) -> Self {
        let packages = data
            .package_data
            .into_iter()
            .map(|p| {
                let items = p
                    .items
                    .into_iter()
                    .map(|i| PackageItem {
                        id: i.id,
                        product_name: i.product_name,
                        qty: i.qty,
                        price: i.price,
                        product_type: i.product_type.map(|v| match v {
                            Value::String(s) => s,
                            other => other.to_string(),
                        }),
                        product_type_name: i.product_type_name,
                        packed: i.is_packed,
                    })
                    .collect();
                Package::new(p.id, p.package_name, p.package_qty, items)
            })
            .collect();
        let additional = data
            .additional_items
            .into_iter()
            .map(|i| AdditionalItem::new(i.id, i.product_name, i.qty, i.price).packed(i.is_packed))
            .collect();

        let mut order = PackOrder::new(id, packages, additional);
        let server_status = data.status.and_then(|s| s.parse::<PackStatus>().ok());
        if server_status == Some(PackStatus::Completed) {
            order.status = PackStatus::Completed;
        }
        order
    }
}

/// One packed flag in an update request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedFlag {
    pub id: u64,
    pub is_packed: u8,
}

/// Body of `PUT /update-order/{orderId}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub order_id: OrderId,
    pub package_items: Vec<PackedFlag>,
    pub additional_items: Vec<PackedFlag>,
    pub status: PackStatus,
    pub is_complete: u8,
}

impl UpdateOrderRequest {
    pub fn new(order: &PackOrder, status: PackStatus, complete: bool) -> Self {
        Self {
            order_id: order.id,
            package_items: order
                .packages
                .iter()
                .flat_map(|p| p.items.iter())
                .map(|i| PackedFlag {
                    id: i.id,
                    is_packed: u8::from(i.packed),
                })
                .collect(),
            additional_items: order
                .additional_items
                .iter()
                .map(|i| PackedFlag {
                    id: i.id,
                    is_packed: u8::from(i.packed),
                })
                .collect(),
            status,
            is_complete: u8::from(complete),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "packageData": [{
                "id": 4,
                "packageName": "Starter kit",
                "packageQty": 3,
                "items": [
                    { "id": 41, "productName": "Maize seed", "qty": "2", "price": 7.5,
                      "productType": 2, "productTypeName": "Seed", "isPacked": 1 },
                    { "id": 42, "productName": "Fertiliser", "qty": 1, "price": "12.00",
                      "isPacked": false }
                ]
            }],
            "additionalItems": [
                { "id": 9, "productName": "Gloves", "qty": 1, "price": 2, "isPacked": "0" }
            ]
        })
    }

    #[test]
    fn test_decode_lenient_payload() {
        let data: OrderData = serde_json::from_value(payload()).unwrap();
        let order = PackOrder::from_wire(OrderId(8), data);

        let package = &order.packages[0];
        assert_eq!(package.package_qty, 3);
        assert_eq!(package.items[0].qty, 2.0);
        assert_eq!(package.items[0].product_type.as_deref(), Some("2"));
        assert!(package.items[0].packed);
        assert_eq!(package.items[1].price, 12.0);
        assert!(!package.items[1].packed);
        assert!(!order.additional_items[0].packed);
        assert_eq!(order.status, PackStatus::Pending);
    }

    #[test]
    fn test_server_completed_status_is_kept() {
        let mut value = payload();
        value["status"] = json!("Completed");
        let data: OrderData = serde_json::from_value(value).unwrap();
        let order = PackOrder::from_wire(OrderId(8), data);
        assert!(order.is_completed());
        assert!(order.is_frozen());
    }

    #[test]
    fn test_missing_groups_default_to_empty() {
        let data: OrderData = serde_json::from_value(json!({})).unwrap();
        let order = PackOrder::from_wire(OrderId(1), data);
        assert!(order.packages.is_empty());
        assert_eq!(order.derive_status(), PackStatus::Pending);
    }

    #[test]
    fn test_update_request_shape() {
        let data: OrderData = serde_json::from_value(payload()).unwrap();
        let order = PackOrder::from_wire(OrderId(8), data);
        let request = UpdateOrderRequest::new(&order, PackStatus::Opened, false);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "orderId": 8,
                "packageItems": [{ "id": 41, "isPacked": 1 }, { "id": 42, "isPacked": 0 }],
                "additionalItems": [{ "id": 9, "isPacked": 0 }],
                "status": "Opened",
                "isComplete": 0
            })
        );
    }
}
