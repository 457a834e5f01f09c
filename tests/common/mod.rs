#![allow(dead_code)]

use pack_status::lifecycle::PackSystem;
use pack_status::model::{OrderData, OrderId};
use pack_status::service::{MockOrderService, Session};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub const ORDER: OrderId = OrderId(1042);
pub const COUNTDOWN: Duration = Duration::from_secs(30);

pub fn system(mock: &MockOrderService) -> PackSystem {
    PackSystem::new(
        Arc::new(mock.clone()),
        Session::new("token-abc", "sw"),
        8,
        COUNTDOWN,
    )
}

pub fn order_data(value: Value) -> OrderData {
    serde_json::from_value(value).expect("valid order payload")
}

/// Package 1 with items 11 and 12, no additional items.
pub fn one_package(packed: [bool; 2]) -> OrderData {
    order_data(json!({
        "packageData": [{
            "id": 1, "packageName": "Seed kit", "packageQty": 1,
            "items": [
                { "id": 11, "productName": "Maize seed", "qty": 1, "price": 10, "isPacked": packed[0] },
                { "id": 12, "productName": "Bean seed", "qty": 1, "price": 8, "isPacked": packed[1] }
            ]
        }],
        "additionalItems": []
    }))
}

/// Package 1 with items 11 and 12 plus additional items 21 and 22.
pub fn mixed(package: [bool; 2], additional: [bool; 2]) -> OrderData {
    order_data(json!({
        "packageData": [{
            "id": 1, "packageName": "Seed kit", "packageQty": 2,
            "items": [
                { "id": 11, "productName": "Maize seed", "qty": 1, "price": 10, "isPacked": package[0] },
                { "id": 12, "productName": "Bean seed", "qty": 1, "price": 8, "isPacked": package[1] }
            ]
        }],
        "additionalItems": [
            { "id": 21, "productName": "Gloves", "qty": 1, "price": 3, "isPacked": u8::from(additional[0]) },
            { "id": 22, "productName": "Sack", "qty": 2, "price": 1, "isPacked": u8::from(additional[1]) }
        ]
    }))
}
