//! Order references scanned from QR codes.
//!
//! Drivers scan labels printed by several generations of tooling, so the
//! payload may be a JSON object, a link, `key: value` text or a bare number.
//! [`parse`] tries each shape in turn and returns the first reference found.

use crate::model::OrderId;
use reqwest::Url;
use serde_json::Value;
use std::fmt::Display;
use thiserror::Error;

/// What a scanned payload points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderRef {
    OrderId(OrderId),
    Invoice(String),
}

impl Display for OrderRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderRef::OrderId(id) => write!(f, "order {}", id),
            OrderRef::Invoice(invoice) => write!(f, "invoice {}", invoice),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QrError {
    #[error("QR payload is empty")]
    Empty,

    #[error("No order id or invoice number found in QR payload")]
    Unrecognized,
}

const ORDER_KEYS: [&str; 2] = ["orderId", "order_id"];
const INVOICE_KEYS: [&str; 3] = ["invoiceNo", "invoiceNumber", "invoice_no"];

pub fn parse(payload: &str) -> Result<OrderRef, QrError> {
    let text = payload.trim().trim_start_matches('\u{feff}');
    if text.is_empty() {
        return Err(QrError::Empty);
    }

    if text.starts_with('{') {
        if let Ok(json) = serde_json::from_str::<Value>(text) {
            if let Some(found) = from_json(&json) {
                return Ok(found);
            }
        }
    }

    if let Ok(url) = Url::parse(text) {
        if matches!(url.scheme(), "http" | "https") {
            if let Some(found) = from_url(&url) {
                return Ok(found);
            }
        }
    }

    from_fields(text)
        .or_else(|| from_tokens(text))
        .ok_or(QrError::Unrecognized)
}

fn from_json(json: &Value) -> Option<OrderRef> {
    let object = json.as_object()?;

    let order = ORDER_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(order_from_value));
    let invoice = || {
        INVOICE_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(invoice_from_value))
    };
    let plain_id = || object.get("id").and_then(order_from_value);
    let nested = || object.get("data").and_then(from_json);

    order.or_else(invoice).or_else(plain_id).or_else(nested)
}

fn order_from_value(value: &Value) -> Option<OrderRef> {
    match value {
        Value::Number(n) => n.as_u64().map(|id| OrderRef::OrderId(OrderId(id))),
        Value::String(s) => from_value_text(s),
        _ => None,
    }
}

fn invoice_from_value(value: &Value) -> Option<OrderRef> {
    match value {
        Value::Number(n) => Some(OrderRef::Invoice(n.to_string())),
        Value::String(s) if !s.trim().is_empty() => Some(OrderRef::Invoice(s.trim().to_string())),
        _ => None,
    }
}

/// A string value under an order key: digits, or an invoice token.
fn from_value_text(s: &str) -> Option<OrderRef> {
    let s = s.trim();
    if let Ok(id) = s.parse::<OrderId>() {
        Some(OrderRef::OrderId(id))
    } else {
        invoice_token(s).map(OrderRef::Invoice)
    }
}

fn from_url(url: &Url) -> Option<OrderRef> {
    for (key, value) in url.query_pairs() {
        match normalize_key(&key).as_str() {
            "orderid" | "order" | "id" => {
                if let Some(found) = from_value_text(&value) {
                    return Some(found);
                }
            }
            "invoice" | "invoiceno" | "invoicenumber" if !value.trim().is_empty() => {
                return Some(OrderRef::Invoice(value.trim().to_string()));
            }
            _ => {}
        }
    }

    url.path_segments()?
        .rev()
        .find(|segment| !segment.is_empty())
        .and_then(from_value_text)
}

/// `key: value` or `key=value` pairs, one per line or separated by `;`.
fn from_fields(text: &str) -> Option<OrderRef> {
    let mut invoice = None;
    for field in text.split(['\n', ';']) {
        let Some((key, value)) = field.split_once(':').or_else(|| field.split_once('=')) else {
            continue;
        };
        let value = value.trim();
        match normalize_key(key).as_str() {
            "orderid" | "order" | "orderno" | "ordernumber" | "id" => {
                if let Ok(id) = value.trim_start_matches('#').parse::<OrderId>() {
                    return Some(OrderRef::OrderId(id));
                }
            }
            "invoice" | "invoiceno" | "invoicenumber" | "inv" if !value.is_empty() && invoice.is_none() => {
                invoice = Some(OrderRef::Invoice(value.to_string()));
            }
            _ => {}
        }
    }
    invoice
}

/// Free text: an `INV...` token, or a single number.
fn from_tokens(text: &str) -> Option<OrderRef> {
    let tokens: Vec<&str> = text
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '-' && c != '/'))
        .filter(|t| !t.is_empty())
        .collect();

    if let Some(invoice) = tokens.iter().find_map(|t| invoice_token(t)) {
        return Some(OrderRef::Invoice(invoice));
    }

    let mut numbers = tokens.iter().filter_map(|t| t.parse::<OrderId>().ok());
    match (numbers.next(), numbers.next()) {
        (Some(id), None) => Some(OrderRef::OrderId(id)),
        _ => None,
    }
}

/// `INV` followed by something containing a digit, e.g. `INV-2024-0042`.
fn invoice_token(token: &str) -> Option<String> {
    let prefix = token.get(..3)?;
    let rest = &token[3..];
    (prefix.eq_ignore_ascii_case("inv") && rest.chars().any(|c| c.is_ascii_digit()))
        .then(|| token.to_string())
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
