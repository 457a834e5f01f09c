//! Order service client over HTTP.
//!
//! Every request carries the session token as a bearer credential and the
//! session locale as `Accept-Language`. Failures are folded into
//! [`ServiceError`] with a message fit for a user-facing alert.

use super::{OrderService, ServiceError, Session};
use crate::model::{OrderData, OrderId, UpdateOrderRequest};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default timeout for order service requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// URL normalisation
// ---------------------------------------------------------------------------

/// Normalise the service base URL:
/// - ensure a scheme is present (https, or http for localhost)
/// - strip trailing slashes
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }

    url
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn transport_error(url: &str, err: &reqwest::Error) -> ServiceError {
    let message = if err.is_connect() {
        format!("Cannot reach order service at {url}")
    } else if err.is_timeout() {
        format!("Connection to {url} timed out")
    } else if err.is_builder() {
        format!("Invalid order service URL: {url}")
    } else {
        format!("Network error communicating with {url}: {err}")
    };
    ServiceError::Transport(message)
}

fn status_message(status: StatusCode) -> String {
    match status.as_u16() {
        401 => "Session expired, please sign in again".to_string(),
        403 => "Not allowed to update this order".to_string(),
        404 => "Order not found".to_string(),
        s if s >= 500 => format!("Order service unavailable (HTTP {s})"),
        s => format!("Unexpected response from order service (HTTP {s})"),
    }
}

/// Pull a human readable message out of an error body.
fn body_message(json: &Value) -> Option<String> {
    json.get("message")
        .or_else(|| json.get("error"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Turn a raw HTTP answer into JSON or a typed failure.
///
/// Besides non-2xx codes, a 2xx body carrying `"success": false` is a
/// business failure. An empty body is `Value::Null`.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<Value, ServiceError> {
    let json = serde_json::from_str::<Value>(body).ok();
    let message = json.as_ref().and_then(body_message);

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ServiceError::Auth(
            message.unwrap_or_else(|| status_message(status)),
        ));
    }
    if !status.is_success() {
        return Err(ServiceError::Business {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| status_message(status)),
        });
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    let json = json.ok_or_else(|| ServiceError::Decode("response is not JSON".to_string()))?;
    if json.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ServiceError::Business {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| "Request was rejected".to_string()),
        });
    }
    Ok(json)
}

/// Responses may wrap the payload as `{ success, data }`.
fn unwrap_envelope(json: Value) -> Value {
    match json {
        Value::Object(mut map) if !map.contains_key("packageData") && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// [`OrderService`] backed by the REST API.
#[derive(Debug, Clone)]
pub struct HttpOrderService {
    client: Client,
    base_url: String,
}

impl HttpOrderService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Transport(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ServiceError> {
        if session.token.trim().is_empty() {
            return Err(ServiceError::Auth("No session token, please sign in".to_string()));
        }

        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "Sending request");

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(&session.token)
            .header("Accept-Language", &session.locale)
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&self.base_url, &e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(&self.base_url, &e))?;

        interpret_response(status, &text).inspect_err(|e| {
            warn!(%url, status = status.as_u16(), error = %e, "Order service request failed");
        })
    }
}

#[async_trait]
impl OrderService for HttpOrderService {
    #[instrument(skip(self, session))]
    async fn fetch_order(&self, session: &Session, id: OrderId) -> Result<OrderData, ServiceError> {
        let json = self
            .send(session, Method::GET, &format!("/order-data/{id}"), None)
            .await?;
        serde_json::from_value(unwrap_envelope(json)).map_err(|e| ServiceError::Decode(e.to_string()))
    }

    #[instrument(skip(self, session, update), fields(order_id = %update.order_id, status = %update.status))]
    async fn update_order(&self, session: &Session, update: &UpdateOrderRequest) -> Result<(), ServiceError> {
        let body = serde_json::to_value(update).map_err(|e| ServiceError::Decode(e.to_string()))?;
        self.send(
            session,
            Method::PUT,
            &format!("/update-order/{}", update.order_id),
            Some(body),
        )
        .await
        .map(|_| ())
    }

    #[instrument(skip(self, session))]
    async fn update_distributed_target(&self, session: &Session, id: OrderId) -> Result<(), ServiceError> {
        self.send(
            session,
            Method::PUT,
            &format!("/update-distributed-target/{id}"),
            None,
        )
        .await
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("api.example.com/"), "https://api.example.com");
        assert_eq!(normalize_base_url(" localhost:8080//"), "http://localhost:8080");
        assert_eq!(
            normalize_base_url("http://10.0.0.2/api/v1/"),
            "http://10.0.0.2/api/v1"
        );
    }

    #[test]
    fn test_auth_failures() {
        let err = interpret_response(StatusCode::UNAUTHORIZED, "").unwrap_err();
        assert_eq!(err, ServiceError::Auth("Session expired, please sign in again".into()));

        let err = interpret_response(StatusCode::FORBIDDEN, r#"{"message":"Driver only"}"#).unwrap_err();
        assert_eq!(err, ServiceError::Auth("Driver only".into()));
    }

    #[test]
    fn test_business_failures() {
        let err = interpret_response(StatusCode::UNPROCESSABLE_ENTITY, r#"{"error":"Bad item"}"#)
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::Business {
                status: 422,
                message: "Bad item".into()
            }
        );

        let err = interpret_response(StatusCode::OK, r#"{"success":false,"message":"Order locked"}"#)
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::Business {
                status: 200,
                message: "Order locked".into()
            }
        );

        let err = interpret_response(StatusCode::BAD_GATEWAY, "<html>").unwrap_err();
        assert!(matches!(err, ServiceError::Business { status: 502, .. }));
    }

    #[test]
    fn test_successful_bodies() {
        assert_eq!(interpret_response(StatusCode::NO_CONTENT, "").unwrap(), Value::Null);
        assert_eq!(
            interpret_response(StatusCode::OK, r#"{"success":true}"#).unwrap(),
            json!({ "success": true })
        );
        assert!(matches!(
            interpret_response(StatusCode::OK, "not json"),
            Err(ServiceError::Decode(_))
        ));
    }

    #[test]
    fn test_unwrap_envelope() {
        let wrapped = json!({ "success": true, "data": { "packageData": [] } });
        assert_eq!(unwrap_envelope(wrapped), json!({ "packageData": [] }));

        let bare = json!({ "packageData": [], "data": 1 });
        assert_eq!(unwrap_envelope(bare.clone()), bare);
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_sending() {
        let service = HttpOrderService::new("http://127.0.0.1:9", DEFAULT_TIMEOUT).unwrap();
        let err = service
            .fetch_order(&Session::new("", "en"), OrderId(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Auth(_)));
    }
}
