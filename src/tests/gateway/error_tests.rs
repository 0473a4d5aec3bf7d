use reqwest::StatusCode;
use serde_json::json;

use super::*;

#[test]
fn json_message_wins_over_status_text() {
    let err = GatewayError::from_response(StatusCode::NOT_FOUND, r#"{"message":"no such worksheet"}"#);
    assert_eq!(err.status, 404);
    assert_eq!(err.message, "no such worksheet");
    assert_eq!(err.data, Some(json!({ "message": "no such worksheet" })));
    assert!(!err.is_network());
}

#[test]
fn json_without_message_keeps_data_and_uses_reason() {
    let err = GatewayError::from_response(StatusCode::BAD_REQUEST, r#"{"errors":["x"]}"#);
    assert_eq!(err.message, "Bad Request");
    assert_eq!(err.data, Some(json!({ "errors": ["x"] })));
}

#[test]
fn non_json_body_has_no_data() {
    let err = GatewayError::from_response(StatusCode::BAD_GATEWAY, "upstream died");
    assert_eq!(err.message, "Bad Gateway");
    assert_eq!(err.data, None);
}

#[test]
fn network_errors_use_status_zero() {
    let err = GatewayError::network("connection refused");
    assert_eq!(err.status, GatewayError::NETWORK_STATUS);
    assert!(err.is_network());
    assert_eq!(err.to_string(), "connection refused");
}
